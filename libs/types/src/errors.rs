//! Error taxonomy for the exchange core
//!
//! Ledger errors abort a single settlement; nothing here aborts a whole
//! matching pass. Cross-pair match attempts are programming errors and are
//! asserted at the settlement boundary instead of appearing in this taxonomy.

use thiserror::Error;

/// Errors surfaced by the wallet ledger
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// A debit would push a balance row negative. Unreachable while intake
    /// validation holds; treated as fatal to the one trade that hit it.
    #[error("insufficient balance on {owner}/{asset}: required {required}, available {available}")]
    InsufficientBalance {
        owner: String,
        asset: String,
        required: String,
        available: String,
    },

    /// A balance-row lock could not be acquired within the bounded wait.
    /// Retryable; the next scheduled pass re-derives the candidate.
    #[error("timed out waiting for balance row lock on {owner}/{asset}")]
    LockTimeout { owner: String, asset: String },
}

impl LedgerError {
    /// Whether the caller may retry the same operation later
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::LockTimeout { .. })
    }
}

/// Errors surfaced by one settlement transaction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettlementError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("order not found: {order_id}")]
    OrderNotFound { order_id: String },
}
