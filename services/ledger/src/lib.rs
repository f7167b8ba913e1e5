//! Ledger Store
//!
//! In-memory persistence layer for the matching core: wallet-balance rows
//! with row-level pessimistic locking, the order table and the append-only
//! trade table.
//!
//! **Key invariants:**
//! - No wallet balance is ever observably negative
//! - Multi-row balance changes are all-or-nothing
//! - Rows are locked in ascending `BalanceKey` order, never interleaved
//!   with reads or computation

pub mod orders;
pub mod trades;
pub mod wallets;

pub use orders::OrderStore;
pub use trades::TradeStore;
pub use wallets::{BalanceChange, WalletStore};
