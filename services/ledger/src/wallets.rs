//! Wallet-balance store
//!
//! Each (owner, asset) row is an independently lockable cell. The only write
//! path is [`WalletStore::apply`], which takes a [`BalanceChange`] — a set of
//! net deltas — and commits it atomically: every touched row is locked in
//! ascending `BalanceKey` order, all resulting amounts are validated
//! non-negative, and only then are the rows written. On any failure no row
//! is mutated.
//!
//! Lock waits are bounded, so contention surfaces as a retryable
//! `LockTimeout` instead of an unbounded stall.

use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use types::balance::{BalanceKey, WalletBalance};
use types::errors::LedgerError;
use types::ids::{AccountId, AssetId};

/// Default bound on the wait for a single row lock
pub const DEFAULT_LOCK_WAIT: Duration = Duration::from_millis(500);

/// A set of net balance deltas to be applied atomically
///
/// Credits and debits against the same key collapse into one delta, which is
/// what makes a self-trade (buyer == seller) touch each row exactly once.
/// The backing `BTreeMap` yields keys in ascending order — the canonical
/// lock-acquisition order.
#[derive(Debug, Clone, Default)]
pub struct BalanceChange {
    deltas: BTreeMap<BalanceKey, Decimal>,
}

impl BalanceChange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add to a row
    ///
    /// # Panics
    /// Panics on a negative amount; use [`debit`](Self::debit) instead.
    pub fn credit(&mut self, key: BalanceKey, amount: Decimal) {
        assert!(amount >= Decimal::ZERO, "credit amount must be non-negative");
        *self.deltas.entry(key).or_insert(Decimal::ZERO) += amount;
    }

    /// Subtract from a row
    ///
    /// # Panics
    /// Panics on a negative amount; use [`credit`](Self::credit) instead.
    pub fn debit(&mut self, key: BalanceKey, amount: Decimal) {
        assert!(amount >= Decimal::ZERO, "debit amount must be non-negative");
        *self.deltas.entry(key).or_insert(Decimal::ZERO) -= amount;
    }

    /// Touched keys in ascending (lock) order
    pub fn keys(&self) -> impl Iterator<Item = &BalanceKey> {
        self.deltas.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    fn deltas(&self) -> &BTreeMap<BalanceKey, Decimal> {
        &self.deltas
    }
}

/// Per-(owner, asset) balance rows with atomic multi-row read-modify-write
pub struct WalletStore {
    rows: RwLock<HashMap<BalanceKey, Arc<Mutex<Decimal>>>>,
    lock_wait: Duration,
}

impl WalletStore {
    pub fn new() -> Self {
        Self::with_lock_wait(DEFAULT_LOCK_WAIT)
    }

    /// Build a store with a custom bound on row-lock waits
    pub fn with_lock_wait(lock_wait: Duration) -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            lock_wait,
        }
    }

    /// Fetch a row cell, creating it lazily with a zero amount
    fn row(&self, key: &BalanceKey) -> Arc<Mutex<Decimal>> {
        if let Some(cell) = self.rows.read().get(key) {
            return Arc::clone(cell);
        }
        let mut rows = self.rows.write();
        Arc::clone(
            rows.entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(Decimal::ZERO))),
        )
    }

    /// External funding flow; creates the row on first deposit
    ///
    /// # Panics
    /// Panics on a negative amount.
    pub fn deposit(&self, owner: AccountId, asset: AssetId, amount: Decimal) {
        assert!(amount >= Decimal::ZERO, "deposit amount must be non-negative");
        let cell = self.row(&BalanceKey::new(owner, asset));
        *cell.lock() += amount;
    }

    /// Current amount of a row, zero if the row was never funded
    pub fn balance(&self, key: &BalanceKey) -> Decimal {
        match self.rows.read().get(key) {
            Some(cell) => *cell.lock(),
            None => Decimal::ZERO,
        }
    }

    /// Materialize a row for reporting
    pub fn wallet(&self, key: &BalanceKey) -> WalletBalance {
        WalletBalance::new(key.owner, key.asset.clone(), self.balance(key))
    }

    /// Sum of one asset across all wallets; conservation audits compare
    /// this before and after a pass
    pub fn asset_total(&self, asset: &AssetId) -> Decimal {
        self.rows
            .read()
            .iter()
            .filter(|(key, _)| &key.asset == asset)
            .map(|(_, cell)| *cell.lock())
            .sum()
    }

    /// Atomically apply a multi-row balance change
    ///
    /// Locks every touched row in ascending key order with a bounded wait,
    /// validates that no resulting amount is negative, then writes all rows.
    /// On `Err` the store is untouched.
    pub fn apply(&self, change: &BalanceChange) -> Result<(), LedgerError> {
        // Materialize cells first so lock acquisition is not interleaved
        // with map access.
        let cells: Vec<(&BalanceKey, Arc<Mutex<Decimal>>)> = change
            .deltas()
            .keys()
            .map(|key| (key, self.row(key)))
            .collect();

        let mut guards = Vec::with_capacity(cells.len());
        for (key, cell) in &cells {
            match cell.try_lock_for(self.lock_wait) {
                Some(guard) => guards.push(guard),
                None => {
                    return Err(LedgerError::LockTimeout {
                        owner: key.owner.to_string(),
                        asset: key.asset.to_string(),
                    })
                }
            }
        }

        // All rows locked; compute the resulting amounts and reject the whole
        // change if any would go negative.
        let mut next = Vec::with_capacity(guards.len());
        for ((key, delta), guard) in change.deltas().iter().zip(guards.iter()) {
            let amount = **guard + *delta;
            if amount < Decimal::ZERO {
                return Err(LedgerError::InsufficientBalance {
                    owner: key.owner.to_string(),
                    asset: key.asset.to_string(),
                    required: (-*delta).to_string(),
                    available: (**guard).to_string(),
                });
            }
            next.push(amount);
        }

        for (guard, amount) in guards.iter_mut().zip(next) {
            **guard = amount;
        }
        Ok(())
    }
}

impl Default for WalletStore {
    fn default() -> Self {
        Self::new()
    }
}
