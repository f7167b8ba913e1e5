//! Wallet balance types
//!
//! One row per (owner, asset). `BalanceKey`'s derived ordering — owner id
//! first, then asset — is the single global lock-acquisition order every
//! settlement follows, so concurrent settlements over overlapping wallets
//! cannot deadlock.

use crate::ids::{AccountId, AssetId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a wallet-balance row, unique per (owner, asset)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    pub owner: AccountId,
    pub asset: AssetId,
}

impl BalanceKey {
    pub fn new(owner: AccountId, asset: AssetId) -> Self {
        Self { owner, asset }
    }
}

impl fmt::Display for BalanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.asset)
    }
}

/// A wallet-balance row; `amount` is non-negative at every observable point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub owner: AccountId,
    pub asset: AssetId,
    pub amount: Decimal,
}

impl WalletBalance {
    pub fn new(owner: AccountId, asset: AssetId, amount: Decimal) -> Self {
        Self { owner, asset, amount }
    }

    pub fn key(&self) -> BalanceKey {
        BalanceKey::new(self.owner, self.asset.clone())
    }

    pub fn check_invariant(&self) -> bool {
        self.amount >= Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_orders_by_owner_then_asset() {
        let a = AccountId::new();
        let b = AccountId::new();
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };

        let k1 = BalanceKey::new(lo, AssetId::new("KRW"));
        let k2 = BalanceKey::new(hi, AssetId::new("BTC"));
        assert!(k1 < k2, "owner id dominates the asset in the ordering");

        let k3 = BalanceKey::new(lo, AssetId::new("BTC"));
        assert!(k3 < k1, "same owner falls back to asset ordering");
    }

    #[test]
    fn test_balance_invariant() {
        let owner = AccountId::new();
        let ok = WalletBalance::new(owner, AssetId::new("BTC"), Decimal::from(5));
        assert!(ok.check_invariant());

        let bad = WalletBalance::new(owner, AssetId::new("BTC"), Decimal::from(-1));
        assert!(!bad.check_invariant());
    }

    #[test]
    fn test_key_round_trips_through_row() {
        let row = WalletBalance::new(AccountId::new(), AssetId::new("ETH"), Decimal::ONE);
        assert_eq!(row.key().asset, AssetId::new("ETH"));
    }
}
