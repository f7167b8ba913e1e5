//! Settlement transaction
//!
//! Commits one matched tuple: moves quote from buyer to seller and base from
//! seller to buyer, persists both orders' decrements and inserts the trade.
//! The wallet legs go through one atomic [`WalletStore::apply`], which locks
//! the four rows in canonical order and rejects the whole change if any
//! balance would go negative — an aborted settlement leaves zero mutations.

use ledger::{BalanceChange, OrderStore, TradeStore, WalletStore};
use types::balance::BalanceKey;
use types::errors::SettlementError;
use types::trade::Trade;

use crate::matching::MatchCandidate;

/// Executes settlement transactions against the ledger stores
pub struct Settler<'a> {
    wallets: &'a WalletStore,
    orders: &'a OrderStore,
    trades: &'a TradeStore,
}

impl<'a> Settler<'a> {
    pub fn new(wallets: &'a WalletStore, orders: &'a OrderStore, trades: &'a TradeStore) -> Self {
        Self {
            wallets,
            orders,
            trades,
        }
    }

    /// Settle one candidate; on `Err` no store was touched
    pub fn execute(
        &self,
        candidate: &MatchCandidate,
        executed_at: i64,
    ) -> Result<Trade, SettlementError> {
        // Resolve both orders up front so a missing order aborts before any
        // balance movement.
        let buy = self
            .orders
            .get(&candidate.buy_order_id)
            .ok_or_else(|| SettlementError::OrderNotFound {
                order_id: candidate.buy_order_id.to_string(),
            })?;
        let sell = self
            .orders
            .get(&candidate.sell_order_id)
            .ok_or_else(|| SettlementError::OrderNotFound {
                order_id: candidate.sell_order_id.to_string(),
            })?;

        // The selector only pairs orders of the same market; anything else
        // is a programming error, not a runtime condition.
        assert_eq!(buy.market, sell.market, "cross-pair settlement attempted");
        assert_eq!(buy.market, candidate.market, "candidate market mismatch");

        let market = &candidate.market;
        let quantity = candidate.quantity.as_decimal();
        let cost = candidate.price.as_decimal() * quantity;

        let mut change = BalanceChange::new();
        change.debit(
            BalanceKey::new(candidate.buyer_id, market.quote.clone()),
            cost,
        );
        change.credit(
            BalanceKey::new(candidate.buyer_id, market.base.clone()),
            quantity,
        );
        change.credit(
            BalanceKey::new(candidate.seller_id, market.quote.clone()),
            cost,
        );
        change.debit(
            BalanceKey::new(candidate.seller_id, market.base.clone()),
            quantity,
        );

        self.wallets.apply(&change)?;

        self.orders
            .apply_fill(&candidate.buy_order_id, candidate.quantity)?;
        self.orders
            .apply_fill(&candidate.sell_order_id, candidate.quantity)?;

        let trade = Trade::new(
            market.clone(),
            candidate.buy_order_id,
            candidate.sell_order_id,
            candidate.buyer_id,
            candidate.seller_id,
            candidate.price,
            candidate.quantity,
            executed_at,
        );
        self.trades.record(trade.clone());

        Ok(trade)
    }
}
