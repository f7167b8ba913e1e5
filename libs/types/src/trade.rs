//! Trade types
//!
//! A trade references exactly one buy order and one sell order of the same
//! market and is immutable once created by a settlement transaction.

use crate::ids::{AccountId, MarketId, OrderId, TradeId};
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An executed trade as persisted in the trade table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub market: MarketId,

    // Order references
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,

    // Counterparties
    pub buyer_id: AccountId,
    pub seller_id: AccountId,

    /// Execution price (the resting sell order's limit price)
    pub price: Price,
    pub quantity: Quantity,

    /// Unix nanos
    pub executed_at: i64,
}

impl Trade {
    /// Create a new trade record
    ///
    /// # Panics
    /// Panics on a zero quantity; price positivity is carried by `Price`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        market: MarketId,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        buyer_id: AccountId,
        seller_id: AccountId,
        price: Price,
        quantity: Quantity,
        executed_at: i64,
    ) -> Self {
        assert!(!quantity.is_zero(), "trade quantity must be positive");

        Self {
            trade_id: TradeId::new(),
            market,
            buy_order_id,
            sell_order_id,
            buyer_id,
            seller_id,
            price,
            quantity,
            executed_at,
        }
    }

    /// Quote-asset value of the trade (price × quantity)
    pub fn cost(&self) -> Decimal {
        self.price.as_decimal() * self.quantity.as_decimal()
    }
}
