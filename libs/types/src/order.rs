//! Order lifecycle types
//!
//! An order enters the store OPEN with `remaining == quantity`; the engine
//! only ever decreases `remaining` and flips the status to COMPLETED when it
//! reaches zero. Intake validation (balance sufficiency) happens before
//! admission and is not re-checked here.

use crate::ids::{AccountId, MarketId, OrderId};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }
}

/// Order type
///
/// MARKET orders are admitted into the store but the continuous engine has
/// no matching policy for them; only LIMIT orders are ever selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    LIMIT,
    MARKET,
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Resting, eligible for matching
    Open,
    /// Fully filled (terminal)
    Completed,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }
}

/// A resting order as persisted in the order table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub owner_id: AccountId,
    pub market: MarketId,
    pub side: Side,
    pub order_type: OrderType,
    /// Limit price; present iff order_type == LIMIT
    pub price: Option<Price>,
    /// Original quantity at admission
    pub quantity: Quantity,
    /// Unfilled quantity, only ever decreased
    pub remaining_quantity: Quantity,
    pub status: OrderStatus,
    /// Unix nanos; the tie-break at equal price
    pub created_at: i64,
}

impl Order {
    /// Create a new open limit order
    pub fn limit(
        owner_id: AccountId,
        market: MarketId,
        side: Side,
        price: Price,
        quantity: Quantity,
        created_at: i64,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            owner_id,
            market,
            side,
            order_type: OrderType::LIMIT,
            price: Some(price),
            quantity,
            remaining_quantity: quantity,
            status: OrderStatus::Open,
            created_at,
        }
    }

    /// Create a new open market order (admitted, never matched)
    pub fn market(
        owner_id: AccountId,
        market: MarketId,
        side: Side,
        quantity: Quantity,
        created_at: i64,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            owner_id,
            market,
            side,
            order_type: OrderType::MARKET,
            price: None,
            quantity,
            remaining_quantity: quantity,
            status: OrderStatus::Open,
            created_at,
        }
    }

    /// The limit price of a LIMIT order
    ///
    /// # Panics
    /// Panics on a MARKET order; callers reach this only via the selector,
    /// which filters to LIMIT orders.
    pub fn limit_price(&self) -> Price {
        self.price.expect("limit order must carry a price")
    }

    /// Whether the order is still matchable
    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open && !self.remaining_quantity.is_zero()
    }

    /// Check invariant: remaining within [0, quantity] and status consistent
    pub fn check_invariant(&self) -> bool {
        self.remaining_quantity <= self.quantity
            && (self.status == OrderStatus::Completed) == self.remaining_quantity.is_zero()
    }

    /// Apply a fill: decrease remaining, flip status at zero
    ///
    /// # Panics
    /// Panics if the fill exceeds the remaining quantity
    pub fn fill(&mut self, fill_quantity: Quantity) {
        assert!(
            fill_quantity <= self.remaining_quantity,
            "fill would exceed remaining quantity"
        );

        self.remaining_quantity = self.remaining_quantity - fill_quantity;
        if self.remaining_quantity.is_zero() {
            self.status = OrderStatus::Completed;
        }

        assert!(self.check_invariant(), "order invariant violated after fill");
    }
}
