//! Order table
//!
//! Orders arrive from the external intake flow already validated; the engine
//! only reads open limit orders and persists fill decrements.

use parking_lot::RwLock;
use std::collections::HashMap;
use types::errors::SettlementError;
use types::ids::OrderId;
use types::numeric::Quantity;
use types::order::{Order, OrderType};

/// In-memory order table keyed by order id
#[derive(Default)]
pub struct OrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit an order (intake flow)
    pub fn insert(&self, order: Order) {
        self.orders.write().insert(order.order_id, order);
    }

    pub fn get(&self, order_id: &OrderId) -> Option<Order> {
        self.orders.read().get(order_id).cloned()
    }

    /// Snapshot of the whole table, for audits
    pub fn all(&self) -> Vec<Order> {
        self.orders.read().values().cloned().collect()
    }

    /// Snapshot of every order eligible for matching: open, limit,
    /// remaining > 0
    pub fn open_limit_orders(&self) -> Vec<Order> {
        self.orders
            .read()
            .values()
            .filter(|order| order.order_type == OrderType::LIMIT && order.is_open())
            .cloned()
            .collect()
    }

    /// Persist a fill: decrement remaining, flip status at zero
    pub fn apply_fill(
        &self,
        order_id: &OrderId,
        quantity: Quantity,
    ) -> Result<Order, SettlementError> {
        let mut orders = self.orders.write();
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| SettlementError::OrderNotFound {
                order_id: order_id.to_string(),
            })?;
        order.fill(quantity);
        Ok(order.clone())
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }
}
