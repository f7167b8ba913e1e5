//! Order book selector
//!
//! Pure read: partitions the open-order snapshot per trading pair and orders
//! each side for price-time priority. Orders of different pairs never meet
//! in a match attempt.

use std::collections::BTreeMap;
use types::ids::MarketId;
use types::order::{Order, Side};

/// Both queues of one trading pair, ready for matching
///
/// Buys: price descending, then creation time ascending. Sells: price
/// ascending, then creation time ascending.
#[derive(Debug, Default)]
pub struct PairBook {
    pub buys: Vec<Order>,
    pub sells: Vec<Order>,
}

/// Partition open limit orders per market and sort each side
///
/// Callers are expected to hand in the eligible snapshot (open, limit,
/// remaining > 0); anything else is filtered out defensively here as well.
/// Creation-time ties fall back to the order id, which is itself
/// time-sortable, so queue order is fully deterministic.
pub fn select_books(orders: Vec<Order>) -> BTreeMap<MarketId, PairBook> {
    let mut books: BTreeMap<MarketId, PairBook> = BTreeMap::new();

    for order in orders {
        if !order.is_open() || order.price.is_none() {
            continue;
        }
        let book = books.entry(order.market.clone()).or_default();
        match order.side {
            Side::BUY => book.buys.push(order),
            Side::SELL => book.sells.push(order),
        }
    }

    for book in books.values_mut() {
        book.buys.sort_by(|a, b| {
            b.limit_price()
                .cmp(&a.limit_price())
                .then(a.created_at.cmp(&b.created_at))
                .then(a.order_id.cmp(&b.order_id))
        });
        book.sells.sort_by(|a, b| {
            a.limit_price()
                .cmp(&b.limit_price())
                .then(a.created_at.cmp(&b.created_at))
                .then(a.order_id.cmp(&b.order_id))
        });
    }

    books
}
