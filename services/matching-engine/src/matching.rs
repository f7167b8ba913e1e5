//! Matching algorithm
//!
//! Continuous double auction over the selector's queues: walk buys in
//! price-time order, cross each against sells in price-time order, trade at
//! the resting sell's price. Emits candidates only; persistence happens in
//! the settlement transaction.

use serde::{Deserialize, Serialize};
use types::ids::{AccountId, MarketId, OrderId};
use types::numeric::{Price, Quantity};

use crate::selector::PairBook;

/// Whether a bid and an ask cross at the given limit prices
pub fn crosses(buy_price: Price, sell_price: Price) -> bool {
    buy_price >= sell_price
}

/// One matched (buy, sell, quantity, price) tuple awaiting settlement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub market: MarketId,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub buyer_id: AccountId,
    pub seller_id: AccountId,
    /// min(buy.remaining, sell.remaining) at emission time
    pub quantity: Quantity,
    /// The resting sell order's limit price
    pub price: Price,
}

/// Emit all crossing candidates for one trading pair
///
/// Remaining quantities are decremented in place so scanning can continue
/// within the pass; the persisted decrement happens at settlement. Sells
/// ascend in price, so the first non-crossing sell ends the inner scan for
/// that buy — no later sell can cross either.
pub fn match_pair(book: &mut PairBook) -> Vec<MatchCandidate> {
    let mut candidates = Vec::new();

    for buy in book.buys.iter_mut() {
        for sell in book.sells.iter_mut() {
            if sell.remaining_quantity.is_zero() {
                continue;
            }
            if !crosses(buy.limit_price(), sell.limit_price()) {
                break;
            }

            let quantity = buy.remaining_quantity.min(sell.remaining_quantity);
            candidates.push(MatchCandidate {
                market: buy.market.clone(),
                buy_order_id: buy.order_id,
                sell_order_id: sell.order_id,
                buyer_id: buy.owner_id,
                seller_id: sell.owner_id,
                quantity,
                price: sell.limit_price(),
            });

            buy.fill(quantity);
            sell.fill(quantity);

            if buy.remaining_quantity.is_zero() {
                break;
            }
        }
    }

    candidates
}
