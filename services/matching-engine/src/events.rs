//! Trade event emission
//!
//! After a settlement commits — and only then — a `TradeEvent` goes to the
//! sink for downstream broadcast. The payload carries order ids but no
//! owner ids, per the notifier contract. The sink trait decouples the core
//! from any particular transport.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use types::ids::{MarketId, OrderId, TradeId};
use types::numeric::{Price, Quantity};
use types::trade::Trade;

/// Wire-shaped payload for one committed trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub trade_id: TradeId,
    pub market: MarketId,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
    pub executed_at: i64,
}

impl From<&Trade> for TradeEvent {
    fn from(trade: &Trade) -> Self {
        Self {
            trade_id: trade.trade_id,
            market: trade.market.clone(),
            buy_order_id: trade.buy_order_id,
            sell_order_id: trade.sell_order_id,
            price: trade.price,
            quantity: trade.quantity,
            executed_at: trade.executed_at,
        }
    }
}

/// Downstream consumer of committed trades
///
/// Called exactly once per committed trade, after the settlement commit,
/// never before and never for an aborted settlement.
pub trait TradeSink: Send + Sync {
    fn publish(&self, event: &TradeEvent);
}

/// Sink that drops every event
#[derive(Debug, Default)]
pub struct NullSink;

impl TradeSink for NullSink {
    fn publish(&self, _event: &TradeEvent) {}
}

/// Buffering sink for tests and in-process wiring
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<TradeEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TradeEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl TradeSink for MemorySink {
    fn publish(&self, event: &TradeEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::AccountId;

    fn sample_trade() -> Trade {
        Trade::new(
            MarketId::from("BTC/KRW"),
            OrderId::new(),
            OrderId::new(),
            AccountId::new(),
            AccountId::new(),
            Price::from_u64(100),
            Quantity::from_str("1.5").unwrap(),
            1708123456789000000,
        )
    }

    #[test]
    fn test_event_redacts_owner_ids() {
        let trade = sample_trade();
        let event = TradeEvent::from(&trade);
        let json = serde_json::to_string(&event).unwrap();

        assert!(!json.contains(&trade.buyer_id.to_string()));
        assert!(!json.contains(&trade.seller_id.to_string()));
        assert!(json.contains(&trade.buy_order_id.to_string()));
    }

    #[test]
    fn test_memory_sink_buffers_in_order() {
        let sink = MemorySink::new();
        let t1 = sample_trade();
        let t2 = sample_trade();

        sink.publish(&TradeEvent::from(&t1));
        sink.publish(&TradeEvent::from(&t2));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].trade_id, t1.trade_id);
        assert_eq!(events[1].trade_id, t2.trade_id);
    }

    #[test]
    fn test_event_serialization_round_trip() {
        let event = TradeEvent::from(&sample_trade());
        let json = serde_json::to_string(&event).unwrap();
        let back: TradeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
