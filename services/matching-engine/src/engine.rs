//! Matching engine orchestration
//!
//! `run_pass` is the single operation exposed to the external scheduler:
//! select books, emit candidates, settle them sequentially, publish events
//! after each commit. A pass mutex makes invocations single-flight — a call
//! while a pass is in flight is a no-op, so the same resting orders can
//! never be double-matched by overlapping passes.

use chrono::Utc;
use ledger::{OrderStore, TradeStore, WalletStore};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use types::ids::OrderId;

use crate::events::{TradeEvent, TradeSink};
use crate::matching::match_pair;
use crate::selector::select_books;
use crate::settlement::Settler;

/// Engine tuning knobs
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Soft bound on one pass, checked between settlements. Candidates past
    /// the deadline are deferred; the next scheduled pass re-derives them.
    pub pass_deadline: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pass_deadline: Duration::from_secs(30),
        }
    }
}

/// The matching engine, invoked on a fixed cadence by an external scheduler
pub struct MatchingEngine {
    wallets: Arc<WalletStore>,
    orders: Arc<OrderStore>,
    trades: Arc<TradeStore>,
    sink: Arc<dyn TradeSink>,
    config: EngineConfig,
    pass_guard: Mutex<()>,
}

impl MatchingEngine {
    pub fn new(
        wallets: Arc<WalletStore>,
        orders: Arc<OrderStore>,
        trades: Arc<TradeStore>,
        sink: Arc<dyn TradeSink>,
    ) -> Self {
        Self::with_config(wallets, orders, trades, sink, EngineConfig::default())
    }

    pub fn with_config(
        wallets: Arc<WalletStore>,
        orders: Arc<OrderStore>,
        trades: Arc<TradeStore>,
        sink: Arc<dyn TradeSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            wallets,
            orders,
            trades,
            sink,
            config,
            pass_guard: Mutex::new(()),
        }
    }

    /// Run one full matching pass over all open orders
    ///
    /// No-op when a pass is already in flight or when nothing crosses.
    /// A failed settlement is isolated: its orders are poisoned for the
    /// remainder of the pass (their in-memory remainders are stale) and
    /// every other candidate proceeds.
    pub fn run_pass(&self) {
        let Some(_pass) = self.pass_guard.try_lock() else {
            debug!("matching pass already in flight, skipping");
            return;
        };

        let started = Instant::now();
        let books = select_books(self.orders.open_limit_orders());
        if books.is_empty() {
            debug!("no open limit orders to match");
            return;
        }

        let settler = Settler::new(&self.wallets, &self.orders, &self.trades);
        let mut poisoned: HashSet<OrderId> = HashSet::new();
        let mut committed = 0usize;
        let mut aborted = 0usize;

        'pass: for (market, mut book) in books {
            for candidate in match_pair(&mut book) {
                if started.elapsed() >= self.config.pass_deadline {
                    warn!(
                        %market,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "pass deadline exceeded, deferring remaining candidates"
                    );
                    break 'pass;
                }
                if poisoned.contains(&candidate.buy_order_id)
                    || poisoned.contains(&candidate.sell_order_id)
                {
                    continue;
                }

                match settler.execute(&candidate, now_nanos()) {
                    Ok(trade) => {
                        committed += 1;
                        self.sink.publish(&TradeEvent::from(&trade));
                        debug!(
                            trade_id = %trade.trade_id,
                            market = %trade.market,
                            price = %trade.price,
                            quantity = %trade.quantity,
                            "trade committed"
                        );
                    }
                    Err(err) => {
                        aborted += 1;
                        poisoned.insert(candidate.buy_order_id);
                        poisoned.insert(candidate.sell_order_id);
                        warn!(
                            buy_order_id = %candidate.buy_order_id,
                            sell_order_id = %candidate.sell_order_id,
                            market = %candidate.market,
                            price = %candidate.price,
                            quantity = %candidate.quantity,
                            cost = %(candidate.price.as_decimal() * candidate.quantity.as_decimal()),
                            error = %err,
                            "settlement aborted"
                        );
                    }
                }
            }
        }

        debug!(committed, aborted, "matching pass finished");
    }
}

fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use rust_decimal::Decimal;
    use types::balance::BalanceKey;
    use types::ids::{AccountId, AssetId, MarketId};
    use types::numeric::{Price, Quantity};
    use types::order::{Order, OrderStatus, Side};

    struct Harness {
        wallets: Arc<WalletStore>,
        orders: Arc<OrderStore>,
        trades: Arc<TradeStore>,
        sink: Arc<MemorySink>,
        engine: MatchingEngine,
    }

    fn harness() -> Harness {
        let wallets = Arc::new(WalletStore::new());
        let orders = Arc::new(OrderStore::new());
        let trades = Arc::new(TradeStore::new());
        let sink = Arc::new(MemorySink::new());
        let engine = MatchingEngine::new(
            Arc::clone(&wallets),
            Arc::clone(&orders),
            Arc::clone(&trades),
            Arc::clone(&sink) as Arc<dyn TradeSink>,
        );
        Harness {
            wallets,
            orders,
            trades,
            sink,
            engine,
        }
    }

    fn fund(h: &Harness, owner: AccountId, asset: &str, amount: u64) {
        h.wallets
            .deposit(owner, AssetId::new(asset), Decimal::from(amount));
    }

    fn admit_limit(h: &Harness, owner: AccountId, side: Side, price: u64, qty: &str, at: i64) -> types::ids::OrderId {
        let order = Order::limit(
            owner,
            MarketId::from("BTC/KRW"),
            side,
            Price::from_u64(price),
            Quantity::from_str(qty).unwrap(),
            at,
        );
        let id = order.order_id;
        h.orders.insert(order);
        id
    }

    #[test]
    fn test_pass_with_empty_book_is_a_no_op() {
        let h = harness();
        h.engine.run_pass();
        assert!(h.trades.is_empty());
        assert!(h.sink.is_empty());
    }

    #[test]
    fn test_pass_commits_crossing_orders_and_emits() {
        let h = harness();
        let buyer = AccountId::new();
        let seller = AccountId::new();
        fund(&h, buyer, "KRW", 150);
        fund(&h, seller, "BTC", 2);

        let buy_id = admit_limit(&h, buyer, Side::BUY, 100, "1.5", 1);
        let sell_id = admit_limit(&h, seller, Side::SELL, 100, "1.5", 2);

        h.engine.run_pass();

        assert_eq!(h.trades.len(), 1);
        assert_eq!(h.sink.len(), 1);
        let events = h.sink.events();
        assert_eq!(events[0].buy_order_id, buy_id);
        assert_eq!(events[0].sell_order_id, sell_id);
        assert_eq!(
            h.orders.get(&buy_id).unwrap().status,
            OrderStatus::Completed
        );
    }

    #[test]
    fn test_non_crossing_pass_changes_nothing() {
        let h = harness();
        let buyer = AccountId::new();
        let seller = AccountId::new();
        fund(&h, buyer, "KRW", 1_000);
        fund(&h, seller, "BTC", 10);

        let buy_id = admit_limit(&h, buyer, Side::BUY, 50, "1", 1);
        let sell_id = admit_limit(&h, seller, Side::SELL, 100, "1", 2);

        h.engine.run_pass();

        assert!(h.trades.is_empty());
        assert!(h.sink.is_empty());
        assert_eq!(h.orders.get(&buy_id).unwrap().status, OrderStatus::Open);
        assert_eq!(h.orders.get(&sell_id).unwrap().status, OrderStatus::Open);
        assert_eq!(
            h.wallets
                .balance(&BalanceKey::new(buyer, AssetId::new("KRW"))),
            Decimal::from(1_000)
        );
    }

    #[test]
    fn test_aborted_settlement_poisons_only_its_orders() {
        let h = harness();
        let buyer1 = AccountId::new();
        let buyer2 = AccountId::new();
        let poor_seller = AccountId::new(); // never funded with BTC
        let seller2 = AccountId::new();
        fund(&h, buyer1, "KRW", 1_000);
        fund(&h, buyer2, "KRW", 1_000);
        fund(&h, seller2, "BTC", 10);

        // The earlier buy takes the best-priced (unfunded) sell and aborts;
        // the disjoint second candidate must still settle.
        let bad_sell = admit_limit(&h, poor_seller, Side::SELL, 95, "1", 1);
        let good_sell = admit_limit(&h, seller2, Side::SELL, 100, "1", 2);
        let buy1 = admit_limit(&h, buyer1, Side::BUY, 100, "1", 3);
        let buy2 = admit_limit(&h, buyer2, Side::BUY, 100, "1", 4);

        h.engine.run_pass();

        let trades = h.trades.all();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].buy_order_id, buy2);
        assert_eq!(trades[0].sell_order_id, good_sell);

        // The aborted candidate left its orders untouched and open
        assert_eq!(h.orders.get(&bad_sell).unwrap().status, OrderStatus::Open);
        assert_eq!(h.orders.get(&buy1).unwrap().status, OrderStatus::Open);
        assert_eq!(h.sink.len(), 1);
    }

    #[test]
    fn test_second_pass_after_quiescence_is_a_no_op() {
        let h = harness();
        let buyer = AccountId::new();
        let seller = AccountId::new();
        fund(&h, buyer, "KRW", 150);
        fund(&h, seller, "BTC", 2);
        admit_limit(&h, buyer, Side::BUY, 100, "1.5", 1);
        admit_limit(&h, seller, Side::SELL, 100, "1.5", 2);

        h.engine.run_pass();
        assert_eq!(h.trades.len(), 1);

        h.engine.run_pass();
        assert_eq!(h.trades.len(), 1, "no new trades without new orders");
    }
}
