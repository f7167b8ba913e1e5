//! Conservation and price-bound properties
//!
//! Random order flow through full passes: matching may move value between
//! wallets but can never create or destroy it, every execution price sits
//! inside the crossed limits, and a quiescent book yields nothing new.

use ledger::{OrderStore, TradeStore, WalletStore};
use matching_engine::{MatchingEngine, NullSink, TradeSink};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use types::ids::{AccountId, AssetId, MarketId};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

#[derive(Debug, Clone)]
struct OrderSpec {
    owner: usize,
    market: usize,
    is_buy: bool,
    price: u64,
    quantity: u64,
}

const OWNERS: usize = 4;
const MARKETS: [&str; 2] = ["BTC/KRW", "ETH/KRW"];

fn order_spec() -> impl Strategy<Value = OrderSpec> {
    (
        0..OWNERS,
        0..MARKETS.len(),
        any::<bool>(),
        1u64..=20,
        1u64..=10,
    )
        .prop_map(|(owner, market, is_buy, price, quantity)| OrderSpec {
            owner,
            market,
            is_buy,
            price,
            quantity,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_flow_conserves_every_asset(specs in prop::collection::vec(order_spec(), 1..40)) {
        let wallets = Arc::new(WalletStore::new());
        let orders = Arc::new(OrderStore::new());
        let trades = Arc::new(TradeStore::new());
        let engine = MatchingEngine::new(
            Arc::clone(&wallets),
            Arc::clone(&orders),
            Arc::clone(&trades),
            Arc::new(NullSink) as Arc<dyn TradeSink>,
        );

        // Fund every owner far beyond what the flow can spend so no
        // settlement aborts and the whole candidate set commits.
        let owners: Vec<AccountId> = (0..OWNERS).map(|_| AccountId::new()).collect();
        for owner in &owners {
            wallets.deposit(*owner, AssetId::new("KRW"), Decimal::from(100_000));
            wallets.deposit(*owner, AssetId::new("BTC"), Decimal::from(1_000));
            wallets.deposit(*owner, AssetId::new("ETH"), Decimal::from(1_000));
        }

        let assets = [AssetId::new("KRW"), AssetId::new("BTC"), AssetId::new("ETH")];
        let totals_before: Vec<Decimal> =
            assets.iter().map(|a| wallets.asset_total(a)).collect();

        for (at, spec) in specs.iter().enumerate() {
            let side = if spec.is_buy { Side::BUY } else { Side::SELL };
            orders.insert(Order::limit(
                owners[spec.owner],
                MarketId::from(MARKETS[spec.market]),
                side,
                Price::from_u64(spec.price),
                Quantity::from_u64(spec.quantity),
                at as i64,
            ));
        }

        engine.run_pass();

        // Conservation: per-asset totals are untouched by matching
        for (asset, before) in assets.iter().zip(totals_before) {
            prop_assert_eq!(wallets.asset_total(asset), before);
        }

        // Price bound: every trade inside the crossed limits
        for trade in trades.all() {
            let buy = orders.get(&trade.buy_order_id).unwrap();
            let sell = orders.get(&trade.sell_order_id).unwrap();
            prop_assert!(buy.limit_price() >= trade.price);
            prop_assert!(trade.price >= sell.limit_price());
            prop_assert_eq!(&trade.market, &buy.market);
            prop_assert_eq!(&buy.market, &sell.market);
        }

        // Completion invariant holds for every persisted order, filled or not
        for order in orders.all() {
            prop_assert!(order.check_invariant());
        }

        // The book is cross-free after a full pass: running again without
        // new orders settles nothing
        let settled = trades.len();
        engine.run_pass();
        prop_assert_eq!(trades.len(), settled);
    }
}
