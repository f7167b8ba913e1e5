//! Trade table
//!
//! Append-only; trades are created by settlement transactions and never
//! mutated afterwards.

use parking_lot::RwLock;
use types::ids::MarketId;
use types::trade::Trade;

/// In-memory append-only trade table
#[derive(Default)]
pub struct TradeStore {
    trades: RwLock<Vec<Trade>>,
}

impl TradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a committed trade
    pub fn record(&self, trade: Trade) {
        self.trades.write().push(trade);
    }

    /// All trades in commit order
    pub fn all(&self) -> Vec<Trade> {
        self.trades.read().clone()
    }

    /// Trades for one market, in commit order
    pub fn for_market(&self, market: &MarketId) -> Vec<Trade> {
        self.trades
            .read()
            .iter()
            .filter(|trade| &trade.market == market)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.trades.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.read().is_empty()
    }
}
