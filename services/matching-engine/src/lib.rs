//! Matching Engine Service
//!
//! Continuous limit-order matching and settlement over the ledger stores.
//! An external scheduler invokes [`MatchingEngine::run_pass`] on a fixed
//! cadence; one pass selects the open books per trading pair, emits crossing
//! candidates in price-time priority order and commits each through an
//! atomic settlement transaction, publishing a trade event after every
//! commit.
//!
//! **Key invariants:**
//! - Price-time priority strictly enforced; execution at the resting
//!   sell order's price
//! - Value is conserved: settlement only moves balances, never creates
//!   or destroys them
//! - Per-trade failure isolation: one aborted settlement never aborts
//!   the pass
//! - Passes are single-flight; overlapping invocations are no-ops

pub mod engine;
pub mod events;
pub mod matching;
pub mod selector;
pub mod settlement;

pub use engine::{EngineConfig, MatchingEngine};
pub use events::{MemorySink, NullSink, TradeEvent, TradeSink};
