pub mod candle;
pub mod signal;
pub mod stats;
pub mod trade;

pub use candle::Candle;
pub use signal::{Direction, Indicators, Proposal, Trend};
pub use stats::RunningStats;
pub use trade::{Outcome, PendingTrade, TradeResult, TradeStatus};
