use chrono::{DateTime, FixedOffset, Utc};

use common::models::{PendingTrade, Proposal, RunningStats, TradeResult};

pub const DISCLAIMER: &str =
    "Paper trading simulation. No real orders are placed. Not financial advice.";

/// Renders the texts handed to the notifier. Times are shown in `offset`.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    offset: FixedOffset,
}

impl MessageFormatter {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    fn time(&self, t: DateTime<Utc>) -> String {
        format!("{} (UTC{})", t.with_timezone(&self.offset).format("%H:%M:%S"), self.offset)
    }

    pub fn signal(&self, proposal: &Proposal, trade: &PendingTrade) -> String {
        let dwell = (trade.result_time - trade.trade_time).num_seconds();
        let ind = &proposal.indicators;
        format!(
            "PAPER SIGNAL\n\n\
             Pair: {}\n\
             Direction: {}\n\
             Confidence: {}%\n\
             Entry: {}\n\
             Expiry: {} ({}s)\n\n\
             RSI: {:.1}\n\
             MACD histogram: {:.5}\n\
             Bollinger position: {:.0}%\n\
             Trend: {}\n\
             Method: {}\n\n\
             {}",
            trade.instrument,
            trade.direction,
            trade.confidence,
            self.time(trade.trade_time),
            self.time(trade.result_time),
            dwell,
            ind.rsi,
            ind.macd_histogram,
            ind.bollinger_position * 100.0,
            ind.trend,
            proposal.method,
            DISCLAIMER
        )
    }

    pub fn skipped(&self, proposal: &Proposal, threshold: u8, at: DateTime<Utc>) -> String {
        format!(
            "SIGNAL SKIPPED\n\n\
             Pair: {}\n\
             Direction: {}\n\
             Confidence: {}% (below {}%)\n\
             Time: {}\n\n\
             {}",
            proposal.instrument,
            proposal.direction,
            proposal.confidence,
            threshold,
            self.time(at),
            DISCLAIMER
        )
    }

    pub fn result(&self, result: &TradeResult, stats: &RunningStats, at: DateTime<Utc>) -> String {
        let status = if result.simulated {
            format!("{} (SIMULATED)", result.status)
        } else {
            result.status.to_string()
        };
        format!(
            "PAPER RESULT: {}\n\n\
             Pair: {}\n\
             Direction: {}\n\
             Time: {}\n\n\
             Session: {}W / {}L ({:.1}%), failed {}, errors {}, skipped {}\n\n\
             {}",
            status,
            result.trade.instrument,
            result.trade.direction,
            self.time(at),
            stats.wins,
            stats.losses,
            stats.win_rate(),
            stats.failed,
            stats.errors,
            stats.skipped,
            DISCLAIMER
        )
    }
}
