use serde::{Deserialize, Serialize};

use super::signal::Direction;
use super::trade::TradeStatus;

/// Counters for one run of the scheduler. Only ever incremented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningStats {
    pub total: u64,
    pub wins: u64,
    pub losses: u64,
    pub skipped: u64,
    pub failed: u64,
    pub errors: u64,
    pub buy_signals: u64,
    pub sell_signals: u64,
}

impl RunningStats {
    pub fn record_signal(&mut self, direction: Direction) {
        match direction {
            Direction::Buy => self.buy_signals += 1,
            Direction::Sell => self.sell_signals += 1,
        }
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// FAILED and ERROR cycles are tracked apart so that `total == wins + losses` holds.
    pub fn record(&mut self, status: TradeStatus) {
        match status {
            TradeStatus::Win => {
                self.total += 1;
                self.wins += 1;
            }
            TradeStatus::Loss => {
                self.total += 1;
                self.losses += 1;
            }
            TradeStatus::Failed => self.failed += 1,
            TradeStatus::Error => self.errors += 1,
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.wins as f64 / self.total as f64 * 100.0
    }
}
