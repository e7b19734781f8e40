use chrono::Utc;
use tracing::info;

use common::models::{Candle, Direction, Outcome, PendingTrade};
use common::traits::FallbackOutcome;

use super::candle_simulator::CandleSimulator;

/// Settles a trade against one simulated candle.
pub struct CandleFallback {
    simulator: CandleSimulator,
}

impl CandleFallback {
    pub fn new(simulator: CandleSimulator) -> Self {
        Self { simulator }
    }

    /// A flat candle loses for both directions.
    pub fn settle(direction: Direction, candle: &Candle) -> Outcome {
        let won = match direction {
            Direction::Buy => candle.is_bullish(),
            Direction::Sell => candle.is_bearish(),
        };
        if won { Outcome::Win } else { Outcome::Loss }
    }
}

impl FallbackOutcome for CandleFallback {
    fn decide(&mut self, trade: &PendingTrade) -> Outcome {
        let candle = self.simulator.next_candle(&trade.instrument, Utc::now());
        let outcome = Self::settle(trade.direction, &candle);
        info!(
            "Simulated {} {}: {:?} ({:.4} -> {:.4})",
            trade.direction, trade.instrument, outcome, candle.open, candle.close
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use common::models::{Indicators, Proposal};

    fn candle(open: f64, close: f64) -> Candle {
        Candle {
            instrument: "USD/MXN".to_string(),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            change_percent: (close - open) / open * 100.0,
        }
    }

    #[test]
    fn test_settle() {
        assert_eq!(CandleFallback::settle(Direction::Buy, &candle(1.0, 1.1)), Outcome::Win);
        assert_eq!(CandleFallback::settle(Direction::Buy, &candle(1.1, 1.0)), Outcome::Loss);
        assert_eq!(CandleFallback::settle(Direction::Sell, &candle(1.1, 1.0)), Outcome::Win);
        assert_eq!(CandleFallback::settle(Direction::Sell, &candle(1.0, 1.1)), Outcome::Loss);
        assert_eq!(CandleFallback::settle(Direction::Buy, &candle(1.0, 1.0)), Outcome::Loss);
        assert_eq!(CandleFallback::settle(Direction::Sell, &candle(1.0, 1.0)), Outcome::Loss);
    }

    #[test]
    fn test_decide_never_returns_unknown() {
        let proposal = Proposal {
            instrument: "USD/MXN".to_string(),
            direction: Direction::Buy,
            confidence: 70,
            indicators: Indicators::default(),
            method: "test".to_string(),
        };
        let trade = PendingTrade::new(
            &proposal,
            Utc::now(),
            TimeDelta::minutes(1),
            TimeDelta::seconds(30),
        );
        let mut fallback = CandleFallback::new(CandleSimulator::with_seed(3));

        for _ in 0..50 {
            assert_ne!(fallback.decide(&trade), Outcome::Unknown);
        }
    }
}
