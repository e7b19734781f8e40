use chrono::{DateTime, TimeDelta, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::HashMap;
use tracing::debug;

use common::models::Candle;

/// Largest move of a single simulated candle, as a fraction of the open.
const MAX_CHANGE: f64 = 0.008;

/// Random-walk candle source for instruments that have no market feed.
/// Each instrument continues from its last simulated close.
pub struct CandleSimulator {
    rng: StdRng,
    last_prices: HashMap<String, f64>,
}

impl CandleSimulator {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            last_prices: HashMap::new(),
        }
    }

    /// Rough level for each supported pair; unknown pairs start at 1.0.
    pub fn base_price(instrument: &str) -> f64 {
        match instrument {
            "USD/BRL" => 5.50,
            "USD/EGP" => 47.80,
            "USD/TRY" => 32.70,
            "USD/ARS" => 905.0,
            "USD/COP" => 4000.0,
            "USD/DZD" => 135.0,
            "USD/IDR" => 16000.0,
            "USD/BDT" => 118.0,
            "USD/CAD" => 1.37,
            "USD/NGN" => 1475.0,
            "USD/PKR" => 280.0,
            "USD/INR" => 83.50,
            "USD/MXN" => 17.25,
            "USD/PHP" => 56.30,
            _ => 1.0,
        }
    }

    pub fn next_candle(&mut self, instrument: &str, timestamp: DateTime<Utc>) -> Candle {
        let open = self
            .last_prices
            .get(instrument)
            .copied()
            .unwrap_or_else(|| Self::base_price(instrument));

        let change = self.rng.random_range(-MAX_CHANGE..=MAX_CHANGE);
        let close = open * (1.0 + change);

        // Wicks extend up to 1.5x the body size past the body.
        let wick_range = (close - open).abs() * 1.5;
        let high = open.max(close) + self.rng.random_range(0.0..=wick_range);
        let low = open.min(close) - self.rng.random_range(0.0..=wick_range);

        self.last_prices.insert(instrument.to_string(), close);

        let candle = Candle {
            instrument: instrument.to_string(),
            open,
            high,
            low,
            close,
            timestamp,
            change_percent: change * 100.0,
        };
        debug!(
            "Candle {}: {:.4} -> {:.4} ({:.3}%)",
            instrument, open, close, candle.change_percent
        );
        candle
    }

    /// `count` consecutive one-minute candles, the last one stamped `end`.
    pub fn history(&mut self, instrument: &str, count: usize, end: DateTime<Utc>) -> Vec<Candle> {
        (0..count)
            .map(|i| {
                let minutes_back = (count - 1 - i) as i64;
                self.next_candle(instrument, end - TimeDelta::minutes(minutes_back))
            })
            .collect()
    }
}

impl Default for CandleSimulator {
    fn default() -> Self {
        Self::new()
    }
}
