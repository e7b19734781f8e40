use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::cmp::Ordering;
use ta::Next;
use ta::indicators::{BollingerBands, MovingAverageConvergenceDivergence, RelativeStrengthIndex};
use tracing::{debug, info};

use common::errors::CycleError;
use common::models::{Direction, Indicators, Proposal, Trend};
use common::traits::SignalGenerator;

use super::candle_simulator::CandleSimulator;
use crate::StrategyError;
use crate::balancer::DirectionBalancer;

const HISTORY_LEN: usize = 50;
// MACD(12, 26, 9) needs 26 + 9 closes before the histogram means anything.
const MIN_CANDLES: usize = 35;
const TREND_LOOKBACK: usize = 10;
const TREND_THRESHOLD: f64 = 0.001;
const BASE_CONFIDENCE: u8 = 60;
const MAX_CONFIDENCE: u8 = 85;
const METHOD: &str = "RSI + MACD + Bollinger Bands";

struct IndicatorState {
    rsi: RelativeStrengthIndex,
    macd: MovingAverageConvergenceDivergence,
    bb: BollingerBands,
}

impl IndicatorState {
    fn new() -> Result<Self, StrategyError> {
        let setup = |e: ta::errors::TaError| StrategyError::Indicator(format!("{:?}", e));
        Ok(Self {
            // Standard RSI(14)
            rsi: RelativeStrengthIndex::new(14).map_err(setup)?,
            // Standard MACD(12, 26, 9)
            macd: MovingAverageConvergenceDivergence::new(12, 26, 9).map_err(setup)?,
            // Standard BB(20, 2.0)
            bb: BollingerBands::new(20, 2.0).map_err(setup)?,
        })
    }
}

/// Last indicator values over a close series.
#[derive(Debug, Clone, PartialEq)]
pub struct Readings {
    pub close: f64,
    pub rsi: f64,
    pub macd: f64,
    pub histogram: f64,
    pub bb_lower: f64,
    pub bb_average: f64,
    pub bb_upper: f64,
    pub trend: Trend,
}

impl Readings {
    pub fn from_closes(closes: &[f64]) -> Result<Self, StrategyError> {
        if closes.len() < MIN_CANDLES {
            return Err(StrategyError::NotEnoughData {
                needed: MIN_CANDLES,
                got: closes.len(),
            });
        }

        let mut state = IndicatorState::new()?;
        let mut last = None;
        for &close in closes {
            let rsi = state.rsi.next(close);
            let macd = state.macd.next(close);
            let bb = state.bb.next(close);
            last = Some((close, rsi, macd, bb));
        }
        let (close, rsi, macd, bb) = last.ok_or(StrategyError::NotEnoughData {
            needed: MIN_CANDLES,
            got: 0,
        })?;

        let reference = closes[closes.len() - 1 - TREND_LOOKBACK];
        let drift = (close - reference) / reference;
        let trend = if drift > TREND_THRESHOLD {
            Trend::Up
        } else if drift < -TREND_THRESHOLD {
            Trend::Down
        } else {
            Trend::Sideways
        };

        Ok(Self {
            close,
            rsi,
            macd: macd.macd,
            histogram: macd.histogram,
            bb_lower: bb.lower,
            bb_average: bb.average,
            bb_upper: bb.upper,
            trend,
        })
    }

    pub fn bollinger_position(&self) -> f64 {
        let width = self.bb_upper - self.bb_lower;
        if width > 0.0 {
            (self.close - self.bb_lower) / width
        } else {
            0.5
        }
    }
}

/// Points-based vote over the readings. Returns (direction, confidence).
pub fn score(r: &Readings) -> (Direction, u8) {
    let mut buy: u8 = 0;
    let mut sell: u8 = 0;

    if r.rsi < 30.0 {
        buy += 2;
    } else if r.rsi > 70.0 {
        sell += 2;
    }

    if r.histogram > 0.0 {
        buy += 1;
    } else if r.histogram < 0.0 {
        sell += 1;
    }

    if r.macd > 0.0 {
        buy += 1;
    } else if r.macd < 0.0 {
        sell += 1;
    }

    if r.close < r.bb_lower {
        buy += 2;
    } else if r.close > r.bb_upper {
        sell += 2;
    } else if r.close > r.bb_average {
        buy += 1;
    } else if r.close < r.bb_average {
        sell += 1;
    }

    match r.trend {
        Trend::Up => buy += 1,
        Trend::Down => sell += 1,
        Trend::Sideways => {}
    }

    debug!("Points: buy {} | sell {}", buy, sell);

    let confidence = |diff: u8| BASE_CONFIDENCE.saturating_add(diff * 5).min(MAX_CONFIDENCE);
    match buy.cmp(&sell) {
        Ordering::Greater => (Direction::Buy, confidence(buy - sell)),
        Ordering::Less => (Direction::Sell, confidence(sell - buy)),
        Ordering::Equal if r.histogram >= 0.0 => (Direction::Buy, BASE_CONFIDENCE),
        Ordering::Equal => (Direction::Sell, BASE_CONFIDENCE),
    }
}

/// Signal generator running technical analysis over simulated candles.
pub struct StrategyService {
    instruments: Vec<String>,
    simulator: CandleSimulator,
    balancer: Option<DirectionBalancer>,
    rng: StdRng,
}

impl StrategyService {
    pub fn new(instruments: Vec<String>) -> Self {
        Self {
            instruments,
            simulator: CandleSimulator::new(),
            balancer: None,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(instruments: Vec<String>, seed: u64) -> Self {
        Self {
            instruments,
            simulator: CandleSimulator::with_seed(seed),
            balancer: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_balancer(mut self, balancer: DirectionBalancer) -> Self {
        self.balancer = Some(balancer);
        self
    }

    pub fn propose_at(&mut self, now: DateTime<Utc>) -> Result<Proposal, StrategyError> {
        if self.instruments.is_empty() {
            return Err(StrategyError::NoInstruments);
        }
        let instrument = self.instruments[self.rng.random_range(0..self.instruments.len())].clone();

        let closes: Vec<f64> = self
            .simulator
            .history(&instrument, HISTORY_LEN, now)
            .iter()
            .map(|c| c.close)
            .collect();
        let readings = Readings::from_closes(&closes)?;
        let (raw, confidence) = score(&readings);

        let direction = match self.balancer.as_mut() {
            Some(balancer) => balancer.apply(raw),
            None => raw,
        };
        if direction != raw {
            debug!("Balancer flipped {} to {} for {}", raw, direction, instrument);
        }

        info!(
            "Analysis for {}: {} (conf {}%, RSI={:.1} MACD hist={:.5} BB%={:.2} {})",
            instrument,
            direction,
            confidence,
            readings.rsi,
            readings.histogram,
            readings.bollinger_position(),
            readings.trend
        );

        Ok(Proposal {
            instrument,
            direction,
            confidence,
            indicators: Indicators {
                rsi: readings.rsi,
                macd_histogram: readings.histogram,
                bollinger_position: readings.bollinger_position(),
                trend: readings.trend,
            },
            method: METHOD.to_string(),
        })
    }
}

#[async_trait]
impl SignalGenerator for StrategyService {
    async fn propose(&mut self) -> Result<Proposal, CycleError> {
        Ok(self.propose_at(Utc::now())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral() -> Readings {
        Readings {
            close: 100.0,
            rsi: 50.0,
            macd: 0.0,
            histogram: 0.0,
            bb_lower: 98.0,
            bb_average: 100.0,
            bb_upper: 102.0,
            trend: Trend::Sideways,
        }
    }

    #[test]
    fn test_neutral_readings_tie_below_threshold() {
        assert_eq!(score(&neutral()), (Direction::Buy, BASE_CONFIDENCE));

        let bearish_tie = Readings {
            histogram: -0.1,
            macd: 0.1,
            ..neutral()
        };
        assert_eq!(score(&bearish_tie), (Direction::Sell, BASE_CONFIDENCE));
    }

    #[test]
    fn test_oversold_below_band_is_buy() {
        let readings = Readings {
            rsi: 25.0,
            close: 97.0,
            ..neutral()
        };
        // buy: rsi 2 + band 2
        assert_eq!(score(&readings), (Direction::Buy, 80));
    }

    #[test]
    fn test_confidence_is_capped() {
        let readings = Readings {
            rsi: 80.0,
            macd: -1.0,
            histogram: -0.5,
            close: 103.0,
            trend: Trend::Down,
            ..neutral()
        };
        // sell: 2 + 1 + 1 + 2 + 1 = 7 -> 95, capped
        assert_eq!(score(&readings), (Direction::Sell, MAX_CONFIDENCE));
    }

    #[test]
    fn test_short_history_is_rejected() {
        let closes = vec![1.0; MIN_CANDLES - 1];
        assert!(matches!(
            Readings::from_closes(&closes),
            Err(StrategyError::NotEnoughData { got, .. }) if got == MIN_CANDLES - 1
        ));
    }

    #[test]
    fn test_readings_follow_a_rally() {
        let closes: Vec<f64> = (0..HISTORY_LEN).map(|i| 100.0 * 1.002_f64.powi(i as i32)).collect();
        let readings = Readings::from_closes(&closes).unwrap();

        assert_eq!(readings.trend, Trend::Up);
        assert!(readings.macd > 0.0);
        assert!(readings.rsi > 70.0);
        assert_eq!(readings.close, *closes.last().unwrap());
    }

    #[tokio::test]
    async fn test_propose_uses_configured_instruments() {
        let instruments = vec!["USD/BRL".to_string(), "USD/INR".to_string()];
        let mut service = StrategyService::with_seed(instruments.clone(), 11)
            .with_balancer(DirectionBalancer::new());

        for _ in 0..10 {
            let proposal = service.propose().await.unwrap();
            assert!(instruments.contains(&proposal.instrument));
            assert!((BASE_CONFIDENCE..=MAX_CONFIDENCE).contains(&proposal.confidence));
            assert!((0.0..=100.0).contains(&proposal.indicators.rsi));
            assert_eq!(proposal.method, METHOD);
        }
    }

    #[test]
    fn test_no_instruments() {
        let mut service = StrategyService::with_seed(Vec::new(), 1);
        assert!(matches!(service.propose_at(Utc::now()), Err(StrategyError::NoInstruments)));
    }
}
