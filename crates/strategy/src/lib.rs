use common::errors::CycleError;
use thiserror::Error;

pub mod balancer;
pub mod services;

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Indicator setup failed: {0}")]
    Indicator(String),
    #[error("Not enough candles to analyze: needed {needed}, got {got}")]
    NotEnoughData { needed: usize, got: usize },
    #[error("No instruments to analyze")]
    NoInstruments,
}

impl From<StrategyError> for CycleError {
    fn from(value: StrategyError) -> Self {
        CycleError::Generation(value.to_string())
    }
}
