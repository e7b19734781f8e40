pub mod candle_simulator;
pub mod outcome_fallback;
pub mod strategy_service;

pub use candle_simulator::CandleSimulator;
pub use outcome_fallback::CandleFallback;
pub use strategy_service::StrategyService;
