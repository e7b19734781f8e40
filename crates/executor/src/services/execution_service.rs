use async_trait::async_trait;
use std::time::Duration;
use tokio::time;
use tracing::info;

use common::errors::CycleError;
use common::models::{Outcome, PendingTrade};
use common::traits::{OutcomeResolver, TradeExecutor};

/// Broker shim for paper trading. Accepts every trade and never knows the
/// real outcome, so resolution always ends in `Outcome::Unknown`.
#[derive(Debug, Clone)]
pub struct PaperBroker {
    latency: Duration,
    dwell: Duration,
}

impl PaperBroker {
    pub fn new(latency: Duration, dwell: Duration) -> Self {
        Self { latency, dwell }
    }
}

#[async_trait]
impl TradeExecutor for PaperBroker {
    async fn execute(&mut self, trade: &PendingTrade) -> Result<bool, CycleError> {
        info!(
            "Placing paper trade {}: {} {}",
            trade.id, trade.direction, trade.instrument
        );
        time::sleep(self.latency).await;
        Ok(true)
    }
}

#[async_trait]
impl OutcomeResolver for PaperBroker {
    async fn resolve(&mut self, trade: &PendingTrade) -> Result<Outcome, CycleError> {
        info!("Waiting {:?} for the result of {}", self.dwell, trade.id);
        time::sleep(self.dwell).await;
        Ok(Outcome::Unknown)
    }
}
