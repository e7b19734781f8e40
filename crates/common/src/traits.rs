use async_trait::async_trait;

use crate::errors::CycleError;
use crate::models::{Outcome, PendingTrade, Proposal};

/// Produces a trade proposal on demand.
#[async_trait]
pub trait SignalGenerator: Send {
    async fn propose(&mut self) -> Result<Proposal, CycleError>;
}

/// Places a pending trade. `Ok(false)` means the broker refused it.
#[async_trait]
pub trait TradeExecutor: Send {
    async fn execute(&mut self, trade: &PendingTrade) -> Result<bool, CycleError>;
}

/// Reports how a placed trade ended. May block for the dwell time.
#[async_trait]
pub trait OutcomeResolver: Send {
    async fn resolve(&mut self, trade: &PendingTrade) -> Result<Outcome, CycleError>;
}

/// Settles a trade the resolver could not answer for. Must return `Win` or `Loss`.
pub trait FallbackOutcome: Send {
    fn decide(&mut self, trade: &PendingTrade) -> Outcome;
}

/// Delivers text to a destination channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, text: &str) -> bool;
}
