use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::signal::{Direction, Proposal};

/// The single in-flight trade awaiting resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTrade {
    pub id: Uuid,
    pub instrument: String,
    pub direction: Direction,
    pub confidence: u8,
    pub signal_time: DateTime<Utc>,
    pub trade_time: DateTime<Utc>,
    pub result_time: DateTime<Utc>,
}

impl PendingTrade {
    pub fn new(
        proposal: &Proposal,
        signal_time: DateTime<Utc>,
        trade_offset: TimeDelta,
        dwell: TimeDelta,
    ) -> Self {
        let trade_time = signal_time + trade_offset;
        Self {
            id: Uuid::new_v4(),
            instrument: proposal.instrument.clone(),
            direction: proposal.direction,
            confidence: proposal.confidence,
            signal_time,
            trade_time,
            result_time: trade_time + dwell,
        }
    }
}

/// Answer of an outcome resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Win,
    Loss,
    Unknown,
}

/// Terminal tag of a resolved cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Win,
    Loss,
    Failed,
    Error,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "WIN",
            Self::Loss => "LOSS",
            Self::Failed => "FAILED",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub trade: PendingTrade,
    pub status: TradeStatus,
    /// True when the status came from the fallback simulation instead of the resolver.
    pub simulated: bool,
}
