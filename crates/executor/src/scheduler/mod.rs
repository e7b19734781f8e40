//! Clock-aligned signal scheduler.
//!
//! A cycle runs Idle -> Signaled -> Pending -> Resolving -> Idle. The scheduler
//! owns the collaborators; everything that changes between ticks lives in
//! [`CycleState`], which the caller passes to every [`Scheduler::tick`].

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use common::config::ScheduleConfig;
use common::models::{Outcome, PendingTrade, Proposal, RunningStats, TradeResult, TradeStatus};
use common::traits::{FallbackOutcome, Notifier, OutcomeResolver, SignalGenerator, TradeExecutor};

use crate::services::message_formatter::MessageFormatter;

pub mod clock;
pub mod runner;

/// Mutable state of one scheduler run. Dropping it is the only way to reset the stats.
#[derive(Debug, Clone)]
pub struct CycleState {
    pub pending: Option<PendingTrade>,
    pub stats: RunningStats,
    pub next_signal_at: DateTime<Utc>,
    last_handled: Option<DateTime<Utc>>,
}

impl CycleState {
    /// The first signal boundary is the next full minute after `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            pending: None,
            stats: RunningStats::default(),
            next_signal_at: clock::truncate_to_minute(now) + TimeDelta::minutes(1),
            last_handled: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleEvent {
    /// Not a boundary, already handled, or nothing due.
    Idle,
    /// The generator failed; no trade this cycle.
    NoProposal,
    /// Confidence was below the threshold.
    Skipped(Proposal),
    Signaled(PendingTrade),
    /// A signal boundary arrived while a trade was still pending.
    Ignored,
    Resolved(TradeResult),
}

pub struct Collaborators {
    pub generator: Box<dyn SignalGenerator>,
    pub executor: Box<dyn TradeExecutor>,
    pub resolver: Box<dyn OutcomeResolver>,
    pub fallback: Box<dyn FallbackOutcome>,
    pub notifier: Arc<dyn Notifier>,
}

pub struct Scheduler {
    config: ScheduleConfig,
    formatter: MessageFormatter,
    generator: Box<dyn SignalGenerator>,
    executor: Box<dyn TradeExecutor>,
    resolver: Box<dyn OutcomeResolver>,
    fallback: Box<dyn FallbackOutcome>,
    notifier: Arc<dyn Notifier>,
}

impl Scheduler {
    pub fn new(config: ScheduleConfig, formatter: MessageFormatter, parts: Collaborators) -> Self {
        Self {
            config,
            formatter,
            generator: parts.generator,
            executor: parts.executor,
            resolver: parts.resolver,
            fallback: parts.fallback,
            notifier: parts.notifier,
        }
    }

    /// Instant the runner should wake up for the next tick. Never earlier than
    /// the next unhandled minute boundary, so overdue work is picked up on `:00`.
    pub fn next_wakeup(&self, state: &CycleState, now: DateTime<Utc>) -> DateTime<Utc> {
        let due = match &state.pending {
            Some(trade) => trade.trade_time.min(state.next_signal_at),
            None => state.next_signal_at,
        };

        let mut earliest = clock::ceil_to_minute(clock::truncate_to_second(now));
        if state.last_handled == Some(earliest) {
            earliest += TimeDelta::minutes(1);
        }
        due.max(earliest)
    }

    pub async fn tick(&mut self, state: &mut CycleState, now: DateTime<Utc>) -> CycleEvent {
        let now = clock::truncate_to_second(now);
        if !clock::is_minute_boundary(now) || state.last_handled == Some(now) {
            return CycleEvent::Idle;
        }
        state.last_handled = Some(now);

        if state.pending.as_ref().is_some_and(|t| now >= t.trade_time) {
            return self.resolve(state).await;
        }

        if now < state.next_signal_at {
            return CycleEvent::Idle;
        }

        let boundary = clock::truncate_to_minute(now);
        state.next_signal_at = boundary + self.config.signal_interval;

        if let Some(trade) = &state.pending {
            warn!(
                "Signal boundary {} reached while {} is pending; ignoring it",
                boundary, trade.id
            );
            return CycleEvent::Ignored;
        }

        self.signal(state, boundary).await
    }

    async fn signal(&mut self, state: &mut CycleState, boundary: DateTime<Utc>) -> CycleEvent {
        let proposal = match self.generator.propose().await {
            Ok(proposal) => proposal,
            Err(e) => {
                error!("No trade this cycle: {}", e);
                return CycleEvent::NoProposal;
            }
        };

        let threshold = self.config.confidence_threshold;
        if proposal.confidence < threshold {
            info!(
                "Skipping {} {} at {}% (threshold {}%)",
                proposal.direction, proposal.instrument, proposal.confidence, threshold
            );
            state.stats.record_skipped();
            self.notify(self.formatter.skipped(&proposal, threshold, boundary))
                .await;
            return CycleEvent::Skipped(proposal);
        }

        let trade = PendingTrade::new(
            &proposal,
            boundary,
            self.config.trade_offset,
            self.config.dwell,
        );
        info!(
            "Signal {}: {} {} at {}%, entry {}, result {}",
            trade.id,
            trade.direction,
            trade.instrument,
            trade.confidence,
            trade.trade_time,
            trade.result_time
        );
        state.stats.record_signal(trade.direction);
        state.pending = Some(trade.clone());
        self.notify(self.formatter.signal(&proposal, &trade)).await;

        CycleEvent::Signaled(trade)
    }

    async fn resolve(&mut self, state: &mut CycleState) -> CycleEvent {
        // Taken out before anything can fail, so the state is Idle whatever happens next.
        let Some(trade) = state.pending.take() else {
            return CycleEvent::Idle;
        };

        let result = self.settle(trade).await;
        state.stats.record(result.status);
        info!(
            "Trade {} finished: {}{}",
            result.trade.id,
            result.status,
            if result.simulated { " (simulated)" } else { "" }
        );
        match serde_json::to_string(&state.stats) {
            Ok(snapshot) => debug!("Stats: {}", snapshot),
            Err(e) => warn!("Could not serialize stats: {}", e),
        }

        self.notify(self.formatter.result(&result, &state.stats, Utc::now()))
            .await;
        CycleEvent::Resolved(result)
    }

    async fn settle(&mut self, trade: PendingTrade) -> TradeResult {
        let finish = |trade, status, simulated| TradeResult {
            trade,
            status,
            simulated,
        };

        match self.executor.execute(&trade).await {
            Ok(true) => {}
            Ok(false) => {
                error!("Broker refused trade {}", trade.id);
                return finish(trade, TradeStatus::Failed, false);
            }
            Err(e) => {
                error!("{}", e);
                return finish(trade, TradeStatus::Failed, false);
            }
        }

        match self.resolver.resolve(&trade).await {
            Ok(Outcome::Win) => finish(trade, TradeStatus::Win, false),
            Ok(Outcome::Loss) => finish(trade, TradeStatus::Loss, false),
            Ok(Outcome::Unknown) => {
                warn!("No result for {}; simulating the outcome", trade.id);
                match self.fallback.decide(&trade) {
                    Outcome::Win => finish(trade, TradeStatus::Win, true),
                    Outcome::Loss => finish(trade, TradeStatus::Loss, true),
                    Outcome::Unknown => {
                        error!("Fallback could not settle {}", trade.id);
                        finish(trade, TradeStatus::Error, false)
                    }
                }
            }
            Err(e) => {
                error!("{}", e);
                finish(trade, TradeStatus::Error, false)
            }
        }
    }

    async fn notify(&mut self, text: String) {
        if !self.notifier.deliver(&text).await {
            warn!("Notification was not delivered");
        }
    }
}
