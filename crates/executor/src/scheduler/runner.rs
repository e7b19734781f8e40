use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::{sync::mpsc, time};
use tracing::{debug, info};

use common::actors::{Actor, ActorType, ControlMessage};
use common::models::TradeStatus;

use super::{CycleEvent, CycleState, Scheduler};

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send>;

/// Drives a [`Scheduler`] off the wall clock: sleeps until the next boundary
/// that has work, ticks once, repeats.
pub struct SchedulerActor {
    scheduler: Scheduler,
    state: CycleState,
    clock: Clock,
}

impl SchedulerActor {
    pub fn new(scheduler: Scheduler, started_at: DateTime<Utc>) -> Self {
        Self {
            scheduler,
            state: CycleState::new(started_at),
            clock: Box::new(Utc::now),
        }
    }

    /// Replaces `Utc::now` as the source of the current time.
    #[cfg(test)]
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Fn() -> DateTime<Utc> + Send + 'static,
    {
        self.clock = Box::new(clock);
        self
    }
}

#[async_trait]
impl Actor for SchedulerActor {
    fn name(&self) -> ActorType {
        ActorType::SchedulerActor
    }

    async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        supervisor_tx.send(ControlMessage::Started(self.name())).await?;
        info!("First signal boundary at {}", self.state.next_signal_at);

        loop {
            let now = (self.clock)();
            let wake_at = self.scheduler.next_wakeup(&self.state, now);
            let wait = (wake_at - now).to_std().unwrap_or_default();
            debug!("Sleeping {:?} until {}", wait, wake_at);
            time::sleep(wait).await;

            let event = self.scheduler.tick(&mut self.state, (self.clock)()).await;
            if let CycleEvent::Resolved(result) = &event {
                if matches!(result.status, TradeStatus::Failed | TradeStatus::Error) {
                    supervisor_tx
                        .send(ControlMessage::Error(
                            self.name(),
                            format!("Trade {} ended as {}", result.trade.id, result.status),
                        ))
                        .await?;
                }
            }
        }
    }
}
