use chrono::Utc;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{debug, info};

use common::actors::{Actor, ActorType};
use common::config::AppConfig;
use common::logger;
use common::traits::Notifier;
use strategy::balancer::DirectionBalancer;
use strategy::services::{CandleFallback, CandleSimulator, StrategyService};

use crate::actors::supervisor::Supervisor;
use crate::scheduler::runner::SchedulerActor;
use crate::scheduler::{Collaborators, Scheduler};
use crate::services::execution_service::PaperBroker;
use crate::services::message_formatter::MessageFormatter;
use crate::services::telegram_service::{LogNotifier, TelegramService};

mod actors;
mod scheduler;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();
    debug!("System starting up...");

    let config = Arc::new(AppConfig::from_env()?);
    info!(
        "Trading {} pairs: signal every {}s, entry +{}s, dwell {}s, threshold {}%",
        config.instruments.len(),
        config.schedule.signal_interval.num_seconds(),
        config.schedule.trade_offset.num_seconds(),
        config.schedule.dwell.num_seconds(),
        config.schedule.confidence_threshold
    );

    let mut supervisor = Supervisor::new(config.restart_delay);

    let config_for_scheduler = config.clone();
    supervisor.register_actor(
        ActorType::SchedulerActor,
        Box::new(move || build_scheduler(&config_for_scheduler)),
    );

    tokio::select! {
        _ = supervisor.start() => {
            info!("Supervisor stopped.");
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Ctrl-C received, shutting down.");
        }
    }
    Ok(())
}

/// Builds a scheduler from scratch: Idle, no pending trade, zeroed stats.
fn build_scheduler(config: &AppConfig) -> anyhow::Result<Box<dyn Actor>> {
    let notifier: Arc<dyn Notifier> = match &config.telegram {
        Some(telegram) => Arc::new(TelegramService::new(telegram)?),
        None => Arc::new(LogNotifier),
    };

    let mut generator = StrategyService::new(config.instruments.clone());
    if config.balance_directions {
        generator = generator.with_balancer(DirectionBalancer::new());
    }

    let broker = PaperBroker::new(config.execution_latency, config.schedule.dwell.to_std()?);

    let scheduler = Scheduler::new(
        config.schedule.clone(),
        MessageFormatter::new(config.display_offset),
        Collaborators {
            generator: Box::new(generator),
            executor: Box::new(broker.clone()),
            resolver: Box::new(broker),
            fallback: Box::new(CandleFallback::new(CandleSimulator::new())),
            notifier,
        },
    );

    Ok(Box::new(SchedulerActor::new(scheduler, Utc::now())))
}
