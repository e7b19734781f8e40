//! Application configuration, read from the environment (and `.env` via dotenvy in `main`).
//!
//! Missing or blank keys fall back to defaults. Keys that are present but
//! malformed are rejected instead of silently replaced.

use chrono::{FixedOffset, TimeDelta};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_INSTRUMENTS: &[&str; 12] = &[
    "USD/BRL", "USD/COP", "USD/TRY", "USD/ARS", "USD/DZD", "USD/IDR", "USD/BDT", "USD/NGN",
    "USD/PKR", "USD/INR", "USD/MXN", "USD/PHP",
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("{key} must be a positive whole number of minutes, got {secs}s")]
    NotWholeMinutes { key: &'static str, secs: u64 },
    #[error("A cycle of {cycle_secs}s does not fit into a signal interval of {interval_secs}s")]
    CycleTooLong { cycle_secs: u64, interval_secs: u64 },
    #[error("Confidence threshold {0} is outside 0..=100")]
    ThresholdOutOfRange(u8),
    #[error("Display offset of {0}h is not a valid UTC offset")]
    InvalidOffset(i32),
    #[error("No trading pairs configured")]
    NoInstruments,
    #[error("TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set together")]
    PartialTelegram,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub token: String,
    /// Numeric chat id or `@channel` username.
    pub chat_id: String,
}

/// Timing of one signal cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub signal_interval: TimeDelta,
    pub trade_offset: TimeDelta,
    pub dwell: TimeDelta,
    pub confidence_threshold: u8,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            signal_interval: TimeDelta::minutes(2),
            trade_offset: TimeDelta::minutes(1),
            dwell: TimeDelta::seconds(30),
            confidence_threshold: 65,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram: Option<TelegramConfig>,
    pub instruments: Vec<String>,
    pub schedule: ScheduleConfig,
    pub restart_delay: Duration,
    pub execution_latency: Duration,
    pub display_offset: FixedOffset,
    pub balance_directions: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // `KEY=` in a .env file reads as an empty string.
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let telegram = match (lookup("TELEGRAM_BOT_TOKEN"), lookup("TELEGRAM_CHAT_ID")) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig { token, chat_id }),
            (None, None) => {
                warn!("Telegram is not configured. Messages will only be logged.");
                None
            }
            _ => return Err(ConfigError::PartialTelegram),
        };

        let instruments: Vec<String> = match lookup("TRADING_PAIRS") {
            Some(raw) => raw
                .split(',')
                .map(|p| p.trim().to_uppercase())
                .filter(|p| !p.is_empty())
                .collect(),
            None => DEFAULT_INSTRUMENTS.iter().map(|p| p.to_string()).collect(),
        };
        if instruments.is_empty() {
            return Err(ConfigError::NoInstruments);
        }

        let interval_secs = parse_var(&lookup, "SIGNAL_INTERVAL_SECS", 120u64)?;
        let offset_secs = parse_var(&lookup, "TRADE_OFFSET_SECS", 60u64)?;
        let dwell_secs = parse_var(&lookup, "DWELL_SECS", 30u64)?;
        let latency_ms = parse_var(&lookup, "EXECUTION_LATENCY_MS", 1000u64)?;
        let confidence_threshold = parse_var(&lookup, "CONFIDENCE_THRESHOLD", 65u8)?;

        for (key, secs) in [
            ("SIGNAL_INTERVAL_SECS", interval_secs),
            ("TRADE_OFFSET_SECS", offset_secs),
        ] {
            if secs == 0 || secs % 60 != 0 {
                return Err(ConfigError::NotWholeMinutes { key, secs });
            }
        }

        // The resolver waits for the execution latency and then the dwell, both
        // after the trade offset. All of it has to end before the next boundary.
        let cycle_secs = offset_secs
            .checked_add(dwell_secs)
            .and_then(|secs| secs.checked_add(latency_ms.div_ceil(1000)))
            .unwrap_or(u64::MAX);
        if cycle_secs >= interval_secs {
            return Err(ConfigError::CycleTooLong {
                cycle_secs,
                interval_secs,
            });
        }
        if confidence_threshold > 100 {
            return Err(ConfigError::ThresholdOutOfRange(confidence_threshold));
        }

        let offset_hours = parse_var(&lookup, "DISPLAY_UTC_OFFSET_HOURS", 3i32)?;
        let display_offset = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidOffset(offset_hours))?;

        Ok(Self {
            telegram,
            instruments,
            schedule: ScheduleConfig {
                signal_interval: seconds("SIGNAL_INTERVAL_SECS", interval_secs)?,
                trade_offset: seconds("TRADE_OFFSET_SECS", offset_secs)?,
                dwell: seconds("DWELL_SECS", dwell_secs)?,
                confidence_threshold,
            },
            restart_delay: Duration::from_secs(parse_var(&lookup, "RESTART_DELAY_SECS", 30u64)?),
            execution_latency: Duration::from_millis(latency_ms),
            display_offset,
            balance_directions: parse_var(&lookup, "BALANCE_DIRECTIONS", true)?,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

fn seconds(key: &'static str, secs: u64) -> Result<TimeDelta, ConfigError> {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .ok_or(ConfigError::InvalidValue {
            key,
            value: secs.to_string(),
        })
}
