use anyhow::bail;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::Recipient;
use tracing::{debug, error, info};

use common::config::TelegramConfig;
use common::traits::Notifier;

pub struct TelegramService {
    bot: Bot,
    recipient: Recipient,
}

impl TelegramService {
    pub fn new(config: &TelegramConfig) -> anyhow::Result<Self> {
        let Some(recipient) = parse_recipient(&config.chat_id) else {
            bail!(
                "TELEGRAM_CHAT_ID must be a number or an @channel name, got {:?}",
                config.chat_id
            );
        };
        info!("Telegram notifications go to {:?}", recipient);

        Ok(Self {
            bot: Bot::new(&config.token),
            recipient,
        })
    }
}

fn parse_recipient(chat_id: &str) -> Option<Recipient> {
    let chat_id = chat_id.trim();
    if let Ok(id) = chat_id.parse::<i64>() {
        return Some(Recipient::Id(ChatId(id)));
    }
    if chat_id.len() > 1 && chat_id.starts_with('@') {
        return Some(Recipient::ChannelUsername(chat_id.to_string()));
    }
    None
}

#[async_trait]
impl Notifier for TelegramService {
    async fn deliver(&self, text: &str) -> bool {
        // Log the error but don't crash; the scheduler carries on either way.
        match self.bot.send_message(self.recipient.clone(), text).await {
            Ok(_) => {
                debug!("Telegram message delivered");
                true
            }
            Err(e) => {
                error!("Failed to send Telegram message: {}", e);
                false
            }
        }
    }
}

/// Used when no Telegram credentials are configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, text: &str) -> bool {
        info!("Notification:\n{}", text);
        true
    }
}
