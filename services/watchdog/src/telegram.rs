//! Telegram Bot API alert channel

use std::sync::Arc;

use crate::config::TelegramConfig;
use crate::document::ChatId;
use crate::io::HttpClient;
use crate::notifier::{Channel, ChannelReport, DeliveryRecord};
use crate::WatchdogError;

/// Sends the alert to every configured chat, one request per chat
pub struct TelegramChannel {
    config: TelegramConfig,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for TelegramChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramChannel")
            .field("config", &self.config)
            .finish()
    }
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    /// Send `text` to a single chat
    pub async fn send_message(&self, chat_id: &ChatId, text: &str) -> crate::Result<()> {
        let token = self.config.bot_token().ok_or_else(|| {
            WatchdogError::Config("Telegram bot token is not configured".to_string())
        })?;

        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_url.trim_end_matches('/'),
            token
        );
        let chat = chat_id.to_string();
        let params = [
            ("chat_id", chat.as_str()),
            ("text", text),
            ("parse_mode", "Markdown"),
        ];

        let response = self.http.post_form(&url, &params).await?;

        let body: serde_json::Value = serde_json::from_str(&response.body).map_err(|e| {
            WatchdogError::Messaging(format!(
                "Unreadable response for chat {} (status {}): {}",
                chat, response.status, e
            ))
        })?;

        if body.get("ok").and_then(serde_json::Value::as_bool) == Some(true) {
            Ok(())
        } else {
            Err(WatchdogError::Messaging(format!(
                "Telegram API rejected message for chat {}: {}",
                chat, response.body
            )))
        }
    }

    /// Send `text` to each chat in turn. A failed chat does not stop the rest.
    pub async fn broadcast(
        &self,
        enabled: bool,
        chat_ids: &[ChatId],
        text: &str,
    ) -> ChannelReport {
        if !enabled {
            tracing::warn!("Telegram alerts are disabled in the status document. Skipping Telegram.");
            return ChannelReport::skipped("disabled in status document");
        }
        if chat_ids.is_empty() {
            tracing::warn!("No Telegram chat_ids configured. Skipping Telegram.");
            return ChannelReport::skipped("no chat ids configured");
        }
        if self.config.bot_token().is_none() {
            tracing::warn!("Telegram bot token not set. Skipping Telegram.");
            return ChannelReport::skipped("bot token not configured");
        }

        let mut deliveries = Vec::with_capacity(chat_ids.len());
        for chat_id in chat_ids {
            let result = self.send_message(chat_id, text).await;
            match &result {
                Ok(()) => tracing::info!("Telegram sent successfully to chat_id: {}", chat_id),
                Err(e) => tracing::error!("Error sending Telegram to {}: {}", chat_id, e),
            }
            deliveries.push(DeliveryRecord::from_result(
                Channel::Telegram,
                chat_id.to_string(),
                &result,
            ));
        }

        ChannelReport::attempted(deliveries)
    }
}
