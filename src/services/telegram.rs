// src/services/telegram.rs

//! Outbound chat notifications.

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Mutex;
use url::Url;

use crate::error::Result;
use crate::models::TelegramConfig;

/// Sink for text messages addressed to a chat, optionally within a topic.
///
/// Delivery is best effort: a send is attempted once and never retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: &str, thread_id: Option<&str>, text: &str) -> Result<()>;
}

/// Notifier calling the Telegram Bot API `sendMessage` method.
pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
}

impl TelegramNotifier {
    pub fn new(client: Client, config: &TelegramConfig) -> Self {
        let endpoint = format!(
            "{}/bot{}/sendMessage",
            config.api_url.trim_end_matches('/'),
            config.token
        );
        Self { client, endpoint }
    }

    /// Build the request URL with the message as query parameters.
    fn request_url(&self, chat_id: &str, thread_id: Option<&str>, text: &str) -> Result<Url> {
        let mut params = vec![("chat_id", chat_id), ("text", text)];
        if let Some(thread_id) = thread_id {
            params.push(("message_thread_id", thread_id));
        }
        Ok(Url::parse_with_params(&self.endpoint, &params)?)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: &str, thread_id: Option<&str>, text: &str) -> Result<()> {
        let url = self.request_url(chat_id, thread_id, text)?;
        // The URL embeds the bot token; keep it out of error messages.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.without_url())?;
        let status = response.status();

        if status.is_success() {
            log::debug!("Message delivered to chat {} ({})", chat_id, status);
        } else {
            let body = response.text().await.unwrap_or_default();
            log::warn!(
                "Telegram rejected message for chat {}: {} {}",
                chat_id,
                status,
                body
            );
        }
        Ok(())
    }
}

/// A message captured by [`MemoryNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: String,
    pub thread_id: Option<String>,
    pub text: String,
}

/// Notifier that keeps messages in memory instead of sending them.
///
/// Used for dry runs.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<SentMessage>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages captured so far, in send order.
    pub async fn messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, chat_id: &str, thread_id: Option<&str>, text: &str) -> Result<()> {
        self.sent.lock().await.push(SentMessage {
            chat_id: chat_id.to_string(),
            thread_id: thread_id.map(str::to_string),
            text: text.to_string(),
        });
        Ok(())
    }
}
