use crate::app::ports::NotifierPort;
use crate::config::TelegramConfig;
use crate::error::{RelayError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error};

/// Telegram Bot API `sendMessage` client.
pub struct TelegramNotifier {
    client: reqwest::Client,
    // Holds the bot token; never log it.
    endpoint: String,
    chat_id: String,
}

/// The part of a Bot API reply needed to tell success from failure.
#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(client: reqwest::Client, config: &TelegramConfig) -> Self {
        Self {
            client,
            endpoint: send_message_url(&config.api_base, &config.token),
            chat_id: config.chat_id.clone(),
        }
    }

    /// Send `text` as an HTML message with link previews disabled.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("chat_id", self.chat_id.as_str()),
                ("text", text),
                ("disable_web_page_preview", "true"),
                ("parse_mode", "HTML"),
            ])
            .send()
            .await
            .map_err(|e| RelayError::Http(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RelayError::Http(e.without_url()))?;
        check_reply(status, &body)
    }
}

/// Delivery succeeded only if the status is 2xx and the body says `"ok": true`.
fn check_reply(status: StatusCode, body: &str) -> Result<()> {
    match serde_json::from_str::<ApiReply>(body).ok() {
        Some(ApiReply { ok: true, .. }) if status.is_success() => Ok(()),
        Some(ApiReply { description, .. }) => Err(RelayError::Api {
            message: format!(
                "sendMessage returned {}: {}",
                status,
                description.unwrap_or_else(|| "no description".to_string())
            ),
        }),
        None => Err(RelayError::Api {
            message: format!("sendMessage returned {} with an unreadable body", status),
        }),
    }
}

#[async_trait]
impl NotifierPort for TelegramNotifier {
    async fn send(&self, message: &str) -> bool {
        match self.send_message(message).await {
            Ok(()) => {
                debug!("Message delivered to chat {}", self.chat_id);
                true
            }
            Err(e) => {
                error!("Error while sending feed entry to Telegram: {}", e);
                false
            }
        }
    }
}

fn send_message_url(api_base: &str, token: &str) -> String {
    format!("{}/bot{}/sendMessage", api_base.trim_end_matches('/'), token)
}
