use crate::error::{Result, ScoutError};
use crate::notify::Notifier;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error};

/// Sends Markdown messages through the Telegram bot API
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
}

impl TelegramNotifier {
    pub fn new(api_base: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()> {
        debug!("Sending message to chat {}", chat_id);

        let response = self
            .client
            .get(self.send_message_url())
            .query(&[
                ("chat_id", chat_id),
                ("disable_web_page_preview", "true"),
                ("parse_mode", "Markdown"),
                ("text", text),
            ])
            .send()
            .await
            .map_err(|e| ScoutError::Delivery {
                chat_id: chat_id.to_string(),
                reason: e.without_url().to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!("Could not forward to telegram: {} {}", status, body);
            return Err(ScoutError::Delivery {
                chat_id: chat_id.to_string(),
                reason: format!("status {}: {}", status, body),
            });
        }

        Ok(())
    }
}
