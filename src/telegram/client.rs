//! Telegram Bot API HTTP client

use super::types::ApiResponse;
use super::{TelegramError, Update};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Telegram Bot API base URL
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Slack added on top of the long-poll timeout for the HTTP request
const LONG_POLL_SLACK: Duration = Duration::from_secs(10);

/// Thin client over the Bot API
pub struct TelegramClient {
    base_url: String,
    token: String,
    client: Client,
    request_timeout: Duration,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

impl TelegramClient {
    /// Create a client for `token` against `base_url`
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, request_timeout: Duration) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into(),
            token: token.into(),
            client,
            request_timeout,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.base_url.trim_end_matches('/'),
            self.token,
            method
        )
    }

    async fn call<B, T>(
        &self,
        method: &'static str,
        body: &B,
        timeout: Duration,
    ) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } if status.is_success() => Ok(result),
            ApiResponse { description, .. } => Err(TelegramError::Rejected {
                method,
                description: description.unwrap_or_else(|| status.to_string()),
            }),
        }
    }

    /// Send a plain-text message
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), TelegramError> {
        let body = SendMessage {
            chat_id,
            text,
            disable_web_page_preview: true,
        };
        let _: serde_json::Value = self
            .call("sendMessage", &body, self.request_timeout)
            .await?;
        Ok(())
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>, TelegramError> {
        let body = GetUpdates {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: ["message"],
        };
        self.call("getUpdates", &body, timeout + LONG_POLL_SLACK)
            .await
    }
}
