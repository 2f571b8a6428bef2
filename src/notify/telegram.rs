//! Telegram chat sink

use super::{DeliveryError, Notifier};
use crate::telegram::TelegramClient;
use crate::watch::Subscriber;
use async_trait::async_trait;
use std::sync::Arc;

/// Sends alerts with `sendMessage` to the subscriber's chat id
pub struct TelegramNotifier {
    client: Arc<TelegramClient>,
}

impl TelegramNotifier {
    pub fn new(client: Arc<TelegramClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, subscriber: &Subscriber, text: &str) -> Result<(), DeliveryError> {
        self.client
            .send_message(subscriber.as_str(), text)
            .await
            .map_err(|e| DeliveryError {
                subscriber: subscriber.clone(),
                reason: e.to_string(),
            })
    }
}
