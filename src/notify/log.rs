//! Dry-run sink that writes alerts to the log

use super::{DeliveryError, Notifier};
use crate::watch::Subscriber;
use async_trait::async_trait;

/// Logs every alert and always succeeds
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, subscriber: &Subscriber, text: &str) -> Result<(), DeliveryError> {
        tracing::info!(%subscriber, text, "Alert");
        Ok(())
    }
}
