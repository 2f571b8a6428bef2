//! Notification sinks
//!
//! Alerts are delivered through a [`Notifier`]; a failed delivery is
//! reported back so the monitor can keep the baseline where it was.

mod log;
mod telegram;

pub use self::log::LogNotifier;
pub use self::telegram::TelegramNotifier;

use crate::watch::Subscriber;
use async_trait::async_trait;
use thiserror::Error;

/// Delivery failure
#[derive(Debug, Error)]
#[error("Failed to deliver to {subscriber}: {reason}")]
pub struct DeliveryError {
    pub subscriber: Subscriber,
    pub reason: String,
}

/// Trait for notification sink implementations
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `text` to `subscriber`
    async fn notify(&self, subscriber: &Subscriber, text: &str) -> Result<(), DeliveryError>;
}
