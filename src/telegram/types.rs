//! Telegram Bot API types

use serde::Deserialize;
use thiserror::Error;

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

/// Incoming update from `getUpdates`
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

/// A chat message
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

/// Chat the message belongs to
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Telegram API errors
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Request never got an answer
    #[error("Telegram request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Bot API answered with `ok: false` or a non-2xx status
    #[error("Telegram API rejected {method}: {description}")]
    Rejected {
        method: &'static str,
        description: String,
    },
}
