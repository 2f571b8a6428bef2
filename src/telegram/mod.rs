//! Telegram Bot API client
//!
//! Only the two methods the bot needs: `sendMessage` and `getUpdates`.

mod client;
mod types;

pub use client::{TelegramClient, TELEGRAM_API_URL};
pub use types::{Chat, Message, TelegramError, Update};
