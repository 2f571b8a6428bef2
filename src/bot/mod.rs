//! Telegram chat front end
//!
//! Long-polls for messages and turns them into subscribe / unsubscribe
//! calls on the shared [`WatchService`](crate::watch::WatchService).

mod command;
mod handler;

pub use command::Command;
pub use handler::CommandHandler;

use crate::telegram::{TelegramClient, Update};
use crate::watch::Subscriber;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Polls Telegram and replies to each command in the chat it came from
pub struct Bot {
    client: Arc<TelegramClient>,
    handler: CommandHandler,
    poll_timeout: Duration,
}

impl Bot {
    pub fn new(client: Arc<TelegramClient>, handler: CommandHandler, poll_timeout: Duration) -> Self {
        Self {
            client,
            handler,
            poll_timeout,
        }
    }

    /// Poll until `shutdown` flips to true
    ///
    /// A failed poll backs off exponentially; a failure handling one update
    /// never stops the loop.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("Chat front end started");

        let mut offset = 0i64;
        let mut delay = INITIAL_BACKOFF;

        while !*shutdown.borrow() {
            let polled = tokio::select! {
                polled = self.client.get_updates(offset, self.poll_timeout) => polled,
                _ = shutdown.changed() => break,
            };

            match polled {
                Ok(updates) => {
                    delay = INITIAL_BACKOFF;
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        self.dispatch(update).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, retry_in = ?delay, "Polling Telegram failed");
                    tokio::select! {
                        _ = sleep(delay) => {}
                        _ = shutdown.changed() => break,
                    }
                    delay = (delay * 2).min(MAX_BACKOFF);
                }
            }
        }

        tracing::info!("Chat front end stopped");
    }

    async fn dispatch(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let Some(command) = message.text.as_deref().and_then(Command::parse) else {
            return;
        };

        let chat = Subscriber::from(message.chat.id);
        tracing::debug!(%chat, ?command, "Handling command");

        let reply = self.handler.handle(&chat, command).await;
        if let Err(e) = self.client.send_message(chat.as_str(), &reply).await {
            tracing::warn!(%chat, error = %e, "Failed to reply");
        }
    }
}
