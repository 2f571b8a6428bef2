//! Chat command handling

use super::Command;
use crate::alert::{format_price, format_subscribed};
use crate::price::{MarketCatalog, PriceError};
use crate::watch::{AssetId, SubscribeError, Subscriber, WatchService};
use num_format::{Locale, ToFormattedString};
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const TOP_CATEGORY: &str = "meme-token";
const LIST_SIZE: usize = 10;
const CHART_URL: &str = "https://dexscreener.com/search";

const HELP: &str = "Send a token id (e.g. `shiba-inu`) to start watching it.\n\
/watch <token> - watch a token\n\
/unwatch <token> - stop watching\n\
/list - your watched tokens\n\
/chart [token] - chart link\n\
/top - top 10 meme tokens\n\
/new - newest listed tokens";

/// Turns commands into replies; every failure becomes a reply text
pub struct CommandHandler {
    service: Arc<WatchService>,
    catalog: Arc<dyn MarketCatalog>,
    /// Last token each chat resolved, for `/chart` without argument
    last_token: Mutex<HashMap<Subscriber, AssetId>>,
}

impl CommandHandler {
    pub fn new(service: Arc<WatchService>, catalog: Arc<dyn MarketCatalog>) -> Self {
        Self {
            service,
            catalog,
            last_token: Mutex::new(HashMap::new()),
        }
    }

    /// Reply text for `command` sent from `chat`
    pub async fn handle(&self, chat: &Subscriber, command: Command) -> String {
        match command {
            Command::Help => HELP.to_string(),
            Command::Watch(token) => self.watch(chat, &token).await,
            Command::Unwatch(token) => self.unwatch(chat, &token).await,
            Command::List => self.list(chat).await,
            Command::Chart(token) => self.chart(chat, token.as_deref()),
            Command::Top => self.top().await,
            Command::New => self.new_listings().await,
            Command::Unknown(name) => format!("🤖 Unknown command /{}.\n{}", name, HELP),
        }
    }

    async fn watch(&self, chat: &Subscriber, token: &str) -> String {
        let Ok(id) = AssetId::parse(token) else {
            return "Usage: /watch <token>".to_string();
        };

        match self.service.subscribe(&id, chat.clone()).await {
            Ok(snapshot) => {
                self.remember(chat, id);
                format_subscribed(&snapshot)
            }
            Err(SubscribeError::Price(PriceError::NotFound(_))) => "❌ Token not found.".to_string(),
            Err(SubscribeError::Price(e)) => {
                tracing::warn!(asset = %id, error = %e, "Token lookup failed");
                "⚠️ Price source unavailable, try again later.".to_string()
            }
            Err(SubscribeError::Store(e)) => {
                tracing::error!(asset = %id, error = %e, "Failed to save subscription");
                "⚠️ Could not save the subscription.".to_string()
            }
        }
    }

    async fn unwatch(&self, chat: &Subscriber, token: &str) -> String {
        let Ok(id) = AssetId::parse(token) else {
            return "Usage: /unwatch <token>".to_string();
        };

        // Only the chat that owns the entry may remove it
        match self.service.unsubscribe_if_owned(&id, chat).await {
            Ok(true) => format!("🗑 Stopped watching {}.", id),
            Ok(false) => format!("ℹ️ You are not watching {}.", id),
            Err(e) => {
                tracing::error!(asset = %id, error = %e, "Failed to remove subscription");
                "⚠️ Could not remove the subscription.".to_string()
            }
        }
    }

    async fn list(&self, chat: &Subscriber) -> String {
        match self.service.list_for(chat).await {
            Ok(watched) if watched.is_empty() => "📭 You are not watching any tokens.".to_string(),
            Ok(watched) => {
                let mut msg = String::from("👀 Watching:\n");
                for entry in watched {
                    let baseline = entry
                        .baseline
                        .map(|b| format!("${}", format_price(b)))
                        .unwrap_or_else(|| "pending".to_string());
                    msg.push_str(&format!("• {} (baseline {})\n", entry.id, baseline));
                }
                msg
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to list subscriptions");
                "⚠️ Could not read the watch list.".to_string()
            }
        }
    }

    fn chart(&self, chat: &Subscriber, token: Option<&str>) -> String {
        let id = match token {
            Some(token) => AssetId::parse(token).ok(),
            None => self.recall(chat),
        };

        match id {
            Some(id) => format!("📉 Chart: {}/{}", CHART_URL, id),
            None => "⚠️ Check a token first.".to_string(),
        }
    }

    async fn top(&self) -> String {
        match self.catalog.top_by_category(TOP_CATEGORY, LIST_SIZE).await {
            Ok(rows) if rows.is_empty() => "⚠️ No data.".to_string(),
            Ok(rows) => {
                let mut msg = format!("🏆 Top {} meme tokens:\n", rows.len());
                for (i, row) in rows.iter().enumerate() {
                    let cap = row
                        .market_cap
                        .trunc()
                        .to_u128()
                        .map(|c| c.to_formatted_string(&Locale::en))
                        .unwrap_or_else(|| row.market_cap.to_string());
                    msg.push_str(&format!(
                        "{}. {} - ${} (cap ${})\n",
                        i + 1,
                        row.name,
                        format_price(row.price),
                        cap
                    ));
                }
                msg
            }
            Err(e) => {
                tracing::warn!(error = %e, "Top list fetch failed");
                "⚠️ Failed to fetch data.".to_string()
            }
        }
    }

    async fn new_listings(&self) -> String {
        match self.catalog.latest_listings(LIST_SIZE).await {
            Ok(listings) => {
                let mut msg = String::from("🆕 New tokens:\n");
                for listing in listings {
                    msg.push_str(&format!("• {} ({})\n", listing.name, listing.symbol));
                }
                msg
            }
            Err(e) => {
                tracing::warn!(error = %e, "Listing fetch failed");
                "⚠️ Failed to fetch tokens.".to_string()
            }
        }
    }

    fn remember(&self, chat: &Subscriber, id: AssetId) {
        let mut last = self.last_token.lock().unwrap_or_else(|e| e.into_inner());
        last.insert(chat.clone(), id);
    }

    fn recall(&self, chat: &Subscriber) -> Option<AssetId> {
        let last = self.last_token.lock().unwrap_or_else(|e| e.into_inner());
        last.get(chat).cloned()
    }
}
