//! Wiring shared by the subcommands

use crate::config::{Config, NotifierKind};
use crate::notify::{LogNotifier, Notifier, TelegramNotifier};
use crate::price::CoinGeckoClient;
use crate::store::JsonFileStore;
use crate::telegram::TelegramClient;
use crate::watch::{Subscriber, WatchService};
use anyhow::Context;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

/// Opened stores and clients built from configuration
pub struct AppContext {
    pub config: Config,
    pub prices: Arc<CoinGeckoClient>,
    pub service: Arc<WatchService>,
}

impl AppContext {
    /// Open both stores and build the price client
    ///
    /// Fails before anything polls if either persisted document is unreadable.
    pub async fn open(config: Config) -> anyhow::Result<Self> {
        let watches = JsonFileStore::<Subscriber>::open(&config.store.watchlist_path)
            .await
            .context("Cannot open watch store")?;
        let baselines = JsonFileStore::<Decimal>::open(&config.store.baselines_path)
            .await
            .context("Cannot open baseline store")?;

        let prices = Arc::new(CoinGeckoClient::with_config(config.provider_config()));
        let service = Arc::new(WatchService::new(
            Arc::new(watches),
            Arc::new(baselines),
            prices.clone(),
        ));

        Ok(Self {
            config,
            prices,
            service,
        })
    }

    /// Telegram Bot API client; errors without a bot token
    pub fn telegram(&self) -> anyhow::Result<Arc<TelegramClient>> {
        let notifier = &self.config.notifier;
        Ok(Arc::new(TelegramClient::new(
            notifier.api_url.clone(),
            self.config.bot_token()?,
            Duration::from_secs(notifier.timeout_secs),
        )))
    }

    /// Notification sink selected by `notifier.kind`
    pub fn notifier(&self) -> anyhow::Result<Arc<dyn Notifier>> {
        Ok(match self.config.notifier.kind {
            NotifierKind::Telegram => Arc::new(TelegramNotifier::new(self.telegram()?)),
            NotifierKind::Log => Arc::new(LogNotifier::new()),
        })
    }
}
