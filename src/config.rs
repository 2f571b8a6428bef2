//! Configuration types for pricewatch

use crate::monitor::MonitorConfig;
use crate::price::{CoinGeckoConfig, COINGECKO_API_URL};
use crate::telegram::TELEGRAM_API_URL;
use crate::telemetry::LogFormat;
use rust_decimal::Decimal;
use anyhow::Context;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that supplies the bot token
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Shipped example configuration, used when no config file exists
pub const EXAMPLE_CONFIG: &str = include_str!("../config.toml.example");

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Monitor loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSettings {
    /// Seconds between sweep starts
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Minimum absolute percent move that fires an alert
    #[serde(default = "default_threshold_pct")]
    pub threshold_pct: Decimal,

    /// Assets fetched in parallel within one sweep
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

fn default_interval_secs() -> u64 {
    300 // 5 minutes
}
fn default_threshold_pct() -> Decimal {
    Decimal::new(8, 0) // 8%
}
fn default_max_concurrent_fetches() -> usize {
    8
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            threshold_pct: Decimal::new(8, 0),
            max_concurrent_fetches: 8,
        }
    }
}

/// Market-data provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_url")]
    pub base_url: String,

    /// Quote currency for prices
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,

    /// Per-fetch timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_url() -> String {
    COINGECKO_API_URL.to_string()
}
fn default_vs_currency() -> String {
    "usd".to_string()
}
fn default_timeout_secs() -> u64 {
    5
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            vs_currency: default_vs_currency(),
            timeout_secs: 5,
        }
    }
}

/// Persisted state locations
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Asset → subscriber document
    #[serde(default = "default_watchlist_path")]
    pub watchlist_path: PathBuf,

    /// Asset → baseline price document
    #[serde(default = "default_baselines_path")]
    pub baselines_path: PathBuf,
}

fn default_watchlist_path() -> PathBuf {
    PathBuf::from("watchlist.json")
}
fn default_baselines_path() -> PathBuf {
    PathBuf::from("targets.json")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            watchlist_path: default_watchlist_path(),
            baselines_path: default_baselines_path(),
        }
    }
}

/// Where alerts go
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    #[default]
    Telegram,
    /// Write alerts to the log only
    Log,
}

/// Notification sink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub kind: NotifierKind,

    #[serde(default = "default_telegram_url")]
    pub api_url: String,

    /// Falls back to `TELEGRAM_BOT_TOKEN`
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Timeout for one `sendMessage`
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_telegram_url() -> String {
    TELEGRAM_API_URL.to_string()
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            kind: NotifierKind::Telegram,
            api_url: default_telegram_url(),
            bot_token: None,
            timeout_secs: 5,
        }
    }
}

/// Chat front end configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FrontendConfig {
    /// Poll Telegram for commands while running
    #[serde(default)]
    pub enabled: bool,

    /// `getUpdates` long-poll timeout
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

fn default_poll_timeout_secs() -> u64 {
    30
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            poll_timeout_secs: 30,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Load `path`, or `None` when it does not exist
    ///
    /// A file that exists but cannot be read, parsed or validated is an
    /// error, never a reason to fall back to defaults.
    pub fn load_if_present(path: impl AsRef<Path>) -> anyhow::Result<Option<Self>> {
        let path = path.as_ref();
        match std::fs::metadata(path) {
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            _ => Self::load(path).map(Some),
        }
    }

    /// The shipped example configuration
    pub fn example() -> anyhow::Result<Self> {
        Self::parse(EXAMPLE_CONFIG)
    }

    /// Parse and validate TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        if config.notifier.bot_token.is_none() {
            config.notifier.bot_token = std::env::var(BOT_TOKEN_ENV).ok().filter(|t| !t.is_empty());
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the monitor cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.monitor.interval_secs == 0 {
            anyhow::bail!("monitor.interval_secs must be greater than 0");
        }
        if self.monitor.threshold_pct <= Decimal::ZERO {
            anyhow::bail!("monitor.threshold_pct must be positive");
        }
        if self.monitor.max_concurrent_fetches == 0 {
            anyhow::bail!("monitor.max_concurrent_fetches must be at least 1");
        }
        if self.provider.timeout_secs == 0 {
            anyhow::bail!("provider.timeout_secs must be greater than 0");
        }
        Ok(())
    }

    /// Bot token, required by the Telegram notifier and the front end
    pub fn bot_token(&self) -> anyhow::Result<&str> {
        self.notifier.bot_token.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Telegram bot token missing: set notifier.bot_token or {}",
                BOT_TOKEN_ENV
            )
        })
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            interval: Duration::from_secs(self.monitor.interval_secs),
            threshold_pct: self.monitor.threshold_pct,
            max_concurrent_fetches: self.monitor.max_concurrent_fetches,
            fetch_timeout: Duration::from_secs(self.provider.timeout_secs),
        }
    }

    pub fn provider_config(&self) -> CoinGeckoConfig {
        CoinGeckoConfig {
            base_url: self.provider.base_url.clone(),
            vs_currency: self.provider.vs_currency.clone(),
            timeout: Duration::from_secs(self.provider.timeout_secs),
        }
    }
}
