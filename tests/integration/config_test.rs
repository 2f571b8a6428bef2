//! Shipped configuration

use pricewatch::config::{Config, NotifierKind};
use rust_decimal_macros::dec;
use std::time::Duration;

const EXAMPLE: &str = include_str!("../../config.toml.example");

#[test]
fn test_example_config_matches_defaults() {
    let config = Config::parse(EXAMPLE).unwrap();
    let defaults = Config::parse("").unwrap();

    assert_eq!(config.monitor.interval_secs, defaults.monitor.interval_secs);
    assert_eq!(config.monitor.threshold_pct, defaults.monitor.threshold_pct);
    assert_eq!(config.provider.base_url, defaults.provider.base_url);
    assert_eq!(config.store.watchlist_path, defaults.store.watchlist_path);
    assert_eq!(config.store.baselines_path, defaults.store.baselines_path);
    assert_eq!(config.notifier.kind, NotifierKind::Telegram);
}

#[test]
fn test_example_config_monitor_settings() {
    let monitor = Config::parse(EXAMPLE).unwrap().monitor_config();

    assert_eq!(monitor.interval, Duration::from_secs(300));
    assert_eq!(monitor.threshold_pct, dec!(8));
    assert_eq!(monitor.fetch_timeout, Duration::from_secs(5));
    assert!(monitor.fetch_timeout < monitor.interval);
}
