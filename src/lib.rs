//! pricewatch: token price watcher with threshold alerts
//!
//! This library provides the core components for:
//! - Market data from CoinGecko
//! - Durable watch and baseline stores
//! - Threshold evaluation against the last alerted-from price
//! - The periodic monitor loop and its notification sinks
//! - A Telegram chat front end that manages subscriptions
//! - Logging and Prometheus metrics

pub mod alert;
pub mod bot;
pub mod cli;
pub mod config;
pub mod monitor;
pub mod notify;
pub mod price;
pub mod store;
pub mod telegram;
pub mod telemetry;
pub mod watch;
