//! Price source types

use crate::watch::AssetId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current market data for one asset, produced fresh on every fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Asset the snapshot was requested for
    pub id: AssetId,
    /// Display name reported by the provider
    pub name: String,
    /// Current price in the quote currency
    pub price: Decimal,
    /// 24h change in percent; `None` when the provider did not report it
    pub change_24h: Option<Decimal>,
    /// Market capitalization
    pub market_cap: Decimal,
    /// 24h traded volume
    pub volume: Decimal,
    /// Local time the snapshot was received
    pub fetched_at: DateTime<Utc>,
}

/// One row of a category ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub name: String,
    pub price: Decimal,
    pub market_cap: Decimal,
}

/// A listed asset without market data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

/// Price source errors
#[derive(Debug, Error)]
pub enum PriceError {
    /// Provider answered but has no such asset; not retried this cycle
    #[error("Asset not found: {0}")]
    NotFound(AssetId),
    /// Network, HTTP status or payload failure; retried next cycle
    #[error("Price source unavailable: {0}")]
    Transient(String),
}

impl PriceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PriceError::NotFound(_))
    }

    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            PriceError::NotFound(_) => "not_found",
            PriceError::Transient(_) => "transient",
        }
    }
}

impl From<reqwest::Error> for PriceError {
    fn from(e: reqwest::Error) -> Self {
        PriceError::Transient(e.to_string())
    }
}
