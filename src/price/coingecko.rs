//! CoinGecko REST client
//!
//! Uses the public `/coins/markets` endpoint. An unknown id yields `200 []`,
//! which maps to [`PriceError::NotFound`]; every other failure is transient.

use super::{Listing, MarketCatalog, MarketSummary, PriceError, PriceSnapshot, PriceSource};
use crate::watch::AssetId;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Configuration for the CoinGecko client
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Quote currency (e.g. "usd")
    pub vs_currency: String,
    /// Upper bound for one request, including reading the body
    pub timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: COINGECKO_API_URL.to_string(),
            vs_currency: "usd".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Row of `/coins/markets`
#[derive(Debug, Deserialize)]
struct CoinMarket {
    name: String,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    market_cap: Option<f64>,
    total_volume: Option<f64>,
}

/// Row of `/coins/list`
#[derive(Debug, Deserialize)]
struct CoinListEntry {
    id: String,
    symbol: String,
    name: String,
}

/// Client for the CoinGecko market-data API
pub struct CoinGeckoClient {
    config: CoinGeckoConfig,
    client: Client,
}

impl CoinGeckoClient {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self::with_config(CoinGeckoConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: CoinGeckoConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// GET a JSON document, bounded by the configured timeout
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, PriceError> {
        let url = self.url(path);
        tracing::debug!(url = %url, ?query, "CoinGecko request");

        let request = async {
            let response = self.client.get(&url).query(query).send().await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(PriceError::Transient(format!(
                    "CoinGecko API error: {} - {}",
                    status,
                    body.chars().take(200).collect::<String>()
                )));
            }

            let body = response.text().await?;
            let parsed = serde_json::from_str::<T>(&body).map_err(|e| {
                PriceError::Transient(format!("Malformed CoinGecko payload: {}", e))
            })?;
            Ok::<T, PriceError>(parsed)
        };

        tokio::time::timeout(self.config.timeout, request)
            .await
            .map_err(|_| {
                PriceError::Transient(format!(
                    "CoinGecko request timed out after {:?}",
                    self.config.timeout
                ))
            })?
    }

    /// Convert the first `/coins/markets` row into a snapshot
    fn parse_markets(id: &AssetId, rows: Vec<CoinMarket>) -> Result<PriceSnapshot, PriceError> {
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| PriceError::NotFound(id.clone()))?;

        let price = row
            .current_price
            .and_then(Decimal::from_f64)
            .filter(|p| !p.is_sign_negative())
            .ok_or_else(|| {
                PriceError::Transient(format!("Missing or invalid price for {}", id))
            })?;

        let volume = non_negative(row.total_volume, "total_volume", id)?;
        let market_cap = non_negative(row.market_cap, "market_cap", id)?;

        Ok(PriceSnapshot {
            id: id.clone(),
            name: row.name,
            price,
            change_24h: row.price_change_percentage_24h.and_then(Decimal::from_f64),
            market_cap,
            volume,
            fetched_at: Utc::now(),
        })
    }
}

/// Null counts as zero; negative or non-finite values are malformed
fn non_negative(value: Option<f64>, field: &str, id: &AssetId) -> Result<Decimal, PriceError> {
    match value {
        None => Ok(Decimal::ZERO),
        Some(v) => Decimal::from_f64(v)
            .filter(|d| !d.is_sign_negative())
            .ok_or_else(|| PriceError::Transient(format!("Invalid {} for {}: {}", field, id, v))),
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn fetch(&self, id: &AssetId) -> Result<PriceSnapshot, PriceError> {
        let rows: Vec<CoinMarket> = self
            .get_json(
                "/coins/markets",
                &[
                    ("vs_currency", self.config.vs_currency.as_str()),
                    ("ids", id.as_str()),
                ],
            )
            .await?;

        Self::parse_markets(id, rows)
    }
}

#[async_trait]
impl MarketCatalog for CoinGeckoClient {
    async fn top_by_category(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<MarketSummary>, PriceError> {
        let per_page = limit.to_string();
        let rows: Vec<CoinMarket> = self
            .get_json(
                "/coins/markets",
                &[
                    ("vs_currency", self.config.vs_currency.as_str()),
                    ("category", category),
                    ("order", "market_cap_desc"),
                    ("per_page", per_page.as_str()),
                ],
            )
            .await?;

        Ok(rows
            .into_iter()
            .take(limit)
            .map(|row| MarketSummary {
                name: row.name,
                price: row
                    .current_price
                    .and_then(Decimal::from_f64)
                    .unwrap_or_default(),
                market_cap: row.market_cap.and_then(Decimal::from_f64).unwrap_or_default(),
            })
            .collect())
    }

    async fn latest_listings(&self, limit: usize) -> Result<Vec<Listing>, PriceError> {
        let rows: Vec<CoinListEntry> = self.get_json("/coins/list", &[]).await?;
        let skip = rows.len().saturating_sub(limit);

        Ok(rows
            .into_iter()
            .skip(skip)
            .map(|row| Listing {
                id: row.id,
                symbol: row.symbol,
                name: row.name,
            })
            .collect())
    }
}
