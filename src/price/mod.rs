//! Price source module
//!
//! Fetches current market data for a watched asset from CoinGecko

mod coingecko;
mod types;

pub use coingecko::{CoinGeckoClient, CoinGeckoConfig, COINGECKO_API_URL};
pub use types::{Listing, MarketSummary, PriceError, PriceSnapshot};

use crate::watch::AssetId;
use async_trait::async_trait;

/// Trait for price source implementations
///
/// Implementations are stateless and safe to call concurrently for
/// different identifiers.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch a fresh snapshot for one asset
    async fn fetch(&self, id: &AssetId) -> Result<PriceSnapshot, PriceError>;
}

/// Read-only market listings shown by the chat front end
#[async_trait]
pub trait MarketCatalog: Send + Sync {
    /// Top assets in a category ordered by market cap
    async fn top_by_category(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<MarketSummary>, PriceError>;
    /// Most recently listed assets
    async fn latest_listings(&self, limit: usize) -> Result<Vec<Listing>, PriceError>;
}
