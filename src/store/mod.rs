//! Durable key-value stores for the watch set and alert baselines
//!
//! Both stores share one contract keyed by [`AssetId`]. Every mutation is
//! persisted before the call returns; the two stores are independent and
//! there is no cross-store transaction.

mod json;
mod memory;
mod types;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use types::StoreError;

use crate::watch::{AssetId, Subscriber};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Trait for key-value store implementations
#[async_trait]
pub trait Store<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Get the value for an asset
    async fn get(&self, id: &AssetId) -> Result<Option<V>, StoreError>;
    /// Insert or overwrite the value for an asset
    async fn put(&self, id: &AssetId, value: V) -> Result<(), StoreError>;
    /// Remove an asset; no-op if absent
    async fn remove(&self, id: &AssetId) -> Result<(), StoreError>;
    /// All entries, ordered by asset id
    async fn list_all(&self) -> Result<Vec<(AssetId, V)>, StoreError>;
}

/// Asset → subscriber to notify
pub type WatchStore = Arc<dyn Store<Subscriber>>;

/// Asset → last alerted-from price
pub type BaselineStore = Arc<dyn Store<Decimal>>;
