//! In-process store, used for dry runs and tests

use super::{Store, StoreError};
use crate::watch::AssetId;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Volatile store backed by a `BTreeMap`
pub struct MemoryStore<V> {
    entries: RwLock<BTreeMap<AssetId, V>>,
    writes: AtomicU64,
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            writes: AtomicU64::new(0),
        }
    }

    /// Number of mutations applied so far
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> Store<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, id: &AssetId) -> Result<Option<V>, StoreError> {
        Ok(self.entries.read().await.get(id).cloned())
    }

    async fn put(&self, id: &AssetId, value: V) -> Result<(), StoreError> {
        self.entries.write().await.insert(id.clone(), value);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn remove(&self, id: &AssetId) -> Result<(), StoreError> {
        if self.entries.write().await.remove(id).is_some() {
            self.writes.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<(AssetId, V)>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}
