//! Per-asset async mutual exclusion

use super::AssetId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Hands out one async mutex per asset id
///
/// Serializes baseline mutations for the same asset between the front end
/// and the monitor while leaving different assets fully concurrent.
#[derive(Default)]
pub struct AssetLocks {
    locks: Mutex<HashMap<AssetId, Arc<AsyncMutex<()>>>>,
}

impl AssetLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`
    pub async fn lock(&self, id: &AssetId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drop lock entries nobody is holding or waiting on
    pub fn prune(&self) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
