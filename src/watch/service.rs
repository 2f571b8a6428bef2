//! Subscription service shared by the front end and the monitor

use super::{AssetId, AssetLocks, Subscriber};
use crate::price::{PriceError, PriceSnapshot, PriceSource};
use crate::store::{BaselineStore, StoreError, WatchStore};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OwnedMutexGuard;

/// Subscription errors
#[derive(Debug, Error)]
pub enum SubscribeError {
    /// Token could not be resolved by the price source
    #[error(transparent)]
    Price(#[from] PriceError),
    /// Entry could not be persisted
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A watch entry joined with its current baseline
#[derive(Debug, Clone, PartialEq)]
pub struct WatchedAsset {
    pub id: AssetId,
    pub subscriber: Subscriber,
    /// `None` until the first observed price is recorded
    pub baseline: Option<Decimal>,
}

/// Owns the watch and baseline stores and the per-asset locks guarding them
pub struct WatchService {
    watches: WatchStore,
    baselines: BaselineStore,
    source: Arc<dyn PriceSource>,
    locks: AssetLocks,
}

impl WatchService {
    pub fn new(watches: WatchStore, baselines: BaselineStore, source: Arc<dyn PriceSource>) -> Self {
        Self {
            watches,
            baselines,
            source,
            locks: AssetLocks::new(),
        }
    }

    pub fn watches(&self) -> &WatchStore {
        &self.watches
    }

    pub fn baselines(&self) -> &BaselineStore {
        &self.baselines
    }

    /// Exclusive access to one asset's entries
    pub async fn lock(&self, id: &AssetId) -> OwnedMutexGuard<()> {
        self.locks.lock(id).await
    }

    /// Forget locks for assets nobody is touching
    pub fn prune_locks(&self) {
        self.locks.prune();
    }

    /// Resolve `id` and start watching it for `subscriber`
    ///
    /// The baseline is seeded with the price observed right now, so the
    /// subscription can never alert on the cycle it was added. Re-subscribing
    /// overwrites both the subscriber and the baseline.
    pub async fn subscribe(
        &self,
        id: &AssetId,
        subscriber: Subscriber,
    ) -> Result<PriceSnapshot, SubscribeError> {
        let snapshot = self.source.fetch(id).await?;
        self.seed(id, subscriber, snapshot.price).await?;
        Ok(snapshot)
    }

    /// Record a watch entry with an explicit starting baseline
    pub async fn seed(
        &self,
        id: &AssetId,
        subscriber: Subscriber,
        price: Decimal,
    ) -> Result<(), StoreError> {
        let _guard = self.lock(id).await;

        // Baseline first: the monitor treats a watch entry without a baseline
        // as "seed from the next observed price", never the other way round.
        self.baselines.put(id, price).await?;
        self.watches.put(id, subscriber.clone()).await?;

        tracing::info!(asset = %id, %subscriber, %price, "Subscribed");
        Ok(())
    }

    /// Stop watching `id`; returns whether it was watched
    pub async fn unsubscribe(&self, id: &AssetId) -> Result<bool, StoreError> {
        self.remove(id, None).await
    }

    /// Stop watching `id` only if `owner` is its current subscriber
    ///
    /// The ownership check and the removal happen under the asset's lock, so
    /// an entry taken over by another subscriber in between is left alone.
    pub async fn unsubscribe_if_owned(
        &self,
        id: &AssetId,
        owner: &Subscriber,
    ) -> Result<bool, StoreError> {
        self.remove(id, Some(owner)).await
    }

    async fn remove(&self, id: &AssetId, owner: Option<&Subscriber>) -> Result<bool, StoreError> {
        let was_watched = {
            let _guard = self.lock(id).await;
            let current = self.watches.get(id).await?;
            if owner.is_some() && current.as_ref() != owner {
                return Ok(false);
            }
            self.watches.remove(id).await?;
            self.baselines.remove(id).await?;
            current.is_some()
        };
        self.locks.prune();

        tracing::info!(asset = %id, was_watched, "Unsubscribed");
        Ok(was_watched)
    }

    /// Every watch entry with its baseline
    pub async fn list(&self) -> Result<Vec<WatchedAsset>, StoreError> {
        let watches = self.watches.list_all().await?;
        let mut out = Vec::with_capacity(watches.len());
        for (id, subscriber) in watches {
            let baseline = self.baselines.get(&id).await?;
            out.push(WatchedAsset {
                id,
                subscriber,
                baseline,
            });
        }
        Ok(out)
    }

    /// Watch entries delivered to one subscriber
    pub async fn list_for(&self, subscriber: &Subscriber) -> Result<Vec<WatchedAsset>, StoreError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|w| &w.subscriber == subscriber)
            .collect())
    }
}
