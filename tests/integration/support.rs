//! Test doubles for the monitor's collaborators

use async_trait::async_trait;
use chrono::Utc;
use pricewatch::monitor::{Monitor, MonitorConfig};
use pricewatch::notify::{DeliveryError, Notifier};
use pricewatch::price::{PriceError, PriceSnapshot, PriceSource};
use pricewatch::store::{MemoryStore, Store};
use pricewatch::watch::{AssetId, Subscriber, WatchService};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn id(s: &str) -> AssetId {
    AssetId::parse(s).unwrap()
}

/// What the fake provider answers for an asset
#[derive(Debug, Clone)]
pub enum Quote {
    Price(Decimal),
    NotFound,
    Transient,
    /// Never answers
    Hang,
}

/// Price source answering from a mutable script
#[derive(Default)]
pub struct ScriptedSource {
    quotes: Mutex<HashMap<AssetId, Quote>>,
    calls: Mutex<Vec<(AssetId, tokio::time::Instant)>>,
    delays: Mutex<VecDeque<Duration>>,
}

impl ScriptedSource {
    pub fn set(&self, asset: &str, quote: Quote) {
        self.quotes.lock().unwrap().insert(id(asset), quote);
    }

    pub fn price(&self, asset: &str, price: Decimal) {
        self.set(asset, Quote::Price(price));
    }

    /// Delay the next unanswered call by `delay`
    pub fn delay_next(&self, delay: Duration) {
        self.delays.lock().unwrap().push_back(delay);
    }

    pub fn call_times(&self) -> Vec<tokio::time::Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl PriceSource for ScriptedSource {
    async fn fetch(&self, asset: &AssetId) -> Result<PriceSnapshot, PriceError> {
        self.calls
            .lock()
            .unwrap()
            .push((asset.clone(), tokio::time::Instant::now()));

        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let quote = self.quotes.lock().unwrap().get(asset).cloned();
        match quote {
            Some(Quote::Price(price)) => Ok(PriceSnapshot {
                id: asset.clone(),
                name: asset.as_str().to_string(),
                price,
                change_24h: Some(dec!(1.5)),
                market_cap: dec!(1000000),
                volume: dec!(50000),
                fetched_at: Utc::now(),
            }),
            Some(Quote::Transient) => Err(PriceError::Transient("HTTP 503".to_string())),
            Some(Quote::Hang) => std::future::pending().await,
            Some(Quote::NotFound) | None => Err(PriceError::NotFound(asset.clone())),
        }
    }
}

/// Notifier that records deliveries and can be told to fail
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(Subscriber, String)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(Subscriber, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, subscriber: &Subscriber, text: &str) -> Result<(), DeliveryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DeliveryError {
                subscriber: subscriber.clone(),
                reason: "chat not found".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((subscriber.clone(), text.to_string()));
        Ok(())
    }
}

/// A monitor wired to in-memory collaborators
pub struct Harness {
    pub source: Arc<ScriptedSource>,
    pub notifier: Arc<RecordingNotifier>,
    pub watches: Arc<MemoryStore<Subscriber>>,
    pub baselines: Arc<MemoryStore<Decimal>>,
    pub service: Arc<WatchService>,
    pub monitor: Monitor,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(MonitorConfig {
            threshold_pct: dec!(8),
            ..Default::default()
        })
    }

    pub fn with_config(config: MonitorConfig) -> Self {
        let source = Arc::new(ScriptedSource::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let watches = Arc::new(MemoryStore::new());
        let baselines = Arc::new(MemoryStore::new());
        let service = Arc::new(WatchService::new(
            watches.clone(),
            baselines.clone(),
            source.clone(),
        ));
        let monitor = Monitor::new(config, service.clone(), source.clone(), notifier.clone());

        Self {
            source,
            notifier,
            watches,
            baselines,
            service,
            monitor,
        }
    }

    /// Watch `asset` for chat 1 with an explicit baseline
    pub async fn watch(&self, asset: &str, baseline: Option<Decimal>) {
        self.watches.put(&id(asset), Subscriber::from(1)).await.unwrap();
        if let Some(baseline) = baseline {
            self.baselines.put(&id(asset), baseline).await.unwrap();
        }
    }

    pub async fn baseline(&self, asset: &str) -> Option<Decimal> {
        self.baselines.get(&id(asset)).await.unwrap()
    }

    pub fn store_writes(&self) -> u64 {
        self.watches.writes() + self.baselines.writes()
    }
}
