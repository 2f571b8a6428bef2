//! Monitor loop implementation

use super::{AssetOutcome, MonitorConfig, SweepReport};
use crate::alert::{evaluate, format_alert, needs_seed, AlertDecision};
use crate::notify::Notifier;
use crate::price::{PriceError, PriceSnapshot, PriceSource};
use crate::store::StoreError;
use crate::telemetry::{self, CounterMetric};
use crate::watch::{AssetId, Subscriber, WatchService};
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};

/// Watch entry as seen before the price fetch
struct Observed {
    subscriber: Subscriber,
    baseline: Option<Decimal>,
}

/// Owns everything one sweep needs; nothing is shared implicitly
pub struct Monitor {
    config: MonitorConfig,
    service: Arc<WatchService>,
    source: Arc<dyn PriceSource>,
    notifier: Arc<dyn Notifier>,
    reports: Option<mpsc::Sender<SweepReport>>,
}

impl Monitor {
    /// Create a new monitor
    pub fn new(
        config: MonitorConfig,
        service: Arc<WatchService>,
        source: Arc<dyn PriceSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            service,
            source,
            notifier,
            reports: None,
        }
    }

    /// Also publish every sweep report on `tx`
    pub fn with_reports(mut self, tx: mpsc::Sender<SweepReport>) -> Self {
        self.reports = Some(tx);
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Sweep on every tick until `shutdown` flips to true
    ///
    /// Ticks are measured start-to-start. A sweep that overruns the interval
    /// is followed immediately by the next one, without a catch-up burst.
    /// Shutdown is only observed between sweeps, so a sweep in progress
    /// always completes.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            threshold_pct = %self.config.threshold_pct,
            max_concurrent = self.config.max_concurrent_fetches,
            "Monitor started"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }

            match self.sweep().await {
                Ok(report) => {
                    report.log();
                    if let Some(tx) = &self.reports {
                        let _ = tx.send(report).await;
                    }
                }
                Err(e) if e.is_corrupt() => {
                    tracing::error!(error = %e, "Watch store is corrupt, sweep skipped until it is repaired");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read watch store, sweep skipped");
                }
            }
        }

        tracing::info!("Monitor stopped");
    }

    /// One full pass over the watch set
    ///
    /// Only fails when the watch set itself cannot be read. Per-asset
    /// failures are isolated and reported in the returned summary.
    pub async fn sweep(&self) -> Result<SweepReport, StoreError> {
        let started = Instant::now();
        let mut report = SweepReport::new(Utc::now());

        let entries = self.service.watches().list_all().await?;
        telemetry::set_watched_assets(entries.len());
        tracing::debug!(assets = entries.len(), "Sweep started");

        let outcomes: Vec<AssetOutcome> = stream::iter(entries)
            .map(|(id, subscriber)| self.process(id, subscriber))
            .buffer_unordered(self.config.max_concurrent_fetches.max(1))
            .collect()
            .await;

        for outcome in outcomes {
            report.record(outcome);
        }

        self.service.prune_locks();
        report.duration = started.elapsed();
        telemetry::record_sweep_duration(report.duration);

        Ok(report)
    }

    /// Fetch, evaluate and possibly alert for one asset
    async fn process(&self, id: AssetId, subscriber: Subscriber) -> AssetOutcome {
        // What the entry looked like before the fetch; a subscribe landing
        // while the fetch is in flight must not be judged against its price
        let observed = match self.service.baselines().get(&id).await {
            Ok(baseline) => Observed {
                subscriber,
                baseline,
            },
            Err(e) => return self.store_failed(id, e),
        };

        let snapshot = match self.fetch(&id).await {
            Ok(snapshot) => snapshot,
            Err(PriceError::NotFound(_)) => {
                tracing::info!(asset = %id, "Asset not found by price source, keeping watch entry");
                telemetry::record_fetch_failure("not_found");
                return AssetOutcome::NotFound { id };
            }
            Err(e) => {
                tracing::warn!(asset = %id, error = %e, "Price fetch failed, retrying next sweep");
                telemetry::record_fetch_failure(e.kind());
                return AssetOutcome::Transient { id };
            }
        };

        let _guard = self.service.lock(&id).await;

        match self.evaluate_locked(&id, &observed, &snapshot).await {
            Ok(outcome) => outcome,
            Err(e) => self.store_failed(id, e),
        }
    }

    fn store_failed(&self, id: AssetId, e: StoreError) -> AssetOutcome {
        tracing::error!(asset = %id, error = %e, "Store failure while evaluating asset");
        telemetry::increment(CounterMetric::StoreFailures);
        AssetOutcome::StoreFailed { id }
    }

    async fn fetch(&self, id: &AssetId) -> Result<PriceSnapshot, PriceError> {
        tokio::time::timeout(self.config.fetch_timeout, self.source.fetch(id))
            .await
            .unwrap_or_else(|_| {
                Err(PriceError::Transient(format!(
                    "Fetch timed out after {:?}",
                    self.config.fetch_timeout
                )))
            })
    }

    /// Must be called with the asset's lock held
    async fn evaluate_locked(
        &self,
        id: &AssetId,
        observed: &Observed,
        snapshot: &PriceSnapshot,
    ) -> Result<AssetOutcome, StoreError> {
        // Re-read under the lock: the entry may have been removed or
        // re-subscribed since it was observed
        let Some(subscriber) = self.service.watches().get(id).await? else {
            tracing::debug!(asset = %id, "Unwatched during sweep, skipping");
            return Ok(AssetOutcome::Skipped { id: id.clone() });
        };

        let baselines = self.service.baselines();
        let baseline = baselines.get(id).await?;

        if subscriber != observed.subscriber || baseline != observed.baseline {
            tracing::debug!(asset = %id, "Re-subscribed during sweep, skipping");
            return Ok(AssetOutcome::Skipped { id: id.clone() });
        }

        if needs_seed(baseline) {
            baselines.put(id, snapshot.price).await?;
            telemetry::increment(CounterMetric::BaselinesSeeded);
            tracing::info!(asset = %id, price = %snapshot.price, "Baseline seeded");
            return Ok(AssetOutcome::Seeded { id: id.clone() });
        }

        match evaluate(snapshot.price, baseline, self.config.threshold_pct) {
            AlertDecision::NoAlert => {
                tracing::debug!(asset = %id, price = %snapshot.price, ?baseline, "Below threshold");
                Ok(AssetOutcome::Unchanged { id: id.clone() })
            }
            AlertDecision::Alert(delta_pct) => {
                let text = format_alert(id, delta_pct, snapshot);

                if let Err(e) = self.notifier.notify(&subscriber, &text).await {
                    tracing::warn!(asset = %id, error = %e, "Alert delivery failed, baseline kept");
                    telemetry::increment(CounterMetric::DeliveryFailures);
                    return Ok(AssetOutcome::DeliveryFailed { id: id.clone() });
                }

                baselines.put(id, snapshot.price).await?;
                telemetry::increment(CounterMetric::Alerts);
                tracing::info!(
                    asset = %id,
                    %subscriber,
                    delta_pct = %delta_pct,
                    price = %snapshot.price,
                    "Alert sent, baseline advanced"
                );

                Ok(AssetOutcome::Alerted {
                    id: id.clone(),
                    delta_pct,
                })
            }
        }
    }
}
