//! Per-asset outcomes and sweep summaries

use crate::watch::AssetId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::time::Duration;

/// How one asset's processing ended in a sweep
#[derive(Debug, Clone, PartialEq)]
pub enum AssetOutcome {
    /// Threshold crossed, notification delivered, baseline advanced
    Alerted { id: AssetId, delta_pct: Decimal },
    /// No usable baseline; current price recorded without alerting
    Seeded { id: AssetId },
    /// Below threshold; nothing changed
    Unchanged { id: AssetId },
    /// Provider does not know the asset
    NotFound { id: AssetId },
    /// Fetch failed; retried next sweep
    Transient { id: AssetId },
    /// Threshold crossed but the notification failed; baseline kept
    DeliveryFailed { id: AssetId },
    /// Reading or writing a store failed
    StoreFailed { id: AssetId },
    /// Unwatched after the sweep's snapshot was taken
    Skipped { id: AssetId },
}

impl AssetOutcome {
    pub fn id(&self) -> &AssetId {
        match self {
            AssetOutcome::Alerted { id, .. }
            | AssetOutcome::Seeded { id }
            | AssetOutcome::Unchanged { id }
            | AssetOutcome::NotFound { id }
            | AssetOutcome::Transient { id }
            | AssetOutcome::DeliveryFailed { id }
            | AssetOutcome::StoreFailed { id }
            | AssetOutcome::Skipped { id } => id,
        }
    }
}

/// Summary of one full pass over the watch set
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub checked: usize,
    /// Fired alerts with their signed percent change
    pub alerts: Vec<(AssetId, Decimal)>,
    pub seeded: usize,
    pub unchanged: usize,
    pub not_found: usize,
    pub transient: usize,
    pub delivery_failures: usize,
    pub store_failures: usize,
    pub skipped: usize,
}

impl SweepReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            duration: Duration::ZERO,
            checked: 0,
            alerts: Vec::new(),
            seeded: 0,
            unchanged: 0,
            not_found: 0,
            transient: 0,
            delivery_failures: 0,
            store_failures: 0,
            skipped: 0,
        }
    }

    /// Fold one asset's outcome into the totals
    pub fn record(&mut self, outcome: AssetOutcome) {
        self.checked += 1;
        match outcome {
            AssetOutcome::Alerted { id, delta_pct } => self.alerts.push((id, delta_pct)),
            AssetOutcome::Seeded { .. } => self.seeded += 1,
            AssetOutcome::Unchanged { .. } => self.unchanged += 1,
            AssetOutcome::NotFound { .. } => self.not_found += 1,
            AssetOutcome::Transient { .. } => self.transient += 1,
            AssetOutcome::DeliveryFailed { .. } => self.delivery_failures += 1,
            AssetOutcome::StoreFailed { .. } => self.store_failures += 1,
            AssetOutcome::Skipped { .. } => self.skipped += 1,
        }
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    /// Count of assets whose processing hit an error
    pub fn failures(&self) -> usize {
        self.transient + self.delivery_failures + self.store_failures
    }

    pub fn log(&self) {
        tracing::info!(
            checked = self.checked,
            alerts = self.alerts.len(),
            seeded = self.seeded,
            unchanged = self.unchanged,
            not_found = self.not_found,
            transient = self.transient,
            delivery_failures = self.delivery_failures,
            store_failures = self.store_failures,
            skipped = self.skipped,
            duration_ms = self.duration.as_millis() as u64,
            "Sweep complete"
        );
    }
}
