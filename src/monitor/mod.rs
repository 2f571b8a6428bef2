//! Price monitoring loop
//!
//! Wakes on a fixed cadence, sweeps every watched asset, and alerts the
//! subscriber when the price moved past the threshold since the last alert.

mod report;
mod runner;

pub use report::{AssetOutcome, SweepReport};
pub use runner::Monitor;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;

/// Configuration for the monitor loop
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Start-to-start time between sweeps
    pub interval: Duration,
    /// Minimum absolute percent move that fires an alert
    pub threshold_pct: Decimal,
    /// Assets fetched in parallel within one sweep
    pub max_concurrent_fetches: usize,
    /// Upper bound for a single asset fetch
    pub fetch_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            threshold_pct: dec!(8),
            max_concurrent_fetches: 8,
            fetch_timeout: Duration::from_secs(5),
        }
    }
}
