//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Alerts delivered
    Alerts,
    /// Baselines established without alerting
    BaselinesSeeded,
    /// Alerts that could not be delivered
    DeliveryFailures,
    /// Store reads or writes that failed during a sweep
    StoreFailures,
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::Alerts => "pricewatch_alerts_total",
            CounterMetric::BaselinesSeeded => "pricewatch_baselines_seeded_total",
            CounterMetric::DeliveryFailures => "pricewatch_delivery_failures_total",
            CounterMetric::StoreFailures => "pricewatch_store_failures_total",
        }
    }
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    ::metrics::counter!(metric.name()).increment(1);
}

/// Count a failed price fetch by kind (`not_found`, `transient`)
pub fn record_fetch_failure(kind: &'static str) {
    ::metrics::counter!("pricewatch_fetch_failures_total", "kind" => kind).increment(1);
}

/// Number of assets in the watch set at sweep start
pub fn set_watched_assets(count: usize) {
    ::metrics::gauge!("pricewatch_watched_assets").set(count as f64);
}

/// Wall time of one sweep
pub fn record_sweep_duration(duration: Duration) {
    ::metrics::histogram!("pricewatch_sweep_duration_seconds").record(duration.as_secs_f64());
}

/// Serve `/metrics` on all interfaces at `port`
///
/// Must be called from within a tokio runtime.
pub fn install_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;

    tracing::info!(%addr, "Prometheus metrics exporter listening");
    Ok(())
}
