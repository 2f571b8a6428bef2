//! Monitor loop cadence and shutdown

use crate::support::Harness;
use pricewatch::monitor::{Monitor, MonitorConfig};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

const INTERVAL: Duration = Duration::from_secs(300);

/// Timer deadlines are millisecond-granular
fn assert_gap(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual <= expected + Duration::from_millis(5),
        "gap {:?}, expected {:?}",
        actual,
        expected
    );
}

fn harness() -> Harness {
    Harness::with_config(MonitorConfig {
        interval: INTERVAL,
        threshold_pct: dec!(8),
        max_concurrent_fetches: 4,
        fetch_timeout: Duration::from_secs(1000),
    })
}

fn spawn(
    monitor: Monitor,
) -> (
    mpsc::Receiver<pricewatch::monitor::SweepReport>,
    watch::Sender<bool>,
    tokio::task::JoinHandle<()>,
) {
    let (report_tx, report_rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = Arc::new(monitor.with_reports(report_tx));
    let handle = tokio::spawn(async move { monitor.run(shutdown_rx).await });
    (report_rx, shutdown_tx, handle)
}

#[tokio::test(start_paused = true)]
async fn test_sweeps_on_fixed_interval() {
    let h = harness();
    h.watch("btc", Some(dec!(100))).await;
    h.source.price("btc", dec!(101));

    let Harness { source, monitor, .. } = h;
    let (mut reports, shutdown, handle) = spawn(monitor);

    for _ in 0..3 {
        let report = reports.recv().await.unwrap();
        assert_eq!(report.unchanged, 1);
    }

    let times = source.call_times();
    assert_eq!(times.len(), 3);
    assert_gap(times[1] - times[0], INTERVAL);
    assert_gap(times[2] - times[1], INTERVAL);

    shutdown.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_overrun_starts_next_sweep_immediately_without_burst() {
    let h = harness();
    h.watch("btc", Some(dec!(100))).await;
    h.source.price("btc", dec!(101));
    h.source.delay_next(Duration::from_secs(400));

    let Harness { source, monitor, .. } = h;
    let (mut reports, shutdown, handle) = spawn(monitor);

    reports.recv().await.unwrap();
    reports.recv().await.unwrap();
    reports.recv().await.unwrap();

    let times = source.call_times();
    // First sweep overran to t=400: the next starts right away, and the one
    // after that a full interval later instead of catching up at t=600
    assert_gap(times[1] - times[0], Duration::from_secs(400));
    assert_gap(times[2] - times[1], INTERVAL);

    shutdown.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_while_idle_stops_loop() {
    let h = harness();
    let Harness { monitor, .. } = h;
    let (mut reports, shutdown, handle) = spawn(monitor);

    let first = reports.recv().await.unwrap();
    assert_eq!(first.checked, 0);

    shutdown.send(true).unwrap();
    tokio_test::assert_ok!(handle.await);
    assert!(reports.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_lets_running_sweep_finish() {
    let h = harness();
    h.watch("btc", Some(dec!(100))).await;
    h.source.price("btc", dec!(200));
    h.source.delay_next(Duration::from_secs(30));

    let Harness {
        source,
        monitor,
        notifier,
        ..
    } = h;
    let (mut reports, shutdown, handle) = spawn(monitor);

    // Let the first fetch start, then request shutdown mid-sweep
    while source.call_times().is_empty() {
        tokio::task::yield_now().await;
    }
    shutdown.send(true).unwrap();

    let report = reports.recv().await.unwrap();
    assert_eq!(report.alert_count(), 1);
    handle.await.unwrap();
    assert_eq!(notifier.sent().len(), 1);
}
