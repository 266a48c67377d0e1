//! Request counters and the Prometheus exporter.
//!
//! [`Metrics`] keeps its own atomic counters, which the debug endpoint reports
//! as JSON, and mirrors every change into the `metrics` crate recorder so the
//! same numbers appear in the Prometheus exposition.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::Context as _;
use axum::{Json, Router, routing::get};
use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;

/// The in-flight gauge is sampled once every this many requests.
pub const SAMPLE_EVERY: u64 = 100;

static PROMETHEUS: OnceLock<PrometheusHandle> = OnceLock::new();

#[derive(Debug, Default)]
pub struct Metrics {
    requests: AtomicU64,
    errors: AtomicU64,
    in_flight: AtomicI64,
    in_flight_sample: AtomicI64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub errors: u64,
    pub in_flight: i64,
}

/// Decrements the in-flight count when dropped, including when the request
/// future is cancelled.
pub struct InFlight<'a> {
    metrics: &'a Metrics,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.metrics.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_started(&self) -> InFlight<'_> {
        let current = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.requests.fetch_add(1, Ordering::Relaxed) + 1;
        counter!("sales_requests_total").increment(1);

        if total % SAMPLE_EVERY == 0 {
            self.in_flight_sample.store(current, Ordering::Relaxed);
            gauge!("sales_requests_in_flight").set(current as f64);
        }

        InFlight { metrics: self }
    }

    pub fn request_failed(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        counter!("sales_errors_total").increment(1);
    }

    /// Current totals; `in_flight` is the latest sample, not a live value.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            in_flight: self.in_flight_sample.load(Ordering::Relaxed),
        }
    }
}

/// Installs the Prometheus recorder on first call and returns its handle.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    if let Some(handle) = PROMETHEUS.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    let handle = PROMETHEUS.get_or_init(|| handle).clone();

    // Spawn upkeep task to clean stale metrics
    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(handle)
}

/// Router for the debug server.
pub fn metrics_app(handle: PrometheusHandle, metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/metrics", get(move || async move { handle.render() }))
        .route(
            "/debug/vars",
            get(move || async move { Json(metrics.snapshot()) }),
        )
}
