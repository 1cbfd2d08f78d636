use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Call once, from the binary.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        describe_all();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// Descriptions so every series shows up on /metrics with help text.
fn describe_all() {
    describe_counter!(
        "sentinel_articles_fetched_total",
        "Articles returned by the news source."
    );
    describe_counter!(
        "sentinel_source_errors_total",
        "News source failures (transport, status, payload)."
    );
    describe_counter!(
        "sentinel_bad_timestamp_total",
        "Articles dropped for an unparseable publish time."
    );
    describe_counter!(
        "sentinel_stale_total",
        "Articles dropped by the recency window."
    );
    describe_counter!(
        "sentinel_duplicates_total",
        "Articles suppressed because they were already notified."
    );
    describe_counter!(
        "sentinel_qualified_total",
        "Articles scoring at or above threshold."
    );
    describe_counter!("sentinel_batches_sent_total", "Chat messages delivered.");
    describe_counter!(
        "sentinel_delivery_errors_total",
        "Chat deliveries that failed and were dropped."
    );
    describe_gauge!("sentinel_dedup_entries", "Ids in the dedup cache.");
    describe_gauge!(
        "sentinel_last_sweep_ts",
        "Unix ts when the last symbol sweep finished."
    );
    describe_counter!(
        "sentinel_monitor_restarts_total",
        "Monitor tasks restarted after a panic or unexpected return."
    );
    describe_histogram!("sentinel_fetch_ms", "News source round-trip in milliseconds.");
}
