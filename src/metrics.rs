//! Metric names, recorder setup, and the Prometheus exposition endpoint.
//!
//! All metrics flow through the [`metrics`] facade macros; the Prometheus
//! recorder installed at startup renders them for `GET /metrics`.

use axum::http::header;
use axum::routing::{MethodRouter, get};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

/// `redirect_requests_total{status}` - redirects served, by HTTP status.
pub const REDIRECT_REQUESTS: &str = "redirect_requests_total";
/// `redirect_latency_seconds` - wall time of the resolution path.
pub const REDIRECT_LATENCY: &str = "redirect_latency_seconds";
/// `cache_hits_total` - resolutions answered from cache (either tier).
pub const CACHE_HITS: &str = "cache_hits_total";
/// `cache_misses_total` - resolutions that had to consult the store.
pub const CACHE_MISSES: &str = "cache_misses_total";
/// `click_events_enqueued_total` - events handed to the producer.
pub const CLICK_EVENTS_ENQUEUED: &str = "click_events_enqueued_total";
/// `click_events_processed_total` - events durably inserted by the worker.
pub const CLICK_EVENTS_PROCESSED: &str = "click_events_processed_total";

/// Latency buckets tuned for a cache-dominated path: most requests land in
/// the lowest bucket; anything past 100ms is an outage signal, not a tail.
const LATENCY_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.05, 0.1];

/// Installs the global Prometheus recorder and returns its render handle.
///
/// Must be called once, before the first metric macro fires.
///
/// # Errors
///
/// Fails when a recorder is already installed.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REDIRECT_LATENCY.to_string()), LATENCY_BUCKETS)?
        .install_recorder()?;

    describe_metrics();
    Ok(handle)
}

fn describe_metrics() {
    describe_counter!(REDIRECT_REQUESTS, "Total redirect requests by status");
    describe_histogram!(REDIRECT_LATENCY, "Redirect latency in seconds");
    describe_counter!(CACHE_HITS, "Total cache hits");
    describe_counter!(CACHE_MISSES, "Total cache misses");
    describe_counter!(CLICK_EVENTS_ENQUEUED, "Total click events enqueued");
    describe_counter!(CLICK_EVENTS_PROCESSED, "Total click events processed");
}

/// `GET /metrics` route rendering the Prometheus text exposition.
pub fn render_route<S>(handle: PrometheusHandle) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    get(move || {
        let handle = handle.clone();
        async move {
            (
                [(
                    header::CONTENT_TYPE,
                    "text/plain; version=0.0.4; charset=utf-8",
                )],
                handle.render(),
            )
        }
    })
}
