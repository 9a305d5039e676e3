//! Top-level router configuration.

use axum::Router;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::metrics;
use crate::state::AppState;

/// Constructs the application router.
///
/// # Route Structure
///
/// - `/{code}` - Redirect endpoint (public, latency-critical)
/// - `/health` - Liveness probe
/// - `/metrics` - Prometheus text exposition
///
/// Trailing slashes are trimmed so `/abc12345/` resolves like `/abc12345`.
pub fn app_router(state: AppState, metrics_handle: PrometheusHandle) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .route("/metrics", metrics::render_route(metrics_handle))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
