//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::net::SocketAddr;
use std::time::Instant;
use tracing::error;

use crate::application::services::ResolveOutcome;
use crate::domain::entities::ClickEvent;
use crate::metrics::{
    CACHE_HITS, CACHE_MISSES, CLICK_EVENTS_ENQUEUED, REDIRECT_LATENCY, REDIRECT_REQUESTS,
};
use crate::state::AppState;
use crate::utils::client_ip::client_ip;
use crate::utils::fingerprint::fingerprint;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Responses
///
/// - `302` (or configured `301`) with `Location` on success
/// - `404` for unknown or malformed codes
/// - `410` for disabled or expired links
/// - `500` when cache or store are unreachable
///
/// # Click Tracking
///
/// On success a click event is handed to the producer on a detached task;
/// the response is sent whether or not that task ever completes. The handler
/// itself never writes to the store and never blocks on the stream.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();

    let resolution = match state.redirects.resolve(&code).await {
        Ok(resolution) => resolution,
        Err(e) => {
            error!(code, error = %e, "Failed to resolve short code");
            metrics::counter!(REDIRECT_REQUESTS, "status" => "500").increment(1);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // The status label must reflect what the client actually receives, so a
    // Found outcome is labeled with the configured 301/302, not the
    // resolver's default.
    let status = match &resolution.outcome {
        ResolveOutcome::Found(_) => state.redirect_status.as_u16(),
        _ => resolution.status(),
    };

    if resolution.cache_hit {
        metrics::counter!(CACHE_HITS).increment(1);
    } else {
        metrics::counter!(CACHE_MISSES).increment(1);
    }
    metrics::histogram!(REDIRECT_LATENCY).record(start.elapsed().as_secs_f64());
    metrics::counter!(REDIRECT_REQUESTS, "status" => status.to_string()).increment(1);

    match resolution.outcome {
        ResolveOutcome::Found(url) => {
            let ip = client_ip(&headers, addr, state.behind_proxy);
            let event = ClickEvent {
                code,
                timestamp: Utc::now(),
                ip_hash: fingerprint(&ip),
                ua_hash: fingerprint(header_str(&headers, header::USER_AGENT.as_str())),
                referer: header_str(&headers, header::REFERER.as_str()).to_string(),
                request_id: header_str(&headers, "x-request-id").to_string(),
            };

            state.producer.enqueue_async(event);
            metrics::counter!(CLICK_EVENTS_ENQUEUED).increment(1);

            (state.redirect_status, [(header::LOCATION, url)]).into_response()
        }
        ResolveOutcome::NotFound => StatusCode::NOT_FOUND.into_response(),
        ResolveOutcome::Gone => StatusCode::GONE.into_response(),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}
