//! Handler for the health check endpoint.

use axum::Json;
use serde_json::{Value, json};

/// Returns service liveness.
///
/// Infrastructure is checked fail-fast at startup; once the process accepts
/// traffic, this endpoint only confirms the server loop is alive.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
