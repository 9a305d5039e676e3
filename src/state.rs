//! Application state shared across HTTP handlers.

use axum::http::StatusCode;
use std::sync::Arc;

use crate::application::services::RedirectService;
use crate::domain::click_producer::ClickProducer;

/// Shared application state injected into HTTP handlers.
///
/// Cheap to clone: everything is behind an `Arc`. Handlers get the resolver
/// and the click producer; the store itself is never reachable from a
/// request handler.
#[derive(Clone)]
pub struct AppState {
    pub redirects: Arc<RedirectService>,
    pub producer: ClickProducer,

    /// Status used for successful redirects (302, or 301 when configured).
    pub redirect_status: StatusCode,
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        redirects: Arc<RedirectService>,
        producer: ClickProducer,
        redirect_status_code: u16,
        behind_proxy: bool,
    ) -> Self {
        Self {
            redirects,
            producer,
            // Config validation pins this to 301/302.
            redirect_status: StatusCode::from_u16(redirect_status_code)
                .unwrap_or(StatusCode::FOUND),
            behind_proxy,
        }
    }
}
