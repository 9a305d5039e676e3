//! HTTP API layer: handlers and middleware.

pub mod handlers;
pub mod middleware;
