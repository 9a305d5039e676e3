use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
}

/// Infrastructure failures surfaced by the resolution path.
///
/// A cache outage is not downgraded to a store lookup: falling through on
/// every request would hand the full redirect volume to the database during
/// the outage. Both variants map to `500` and back-pressure at the edge.
#[derive(Debug)]
pub enum AppError {
    CacheUnavailable { message: String },
    StoreUnavailable { message: String },
}

impl AppError {
    pub fn cache(message: impl Into<String>) -> Self {
        Self::CacheUnavailable {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CacheUnavailable { message } => write!(f, "cache unavailable: {}", message),
            Self::StoreUnavailable { message } => write!(f, "store unavailable: {}", message),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        Self::store(e.to_string())
    }
}

impl From<crate::infrastructure::cache::CacheError> for AppError {
    fn from(e: crate::infrastructure::cache::CacheError) -> Self {
        Self::cache(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            AppError::CacheUnavailable { message } => ("cache_unavailable", message),
            AppError::StoreUnavailable { message } => ("store_unavailable", message),
        };

        let body = ErrorBody {
            error: ErrorInfo { code, message },
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
