//! Cache service trait and error types.

use async_trait::async_trait;
use std::fmt;

/// Errors that can occur during cache or stream operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout() {
            Self::ConnectionError(e.to_string())
        } else {
            Self::OperationError(e.to_string())
        }
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// KV lookups backing the redirect hot path.
///
/// Two logical keys per code: a positive entry mapping the code to its long
/// URL (no TTL, invalidated by the admin plane) and a negative marker for
/// codes known to be absent (short TTL, shields the store from lookup storms
/// on nonexistent codes).
///
/// Unlike a fail-open cache, lookup errors here MUST propagate: the resolver
/// treats an unreachable cache as fatal to the request rather than falling
/// through to the store.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the long URL for a code.
    ///
    /// `Ok(None)` means the key is absent; `Err` means the cache itself is
    /// unreachable or misbehaving.
    async fn get_url(&self, code: &str) -> CacheResult<Option<String>>;

    /// Stores a code → URL mapping with no TTL.
    async fn set_url(&self, code: &str, url: &str) -> CacheResult<()>;

    /// Checks whether the code carries a negative ("known absent") marker.
    async fn is_miss(&self, code: &str) -> CacheResult<bool>;

    /// Writes the negative marker with the configured TTL.
    async fn set_miss(&self, code: &str) -> CacheResult<()>;

    /// Round-trips a PING. Used for fail-fast startup checks.
    async fn ping(&self) -> bool;
}
