//! Short code resolution for the redirect hot path.

use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::is_valid_code;

/// Terminal state of a resolution, mapping onto the HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    /// Redirect to the contained URL.
    Found(String),
    /// Unknown or malformed code.
    NotFound,
    /// The link exists but is disabled or expired.
    Gone,
}

/// Result of resolving a short code.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub outcome: ResolveOutcome,
    /// True when the answer came from the cache (positive or negative entry)
    /// without touching the store.
    pub cache_hit: bool,
}

impl Resolution {
    fn hit(outcome: ResolveOutcome) -> Self {
        Self {
            outcome,
            cache_hit: true,
        }
    }

    fn miss(outcome: ResolveOutcome) -> Self {
        Self {
            outcome,
            cache_hit: false,
        }
    }

    /// HTTP status the outcome maps to, before any 301/302 configuration.
    pub fn status(&self) -> u16 {
        match self.outcome {
            ResolveOutcome::Found(_) => 302,
            ResolveOutcome::NotFound => 404,
            ResolveOutcome::Gone => 410,
        }
    }
}

/// Orders the three-tier lookup: positive cache, negative cache, store.
///
/// The ordering keeps store load minimal: warm codes are answered in one
/// cache round-trip, and scanners probing nonexistent codes are absorbed by
/// the negative cache instead of hammering the database.
pub struct RedirectService {
    cache: Arc<dyn CacheService>,
    links: Arc<dyn LinkRepository>,
}

impl RedirectService {
    pub fn new(cache: Arc<dyn CacheService>, links: Arc<dyn LinkRepository>) -> Self {
        Self { cache, links }
    }

    /// Resolves a short code to a redirect outcome.
    ///
    /// Lookup order is strict and each step may short-circuit:
    ///
    /// 1. Syntactic validation: malformed codes 404 without any I/O and
    ///    without revealing they were malformed rather than unknown.
    /// 2. Positive cache: a non-empty value answers immediately.
    /// 3. Negative cache: a marker answers 404 immediately.
    /// 4. Store: misses write the negative marker, live links backfill the
    ///    positive cache. Disabled and expired links return Gone and are
    ///    deliberately NOT backfilled: re-enabling or clearing the expiry
    ///    must become visible without a cache purge.
    ///
    /// Backfill and negative-marker writes are best-effort; their failures
    /// are logged and never alter the response.
    ///
    /// # Errors
    ///
    /// Cache or store lookup failures propagate as [`AppError`]; the handler
    /// maps them to `500`. There is no store fallback on a cache outage.
    pub async fn resolve(&self, code: &str) -> Result<Resolution, AppError> {
        if !is_valid_code(code) {
            return Ok(Resolution::miss(ResolveOutcome::NotFound));
        }

        if let Some(url) = self.cache.get_url(code).await? {
            return Ok(Resolution::hit(ResolveOutcome::Found(url)));
        }

        if self.cache.is_miss(code).await? {
            return Ok(Resolution::hit(ResolveOutcome::NotFound));
        }

        let Some(link) = self.links.find_by_code(code).await? else {
            if let Err(e) = self.cache.set_miss(code).await {
                warn!(code, error = %e, "Failed to set negative cache entry");
            }
            return Ok(Resolution::miss(ResolveOutcome::NotFound));
        };

        if link.is_gone(Utc::now()) {
            return Ok(Resolution::miss(ResolveOutcome::Gone));
        }

        if let Err(e) = self.cache.set_url(code, &link.long_url).await {
            warn!(code, error = %e, "Failed to backfill cache");
        }

        Ok(Resolution::miss(ResolveOutcome::Found(link.long_url)))
    }
}
