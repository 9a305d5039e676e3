//! Repository trait for short link lookups.

use crate::domain::entities::Link;
use crate::error::AppError;
use async_trait::async_trait;

/// Read-side interface over the `links` table.
///
/// The redirect path only ever looks links up; all mutation lives in the
/// admin plane and is not part of this contract.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds a link by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if no row exists; absence is not an error
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;
}
