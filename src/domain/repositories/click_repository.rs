//! Repository trait for click event persistence.

use crate::domain::entities::ClickEvent;
use crate::error::AppError;
use async_trait::async_trait;

/// Write-side interface over the `click_events` table.
///
/// Consumed only by the background worker; request handlers never touch it.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Inserts a batch of click events in a single transaction.
    ///
    /// An empty batch is a no-op. Partial failure rolls the whole batch back;
    /// the caller decides whether the events are retried or dropped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    async fn insert_batch(&self, events: &[ClickEvent]) -> Result<(), AppError>;
}
