//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL mapping as stored in the `links` table.
///
/// The core only reads links; creation and mutation belong to the admin
/// plane. `code` is immutable for the lifetime of the row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Link {
    pub code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    /// Compared in UTC; at or past this instant the link is gone.
    pub expires_at: Option<DateTime<Utc>>,
    pub is_disabled: bool,
    /// Opaque owner reference. `None` means system-owned.
    pub user_id: Option<i64>,
}

impl Link {
    /// Returns true when the link should answer `410 Gone`.
    ///
    /// Disabled links and links whose `expires_at` is at or before `now` are
    /// gone. Equality counts as expired so a link never serves past its
    /// advertised deadline.
    pub fn is_gone(&self, now: DateTime<Utc>) -> bool {
        if self.is_disabled {
            return true;
        }
        match self.expires_at {
            Some(expires_at) => expires_at <= now,
            None => false,
        }
    }
}
