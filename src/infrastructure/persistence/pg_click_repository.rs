//! PostgreSQL implementation of click event persistence.

use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use std::sync::Arc;

use crate::domain::entities::ClickEvent;
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// PostgreSQL repository for batched click inserts.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn insert_batch(&self, events: &[ClickEvent]) -> Result<(), AppError> {
        if events.is_empty() {
            return Ok(());
        }

        // One multi-row INSERT inside a transaction: either the whole batch
        // lands or none of it does. At the default batch size of 500 this
        // stays well under Postgres's bind-parameter limit.
        let mut tx = self.pool.begin().await?;

        let mut query = QueryBuilder::new(
            "INSERT INTO click_events (code, ts, ip_hash, ua_hash, referer, request_id) ",
        );
        query.push_values(events, |mut row, event| {
            row.push_bind(&event.code)
                .push_bind(event.timestamp)
                .push_bind(&event.ip_hash)
                .push_bind(&event.ua_hash)
                .push_bind(&event.referer)
                .push_bind(&event.request_id);
        });

        query.build().execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(())
    }
}
