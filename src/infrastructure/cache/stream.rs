//! Append-only event stream with consumer-group semantics.

use super::service::CacheResult;
use async_trait::async_trait;
use std::time::Duration;

/// A single delivered stream entry.
///
/// `id` is the broker-assigned entry ID used for acknowledgment. `data` is
/// the raw payload of the entry's `data` field; entries without that field
/// surface an empty payload and are dropped by the consumer's parse step.
#[derive(Debug, Clone)]
pub struct StreamMessage {
    pub id: String,
    pub data: String,
}

/// Stream operations used by the click producer and consumer.
///
/// The producer and consumer share only the stream name; delivery semantics
/// come from the broker's consumer groups (one delivery per group, pending
/// entries until acknowledged). Additional workers joining the same group
/// shard the stream horizontally.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis Streams implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickStream: Send + Sync {
    /// Appends `payload` to the stream under the `data` field.
    async fn append(&self, stream: &str, payload: &str) -> CacheResult<()>;

    /// Reads up to `max_count` new messages for `(group, consumer)`.
    ///
    /// Blocks server-side for at most `block` before returning whatever is
    /// available (possibly nothing). Delivered messages enter the group's
    /// pending list until [`ClickStream::ack`] is called.
    async fn read(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        max_count: usize,
        block: Duration,
    ) -> CacheResult<Vec<StreamMessage>>;

    /// Acknowledges a delivered message for the group.
    async fn ack(&self, stream: &str, group: &str, id: &str) -> CacheResult<()>;

    /// Creates the consumer group anchored at `start_id`, creating the stream
    /// if needed. Succeeds when the group already exists.
    async fn ensure_group(&self, stream: &str, group: &str, start_id: &str) -> CacheResult<()>;
}
