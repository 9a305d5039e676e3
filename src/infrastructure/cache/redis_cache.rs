//! Redis-backed cache and stream implementation.

use super::service::{CacheError, CacheResult, CacheService};
use super::stream::{ClickStream, StreamMessage};
use async_trait::async_trait;
use redis::streams::{StreamReadOptions, StreamReadReply};
use redis::{AsyncCommands, Client, aio::ConnectionManager, aio::ConnectionManagerConfig};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Redis client covering both the KV hot path and the click-event stream.
///
/// Holds two multiplexed connections: `kv` serves GET/SET/EXISTS plus stream
/// appends, while `stream` is reserved for blocking `XREADGROUP` calls.
/// A blocking read parks the whole multiplexed connection, so giving the
/// consumer its own keeps redirect lookups off that wait.
pub struct RedisCache {
    kv: ConnectionManager,
    stream: ConnectionManager,
    key_prefix: String,
    negative_ttl: Duration,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the address is invalid, the
    /// connection cannot be established within `dial_timeout`, or PING fails.
    pub async fn connect(
        addr: &str,
        key_prefix: &str,
        negative_ttl: Duration,
        dial_timeout: Duration,
        rw_timeout: Duration,
    ) -> CacheResult<Self> {
        info!(addr, "Connecting to Redis");

        let client = Client::open(format!("redis://{}", addr)).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let config = ConnectionManagerConfig::new()
            .set_connection_timeout(dial_timeout)
            .set_response_timeout(rw_timeout);

        let kv = ConnectionManager::new_with_config(client.clone(), config)
            .await
            .map_err(|e| {
                CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
            })?;

        // Blocking XREADGROUP calls need headroom beyond the block duration,
        // so the stream connection gets a looser response timeout.
        let stream_config = ConnectionManagerConfig::new()
            .set_connection_timeout(dial_timeout)
            .set_response_timeout(rw_timeout + Duration::from_millis(200));

        let stream = ConnectionManager::new_with_config(client, stream_config)
            .await
            .map_err(|e| {
                CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
            })?;

        let mut test_conn = kv.clone();
        redis::cmd("PING")
            .query_async::<()>(&mut test_conn)
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            kv,
            stream,
            key_prefix: key_prefix.to_string(),
            negative_ttl,
        })
    }

    fn link_key(&self, code: &str) -> String {
        format!("{}:link:{}", self.key_prefix, code)
    }

    fn miss_key(&self, code: &str) -> String {
        format!("{}:miss:{}", self.key_prefix, code)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, code: &str) -> CacheResult<Option<String>> {
        let mut conn = self.kv.clone();
        let url: Option<String> = conn.get(self.link_key(code)).await?;

        match &url {
            Some(_) => debug!(code, "cache hit"),
            None => debug!(code, "cache miss"),
        }
        Ok(url)
    }

    async fn set_url(&self, code: &str, url: &str) -> CacheResult<()> {
        let mut conn = self.kv.clone();
        conn.set::<_, _, ()>(self.link_key(code), url).await?;
        Ok(())
    }

    async fn is_miss(&self, code: &str) -> CacheResult<bool> {
        let mut conn = self.kv.clone();
        let exists: bool = conn.exists(self.miss_key(code)).await?;
        Ok(exists)
    }

    async fn set_miss(&self, code: &str) -> CacheResult<()> {
        let mut conn = self.kv.clone();
        conn.set_ex::<_, _, ()>(self.miss_key(code), "1", self.negative_ttl.as_secs())
            .await?;
        Ok(())
    }

    async fn ping(&self) -> bool {
        let mut conn = self.kv.clone();
        redis::cmd("PING")
            .query_async::<()>(&mut conn)
            .await
            .is_ok()
    }
}

#[async_trait]
impl ClickStream for RedisCache {
    async fn append(&self, stream: &str, payload: &str) -> CacheResult<()> {
        // Appends go through the KV connection: XADD never blocks, and the
        // stream connection may be parked in a long XREADGROUP.
        let mut conn = self.kv.clone();
        conn.xadd::<_, _, _, _, ()>(stream, "*", &[("data", payload)])
            .await?;
        Ok(())
    }

    async fn read(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        max_count: usize,
        block: Duration,
    ) -> CacheResult<Vec<StreamMessage>> {
        let mut conn = self.stream.clone();
        let options = StreamReadOptions::default()
            .group(group, consumer)
            .count(max_count)
            .block(block.as_millis() as usize);

        let reply: Option<StreamReadReply> =
            conn.xread_options(&[stream], &[">"], &options).await?;

        let Some(reply) = reply else {
            return Ok(Vec::new());
        };

        let mut messages = Vec::new();
        for key in reply.keys {
            for entry in key.ids {
                let data = entry.get::<String>("data").unwrap_or_default();
                messages.push(StreamMessage { id: entry.id, data });
            }
        }
        Ok(messages)
    }

    async fn ack(&self, stream: &str, group: &str, id: &str) -> CacheResult<()> {
        let mut conn = self.stream.clone();
        conn.xack::<_, _, _, ()>(stream, group, &[id]).await?;
        Ok(())
    }

    async fn ensure_group(&self, stream: &str, group: &str, start_id: &str) -> CacheResult<()> {
        let mut conn = self.kv.clone();
        match conn
            .xgroup_create_mkstream::<_, _, _, ()>(stream, group, start_id)
            .await
        {
            Ok(()) => {
                info!(stream, group, "Created stream consumer group");
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => {
                debug!(stream, group, "Consumer group already exists");
                Ok(())
            }
            Err(e) => {
                warn!(stream, group, error = %e, "Failed to create consumer group");
                Err(e.into())
            }
        }
    }
}
