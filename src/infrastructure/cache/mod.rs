//! Cache and stream infrastructure backed by Redis.

pub mod redis_cache;
pub mod service;
pub mod stream;

pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};
pub use stream::{ClickStream, StreamMessage};

#[cfg(test)]
pub use service::MockCacheService;
#[cfg(test)]
pub use stream::MockClickStream;
