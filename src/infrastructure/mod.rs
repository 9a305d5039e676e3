//! Infrastructure layer: cache, stream, and database integrations.

pub mod cache;
pub mod persistence;
