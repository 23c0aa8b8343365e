//! Cache error types

use crate::pool::RedisPoolError;

/// Error type for permission cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache pool error: {0}")]
    Pool(#[from] RedisPoolError),

    #[error("Failed to serialize cache value: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
