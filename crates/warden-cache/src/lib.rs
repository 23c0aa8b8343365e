//! # warden-cache
//!
//! Permission cache with an in-process backend and a Redis backend.
//!
//! ## Example
//!
//! ```ignore
//! use warden_cache::{build_cache, PermissionCacheExt};
//!
//! let cache = build_cache(&config.cache, &config.redis)?;
//! let permissions: Vec<String> = cache
//!     .get_or_populate("permissions", &user_id.to_string(), || async {
//!         store.list_permissions_by_user_id(user_id).await
//!     })
//!     .await?;
//! ```

pub mod error;
pub mod pool;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use warden_common::{CacheBackend, CacheConfig, RedisConfig};

pub use error::{CacheError, CacheResult};
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool};
pub use store::{
    cache_key, spawn_sweep_task, InMemoryCache, PermissionCache, PermissionCacheExt, RedisCache,
    SharedCache, CACHE_NAMESPACE,
};

/// Build the configured cache backend. The in-memory backend also gets its
/// periodic sweep task, so this must run inside a Tokio runtime.
pub fn build_cache(cache: &CacheConfig, redis: &RedisConfig) -> CacheResult<SharedCache> {
    let ttl = Duration::from_secs(cache.default_ttl_secs);

    match cache.backend {
        CacheBackend::Memory => {
            let memory = Arc::new(InMemoryCache::new(ttl));
            spawn_sweep_task(
                Arc::clone(&memory),
                Duration::from_secs(cache.sweep_interval_secs.max(1)),
            );
            tracing::info!(
                default_ttl_secs = cache.default_ttl_secs,
                sweep_interval_secs = cache.sweep_interval_secs,
                "Using in-memory permission cache"
            );
            Ok(memory)
        }
        CacheBackend::Redis => {
            let pool = RedisPool::from_config(redis)?;
            tracing::info!(
                default_ttl_secs = cache.default_ttl_secs,
                "Using Redis permission cache"
            );
            Ok(Arc::new(RedisCache::new(pool, ttl)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_memory_backend() {
        let cache = build_cache(&CacheConfig::default(), &RedisConfig::default()).unwrap();
        assert_eq!(cache.backend_name(), "memory");
        assert_eq!(cache.default_ttl(), Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_redis_backend_requires_url() {
        let config = CacheConfig {
            backend: CacheBackend::Redis,
            ..CacheConfig::default()
        };
        let result = build_cache(&config, &RedisConfig::default());
        assert!(matches!(result, Err(CacheError::Pool(RedisPoolError::CreatePool(_)))));
    }

    #[tokio::test]
    async fn test_build_redis_backend_is_lazy() {
        let config = CacheConfig {
            backend: CacheBackend::Redis,
            ..CacheConfig::default()
        };
        let redis = RedisConfig {
            url: Some("redis://127.0.0.1:6379".to_string()),
            max_connections: 4,
        };
        let cache = build_cache(&config, &redis).unwrap();
        assert_eq!(cache.backend_name(), "redis");
    }
}
