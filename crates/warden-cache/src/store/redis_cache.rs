//! Redis cache backend
//!
//! Entries live under [`CACHE_NAMESPACE`] so that group and full clears can
//! SCAN for their keys without touching anything else in the database.
//! Expiry is delegated to Redis via `PSETEX`.

use async_trait::async_trait;
use std::time::Duration;

use super::{cache_key, PermissionCache};
use crate::error::CacheResult;
use crate::pool::RedisPool;

/// Key prefix for every cache entry
pub const CACHE_NAMESPACE: &str = "cache:";

/// Keys fetched per SCAN round trip
const SCAN_BATCH: usize = 200;

#[derive(Debug, Clone)]
pub struct RedisCache {
    pool: RedisPool,
    default_ttl: Duration,
}

impl RedisCache {
    #[must_use]
    pub fn new(pool: RedisPool, default_ttl: Duration) -> Self {
        Self { pool, default_ttl }
    }

    fn namespaced(key: &str) -> String {
        format!("{CACHE_NAMESPACE}{key}")
    }

    async fn delete_matching(&self, pattern: &str) -> CacheResult<u64> {
        let keys = self.pool.scan_keys(pattern, SCAN_BATCH).await?;
        let mut removed = 0;
        for batch in keys.chunks(SCAN_BATCH) {
            removed += self.pool.delete_many(batch).await?;
        }
        Ok(removed)
    }
}

const PSETEX_MAX_MILLIS: u64 = i64::MAX.unsigned_abs();

/// Whole milliseconds, rounded up and capped at what `PSETEX` accepts
fn ttl_millis(ttl: Duration) -> u64 {
    let millis = ttl.as_nanos().div_ceil(1_000_000);
    u64::try_from(millis).map_or(PSETEX_MAX_MILLIS, |m| m.min(PSETEX_MAX_MILLIS))
}

#[async_trait]
impl PermissionCache for RedisCache {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(self.pool.get_bytes(&Self::namespaced(key)).await?)
    }

    async fn set_raw(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        self.pool
            .set_bytes(&Self::namespaced(key), &value, ttl_millis(ttl))
            .await?;
        Ok(())
    }

    async fn invalidate(&self, group: &str, id: &str) -> CacheResult<()> {
        self.pool
            .delete(&Self::namespaced(&cache_key(group, id)))
            .await?;
        Ok(())
    }

    async fn invalidate_group(&self, group: &str) -> CacheResult<u64> {
        let removed = self
            .delete_matching(&format!("{CACHE_NAMESPACE}{group}:*"))
            .await?;
        tracing::debug!(group, removed, "Invalidated cache group");
        Ok(removed)
    }

    async fn invalidate_all(&self) -> CacheResult<u64> {
        let removed = self.delete_matching(&format!("{CACHE_NAMESPACE}*")).await?;
        tracing::debug!(removed, "Invalidated all cache entries");
        Ok(removed)
    }

    async fn sweep_expired(&self) -> CacheResult<u64> {
        // Redis evicts expired keys on its own
        Ok(0)
    }

    fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
