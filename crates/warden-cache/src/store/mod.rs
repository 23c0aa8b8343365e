//! Permission cache
//!
//! [`PermissionCache`] is the object-safe byte-level interface each backend
//! implements. [`PermissionCacheExt`] adds the typed read-through operation on
//! top of a shared `Arc<dyn PermissionCache>`.

mod memory;
mod redis_cache;

pub use memory::{spawn_sweep_task, InMemoryCache};
pub use redis_cache::{RedisCache, CACHE_NAMESPACE};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{CacheError, CacheResult};

/// Build the storage key for an entry
#[must_use]
pub fn cache_key(group: &str, id: &str) -> String {
    format!("{group}:{id}")
}

/// Byte-level cache backend
#[async_trait]
pub trait PermissionCache: Send + Sync {
    /// Read an unexpired entry
    async fn get_raw(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Write an entry that expires after `ttl`
    async fn set_raw(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()>;

    /// Drop one entry
    async fn invalidate(&self, group: &str, id: &str) -> CacheResult<()>;

    /// Drop every entry of a group. Returns the number removed.
    async fn invalidate_group(&self, group: &str) -> CacheResult<u64>;

    /// Drop every entry. Returns the number removed.
    async fn invalidate_all(&self) -> CacheResult<u64>;

    /// Remove expired entries. Returns the number removed.
    async fn sweep_expired(&self) -> CacheResult<u64>;

    /// TTL applied when the caller does not pick one
    fn default_ttl(&self) -> Duration;

    /// Backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Shared handle to the configured backend
pub type SharedCache = Arc<dyn PermissionCache>;

/// Typed read-through operations
#[async_trait]
pub trait PermissionCacheExt {
    /// Return the cached value for `group:id`, or run `fallback` and cache its result.
    ///
    /// A stored value that fails to deserialize counts as a miss. A fallback
    /// error is returned as is and nothing is written. The write-back runs
    /// detached, so the caller never waits on it.
    async fn get_or_populate<T, F, Fut, E>(&self, group: &str, id: &str, fallback: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        E: From<CacheError> + Send;

    /// Same as [`get_or_populate`](Self::get_or_populate) with a per-entry TTL
    async fn get_or_populate_with_ttl<T, F, Fut, E>(
        &self,
        group: &str,
        id: &str,
        ttl: Duration,
        fallback: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        E: From<CacheError> + Send;
}

#[async_trait]
impl PermissionCacheExt for SharedCache {
    async fn get_or_populate<T, F, Fut, E>(&self, group: &str, id: &str, fallback: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        E: From<CacheError> + Send,
    {
        let ttl = self.default_ttl();
        self.get_or_populate_with_ttl(group, id, ttl, fallback).await
    }

    async fn get_or_populate_with_ttl<T, F, Fut, E>(
        &self,
        group: &str,
        id: &str,
        ttl: Duration,
        fallback: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        E: From<CacheError> + Send,
    {
        let key = cache_key(group, id);

        match self.get_raw(&key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<T>(&bytes) {
                Ok(value) => {
                    tracing::trace!(key = %key, "Cache hit");
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                }
            },
            Ok(None) => tracing::trace!(key = %key, "Cache miss"),
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    backend = self.backend_name(),
                    error = %e,
                    "Cache read failed, using fallback"
                );
            }
        }

        let value = fallback().await?;
        let bytes = serde_json::to_vec(&value).map_err(CacheError::Serialization)?;

        let cache = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = cache.set_raw(&key, bytes, ttl).await {
                tracing::warn!(key = %key, error = %e, "Cache write-back failed");
            }
        });

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error("fallback failed")]
        Fallback,
        #[error(transparent)]
        Cache(#[from] CacheError),
    }

    fn shared() -> (Arc<InMemoryCache>, SharedCache) {
        let cache = Arc::new(InMemoryCache::new(Duration::from_secs(60)));
        let shared: SharedCache = cache.clone();
        (cache, shared)
    }

    /// Write-back is detached; poll until it lands
    async fn wait_for_entry(cache: &InMemoryCache, key: &str) {
        for _ in 0..50 {
            if cache.contains_key(key) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("entry {key} was never written back");
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("permissions", "42"), "permissions:42");
    }

    #[tokio::test]
    async fn test_hit_skips_fallback() {
        let (_, cache) = shared();
        cache
            .set_raw("permissions:1", br#"["file:list"]"#.to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        let calls = AtomicUsize::new(0);
        let value: Vec<String> = cache
            .get_or_populate("permissions", "1", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(vec![])
            })
            .await
            .unwrap();

        assert_eq!(value, vec!["file:list".to_string()]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_miss_populates() {
        let (memory, cache) = shared();

        let value: Vec<String> = cache
            .get_or_populate("permissions", "2", || async {
                Ok::<_, TestError>(vec!["file:delete".to_string()])
            })
            .await
            .unwrap();
        assert_eq!(value, vec!["file:delete".to_string()]);

        wait_for_entry(&memory, "permissions:2").await;
        let stored = cache.get_raw("permissions:2").await.unwrap().unwrap();
        assert_eq!(stored, br#"["file:delete"]"#.to_vec());
    }

    #[tokio::test]
    async fn test_corrupt_entry_falls_back_and_is_replaced() {
        let (memory, cache) = shared();
        cache
            .set_raw("permissions:3", b"{not json".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        let value: Vec<String> = cache
            .get_or_populate("permissions", "3", || async {
                Ok::<_, TestError>(vec!["file:list".to_string()])
            })
            .await
            .unwrap();
        assert_eq!(value, vec!["file:list".to_string()]);

        for _ in 0..50 {
            let stored = memory.peek("permissions:3");
            if stored.as_deref() == Some(br#"["file:list"]"#.as_slice()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("corrupt entry was not replaced");
    }

    #[tokio::test]
    async fn test_fallback_error_is_not_cached() {
        let (memory, cache) = shared();

        let result: Result<Vec<String>, TestError> = cache
            .get_or_populate("permissions", "4", || async { Err(TestError::Fallback) })
            .await;
        assert!(matches!(result, Err(TestError::Fallback)));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!memory.contains_key("permissions:4"));
    }

    #[tokio::test]
    async fn test_per_entry_ttl() {
        let (memory, cache) = shared();

        let _: Vec<String> = cache
            .get_or_populate_with_ttl("permissions", "5", Duration::from_millis(30), || async {
                Ok::<_, TestError>(vec![])
            })
            .await
            .unwrap();
        wait_for_entry(&memory, "permissions:5").await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.get_raw("permissions:5").await.unwrap().is_none());
    }
}
