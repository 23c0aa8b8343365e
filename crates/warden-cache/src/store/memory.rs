//! In-process cache backend

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use super::PermissionCache;
use crate::error::CacheResult;

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// Cap for lifetimes that would overflow `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

fn deadline(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Map-backed cache guarded by a reader/writer lock
#[derive(Debug)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    default_ttl: Duration,
}

impl InMemoryCache {
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Number of stored entries, expired ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    #[cfg(test)]
    pub(crate) fn peek(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.read().get(key).map(|e| e.value.clone())
    }

    fn remove_where(&self, predicate: impl Fn(&str, &Entry) -> bool) -> u64 {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, entry| !predicate(key, entry));
        (before - entries.len()) as u64
    }
}

#[async_trait]
impl PermissionCache for InMemoryCache {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: drop it unless a writer refreshed it in between
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set_raw(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        let entry = Entry {
            value,
            expires_at: deadline(Instant::now(), ttl),
        };
        self.entries.write().insert(key.to_string(), entry);
        Ok(())
    }

    async fn invalidate(&self, group: &str, id: &str) -> CacheResult<()> {
        self.entries.write().remove(&super::cache_key(group, id));
        Ok(())
    }

    async fn invalidate_group(&self, group: &str) -> CacheResult<u64> {
        let prefix = format!("{group}:");
        Ok(self.remove_where(|key, _| key.starts_with(&prefix)))
    }

    async fn invalidate_all(&self) -> CacheResult<u64> {
        let mut entries = self.entries.write();
        let removed = entries.len() as u64;
        entries.clear();
        Ok(removed)
    }

    async fn sweep_expired(&self) -> CacheResult<u64> {
        let now = Instant::now();
        Ok(self.remove_where(|_, entry| entry.is_expired(now)))
    }

    fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Periodically remove expired entries. The first sweep runs one `period`
/// after spawning.
pub fn spawn_sweep_task(cache: Arc<InMemoryCache>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            ticker.tick().await;
            match cache.sweep_expired().await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "Swept expired cache entries"),
                Err(e) => tracing::warn!(error = %e, "Cache sweep failed"),
            }
        }
    })
}
