//! In-memory response cache with TTL expiry

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::application::errors::CacheError;
use crate::application::services::CacheService;

/// Cache statistics for monitoring
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expired_entries: u64,
}

struct CacheEntry {
    data: Value,
    expires_at: Instant,
}

/// In-memory cache keyed by string with per-entry TTL.
///
/// A pure memoization layer: entries are never served past their TTL and
/// there is no eviction beyond TTL expiry. Writes are last-write-wins; a
/// stale overwrite only costs one extra upstream call.
pub struct MemoryCacheRepository {
    entries: RwLock<HashMap<String, CacheEntry>>,
    stats: Mutex<CacheStats>,
}

impl MemoryCacheRepository {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Get cache statistics for monitoring
    pub async fn stats(&self) -> CacheStats {
        self.stats.lock().await.clone()
    }

    /// Number of stored entries, including not-yet-collected expired ones.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for MemoryCacheRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for MemoryCacheRepository {
    async fn get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if now < entry.expires_at => {
                    let value = serde_json::from_value(entry.data.clone())?;
                    self.stats.lock().await.hits += 1;
                    debug!(key, "cache hit");
                    return Ok(Some(value));
                }
                Some(_) => {} // expired, removed below
                None => {
                    self.stats.lock().await.misses += 1;
                    return Ok(None);
                }
            }
        }

        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            // A concurrent set may have replaced the entry in the meantime.
            if now < entry.expires_at {
                let value = serde_json::from_value(entry.data.clone())?;
                self.stats.lock().await.hits += 1;
                return Ok(Some(value));
            }
            entries.remove(key);
            let mut stats = self.stats.lock().await;
            stats.expired_entries += 1;
            stats.misses += 1;
            debug!(key, "cache entry expired");
        }
        Ok(None)
    }

    async fn set<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: serde::Serialize + Send + Sync,
    {
        let data = serde_json::to_value(value)?;
        let entry = CacheEntry {
            data,
            expires_at: Instant::now() + ttl,
        };

        self.entries.write().await.insert(key.to_string(), entry);
        debug!(key, ttl_seconds = ttl.as_secs(), "cached entry");
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn entry_is_served_within_ttl() {
        let cache = MemoryCacheRepository::new();
        cache
            .set("k", &json!({"a": 1}), Duration::from_secs(60))
            .await
            .unwrap();

        let value: Option<Value> = cache.get("k").await.unwrap();
        assert_eq!(value, Some(json!({"a": 1})));

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[tokio::test]
    async fn entry_is_never_served_past_ttl() {
        let cache = MemoryCacheRepository::new();
        cache
            .set("k", &json!({"a": 1}), Duration::from_millis(30))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;

        let value: Option<Value> = cache.get("k").await.unwrap();
        assert_eq!(value, None);

        let stats = cache.stats().await;
        assert_eq!(stats.expired_entries, 1);
        assert_eq!(stats.misses, 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn missing_key_is_a_miss() {
        let cache = MemoryCacheRepository::new();
        let value: Option<Value> = cache.get("absent").await.unwrap();
        assert_eq!(value, None);
        assert_eq!(cache.stats().await.misses, 1);
    }

    #[tokio::test]
    async fn set_overwrites_existing_entry() {
        let cache = MemoryCacheRepository::new();
        cache
            .set("k", &json!(1), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("k", &json!(2), Duration::from_secs(60))
            .await
            .unwrap();

        let value: Option<Value> = cache.get("k").await.unwrap();
        assert_eq!(value, Some(json!(2)));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = MemoryCacheRepository::new();
        cache
            .set("k", &json!(1), Duration::from_secs(60))
            .await
            .unwrap();
        cache.invalidate("k").await.unwrap();

        let value: Option<Value> = cache.get("k").await.unwrap();
        assert_eq!(value, None);
    }
}
