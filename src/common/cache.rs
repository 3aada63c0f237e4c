// src/common/cache.rs
//! Read-through cache for public listings.
//!
//! Entries are disposable views of the database: they expire after a TTL and
//! every successful mutation drops the keys of its collection by prefix.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::ApiError;

#[derive(Debug, Clone)]
struct CachedEntry {
    value: serde_json::Value,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<String, CachedEntry>>>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Returns the cached value for `key` or runs `load` and caches its result
    pub async fn get_or_load<T, F, Fut>(&self, key: &str, load: F) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(key) {
                if entry.expires_at > Utc::now() {
                    if let Ok(value) = serde_json::from_value(entry.value.clone()) {
                        debug!(key = %key, "Query cache hit");
                        return Ok(value);
                    }
                }
            }
        }

        let value = load().await?;
        match serde_json::to_value(&value) {
            Ok(json) => {
                self.entries.write().await.insert(
                    key.to_string(),
                    CachedEntry {
                        value: json,
                        expires_at: Utc::now() + self.ttl,
                    },
                );
            }
            Err(e) => debug!(key = %key, error = %e, "Skipping cache for unserializable value"),
        }

        Ok(value)
    }

    /// Drops every key starting with `prefix`
    pub async fn invalidate_prefix(&self, prefix: &str) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        debug!(prefix = %prefix, dropped = before - entries.len(), "Query cache invalidated");
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let cache = QueryCache::new(60);
        let loads = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Vec<String> = cache
                .get_or_load("events:active", || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(vec!["Easter Service".to_string()])
                })
                .await
                .unwrap();
            assert_eq!(value, vec!["Easter Service".to_string()]);
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_prefix_only_drops_matching_keys() {
        let cache = QueryCache::new(60);
        let _: i64 = cache.get_or_load("events:active", || async { Ok(1) }).await.unwrap();
        let _: i64 = cache.get_or_load("events:upcoming", || async { Ok(2) }).await.unwrap();
        let _: i64 = cache.get_or_load("videos:active", || async { Ok(3) }).await.unwrap();

        cache.invalidate_prefix("events:").await;
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_entries_reload() {
        let cache = QueryCache::new(0);
        let loads = AtomicUsize::new(0);
        for _ in 0..2 {
            let _: i64 = cache
                .get_or_load("k", || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await
                .unwrap();
        }
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_load_errors_are_not_cached() {
        let cache = QueryCache::new(60);
        let result: Result<i64, ApiError> = cache
            .get_or_load("k", || async { Err(ApiError::InternalServer("down".to_string())) })
            .await;
        assert!(result.is_err());
        assert_eq!(cache.len().await, 0);
    }
}
