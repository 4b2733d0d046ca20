//! Read-through cache for reference data
//!
//! Entries are keyed by `"{kind}.{tenant}.{locale}"` strings and expire
//! after a fixed time-to-live. Concurrent misses for the same key may both
//! call the loader; the last result wins.

use std::future::Future;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use core_kernel::TenantId;

use crate::reference::ReferenceDataKind;

/// Default time-to-live for cache entries
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Maximum number of entries in the cache
const MAX_CACHE_SIZE: usize = 4_096;

/// Builds the cache key for a kind, tenant and locale
///
/// `None` for the locale denotes the list across all locales.
pub fn cache_key(kind: impl std::fmt::Display, tenant_id: TenantId, locale_id: Option<&str>) -> String {
    format!("{}.{}.{}", kind, tenant_id, locale_id.unwrap_or("*"))
}

#[derive(Debug, Clone)]
struct CachedEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Thread-safe TTL cache for loaded reference data
#[derive(Debug)]
pub struct ReferenceDataCache<V> {
    entries: DashMap<String, CachedEntry<V>>,
    ttl: Duration,
}

impl<V: Clone> ReferenceDataCache<V> {
    /// Creates a cache with the default time-to-live
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Creates a cache with the given time-to-live
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Returns the cached value if present and not expired
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.entries.get(key)?;
        if entry.inserted_at.elapsed() < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Inserts a value, evicting entries if the cache is full
    pub fn insert(&self, key: impl Into<String>, value: V) {
        if self.entries.len() >= MAX_CACHE_SIZE {
            self.evict_expired();
        }

        if self.entries.len() >= MAX_CACHE_SIZE {
            let to_remove: Vec<String> = self
                .entries
                .iter()
                .take(MAX_CACHE_SIZE / 10)
                .map(|r| r.key().clone())
                .collect();
            for key in to_remove {
                self.entries.remove(&key);
            }
        }

        self.entries.insert(
            key.into(),
            CachedEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Returns the cached value, or loads and caches it on a miss
    ///
    /// Loader errors are returned as-is and nothing is cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &str, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        debug!(key, "Reference data cache miss");
        let value = loader().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Removes every entry
    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    /// Removes every entry for the given kind
    pub fn invalidate_kind(&self, kind: ReferenceDataKind) {
        let prefix = format!("{}.", kind);
        self.entries.retain(|key, _| !key.starts_with(&prefix));
    }

    fn evict_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for ReferenceDataCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_cache_key_format() {
        let key = cache_key(ReferenceDataKind::Gender, TenantId::DEFAULT, Some("en-US"));
        assert!(key.starts_with("gender."));
        assert!(key.ends_with(".en-US"));
        assert!(cache_key(ReferenceDataKind::Gender, TenantId::DEFAULT, None).ends_with(".*"));
    }

    #[tokio::test]
    async fn test_loader_called_once_until_invalidated() {
        let cache: ReferenceDataCache<Vec<String>> = ReferenceDataCache::new();
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let load = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(vec!["male".to_string()])
        };

        cache.get_or_try_insert_with("gender.t.en-US", load).await.unwrap();
        cache.get_or_try_insert_with("gender.t.en-US", load).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate_all();
        cache.get_or_try_insert_with("gender.t.en-US", load).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_loader_error_is_not_cached() {
        let cache: ReferenceDataCache<u32> = ReferenceDataCache::new();
        let result = cache
            .get_or_try_insert_with("title.t.en-US", || async { Err::<u32, _>("down") })
            .await;
        assert_eq!(result, Err("down"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_are_misses() {
        let cache: ReferenceDataCache<u32> = ReferenceDataCache::with_ttl(Duration::ZERO);
        cache.insert("gender.t.en-US", 1);
        assert_eq!(cache.get("gender.t.en-US"), None);
    }

    #[test]
    fn test_invalidate_kind() {
        let cache: ReferenceDataCache<u32> = ReferenceDataCache::new();
        cache.insert(cache_key(ReferenceDataKind::Gender, TenantId::DEFAULT, Some("en-US")), 1);
        cache.insert(cache_key(ReferenceDataKind::Gender, TenantId::DEFAULT, None), 2);
        cache.insert(cache_key(ReferenceDataKind::Title, TenantId::DEFAULT, Some("en-US")), 3);

        cache.invalidate_kind(ReferenceDataKind::Gender);
        assert_eq!(cache.len(), 1);
    }
}
