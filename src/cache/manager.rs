//! Cache Manager Module
//!
//! Async read-through front for [`CacheStore`]: fetch on miss, stale-while-revalidate,
//! and stale fallback when a fetch fails.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::inflight::InFlight;
use crate::cache::{CacheSettings, CacheStats, CacheStore, InvalidationPattern, Lookup};
use crate::error::Result;

// == Get Options ==
/// Per-call overrides for [`CacheManager::get`].
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// TTL in milliseconds for a freshly fetched value
    pub ttl_ms: Option<u64>,
    /// Overrides the store-wide stale-while-revalidate setting
    pub stale_while_revalidate: Option<bool>,
    /// Skip the cached value and always fetch
    pub force_refresh: bool,
}

impl GetOptions {
    pub fn ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = Some(ttl_ms);
        self
    }

    pub fn stale_while_revalidate(mut self, enabled: bool) -> Self {
        self.stale_while_revalidate = Some(enabled);
        self
    }

    pub fn force_refresh(mut self) -> Self {
        self.force_refresh = true;
        self
    }
}

// == Cache Manager ==
/// Shared, cloneable handle to a cache store.
///
/// Cloning is cheap; every clone talks to the same store.
#[derive(Debug, Clone)]
pub struct CacheManager {
    store: Arc<RwLock<CacheStore>>,
    inflight: Arc<InFlight>,
}

impl CacheManager {
    /// Creates a manager over an empty store.
    pub fn new(settings: CacheSettings) -> Self {
        Self::from_store(CacheStore::new(settings))
    }

    pub fn from_store(store: CacheStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            inflight: Arc::new(InFlight::default()),
        }
    }

    // == Get ==
    /// Returns the cached value for `key`, calling `fetch` when needed.
    ///
    /// - Live entry: returned as is, `fetch` is not called.
    /// - Expired entry with stale-while-revalidate on: the stale value is
    ///   returned at once and `fetch` runs in a background task to refresh it.
    /// - Otherwise `fetch` is awaited and its value stored with the TTL.
    ///
    /// When `fetch` fails and stale-while-revalidate is on, a stale value is
    /// returned in place of the error if one is held. Concurrent misses on the
    /// same key each call their own `fetch`.
    pub async fn get<F, Fut, E>(
        &self,
        key: &str,
        fetch: F,
        options: GetOptions,
    ) -> std::result::Result<Value, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<Value, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let (swr, fallback) = {
            let mut store = self.store.write().await;
            let swr = options
                .stale_while_revalidate
                .unwrap_or(store.settings().stale_while_revalidate);

            let fallback = if options.force_refresh {
                store.record_miss();
                store.fallback_value(key)
            } else {
                match store.lookup(key) {
                    Lookup::Fresh(value) => return Ok(value),
                    Lookup::Stale(value) if swr => {
                        store.record_stale_hit();
                        drop(store);
                        debug!("Serving stale '{}' while revalidating", key);
                        self.spawn_revalidation(key.to_string(), fetch, options.ttl_ms);
                        return Ok(value);
                    }
                    Lookup::Stale(value) => {
                        store.record_miss();
                        Some(value)
                    }
                    Lookup::Miss => {
                        store.record_miss();
                        None
                    }
                }
            };

            (swr, fallback)
        };

        let fetching = self.inflight.begin(key);
        let result = fetch().await;
        drop(fetching);

        let mut store = self.store.write().await;
        match result {
            Ok(value) => {
                if let Err(e) = store.set(key.to_string(), value.clone(), options.ttl_ms) {
                    warn!("Fetched value for '{}' not cached: {}", key, e);
                }
                Ok(value)
            }
            Err(e) => match fallback {
                Some(stale) if swr => {
                    warn!("Fetch for '{}' failed, serving stale value: {}", key, e);
                    store.record_stale_hit();
                    Ok(stale)
                }
                _ => Err(e),
            },
        }
    }

    // == Spawn Revalidation ==
    /// Refreshes `key` in the background; failures keep the stale entry.
    fn spawn_revalidation<F, Fut, E>(&self, key: String, fetch: F, ttl_ms: Option<u64>)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<Value, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let inflight = Arc::clone(&self.inflight);
        tokio::spawn(async move {
            let fetching = inflight.begin(&key);
            let result = fetch().await;
            drop(fetching);

            let mut guard = store.write().await;
            match result {
                Ok(value) => match guard.set(key.clone(), value, ttl_ms) {
                    Ok(()) => {
                        guard.record_revalidation(true);
                        debug!("Revalidated '{}'", key);
                    }
                    Err(e) => {
                        guard.record_revalidation(false);
                        warn!("Revalidated value for '{}' not cached: {}", key, e);
                    }
                },
                Err(e) => {
                    guard.record_revalidation(false);
                    warn!("Background revalidation of '{}' failed: {}", key, e);
                }
            }
        });
    }

    // == Set ==
    /// Stores a value unconditionally.
    pub async fn set(
        &self,
        key: impl Into<String>,
        value: Value,
        ttl_ms: Option<u64>,
    ) -> Result<()> {
        self.store.write().await.set(key.into(), value, ttl_ms)
    }

    // == Peek ==
    /// Reads a key without ever fetching.
    pub async fn peek(&self, key: &str) -> Lookup {
        self.store.write().await.peek(key)
    }

    // == Delete ==
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.store.write().await.delete(key)
    }

    // == Invalidate ==
    /// Removes matching entries; `None` clears the whole cache.
    pub async fn invalidate(&self, pattern: Option<&InvalidationPattern>) -> usize {
        let removed = {
            let mut store = self.store.write().await;
            match pattern {
                Some(pattern) => store.invalidate(pattern),
                None => store.invalidate(&InvalidationPattern::All),
            }
        };
        info!("Invalidated {} cache entries", removed);
        removed
    }

    // == Cleanup Expired ==
    pub async fn cleanup_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        let mut stats = self.store.read().await.stats();
        stats.duplicate_fetches = self.inflight.duplicates();
        stats
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn total_size(&self) -> usize {
        self.store.read().await.total_size()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    fn manager() -> CacheManager {
        CacheManager::new(CacheSettings::default())
    }

    /// Fetcher that counts its calls and yields `value`.
    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
        value: Value,
    ) -> impl FnOnce() -> std::future::Ready<std::result::Result<Value, String>> + Send + 'static
    {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(value))
        }
    }

    fn failing_fetch(
        calls: &Arc<AtomicUsize>,
    ) -> impl FnOnce() -> std::future::Ready<std::result::Result<Value, String>> + Send + 'static
    {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Err("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_miss_fetches_and_stores() {
        let cache = manager();
        let calls = Arc::new(AtomicUsize::new(0));

        let value = cache
            .get("brands", counting_fetch(&calls, json!(["Alaska"])), GetOptions::default())
            .await
            .unwrap();
        assert_eq!(value, json!(["Alaska"]));

        let again = cache
            .get("brands", counting_fetch(&calls, json!("unused")), GetOptions::default())
            .await
            .unwrap();
        assert_eq!(again, json!(["Alaska"]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_set_then_get_before_and_after_ttl() {
        let cache = manager();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.set("k", json!({"v": 1}), Some(50)).await.unwrap();
        sleep(Duration::from_millis(10)).await;

        let value = cache
            .get("k", counting_fetch(&calls, json!({"v": 2})), GetOptions::default())
            .await
            .unwrap();
        assert_eq!(value, json!({"v": 1}));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(60)).await;

        let value = cache
            .get("k", counting_fetch(&calls, json!({"v": 2})), GetOptions::default())
            .await
            .unwrap();
        assert_eq!(value, json!({"v": 2}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_while_revalidate_serves_stale_and_refreshes() {
        let cache = manager();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.set("k", json!("old"), Some(20)).await.unwrap();
        sleep(Duration::from_millis(40)).await;

        let options = GetOptions::default().stale_while_revalidate(true);
        let value = cache
            .get("k", counting_fetch(&calls, json!("new")), options)
            .await
            .unwrap();
        assert_eq!(value, json!("old"));

        // Let the background refresh land
        sleep(Duration::from_millis(50)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.peek("k").await, Lookup::Fresh(json!("new")));

        let stats = cache.stats().await;
        assert_eq!(stats.stale_hits, 1);
        assert_eq!(stats.revalidations, 1);
    }

    #[tokio::test]
    async fn test_failed_revalidation_keeps_stale_entry() {
        let cache = manager();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.set("k", json!("old"), Some(10)).await.unwrap();
        sleep(Duration::from_millis(30)).await;

        let options = GetOptions::default().stale_while_revalidate(true);
        let value = cache.get("k", failing_fetch(&calls), options).await.unwrap();
        assert_eq!(value, json!("old"));

        sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.peek("k").await, Lookup::Stale(json!("old")));
        assert_eq!(cache.stats().await.failed_revalidations, 1);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_without_swr() {
        let cache = manager();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.set("k", json!("old"), Some(10)).await.unwrap();
        sleep(Duration::from_millis(30)).await;

        let result = cache.get("k", failing_fetch(&calls), GetOptions::default()).await;
        assert_eq!(result, Err("connection refused".to_string()));
    }

    #[tokio::test]
    async fn test_force_refresh_falls_back_to_cached_value_on_error() {
        let cache = manager();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.set("k", json!("cached"), None).await.unwrap();

        let options = GetOptions::default().force_refresh().stale_while_revalidate(true);
        let value = cache.get("k", failing_fetch(&calls), options).await.unwrap();

        assert_eq!(value, json!("cached"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_replaces_live_value() {
        let cache = manager();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.set("k", json!(1), None).await.unwrap();
        let value = cache
            .get("k", counting_fetch(&calls, json!(2)), GetOptions::default().force_refresh())
            .await
            .unwrap();

        assert_eq!(value, json!(2));
        assert_eq!(cache.peek("k").await, Lookup::Fresh(json!(2)));
    }

    #[tokio::test]
    async fn test_miss_without_stale_propagates_error_even_with_swr() {
        let cache = manager();
        let calls = Arc::new(AtomicUsize::new(0));

        let options = GetOptions::default().stale_while_revalidate(true);
        let result = cache.get("nothing", failing_fetch(&calls), options).await;

        assert!(result.is_err());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_misses_are_not_deduplicated() {
        let cache = manager();
        let calls = Arc::new(AtomicUsize::new(0));

        let slow = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                sleep(Duration::from_millis(30)).await;
                Ok::<Value, String>(json!("sales"))
            }
        };

        let (a, b) = tokio::join!(
            cache.get("sales", slow(Arc::clone(&calls)), GetOptions::default()),
            cache.get("sales", slow(Arc::clone(&calls)), GetOptions::default()),
        );

        assert_eq!(a.unwrap(), json!("sales"));
        assert_eq!(b.unwrap(), json!("sales"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().await.duplicate_fetches, 1);
    }

    #[tokio::test]
    async fn test_cancelled_fetch_releases_its_slot() {
        let cache = manager();

        let slow = || async {
            sleep(Duration::from_secs(5)).await;
            Ok::<Value, String>(json!("late"))
        };
        let cancelled = tokio::time::timeout(
            Duration::from_millis(20),
            cache.get("k", slow, GetOptions::default()),
        )
        .await;
        assert!(cancelled.is_err());
        assert_eq!(cache.inflight.running("k"), 0);

        let calls = Arc::new(AtomicUsize::new(0));
        let value = cache
            .get("k", counting_fetch(&calls, json!("fresh")), GetOptions::default())
            .await
            .unwrap();

        assert_eq!(value, json!("fresh"));
        assert_eq!(cache.stats().await.duplicate_fetches, 0);
    }

    #[tokio::test]
    async fn test_invalidate_all_and_pattern() {
        let cache = manager();
        cache.set("brands:1", json!(1), None).await.unwrap();
        cache.set("brands:2", json!(2), None).await.unwrap();
        cache.set("stores:1", json!(3), None).await.unwrap();

        let pattern = InvalidationPattern::Contains("brands".to_string());
        assert_eq!(cache.invalidate(Some(&pattern)).await, 2);
        assert_eq!(cache.invalidate(None).await, 1);
        assert_eq!(cache.len().await, 0);
        assert_eq!(cache.total_size().await, 0);
    }
}
