//! Integration Tests for cached reads backed by a retrying fetcher
//!
//! A loader that fails transiently is wrapped in `ErrorHandler::recover` and
//! used as the cache fetcher.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scout_services::{
    cache::{CacheManager, CacheSettings, GetOptions},
    recovery::{ErrorCategory, ErrorContext, ErrorHandler, RetryPolicy},
};
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error("network timeout while loading {0}")]
    Timeout(String),
    #[error("invalid brand filter")]
    BadFilter,
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay_ms: 5,
        max_delay_ms: 20,
        ..RetryPolicy::default()
    }
}

/// Loader that times out `failures` times, then returns the brand list.
async fn load_brands(calls: Arc<AtomicU32>, failures: u32) -> Result<Value, LoadError> {
    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
    if n <= failures {
        Err(LoadError::Timeout("brands".to_string()))
    } else {
        Ok(json!(["Alaska", "Bear Brand", "Nido"]))
    }
}

async fn recovering_fetch(
    errors: Arc<ErrorHandler>,
    calls: Arc<AtomicU32>,
    failures: u32,
) -> Result<Value, LoadError> {
    match load_brands(calls.clone(), failures).await {
        Ok(value) => Ok(value),
        Err(e) => {
            errors
                .recover(e, ErrorContext::new("load_brands"), || {
                    load_brands(calls.clone(), failures)
                })
                .await
        }
    }
}

#[tokio::test]
async fn test_transient_failure_is_recovered_and_cached() {
    let cache = CacheManager::new(CacheSettings::default());
    let errors = Arc::new(ErrorHandler::new(fast_retry(), 100));
    let calls = Arc::new(AtomicU32::new(0));

    let fetch = {
        let (errors, calls) = (errors.clone(), calls.clone());
        move || recovering_fetch(errors, calls, 2)
    };
    let value = cache
        .get("brands:all", fetch, GetOptions::default().ttl_ms(60_000))
        .await
        .unwrap();

    assert_eq!(value, json!(["Alaska", "Bear Brand", "Nido"]));
    // One direct call plus two from the retry loop
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let logs = errors.recent(10).await;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].category, ErrorCategory::Network);
    assert!(logs[0].resolved);
    assert_eq!(logs[0].retry_attempts, 2);

    // Served from cache, the loader is not called again
    let fetch = {
        let (errors, calls) = (errors.clone(), calls.clone());
        move || recovering_fetch(errors, calls, 0)
    };
    let cached = cache
        .get("brands:all", fetch, GetOptions::default())
        .await
        .unwrap();
    assert_eq!(cached, value);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_exhausted_retries_leave_cache_empty() {
    let cache = CacheManager::new(CacheSettings::default());
    let errors = Arc::new(ErrorHandler::new(fast_retry(), 100));
    let calls = Arc::new(AtomicU32::new(0));

    let fetch = {
        let (errors, calls) = (errors.clone(), calls.clone());
        move || recovering_fetch(errors, calls, 10)
    };
    let result = cache
        .get("brands:all", fetch, GetOptions::default())
        .await;

    assert!(matches!(result, Err(LoadError::Timeout(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(cache.len().await, 0);

    let stats = errors.stats().await;
    assert_eq!(stats.unresolved, 1);
}

#[tokio::test]
async fn test_stale_value_survives_failed_refresh() {
    let cache = CacheManager::new(CacheSettings::default());
    cache
        .set("brands:all", json!(["Alaska"]), Some(20))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;

    let value = cache
        .get(
            "brands:all",
            || async { Err::<Value, _>(LoadError::BadFilter) },
            GetOptions::default().stale_while_revalidate(true),
        )
        .await
        .unwrap();

    assert_eq!(value, json!(["Alaska"]));
}
