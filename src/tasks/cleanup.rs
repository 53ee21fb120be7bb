//! Cleanup Task
//!
//! Background task that periodically drops expired cache entries and aged
//! error logs.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheManager;
use crate::recovery::ErrorHandler;

/// Spawns a background task that periodically cleans up the cache and error log.
///
/// Each run removes cache entries past their stale window and error logs
/// older than `error_max_age_secs`.
///
/// # Arguments
/// * `cache` - Shared cache handle
/// * `errors` - Shared error handler
/// * `cleanup_interval_secs` - Interval in seconds between runs
/// * `error_max_age_secs` - Age at which error logs are dropped
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(
    cache: CacheManager,
    errors: Arc<ErrorHandler>,
    cleanup_interval_secs: u64,
    error_max_age_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));
    let max_age = i64::try_from(error_max_age_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(chrono::Duration::MAX);

    tokio::spawn(async move {
        info!(
            "Starting cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let expired = cache.cleanup_expired().await;
            let aged = errors.cleanup(max_age).await;

            if expired > 0 || aged > 0 {
                info!(
                    "Cleanup: removed {} expired entries and {} old error logs",
                    expired, aged
                );
            } else {
                debug!("Cleanup: nothing to remove");
            }
        }
    })
}
