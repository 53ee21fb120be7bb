//! Configuration Module
//!
//! Loads service configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::{CacheSettings, EvictionStrategy};
use crate::recovery::RetryPolicy;

/// Service configuration parameters.
///
/// Every value can be set through an environment variable; unset or
/// unparsable variables fall back to the default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Byte budget for the cache
    pub cache_max_bytes: usize,
    /// Default TTL in milliseconds for entries without explicit TTL
    pub cache_default_ttl_ms: u64,
    pub cache_eviction: EvictionStrategy,
    /// Store-wide stale-while-revalidate default, overridable per call
    pub cache_stale_while_revalidate: bool,
    pub cache_stale_window_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    pub retry_max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    /// Age in seconds after which the cleanup task drops error logs
    pub error_log_max_age_secs: u64,
    /// Maximum number of error logs held in memory
    pub error_log_capacity: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_BYTES` - Cache byte budget (default: 52428800)
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_EVICTION` - `lru`, `lfu` or `fifo` (default: lru)
    /// - `CACHE_STALE_WHILE_REVALIDATE` - Serve stale while refreshing (default: false)
    /// - `CACHE_STALE_WINDOW_MS` - How long stale values are kept (default: 60000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `RETRY_MAX_ATTEMPTS` - Attempts per recovered operation (default: 3)
    /// - `RETRY_BASE_DELAY_MS` - First backoff delay (default: 1000)
    /// - `RETRY_MAX_DELAY_MS` - Backoff cap (default: 10000)
    /// - `ERROR_LOG_MAX_AGE_SECS` - Error log retention (default: 86400)
    /// - `ERROR_LOG_CAPACITY` - Error log size bound (default: 1000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_max_bytes: env_or("CACHE_MAX_BYTES", defaults.cache_max_bytes),
            cache_default_ttl_ms: env_or("CACHE_DEFAULT_TTL_MS", defaults.cache_default_ttl_ms),
            cache_eviction: env_or("CACHE_EVICTION", defaults.cache_eviction),
            cache_stale_while_revalidate: env_or(
                "CACHE_STALE_WHILE_REVALIDATE",
                defaults.cache_stale_while_revalidate,
            ),
            cache_stale_window_ms: env_or("CACHE_STALE_WINDOW_MS", defaults.cache_stale_window_ms),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            retry_max_attempts: env_or("RETRY_MAX_ATTEMPTS", defaults.retry_max_attempts),
            retry_base_delay_ms: env_or("RETRY_BASE_DELAY_MS", defaults.retry_base_delay_ms),
            retry_max_delay_ms: env_or("RETRY_MAX_DELAY_MS", defaults.retry_max_delay_ms),
            error_log_max_age_secs: env_or(
                "ERROR_LOG_MAX_AGE_SECS",
                defaults.error_log_max_age_secs,
            ),
            error_log_capacity: env_or("ERROR_LOG_CAPACITY", defaults.error_log_capacity),
        }
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            max_bytes: self.cache_max_bytes,
            default_ttl_ms: self.cache_default_ttl_ms,
            strategy: self.cache_eviction,
            stale_while_revalidate: self.cache_stale_while_revalidate,
            stale_window_ms: self.cache_stale_window_ms,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts,
            base_delay_ms: self.retry_base_delay_ms,
            max_delay_ms: self.retry_max_delay_ms,
            ..RetryPolicy::default()
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        let cache = CacheSettings::default();
        let retry = RetryPolicy::default();
        Self {
            cache_max_bytes: cache.max_bytes,
            cache_default_ttl_ms: cache.default_ttl_ms,
            cache_eviction: cache.strategy,
            cache_stale_while_revalidate: cache.stale_while_revalidate,
            cache_stale_window_ms: cache.stale_window_ms,
            server_port: 3000,
            cleanup_interval: 60,
            retry_max_attempts: retry.max_attempts,
            retry_base_delay_ms: retry.base_delay_ms,
            retry_max_delay_ms: retry.max_delay_ms,
            error_log_max_age_secs: 86_400,
            error_log_capacity: 1000,
        }
    }
}
