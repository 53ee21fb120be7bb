//! Retry logic with exponential backoff

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Delay before the second attempt (milliseconds)
    pub base_delay_ms: u64,

    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,

    /// Maximum delay between attempts (milliseconds)
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            backoff_multiplier: 2.0,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that runs the operation once
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Delay after the given failed attempt (0-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        let capped = delay.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }
}

/// Execute an async operation, retrying failures with exponential backoff.
///
/// Returns the first success, or the last error once `max_attempts` calls
/// have failed.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    operation: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    run_with_backoff(policy, operation_name, operation).await.0
}

/// Like [`retry_with_backoff`], also reporting how many calls were made.
pub(crate) async fn run_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> (Result<T, E>, u32)
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("{}: succeeded on attempt {}", operation_name, attempt);
                }
                return (Ok(result), attempt);
            }
            Err(e) if attempt >= max_attempts => {
                warn!(
                    "{}: giving up after {} attempts: {}",
                    operation_name, attempt, e
                );
                return (Err(e), attempt);
            }
            Err(e) => {
                let delay = policy.delay_for_attempt(attempt - 1);
                warn!(
                    "{}: attempt {} failed, retrying in {:?}: {}",
                    operation_name, attempt, delay, e
                );
                sleep(delay).await;
            }
        }
    }
}
