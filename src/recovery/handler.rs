//! Error Handler
//!
//! Classifies and records errors raised at service boundaries, and retries
//! the failing operation when the error looks transient.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::error::Error as StdError;
use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{Result, ServiceError};
use crate::recovery::retry::run_with_backoff;
use crate::recovery::{CapturedError, ErrorCategory, ErrorSeverity, RetryPolicy};

// == Error Context ==
/// Where an error happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    pub operation: Option<String>,
    pub component: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            component: None,
            timestamp: Utc::now(),
            extra: Map::new(),
        }
    }

    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    fn label(&self) -> &str {
        self.operation.as_deref().unwrap_or("unknown operation")
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            operation: None,
            component: None,
            timestamp: Utc::now(),
            extra: Map::new(),
        }
    }
}

// == Error Log ==
/// One handled error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLog {
    pub id: Uuid,
    pub error: CapturedError,
    pub severity: ErrorSeverity,
    pub category: ErrorCategory,
    pub context: ErrorContext,
    pub resolved: bool,
    /// Calls made by the recovery retry loop, 0 when none ran
    pub retry_attempts: u32,
}

// == Error Stats ==
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorStats {
    /// Errors handled since startup, including ones since cleaned up
    pub total_handled: u64,
    /// Logs currently held
    pub stored: usize,
    pub unresolved: usize,
    pub unresolved_high: usize,
    pub unresolved_critical: usize,
    /// Handled counts per category since startup
    pub by_category: BTreeMap<ErrorCategory, u64>,
    /// Stored counts per severity
    pub by_severity: BTreeMap<ErrorSeverity, usize>,
}

#[derive(Debug, Default)]
struct LogBook {
    logs: HashMap<Uuid, ErrorLog>,
    /// Insertion order, oldest first
    order: VecDeque<Uuid>,
    total_handled: u64,
    by_category: BTreeMap<ErrorCategory, u64>,
}

// == Error Handler ==
/// Bounded in-memory error log with classification and retrying recovery.
#[derive(Debug)]
pub struct ErrorHandler {
    book: RwLock<LogBook>,
    policy: RetryPolicy,
    capacity: usize,
}

impl ErrorHandler {
    /// Creates a handler keeping at most `capacity` logs.
    pub fn new(policy: RetryPolicy, capacity: usize) -> Self {
        Self {
            book: RwLock::new(LogBook::default()),
            policy,
            capacity: capacity.max(1),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    // == Handle Error ==
    /// Classifies, stores and logs an error.
    ///
    /// Once the log is full the oldest entry is dropped.
    pub async fn handle_error(&self, error: CapturedError, context: ErrorContext) -> ErrorLog {
        let (severity, category) = error.classify();
        let log = ErrorLog {
            id: Uuid::new_v4(),
            error,
            severity,
            category,
            context,
            resolved: false,
            retry_attempts: 0,
        };

        emit(&log);

        let mut book = self.book.write().await;
        while book.order.len() >= self.capacity {
            match book.order.pop_front() {
                Some(oldest) => {
                    book.logs.remove(&oldest);
                }
                None => break,
            }
        }
        book.total_handled += 1;
        *book.by_category.entry(category).or_insert(0) += 1;
        book.order.push_back(log.id);
        book.logs.insert(log.id, log.clone());

        log
    }

    // == Recover ==
    /// Handles `error`, then retries `operation` if the error is transient.
    ///
    /// Database and network errors are retried with the handler's backoff
    /// policy; the log is marked resolved when a retry succeeds. Any other
    /// category returns the original error untouched.
    pub async fn recover<T, E, F, Fut>(
        &self,
        error: E,
        context: ErrorContext,
        operation: F,
    ) -> std::result::Result<T, E>
    where
        E: StdError + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let operation_name = context.label().to_string();
        let log = self
            .handle_error(CapturedError::from_error(&error), context)
            .await;

        if !log.category.is_retryable() {
            return Err(error);
        }

        info!(
            "Retrying '{}' after {} error ({})",
            operation_name, log.category, log.id
        );
        let (result, attempts) = run_with_backoff(&self.policy, &operation_name, operation).await;

        let mut book = self.book.write().await;
        if let Some(stored) = book.logs.get_mut(&log.id) {
            stored.retry_attempts = attempts;
            stored.resolved = result.is_ok();
        }
        result
    }

    // == Resolve ==
    /// Marks a log as resolved.
    pub async fn resolve(&self, id: Uuid) -> Result<ErrorLog> {
        let mut book = self.book.write().await;
        match book.logs.get_mut(&id) {
            Some(log) => {
                log.resolved = true;
                Ok(log.clone())
            }
            None => Err(ServiceError::NotFound(format!("error log {}", id))),
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<ErrorLog> {
        self.book.read().await.logs.get(&id).cloned()
    }

    // == Recent ==
    /// Returns up to `limit` logs, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<ErrorLog> {
        let book = self.book.read().await;
        book.order
            .iter()
            .rev()
            .filter_map(|id| book.logs.get(id))
            .take(limit)
            .cloned()
            .collect()
    }

    // == Stats ==
    pub async fn stats(&self) -> ErrorStats {
        let book = self.book.read().await;
        let mut stats = ErrorStats {
            total_handled: book.total_handled,
            stored: book.logs.len(),
            by_category: book.by_category.clone(),
            ..ErrorStats::default()
        };

        for log in book.logs.values() {
            *stats.by_severity.entry(log.severity).or_insert(0) += 1;
            if !log.resolved {
                stats.unresolved += 1;
                match log.severity {
                    ErrorSeverity::Critical => stats.unresolved_critical += 1,
                    ErrorSeverity::High => stats.unresolved_high += 1,
                    _ => {}
                }
            }
        }
        stats
    }

    // == Cleanup ==
    /// Drops logs whose context timestamp is older than `max_age`.
    ///
    /// Returns the number of logs removed.
    pub async fn cleanup(&self, max_age: Duration) -> usize {
        let Some(cutoff) = Utc::now().checked_sub_signed(max_age) else {
            return 0;
        };
        let mut book = self.book.write().await;
        let before = book.logs.len();

        book.logs.retain(|_, log| log.context.timestamp >= cutoff);
        let LogBook { logs, order, .. } = &mut *book;
        order.retain(|id| logs.contains_key(id));

        before - book.logs.len()
    }

    pub async fn len(&self) -> usize {
        self.book.read().await.logs.len()
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new(RetryPolicy::default(), 1000)
    }
}

fn emit(log: &ErrorLog) {
    let operation = log.context.label();
    let component = log.context.component.as_deref().unwrap_or("-");
    match log.severity {
        ErrorSeverity::Critical | ErrorSeverity::High => error!(
            id = %log.id,
            category = %log.category,
            severity = ?log.severity,
            component,
            "{} failed: {}",
            operation,
            log.error
        ),
        ErrorSeverity::Medium => warn!(
            id = %log.id,
            category = %log.category,
            component,
            "{} failed: {}",
            operation,
            log.error
        ),
        ErrorSeverity::Low => info!(
            id = %log.id,
            category = %log.category,
            component,
            "{} failed: {}",
            operation,
            log.error
        ),
    }
}
