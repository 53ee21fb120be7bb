//! Recovery Module
//!
//! Error classification, a bounded error log and retry with exponential
//! backoff for transient failures.

mod classify;
mod handler;
mod retry;

pub use classify::{classify, CapturedError, ErrorCategory, ErrorSeverity};
pub use handler::{ErrorContext, ErrorHandler, ErrorLog, ErrorStats};
pub use retry::{retry_with_backoff, RetryPolicy};
