//! Scout Services - caching, validation and error recovery for the Scout dashboard
//!
//! Provides a TTL cache with byte-budget eviction and stale-while-revalidate,
//! pure record validators, and an error handler with retrying recovery,
//! exposed over an axum admin API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod monitoring;
pub mod recovery;
pub mod tasks;
pub mod validation;

pub use api::{create_router, AppState};
pub use cache::{CacheManager, CacheSettings, EvictionStrategy, GetOptions};
pub use config::Config;
pub use error::{Result, ServiceError};
pub use recovery::{retry_with_backoff, ErrorHandler, RetryPolicy};
pub use tasks::spawn_cleanup_task;
