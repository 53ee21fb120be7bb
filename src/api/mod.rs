//! API Module
//!
//! HTTP handlers and routing for the cache, validation and error-log
//! admin API.
//!
//! # Endpoints
//! - `/cache/:key` - Get, put and delete cached values
//! - `/cache/invalidate`, `/cache/stats`
//! - `/validate/:kind`, `/validate/:kind/batch` - Record validation
//! - `/errors`, `/errors/stats`, `/errors/:id/resolve`, `/errors/cleanup`
//! - `/health` - Health report

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
