//! Background Tasks Module
//!
//! # Tasks
//! - Cleanup: drops expired cache entries and aged error logs at a fixed interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
