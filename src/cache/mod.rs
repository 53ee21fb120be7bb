//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, byte-budget eviction
//! (LRU, LFU or FIFO) and stale-while-revalidate reads.

mod entry;
mod eviction;
mod inflight;
mod manager;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, estimate_size, CacheEntry};
pub use eviction::EvictionStrategy;
pub use manager::{CacheManager, GetOptions};
pub use stats::CacheStats;
pub use store::{CacheSettings, CacheStore, InvalidationPattern, Lookup};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
