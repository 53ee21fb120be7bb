//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and access metadata.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with its payload and bookkeeping metadata.
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Number of hits served from this entry
    pub access_count: u64,
    /// Last hit timestamp (Unix milliseconds)
    pub last_accessed: u64,
    /// Estimated size in bytes, see [`estimate_size`]
    pub size: usize,
    /// Store-wide sequence number at insertion, breaks FIFO ties
    #[serde(skip)]
    pub(crate) insert_seq: u64,
    /// Store-wide sequence number at last access, breaks LRU/LFU ties
    #[serde(skip)]
    pub(crate) access_seq: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry that expires `ttl_ms` milliseconds from now.
    ///
    /// # Arguments
    /// * `value` - The payload to store
    /// * `ttl_ms` - Time to live in milliseconds
    /// * `seq` - Store sequence number used for ordering ties
    pub fn new(value: Value, ttl_ms: u64, seq: u64) -> Self {
        let now = current_timestamp_ms();
        let size = estimate_size(&value);

        Self {
            value,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms),
            access_count: 0,
            last_accessed: now,
            size,
            insert_seq: seq,
            access_seq: seq,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has outlived its TTL.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// the expiration time.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Is Past Stale Window ==
    /// Checks if the entry is expired by more than `stale_window_ms`.
    ///
    /// Entries inside the window can still be served stale or used as a
    /// fallback; entries past it are dead and get dropped.
    pub fn is_past_stale_window(&self, stale_window_ms: u64) -> bool {
        current_timestamp_ms() >= self.expires_at.saturating_add(stale_window_ms)
    }

    // == Touch ==
    /// Records a hit on this entry.
    pub fn touch(&mut self, seq: u64) {
        self.access_count += 1;
        self.last_accessed = current_timestamp_ms();
        self.access_seq = seq;
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Estimates the in-memory footprint of a payload.
///
/// Uses the UTF-16 length of the compact JSON serialization times two, the
/// byte size the dashboard's string-based accounting would report.
pub fn estimate_size(value: &Value) -> usize {
    value.to_string().encode_utf16().count() * 2
}
