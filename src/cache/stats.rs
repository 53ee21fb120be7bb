//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, stale serves and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of lookups answered by a live entry
    pub hits: u64,
    /// Number of lookups that had to go to the fetcher
    pub misses: u64,
    /// Number of lookups answered by an expired entry
    pub stale_hits: u64,
    /// Background refreshes that stored a new value
    pub revalidations: u64,
    /// Background refreshes whose fetch failed
    pub failed_revalidations: u64,
    /// Number of entries evicted to stay inside the byte budget
    pub evictions: u64,
    /// Fetches started while another fetch for the same key was in flight
    pub duplicate_fetches: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Current estimated size of all entries in bytes
    pub total_bytes: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Stale serves count as hits. Returns 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let served = self.hits + self.stale_hits;
        let total = served + self.misses;
        if total == 0 {
            0.0
        } else {
            served as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_stale_hit(&mut self) {
        self.stale_hits += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Revalidation ==
    /// Counts a finished background refresh.
    pub fn record_revalidation(&mut self, succeeded: bool) {
        if succeeded {
            self.revalidations += 1;
        } else {
            self.failed_revalidations += 1;
        }
    }

    // == Update Occupancy ==
    /// Updates the entry count and byte total.
    pub fn set_occupancy(&mut self, entries: usize, bytes: usize) {
        self.total_entries = entries;
        self.total_bytes = bytes;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.total_bytes, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_counts_stale_serves() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_stale_hit();
        stats.record_miss();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_record_revalidation() {
        let mut stats = CacheStats::new();
        stats.record_revalidation(true);
        stats.record_revalidation(true);
        stats.record_revalidation(false);
        assert_eq!(stats.revalidations, 2);
        assert_eq!(stats.failed_revalidations, 1);
    }

    #[test]
    fn test_set_occupancy() {
        let mut stats = CacheStats::new();
        stats.set_occupancy(42, 1024);
        assert_eq!(stats.total_entries, 42);
        assert_eq!(stats.total_bytes, 1024);
    }
}
