//! Cache Store Module
//!
//! Synchronous cache engine: HashMap storage, byte-budget eviction and TTL bookkeeping.
//! [`CacheManager`](crate::cache::CacheManager) wraps it for shared async use.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::cache::{estimate_size, CacheEntry, CacheStats, EvictionStrategy, MAX_KEY_LENGTH};
use crate::error::{Result, ServiceError};

// == Cache Settings ==
/// Tunables for a cache store.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Byte budget for all entries combined
    pub max_bytes: usize,
    /// TTL in milliseconds for entries stored without an explicit TTL
    pub default_ttl_ms: u64,
    /// How victims are chosen when the budget is exceeded
    pub strategy: EvictionStrategy,
    /// Whether expired entries are served while a refresh runs
    pub stale_while_revalidate: bool,
    /// How long after expiry an entry is kept around as a stale value
    pub stale_window_ms: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_bytes: 50 * 1024 * 1024,
            default_ttl_ms: 300_000,
            strategy: EvictionStrategy::Lru,
            stale_while_revalidate: false,
            stale_window_ms: 60_000,
        }
    }
}

// == Lookup ==
/// Outcome of reading a key.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Entry is live
    Fresh(Value),
    /// Entry is expired but still inside the stale window
    Stale(Value),
    /// No usable entry
    Miss,
}

// == Invalidation Pattern ==
/// Selects which keys `invalidate` removes.
#[derive(Debug, Clone)]
pub enum InvalidationPattern {
    /// Every key
    All,
    /// Keys containing the substring
    Contains(String),
    /// Keys matching the regular expression
    Regex(Regex),
}

impl InvalidationPattern {
    /// Compiles a regex pattern.
    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(InvalidationPattern::Regex(Regex::new(pattern)?))
    }

    fn matches(&self, key: &str) -> bool {
        match self {
            InvalidationPattern::All => true,
            InvalidationPattern::Contains(needle) => key.contains(needle.as_str()),
            InvalidationPattern::Regex(re) => re.is_match(key),
        }
    }
}

// == Cache Store ==
/// Main cache storage with byte-budget eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Configured limits and behavior
    settings: CacheSettings,
    /// Sum of entry sizes in bytes
    total_size: usize,
    /// Monotonic counter stamped on inserts and hits
    sequence: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store with the given settings.
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            settings,
            total_size: 0,
            sequence: 0,
        }
    }

    /// Returns the configured settings.
    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    fn next_seq(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    // == Set ==
    /// Stores a value unconditionally, replacing any existing entry.
    ///
    /// Evicts entries by the configured strategy until the new entry fits in
    /// the byte budget. A value larger than the whole budget is rejected and
    /// leaves the cache untouched.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The payload to store
    /// * `ttl_ms` - Optional TTL in milliseconds (uses `default_ttl_ms` if None)
    pub fn set(&mut self, key: String, value: Value, ttl_ms: Option<u64>) -> Result<()> {
        if key.is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Key cannot be empty".to_string(),
            ));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(ServiceError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        let size = estimate_size(&value);
        if size > self.settings.max_bytes {
            return Err(ServiceError::ValueTooLarge {
                size,
                budget: self.settings.max_bytes,
            });
        }

        // Replacing a key releases its old bytes before making room
        self.remove_entry(&key);
        self.make_room(size);

        let ttl = ttl_ms.unwrap_or(self.settings.default_ttl_ms);
        let seq = self.next_seq();
        let entry = CacheEntry::new(value, ttl, seq);
        self.total_size += entry.size;
        self.entries.insert(key, entry);

        self.refresh_occupancy();
        Ok(())
    }

    // == Make Room ==
    /// Evicts entries until `incoming` more bytes fit in the budget.
    fn make_room(&mut self, incoming: usize) {
        let budget = self.settings.max_bytes;
        let needed = (self.total_size + incoming).saturating_sub(budget);
        if needed == 0 {
            return;
        }

        let victims = self.settings.strategy.select_victims(&self.entries, needed);
        for key in victims {
            if self.remove_entry(&key).is_some() {
                self.stats.record_eviction();
                debug!("Evicted '{}' ({} strategy)", key, self.settings.strategy);
            }
        }
    }

    // == Lookup ==
    /// Reads a key, classifying it as fresh, stale or missing.
    ///
    /// A fresh read counts as a hit and updates access metadata. Stale and
    /// missing reads record nothing; the caller decides whether they become
    /// a stale hit or a miss. Entries past the stale window are dropped.
    pub fn lookup(&mut self, key: &str) -> Lookup {
        let stale_window = self.settings.stale_window_ms;
        let state = match self.entries.get(key) {
            None => return Lookup::Miss,
            Some(entry) if !entry.is_expired() => None,
            Some(entry) if !entry.is_past_stale_window(stale_window) => {
                Some(Lookup::Stale(entry.value.clone()))
            }
            Some(_) => Some(Lookup::Miss),
        };

        match state {
            Some(Lookup::Miss) => {
                self.remove_entry(key);
                self.refresh_occupancy();
                Lookup::Miss
            }
            Some(stale) => stale,
            None => {
                let seq = self.next_seq();
                self.stats.record_hit();
                match self.entries.get_mut(key) {
                    Some(entry) => {
                        entry.touch(seq);
                        Lookup::Fresh(entry.value.clone())
                    }
                    None => Lookup::Miss,
                }
            }
        }
    }

    // == Peek ==
    /// Reads a key without fetching, recording a hit, stale hit or miss.
    pub fn peek(&mut self, key: &str) -> Lookup {
        let lookup = self.lookup(key);
        match lookup {
            Lookup::Fresh(_) => {}
            Lookup::Stale(_) => self.stats.record_stale_hit(),
            Lookup::Miss => self.stats.record_miss(),
        }
        lookup
    }

    // == Fallback Value ==
    /// Returns whatever value is held for `key` inside the stale window,
    /// fresh or not, without touching statistics.
    pub fn fallback_value(&self, key: &str) -> Option<Value> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_past_stale_window(self.settings.stale_window_ms))
            .map(|entry| entry.value.clone())
    }

    // == Entry ==
    /// Returns the raw entry for inspection.
    pub fn entry(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    // == Delete ==
    /// Removes an entry by key.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        match self.remove_entry(key) {
            Some(_) => {
                self.refresh_occupancy();
                Ok(())
            }
            None => Err(ServiceError::NotFound(key.to_string())),
        }
    }

    // == Invalidate ==
    /// Removes every entry whose key matches the pattern.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&mut self, pattern: &InvalidationPattern) -> usize {
        let keys: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.matches(key))
            .cloned()
            .collect();

        for key in &keys {
            self.remove_entry(key);
        }
        self.refresh_occupancy();
        keys.len()
    }

    // == Cleanup Expired ==
    /// Removes all entries past their stale window.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let window = self.settings.stale_window_ms;
        let dead: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_past_stale_window(window))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &dead {
            self.remove_entry(key);
        }
        self.refresh_occupancy();
        dead.len()
    }

    pub fn record_miss(&mut self) {
        self.stats.record_miss();
    }

    pub fn record_stale_hit(&mut self) {
        self.stats.record_stale_hit();
    }

    pub fn record_revalidation(&mut self, succeeded: bool) {
        self.stats.record_revalidation(succeeded);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_occupancy(self.entries.len(), self.total_size);
        stats
    }

    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the estimated size of all entries in bytes.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.total_size -= entry.size;
        Some(entry)
    }

    fn refresh_occupancy(&mut self) {
        self.stats.set_occupancy(self.entries.len(), self.total_size);
    }
}
