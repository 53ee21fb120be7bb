//! Eviction Strategy Module
//!
//! Chooses which entries to drop when the byte budget would be exceeded.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::CacheEntry;

// == Eviction Strategy ==
/// Ordering used to pick eviction victims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionStrategy {
    /// Least recently used: oldest `last_accessed` goes first
    #[default]
    Lru,
    /// Least frequently used: lowest `access_count` goes first
    Lfu,
    /// First in, first out: oldest `created_at` goes first
    Fifo,
}

impl EvictionStrategy {
    // == Rank ==
    /// Sort key for an entry; lower ranks are evicted first.
    ///
    /// The trailing sequence number breaks ties between entries that share a
    /// millisecond timestamp or access count.
    fn rank(&self, entry: &CacheEntry) -> (u64, u64) {
        match self {
            EvictionStrategy::Lru => (entry.last_accessed, entry.access_seq),
            EvictionStrategy::Lfu => (entry.access_count, entry.access_seq),
            EvictionStrategy::Fifo => (entry.created_at, entry.insert_seq),
        }
    }

    // == Select Victims ==
    /// Returns keys to evict, in eviction order, whose sizes add up to at
    /// least `bytes_to_free`.
    ///
    /// Returns every key when the whole cache is not enough.
    pub fn select_victims<'a, I>(&self, entries: I, bytes_to_free: usize) -> Vec<String>
    where
        I: IntoIterator<Item = (&'a String, &'a CacheEntry)>,
    {
        if bytes_to_free == 0 {
            return Vec::new();
        }

        let mut candidates: Vec<(&String, &CacheEntry)> = entries.into_iter().collect();
        candidates.sort_by_key(|(_, entry)| self.rank(entry));

        let mut freed = 0;
        let mut victims = Vec::new();
        for (key, entry) in candidates {
            if freed >= bytes_to_free {
                break;
            }
            freed += entry.size;
            victims.push(key.clone());
        }
        victims
    }
}

impl fmt::Display for EvictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvictionStrategy::Lru => "lru",
            EvictionStrategy::Lfu => "lfu",
            EvictionStrategy::Fifo => "fifo",
        };
        f.write_str(name)
    }
}

impl FromStr for EvictionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionStrategy::Lru),
            "lfu" => Ok(EvictionStrategy::Lfu),
            "fifo" => Ok(EvictionStrategy::Fifo),
            other => Err(format!("unknown eviction strategy: {}", other)),
        }
    }
}
