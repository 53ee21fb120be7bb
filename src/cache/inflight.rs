//! In-Flight Fetch Tracking
//!
//! Counts running fetches per key. Registration returns a guard that
//! unregisters on drop, so a cancelled or panicking fetch still releases
//! its slot.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
pub(crate) struct InFlight {
    running: Mutex<HashMap<String, usize>>,
    duplicates: AtomicU64,
}

impl InFlight {
    /// Registers a fetch for `key`.
    ///
    /// Fetches started while another one for the same key is running are
    /// counted as duplicates; they are not merged.
    pub(crate) fn begin(self: &Arc<Self>, key: &str) -> FetchGuard {
        let mut running = self.running.lock();
        let count = running.entry(key.to_string()).or_insert(0);
        *count += 1;
        if *count > 1 {
            self.duplicates.fetch_add(1, Ordering::Relaxed);
            debug!("Concurrent fetch for '{}' ({} in flight)", key, count);
        }

        FetchGuard {
            inflight: Arc::clone(self),
            key: key.to_string(),
        }
    }

    fn end(&self, key: &str) {
        let mut running = self.running.lock();
        if let Some(count) = running.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                running.remove(key);
            }
        }
    }

    pub(crate) fn duplicates(&self) -> u64 {
        self.duplicates.load(Ordering::Relaxed)
    }

    /// Number of fetches currently running for `key`.
    pub(crate) fn running(&self, key: &str) -> usize {
        self.running.lock().get(key).copied().unwrap_or(0)
    }
}

/// Releases a fetch registration when dropped.
#[derive(Debug)]
pub(crate) struct FetchGuard {
    inflight: Arc<InFlight>,
    key: String,
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        self.inflight.end(&self.key);
    }
}
