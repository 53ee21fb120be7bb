//! Health Monitoring
//!
//! Rolls cache and error-log statistics up into a single health status.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::recovery::ErrorStats;

// == Health Status ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Unresolved high-severity errors are present
    Degraded,
    /// Unresolved critical errors are present
    Unhealthy,
}

// == Health Report ==
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub cache_entries: usize,
    pub cache_bytes: usize,
    pub cache_hit_rate: f64,
    pub unresolved_errors: usize,
    pub unresolved_high: usize,
    pub unresolved_critical: usize,
}

impl HealthReport {
    /// Builds a report from current cache and error statistics.
    pub fn assess(cache: &CacheStats, errors: &ErrorStats) -> Self {
        let status = if errors.unresolved_critical > 0 {
            HealthStatus::Unhealthy
        } else if errors.unresolved_high > 0 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            status,
            timestamp: Utc::now(),
            cache_entries: cache.total_entries,
            cache_bytes: cache.total_bytes,
            cache_hit_rate: cache.hit_rate(),
            unresolved_errors: errors.unresolved,
            unresolved_high: errors.unresolved_high,
            unresolved_critical: errors.unresolved_critical,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}
