//! Response DTOs for the service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for `GET /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
    /// True when the value comes from an expired entry
    pub stale: bool,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value, stale: bool) -> Self {
        Self {
            key: key.into(),
            value,
            stale,
        }
    }
}

/// Response body for `PUT /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for `DELETE /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Number of entries or logs removed by a bulk operation
#[derive(Debug, Clone, Serialize)]
pub struct RemovedResponse {
    pub removed: usize,
}

/// Response body for `GET /cache/stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// (hits + stale hits) / all lookups
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("brands:all", json!(["Alaska"]), true);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "brands:all");
        assert_eq!(json["value"], json!(["Alaska"]));
        assert_eq!(json["stale"], true);
    }

    #[test]
    fn test_set_and_delete_messages() {
        let json = serde_json::to_string(&SetResponse::new("my_key")).unwrap();
        assert!(json.contains("my_key"));
        assert!(json.contains("successfully"));

        let json = serde_json::to_string(&DeleteResponse::new("gone")).unwrap();
        assert!(json.contains("deleted"));
    }

    #[test]
    fn test_stats_response_flattens_counters() {
        let mut stats = CacheStats::new();
        for _ in 0..8 {
            stats.record_hit();
        }
        stats.record_miss();
        stats.record_stale_hit();

        let json = serde_json::to_value(StatsResponse::from(stats)).unwrap();
        assert_eq!(json["hits"], 8);
        assert_eq!(json["stale_hits"], 1);
        assert!((json["hit_rate"].as_f64().unwrap() - 0.9).abs() < 0.001);
    }

    #[test]
    fn test_error_response_serialize() {
        let json = serde_json::to_string(&ErrorResponse::new("Something went wrong")).unwrap();
        assert_eq!(json, r#"{"error":"Something went wrong"}"#);
    }
}
