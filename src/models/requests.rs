//! Request DTOs for the service API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{InvalidationPattern, MAX_KEY_LENGTH};
use crate::error::{Result, ServiceError};

/// Request body for `PUT /cache/:key`
#[derive(Debug, Clone, Deserialize)]
pub struct PutCacheRequest {
    /// Any JSON value
    pub value: Value,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

impl PutCacheRequest {
    /// Checks the key and TTL before they reach the store.
    pub fn validate(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} characters",
                MAX_KEY_LENGTH
            ));
        }
        if self.ttl_ms == Some(0) {
            return Some("TTL must be greater than zero".to_string());
        }
        None
    }
}

/// Request body for `POST /cache/invalidate`
///
/// `pattern` matches keys containing the text, `regex` matches keys against a
/// regular expression. With neither set the whole cache is cleared.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateRequest {
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub regex: Option<String>,
}

impl InvalidateRequest {
    pub fn into_pattern(self) -> Result<InvalidationPattern> {
        match (self.pattern, self.regex) {
            (Some(_), Some(_)) => Err(ServiceError::InvalidRequest(
                "Specify either pattern or regex, not both".to_string(),
            )),
            (Some(text), None) => Ok(InvalidationPattern::Contains(text)),
            (None, Some(regex)) => InvalidationPattern::regex(&regex),
            (None, None) => Ok(InvalidationPattern::All),
        }
    }
}

/// Query string for `GET /errors`
#[derive(Debug, Clone, Deserialize)]
pub struct ListErrorsQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Request body for `POST /errors/cleanup`
#[derive(Debug, Clone, Deserialize)]
pub struct CleanupErrorsRequest {
    pub max_age_secs: u64,
}
