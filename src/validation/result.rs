//! Validation Result Module
//!
//! Outcome of validating one record: errors make it invalid, warnings do not.

use serde::Serialize;
use serde_json::{Map, Value};

// == Validation Result ==
/// Errors and warnings collected while validating a single record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    /// True when no errors were recorded
    pub is_valid: bool,
    /// Problems that make the record unusable, in check order
    pub errors: Vec<String>,
    /// Suspicious but usable values, in check order
    pub warnings: Vec<String>,
    /// Derived facts about the record
    pub metadata: Map<String, Value>,
}

impl ValidationResult {
    /// Creates an empty, valid result.
    pub fn new() -> Self {
        Self {
            is_valid: true,
            ..Self::default()
        }
    }

    /// Shorthand for a result holding one error.
    pub fn invalid(error: impl Into<String>) -> Self {
        let mut result = Self::new();
        result.error(error);
        result
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn metadata(&mut self, key: &str, value: impl Into<Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_valid() {
        let result = ValidationResult::new();
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_warning_keeps_valid() {
        let mut result = ValidationResult::new();
        result.warning("Brand has zero revenue");
        assert!(result.is_valid);
        assert!(result.has_warnings());
    }

    #[test]
    fn test_error_invalidates() {
        let mut result = ValidationResult::new();
        result.error("Revenue cannot be negative");
        result.warning("Missing category");
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["Revenue cannot be negative"]);
    }

    #[test]
    fn test_serialize_shape() {
        let mut result = ValidationResult::invalid("Name is required");
        result.metadata("item_count", 3);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["is_valid"], false);
        assert_eq!(json["errors"][0], "Name is required");
        assert_eq!(json["metadata"]["item_count"], 3);
    }
}
