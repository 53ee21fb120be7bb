//! Batch Validation
//!
//! Applies one validator across many records and partitions the results.

use serde::Serialize;

use crate::validation::ValidationResult;

/// A record that failed validation, with its position in the input.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidRecord<T> {
    pub index: usize,
    pub record: T,
    pub result: ValidationResult,
}

// == Batch Validation ==
/// Valid and invalid records from one batch, with aggregate counts.
#[derive(Debug, Clone, Serialize)]
pub struct BatchValidation<T> {
    pub valid: Vec<T>,
    pub invalid: Vec<InvalidRecord<T>>,
    pub total: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    /// Warnings across all records, valid or not
    pub warning_count: usize,
}

/// Runs `validator` on every record, keeping input order in both partitions.
pub fn validate_batch<T, F>(records: Vec<T>, validator: F) -> BatchValidation<T>
where
    F: Fn(&T) -> ValidationResult,
{
    let total = records.len();
    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    let mut warning_count = 0;

    for (index, record) in records.into_iter().enumerate() {
        let result = validator(&record);
        warning_count += result.warnings.len();
        if result.is_valid {
            valid.push(record);
        } else {
            invalid.push(InvalidRecord {
                index,
                record,
                result,
            });
        }
    }

    BatchValidation {
        valid_count: valid.len(),
        invalid_count: invalid.len(),
        valid,
        invalid,
        total,
        warning_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate_product_data, ProductRecord};

    fn product(name: &str, price: f64) -> ProductRecord {
        ProductRecord {
            name: Some(name.to_string()),
            sku: Some(format!("SKU-{}", name)),
            category: Some("Snacks".to_string()),
            price: Some(price),
            ..ProductRecord::default()
        }
    }

    #[test]
    fn test_partitions_in_order() {
        let records = vec![
            product("Piattos", 20.0),
            product("Nova", -1.0),
            product("Oishi", 0.0),
            product("Chippy", -5.0),
        ];

        let batch = validate_batch(records, validate_product_data);

        assert_eq!(batch.total, 4);
        assert_eq!(batch.valid_count, 2);
        assert_eq!(batch.invalid_count, 2);
        assert_eq!(batch.warning_count, 1);
        assert_eq!(batch.valid[1].name.as_deref(), Some("Oishi"));
        assert_eq!(batch.invalid[0].index, 1);
        assert_eq!(batch.invalid[1].index, 3);
        assert!(!batch.invalid[1].result.is_valid);
    }

    #[test]
    fn test_empty_batch() {
        let batch = validate_batch(Vec::<ProductRecord>::new(), validate_product_data);
        assert_eq!(batch.total, 0);
        assert!(batch.valid.is_empty());
        assert!(batch.invalid.is_empty());
    }
}
