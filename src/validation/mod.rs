//! Validation Module
//!
//! Pure record validators. Failures come back as data in a
//! [`ValidationResult`]; nothing in this module returns `Err` or panics on
//! bad input.

mod batch;
mod records;
mod result;
mod rules;

use serde::Deserialize;
use serde_json::Value;

pub use batch::{validate_batch, BatchValidation, InvalidRecord};
pub use records::{
    BrandRecord, ProductRecord, RecordId, RecordKind, TransactionItem, TransactionRecord,
};
pub use result::ValidationResult;
pub use rules::{
    parse_transaction_date, validate_brand_data, validate_product_data,
    validate_transaction_at, validate_transaction_data, KNOWN_PAYMENT_METHODS,
};

// == Validate JSON ==
/// Validates a raw JSON record of the given kind.
///
/// A record whose fields have the wrong JSON types is reported as invalid
/// with the decoding error as its only error.
pub fn validate_json(kind: RecordKind, value: &Value) -> ValidationResult {
    let outcome = match kind {
        RecordKind::Brand => decode(value).map(|r: BrandRecord| validate_brand_data(&r)),
        RecordKind::Transaction => {
            decode(value).map(|r: TransactionRecord| validate_transaction_data(&r))
        }
        RecordKind::Product => decode(value).map(|r: ProductRecord| validate_product_data(&r)),
    };
    outcome.unwrap_or_else(|malformed| malformed)
}

fn decode<'a, T: Deserialize<'a>>(value: &'a Value) -> Result<T, ValidationResult> {
    if !value.is_object() {
        return Err(ValidationResult::invalid("Record must be a JSON object"));
    }
    T::deserialize(value).map_err(|e| ValidationResult::invalid(format!("Malformed record: {}", e)))
}

/// Validates a batch of raw JSON records of one kind.
pub fn validate_json_batch(kind: RecordKind, values: Vec<Value>) -> BatchValidation<Value> {
    validate_batch(values, |value| validate_json(kind, value))
}
