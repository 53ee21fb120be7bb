//! Validation Rules
//!
//! Static presence, range and format checks for brand, transaction and
//! product records. Every validator is a pure function of its input (and,
//! for transactions, of the reference time).

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::validation::records::{BrandRecord, ProductRecord, RecordId, TransactionRecord};
use crate::validation::ValidationResult;

/// Payment methods seen in sari-sari store transactions.
pub const KNOWN_PAYMENT_METHODS: &[&str] = &[
    "cash",
    "gcash",
    "maya",
    "paymaya",
    "card",
    "credit_card",
    "debit_card",
    "utang",
];

/// Transactions older than this many days are flagged as likely backfill.
const STALE_TRANSACTION_DAYS: i64 = 730;

/// Allowed gap between `total_amount` and the sum of line items.
const AMOUNT_TOLERANCE: f64 = 0.01;

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(|s| s.trim().is_empty()).unwrap_or(true)
}

fn is_missing_id(id: &Option<RecordId>) -> bool {
    id.as_ref().map(RecordId::is_blank).unwrap_or(true)
}

// == Brand ==
/// Validates a brand performance row.
pub fn validate_brand_data(brand: &BrandRecord) -> ValidationResult {
    let mut result = ValidationResult::new();

    if is_blank(&brand.name) {
        result.error("Brand name is required");
    }

    match brand.revenue {
        None => result.error("Revenue is required"),
        Some(revenue) if !revenue.is_finite() => result.error("Revenue must be a finite number"),
        Some(revenue) if revenue < 0.0 => {
            result.error(format!("Revenue cannot be negative: {}", revenue))
        }
        Some(revenue) => {
            if revenue == 0.0 {
                result.warning("Brand has zero revenue");
            }
            result.metadata("revenue_tier", revenue_tier(revenue));
        }
    }

    if let Some(share) = brand.market_share {
        if !share.is_finite() || !(0.0..=100.0).contains(&share) {
            result.error(format!("Market share must be between 0 and 100: {}", share));
        }
    }

    if let Some(growth) = brand.growth_rate {
        if !growth.is_finite() || growth < -100.0 {
            result.error(format!("Growth rate cannot be below -100%: {}", growth));
        } else if growth > 1000.0 {
            result.warning(format!("Unusually high growth rate: {}%", growth));
        }
    }

    if is_blank(&brand.category) {
        result.warning("Brand has no category");
    }

    result
}

fn revenue_tier(revenue: f64) -> &'static str {
    match revenue {
        r if r <= 0.0 => "none",
        r if r < 100_000.0 => "small",
        r if r < 1_000_000.0 => "medium",
        _ => "large",
    }
}

// == Transaction ==
/// Validates a transaction row against the current time.
pub fn validate_transaction_data(tx: &TransactionRecord) -> ValidationResult {
    validate_transaction_at(tx, Utc::now())
}

/// Validates a transaction row against a fixed reference time.
pub fn validate_transaction_at(tx: &TransactionRecord, now: DateTime<Utc>) -> ValidationResult {
    let mut result = ValidationResult::new();

    if is_missing_id(&tx.id) {
        result.error("Transaction id is required");
    }

    match tx.total_amount {
        None => result.error("Total amount is required"),
        Some(amount) if !amount.is_finite() => {
            result.error("Total amount must be a finite number")
        }
        Some(amount) if amount < 0.0 => {
            result.error(format!("Total amount cannot be negative: {}", amount))
        }
        Some(amount) if amount == 0.0 => result.warning("Transaction has zero total amount"),
        Some(_) => {}
    }

    match tx.date.as_deref() {
        None => result.error("Transaction date is required"),
        Some(raw) => match parse_transaction_date(raw) {
            None => result.error(format!("Transaction date is not a valid date: {}", raw)),
            Some(date) if date > now => {
                result.error(format!("Transaction date cannot be in the future: {}", raw))
            }
            Some(date) if now - date > Duration::days(STALE_TRANSACTION_DAYS) => {
                result.warning(format!("Transaction is more than two years old: {}", raw))
            }
            Some(_) => {}
        },
    }

    if tx.items.is_empty() {
        result.warning("Transaction has no line items");
    }

    let mut items_total = 0.0;
    let mut items_priced = true;
    for (index, item) in tx.items.iter().enumerate() {
        match item.quantity {
            Some(quantity) if quantity > 0 => {}
            Some(quantity) => {
                result.error(format!("Item {} has non-positive quantity: {}", index, quantity))
            }
            None => {
                items_priced = false;
                result.error(format!("Item {} is missing a quantity", index));
            }
        }
        match item.unit_price {
            Some(price) if price.is_finite() && price >= 0.0 => {
                items_total += price * item.quantity.unwrap_or(0) as f64;
            }
            Some(price) => {
                items_priced = false;
                result.error(format!("Item {} has invalid unit price: {}", index, price));
            }
            None => items_priced = false,
        }
        if is_missing_id(&item.product_id) {
            result.warning(format!("Item {} has no product id", index));
        }
    }

    if !tx.items.is_empty() && items_priced {
        if let Some(amount) = tx.total_amount.filter(|a| a.is_finite()) {
            if (amount - items_total).abs() > AMOUNT_TOLERANCE {
                result.warning(format!(
                    "Total amount {} does not match line items total {:.2}",
                    amount, items_total
                ));
            }
        }
        result.metadata("items_total", items_total);
    }
    result.metadata("item_count", tx.items.len());

    if is_missing_id(&tx.store_id) {
        result.warning("Transaction has no store");
    }

    if let Some(method) = tx.payment_method.as_deref() {
        let normalized = method.trim().to_ascii_lowercase();
        if !KNOWN_PAYMENT_METHODS.contains(&normalized.as_str()) {
            result.warning(format!("Unknown payment method: {}", method));
        }
    }

    result
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_transaction_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

// == Product ==
/// Validates a product catalog row.
pub fn validate_product_data(product: &ProductRecord) -> ValidationResult {
    let mut result = ValidationResult::new();

    if is_blank(&product.name) {
        result.error("Product name is required");
    }

    match product.price {
        None => result.error("Price is required"),
        Some(price) if !price.is_finite() => result.error("Price must be a finite number"),
        Some(price) if price < 0.0 => result.error(format!("Price cannot be negative: {}", price)),
        Some(price) if price == 0.0 => result.warning("Product has zero price"),
        Some(_) => {}
    }

    match product.stock {
        Some(stock) if stock < 0 => {
            result.error(format!("Stock cannot be negative: {}", stock))
        }
        Some(stock) => result.metadata("in_stock", stock > 0),
        None => {}
    }

    if is_blank(&product.sku) {
        result.warning("Product has no SKU");
    }
    if is_blank(&product.category) {
        result.warning("Product has no category");
    }

    result
}
