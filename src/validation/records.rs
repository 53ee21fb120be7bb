//! Record Types
//!
//! Typed views of the loosely-shaped rows the dashboard reads from the
//! `brands`, `transactions`, `transaction_items` and `products` tables.
//! Every column is optional so that a missing field becomes a validation
//! error instead of a deserialization failure.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// == Record Id ==
/// Row identifier; the database hands out both numeric and text ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// True for empty or whitespace-only text ids.
    pub fn is_blank(&self) -> bool {
        match self {
            RecordId::Number(_) => false,
            RecordId::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

// == Brand ==
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BrandRow")]
pub struct BrandRecord {
    pub id: Option<RecordId>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub revenue: Option<f64>,
    /// Percent of category sales, 0 to 100
    pub market_share: Option<f64>,
    /// Period-over-period change in percent
    pub growth_rate: Option<f64>,
}

// == Transaction ==
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "TransactionRow")]
pub struct TransactionRecord {
    pub id: Option<RecordId>,
    pub store_id: Option<RecordId>,
    pub customer_id: Option<RecordId>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub date: Option<String>,
    pub total_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub items: Vec<TransactionItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "TransactionItemRow")]
pub struct TransactionItem {
    pub product_id: Option<RecordId>,
    pub quantity: Option<i64>,
    pub unit_price: Option<f64>,
}

// == Product ==
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProductRow")]
pub struct ProductRecord {
    pub id: Option<RecordId>,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub brand_id: Option<RecordId>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
}

// == Wire Rows ==
// Rows often carry the same fact under several column names (a table column
// next to a view alias, snake_case next to camelCase). Each name is its own
// field here; the first present one in the listed order wins.

#[derive(Deserialize)]
struct BrandRow {
    #[serde(default)]
    id: Option<RecordId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    revenue: Option<f64>,
    #[serde(default)]
    total_revenue: Option<f64>,
    #[serde(default, rename = "totalRevenue")]
    total_revenue_camel: Option<f64>,
    #[serde(default)]
    market_share: Option<f64>,
    #[serde(default, rename = "marketShare")]
    market_share_camel: Option<f64>,
    #[serde(default)]
    growth_rate: Option<f64>,
    #[serde(default, rename = "growthRate")]
    growth_rate_camel: Option<f64>,
    #[serde(default)]
    growth: Option<f64>,
}

impl From<BrandRow> for BrandRecord {
    fn from(row: BrandRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            revenue: row.revenue.or(row.total_revenue).or(row.total_revenue_camel),
            market_share: row.market_share.or(row.market_share_camel),
            growth_rate: row.growth_rate.or(row.growth_rate_camel).or(row.growth),
        }
    }
}

#[derive(Deserialize)]
struct TransactionRow {
    #[serde(default)]
    id: Option<RecordId>,
    #[serde(default)]
    store_id: Option<RecordId>,
    #[serde(default, rename = "storeId")]
    store_id_camel: Option<RecordId>,
    #[serde(default)]
    customer_id: Option<RecordId>,
    #[serde(default, rename = "customerId")]
    customer_id_camel: Option<RecordId>,
    #[serde(default)]
    transaction_date: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    total_amount: Option<f64>,
    #[serde(default, rename = "totalAmount")]
    total_amount_camel: Option<f64>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    payment_method: Option<String>,
    #[serde(default, rename = "paymentMethod")]
    payment_method_camel: Option<String>,
    #[serde(default)]
    items: Option<Vec<TransactionItem>>,
    #[serde(default)]
    transaction_items: Option<Vec<TransactionItem>>,
}

impl From<TransactionRow> for TransactionRecord {
    fn from(row: TransactionRow) -> Self {
        Self {
            id: row.id,
            store_id: row.store_id.or(row.store_id_camel),
            customer_id: row.customer_id.or(row.customer_id_camel),
            // The business date wins over the row insert time
            date: row.transaction_date.or(row.date).or(row.created_at),
            total_amount: row
                .total_amount
                .or(row.total_amount_camel)
                .or(row.amount),
            payment_method: row.payment_method.or(row.payment_method_camel),
            items: row
                .items
                .or(row.transaction_items)
                .unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct TransactionItemRow {
    #[serde(default)]
    product_id: Option<RecordId>,
    #[serde(default, rename = "productId")]
    product_id_camel: Option<RecordId>,
    #[serde(default)]
    quantity: Option<i64>,
    #[serde(default)]
    unit_price: Option<f64>,
    #[serde(default, rename = "unitPrice")]
    unit_price_camel: Option<f64>,
    #[serde(default)]
    price: Option<f64>,
}

impl From<TransactionItemRow> for TransactionItem {
    fn from(row: TransactionItemRow) -> Self {
        Self {
            product_id: row.product_id.or(row.product_id_camel),
            quantity: row.quantity,
            unit_price: row.unit_price.or(row.unit_price_camel).or(row.price),
        }
    }
}

#[derive(Deserialize)]
struct ProductRow {
    #[serde(default)]
    id: Option<RecordId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    brand_id: Option<RecordId>,
    #[serde(default, rename = "brandId")]
    brand_id_camel: Option<RecordId>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    stock: Option<i64>,
    #[serde(default)]
    stock_quantity: Option<i64>,
    #[serde(default, rename = "stockQuantity")]
    stock_quantity_camel: Option<i64>,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            sku: row.sku,
            category: row.category,
            brand_id: row.brand_id.or(row.brand_id_camel),
            price: row.price,
            stock: row.stock.or(row.stock_quantity).or(row.stock_quantity_camel),
        }
    }
}

// == Record Kind ==
/// Which validator applies to a raw JSON record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Brand,
    Transaction,
    Product,
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brand" | "brands" => Ok(RecordKind::Brand),
            "transaction" | "transactions" => Ok(RecordKind::Transaction),
            "product" | "products" => Ok(RecordKind::Product),
            other => Err(format!("unknown record kind: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_accepts_numbers_and_text() {
        let numeric: RecordId = serde_json::from_value(json!(42)).unwrap();
        let text: RecordId = serde_json::from_value(json!("TX-001")).unwrap();

        assert_eq!(numeric, RecordId::Number(42));
        assert_eq!(text.to_string(), "TX-001");
        assert!(RecordId::Text("  ".to_string()).is_blank());
    }

    #[test]
    fn test_brand_camel_case_aliases() {
        let brand: BrandRecord = serde_json::from_value(json!({
            "name": "Alaska",
            "totalRevenue": 125000.5,
            "marketShare": 12.5,
            "growthRate": 4.2
        }))
        .unwrap();

        assert_eq!(brand.revenue, Some(125000.5));
        assert_eq!(brand.market_share, Some(12.5));
        assert_eq!(brand.growth_rate, Some(4.2));
        assert!(brand.category.is_none());
    }

    #[test]
    fn test_transaction_missing_items_defaults_empty() {
        let tx: TransactionRecord = serde_json::from_value(json!({
            "id": 1,
            "transaction_date": "2025-03-01",
            "total_amount": 99.0
        }))
        .unwrap();

        assert!(tx.items.is_empty());
        assert_eq!(tx.date.as_deref(), Some("2025-03-01"));
    }

    #[test]
    fn test_transaction_row_with_both_date_columns() {
        let tx: TransactionRecord = serde_json::from_value(json!({
            "id": 1,
            "created_at": "2025-01-02T03:04:05Z",
            "transaction_date": "2025-01-01",
            "total_amount": 40.0,
            "amount": 39.0
        }))
        .unwrap();

        assert_eq!(tx.date.as_deref(), Some("2025-01-01"));
        assert_eq!(tx.total_amount, Some(40.0));
    }

    #[test]
    fn test_created_at_used_when_no_transaction_date() {
        let tx: TransactionRecord = serde_json::from_value(json!({
            "id": 1,
            "created_at": "2025-01-02T03:04:05Z"
        }))
        .unwrap();

        assert_eq!(tx.date.as_deref(), Some("2025-01-02T03:04:05Z"));
    }

    #[test]
    fn test_brand_and_product_rows_with_repeated_columns() {
        let brand: BrandRecord = serde_json::from_value(json!({
            "name": "Bear Brand",
            "revenue": 5000.0,
            "total_revenue": 7000.0,
            "totalRevenue": 9000.0
        }))
        .unwrap();
        assert_eq!(brand.revenue, Some(5000.0));

        let product: ProductRecord = serde_json::from_value(json!({
            "name": "Piattos",
            "stock": 12,
            "stock_quantity": 15
        }))
        .unwrap();
        assert_eq!(product.stock, Some(12));

        let item: TransactionItem = serde_json::from_value(json!({
            "quantity": 2,
            "unit_price": 19.5,
            "price": 21.0
        }))
        .unwrap();
        assert_eq!(item.unit_price, Some(19.5));
    }

    #[test]
    fn test_record_kind_parse() {
        assert_eq!("brands".parse::<RecordKind>(), Ok(RecordKind::Brand));
        assert_eq!("Transaction".parse::<RecordKind>(), Ok(RecordKind::Transaction));
        assert!("customers".parse::<RecordKind>().is_err());
    }
}
