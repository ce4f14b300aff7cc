use std::collections::BTreeSet;

use chrono::NaiveDateTime;

/// Source columns every dataset must provide, in schema order.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "product_id",
    "product_category_name_english",
    "order_item_id",
    "customer_unique_id",
    "order_purchase_timestamp",
];

// ---------------------------------------------------------------------------
// OrderRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single purchased item line. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub product_id: String,
    /// English product category label.
    pub category: String,
    /// Sequence number of the item within its order.
    pub order_item_id: i64,
    pub customer_id: String,
    pub purchase_ts: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// OrderDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed indices.
#[derive(Debug, Clone)]
pub struct OrderDataset {
    /// All order rows.
    pub orders: Vec<OrderRecord>,
    /// Sorted set of distinct category labels.
    pub categories: BTreeSet<String>,
    /// Earliest purchase timestamp, None when empty.
    pub min_ts: Option<NaiveDateTime>,
    /// Latest purchase timestamp, None when empty.
    pub max_ts: Option<NaiveDateTime>,
}

impl OrderDataset {
    /// Build category and timestamp indices from the loaded rows.
    pub fn from_orders(orders: Vec<OrderRecord>) -> Self {
        let mut categories = BTreeSet::new();
        let mut min_ts: Option<NaiveDateTime> = None;
        let mut max_ts: Option<NaiveDateTime> = None;

        for order in &orders {
            categories.insert(order.category.clone());
            min_ts = Some(match min_ts {
                Some(t) => t.min(order.purchase_ts),
                None => order.purchase_ts,
            });
            max_ts = Some(match max_ts {
                Some(t) => t.max(order.purchase_ts),
                None => order.purchase_ts,
            });
        }

        OrderDataset {
            orders,
            categories,
            min_ts,
            max_ts,
        }
    }

    /// Number of order rows.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
