use std::collections::BTreeMap;
use std::fmt;

use chrono::Datelike;

use crate::data::model::OrderDataset;

/// Row limit for the customer-month heatmap.
pub const MAX_PIVOT_CUSTOMERS: usize = 20;

// ---------------------------------------------------------------------------
// MonthKey – a timestamp truncated to (year, month)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn from_datetime(ts: chrono::NaiveDateTime) -> Self {
        MonthKey {
            year: ts.year(),
            month: ts.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ---------------------------------------------------------------------------
// Customer-month pivot
// ---------------------------------------------------------------------------

/// Transaction counts per (customer, month), limited to the top customers by
/// total count. Customer ids are replaced with anonymized labels in ranking
/// order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomerMonthPivot {
    /// Anonymized row labels, "Customer 1" first (highest total).
    pub customers: Vec<String>,
    /// Chronologically ordered month columns.
    pub months: Vec<MonthKey>,
    /// `counts[row][col]` = transactions of `customers[row]` in
    /// `months[col]`; missing combinations are 0.
    pub counts: Vec<Vec<u32>>,
}

impl CustomerMonthPivot {
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Largest cell value, for colormap scaling.
    pub fn max_count(&self) -> u32 {
        self.counts
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

/// Build the pivot from the filtered rows.
///
/// Customers are ranked by total transaction count descending, ties broken
/// by customer id ascending so the selection is deterministic, and the top
/// [`MAX_PIVOT_CUSTOMERS`] are kept.
pub fn customer_month_pivot(dataset: &OrderDataset, indices: &[usize]) -> CustomerMonthPivot {
    let mut cells: BTreeMap<(String, MonthKey), u32> = BTreeMap::new();
    let mut totals: BTreeMap<String, u32> = BTreeMap::new();
    let mut months: BTreeMap<MonthKey, usize> = BTreeMap::new();

    for &i in indices {
        let row = &dataset.orders[i];
        let month = MonthKey::from_datetime(row.purchase_ts);
        *cells.entry((row.customer_id.clone(), month)).or_insert(0) += 1;
        *totals.entry(row.customer_id.clone()).or_insert(0) += 1;
        months.entry(month).or_insert(0);
    }

    if totals.is_empty() {
        return CustomerMonthPivot::default();
    }

    // BTreeMap iteration is id-ascending, so a stable sort by count leaves
    // ties in id order.
    let mut ranked: Vec<(String, u32)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(MAX_PIVOT_CUSTOMERS);

    // Column index per month, chronological.
    for (col, (_, slot)) in months.iter_mut().enumerate() {
        *slot = col;
    }
    let month_keys: Vec<MonthKey> = months.keys().copied().collect();

    let mut counts = vec![vec![0u32; month_keys.len()]; ranked.len()];
    for (row_idx, (customer_id, _)) in ranked.iter().enumerate() {
        for (month, col_idx) in &months {
            if let Some(&n) = cells.get(&(customer_id.clone(), *month)) {
                counts[row_idx][*col_idx] = n;
            }
        }
    }

    let customers = (1..=ranked.len())
        .map(|i| format!("Customer {i}"))
        .collect();

    CustomerMonthPivot {
        customers,
        months: month_keys,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{OrderDataset, OrderRecord};

    fn order(customer: &str, ts: &str) -> OrderRecord {
        OrderRecord {
            product_id: "p".into(),
            category: "toys".into(),
            order_item_id: 1,
            customer_id: customer.into(),
            purchase_ts: crate::data::loader::parse_timestamp(ts).unwrap(),
        }
    }

    fn all_indices(ds: &OrderDataset) -> Vec<usize> {
        (0..ds.len()).collect()
    }

    #[test]
    fn pivot_counts_and_zero_fills() {
        let ds = OrderDataset::from_orders(vec![
            order("alice", "2018-01-05 10:00:00"),
            order("alice", "2018-01-20 10:00:00"),
            order("alice", "2018-03-01 10:00:00"),
            order("bob", "2018-02-14 10:00:00"),
        ]);
        let pivot = customer_month_pivot(&ds, &all_indices(&ds));

        assert_eq!(
            pivot.months.iter().map(|m| m.to_string()).collect::<Vec<_>>(),
            vec!["2018-01", "2018-02", "2018-03"]
        );
        // alice has 3 transactions, bob 1 → alice is "Customer 1".
        assert_eq!(pivot.customers, vec!["Customer 1", "Customer 2"]);
        assert_eq!(pivot.counts[0], vec![2, 0, 1]);
        assert_eq!(pivot.counts[1], vec![0, 1, 0]);
        assert_eq!(pivot.max_count(), 2);
    }

    #[test]
    fn limits_to_top_twenty_customers() {
        let mut orders = Vec::new();
        for c in 0..25 {
            // customer n makes n+1 purchases, all in one month
            for _ in 0..=c {
                orders.push(order(&format!("cust{c:02}"), "2018-06-01 00:00:00"));
            }
        }
        let ds = OrderDataset::from_orders(orders);
        let pivot = customer_month_pivot(&ds, &all_indices(&ds));

        assert_eq!(pivot.customers.len(), MAX_PIVOT_CUSTOMERS);
        // Highest total (25 purchases by cust24) ranks first.
        assert_eq!(pivot.counts[0][0], 25);
        // Lowest kept total is 6 (cust05); cust00..cust04 were cut.
        assert_eq!(pivot.counts[MAX_PIVOT_CUSTOMERS - 1][0], 6);
    }

    #[test]
    fn ties_rank_by_customer_id() {
        let ds = OrderDataset::from_orders(vec![
            order("zeta", "2018-01-01 00:00:00"),
            order("alpha", "2018-01-01 00:00:00"),
        ]);
        let pivot = customer_month_pivot(&ds, &all_indices(&ds));
        // Both totals are 1; "alpha" < "zeta" so alpha becomes Customer 1.
        // The labels hide the ids, so assert through determinism: rebuilding
        // gives the identical pivot.
        let again = customer_month_pivot(&ds, &all_indices(&ds));
        assert_eq!(pivot, again);
        assert_eq!(pivot.customers, vec!["Customer 1", "Customer 2"]);
    }

    #[test]
    fn empty_input_yields_empty_pivot() {
        let ds = OrderDataset::from_orders(Vec::new());
        let pivot = customer_month_pivot(&ds, &[]);
        assert!(pivot.is_empty());
        assert_eq!(pivot.max_count(), 0);
    }
}
