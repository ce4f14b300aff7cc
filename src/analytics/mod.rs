//! Aggregation layer: pure functions from (dataset, filtered indices) to the
//! derived views the charts render.
//!
//! ```text
//!  OrderDataset + Vec<usize>
//!        │
//!        ├──▶ sales    group by (product, category) → descending ranking
//!        ├──▶ recency  days since last purchase → histogram + churn count
//!        └──▶ pivot    customer × month transaction counts (top 20)
//! ```
//!
//! Everything here is recomputed from scratch whenever the filter parameters
//! change and cached by the caller. Empty input degrades to empty outputs;
//! nothing in this module fails.

pub mod pivot;
pub mod recency;
pub mod sales;

use crate::data::model::OrderDataset;

use pivot::CustomerMonthPivot;
use recency::RecencyReport;
use sales::ProductSales;

/// All chart inputs for the current filter state.
#[derive(Debug, Clone, Default)]
pub struct DashboardReport {
    /// Full product ranking, descending by `total_sales`. The UI slices the
    /// top-N prefix and least-N tail out of this.
    pub ranked_sales: Vec<ProductSales>,
    pub recency: RecencyReport,
    pub pivot: CustomerMonthPivot,
    /// Row count of the filtered dataset the report was built from.
    pub filtered_rows: usize,
}

impl DashboardReport {
    pub fn build(dataset: &OrderDataset, indices: &[usize]) -> Self {
        DashboardReport {
            ranked_sales: sales::product_sales(dataset, indices),
            recency: recency::recency_report(dataset, indices),
            pivot: pivot::customer_month_pivot(dataset, indices),
            filtered_rows: indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.filtered_rows == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{OrderDataset, OrderRecord};

    #[test]
    fn empty_filtered_set_builds_empty_report() {
        let ds = OrderDataset::from_orders(Vec::new());
        let report = DashboardReport::build(&ds, &[]);
        assert!(report.is_empty());
        assert!(report.ranked_sales.is_empty());
        assert!(report.recency.bins.is_empty());
        assert!(report.pivot.is_empty());
    }

    #[test]
    fn report_ties_out_with_filtered_rows() {
        let orders: Vec<OrderRecord> = (0..4)
            .map(|i| OrderRecord {
                product_id: format!("p{}", i % 2),
                category: "toys".into(),
                order_item_id: 1,
                customer_id: format!("c{i}"),
                purchase_ts: crate::data::loader::parse_timestamp("2018-01-01 00:00:00").unwrap(),
            })
            .collect();
        let ds = OrderDataset::from_orders(orders);
        let indices: Vec<usize> = (0..ds.len()).collect();

        let report = DashboardReport::build(&ds, &indices);
        let total: usize = report.ranked_sales.iter().map(|p| p.total_sales).sum();
        assert_eq!(total, report.filtered_rows);
    }
}
