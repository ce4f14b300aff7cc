use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::OrderDataset;

// ---------------------------------------------------------------------------
// Filter parameters: selected categories + inclusive date interval
// ---------------------------------------------------------------------------

/// The user's current filter selection.
///
/// An empty category set means "nothing selected" and yields an empty result
/// (not an error). The interval is inclusive on both ends; an inverted
/// interval (start after end) likewise yields an empty result.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    pub categories: BTreeSet<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Initialise [`FilterParams`] with every category selected and the
/// dataset's full date span (i.e., show everything).
pub fn init_filter_params(dataset: &OrderDataset) -> FilterParams {
    let fallback = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    FilterParams {
        categories: dataset.categories.clone(),
        start_date: dataset.min_ts.map(|t| t.date()).unwrap_or(fallback),
        end_date: dataset.max_ts.map(|t| t.date()).unwrap_or(fallback),
    }
}

/// Return indices of orders that pass the current filters.
///
/// A row passes when its category is in the selected set AND its purchase
/// date falls within `[start_date, end_date]`. A row stamped any time on the
/// `end_date` calendar day is retained.
pub fn filtered_indices(dataset: &OrderDataset, params: &FilterParams) -> Vec<usize> {
    dataset
        .orders
        .iter()
        .enumerate()
        .filter(|(_, order)| {
            if !params.categories.contains(&order.category) {
                return false;
            }
            let date = order.purchase_ts.date();
            date >= params.start_date && date <= params.end_date
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{OrderDataset, OrderRecord};
    use chrono::NaiveDate;

    fn order(category: &str, ts: &str) -> OrderRecord {
        OrderRecord {
            product_id: "p".into(),
            category: category.into(),
            order_item_id: 1,
            customer_id: "c".into(),
            purchase_ts: crate::data::loader::parse_timestamp(ts).unwrap(),
        }
    }

    fn dataset() -> OrderDataset {
        OrderDataset::from_orders(vec![
            order("toys", "2018-01-10 09:00:00"),
            order("books", "2018-02-20 15:30:00"),
            order("toys", "2018-03-31 23:59:59"),
            order("garden", "2018-05-01 00:00:00"),
        ])
    }

    fn params(categories: &[&str], start: &str, end: &str) -> FilterParams {
        FilterParams {
            categories: categories.iter().map(|s| s.to_string()).collect(),
            start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            end_date: NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
        }
    }

    #[test]
    fn retains_only_selected_categories_in_interval() {
        let ds = dataset();
        let p = params(&["toys", "books"], "2018-01-01", "2018-12-31");
        let indices = filtered_indices(&ds, &p);
        assert_eq!(indices, vec![0, 1, 2]);
        for &i in &indices {
            assert!(p.categories.contains(&ds.orders[i].category));
        }
    }

    #[test]
    fn end_boundary_is_inclusive() {
        let ds = dataset();
        // Row 2 is stamped 23:59:59 on the end date and must be kept.
        let p = params(&["toys"], "2018-01-01", "2018-03-31");
        assert_eq!(filtered_indices(&ds, &p), vec![0, 2]);
    }

    #[test]
    fn inverted_interval_yields_empty() {
        let ds = dataset();
        let p = params(&["toys", "books", "garden"], "2018-12-31", "2018-01-01");
        assert!(filtered_indices(&ds, &p).is_empty());
    }

    #[test]
    fn empty_selection_yields_empty() {
        let ds = dataset();
        let p = params(&[], "2018-01-01", "2018-12-31");
        assert!(filtered_indices(&ds, &p).is_empty());
    }

    #[test]
    fn init_selects_everything() {
        let ds = dataset();
        let p = init_filter_params(&ds);
        assert_eq!(p.categories.len(), 3);
        assert_eq!(p.start_date, NaiveDate::from_ymd_opt(2018, 1, 10).unwrap());
        assert_eq!(p.end_date, NaiveDate::from_ymd_opt(2018, 5, 1).unwrap());
        assert_eq!(filtered_indices(&ds, &p).len(), ds.len());
    }
}
