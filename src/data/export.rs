use std::path::Path;

use chrono::NaiveDateTime;

use super::error::DataError;
use super::model::{OrderDataset, REQUIRED_COLUMNS};
use crate::analytics::pivot::MonthKey;

// ---------------------------------------------------------------------------
// Filtered-data export
// ---------------------------------------------------------------------------

/// Write the filtered rows to `path` as CSV, overwriting any existing file.
///
/// The output carries the five source columns plus the derived
/// `days_since_last_purchase` (relative to the filtered window's latest
/// timestamp) and `order_month` columns, matching what the dashboard
/// displays. Returns the number of data rows written.
pub fn export_csv(
    dataset: &OrderDataset,
    indices: &[usize],
    path: &Path,
) -> Result<usize, DataError> {
    let mut writer =
        csv::Writer::from_path(path).map_err(|e| DataError::Export(e.to_string()))?;

    let mut header: Vec<&str> = REQUIRED_COLUMNS.to_vec();
    header.push("days_since_last_purchase");
    header.push("order_month");
    writer
        .write_record(&header)
        .map_err(|e| DataError::Export(e.to_string()))?;

    let max_ts: Option<NaiveDateTime> = indices
        .iter()
        .map(|&i| dataset.orders[i].purchase_ts)
        .max();

    for &i in indices {
        let row = &dataset.orders[i];
        let days = max_ts
            .map(|m| (m - row.purchase_ts).num_days())
            .unwrap_or(0);
        let month = MonthKey::from_datetime(row.purchase_ts);
        writer
            .write_record(&[
                row.product_id.as_str(),
                row.category.as_str(),
                &row.order_item_id.to_string(),
                row.customer_id.as_str(),
                &row.purchase_ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                &days.to_string(),
                &month.to_string(),
            ])
            .map_err(|e| DataError::Export(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| DataError::Export(e.to_string()))?;
    Ok(indices.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::OrderRecord;

    fn order(product: &str, ts: &str) -> OrderRecord {
        OrderRecord {
            product_id: product.into(),
            category: "toys".into(),
            order_item_id: 1,
            customer_id: "c1".into(),
            purchase_ts: crate::data::loader::parse_timestamp(ts).unwrap(),
        }
    }

    #[test]
    fn writes_filtered_rows_with_derived_columns() {
        let ds = OrderDataset::from_orders(vec![
            order("p1", "2018-01-01 00:00:00"),
            order("p2", "2018-01-31 00:00:00"),
            order("p3", "2018-06-01 00:00:00"),
        ]);
        let path = std::env::temp_dir().join(format!(
            "order_lens_export_{}.csv",
            std::process::id()
        ));

        // Export only the first two rows; recency is relative to row 1.
        let written = export_csv(&ds, &[0, 1], &path).unwrap();
        assert_eq!(written, 2);

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.ends_with("days_since_last_purchase,order_month"));
        assert_eq!(
            lines.next().unwrap(),
            "p1,toys,1,c1,2018-01-01 00:00:00,30,2018-01"
        );
        assert_eq!(
            lines.next().unwrap(),
            "p2,toys,1,c1,2018-01-31 00:00:00,0,2018-01"
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn unwritable_path_is_export_error() {
        let ds = OrderDataset::from_orders(Vec::new());
        let err = export_csv(&ds, &[], Path::new("/nonexistent/dir/out.csv")).unwrap_err();
        assert!(matches!(err, DataError::Export(_)));
    }

    #[test]
    fn overwrites_existing_file() {
        let ds = OrderDataset::from_orders(vec![order("p1", "2018-01-01 00:00:00")]);
        let path = std::env::temp_dir().join(format!(
            "order_lens_overwrite_{}.csv",
            std::process::id()
        ));
        std::fs::write(&path, "stale contents").unwrap();

        export_csv(&ds, &[0], &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(!text.contains("stale"));
        assert!(text.starts_with("product_id"));
    }
}
