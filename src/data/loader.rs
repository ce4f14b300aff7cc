use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use arrow::array::{Array, Int32Array, Int64Array, StringArray, TimestampMicrosecondArray,
    TimestampMillisecondArray, TimestampNanosecondArray, TimestampSecondArray};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::model::{OrderDataset, OrderRecord, REQUIRED_COLUMNS};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an order dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – delimited text with a header row (the canonical export)
/// * `.json`    – `[{ "product_id": ..., "customer_unique_id": ..., ... }, ...]`
/// * `.parquet` – flat scalar columns, as written by `df.to_parquet()`
///
/// All formats must carry the five required columns (see
/// [`REQUIRED_COLUMNS`]); a file that lacks any of them fails with
/// [`DataError::Schema`] naming every missing column, before any rows are
/// parsed.
pub fn load_file(path: &Path) -> Result<OrderDataset, DataError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataError::Unavailable(anyhow!(
            "Unsupported file extension: .{other}"
        ))),
    }
}

/// Parse a purchase timestamp. Accepts full datetimes with a space or `T`
/// separator, or a bare date (midnight).
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ts);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).unwrap());
    }
    bail!("'{s}' is not an ISO-8601 timestamp")
}

/// Collect the required columns absent from `headers`.
fn missing_columns(headers: &[String]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .map(|col| col.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<OrderDataset, DataError> {
    let mut reader = csv::Reader::from_path(path)
        .context("opening CSV")
        .map_err(DataError::Unavailable)?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")
        .map_err(DataError::Unavailable)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let missing = missing_columns(&headers);
    if !missing.is_empty() {
        return Err(DataError::Schema { missing });
    }

    // All five are present after the schema check.
    let idx = |name: &str| headers.iter().position(|h| h == name).unwrap();
    let product_idx = idx("product_id");
    let category_idx = idx("product_category_name_english");
    let item_idx = idx("order_item_id");
    let customer_idx = idx("customer_unique_id");
    let ts_idx = idx("order_purchase_timestamp");

    let mut orders = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result
            .with_context(|| format!("CSV row {row_no}"))
            .map_err(DataError::Unavailable)?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();

        let order = OrderRecord {
            product_id: field(product_idx).to_string(),
            category: field(category_idx).to_string(),
            order_item_id: field(item_idx)
                .parse::<i64>()
                .with_context(|| format!("CSV row {row_no}: order_item_id"))
                .map_err(DataError::Unavailable)?,
            customer_id: field(customer_idx).to_string(),
            purchase_ts: parse_timestamp(field(ts_idx))
                .with_context(|| format!("CSV row {row_no}: order_purchase_timestamp"))
                .map_err(DataError::Unavailable)?,
        };
        orders.push(order);
    }

    Ok(OrderDataset::from_orders(orders))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "product_id": "a1b2",
///     "product_category_name_english": "toys",
///     "order_item_id": 1,
///     "customer_unique_id": "c9f3",
///     "order_purchase_timestamp": "2018-03-01 10:22:05"
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<OrderDataset, DataError> {
    let text = std::fs::read_to_string(path)
        .context("reading JSON file")
        .map_err(DataError::Unavailable)?;
    let root: JsonValue = serde_json::from_str(&text)
        .context("parsing JSON")
        .map_err(DataError::Unavailable)?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")
        .map_err(DataError::Unavailable)?;

    // Schema check against the first record; an empty array is an empty
    // dataset, not a schema failure.
    if let Some(first) = records.first() {
        let keys: Vec<String> = first
            .as_object()
            .map(|obj| obj.keys().cloned().collect())
            .unwrap_or_default();
        let missing = missing_columns(&keys);
        if !missing.is_empty() {
            return Err(DataError::Schema { missing });
        }
    }

    let mut orders = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))
            .map_err(DataError::Unavailable)?;

        let str_field = |name: &str| -> Result<String> {
            obj.get(name)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .with_context(|| format!("Row {i}: missing or non-string '{name}'"))
        };
        let order = (|| -> Result<OrderRecord> {
            Ok(OrderRecord {
                product_id: str_field("product_id")?,
                category: str_field("product_category_name_english")?,
                order_item_id: obj
                    .get("order_item_id")
                    .and_then(|v| v.as_i64())
                    .with_context(|| format!("Row {i}: missing or non-integer 'order_item_id'"))?,
                customer_id: str_field("customer_unique_id")?,
                purchase_ts: parse_timestamp(&str_field("order_purchase_timestamp")?)
                    .with_context(|| format!("Row {i}: order_purchase_timestamp"))?,
            })
        })()
        .map_err(DataError::Unavailable)?;

        orders.push(order);
    }

    Ok(OrderDataset::from_orders(orders))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet order file.
///
/// Expected schema: the five required columns as flat scalars.
/// `order_purchase_timestamp` may be Utf8 or a native Timestamp column
/// (Pandas writes datetime64 as Timestamp, `astype(str)` exports as Utf8).
fn load_parquet(path: &Path) -> Result<OrderDataset, DataError> {
    let file = std::fs::File::open(path)
        .context("opening parquet file")
        .map_err(DataError::Unavailable)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")
        .map_err(DataError::Unavailable)?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let missing = missing_columns(&headers);
    if !missing.is_empty() {
        return Err(DataError::Schema { missing });
    }

    let reader = builder
        .build()
        .context("building parquet reader")
        .map_err(DataError::Unavailable)?;

    let mut orders = Vec::new();
    for batch_result in reader {
        let batch = batch_result
            .context("reading parquet record batch")
            .map_err(DataError::Unavailable)?;
        let schema = batch.schema();
        let col = |name: &str| -> &Arc<dyn Array> {
            // index_of cannot fail after the schema check
            batch.column(schema.index_of(name).unwrap())
        };

        let product_col = col("product_id");
        let category_col = col("product_category_name_english");
        let item_col = col("order_item_id");
        let customer_col = col("customer_unique_id");
        let ts_col = col("order_purchase_timestamp");

        for row in 0..batch.num_rows() {
            let order = (|| -> Result<OrderRecord> {
                Ok(OrderRecord {
                    product_id: extract_string(product_col, row)
                        .with_context(|| format!("Row {row}: product_id"))?,
                    category: extract_string(category_col, row)
                        .with_context(|| format!("Row {row}: product_category_name_english"))?,
                    order_item_id: extract_i64(item_col, row)
                        .with_context(|| format!("Row {row}: order_item_id"))?,
                    customer_id: extract_string(customer_col, row)
                        .with_context(|| format!("Row {row}: customer_unique_id"))?,
                    purchase_ts: extract_timestamp(ts_col, row)
                        .with_context(|| format!("Row {row}: order_purchase_timestamp"))?,
                })
            })()
            .map_err(DataError::Unavailable)?;
            orders.push(order);
        }
    }

    Ok(OrderDataset::from_orders(orders))
}

// -- Parquet / Arrow helpers --

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        other => bail!("expected Utf8 column, got {other:?}"),
    }
}

fn extract_i64(col: &Arc<dyn Array>, row: usize) -> Result<i64> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Ok(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Ok(arr.value(row))
        }
        other => bail!("expected integer column, got {other:?}"),
    }
}

fn extract_timestamp(col: &Arc<dyn Array>, row: usize) -> Result<NaiveDateTime> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Utf8 => parse_timestamp(&extract_string(col, row)?),
        DataType::Timestamp(unit, _) => {
            let nanos: i128 = match unit {
                TimeUnit::Second => {
                    let arr = col.as_any().downcast_ref::<TimestampSecondArray>().unwrap();
                    arr.value(row) as i128 * 1_000_000_000
                }
                TimeUnit::Millisecond => {
                    let arr = col
                        .as_any()
                        .downcast_ref::<TimestampMillisecondArray>()
                        .unwrap();
                    arr.value(row) as i128 * 1_000_000
                }
                TimeUnit::Microsecond => {
                    let arr = col
                        .as_any()
                        .downcast_ref::<TimestampMicrosecondArray>()
                        .unwrap();
                    arr.value(row) as i128 * 1_000
                }
                TimeUnit::Nanosecond => {
                    let arr = col
                        .as_any()
                        .downcast_ref::<TimestampNanosecondArray>()
                        .unwrap();
                    arr.value(row) as i128
                }
            };
            let secs = (nanos.div_euclid(1_000_000_000)) as i64;
            let nsecs = (nanos.rem_euclid(1_000_000_000)) as u32;
            DateTime::from_timestamp(secs, nsecs)
                .map(|dt| dt.naive_utc())
                .context("timestamp out of range")
        }
        other => bail!("expected Utf8 or Timestamp column, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("order_lens_{}_{name}", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    const CSV_HEADER: &str = "product_id,product_category_name_english,order_item_id,customer_unique_id,order_purchase_timestamp";

    #[test]
    fn loads_csv_with_all_columns() {
        let path = write_temp(
            "ok.csv",
            &format!(
                "{CSV_HEADER}\n\
                 p1,toys,1,c1,2018-03-01 10:22:05\n\
                 p2,books,1,c2,2017-11-20 08:00:00\n"
            ),
        );
        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.orders[0].product_id, "p1");
        assert_eq!(ds.orders[1].category, "books");
        assert!(ds.categories.contains("toys"));
    }

    #[test]
    fn missing_column_is_schema_error() {
        // customer_unique_id dropped from the header
        let path = write_temp(
            "noschema.csv",
            "product_id,product_category_name_english,order_item_id,order_purchase_timestamp\n\
             p1,toys,1,2018-03-01 10:22:05\n",
        );
        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        match err {
            DataError::Schema { missing } => {
                assert_eq!(missing, vec!["customer_unique_id".to_string()]);
            }
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = load_file(Path::new("/nonexistent/orders.csv")).unwrap_err();
        assert!(matches!(err, DataError::Unavailable(_)));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("orders.xlsx")).unwrap_err();
        assert!(matches!(err, DataError::Unavailable(_)));
    }

    #[test]
    fn loads_records_oriented_json() {
        let path = write_temp(
            "ok.json",
            r#"[{"product_id":"p1","product_category_name_english":"toys",
                 "order_item_id":1,"customer_unique_id":"c1",
                 "order_purchase_timestamp":"2018-03-01T10:22:05"}]"#,
        );
        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.len(), 1);
        assert_eq!(ds.orders[0].customer_id, "c1");
    }

    #[test]
    fn timestamp_formats() {
        assert!(parse_timestamp("2018-03-01 10:22:05").is_ok());
        assert!(parse_timestamp("2018-03-01T10:22:05").is_ok());
        let midnight = parse_timestamp("2018-03-01").unwrap();
        assert_eq!(midnight.time(), chrono::NaiveTime::MIN);
        assert!(parse_timestamp("not-a-date").is_err());
    }
}
