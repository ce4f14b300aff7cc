use std::collections::HashMap;

use crate::data::model::OrderDataset;

// ---------------------------------------------------------------------------
// Product sales ranking
// ---------------------------------------------------------------------------

/// One (product, category) group with its sold line-item count.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSales {
    pub product_id: String,
    pub category: String,
    pub total_sales: usize,
}

/// Group the filtered rows by (product id, category) and rank the groups by
/// `total_sales` descending. Ties keep first-seen group order, so the
/// ranking is deterministic for a given dataset and filter.
pub fn product_sales(dataset: &OrderDataset, indices: &[usize]) -> Vec<ProductSales> {
    let mut by_group: HashMap<(String, String), usize> = HashMap::new();
    let mut order: Vec<(String, String)> = Vec::new();

    for &i in indices {
        let row = &dataset.orders[i];
        let key = (row.product_id.clone(), row.category.clone());
        match by_group.get_mut(&key) {
            Some(count) => *count += 1,
            None => {
                by_group.insert(key.clone(), 1);
                order.push(key);
            }
        }
    }

    let mut ranked: Vec<ProductSales> = order
        .into_iter()
        .map(|(product_id, category)| {
            let total_sales = by_group[&(product_id.clone(), category.clone())];
            ProductSales {
                product_id,
                category,
                total_sales,
            }
        })
        .collect();

    // Stable sort keeps first-seen order among equal counts.
    ranked.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));
    ranked
}

/// First `n` entries of the descending ranking.
pub fn top_sellers(ranked: &[ProductSales], n: usize) -> &[ProductSales] {
    &ranked[..n.min(ranked.len())]
}

/// Last `n` entries of the descending ranking, in the order they appear at
/// the tail. This is deliberately NOT an ascending re-sort: when `n` exceeds
/// the number of distinct products the slice overlaps the top slice, and
/// that overlap is kept as-is.
pub fn least_sellers(ranked: &[ProductSales], n: usize) -> &[ProductSales] {
    &ranked[ranked.len() - n.min(ranked.len())..]
}
