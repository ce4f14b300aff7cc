use crate::analytics::DashboardReport;
use crate::data::filter::{FilterParams, filtered_indices, init_filter_params};
use crate::data::model::OrderDataset;

/// Slider range for both the top-N and least-N controls.
pub const N_RANGE: std::ops::RangeInclusive<usize> = 5..=20;
pub const N_DEFAULT: usize = 10;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until the user loads a file). Cached for the
    /// session; the source file is treated as static.
    pub dataset: Option<OrderDataset>,

    /// Current category / date-range selection.
    pub filters: Option<FilterParams>,

    /// Indices of orders passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregates derived from the visible rows (cached, rebuilt on any
    /// filter change).
    pub report: DashboardReport,

    /// How many top sellers the bar chart shows.
    pub top_n: usize,

    /// How many least-sold products the pie chart shows.
    pub least_n: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            filters: None,
            visible_indices: Vec::new(),
            report: DashboardReport::default(),
            top_n: N_DEFAULT,
            least_n: N_DEFAULT,
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset and initialise filters to the full span.
    pub fn set_dataset(&mut self, dataset: OrderDataset) {
        self.filters = Some(init_filter_params(&dataset));
        self.visible_indices = (0..dataset.len()).collect();
        self.report = DashboardReport::build(&dataset, &self.visible_indices);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.loading = false;
    }

    /// Recompute visible indices and the report after a filter change.
    pub fn refilter(&mut self) {
        if let (Some(ds), Some(params)) = (&self.dataset, &self.filters) {
            self.visible_indices = filtered_indices(ds, params);
            self.report = DashboardReport::build(ds, &self.visible_indices);
        }
    }

    /// Toggle a single category in the filter selection.
    pub fn toggle_category(&mut self, category: &str) {
        if let Some(params) = &mut self.filters {
            if !params.categories.remove(category) {
                params.categories.insert(category.to_string());
            }
            self.refilter();
        }
    }

    /// Select every category.
    pub fn select_all_categories(&mut self) {
        if let (Some(ds), Some(params)) = (&self.dataset, &mut self.filters) {
            params.categories = ds.categories.clone();
            self.refilter();
        }
    }

    /// Deselect every category. The dashboard then renders its "no data"
    /// state rather than erroring.
    pub fn select_no_categories(&mut self) {
        if let Some(params) = &mut self.filters {
            params.categories.clear();
            self.refilter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{OrderDataset, OrderRecord};

    fn dataset() -> OrderDataset {
        let orders = vec![
            OrderRecord {
                product_id: "p1".into(),
                category: "toys".into(),
                order_item_id: 1,
                customer_id: "c1".into(),
                purchase_ts: crate::data::loader::parse_timestamp("2018-01-01 00:00:00").unwrap(),
            },
            OrderRecord {
                product_id: "p2".into(),
                category: "books".into(),
                order_item_id: 1,
                customer_id: "c2".into(),
                purchase_ts: crate::data::loader::parse_timestamp("2018-02-01 00:00:00").unwrap(),
            },
        ];
        OrderDataset::from_orders(orders)
    }

    #[test]
    fn set_dataset_selects_everything() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.report.filtered_rows, 2);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn toggling_a_category_refilters_and_rebuilds_report() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        state.toggle_category("books");
        assert_eq!(state.visible_indices, vec![0]);
        assert_eq!(state.report.filtered_rows, 1);

        state.toggle_category("books");
        assert_eq!(state.visible_indices, vec![0, 1]);
    }

    #[test]
    fn deselecting_all_yields_empty_report_without_error() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        state.select_no_categories();
        assert!(state.visible_indices.is_empty());
        assert!(state.report.is_empty());

        state.select_all_categories();
        assert_eq!(state.visible_indices.len(), 2);
    }
}
