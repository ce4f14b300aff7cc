use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::export::export_csv;
use crate::state::{AppState, N_RANGE};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the loop.
    let categories: Vec<String> = dataset.categories.iter().cloned().collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Category multi-select ----
            let n_selected = state
                .filters
                .as_ref()
                .map(|p| p.categories.len())
                .unwrap_or(0);
            let header_text = format!("Categories  ({n_selected}/{})", categories.len());

            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_categories();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_categories();
                        }
                    });

                    for category in &categories {
                        let is_selected = state
                            .filters
                            .as_ref()
                            .is_some_and(|p| p.categories.contains(category));
                        let mut checked = is_selected;
                        if ui.checkbox(&mut checked, category).changed() {
                            state.toggle_category(category);
                        }
                    }
                });

            ui.separator();

            // ---- Date interval ----
            ui.strong("Date range");
            let mut dates_changed = false;
            if let Some(params) = &mut state.filters {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("From");
                    dates_changed |= ui
                        .add(DatePickerButton::new(&mut params.start_date).id_salt("start_date"))
                        .changed();
                });
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("To");
                    dates_changed |= ui
                        .add(DatePickerButton::new(&mut params.end_date).id_salt("end_date"))
                        .changed();
                });
            }
            if dates_changed {
                state.refilter();
            }

            ui.separator();

            // ---- Top / least N sliders ----
            ui.strong("Chart sizes");
            ui.add(egui::Slider::new(&mut state.top_n, N_RANGE).text("Top sellers"));
            ui.add(egui::Slider::new(&mut state.least_n, N_RANGE).text("Least sold"));

            ui.separator();

            // ---- Export ----
            ui.strong("Export");
            if ui.button("Export filtered CSV…").clicked() {
                export_dialog(state);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} orders loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open order data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} orders across {} categories",
                    dataset.len(),
                    dataset.categories.len()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                state.status_message = Some(format!("Error: {e}"));
                state.loading = false;
            }
        }
    }
}

fn export_dialog(state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };

    let file = rfd::FileDialog::new()
        .set_title("Export filtered orders")
        .add_filter("CSV", &["csv"])
        .set_file_name("filtered_data.csv")
        .save_file();

    if let Some(path) = file {
        match export_csv(dataset, &state.visible_indices, &path) {
            Ok(rows) => {
                log::info!("Exported {rows} rows to {}", path.display());
                state.status_message = Some(format!("Exported {rows} rows"));
            }
            Err(e) => {
                // Charts already on screen stay up; only the message changes.
                log::error!("Export failed: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
