use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints};

use crate::analytics::pivot::CustomerMonthPivot;
use crate::analytics::recency::{CHURN_THRESHOLD_DAYS, RecencyReport};
use crate::analytics::sales::{self, ProductSales};
use crate::color::{generate_palette, heatmap_color};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render all four charts for the current filter state.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view the dashboard  (File → Open…)");
        });
        return;
    }

    if state.report.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data for the current filters");
        });
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let report = &state.report;

            ui.heading(format!("Top {} selling products", state.top_n));
            top_sellers_bar(ui, sales::top_sellers(&report.ranked_sales, state.top_n));
            ui.separator();

            ui.heading(format!("Least {} sold products", state.least_n));
            least_sellers_pie(ui, sales::least_sellers(&report.ranked_sales, state.least_n));
            ui.separator();

            ui.heading("Days since last purchase");
            ui.label(format!(
                "{} rows more than {CHURN_THRESHOLD_DAYS} days behind the latest purchase",
                report.recency.churn_count
            ));
            recency_histogram(ui, &report.recency);
            ui.separator();

            ui.heading("Customer purchase pattern (top 20)");
            customer_heatmap(ui, &report.pivot);
        });
}

// ---------------------------------------------------------------------------
// 1. Top sellers – horizontal bar chart
// ---------------------------------------------------------------------------

fn top_sellers_bar(ui: &mut Ui, top: &[ProductSales]) {
    if top.is_empty() {
        ui.label("No data.");
        return;
    }

    let palette = generate_palette(top.len());
    let n = top.len();

    // Highest count at the top of the chart.
    let bars: Vec<Bar> = top
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Bar::new((n - 1 - i) as f64, p.total_sales as f64)
                .name(format!("{} ({})", p.category, p.product_id))
                .fill(palette[i])
                .width(0.7)
        })
        .collect();

    let labels: Vec<String> = top.iter().map(|p| p.category.clone()).collect();

    Plot::new("top_sellers")
        .height(260.0)
        .x_axis_label("Items sold")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .y_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels
                .get(n - 1 - (idx as usize).min(n - 1))
                .cloned()
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

// ---------------------------------------------------------------------------
// 2. Least sellers – pie chart
// ---------------------------------------------------------------------------

/// Share of `total_sales` among just the least-sold subset; percentages sum
/// to 100% of that subset, not of the whole dataset.
fn least_sellers_pie(ui: &mut Ui, least: &[ProductSales]) {
    if least.is_empty() {
        ui.label("No data.");
        return;
    }

    let subset_total: usize = least.iter().map(|p| p.total_sales).sum();
    if subset_total == 0 {
        ui.label("No data.");
        return;
    }

    let palette = generate_palette(least.len());
    let radius = 110.0;
    let (rect, _) =
        ui.allocate_exact_size(Vec2::new(ui.available_width(), radius * 2.0 + 16.0), egui::Sense::hover());
    let center = rect.center();
    let painter = ui.painter_at(rect);

    let mut angle = -std::f64::consts::FRAC_PI_2;
    for (i, p) in least.iter().enumerate() {
        let fraction = p.total_sales as f64 / subset_total as f64;
        let sweep = fraction * std::f64::consts::TAU;

        // Fan of small triangles approximating the wedge; each triangle is
        // convex even when the wedge itself spans more than half the circle.
        let steps = ((sweep / 0.05).ceil() as usize).max(1);
        for s in 0..steps {
            let a0 = angle + sweep * s as f64 / steps as f64;
            let a1 = angle + sweep * (s + 1) as f64 / steps as f64;
            let p0 = center + Vec2::new(a0.cos() as f32, a0.sin() as f32) * radius;
            let p1 = center + Vec2::new(a1.cos() as f32, a1.sin() as f32) * radius;
            painter.add(Shape::convex_polygon(
                vec![center, p0, p1],
                palette[i],
                Stroke::NONE,
            ));
        }

        // Percentage label at the wedge midpoint.
        let mid = angle + sweep / 2.0;
        let label_pos = center + Vec2::new(mid.cos() as f32, mid.sin() as f32) * (radius * 0.65);
        painter.text(
            label_pos,
            Align2::CENTER_CENTER,
            format!("{:.1}%", fraction * 100.0),
            FontId::proportional(12.0),
            Color32::WHITE,
        );

        angle += sweep;
    }

    // Legend: category swatches under the pie.
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (i, p) in least.iter().enumerate() {
            let (swatch, _) = ui.allocate_exact_size(Vec2::splat(10.0), egui::Sense::hover());
            ui.painter().rect_filled(swatch, egui::CornerRadius::same(2), palette[i]);
            ui.label(format!("{} ({})", p.category, p.total_sales));
        }
    });
}

// ---------------------------------------------------------------------------
// 3. Recency – histogram with density overlay
// ---------------------------------------------------------------------------

fn recency_histogram(ui: &mut Ui, recency: &RecencyReport) {
    if recency.bins.is_empty() {
        ui.label("No data.");
        return;
    }

    let bars: Vec<Bar> = recency
        .bins
        .iter()
        .map(|bin| {
            Bar::new((bin.start + bin.end) / 2.0, bin.count as f64)
                .width(bin.end - bin.start)
                .fill(Color32::from_rgb(70, 130, 220))
        })
        .collect();

    let density: PlotPoints = recency.density.iter().copied().collect();

    Plot::new("recency_histogram")
        .height(260.0)
        .x_axis_label("Days since last purchase")
        .y_axis_label("Rows")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
            if !recency.density.is_empty() {
                plot_ui.line(Line::new(density).color(Color32::LIGHT_BLUE).width(2.0));
            }
        });
}

// ---------------------------------------------------------------------------
// 4. Customer-month pivot – heatmap
// ---------------------------------------------------------------------------

fn customer_heatmap(ui: &mut Ui, pivot: &CustomerMonthPivot) {
    if pivot.is_empty() {
        ui.label("No data.");
        return;
    }

    let label_width = 90.0;
    let month_label_height = 18.0;
    let cell_height = 18.0;
    let grid_width = (ui.available_width() - label_width).max(120.0);
    let cell_width = grid_width / pivot.months.len() as f32;
    let grid_height = cell_height * pivot.customers.len() as f32;

    let (rect, _) = ui.allocate_exact_size(
        Vec2::new(label_width + grid_width, grid_height + month_label_height),
        egui::Sense::hover(),
    );
    let painter = ui.painter_at(rect);
    let max_count = pivot.max_count().max(1) as f32;

    for (row, label) in pivot.customers.iter().enumerate() {
        let y = rect.top() + row as f32 * cell_height;
        painter.text(
            Pos2::new(rect.left() + label_width - 6.0, y + cell_height / 2.0),
            Align2::RIGHT_CENTER,
            label,
            FontId::proportional(11.0),
            ui.visuals().text_color(),
        );

        for (col, &count) in pivot.counts[row].iter().enumerate() {
            let cell = Rect::from_min_size(
                Pos2::new(rect.left() + label_width + col as f32 * cell_width, y),
                Vec2::new(cell_width, cell_height),
            );
            painter.rect(
                cell.shrink(0.5),
                egui::CornerRadius::ZERO,
                heatmap_color(count as f32 / max_count),
                Stroke::new(0.3, Color32::GRAY),
                egui::StrokeKind::Inside,
            );
        }
    }

    // Month labels: skip columns when they would collide.
    let label_stride = ((48.0 / cell_width).ceil() as usize).max(1);
    for (col, month) in pivot.months.iter().enumerate() {
        if col % label_stride != 0 {
            continue;
        }
        painter.text(
            Pos2::new(
                rect.left() + label_width + (col as f32 + 0.5) * cell_width,
                rect.top() + grid_height + 2.0,
            ),
            Align2::CENTER_TOP,
            month.to_string(),
            FontId::proportional(10.0),
            ui.visuals().text_color(),
        );
    }
}
