use crate::data::model::OrderDataset;

/// Days without a purchase after which a row counts toward churn.
pub const CHURN_THRESHOLD_DAYS: i64 = 90;

/// Number of histogram bins for the recency distribution.
const HISTOGRAM_BINS: usize = 30;

/// Sample count for the smoothed density overlay.
const DENSITY_SAMPLES: usize = 120;

// ---------------------------------------------------------------------------
// Purchase-recency distribution
// ---------------------------------------------------------------------------

/// One histogram bin over `days_since_last_purchase`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecencyBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// The recency distribution of the filtered rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecencyReport {
    /// Per-row whole days between the row's timestamp and the window maximum.
    pub days: Vec<i64>,
    /// Rows more than [`CHURN_THRESHOLD_DAYS`] behind the window maximum.
    pub churn_count: usize,
    pub bins: Vec<RecencyBin>,
    /// Gaussian-kernel density curve scaled to histogram counts, as
    /// `[days, count]` points ready for plotting.
    pub density: Vec<[f64; 2]>,
}

/// Compute the recency distribution. Empty input yields an empty report
/// rather than failing.
pub fn recency_report(dataset: &OrderDataset, indices: &[usize]) -> RecencyReport {
    let Some(max_ts) = indices
        .iter()
        .map(|&i| dataset.orders[i].purchase_ts)
        .max()
    else {
        return RecencyReport::default();
    };

    let days: Vec<i64> = indices
        .iter()
        .map(|&i| (max_ts - dataset.orders[i].purchase_ts).num_days())
        .collect();

    let churn_count = days.iter().filter(|&&d| d > CHURN_THRESHOLD_DAYS).count();
    let bins = histogram(&days);
    let density = density_curve(&days, &bins);

    RecencyReport {
        days,
        churn_count,
        bins,
        density,
    }
}

fn histogram(days: &[i64]) -> Vec<RecencyBin> {
    let max = days.iter().copied().max().unwrap_or(0) as f64;
    // All rows on the same day: a single [0, 1) bin holds everything.
    let span = max.max(1.0);
    let width = span / HISTOGRAM_BINS as f64;

    let mut counts = vec![0usize; HISTOGRAM_BINS];
    for &d in days {
        let bin = ((d as f64 / width) as usize).min(HISTOGRAM_BINS - 1);
        counts[bin] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| RecencyBin {
            start: i as f64 * width,
            end: (i + 1) as f64 * width,
            count,
        })
        .collect()
}

/// Gaussian KDE sampled across the data range, scaled by `n * bin_width` so
/// the curve overlays the histogram counts directly.
fn density_curve(days: &[i64], bins: &[RecencyBin]) -> Vec<[f64; 2]> {
    let n = days.len();
    if n < 2 || bins.is_empty() {
        return Vec::new();
    }

    let values: Vec<f64> = days.iter().map(|&d| d as f64).collect();
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    let std_dev = variance.sqrt();
    if std_dev < f64::EPSILON {
        return Vec::new();
    }

    // Silverman's rule of thumb.
    let bandwidth = 1.06 * std_dev * (n as f64).powf(-0.2);
    let bin_width = bins[0].end - bins[0].start;
    let scale = n as f64 * bin_width;

    let lo = bins[0].start;
    let hi = bins[bins.len() - 1].end;
    let step = (hi - lo) / (DENSITY_SAMPLES - 1) as f64;

    (0..DENSITY_SAMPLES)
        .map(|i| {
            let x = lo + i as f64 * step;
            let kde: f64 = values
                .iter()
                .map(|&v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
            [x, kde * scale]
        })
        .collect()
}
