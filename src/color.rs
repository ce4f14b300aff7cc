use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Series palette (bar / pie charts)
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Diverging heatmap gradient (cool → warm)
// ---------------------------------------------------------------------------

/// Map `t` in `[0, 1]` onto a blue → off-white → red gradient for heatmap
/// cells. Values outside the range are clamped.
pub fn heatmap_color(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    const COOL: [f32; 3] = [0.23, 0.30, 0.75];
    const NEUTRAL: [f32; 3] = [0.87, 0.87, 0.87];
    const WARM: [f32; 3] = [0.71, 0.02, 0.15];

    let lerp = |a: [f32; 3], b: [f32; 3], f: f32| {
        [
            a[0] + (b[0] - a[0]) * f,
            a[1] + (b[1] - a[1]) * f,
            a[2] + (b[2] - a[2]) * f,
        ]
    };
    let rgb = if t < 0.5 {
        lerp(COOL, NEUTRAL, t * 2.0)
    } else {
        lerp(NEUTRAL, WARM, (t - 0.5) * 2.0)
    };
    Color32::from_rgb(
        (rgb[0] * 255.0) as u8,
        (rgb[1] * 255.0) as u8,
        (rgb[2] * 255.0) as u8,
    )
}
