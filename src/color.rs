use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| hsl_to_color32(Hsl::new((i as f32 / n as f32) * 360.0, 0.75, 0.55)))
        .collect()
}

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Yellow → green → blue ramp for heatmap cells. `t` is clamped to `[0, 1]`.
pub fn heat_color(t: f64) -> Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) as f32 } else { 0.0 };
    let hue = 60.0 + 160.0 * t;
    let lightness = 0.85 - 0.5 * t;
    hsl_to_color32(Hsl::new(hue, 0.65, lightness))
}

// ---------------------------------------------------------------------------
// Category colours: genre → Color32
// ---------------------------------------------------------------------------

/// Maps category labels (genres) to distinct colours, stable for a given set
/// of labels regardless of the order charts list them in.
#[derive(Debug, Clone, Default)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
}

impl CategoryColors {
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let sorted: std::collections::BTreeSet<&str> = labels.into_iter().collect();
        let palette = generate_palette(sorted.len());
        let mapping = sorted
            .into_iter()
            .zip(palette)
            .map(|(label, c)| (label.to_string(), c))
            .collect();
        CategoryColors { mapping }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(Color32::GRAY)
    }
}
