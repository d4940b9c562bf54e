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

/// Darker variant used to highlight a hovered bar or slice.
pub fn highlight(color: Color32) -> Color32 {
    let [r, g, b, a] = color.to_array();
    Color32::from_rgba_unmultiplied(r / 2, g / 2, b / 2, a)
}

// ---------------------------------------------------------------------------
// Color mapping: crime type → Color32
// ---------------------------------------------------------------------------

/// Stable colour per crime type, shared by the bar chart, the pie chart and
/// the legend so a type keeps its colour when the ordering changes.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl CategoryColors {
    /// Assign colours to `crime_types` in iteration order.
    pub fn new<'a, I>(crime_types: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
        I::IntoIter: ExactSizeIterator,
    {
        let crime_types = crime_types.into_iter();
        let palette = generate_palette(crime_types.len());
        let mapping = crime_types.cloned().zip(palette).collect();

        CategoryColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a crime type.
    pub fn color_for(&self, crime_type: &str) -> Color32 {
        self.mapping
            .get(crime_type)
            .copied()
            .unwrap_or(self.default_color)
    }
}
