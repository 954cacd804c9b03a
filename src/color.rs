use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::charts::Palette;
use crate::data::model::CategoryValue;

// ---------------------------------------------------------------------------
// Named palettes
// ---------------------------------------------------------------------------

const SET1: [u32; 9] = [
    0xE41A1C, 0x377EB8, 0x4DAF4A, 0x984EA3, 0xFF7F00, 0xFFFF33, 0xA65628, 0xF781BF, 0x999999,
];

const SET2: [u32; 8] = [
    0x66C2A5, 0xFC8D62, 0x8DA0CB, 0xE78AC3, 0xA6D854, 0xFFD92F, 0xE5C494, 0xB3B3B3,
];

const PLASMA: [u32; 10] = [
    0x0D0887, 0x46039F, 0x7201A8, 0x9C179E, 0xBD3786, 0xD8576B, 0xED7953, 0xFB9F3A, 0xFDCA26,
    0xF0F921,
];

fn hex(rgb: u32) -> Color32 {
    Color32::from_rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

/// Discrete colours of a palette, in order.
pub fn palette_colors(palette: Palette) -> Vec<Color32> {
    let stops: &[u32] = match palette {
        Palette::Set1 => &SET1,
        Palette::Set2 => &SET2,
        Palette::Plasma => &PLASMA,
    };
    stops.iter().copied().map(hex).collect()
}

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
            to_color32(rgb)
        })
        .collect()
}

/// Colour at position `t` (clamped to 0–1) of a palette used as a
/// continuous scale. Interpolates in linear RGB between adjacent stops.
pub fn continuous_color(palette: Palette, t: f64) -> Color32 {
    let stops: Vec<LinSrgb> = palette_colors(palette)
        .into_iter()
        .map(|c| Srgb::new(c.r(), c.g(), c.b()).into_format::<f32>().into_linear())
        .collect();
    if stops.len() < 2 {
        return stops
            .first()
            .map(|c| to_color32(Srgb::from_linear(*c)))
            .unwrap_or(Color32::GRAY);
    }

    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (stops.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(stops.len() - 2);
    let factor = (scaled - lower as f64) as f32;
    let mixed = stops[lower].mix(stops[lower + 1], factor);
    to_color32(Srgb::from_linear(mixed))
}

/// Position of `value` inside `range`, 0–1. A degenerate range maps to 0.5.
pub fn normalize(value: f64, range: (f64, f64)) -> f64 {
    let (lo, hi) = range;
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        0.5
    } else {
        ((value - lo) / span).clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Color mapping: category value → Color32
// ---------------------------------------------------------------------------

/// Maps the categories of a chart to palette colours, cycling when there are
/// more categories than colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<CategoryValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Assign colours to `values` in order. Palettes with fewer colours than
    /// values fall back to evenly spaced hues.
    pub fn new<'a>(palette: Palette, values: impl IntoIterator<Item = &'a CategoryValue>) -> Self {
        let values: Vec<&CategoryValue> = values.into_iter().collect();
        let mut colors = palette_colors(palette);
        if values.len() > colors.len() {
            colors = generate_palette(values.len());
        }
        let mapping = values
            .into_iter()
            .zip(colors.iter().copied().cycle())
            .map(|(v, c)| (v.clone(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given category.
    pub fn color_for(&self, value: &CategoryValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_palettes_decode_hex() {
        let set1 = palette_colors(Palette::Set1);
        assert_eq!(set1.len(), 9);
        assert_eq!(set1[0], Color32::from_rgb(0xE4, 0x1A, 0x1C));
        assert_eq!(palette_colors(Palette::Set2).len(), 8);
    }

    #[test]
    fn continuous_scale_hits_end_stops() {
        assert_eq!(continuous_color(Palette::Plasma, 0.0), hex(0x0D0887));
        assert_eq!(continuous_color(Palette::Plasma, -3.0), hex(0x0D0887));
        let top = continuous_color(Palette::Plasma, 1.0);
        let expected = hex(0xF0F921);
        assert!((i16::from(top.r()) - i16::from(expected.r())).abs() <= 1);
        assert!((i16::from(top.g()) - i16::from(expected.g())).abs() <= 1);
        assert!((i16::from(top.b()) - i16::from(expected.b())).abs() <= 1);
    }

    #[test]
    fn normalize_handles_flat_ranges() {
        assert_eq!(normalize(5.0, (0.0, 10.0)), 0.5);
        assert_eq!(normalize(20.0, (0.0, 10.0)), 1.0);
        assert_eq!(normalize(3.0, (3.0, 3.0)), 0.5);
    }

    #[test]
    fn color_map_falls_back_to_generated_hues() {
        let values: Vec<CategoryValue> = (0..12).map(CategoryValue::Integer).collect();
        let cm = ColorMap::new(Palette::Set2, &values);
        let distinct: std::collections::BTreeSet<_> =
            values.iter().map(|v| cm.color_for(v).to_array()).collect();
        assert_eq!(distinct.len(), 12);
        assert_eq!(cm.color_for(&CategoryValue::from("other")), Color32::GRAY);
    }
}
