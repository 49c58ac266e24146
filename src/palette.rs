//! Color scales and color parsing.

use plotters::style::RGBColor;

/// Fill for cells with no data.
pub const NEUTRAL_GRAY: RGBColor = RGBColor(0xcc, 0xcc, 0xcc);

/// Teal → light blue ramp over `[vmin, vmax]`; `None` is neutral gray.
pub fn sequential_color(value: Option<f64>, vmin: f64, vmax: f64) -> RGBColor {
    let Some(v) = value else {
        return NEUTRAL_GRAY;
    };
    let t = if vmax == vmin {
        0.5
    } else {
        ((v - vmin) / (vmax - vmin)).clamp(0.0, 1.0)
    };
    let r = 76.0;
    let g = 150.0 + 60.0 * t;
    let b = 120.0 + 135.0 * t;
    RGBColor(r as u8, g as u8, b as u8)
}

/// Red (negative) ↔ blue (positive) scale; `value` is clamped to `domain`
/// and its distance from the domain midpoint sets the saturation.
pub fn diverging_color(value: f64, domain: (f64, f64)) -> RGBColor {
    let (lo, hi) = domain;
    let t = if hi == lo {
        0.0
    } else {
        let clamped = value.clamp(lo.min(hi), lo.max(hi));
        2.0 * (clamped - lo) / (hi - lo) - 1.0
    };
    let r = 30.0 + 225.0 * (-t).max(0.0);
    let b = 30.0 + 225.0 * t.max(0.0);
    RGBColor(r as u8, 60, b as u8)
}

/// Default domain of [`diverging_color`] for correlations.
pub const CORRELATION_DOMAIN: (f64, f64) = (-1.0, 1.0);

pub fn to_hex(color: RGBColor) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

/// Parse a color string into RGBColor, supporting hex (#RRGGBB, #RGB) and named colors
pub fn parse_color(color_str: &str) -> Option<RGBColor> {
    let color_str = color_str.trim();

    if color_str.starts_with('#') {
        return parse_hex_color(color_str);
    }

    match color_str.to_lowercase().as_str() {
        "white" => Some(RGBColor(255, 255, 255)),
        "black" => Some(RGBColor(0, 0, 0)),
        "red" => Some(RGBColor(228, 87, 86)),
        "green" => Some(RGBColor(84, 162, 75)),
        "blue" => Some(RGBColor(76, 120, 168)),
        "orange" => Some(RGBColor(245, 133, 24)),
        "purple" => Some(RGBColor(178, 121, 162)),
        "gray" | "grey" => Some(RGBColor(128, 128, 128)),
        "lightgray" | "lightgrey" => Some(RGBColor(221, 221, 221)),
        _ => None,
    }
}

/// Parse hex color (#RRGGBB or #RGB)
fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(RGBColor(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(RGBColor(r, g, b))
        }
        _ => None,
    }
}
