//! Colours and sizing shared by the chart kinds

use plotters::style::RGBColor;

/// Colour of the leading bar and of time-series lines
pub const HIGHLIGHT: RGBColor = RGBColor(0, 150, 0);

/// Colour of every bar after the first
pub const MUTED: RGBColor = RGBColor(211, 211, 211);

/// Sequential green scale, light to dark
pub const GREEN_SCALE: [RGBColor; 9] = [
    RGBColor(247, 252, 245),
    RGBColor(229, 245, 224),
    RGBColor(199, 233, 192),
    RGBColor(161, 217, 155),
    RGBColor(116, 196, 118),
    RGBColor(65, 171, 93),
    RGBColor(35, 139, 69),
    RGBColor(0, 109, 44),
    RGBColor(0, 68, 27),
];

/// Canvas size and font sizes for one chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub title_size: u32,
    pub label_size: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 960,
            height: 480,
            title_size: 22,
            label_size: 14,
        }
    }
}

impl ChartStyle {
    /// Default fonts on a custom canvas
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

/// Bar colour for the bar at `index`
pub fn bar_color(index: usize) -> RGBColor {
    if index == 0 { HIGHLIGHT } else { MUTED }
}

/// Sample the green scale at `t` in `[0, 1]`
pub fn green_at(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (GREEN_SCALE.len() - 1) as f64;
    let lower = scaled.floor() as usize;
    let upper = (lower + 1).min(GREEN_SCALE.len() - 1);
    let frac = scaled - lower as f64;

    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (GREEN_SCALE[lower], GREEN_SCALE[upper]);
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}
