//! SVG chart rendering for ecomdash
//!
//! This crate turns aggregation tables into standalone SVG documents that the
//! dashboard page inlines. Three chart kinds cover every dashboard section:
//! line charts for time series, bar charts for ranked categories, and a
//! weighted density map for customer locations.

pub mod bar;
pub mod density;
pub mod line;
pub mod style;

pub use bar::{BarChart, Orientation};
pub use density::{DensityMap, DensityMapStyle, Viewport};
pub use line::LineChart;
pub use style::{ChartStyle, GREEN_SCALE, HIGHLIGHT, MUTED};

use ecomdash_core::DashError;

pub(crate) const FONT: &str = "sans-serif";

/// Convert a plotters drawing error into a [`DashError`]
pub(crate) fn chart_error<E: std::fmt::Debug>(error: E) -> DashError {
    DashError::Chart(format!("{error:?}"))
}
