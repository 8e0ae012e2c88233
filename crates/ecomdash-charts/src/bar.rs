//! Ranked bar charts
//!
//! Bars are drawn in the order given, so callers pass tables that are already
//! sorted. The first bar is highlighted and the rest are muted, which makes
//! the leader of every top-N table stand out.

use crate::line::{draw_no_data, label_at, y_upper_bound};
use crate::style::{ChartStyle, bar_color};
use crate::{FONT, chart_error};
use ecomdash_core::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

/// Half the thickness of a bar, in category units
const BAR_HALF_WIDTH: f64 = 0.4;

/// Direction the bars grow in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Categories on the y axis, first bar at the top
    Horizontal,
    /// Categories on the x axis, first bar on the left
    Vertical,
}

/// A bar chart over labelled values
#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    /// Description of the value axis
    pub value_label: String,
    /// `(category, value)` in drawing order
    pub bars: Vec<(String, f64)>,
    pub orientation: Orientation,
    pub style: ChartStyle,
}

impl BarChart {
    pub fn new(value_label: impl Into<String>, bars: Vec<(String, f64)>) -> Self {
        Self {
            title: String::new(),
            value_label: value_label.into(),
            bars,
            orientation: Orientation::Horizontal,
            style: ChartStyle::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    /// Render the chart as an SVG document
    pub fn render_svg(&self) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.style.width, self.style.height))
                .into_drawing_area();
            self.draw(&root)?;
            root.present().map_err(chart_error)?;
        }
        debug!(
            "Rendered {:?} bar chart with {} bars",
            self.orientation,
            self.bars.len()
        );
        Ok(svg)
    }

    /// Draw the chart onto any plotters drawing area
    pub fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE).map_err(chart_error)?;

        if self.bars.is_empty() {
            return draw_no_data(root, &self.style);
        }

        match self.orientation {
            Orientation::Horizontal => self.draw_horizontal(root),
            Orientation::Vertical => self.draw_vertical(root),
        }
    }

    fn draw_horizontal<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let count = self.bars.len();
        let value_max = y_upper_bound(self.bars.iter().map(|(_, v)| *v));

        let mut builder = ChartBuilder::on(root);
        builder
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(category_area_width(&self.bars, self.style.label_size));
        if !self.title.is_empty() {
            builder.caption(&self.title, (FONT, self.style.title_size));
        }
        let mut chart = builder
            .build_cartesian_2d(0f64..value_max, -0.5f64..count as f64 - 0.5)
            .map_err(chart_error)?;

        // y grows upwards, so the first bar sits on the highest tick
        let labels: Vec<&str> = self.bars.iter().rev().map(|(l, _)| l.as_str()).collect();
        let label_formatter = |y: &f64| label_at(&labels, *y);
        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(count)
            .y_label_formatter(&label_formatter)
            .x_desc(self.value_label.as_str())
            .label_style((FONT, self.style.label_size))
            .axis_desc_style((FONT, self.style.label_size + 2))
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(self.bars.iter().enumerate().map(|(i, (_, value))| {
                let y = (count - 1 - i) as f64;
                Rectangle::new(
                    [(0.0, y - BAR_HALF_WIDTH), (*value, y + BAR_HALF_WIDTH)],
                    bar_color(i).filled(),
                )
            }))
            .map_err(chart_error)?;

        Ok(())
    }

    fn draw_vertical<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let count = self.bars.len();
        let value_max = y_upper_bound(self.bars.iter().map(|(_, v)| *v));

        let mut builder = ChartBuilder::on(root);
        builder.margin(16).x_label_area_size(48).y_label_area_size(72);
        if !self.title.is_empty() {
            builder.caption(&self.title, (FONT, self.style.title_size));
        }
        let mut chart = builder
            .build_cartesian_2d(-0.5f64..count as f64 - 0.5, 0f64..value_max)
            .map_err(chart_error)?;

        let labels: Vec<&str> = self.bars.iter().map(|(l, _)| l.as_str()).collect();
        let label_formatter = |x: &f64| label_at(&labels, *x);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(count)
            .x_label_formatter(&label_formatter)
            .y_desc(self.value_label.as_str())
            .label_style((FONT, self.style.label_size))
            .axis_desc_style((FONT, self.style.label_size + 2))
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(self.bars.iter().enumerate().map(|(i, (_, value))| {
                let x = i as f64;
                Rectangle::new(
                    [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, *value)],
                    bar_color(i).filled(),
                )
            }))
            .map_err(chart_error)?;

        Ok(())
    }
}

/// Width reserved for category labels, estimated from the longest label
fn category_area_width(bars: &[(String, f64)], label_size: u32) -> u32 {
    let longest = bars
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0) as u32;
    // roughly 0.6em per glyph in a proportional sans font
    (longest * label_size * 6 / 10 + 16).clamp(60, 320)
}
