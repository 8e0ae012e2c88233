//! Line charts for time series such as daily orders and monthly spend

use crate::style::{ChartStyle, HIGHLIGHT};
use crate::{FONT, chart_error};
use ecomdash_core::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

/// Upper bound on x-axis labels, so long daily series stay legible
const MAX_X_LABELS: usize = 12;

const NO_DATA_GREY: RGBColor = RGBColor(120, 120, 120);

/// A single-series line chart with labelled x positions
#[derive(Debug, Clone)]
pub struct LineChart {
    /// Caption drawn above the chart, empty for none
    pub title: String,
    /// Y-axis description
    pub y_label: String,
    /// `(x label, y value)` in drawing order
    pub points: Vec<(String, f64)>,
    pub style: ChartStyle,
}

impl LineChart {
    pub fn new(y_label: impl Into<String>, points: Vec<(String, f64)>) -> Self {
        Self {
            title: String::new(),
            y_label: y_label.into(),
            points,
            style: ChartStyle::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
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
        debug!("Rendered line chart with {} points", self.points.len());
        Ok(svg)
    }

    /// Draw the chart onto any plotters drawing area
    pub fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE).map_err(chart_error)?;

        if self.points.is_empty() {
            return draw_no_data(root, &self.style);
        }

        let x_max = self.points.len().saturating_sub(1).max(1) as f64;
        let y_max = y_upper_bound(self.points.iter().map(|(_, v)| *v));

        let mut builder = ChartBuilder::on(root);
        builder.margin(16).x_label_area_size(48).y_label_area_size(72);
        if !self.title.is_empty() {
            builder.caption(&self.title, (FONT, self.style.title_size));
        }
        let mut chart = builder
            .build_cartesian_2d(-0.5f64..x_max + 0.5, 0f64..y_max)
            .map_err(chart_error)?;

        let labels: Vec<&str> = self.points.iter().map(|(l, _)| l.as_str()).collect();
        let label_formatter = |x: &f64| label_at(&labels, *x);
        chart
            .configure_mesh()
            .x_labels(self.points.len().min(MAX_X_LABELS))
            .x_label_formatter(&label_formatter)
            .y_desc(self.y_label.as_str())
            .label_style((FONT, self.style.label_size))
            .axis_desc_style((FONT, self.style.label_size + 2))
            .draw()
            .map_err(chart_error)?;

        let series: Vec<(f64, f64)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, (_, v))| (i as f64, *v))
            .collect();

        chart
            .draw_series(LineSeries::new(series.iter().copied(), HIGHLIGHT.stroke_width(2)))
            .map_err(chart_error)?;
        chart
            .draw_series(
                series
                    .iter()
                    .map(|point| Circle::new(*point, 3, HIGHLIGHT.filled())),
            )
            .map_err(chart_error)?;

        Ok(())
    }
}

/// Label for the data point at tick position `x`, empty between points
pub(crate) fn label_at(labels: &[&str], x: f64) -> String {
    let nearest = x.round();
    if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    labels
        .get(nearest as usize)
        .map(|l| l.to_string())
        .unwrap_or_default()
}

/// Upper y bound with headroom, never zero
pub(crate) fn y_upper_bound(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.filter(|v| v.is_finite()).fold(0.0f64, f64::max);
    if max <= 0.0 { 1.0 } else { max * 1.1 }
}

/// Centered "no data" message for empty tables
pub(crate) fn draw_no_data<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    style: &ChartStyle,
) -> Result<()> {
    let text_style = TextStyle::from((FONT, (style.label_size + 4) as f64).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center))
        .color(&NO_DATA_GREY);
    root.draw(&Text::new(
        "No data for the selected range",
        ((style.width / 2) as i32, (style.height / 2) as i32),
        text_style,
    ))
    .map_err(chart_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<(String, f64)> {
        vec![
            ("2018-01-01".to_string(), 3.0),
            ("2018-01-02".to_string(), 0.0),
            ("2018-01-03".to_string(), 7.0),
        ]
    }

    #[test]
    fn test_renders_svg_document() {
        let svg = LineChart::new("Order Count", sample_points())
            .with_title("Daily Orders")
            .render_svg()
            .unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Order Count"));
        assert!(svg.contains("Daily Orders"));
    }

    #[test]
    fn test_single_point_renders() {
        let svg = LineChart::new("Order Count", vec![("2018-01-01".to_string(), 5.0)])
            .render_svg()
            .unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_empty_series_renders_placeholder() {
        let svg = LineChart::new("Order Count", Vec::new()).render_svg().unwrap();
        assert!(svg.contains("No data for the selected range"));
    }

    #[test]
    fn test_label_at() {
        let labels = ["a", "b", "c"];
        assert_eq!(label_at(&labels, 0.0), "a");
        assert_eq!(label_at(&labels, 2.0), "c");
        assert_eq!(label_at(&labels, 1.5), "");
        assert_eq!(label_at(&labels, 3.0), "");
        assert_eq!(label_at(&labels, -1.0), "");
    }

    #[test]
    fn test_y_upper_bound() {
        assert_eq!(y_upper_bound([0.0, 0.0].into_iter()), 1.0);
        assert!((y_upper_bound([10.0, 5.0].into_iter()) - 11.0).abs() < 1e-9);
        assert_eq!(y_upper_bound([f64::NAN].into_iter()), 1.0);
    }
}
