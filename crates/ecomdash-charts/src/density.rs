//! Weighted customer density map
//!
//! Each geolocation point becomes a filled circle whose colour is sampled
//! from the green scale by its share of the largest customer count. The
//! visible region is derived from a web-map style centre and zoom level, and
//! a horizontal colour bar below the map shows the scale.

use crate::style::{HIGHLIGHT, green_at};
use crate::{FONT, chart_error};
use ecomdash_core::{GeoDensityPoint, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use tracing::debug;

/// Pixel height reserved for the colour bar
const COLORBAR_HEIGHT: u32 = 90;

/// Number of slices the colour bar gradient is drawn with
const COLORBAR_STEPS: usize = 64;

/// Web-map tile edge in pixels at zoom level 0
const TILE_SIZE: f64 = 256.0;

/// Background of the map itself, inside the paper
const MAP_BACKGROUND: RGBColor = RGBColor(236, 242, 236);

/// Layout of the density map
#[derive(Debug, Clone, PartialEq)]
pub struct DensityMapStyle {
    /// Latitude of the view centre
    pub center_lat: f64,
    /// Longitude of the view centre
    pub center_lon: f64,
    /// Circle radius in pixels
    pub radius: u32,
    /// Web-map zoom level; each step halves the visible span
    pub zoom: f64,
    pub width: u32,
    pub height: u32,
    pub colorbar_title: String,
    /// Fill behind the map and colour bar
    pub paper: RGBColor,
    pub label_size: u32,
}

impl Default for DensityMapStyle {
    fn default() -> Self {
        // centred on Brazil
        Self {
            center_lat: -14.2350,
            center_lon: -51.9253,
            radius: 15,
            zoom: 3.4,
            width: 600,
            height: 700,
            colorbar_title: "Customer Count".to_string(),
            paper: HIGHLIGHT,
            label_size: 13,
        }
    }
}

/// Longitude and latitude bounds visible on the map
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub lon: Range<f64>,
    pub lat: Range<f64>,
}

impl Viewport {
    pub fn contains(&self, point: &GeoDensityPoint) -> bool {
        self.lon.contains(&point.longitude) && self.lat.contains(&point.latitude)
    }
}

impl DensityMapStyle {
    /// Degrees covered by one pixel at the configured zoom
    pub fn degrees_per_pixel(&self) -> f64 {
        360.0 / (TILE_SIZE * 2f64.powf(self.zoom))
    }

    /// Region visible in the map area above the colour bar
    pub fn viewport(&self) -> Viewport {
        let step = self.degrees_per_pixel();
        let half_lon = self.width as f64 * step / 2.0;
        let half_lat = self.height.saturating_sub(COLORBAR_HEIGHT) as f64 * step / 2.0;
        Viewport {
            lon: (self.center_lon - half_lon)..(self.center_lon + half_lon),
            lat: (self.center_lat - half_lat)..(self.center_lat + half_lat),
        }
    }
}

/// Density map over customer locations
#[derive(Debug, Clone)]
pub struct DensityMap {
    pub points: Vec<GeoDensityPoint>,
    pub style: DensityMapStyle,
}

impl DensityMap {
    pub fn new(points: Vec<GeoDensityPoint>) -> Self {
        Self {
            points,
            style: DensityMapStyle::default(),
        }
    }

    pub fn with_style(mut self, style: DensityMapStyle) -> Self {
        self.style = style;
        self
    }

    /// Largest customer count, at least one so weights stay finite
    fn max_count(&self) -> u64 {
        self.points
            .iter()
            .map(|p| p.customer_count)
            .max()
            .unwrap_or(0)
            .max(1)
    }

    /// Render the map as an SVG document
    pub fn render_svg(&self) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.style.width, self.style.height))
                .into_drawing_area();
            self.draw(&root)?;
            root.present().map_err(chart_error)?;
        }
        debug!("Rendered density map with {} points", self.points.len());
        Ok(svg)
    }

    /// Draw the map and its colour bar onto any plotters drawing area
    pub fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&self.style.paper).map_err(chart_error)?;

        let (map_area, bar_area) =
            root.split_vertically(self.style.height.saturating_sub(COLORBAR_HEIGHT));
        self.draw_map(&map_area)?;
        self.draw_colorbar(&bar_area)
    }

    fn draw_map<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> Result<()> {
        let viewport = self.style.viewport();
        let mut chart = ChartBuilder::on(area)
            .margin(8)
            .build_cartesian_2d(viewport.lon.clone(), viewport.lat.clone())
            .map_err(chart_error)?;
        chart
            .plotting_area()
            .fill(&MAP_BACKGROUND)
            .map_err(chart_error)?;

        let max = self.max_count() as f64;
        let radius = self.style.radius;
        chart
            .draw_series(
                draw_order(&self.points)
                    .into_iter()
                    .filter(|p| viewport.contains(p))
                    .map(|p| {
                        let color = green_at(p.customer_count as f64 / max);
                        Circle::new((p.longitude, p.latitude), radius, color.mix(0.8).filled())
                    }),
            )
            .map_err(chart_error)?;

        Ok(())
    }

    fn draw_colorbar<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> Result<()> {
        let max = self.max_count() as f64;
        let label_size = self.style.label_size;

        let mut chart = ChartBuilder::on(area)
            .margin_left(24)
            .margin_right(24)
            .margin_bottom(4)
            .caption(
                &self.style.colorbar_title,
                (FONT, label_size + 2, &WHITE),
            )
            .x_label_area_size(22)
            .build_cartesian_2d(0f64..max, 0f64..1f64)
            .map_err(chart_error)?;

        let label_formatter = |v: &f64| format!("{v:.0}");
        chart
            .configure_mesh()
            .disable_mesh()
            .disable_y_axis()
            .x_labels(5)
            .x_label_formatter(&label_formatter)
            .label_style((FONT, label_size, &WHITE))
            .draw()
            .map_err(chart_error)?;

        let slice = max / COLORBAR_STEPS as f64;
        chart
            .draw_series((0..COLORBAR_STEPS).map(|k| {
                let x0 = k as f64 * slice;
                let t = (k as f64 + 0.5) / COLORBAR_STEPS as f64;
                Rectangle::new([(x0, 0.0), (x0 + slice, 1.0)], green_at(t).filled())
            }))
            .map_err(chart_error)?;

        Ok(())
    }
}

/// Points sorted so the heaviest are drawn last, on top
fn draw_order(points: &[GeoDensityPoint]) -> Vec<GeoDensityPoint> {
    let mut ordered = points.to_vec();
    ordered.sort_by_key(|p| p.customer_count);
    ordered
}
