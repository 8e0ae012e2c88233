//! HTML dashboard page
//!
//! The page is rendered server-side with `maud`; every chart is an inline SVG
//! document from `ecomdash-charts`, so the output is a single self-contained
//! file that the server returns and the `report` command writes to disk.
//!
//! The density map does not depend on the selected range, so it is rendered
//! once when the [`Dashboard`] is built and reused for every page.

use crate::aggregation::Aggregator;
use crate::data_loader::Dataset;
use crate::output::{format_currency, format_number};
use chrono::NaiveDate;
use ecomdash_charts::{BarChart, ChartStyle, DensityMap, LineChart, Orientation};
use ecomdash_core::aggregation_types::{CustomerCount, DashboardReport};
use ecomdash_core::filters::resolve_range;
use ecomdash_core::{DateRange, Result};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::sync::Arc;
use tracing::{debug, warn};

/// Rows shown in each ranked bar chart
pub const TOP_N: usize = 5;

const PAGE_TITLE: &str = "Brazilian E-commerce Dashboard";

/// What the page shows for one request
#[derive(Debug, Clone)]
pub enum PageView {
    /// Aggregates for a valid range
    Ready(DashboardReport),
    /// The requested range was rejected; only the form and the error render
    Rejected {
        start: NaiveDate,
        end: NaiveDate,
        error: String,
    },
}

/// Dataset plus the pre-rendered parts of the page
pub struct Dashboard {
    dataset: Arc<Dataset>,
    map_svg: String,
}

impl Dashboard {
    /// Build the dashboard, rendering the density map up front
    pub fn new(dataset: Arc<Dataset>) -> Result<Self> {
        let map_svg = DensityMap::new(dataset.geo_points.clone()).render_svg()?;
        debug!("Pre-rendered density map ({} bytes)", map_svg.len());
        Ok(Self { dataset, map_svg })
    }

    /// First and last purchase day, the limits of the date pickers
    pub fn bounds(&self) -> DateRange {
        self.dataset.bounds
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Aggregate the dataset over the requested range
    ///
    /// Missing ends default to the dataset bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ecomdash_core::DashError::InvalidDateRange`] when the start
    /// is after the end; no aggregation runs in that case.
    pub fn report_for(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<DashboardReport> {
        let range = resolve_range(start, end, &self.dataset.bounds)?;
        Ok(Aggregator::report(&self.dataset, range))
    }

    /// Resolve a request into what the page should display
    ///
    /// Invalid ranges become [`PageView::Rejected`] rather than an error, so
    /// the page can still show the form with the message.
    pub fn view(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> PageView {
        match self.report_for(start, end) {
            Ok(report) => PageView::Ready(report),
            Err(e) => {
                warn!("Rejected date range: {e}");
                self.rejected(start, end, e.to_string())
            }
        }
    }

    /// A rejected view that echoes the requested dates back into the form
    pub fn rejected(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        error: impl Into<String>,
    ) -> PageView {
        PageView::Rejected {
            start: start.unwrap_or(self.dataset.bounds.start()),
            end: end.unwrap_or(self.dataset.bounds.end()),
            error: error.into(),
        }
    }

    /// Render the full HTML page
    pub fn render(&self, view: &PageView, year: i32) -> Result<String> {
        let (start, end, error) = match view {
            PageView::Ready(report) => (report.range.start(), report.range.end(), None),
            PageView::Rejected { start, end, error } => (*start, *end, Some(error.as_str())),
        };

        let body = match view {
            PageView::Ready(report) => Some(self.sections(report)?),
            PageView::Rejected { .. } => None,
        };

        let markup = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (PAGE_TITLE) }
                    style { (PreEscaped(STYLES)) }
                }
                body {
                    aside.sidebar {
                        (self.date_form(start, end))
                        @if let Some(message) = error {
                            div.error role="alert" { (message) }
                        } @else {
                            p.selected {
                                "Selected range:" br;
                                (start.to_string()) " - " (end.to_string())
                            }
                        }
                    }
                    main {
                        h1 { (PAGE_TITLE) }
                        @if let Some(sections) = body {
                            (sections)
                        }
                    }
                    footer {
                        p.caption { "Copyright © " (year) " " (PAGE_TITLE) "." }
                    }
                }
            }
        };

        Ok(markup.into_string())
    }

    fn date_form(&self, start: NaiveDate, end: NaiveDate) -> Markup {
        let min = self.dataset.bounds.start().to_string();
        let max = self.dataset.bounds.end().to_string();
        html! {
            form method="get" action="/" {
                label for="start" { "Start date" }
                input #start type="date" name="start" min=(min) max=(max) value=(start.to_string());
                label for="end" { "End date" }
                input #end type="date" name="end" min=(min) max=(max) value=(end.to_string());
                button type="submit" { "Apply" }
            }
        }
    }

    fn sections(&self, report: &DashboardReport) -> Result<Markup> {
        let daily_points = report
            .daily_orders
            .iter()
            .map(|d| (d.date.format("%Y-%m-%d"), d.order_count as f64))
            .collect();
        let daily_svg = LineChart::new("Order Count", daily_points).render_svg()?;

        let half = ChartStyle::sized(600, 420);
        let best = top(
            report
                .product_sales
                .iter()
                .map(|p| (p.category.to_string(), p.items_sold as f64)),
        );
        let worst = top(
            Aggregator::least_sold(&report.product_sales)
                .into_iter()
                .map(|p| (p.category.to_string(), p.items_sold as f64)),
        );
        let best_svg = BarChart::new("Number of Sales", best)
            .with_title("Best Performing Product")
            .with_style(half)
            .render_svg()?;
        let worst_svg = BarChart::new("Number of Sales", worst)
            .with_title("Worst Performing Product")
            .with_style(half)
            .render_svg()?;

        let spend_points = report
            .monthly_spend
            .iter()
            .map(|m| (m.month.clone(), m.total_spend))
            .collect();
        let spend_svg = LineChart::new("Real Brasil (R$)", spend_points).render_svg()?;

        let reviews = top(
            report
                .category_reviews
                .iter()
                .map(|r| (r.category.to_string(), r.review_score)),
        );
        let reviews_svg = BarChart::new("Review Score", reviews).render_svg()?;

        let payments = counts(&report.customers_by_payment_type, usize::MAX);
        let payment_svg = BarChart::new("Customer Count", payments)
            .with_title("by Payment Type")
            .with_orientation(Orientation::Vertical)
            .with_style(ChartStyle::sized(960, 400))
            .render_svg()?;
        let city_svg = BarChart::new("Customer Count", counts(&report.customers_by_city, TOP_N))
            .with_title("by City")
            .with_style(half)
            .render_svg()?;
        let state_svg = BarChart::new("Customer Count", counts(&report.customers_by_state, TOP_N))
            .with_title("by State")
            .with_style(half)
            .render_svg()?;

        Ok(html! {
            section #daily-orders {
                h2 { "Daily Orders" }
                div.metrics {
                    div.metric {
                        span.metric-label { "Total Orders" }
                        span.metric-value { (format_number(report.totals.total_orders)) }
                    }
                    div.metric {
                        span.metric-label { "Total Revenue" }
                        span.metric-value { (format_currency(report.totals.total_revenue)) }
                    }
                }
                (svg(&daily_svg))
            }
            section #products {
                h2 { "Best and Worst Performing Product by Number of Sales" }
                div.pair { (svg(&best_svg)) (svg(&worst_svg)) }
            }
            section #spend {
                h2 { "Customers Spend Money per Month" }
                (svg(&spend_svg))
            }
            section #reviews {
                h2 { "Top 5 Category Product with Highest Review Score" }
                (svg(&reviews_svg))
            }
            section #demographics {
                h2 { "Customer Demographics" }
                (svg(&payment_svg))
                div.pair { (svg(&city_svg)) (svg(&state_svg)) }
            }
            section #density-map {
                h2 { "Customer Density Map" }
                (svg(&self.map_svg))
            }
        })
    }
}

fn top(rows: impl Iterator<Item = (String, f64)>) -> Vec<(String, f64)> {
    rows.take(TOP_N).collect()
}

fn counts(rows: &[CustomerCount], limit: usize) -> Vec<(String, f64)> {
    rows.iter()
        .take(limit)
        .map(|c| (c.value.clone(), c.customer_count as f64))
        .collect()
}

fn svg(document: &str) -> Markup {
    html! { div.chart { (PreEscaped(document)) } }
}

const STYLES: &str = r#"
body { margin: 0; font-family: sans-serif; display: grid; grid-template-columns: 260px 1fr; }
.sidebar { padding: 1.5rem; background: #f0f2f6; min-height: 100vh; }
.sidebar form { display: flex; flex-direction: column; gap: 0.5rem; }
.sidebar button { margin-top: 0.5rem; background: #009600; color: #fff; border: 0; padding: 0.5rem; }
.error { margin-top: 1rem; padding: 0.75rem; background: #fde8e8; color: #9b1c1c; border-radius: 4px; }
main { padding: 1.5rem 2rem; max-width: 1280px; }
.metrics { display: flex; gap: 3rem; margin-bottom: 1rem; }
.metric-label { display: block; color: #555; }
.metric-value { font-size: 2rem; }
.pair { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }
.chart svg { max-width: 100%; height: auto; }
footer { grid-column: 2; padding: 1rem 2rem; color: #777; }
"#;
