//! ecomdash - Date-filtered analytics dashboard over e-commerce transactions
//!
//! This library provides functionality to:
//! - Load the cleaned transaction and geolocation CSV files
//! - Filter transactions to an inclusive calendar-day range
//! - Aggregate orders, product sales, spend, reviews, and customer counts
//! - Print aggregates as tables or JSON
//! - Render the dashboard page with inline SVG charts and serve it over HTTP
//!
//! # Examples
//!
//! ```no_run
//! use ecomdash::{aggregation::Aggregator, data_loader::DataLoader};
//! use ecomdash_core::filters::resolve_range;
//!
//! fn main() -> ecomdash_core::Result<()> {
//!     let dataset = DataLoader::new("./dashboard").load()?;
//!     let range = resolve_range(None, None, &dataset.bounds)?;
//!
//!     let report = Aggregator::report(&dataset, range);
//!     println!("{} orders", report.totals.total_orders);
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod cli;
pub mod dashboard;
pub mod data_loader;
pub mod output;
pub mod server;

// Re-export commonly used types
pub use ecomdash_core::{DashError, DateRange, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
