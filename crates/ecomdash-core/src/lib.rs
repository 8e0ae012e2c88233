//! Core types, filters, and error handling for ecomdash
//!
//! This crate provides the transaction record model, the date-range filter,
//! the aggregation result tables, and the error type shared by the other
//! ecomdash crates.

pub mod aggregation_types;
pub mod error;
pub mod filters;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{DashError, Result};
pub use filters::DateRange;
pub use types::{CategoryName, CustomerId, DailyDate, GeoDensityPoint, OrderId, TransactionRecord};
