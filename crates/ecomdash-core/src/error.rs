//! Error types for ecomdash
//!
//! This module defines the error types used throughout the ecomdash crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use ecomdash_core::error::{DashError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to DashError
//!     let _file = std::fs::read_to_string("nonexistent.csv")?;
//!     Ok(())
//! }
//! ```

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ecomdash operations
#[derive(Error, Debug)]
pub enum DashError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error with file context
    #[error("CSV error in {file}: {source}")]
    Csv {
        /// The file being read
        file: PathBuf,
        /// The underlying reader error
        source: csv::Error,
    },

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Start date lies after end date
    #[error("Start date {start} must not be after end date {end}")]
    InvalidDateRange {
        /// Requested start date
        start: NaiveDate,
        /// Requested end date
        end: NaiveDate,
    },

    /// The transaction file contained no rows
    #[error("No transactions found in {0}")]
    EmptyDataset(PathBuf),

    /// Chart rendering failed
    #[error("Chart rendering error: {0}")]
    Chart(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DashError {
    /// Whether this error was caused by user input rather than the data source
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidDate(_) | Self::InvalidDateRange { .. })
    }
}

/// Convenience type alias for Results in ecomdash
pub type Result<T> = std::result::Result<T, DashError>;
