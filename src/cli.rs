//! CLI interface for ecomdash
//!
//! This module defines the command-line interface using clap. Every command
//! loads the same two CSV files; the global flags pick the files and the date
//! range, and the subcommand picks what to do with the filtered data.
//!
//! # Example
//!
//! ```bash
//! # Serve the dashboard on port 8080
//! ecomdash serve --port 8080
//!
//! # Top product categories for the first quarter of 2018
//! ecomdash products --since 2018-01 --until 2018-03
//!
//! # Customers per state as JSON
//! ecomdash customers --by state --json
//! ```

use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use ecomdash_core::aggregation_types::CustomerDimension;
use ecomdash_core::{DashError, Result};
use std::path::PathBuf;

/// Date-filtered analytics dashboard over e-commerce transactions
#[derive(Parser, Debug, Clone)]
#[command(name = "ecomdash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding the cleaned CSV files
    #[arg(
        long,
        env = "ECOMDASH_DATA_DIR",
        default_value = "./dashboard",
        global = true
    )]
    pub data_dir: PathBuf,

    /// Transaction CSV file name, relative to the data directory
    #[arg(long, default_value = "all_data.csv", global = true)]
    pub orders_file: String,

    /// Geolocation density CSV file name, relative to the data directory
    #[arg(long, default_value = "map_data.csv", global = true)]
    pub geo_file: String,

    /// Filter by start date (YYYY-MM-DD or YYYY-MM)
    #[arg(long, global = true)]
    pub since: Option<String>,

    /// Filter by end date (YYYY-MM-DD or YYYY-MM, inclusive)
    #[arg(long, global = true)]
    pub until: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the dashboard web server
    Serve {
        /// Address to bind
        #[arg(long, env = "ECOMDASH_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, env = "ECOMDASH_PORT", default_value = "8501")]
        port: u16,
    },

    /// Write the dashboard page to a self-contained HTML file
    Report {
        /// Destination file
        #[arg(long, short = 'o', default_value = "dashboard.html")]
        output: PathBuf,
    },

    /// Show orders and revenue per day
    Daily,

    /// Show items sold per product category
    Products {
        /// Show the least sold categories first
        #[arg(long)]
        worst: bool,
    },

    /// Show customer spend per month
    Spend,

    /// Show mean review score per product category
    Reviews,

    /// Show distinct customers per payment type, city, or state
    Customers {
        /// Dimension to group customers by
        #[arg(long, value_enum, default_value = "state")]
        by: DimensionArg,
    },
}

/// Customer grouping dimension as accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionArg {
    PaymentType,
    City,
    State,
}

impl From<DimensionArg> for CustomerDimension {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::PaymentType => CustomerDimension::PaymentType,
            DimensionArg::City => CustomerDimension::City,
            DimensionArg::State => CustomerDimension::State,
        }
    }
}

impl Cli {
    /// Parsed `--since`, if given
    pub fn since_date(&self) -> Result<Option<NaiveDate>> {
        self.since.as_deref().map(parse_date_filter).transpose()
    }

    /// Parsed `--until`, if given; a bare month means its last day
    pub fn until_date(&self) -> Result<Option<NaiveDate>> {
        self.until.as_deref().map(parse_until_filter).transpose()
    }
}

/// Parse date filter from string
///
/// Accepts dates in YYYY-MM-DD or YYYY-MM format.
/// For YYYY-MM format, defaults to the first day of the month.
///
/// # Example
///
/// ```
/// use ecomdash::cli::parse_date_filter;
/// use chrono::Datelike;
///
/// let date = parse_date_filter("2018-01-15").unwrap();
/// assert_eq!(date.year(), 2018);
/// assert_eq!(date.day(), 15);
///
/// let date = parse_date_filter("2018-01").unwrap();
/// assert_eq!(date.month(), 1);
/// assert_eq!(date.day(), 1);
/// ```
pub fn parse_date_filter(date_str: &str) -> Result<NaiveDate> {
    // Try YYYY-MM-DD format first
    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Ok(date);
    }

    // Try YYYY-MM format (convert to first day of month)
    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() == 2 {
        let year = parts[0]
            .parse::<i32>()
            .map_err(|_| DashError::InvalidDate(format!("Invalid year in '{date_str}'")))?;
        let month = parts[1]
            .parse::<u32>()
            .map_err(|_| DashError::InvalidDate(format!("Invalid month in '{date_str}'")))?;

        if !(1..=12).contains(&month) {
            return Err(DashError::InvalidDate(format!(
                "Month must be between 1-12, got {month}"
            )));
        }

        NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| DashError::InvalidDate(format!("Invalid date: {date_str}")))
    } else {
        Err(DashError::InvalidDate(format!(
            "Invalid date format '{date_str}', expected YYYY-MM-DD or YYYY-MM"
        )))
    }
}

/// Parse an end-of-range filter
///
/// Same formats as [`parse_date_filter`], except that YYYY-MM resolves to the
/// last day of the month so `--until 2018-02` covers all of February.
pub fn parse_until_filter(date_str: &str) -> Result<NaiveDate> {
    let date = parse_date_filter(date_str)?;
    if NaiveDate::parse_from_str(date_str, "%Y-%m-%d").is_ok() {
        return Ok(date);
    }

    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| DashError::InvalidDate(format!("Invalid date: {date_str}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["ecomdash", "daily", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Daily));
        assert_eq!(cli.orders_file, "all_data.csv");
        assert_eq!(cli.geo_file, "map_data.csv");

        let cli = Cli::parse_from(["ecomdash", "--since", "2018-01", "products", "--worst"]);
        assert_eq!(cli.since.as_deref(), Some("2018-01"));
        match cli.command {
            Command::Products { worst } => assert!(worst),
            _ => panic!("Expected Products command"),
        }
    }

    #[test]
    fn test_customers_dimension() {
        let cli = Cli::parse_from(["ecomdash", "customers", "--by", "payment-type"]);
        match cli.command {
            Command::Customers { by } => {
                assert_eq!(CustomerDimension::from(by), CustomerDimension::PaymentType)
            }
            _ => panic!("Expected Customers command"),
        }

        let cli = Cli::parse_from(["ecomdash", "customers"]);
        assert!(matches!(
            cli.command,
            Command::Customers {
                by: DimensionArg::State
            }
        ));
    }

    #[test]
    fn test_serve_arguments() {
        let cli = Cli::parse_from(["ecomdash", "serve", "--host", "0.0.0.0", "--port", "9000"]);
        match cli.command {
            Command::Serve { host, port } => {
                assert_eq!(host, "0.0.0.0");
                assert_eq!(port, 9000);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_date_parsing() {
        let date = parse_date_filter("2018-01-15").unwrap();
        assert_eq!(date.year(), 2018);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);

        let date = parse_date_filter("2018-01").unwrap();
        assert_eq!(date.day(), 1);

        assert!(parse_date_filter("invalid").is_err());
        assert!(parse_date_filter("2018-13").is_err());
        assert!(parse_date_filter("2018").is_err());
    }

    #[test]
    fn test_until_month_resolves_to_last_day() {
        assert_eq!(
            parse_until_filter("2018-02").unwrap(),
            NaiveDate::from_ymd_opt(2018, 2, 28).unwrap()
        );
        assert_eq!(
            parse_until_filter("2017-12").unwrap(),
            NaiveDate::from_ymd_opt(2017, 12, 31).unwrap()
        );
        assert_eq!(
            parse_until_filter("2018-02-10").unwrap(),
            NaiveDate::from_ymd_opt(2018, 2, 10).unwrap()
        );
    }

    #[test]
    fn test_cli_date_accessors() {
        let cli = Cli::parse_from(["ecomdash", "--until", "2018-03", "spend"]);
        assert_eq!(cli.since_date().unwrap(), None);
        assert_eq!(
            cli.until_date().unwrap(),
            NaiveDate::from_ymd_opt(2018, 3, 31)
        );

        let cli = Cli::parse_from(["ecomdash", "--since", "garbage", "spend"]);
        assert!(cli.since_date().is_err());
    }
}
