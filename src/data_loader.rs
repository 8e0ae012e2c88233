//! Data loader for the cleaned transaction and geolocation CSV files
//!
//! Both files are read once, eagerly, into an immutable [`Dataset`]. The
//! transaction file is the denormalized table that every aggregation runs
//! over; the geolocation file backs the density map.
//!
//! Malformed rows are fatal: the error names the file and the row, and
//! nothing is served from a partially loaded dataset.
//!
//! # Examples
//!
//! ```no_run
//! use ecomdash::data_loader::DataLoader;
//!
//! # fn example() -> ecomdash_core::Result<()> {
//! let dataset = DataLoader::new("./dashboard").load()?;
//! println!(
//!     "{} transactions between {} and {}",
//!     dataset.transactions.len(),
//!     dataset.bounds.start(),
//!     dataset.bounds.end()
//! );
//! # Ok(())
//! # }
//! ```

use ecomdash_core::{DashError, DateRange, GeoDensityPoint, Result, TransactionRecord};
use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default transaction file name
pub const ORDERS_FILE: &str = "all_data.csv";

/// Default geolocation density file name
pub const GEO_FILE: &str = "map_data.csv";

/// Rows between progress updates
const PROGRESS_STEP: u64 = 10_000;

/// Loaded, immutable dashboard data
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Transactions sorted by purchase timestamp
    pub transactions: Vec<TransactionRecord>,
    /// Customer density points for the map
    pub geo_points: Vec<GeoDensityPoint>,
    /// First and last purchase day in `transactions`
    pub bounds: DateRange,
}

impl Dataset {
    /// Build a dataset from already parsed rows
    ///
    /// Sorts the transactions by purchase timestamp, keeping file order for
    /// equal timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::EmptyDataset`] when there are no transactions,
    /// since the date bounds are undefined.
    pub fn new(
        mut transactions: Vec<TransactionRecord>,
        geo_points: Vec<GeoDensityPoint>,
    ) -> Result<Self> {
        transactions.sort_by_key(|r| r.purchased_at);
        let bounds = DateRange::covering(&transactions)
            .ok_or_else(|| DashError::EmptyDataset(PathBuf::from(ORDERS_FILE)))?;
        Ok(Self {
            transactions,
            geo_points,
            bounds,
        })
    }
}

/// Reads the two CSV files from a data directory
#[derive(Debug, Clone)]
pub struct DataLoader {
    data_dir: PathBuf,
    orders_file: String,
    geo_file: String,
    /// Whether to show a spinner while reading
    show_progress: bool,
}

impl DataLoader {
    /// Loader for the default file names inside `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            orders_file: ORDERS_FILE.to_string(),
            geo_file: GEO_FILE.to_string(),
            show_progress: false,
        }
    }

    /// Override the transaction file name
    pub fn with_orders_file(mut self, name: impl Into<String>) -> Self {
        self.orders_file = name.into();
        self
    }

    /// Override the geolocation file name
    pub fn with_geo_file(mut self, name: impl Into<String>) -> Self {
        self.geo_file = name.into();
        self
    }

    /// Enable or disable progress spinners
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Full path of the transaction file
    pub fn orders_path(&self) -> PathBuf {
        self.data_dir.join(&self.orders_file)
    }

    /// Full path of the geolocation file
    pub fn geo_path(&self) -> PathBuf {
        self.data_dir.join(&self.geo_file)
    }

    /// Load both files into a [`Dataset`]
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Csv`] naming the offending file when either file
    /// is missing, lacks a required column, or holds an unparseable value,
    /// and [`DashError::EmptyDataset`] when the transaction file has no rows.
    pub fn load(&self) -> Result<Dataset> {
        let orders_path = self.orders_path();
        let transactions: Vec<TransactionRecord> =
            self.read_csv(&orders_path, "Loading transactions")?;
        if transactions.is_empty() {
            return Err(DashError::EmptyDataset(orders_path));
        }

        let geo_path = self.geo_path();
        let geo_points: Vec<GeoDensityPoint> = self.read_csv(&geo_path, "Loading locations")?;

        let dataset = Dataset::new(transactions, geo_points)?;
        info!(
            "Loaded {} transactions and {} locations, {} to {}",
            dataset.transactions.len(),
            dataset.geo_points.len(),
            dataset.bounds.start(),
            dataset.bounds.end()
        );
        Ok(dataset)
    }

    fn read_csv<T: DeserializeOwned>(&self, path: &Path, message: &'static str) -> Result<Vec<T>> {
        let csv_error = |source| DashError::Csv {
            file: path.to_path_buf(),
            source,
        };
        let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;

        let progress = self.show_progress.then(|| spinner(message));
        let mut rows = Vec::new();
        for result in reader.deserialize() {
            rows.push(result.map_err(csv_error)?);
            if let Some(pb) = &progress {
                if rows.len() as u64 % PROGRESS_STEP == 0 {
                    pb.set_position(rows.len() as u64);
                }
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        debug!("Read {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg} [{elapsed_precise}] {pos} rows")
    {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
