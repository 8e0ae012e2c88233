//! Date-range filtering for transaction records
//!
//! The dashboard is always viewed through an inclusive calendar-day range.
//! A [`DateRange`] can only be constructed with `start <= end`, so code that
//! holds one never has to re-check the ordering before aggregating.
//!
//! # Examples
//!
//! ```
//! use ecomdash_core::filters::DateRange;
//! use chrono::NaiveDate;
//!
//! let range = DateRange::new(
//!     NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2018, 1, 31).unwrap(),
//! )
//! .unwrap();
//! assert_eq!(range.num_days(), 31);
//!
//! // A reversed range is rejected
//! assert!(DateRange::new(range.end(), range.start()).is_err());
//! ```

use crate::error::{DashError, Result};
use crate::types::TransactionRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inclusive calendar-day range with `start <= end`
///
/// Deserialization goes through [`DateRange::new`], so a reversed range is
/// rejected there too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

/// Unvalidated wire form of [`DateRange`]
#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = DashError;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Create a validated range
    ///
    /// # Errors
    ///
    /// Returns [`DashError::InvalidDateRange`] when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range covering a single day
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Smallest range covering every record's purchase day
    ///
    /// Returns `None` for an empty slice.
    pub fn covering(records: &[TransactionRecord]) -> Option<Self> {
        let mut dates = records.iter().map(|r| r.purchased_at.date());
        let first = dates.next()?;
        let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self { start, end })
    }

    /// First day (inclusive)
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day (inclusive)
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days in the range
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Whether a calendar day falls inside the range
    pub fn contains(&self, date: &NaiveDate) -> bool {
        *date >= self.start && *date <= self.end
    }

    /// Whether a record's purchase day falls inside the range
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.contains(&record.purchased_at.date())
    }

    /// Copy out the records purchased within the range, preserving order
    pub fn apply(&self, records: &[TransactionRecord]) -> Vec<TransactionRecord> {
        let filtered: Vec<TransactionRecord> = records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();
        debug!(
            "Filtered {} of {} records to {}..={}",
            filtered.len(),
            records.len(),
            self.start,
            self.end
        );
        filtered
    }
}

/// Resolve optional user-supplied bounds against the dataset bounds
///
/// Missing ends default to the matching end of `bounds`, mirroring the date
/// pickers which start at the dataset minimum and maximum. Given ends are
/// not clamped to `bounds`: a range reaching past the data simply selects
/// the rows it overlaps, and one entirely outside selects nothing.
///
/// # Errors
///
/// Returns [`DashError::InvalidDateRange`] when the resolved start is after
/// the resolved end.
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    bounds: &DateRange,
) -> Result<DateRange> {
    DateRange::new(
        start.unwrap_or(bounds.start),
        end.unwrap_or(bounds.end),
    )
}
