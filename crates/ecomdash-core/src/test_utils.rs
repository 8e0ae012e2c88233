//! Shared test utilities for unit tests
//!
//! Integration tests in the root crate keep their own helpers in
//! `tests/common/mod.rs`, since `#[cfg(test)]` items are not visible there.

use crate::types::{TransactionRecord, parse_timestamp};
use chrono::NaiveDate;

/// Build a calendar date, panicking on invalid input
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Record for order `order_id` purchased at `timestamp` by customer `c-<order_id>`
pub fn record_at(order_id: &str, timestamp: &str) -> TransactionRecord {
    TransactionRecord::new(
        order_id,
        format!("c-{order_id}"),
        parse_timestamp(timestamp).unwrap(),
    )
}
