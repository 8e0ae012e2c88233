//! Core domain types for ecomdash
//!
//! This module contains the transaction record loaded from the cleaned
//! dataset, the geolocation density point, and the strongly-typed wrappers
//! used as grouping keys by the aggregations.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Strongly-typed order identifier
///
/// # Examples
/// ```
/// use ecomdash_core::types::OrderId;
///
/// let order = OrderId::new("e481f51cbdc54678b7cc49136f2d6af7");
/// assert_eq!(order.as_str(), "e481f51cbdc54678b7cc49136f2d6af7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Create a new OrderId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly-typed customer identifier
///
/// Customer counts are always distinct counts over this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Create a new CustomerId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Product category name (English translation from the cleaned dataset)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a new CategoryName
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Calendar day used as the daily grouping key
///
/// # Examples
/// ```
/// use ecomdash_core::types::DailyDate;
/// use chrono::NaiveDate;
///
/// let daily = DailyDate::new(NaiveDate::from_ymd_opt(2017, 11, 24).unwrap());
/// assert_eq!(daily.format("%Y-%m-%d"), "2017-11-24");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DailyDate(NaiveDate);

impl DailyDate {
    /// Create a new DailyDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

/// Calendar month used as the monthly grouping key
///
/// Ordered chronologically, so it can key a `BTreeMap` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    /// Calendar year
    pub year: i32,
    /// Month number, 1-12
    pub month: u32,
}

impl YearMonth {
    /// Month containing the given date
    pub fn from_date(date: &NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the month
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// The following month
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Display label such as "October 2017"
    ///
    /// # Examples
    /// ```
    /// use ecomdash_core::types::YearMonth;
    ///
    /// let month = YearMonth { year: 2017, month: 10 };
    /// assert_eq!(month.label(), "October 2017");
    /// ```
    pub fn label(&self) -> String {
        self.first_day()
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{:04}-{:02}", self.year, self.month))
    }
}

/// One denormalized row of the cleaned transaction table
///
/// Joins order, order-item, customer, payment, review, and geolocation
/// facts. Only the purchase timestamp and the two identifiers are required;
/// every other column may be empty in the source file, in which case the
/// row is left out of the groupings that need that column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionRecord {
    /// Order identifier
    pub order_id: OrderId,
    /// Customer identifier
    pub customer_id: CustomerId,
    /// Purchase timestamp
    #[serde(
        rename = "order_purchase_date",
        deserialize_with = "deserialize_timestamp"
    )]
    pub purchased_at: NaiveDateTime,
    /// Item sequence number within the order, summed as item quantity
    #[serde(default, deserialize_with = "deserialize_lenient_count")]
    pub order_item_id: Option<u32>,
    /// Item price
    #[serde(default)]
    pub price: Option<f64>,
    /// Product category
    #[serde(rename = "product_category_name_english", default)]
    pub category: Option<CategoryName>,
    /// Payment method (credit_card, boleto, voucher, debit_card)
    #[serde(default)]
    pub payment_type: Option<String>,
    /// Payment value
    #[serde(default)]
    pub payment_value: Option<f64>,
    /// Review score, 1-5
    #[serde(default)]
    pub review_score: Option<f64>,
    /// Customer city
    #[serde(default)]
    pub customer_city: Option<String>,
    /// Customer state (two-letter code)
    #[serde(default)]
    pub customer_state: Option<String>,
    /// Latitude
    #[serde(rename = "geolocation_lat", default)]
    pub latitude: Option<f64>,
    /// Longitude
    #[serde(rename = "geolocation_lng", default)]
    pub longitude: Option<f64>,
}

impl TransactionRecord {
    /// Create a record with only the required columns set
    ///
    /// # Examples
    /// ```
    /// use ecomdash_core::types::TransactionRecord;
    /// use chrono::NaiveDate;
    ///
    /// let ts = NaiveDate::from_ymd_opt(2018, 1, 5).unwrap().and_hms_opt(9, 0, 0).unwrap();
    /// let record = TransactionRecord::new("o1", "c1", ts)
    ///     .with_price(49.9)
    ///     .with_category("bed_bath_table");
    /// assert_eq!(record.purchase_date().format("%Y-%m-%d"), "2018-01-05");
    /// ```
    pub fn new(
        order_id: impl Into<String>,
        customer_id: impl Into<String>,
        purchased_at: NaiveDateTime,
    ) -> Self {
        Self {
            order_id: OrderId::new(order_id),
            customer_id: CustomerId::new(customer_id),
            purchased_at,
            order_item_id: None,
            price: None,
            category: None,
            payment_type: None,
            payment_value: None,
            review_score: None,
            customer_city: None,
            customer_state: None,
            latitude: None,
            longitude: None,
        }
    }

    /// Set the item sequence number
    pub fn with_order_item_id(mut self, order_item_id: u32) -> Self {
        self.order_item_id = Some(order_item_id);
        self
    }

    /// Set the item price
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the product category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(CategoryName::new(category));
        self
    }

    /// Set the payment type and value
    pub fn with_payment(mut self, payment_type: impl Into<String>, value: f64) -> Self {
        self.payment_type = Some(payment_type.into());
        self.payment_value = Some(value);
        self
    }

    /// Set the review score
    pub fn with_review_score(mut self, score: f64) -> Self {
        self.review_score = Some(score);
        self
    }

    /// Set the customer city and state
    pub fn with_location(mut self, city: impl Into<String>, state: impl Into<String>) -> Self {
        self.customer_city = Some(city.into());
        self.customer_state = Some(state.into());
        self
    }

    /// Calendar day of the purchase
    pub fn purchase_date(&self) -> DailyDate {
        DailyDate::new(self.purchased_at.date())
    }
}

/// One row of the geolocation density table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoDensityPoint {
    /// Latitude
    #[serde(rename = "geolocation_lat")]
    pub latitude: f64,
    /// Longitude
    #[serde(rename = "geolocation_lng")]
    pub longitude: f64,
    /// Number of customers at this location
    pub customer_count: u64,
}

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a purchase timestamp, accepting a bare date as midnight
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid purchase timestamp '{raw}'")))
}

// pandas writes integer columns containing NaN as floats ("1.0")
fn deserialize_lenient_count<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            if let Ok(n) = value.parse::<u32>() {
                return Ok(Some(n));
            }
            match value.parse::<f64>() {
                Ok(f) if f.is_nan() => Ok(None),
                Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(Some(f as u32)),
                _ => Err(serde::de::Error::custom(format!(
                    "invalid order_item_id '{value}'"
                ))),
            }
        }
    }
}
