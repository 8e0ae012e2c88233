//! Aggregation result tables for ecomdash
//!
//! Pure data structures produced by the aggregation functions and consumed by
//! the formatters, the chart renderer, and the JSON API.

use crate::filters::DateRange;
use crate::types::{CategoryName, DailyDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Orders and revenue for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOrders {
    /// Calendar day
    pub date: DailyDate,
    /// Number of distinct orders placed that day
    pub order_count: u64,
    /// Sum of item prices
    pub revenue: f64,
}

/// Items sold for one product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSales {
    /// Product category
    pub category: CategoryName,
    /// Sum of `order_item_id` over the category's rows
    pub items_sold: u64,
}

/// Customer spend for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySpend {
    /// Month label, e.g. "October 2017"
    pub month: String,
    /// Sum of payment values, rounded to a whole number
    pub total_spend: f64,
}

/// Mean review score for one product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReview {
    /// Product category
    pub category: CategoryName,
    /// Mean review score rounded to one decimal
    pub review_score: f64,
}

/// Distinct customers for one value of a demographic dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerCount {
    /// Dimension value (payment type, city, or state)
    pub value: String,
    /// Number of distinct customers
    pub customer_count: u64,
}

/// Demographic dimension customers can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerDimension {
    /// Payment method
    PaymentType,
    /// Customer city
    City,
    /// Customer state
    State,
}

impl CustomerDimension {
    /// All dimensions in dashboard order
    pub const ALL: [CustomerDimension; 3] = [Self::PaymentType, Self::City, Self::State];

    /// Column header used in tables
    pub fn header(&self) -> &'static str {
        match self {
            Self::PaymentType => "Payment Type",
            Self::City => "City",
            Self::State => "State",
        }
    }
}

impl fmt::Display for CustomerDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PaymentType => write!(f, "payment_type"),
            Self::City => write!(f, "city"),
            Self::State => write!(f, "state"),
        }
    }
}

/// Summary metrics shown above the daily orders chart
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of daily order counts
    pub total_orders: u64,
    /// Sum of daily revenue
    pub total_revenue: f64,
}

impl Totals {
    pub fn from_daily(daily: &[DailyOrders]) -> Self {
        let mut totals = Self::default();
        for day in daily {
            totals.total_orders += day.order_count;
            totals.total_revenue += day.revenue;
        }
        totals
    }
}

/// Every aggregate the dashboard displays for one date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Range the report was computed for
    pub range: DateRange,
    /// Summary metrics
    pub totals: Totals,
    /// Orders and revenue per day
    pub daily_orders: Vec<DailyOrders>,
    /// Items sold per category, descending
    pub product_sales: Vec<ProductSales>,
    /// Spend per month
    pub monthly_spend: Vec<MonthlySpend>,
    /// Mean review score per category, descending
    pub category_reviews: Vec<CategoryReview>,
    /// Distinct customers per payment type, descending
    pub customers_by_payment_type: Vec<CustomerCount>,
    /// Distinct customers per city, descending
    pub customers_by_city: Vec<CustomerCount>,
    /// Distinct customers per state, descending
    pub customers_by_state: Vec<CustomerCount>,
}

impl DashboardReport {
    /// Customer counts for one dimension
    pub fn customers_by(&self, dimension: CustomerDimension) -> &[CustomerCount] {
        match dimension {
            CustomerDimension::PaymentType => &self.customers_by_payment_type,
            CustomerDimension::City => &self.customers_by_city,
            CustomerDimension::State => &self.customers_by_state,
        }
    }
}
