//! Output formatting module for ecomdash
//!
//! This module provides formatters for printing aggregation tables from the
//! command line:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! # Examples
//!
//! ```
//! use ecomdash::output::get_formatter;
//! use ecomdash_core::aggregation_types::{DailyOrders, Totals};
//! use ecomdash_core::DailyDate;
//! use chrono::NaiveDate;
//!
//! let daily = vec![DailyOrders {
//!     date: DailyDate::new(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()),
//!     order_count: 3,
//!     revenue: 150.0,
//! }];
//! let totals = Totals::from_daily(&daily);
//!
//! let formatter = get_formatter(true);
//! let output = formatter.format_daily(&daily, &totals);
//! assert!(output.contains("\"order_count\": 3"));
//! ```

use colored::*;
use ecomdash_core::aggregation_types::{
    CategoryReview, CustomerCount, CustomerDimension, DailyOrders, MonthlySpend, ProductSales,
    Totals,
};
use prettytable::{Row, Table, format, row};
use serde_json::json;

/// Trait for output formatters
///
/// One method per aggregation view. Implementations decide the rendering;
/// the data passed in is already filtered, ranked, and truncated.
pub trait OutputFormatter {
    /// Format the daily orders series with its totals
    fn format_daily(&self, data: &[DailyOrders], totals: &Totals) -> String;

    /// Format items sold per category
    fn format_products(&self, data: &[ProductSales]) -> String;

    /// Format spend per month
    fn format_spend(&self, data: &[MonthlySpend]) -> String;

    /// Format mean review score per category
    fn format_reviews(&self, data: &[CategoryReview]) -> String;

    /// Format distinct customers per value of one dimension
    fn format_customers(&self, dimension: CustomerDimension, data: &[CustomerCount]) -> String;
}

/// Format a number with thousands separators
///
/// ```
/// use ecomdash::output::format_number;
///
/// assert_eq!(format_number(1234567), "1,234,567");
/// ```
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();

    for (count, ch) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }

    result.chars().rev().collect()
}

/// Format an amount of Brazilian reais, e.g. `R$ 1,234.56`
///
/// ```
/// use ecomdash::output::format_currency;
///
/// assert_eq!(format_currency(1234.5), "R$ 1,234.50");
/// ```
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {}.{:02}", format_number(cents / 100), cents % 100)
}

/// Table formatter for human-readable output
///
/// Produces ASCII tables suitable for terminal display, with a totals row
/// where the view has one.
pub struct TableFormatter {
    /// Whether to colour headline figures (respects NO_COLOR)
    pub colored_output: bool,
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            colored_output: std::env::var("NO_COLOR").is_err(),
        }
    }

    fn new_table(titles: Row) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(titles);
        table
    }

    fn headline(&self, label: &str, value: String) -> String {
        if self.colored_output {
            format!("{} {}", label.bold(), value.green().bold())
        } else {
            format!("{label} {value}")
        }
    }
}

impl OutputFormatter for TableFormatter {
    fn format_daily(&self, data: &[DailyOrders], totals: &Totals) -> String {
        let mut table = Self::new_table(row![b -> "Date", b -> "Orders", b -> "Revenue"]);
        for day in data {
            table.add_row(row![
                day.date.format("%Y-%m-%d"),
                r -> format_number(day.order_count),
                r -> format_currency(day.revenue)
            ]);
        }
        table.add_row(row![
            b -> "TOTAL",
            br -> format_number(totals.total_orders),
            br -> format_currency(totals.total_revenue)
        ]);

        format!(
            "{}\n{}\n\n{}",
            self.headline("Total Orders:", format_number(totals.total_orders)),
            self.headline("Total Revenue:", format_currency(totals.total_revenue)),
            table
        )
    }

    fn format_products(&self, data: &[ProductSales]) -> String {
        let mut table = Self::new_table(row![b -> "Category", b -> "Items Sold"]);
        for sales in data {
            table.add_row(row![sales.category, r -> format_number(sales.items_sold)]);
        }
        table.to_string()
    }

    fn format_spend(&self, data: &[MonthlySpend]) -> String {
        let mut table = Self::new_table(row![b -> "Month", b -> "Total Spend"]);
        let mut total = 0.0;
        for month in data {
            total += month.total_spend;
            table.add_row(row![month.month, r -> format_currency(month.total_spend)]);
        }
        table.add_row(row![b -> "TOTAL", br -> format_currency(total)]);
        table.to_string()
    }

    fn format_reviews(&self, data: &[CategoryReview]) -> String {
        let mut table = Self::new_table(row![b -> "Category", b -> "Review Score"]);
        for review in data {
            table.add_row(row![review.category, r -> format!("{:.1}", review.review_score)]);
        }
        table.to_string()
    }

    fn format_customers(&self, dimension: CustomerDimension, data: &[CustomerCount]) -> String {
        let mut table = Self::new_table(row![b -> dimension.header(), b -> "Customers"]);
        for count in data {
            table.add_row(row![count.value, r -> format_number(count.customer_count)]);
        }
        table.to_string()
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_daily(&self, data: &[DailyOrders], totals: &Totals) -> String {
        let output = json!({
            "daily": data.iter().map(|d| json!({
                "date": d.date.format("%Y-%m-%d"),
                "order_count": d.order_count,
                "revenue": d.revenue,
            })).collect::<Vec<_>>(),
            "totals": {
                "total_orders": totals.total_orders,
                "total_revenue": totals.total_revenue,
            }
        });

        serde_json::to_string_pretty(&output).unwrap_or_default()
    }

    fn format_products(&self, data: &[ProductSales]) -> String {
        let output = json!({
            "products": data.iter().map(|p| json!({
                "category": p.category.as_str(),
                "items_sold": p.items_sold,
            })).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&output).unwrap_or_default()
    }

    fn format_spend(&self, data: &[MonthlySpend]) -> String {
        let output = json!({
            "monthly_spend": data.iter().map(|m| json!({
                "month": m.month,
                "total_spend": m.total_spend,
            })).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&output).unwrap_or_default()
    }

    fn format_reviews(&self, data: &[CategoryReview]) -> String {
        let output = json!({
            "reviews": data.iter().map(|r| json!({
                "category": r.category.as_str(),
                "review_score": r.review_score,
            })).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&output).unwrap_or_default()
    }

    fn format_customers(&self, dimension: CustomerDimension, data: &[CustomerCount]) -> String {
        let output = json!({
            "dimension": dimension.to_string(),
            "customers": data.iter().map(|c| json!({
                "value": c.value,
                "customer_count": c.customer_count,
            })).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&output).unwrap_or_default()
    }
}

/// Get the appropriate formatter based on output format
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new())
    }
}
