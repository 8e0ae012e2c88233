//! Aggregation module for summarizing transactions
//!
//! Every function here takes an already date-filtered slice of
//! [`TransactionRecord`]s and returns a new, owned table. Grouping goes
//! through a `BTreeMap`, so groups come out in key order, and rankings use a
//! stable sort on top of that: ties on the ranked column keep their key
//! order.
//!
//! Rows missing the column a view groups by (no category, no city, and so
//! on) are left out of that view only. Missing measures (price, payment
//! value) contribute nothing to a sum.
//!
//! # Examples
//!
//! ```
//! use ecomdash::aggregation::Aggregator;
//! use ecomdash_core::TransactionRecord;
//! use chrono::NaiveDate;
//!
//! let ts = NaiveDate::from_ymd_opt(2018, 1, 5).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! let records = vec![
//!     TransactionRecord::new("o1", "c1", ts).with_price(100.0),
//!     TransactionRecord::new("o2", "c2", ts).with_price(50.0),
//! ];
//!
//! let daily = Aggregator::daily_orders(&records);
//! assert_eq!(daily.len(), 1);
//! assert_eq!(daily[0].order_count, 2);
//! assert_eq!(daily[0].revenue, 150.0);
//! ```

use crate::data_loader::Dataset;
use ecomdash_core::aggregation_types::{
    CategoryReview, CustomerCount, CustomerDimension, DailyOrders, DashboardReport, MonthlySpend,
    ProductSales, Totals,
};
use ecomdash_core::types::YearMonth;
use ecomdash_core::{CategoryName, CustomerId, DailyDate, DateRange, OrderId, TransactionRecord};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Accumulator for daily aggregation
#[derive(Default)]
struct DailyAccumulator<'a> {
    orders: HashSet<&'a OrderId>,
    revenue: f64,
}

impl<'a> DailyAccumulator<'a> {
    fn add_record(&mut self, record: &'a TransactionRecord) {
        self.orders.insert(&record.order_id);
        self.revenue += record.price.unwrap_or(0.0);
    }

    fn into_daily_orders(self, date: DailyDate) -> DailyOrders {
        DailyOrders {
            date,
            order_count: self.orders.len() as u64,
            revenue: self.revenue,
        }
    }
}

/// Running mean of review scores
#[derive(Default)]
struct ReviewAccumulator {
    sum: f64,
    count: u64,
}

impl ReviewAccumulator {
    fn add_score(&mut self, score: f64) {
        self.sum += score;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Aggregation engine
///
/// Stateless; every view is an associated function so callers can run a
/// single view without building a full report.
pub struct Aggregator;

impl Aggregator {
    /// Orders and revenue per calendar day
    ///
    /// Counts distinct order ids and sums item prices. Days between the
    /// first and last day present with no rows are emitted as zero rows, so
    /// the result is a continuous ascending series.
    pub fn daily_orders(records: &[TransactionRecord]) -> Vec<DailyOrders> {
        let mut daily_map: BTreeMap<DailyDate, DailyAccumulator> = BTreeMap::new();
        for record in records {
            daily_map
                .entry(record.purchase_date())
                .or_default()
                .add_record(record);
        }

        let (Some(first), Some(last)) = (
            daily_map.keys().next().copied(),
            daily_map.keys().next_back().copied(),
        ) else {
            return Vec::new();
        };

        let mut daily = Vec::with_capacity(daily_map.len());
        for date in first.inner().iter_days().take_while(|d| d <= last.inner()) {
            let date = DailyDate::new(date);
            let acc = daily_map.remove(&date).unwrap_or_default();
            daily.push(acc.into_daily_orders(date));
        }
        daily
    }

    /// Items sold per product category, most sold first
    ///
    /// Sums `order_item_id` over each category's rows.
    pub fn product_sales(records: &[TransactionRecord]) -> Vec<ProductSales> {
        let mut sales_map: BTreeMap<&CategoryName, u64> = BTreeMap::new();
        for record in records {
            if let Some(category) = &record.category {
                *sales_map.entry(category).or_insert(0) +=
                    u64::from(record.order_item_id.unwrap_or(0));
            }
        }

        let mut sales: Vec<ProductSales> = sales_map
            .into_iter()
            .map(|(category, items_sold)| ProductSales {
                category: category.clone(),
                items_sold,
            })
            .collect();
        sales.sort_by(|a, b| b.items_sold.cmp(&a.items_sold));
        sales
    }

    /// Product sales re-ranked least sold first
    ///
    /// Ties keep category order.
    pub fn least_sold(sales: &[ProductSales]) -> Vec<ProductSales> {
        let mut ranked = sales.to_vec();
        ranked.sort_by(|a, b| {
            a.items_sold
                .cmp(&b.items_sold)
                .then_with(|| a.category.cmp(&b.category))
        });
        ranked
    }

    /// Payment value per calendar month
    ///
    /// Totals are rounded to whole units, half to even. Months without rows
    /// between the first and last month present are emitted with zero spend.
    pub fn monthly_spend(records: &[TransactionRecord]) -> Vec<MonthlySpend> {
        let mut monthly_map: BTreeMap<YearMonth, f64> = BTreeMap::new();
        for record in records {
            let month = YearMonth::from_date(&record.purchased_at.date());
            *monthly_map.entry(month).or_insert(0.0) += record.payment_value.unwrap_or(0.0);
        }

        let (Some(first), Some(last)) = (
            monthly_map.keys().next().copied(),
            monthly_map.keys().next_back().copied(),
        ) else {
            return Vec::new();
        };

        let mut monthly = Vec::new();
        let mut month = first;
        while month <= last {
            let total = monthly_map.get(&month).copied().unwrap_or(0.0);
            monthly.push(MonthlySpend {
                month: month.label(),
                total_spend: total.round_ties_even(),
            });
            month = month.succ();
        }
        monthly
    }

    /// Mean review score per product category, highest first
    ///
    /// Ranking uses the unrounded mean, ties broken by category; the reported
    /// score is then rounded to one decimal, half to even. Categories without
    /// any scored row are omitted.
    pub fn category_reviews(records: &[TransactionRecord]) -> Vec<CategoryReview> {
        let mut review_map: BTreeMap<&CategoryName, ReviewAccumulator> = BTreeMap::new();
        for record in records {
            if let (Some(category), Some(score)) = (&record.category, record.review_score) {
                review_map.entry(category).or_default().add_score(score);
            }
        }

        let mut means: Vec<(&CategoryName, f64)> = review_map
            .into_iter()
            .filter_map(|(category, acc)| acc.mean().map(|mean| (category, mean)))
            .collect();
        means.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        means
            .into_iter()
            .map(|(category, mean)| CategoryReview {
                category: category.clone(),
                review_score: round_to_tenth(mean),
            })
            .collect()
    }

    /// Distinct customers per value of `dimension`, largest first
    pub fn customers_by(
        records: &[TransactionRecord],
        dimension: CustomerDimension,
    ) -> Vec<CustomerCount> {
        let mut customer_map: BTreeMap<&str, HashSet<&CustomerId>> = BTreeMap::new();
        for record in records {
            let value = match dimension {
                CustomerDimension::PaymentType => record.payment_type.as_deref(),
                CustomerDimension::City => record.customer_city.as_deref(),
                CustomerDimension::State => record.customer_state.as_deref(),
            };
            if let Some(value) = value {
                customer_map
                    .entry(value)
                    .or_default()
                    .insert(&record.customer_id);
            }
        }

        let mut counts: Vec<CustomerCount> = customer_map
            .into_iter()
            .map(|(value, customers)| CustomerCount {
                value: value.to_string(),
                customer_count: customers.len() as u64,
            })
            .collect();
        counts.sort_by(|a, b| b.customer_count.cmp(&a.customer_count));
        counts
    }

    /// Filter `dataset` to `range` and compute every view
    pub fn report(dataset: &Dataset, range: DateRange) -> DashboardReport {
        let filtered = range.apply(&dataset.transactions);
        let report = Self::report_from_filtered(&filtered, range);
        debug!(
            "Report for {}..={}: {} orders over {} days",
            range.start(),
            range.end(),
            report.totals.total_orders,
            report.daily_orders.len()
        );
        report
    }

    /// Compute every view over records already restricted to `range`
    pub fn report_from_filtered(records: &[TransactionRecord], range: DateRange) -> DashboardReport {
        let daily_orders = Self::daily_orders(records);
        let totals = Totals::from_daily(&daily_orders);
        DashboardReport {
            range,
            totals,
            daily_orders,
            product_sales: Self::product_sales(records),
            monthly_spend: Self::monthly_spend(records),
            category_reviews: Self::category_reviews(records),
            customers_by_payment_type: Self::customers_by(records, CustomerDimension::PaymentType),
            customers_by_city: Self::customers_by(records, CustomerDimension::City),
            customers_by_state: Self::customers_by(records, CustomerDimension::State),
        }
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_accumulator_counts_distinct_orders() {
        let a = TransactionRecord::new("o1", "c1", ts("2018-01-01 10:00:00")).with_price(10.0);
        let b = TransactionRecord::new("o1", "c1", ts("2018-01-01 10:00:00")).with_price(5.0);
        let c = TransactionRecord::new("o2", "c2", ts("2018-01-01 11:00:00"));

        let mut acc = DailyAccumulator::default();
        acc.add_record(&a);
        acc.add_record(&b);
        acc.add_record(&c);

        let row = acc.into_daily_orders(DailyDate::new(date(2018, 1, 1)));
        assert_eq!(row.order_count, 2);
        assert_eq!(row.revenue, 15.0);
    }

    #[test]
    fn test_single_day_three_orders() {
        let records = vec![
            TransactionRecord::new("o1", "c1", ts("2018-03-10 08:00:00")).with_price(50.0),
            TransactionRecord::new("o2", "c2", ts("2018-03-10 12:30:00")).with_price(70.0),
            TransactionRecord::new("o3", "c3", ts("2018-03-10 23:59:59")).with_price(30.0),
        ];
        let daily = Aggregator::daily_orders(&records);
        assert_eq!(
            daily,
            vec![DailyOrders {
                date: DailyDate::new(date(2018, 3, 10)),
                order_count: 3,
                revenue: 150.0,
            }]
        );
    }

    #[test]
    fn test_daily_fills_gap_days() {
        let records = vec![
            TransactionRecord::new("o1", "c1", ts("2018-01-01 10:00:00")).with_price(10.0),
            TransactionRecord::new("o2", "c2", ts("2018-01-04 10:00:00")).with_price(20.0),
        ];
        let daily = Aggregator::daily_orders(&records);
        assert_eq!(daily.len(), 4);
        assert_eq!(daily[1].order_count, 0);
        assert_eq!(daily[2].revenue, 0.0);
        assert_eq!(daily[3].date, DailyDate::new(date(2018, 1, 4)));
    }

    #[test]
    fn test_empty_input_gives_empty_tables() {
        assert!(Aggregator::daily_orders(&[]).is_empty());
        assert!(Aggregator::product_sales(&[]).is_empty());
        assert!(Aggregator::monthly_spend(&[]).is_empty());
        assert!(Aggregator::category_reviews(&[]).is_empty());
        assert!(Aggregator::customers_by(&[], CustomerDimension::City).is_empty());
    }

    #[test]
    fn test_product_sales_sums_item_ids() {
        let t = ts("2018-01-01 10:00:00");
        let records = vec![
            TransactionRecord::new("o1", "c1", t)
                .with_category("toys")
                .with_order_item_id(1),
            TransactionRecord::new("o1", "c1", t)
                .with_category("toys")
                .with_order_item_id(2),
            TransactionRecord::new("o2", "c2", t)
                .with_category("housewares")
                .with_order_item_id(1),
            TransactionRecord::new("o3", "c3", t).with_order_item_id(9),
        ];
        let sales = Aggregator::product_sales(&records);
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].category.as_str(), "toys");
        assert_eq!(sales[0].items_sold, 3);
        assert_eq!(sales[1].items_sold, 1);
    }

    #[test]
    fn test_ties_break_by_key() {
        let t = ts("2018-01-01 10:00:00");
        let records = vec![
            TransactionRecord::new("o1", "c1", t)
                .with_category("watches_gifts")
                .with_order_item_id(1),
            TransactionRecord::new("o2", "c2", t)
                .with_category("auto")
                .with_order_item_id(1),
        ];
        let sales = Aggregator::product_sales(&records);
        assert_eq!(sales[0].category.as_str(), "auto");

        let worst = Aggregator::least_sold(&sales);
        assert_eq!(worst[0].category.as_str(), "auto");
    }

    #[test]
    fn test_least_sold_ascending() {
        let sales = vec![
            ProductSales {
                category: CategoryName::new("a"),
                items_sold: 9,
            },
            ProductSales {
                category: CategoryName::new("b"),
                items_sold: 4,
            },
            ProductSales {
                category: CategoryName::new("c"),
                items_sold: 1,
            },
        ];
        let counts: Vec<u64> = Aggregator::least_sold(&sales)
            .iter()
            .map(|s| s.items_sold)
            .collect();
        assert_eq!(counts, vec![1, 4, 9]);
    }

    #[test]
    fn test_monthly_spend_labels_and_gaps() {
        let records = vec![
            TransactionRecord::new("o1", "c1", ts("2017-11-24 10:00:00"))
                .with_payment("credit_card", 100.25),
            TransactionRecord::new("o2", "c2", ts("2017-11-25 10:00:00"))
                .with_payment("boleto", 20.0),
            TransactionRecord::new("o3", "c3", ts("2018-01-02 10:00:00"))
                .with_payment("voucher", 2.5),
        ];
        let monthly = Aggregator::monthly_spend(&records);
        let labels: Vec<&str> = monthly.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(labels, vec!["November 2017", "December 2017", "January 2018"]);
        assert_eq!(monthly[0].total_spend, 120.0);
        assert_eq!(monthly[1].total_spend, 0.0);
        // half rounds to even
        assert_eq!(monthly[2].total_spend, 2.0);
    }

    #[test]
    fn test_category_reviews_mean_and_rank() {
        let t = ts("2018-01-01 10:00:00");
        let records = vec![
            TransactionRecord::new("o1", "c1", t)
                .with_category("toys")
                .with_review_score(4.0),
            TransactionRecord::new("o2", "c2", t)
                .with_category("toys")
                .with_review_score(5.0),
            TransactionRecord::new("o3", "c3", t)
                .with_category("toys")
                .with_review_score(5.0),
            TransactionRecord::new("o4", "c4", t)
                .with_category("auto")
                .with_review_score(5.0),
            TransactionRecord::new("o5", "c5", t).with_category("auto"),
            TransactionRecord::new("o6", "c6", t).with_category("unscored"),
        ];
        let reviews = Aggregator::category_reviews(&records);
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].category.as_str(), "auto");
        assert_eq!(reviews[0].review_score, 5.0);
        assert_eq!(reviews[1].review_score, 4.7);
    }

    #[test]
    fn test_category_reviews_rank_before_rounding() {
        let t = ts("2018-01-01 10:00:00");
        let scored = |order: &str, category: &str, score: f64| {
            TransactionRecord::new(order, order, t)
                .with_category(category)
                .with_review_score(score)
        };
        let mut records = Vec::new();
        for (i, score) in [5.0, 5.0, 4.0, 4.0, 3.8].into_iter().enumerate() {
            records.push(scored(&format!("a{i}"), "a_cat", score));
        }
        for (i, score) in [5.0, 5.0, 4.0, 4.0, 4.2].into_iter().enumerate() {
            records.push(scored(&format!("b{i}"), "b_cat", score));
        }

        // 4.44 outranks 4.36 even though both display as 4.4
        let reviews = Aggregator::category_reviews(&records);
        let ranked: Vec<(&str, f64)> = reviews
            .iter()
            .map(|r| (r.category.as_str(), r.review_score))
            .collect();
        assert_eq!(ranked, vec![("b_cat", 4.4), ("a_cat", 4.4)]);
    }

    #[test]
    fn test_customers_by_counts_distinct() {
        let t = ts("2018-01-01 10:00:00");
        let records = vec![
            TransactionRecord::new("o1", "c1", t).with_location("sao paulo", "SP"),
            TransactionRecord::new("o2", "c1", t).with_location("sao paulo", "SP"),
            TransactionRecord::new("o3", "c2", t).with_location("campinas", "SP"),
            TransactionRecord::new("o4", "c3", t).with_location("rio de janeiro", "RJ"),
            TransactionRecord::new("o5", "c4", t),
        ];

        let states = Aggregator::customers_by(&records, CustomerDimension::State);
        assert_eq!(states[0].value, "SP");
        assert_eq!(states[0].customer_count, 2);
        assert_eq!(states[1].customer_count, 1);

        let cities = Aggregator::customers_by(&records, CustomerDimension::City);
        assert_eq!(cities.len(), 3);
        assert!(cities.iter().all(|c| c.customer_count == 1));
        // ties keep alphabetical order
        assert_eq!(cities[0].value, "campinas");
        assert_eq!(cities[2].value, "sao paulo");
    }

    #[test]
    fn test_customers_by_payment_type() {
        let t = ts("2018-01-01 10:00:00");
        let records = vec![
            TransactionRecord::new("o1", "c1", t).with_payment("credit_card", 10.0),
            TransactionRecord::new("o2", "c2", t).with_payment("credit_card", 10.0),
            TransactionRecord::new("o3", "c3", t).with_payment("boleto", 10.0),
        ];
        let payments = Aggregator::customers_by(&records, CustomerDimension::PaymentType);
        assert_eq!(payments[0].value, "credit_card");
        assert_eq!(payments[0].customer_count, 2);
    }

    #[test]
    fn test_report_filters_before_aggregating() {
        let records = vec![
            TransactionRecord::new("o1", "c1", ts("2018-01-01 10:00:00")).with_price(10.0),
            TransactionRecord::new("o2", "c2", ts("2018-01-02 10:00:00")).with_price(20.0),
            TransactionRecord::new("o3", "c3", ts("2018-01-03 10:00:00")).with_price(40.0),
        ];
        let dataset = Dataset::new(records, Vec::new()).unwrap();
        let range = DateRange::new(date(2018, 1, 2), date(2018, 1, 3)).unwrap();

        let report = Aggregator::report(&dataset, range);
        assert_eq!(report.range, range);
        assert_eq!(report.totals.total_orders, 2);
        assert_eq!(report.totals.total_revenue, 60.0);
        assert_eq!(report.daily_orders.len(), 2);
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(4.66), 4.7);
        assert_eq!(round_to_tenth(4.25), 4.2);
        assert_eq!(round_to_tenth(3.0), 3.0);
    }
}
