//! Common test utilities and helpers for ecomdash tests
//!
//! This module provides a builder for transaction rows and a fixture writer
//! that lays out the two CSV files the loader expects in a temporary
//! directory.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use ecomdash::data_loader::{DataLoader, Dataset, GEO_FILE, ORDERS_FILE};
use ecomdash_core::TransactionRecord;
use std::fs;
use tempfile::TempDir;

/// Header of the transaction file, in the column order of the cleaned dataset
pub const ORDERS_HEADER: &str = "order_id,customer_id,order_purchase_date,order_item_id,price,\
product_category_name_english,payment_type,payment_value,review_score,customer_city,\
customer_state,geolocation_lat,geolocation_lng";

/// Header of the geolocation file
pub const GEO_HEADER: &str = "geolocation_lat,geolocation_lng,customer_count";

/// Common test categories
pub const TEST_CATEGORIES: &[&str] = &[
    "bed_bath_table",
    "health_beauty",
    "sports_leisure",
    "computers_accessories",
    "furniture_decor",
    "housewares",
    "watches_gifts",
];

/// Common test locations as (city, state)
pub const TEST_LOCATIONS: &[(&str, &str)] = &[
    ("sao paulo", "SP"),
    ("rio de janeiro", "RJ"),
    ("belo horizonte", "MG"),
    ("curitiba", "PR"),
];

/// Calendar date shorthand
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Timestamp shorthand
pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    date(year, month, day).and_hms_opt(hour, 0, 0).unwrap()
}

/// Builder for creating test transaction rows
pub struct RowBuilder {
    order_id: String,
    customer_id: String,
    purchased_at: NaiveDateTime,
    order_item_id: u32,
    price: f64,
    category: String,
    payment_type: String,
    payment_value: f64,
    review_score: Option<f64>,
    city: String,
    state: String,
}

impl RowBuilder {
    /// Create a new builder with default values
    pub fn new(order_id: &str) -> Self {
        Self {
            order_id: order_id.to_string(),
            customer_id: format!("cust-{order_id}"),
            purchased_at: at(2018, 1, 1, 10),
            order_item_id: 1,
            price: 10.0,
            category: TEST_CATEGORIES[0].to_string(),
            payment_type: "credit_card".to_string(),
            payment_value: 10.0,
            review_score: Some(5.0),
            city: TEST_LOCATIONS[0].0.to_string(),
            state: TEST_LOCATIONS[0].1.to_string(),
        }
    }

    pub fn customer(mut self, customer_id: &str) -> Self {
        self.customer_id = customer_id.to_string();
        self
    }

    pub fn at(mut self, purchased_at: NaiveDateTime) -> Self {
        self.purchased_at = purchased_at;
        self
    }

    pub fn item(mut self, order_item_id: u32) -> Self {
        self.order_item_id = order_item_id;
        self
    }

    /// Set the item price and a matching payment value
    pub fn price(mut self, price: f64) -> Self {
        self.price = price;
        self.payment_value = price;
        self
    }

    pub fn payment(mut self, payment_type: &str, value: f64) -> Self {
        self.payment_type = payment_type.to_string();
        self.payment_value = value;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn review(mut self, score: Option<f64>) -> Self {
        self.review_score = score;
        self
    }

    pub fn location(mut self, city: &str, state: &str) -> Self {
        self.city = city.to_string();
        self.state = state.to_string();
        self
    }

    /// The row as a CSV line
    pub fn to_csv(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},-23.55,-46.63",
            self.order_id,
            self.customer_id,
            self.purchased_at.format("%Y-%m-%d %H:%M:%S"),
            self.order_item_id,
            self.price,
            self.category,
            self.payment_type,
            self.payment_value,
            self.review_score.map(|s| s.to_string()).unwrap_or_default(),
            self.city,
            self.state,
        )
    }

    /// The row as an in-memory record
    pub fn build(&self) -> TransactionRecord {
        let record = TransactionRecord::new(&self.order_id, &self.customer_id, self.purchased_at)
            .with_order_item_id(self.order_item_id)
            .with_price(self.price)
            .with_category(&self.category)
            .with_payment(&self.payment_type, self.payment_value)
            .with_location(&self.city, &self.state);
        match self.review_score {
            Some(score) => record.with_review_score(score),
            None => record,
        }
    }
}

/// A temporary data directory holding both CSV files
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    /// Write the given rows plus a small geolocation table
    pub fn new(rows: &[RowBuilder]) -> Self {
        let geo = [(-23.55, -46.63, 120), (-22.90, -43.20, 45), (-19.92, -43.94, 8)];
        Self::with_geo(rows, &geo)
    }

    pub fn with_geo(rows: &[RowBuilder], geo: &[(f64, f64, u64)]) -> Self {
        let dir = TempDir::new().unwrap();

        let mut orders = String::from(ORDERS_HEADER);
        for row in rows {
            orders.push('\n');
            orders.push_str(&row.to_csv());
        }
        orders.push('\n');
        fs::write(dir.path().join(ORDERS_FILE), orders).unwrap();

        let mut points = String::from(GEO_HEADER);
        for (lat, lng, count) in geo {
            points.push_str(&format!("\n{lat},{lng},{count}"));
        }
        points.push('\n');
        fs::write(dir.path().join(GEO_FILE), points).unwrap();

        Self { dir }
    }

    pub fn loader(&self) -> DataLoader {
        DataLoader::new(self.dir.path())
    }

    pub fn load(&self) -> Dataset {
        self.loader().load().unwrap()
    }
}

/// A month of realistic rows: several orders a day, multi-item orders,
/// a spread of categories, payments, reviews, and locations
pub fn sample_rows() -> Vec<RowBuilder> {
    let mut rows = Vec::new();
    for day in 1..=28u32 {
        if day % 7 == 0 {
            // Leave a gap day every week
            continue;
        }
        for n in 0..(day % 4 + 1) {
            let order = format!("o-{day:02}-{n}");
            let category = TEST_CATEGORIES[((day + n) as usize) % TEST_CATEGORIES.len()];
            let (city, state) = TEST_LOCATIONS[(n as usize) % TEST_LOCATIONS.len()];
            let items = if n == 0 { 2 } else { 1 };
            for item in 1..=items {
                rows.push(
                    RowBuilder::new(&order)
                        .customer(&format!("cust-{}", (day + n) % 11))
                        .at(at(2018, 3, day, 8 + n))
                        .item(item)
                        .price(10.0 * f64::from(n + 1))
                        .category(category)
                        .payment(if n % 2 == 0 { "credit_card" } else { "boleto" }, 25.0)
                        .review(if day % 5 == 0 { None } else { Some(f64::from(day % 5)) })
                        .location(city, state),
                );
            }
        }
    }
    rows
}
