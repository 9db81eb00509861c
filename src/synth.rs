//! Synthetic source data for the ETL jobs.
//!
//! Produces the three datasets the jobs consume: a customers dimension, a
//! products dimension, and one orders parquet partition per day
//! (`orders_<YYYY-MM-DD>.parquet`), each order fanned out into 1-5 item
//! lines. Generation is deterministic under a fixed seed.

use std::path::PathBuf;
use std::sync::Arc;

use datafusion::arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, RecordBatch, StringArray,
};
use datafusion::arrow::datatypes::{DataType, Field, Schema};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::config::Codec;
use crate::error::Result;
use crate::partition::PartitionKey;
use crate::publish::Publisher;

pub const ORDER_STATUSES: &[&str] = &["shipped", "pending", "cancelled", "new", "other"];
pub const SEGMENTS: &[&str] = &["Premium", "Standard", "Budget", "Enterprise"];
pub const REGIONS: &[&str] = &["North", "South", "East", "West", "Central"];

/// (item id, item name, category, unit price)
const ITEMS: &[(&str, &str, &str, f64)] = &[
    ("ITM001", "Laptop", "Computing", 899.0),
    ("ITM002", "Mouse", "Accessories", 25.0),
    ("ITM003", "Keyboard", "Accessories", 79.0),
    ("ITM004", "Monitor", "Computing", 249.0),
    ("ITM005", "Headphones", "Audio", 129.0),
    ("ITM006", "Webcam", "Accessories", 59.0),
    ("ITM007", "USB Cable", "Accessories", 12.0),
    ("ITM008", "Desk Chair", "Furniture", 189.0),
    ("ITM009", "Desk Lamp", "Furniture", 39.0),
    ("ITM010", "Phone Case", "Mobile", 19.0),
    ("ITM011", "Charger", "Mobile", 29.0),
    ("ITM012", "Speaker", "Audio", 99.0),
    ("ITM013", "Router", "Networking", 119.0),
    ("ITM014", "Hard Drive", "Storage", 89.0),
    ("ITM015", "SSD", "Storage", 139.0),
];

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "Dave", "Eve", "Frank", "Grace", "Henry", "Irene", "Jack", "Kara",
    "Liam", "Mona", "Nate", "Olga", "Paul", "Quinn", "Rosa", "Sam", "Tara", "Umar", "Vera",
    "Wade", "Yuki",
];
const LAST_NAMES: &[&str] = &[
    "Adams", "Baker", "Chen", "Diaz", "Evans", "Fischer", "Garcia", "Hughes", "Ivanov", "Jones",
    "Kim", "Lopez", "Miller", "Novak", "Okafor", "Patel", "Quispe", "Rossi", "Silva", "Tanaka",
    "Usman", "Voss", "Weber", "Zhang",
];

const CUSTOMER_ID_LO: i64 = 1000;
const CUSTOMER_ID_HI: i64 = 9999;

/// Controls dataset size and layout.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Root directory; orders land under `<data_dir>/raw`.
    pub data_dir:           PathBuf,
    /// First order partition, inclusive.
    pub start:              PartitionKey,
    /// Last order partition, inclusive.
    pub end:                PartitionKey,
    /// Rows in the customers dimension.
    pub customers:          usize,
    pub min_orders_per_day: usize,
    pub max_orders_per_day: usize,
    pub codec:              Codec,
    /// Fixed seed for reproducible output; entropy-seeded when absent.
    pub seed:               Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            data_dir:           "data".into(),
            start:              "2025-10-01".parse().expect("valid date"),
            end:                "2025-10-31".parse().expect("valid date"),
            customers:          500,
            min_orders_per_day: 200,
            max_orders_per_day: 500,
            codec:              Codec::default(),
            seed:               None,
        }
    }
}

pub struct Generator {
    config:        GeneratorConfig,
    rng:           SmallRng,
    next_order_id: i64,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self { config, rng, next_order_id: 100_000 }
    }

    /// Write all three datasets. Returns the files created, dimensions
    /// first.
    pub fn generate_all(&mut self) -> Result<Vec<PathBuf>> {
        let mut files = vec![self.generate_customers()?, self.generate_products()?];
        files.extend(self.generate_orders()?);
        info!(files = files.len(), data_dir = %self.config.data_dir.display(), "Generated datasets");
        Ok(files)
    }

    /// Customers dimension: id, name, email, segment, region, active flag.
    /// Ids are drawn from the same 1000..=9999 space the orders use, so a
    /// join covers some but not all order rows.
    pub fn generate_customers(&mut self) -> Result<PathBuf> {
        let mut ids: Vec<i64> = (CUSTOMER_ID_LO..=CUSTOMER_ID_HI).collect();
        ids.shuffle(&mut self.rng);
        ids.truncate(self.config.customers);
        ids.sort_unstable();

        let mut names = Vec::with_capacity(ids.len());
        let mut emails = Vec::with_capacity(ids.len());
        let mut segments = Vec::with_capacity(ids.len());
        let mut regions = Vec::with_capacity(ids.len());
        let mut active = Vec::with_capacity(ids.len());
        for id in &ids {
            let first = pick(&mut self.rng, FIRST_NAMES);
            let last = pick(&mut self.rng, LAST_NAMES);
            names.push(format!("{first} {last}"));
            emails.push(format!("{first}.{last}.{id}@example.com").to_lowercase());
            segments.push(pick(&mut self.rng, SEGMENTS));
            regions.push(pick(&mut self.rng, REGIONS));
            active.push(self.rng.gen_bool(0.8));
        }

        let schema = Arc::new(Schema::new(vec![
            Field::new("customer_id", DataType::Int64, false),
            Field::new("customer_name", DataType::Utf8, false),
            Field::new("email", DataType::Utf8, false),
            Field::new("segment", DataType::Utf8, false),
            Field::new("region", DataType::Utf8, false),
            Field::new("is_active", DataType::Boolean, false),
        ]));
        let batch = RecordBatch::try_new(schema, vec![
            Arc::new(Int64Array::from(ids)) as ArrayRef,
            Arc::new(StringArray::from(names)),
            Arc::new(StringArray::from(emails)),
            Arc::new(StringArray::from(segments)),
            Arc::new(StringArray::from(regions)),
            Arc::new(BooleanArray::from(active)),
        ])?;

        let path = self.config.data_dir.join("dim_customer.parquet");
        drop(Publisher::new(&path, self.config.codec).publish(&[batch])?);
        Ok(path)
    }

    /// Products dimension straight from the item catalog; roughly one in
    /// ten products is retired.
    pub fn generate_products(&mut self) -> Result<PathBuf> {
        let ids: Vec<&str> = ITEMS.iter().map(|(id, ..)| *id).collect();
        let names: Vec<&str> = ITEMS.iter().map(|(_, name, ..)| *name).collect();
        let categories: Vec<&str> = ITEMS.iter().map(|(_, _, category, _)| *category).collect();
        let prices: Vec<f64> = ITEMS.iter().map(|(.., price)| *price).collect();
        let active: Vec<bool> = ITEMS.iter().map(|_| self.rng.gen_bool(0.9)).collect();

        let schema = Arc::new(Schema::new(vec![
            Field::new("item_id", DataType::Utf8, false),
            Field::new("item_name", DataType::Utf8, false),
            Field::new("category", DataType::Utf8, false),
            Field::new("unit_price", DataType::Float64, false),
            Field::new("is_active", DataType::Boolean, false),
        ]));
        let batch = RecordBatch::try_new(schema, vec![
            Arc::new(StringArray::from(ids)) as ArrayRef,
            Arc::new(StringArray::from(names)),
            Arc::new(StringArray::from(categories)),
            Arc::new(Float64Array::from(prices)),
            Arc::new(BooleanArray::from(active)),
        ])?;

        let path = self.config.data_dir.join("dim_product.parquet");
        drop(Publisher::new(&path, self.config.codec).publish(&[batch])?);
        Ok(path)
    }

    /// One parquet file per day between `start` and `end`, at order-line
    /// granularity: every order carries 1-5 item lines, and `total` is the
    /// line amount (unit price with noise, times quantity).
    pub fn generate_orders(&mut self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut day = self.config.start;
        while day <= self.config.end {
            let orders =
                self.rng.gen_range(self.config.min_orders_per_day..=self.config.max_orders_per_day);
            let batch = self.orders_batch(day, orders)?;
            let path =
                self.config.data_dir.join("raw").join(format!("orders_{day}.parquet"));
            let rows = Publisher::new(&path, self.config.codec).publish(&[batch])?;
            info!(day = %day, rows, "Generated order partition");
            files.push(path);
            day = day.succ();
        }
        Ok(files)
    }

    fn orders_batch(&mut self, day: PartitionKey, orders: usize) -> Result<RecordBatch> {
        let mut order_ids = Vec::new();
        let mut customer_ids = Vec::new();
        let mut statuses = Vec::new();
        let mut item_ids = Vec::new();
        let mut item_names = Vec::new();
        let mut item_prices = Vec::new();
        let mut quantities = Vec::new();
        let mut totals = Vec::new();

        for _ in 0..orders {
            let order_id = self.next_order_id;
            self.next_order_id += 1;
            let customer_id = self.rng.gen_range(CUSTOMER_ID_LO..=CUSTOMER_ID_HI);
            let status = pick(&mut self.rng, ORDER_STATUSES);

            let lines = self.rng.gen_range(1..=5);
            for &(item_id, item_name, _, unit_price) in
                ITEMS.choose_multiple(&mut self.rng, lines)
            {
                let price = to_cents(unit_price * self.rng.gen_range(0.8..1.2));
                let quantity = self.rng.gen_range(1..=4i64);
                order_ids.push(order_id);
                customer_ids.push(customer_id);
                statuses.push(status);
                item_ids.push(item_id);
                item_names.push(item_name);
                item_prices.push(price);
                quantities.push(quantity);
                totals.push(to_cents(price * quantity as f64));
            }
        }

        let days = day.days_since_epoch();
        let ds = vec![days; order_ids.len()];

        let batch = RecordBatch::try_new(orders_schema(), vec![
            Arc::new(Int64Array::from(order_ids)) as ArrayRef,
            Arc::new(Int64Array::from(customer_ids)),
            Arc::new(StringArray::from(statuses)),
            Arc::new(StringArray::from(item_ids)),
            Arc::new(StringArray::from(item_names)),
            Arc::new(Float64Array::from(item_prices)),
            Arc::new(Int64Array::from(quantities)),
            Arc::new(Float64Array::from(totals)),
            Arc::new(Date32Array::from(ds)),
        ])?;
        Ok(batch)
    }
}

/// Schema of the order-line fact rows.
pub fn orders_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("order_id", DataType::Int64, false),
        Field::new("customer_id", DataType::Int64, false),
        Field::new("order_status", DataType::Utf8, false),
        Field::new("item_id", DataType::Utf8, false),
        Field::new("item_name", DataType::Utf8, false),
        Field::new("item_price", DataType::Float64, false),
        Field::new("quantity", DataType::Int64, false),
        Field::new("total", DataType::Float64, false),
        Field::new("ds", DataType::Date32, false),
    ]))
}

fn pick<'a>(rng: &mut SmallRng, values: &[&'a str]) -> &'a str {
    values.choose(rng).expect("non-empty value table")
}

fn to_cents(amount: f64) -> f64 { (amount * 100.0).round() / 100.0 }
