#![allow(unused_crate_dependencies)]
//! Monthly revenue by product category.
//!
//! Joins order lines with the products dimension, keeps active products
//! only, and aggregates units, revenue, and distinct customers per
//! category per month.
//!
//! ```bash
//! cargo run --bin lake-category
//! ```

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use minilake::report::{self, SummaryRow};
use minilake::{Codec, EngineSession, Publisher, SOURCE_TABLE};

#[derive(Parser)]
#[command(name = "lake-category")]
#[command(about = "Aggregate monthly revenue per product category")]
struct Cli {
    /// Glob over source order partitions
    #[arg(long, default_value = "data/raw/orders_*.parquet")]
    source: String,

    /// Products dimension parquet file
    #[arg(long, default_value = "data/dim_product.parquet")]
    products: PathBuf,

    /// Destination parquet file
    #[arg(long, default_value = "data/out/revenue_by_category.parquet")]
    output: PathBuf,

    /// Parquet compression codec (zstd, snappy, lz4, gzip, none)
    #[arg(long, default_value = "zstd")]
    codec: Codec,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    minilake::init_tracing();
    let cli = Cli::parse();

    let session = EngineSession::new();
    session.register_source(SOURCE_TABLE, &cli.source).await?;
    session.register_source("products", &cli.products.to_string_lossy()).await?;

    let started = Instant::now();
    let batches = session
        .query(&format!(
            "SELECT \
               p.category, \
               substr(CAST(o.ds AS VARCHAR), 1, 7) AS sales_month, \
               sum(o.quantity) AS units, \
               sum(o.total) AS revenue, \
               count(DISTINCT o.customer_id) AS customers \
             FROM {SOURCE_TABLE} o \
             JOIN products p ON o.item_id = p.item_id \
             WHERE p.is_active \
             GROUP BY p.category, substr(CAST(o.ds AS VARCHAR), 1, 7) \
             ORDER BY revenue DESC"
        ))
        .await?;

    let rows = Publisher::new(&cli.output, cli.codec).publish(&batches)?;
    let summary = [SummaryRow::new("join & aggregate", rows, started.elapsed())];

    report::print_batches(&batches)?;
    println!("{}", report::summary_table(&summary));
    println!("Published {}", cli.output.display());
    Ok(())
}
