#![allow(unused_crate_dependencies)]
//! Top customer segments per region.
//!
//! Builds a lazy DataFrame pipeline (shipped orders only, joined to the
//! customers dimension, grouped by region and segment), then ranks the
//! grouped result with a window function and keeps the top N segments per
//! region.
//!
//! ```bash
//! cargo run --bin lake-top -- --top 3
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use datafusion::arrow::datatypes::Schema;
use datafusion::functions_aggregate::expr_fn::{count, sum};
use datafusion::prelude::{col, lit, JoinType};
use minilake::report::{self, SummaryRow};
use minilake::{Codec, EngineSession, Publisher, SOURCE_TABLE};

#[derive(Parser)]
#[command(name = "lake-top")]
#[command(about = "Rank the top customer segments per region by gross merchandise value")]
struct Cli {
    /// Glob over source order partitions
    #[arg(long, default_value = "data/raw/orders_*.parquet")]
    source: String,

    /// Customers dimension parquet file
    #[arg(long, default_value = "data/dim_customer.parquet")]
    customers: PathBuf,

    /// Destination parquet file
    #[arg(long, default_value = "data/out/top_segments.parquet")]
    output: PathBuf,

    /// Segments to keep per region
    #[arg(long, default_value_t = 3)]
    top: u32,

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
    session.register_source("customers", &cli.customers.to_string_lossy()).await?;

    // Lazy pipeline: nothing executes until collect.
    let started = Instant::now();
    let ctx = session.context();
    let orders = ctx.table(SOURCE_TABLE).await?;
    let customers = ctx.table("customers").await?.select_columns(&[
        "customer_id",
        "region",
        "segment",
    ])?;

    let pipeline = orders
        .filter(col("order_status").eq(lit("shipped")))?
        .join(customers, JoinType::Inner, &["customer_id"], &["customer_id"], None)?
        .aggregate(vec![col("region"), col("segment")], vec![
            sum(col("total")).alias("gmv"),
            count(col("order_id")).alias("orders"),
        ])?;

    let schema = Arc::new(Schema::from(pipeline.schema()));
    let metrics = pipeline.collect().await?;
    let grouped: usize = metrics.iter().map(|b| b.num_rows()).sum();
    let summary_pipeline = SummaryRow::new("pipeline", grouped as u64, started.elapsed());

    if grouped == 0 {
        println!("No shipped orders matched the customers dimension");
        return Ok(());
    }

    // Window ranking over the grouped intermediate result.
    let started = Instant::now();
    session.register_batches("segment_metrics", schema, metrics)?;
    let ranked = session
        .query_with_params(
            "WITH ranked AS ( \
               SELECT region, segment, gmv, orders, \
                      ROW_NUMBER() OVER (PARTITION BY region ORDER BY gmv DESC) AS rank_in_region \
               FROM segment_metrics \
             ) \
             SELECT region, segment, gmv, orders, rank_in_region \
             FROM ranked WHERE rank_in_region <= $1 \
             ORDER BY region, rank_in_region",
            vec![datafusion::common::ScalarValue::UInt64(Some(u64::from(cli.top)))],
        )
        .await?;

    let rows = Publisher::new(&cli.output, cli.codec).publish(&ranked)?;
    let summary = [summary_pipeline, SummaryRow::new("rank & publish", rows, started.elapsed())];

    report::print_batches(&ranked)?;
    println!("{}", report::summary_table(&summary));
    println!("Published {}", cli.output.display());
    Ok(())
}
