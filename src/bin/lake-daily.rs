#![allow(unused_crate_dependencies)]
//! Daily revenue over the full order history.
//!
//! Scans every order partition, strips malformed rows behind a view,
//! validates the cleaned rows, aggregates order counts and gross revenue
//! per day and status, and publishes one parquet file.
//!
//! ```bash
//! cargo run --bin lake-daily
//! ```

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use datafusion::arrow::array::{Array, AsArray, RecordBatch};
use datafusion::arrow::compute::cast;
use datafusion::arrow::datatypes::{DataType, Int64Type};
use minilake::report::{self, SummaryRow};
use minilake::synth::ORDER_STATUSES;
use minilake::{Codec, EngineSession, Error, Publisher, SOURCE_TABLE};

#[derive(Parser)]
#[command(name = "lake-daily")]
#[command(about = "Aggregate daily order counts and gross revenue by status")]
struct Cli {
    /// Glob over source order partitions
    #[arg(long, default_value = "data/raw/orders_*.parquet")]
    source: String,

    /// Destination parquet file
    #[arg(long, default_value = "data/out/orders_daily.parquet")]
    output: PathBuf,

    /// Parquet compression codec (zstd, snappy, lz4, gzip, none)
    #[arg(long, default_value = "zstd")]
    codec: Codec,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    minilake::init_tracing();
    let cli = Cli::parse();
    let mut summary = Vec::new();

    let session = EngineSession::new();
    session.register_source(SOURCE_TABLE, &cli.source).await?;

    // Cleaned view: drop rows missing any field the report depends on.
    drop(
        session
            .query(&format!(
                "CREATE VIEW clean_orders AS \
                 SELECT ds, order_status, total FROM {SOURCE_TABLE} \
                 WHERE ds IS NOT NULL AND order_status IS NOT NULL AND total IS NOT NULL"
            ))
            .await?,
    );

    // Cheap data tests before anything is written.
    let started = Instant::now();
    let known: Vec<String> = ORDER_STATUSES.iter().map(|s| format!("'{s}'")).collect();
    let checks = session
        .query(&format!(
            "SELECT \
               count(*) AS scanned, \
               sum(CASE WHEN total < 0 THEN 1 ELSE 0 END) AS negative_totals, \
               sum(CASE WHEN order_status NOT IN ({}) THEN 1 ELSE 0 END) AS unknown_statuses \
             FROM clean_orders",
            known.join(", ")
        ))
        .await?;
    let (scanned, failures) = read_checks(&checks)?;
    if failures > 0 {
        return Err(Error::Validation(format!("{failures} rows failed the data tests")).into());
    }
    summary.push(SummaryRow::new("validate", scanned, started.elapsed()));

    // Aggregate and publish.
    let started = Instant::now();
    let batches = session
        .query(
            "SELECT ds, order_status, count(*) AS orders, sum(total) AS gross \
             FROM clean_orders GROUP BY ds, order_status ORDER BY ds, order_status",
        )
        .await?;
    let rows = Publisher::new(&cli.output, cli.codec).publish(&batches)?;
    summary.push(SummaryRow::new("aggregate & publish", rows, started.elapsed()));

    report::print_batches(&batches)?;
    println!("{}", report::summary_table(&summary));
    println!("Published {}", cli.output.display());
    Ok(())
}

/// Returns (rows scanned, rows failing any check) from the checks result.
/// The first column is the scan count; every other column counts failures.
fn read_checks(batches: &[RecordBatch]) -> Result<(u64, i64), Box<dyn std::error::Error>> {
    let Some(batch) = batches.iter().find(|b| b.num_rows() > 0) else {
        return Ok((0, 0));
    };
    let mut scanned = 0u64;
    let mut failures = 0i64;
    for (index, column) in batch.columns().iter().enumerate() {
        let column = cast(column, &DataType::Int64)?;
        let column = column.as_primitive::<Int64Type>();
        if column.is_null(0) {
            continue;
        }
        if index == 0 {
            scanned = column.value(0) as u64;
        } else {
            failures += column.value(0);
        }
    }
    Ok((scanned, failures))
}
