#![allow(unused_crate_dependencies)]
//! Incremental partition publisher.
//!
//! Tracks the last published order partition in a small state file and
//! publishes count/gross aggregates only for partitions beyond that
//! watermark. Runs with no arguments; every knob has a default.
//!
//! ```bash
//! cargo run --bin lake-incr
//! cargo run --bin lake-incr -- --source 'data/raw/orders_*.parquet' --codec snappy
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use minilake::job::{self, Outcome};
use minilake::{Codec, JobConfig, WatermarkStore};

#[derive(Parser)]
#[command(name = "lake-incr")]
#[command(about = "Publish aggregates for order partitions beyond the stored watermark")]
struct Cli {
    /// Glob over source order partitions
    #[arg(long, default_value = "data/raw/orders_*.parquet")]
    source: String,

    /// Destination parquet file for the published increment
    #[arg(long, default_value = "data/out/orders_daily_incr.parquet")]
    output: PathBuf,

    /// Watermark state file
    #[arg(long, default_value = "data/meta.json")]
    watermark: PathBuf,

    /// Parquet compression codec (zstd, snappy, lz4, gzip, none)
    #[arg(long, default_value = "zstd")]
    codec: Codec,
}

#[tokio::main]
async fn main() -> ExitCode {
    minilake::init_tracing();
    let cli = Cli::parse();
    let config = JobConfig {
        source_glob:    cli.source,
        output_path:    cli.output,
        watermark_path: cli.watermark.clone(),
        codec:          cli.codec,
    };

    match job::run(&config).await {
        Ok(Outcome::NoNewPartitions { watermark }) => {
            println!("No new partitions (watermark {watermark})");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Published { through, groups }) => {
            println!("Published through {through} ({groups} groups)");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let on_file = WatermarkStore::new(&cli.watermark)
                .load()
                .map(|key| key.to_string())
                .unwrap_or_else(|_| "unreadable".to_string());
            eprintln!("{} stage failed: {err}", err.stage());
            eprintln!("Watermark on file remains {on_file}");
            ExitCode::FAILURE
        }
    }
}
