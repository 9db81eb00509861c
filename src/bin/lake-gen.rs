#![allow(unused_crate_dependencies)]
//! Synthetic data generator for the lakehouse jobs.
//!
//! Writes a customers dimension, a products dimension, and one orders
//! parquet partition per day into `--data-dir`.
//!
//! ```bash
//! cargo run --bin lake-gen -- --start 2025-10-01 --end 2025-10-31 --seed 42
//! ```

use std::path::PathBuf;

use clap::Parser;
use minilake::synth::{Generator, GeneratorConfig};
use minilake::{Codec, PartitionKey};

#[derive(Parser)]
#[command(name = "lake-gen")]
#[command(about = "Generate synthetic customers, products, and daily order partitions")]
struct Cli {
    /// Root directory for generated datasets
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// First order partition (inclusive)
    #[arg(long, default_value = "2025-10-01")]
    start: PartitionKey,

    /// Last order partition (inclusive)
    #[arg(long, default_value = "2025-10-31")]
    end: PartitionKey,

    /// Rows in the customers dimension
    #[arg(long, default_value_t = 500)]
    customers: usize,

    /// Parquet compression codec (zstd, snappy, lz4, gzip, none)
    #[arg(long, default_value = "zstd")]
    codec: Codec,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    minilake::init_tracing();
    let cli = Cli::parse();
    if cli.end < cli.start {
        return Err(format!("--end {} is before --start {}", cli.end, cli.start).into());
    }

    let config = GeneratorConfig {
        data_dir: cli.data_dir.clone(),
        start: cli.start,
        end: cli.end,
        customers: cli.customers,
        codec: cli.codec,
        seed: cli.seed,
        ..GeneratorConfig::default()
    };

    let files = Generator::new(config).generate_all()?;
    for file in &files {
        println!("Created {}", file.display());
    }
    println!(
        "Generated {} files under {} ({} through {})",
        files.len(),
        cli.data_dir.display(),
        cli.start,
        cli.end
    );
    Ok(())
}
