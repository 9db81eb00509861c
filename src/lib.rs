#![doc = include_str!("../README.md")]
pub mod aggregate;
pub mod config;
pub mod error;
pub mod job;
pub mod partition;
pub mod publish;
pub mod report;
pub mod scan;
pub mod session;
pub mod synth;
pub mod watermark;

pub use aggregate::{AggregateResult, IncrementalAggregator};
pub use config::{Codec, JobConfig};
pub use error::{Error, Result};
pub use job::{run, Outcome};
pub use partition::PartitionKey;
pub use publish::Publisher;
pub use scan::PartitionScanner;
pub use session::{EngineSession, SOURCE_TABLE};
pub use watermark::WatermarkStore;

/// Install the default tracing subscriber for the job binaries.
///
/// Respects `RUST_LOG`; defaults to `info` when unset.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

mod bin_deps {
    use {clap as _, tokio as _};
}
