//! Job configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use datafusion::parquet::basic::{Compression, GzipLevel, ZstdLevel};

/// Compression codec applied to published parquet files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Codec {
    #[default]
    Zstd,
    Snappy,
    Lz4,
    Gzip,
    Uncompressed,
}

impl Codec {
    /// The parquet writer setting for this codec.
    pub fn to_parquet(self) -> Compression {
        match self {
            Self::Zstd => Compression::ZSTD(ZstdLevel::default()),
            Self::Snappy => Compression::SNAPPY,
            Self::Lz4 => Compression::LZ4_RAW,
            Self::Gzip => Compression::GZIP(GzipLevel::default()),
            Self::Uncompressed => Compression::UNCOMPRESSED,
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Zstd => "zstd",
            Self::Snappy => "snappy",
            Self::Lz4 => "lz4",
            Self::Gzip => "gzip",
            Self::Uncompressed => "none",
        })
    }
}

impl FromStr for Codec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zstd" => Ok(Self::Zstd),
            "snappy" => Ok(Self::Snappy),
            "lz4" => Ok(Self::Lz4),
            "gzip" => Ok(Self::Gzip),
            "none" | "uncompressed" => Ok(Self::Uncompressed),
            other => {
                Err(format!("unknown codec `{other}` (expected zstd, snappy, lz4, gzip, or none)"))
            }
        }
    }
}

/// Configuration for one incremental publisher run.
///
/// Defaults match the `data/` layout `lake-gen` produces.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Glob over the partitioned source dataset.
    pub source_glob:    String,
    /// Destination parquet file for the published increment.
    pub output_path:    PathBuf,
    /// Watermark state file.
    pub watermark_path: PathBuf,
    /// Codec for the published file.
    pub codec:          Codec,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            source_glob:    "data/raw/orders_*.parquet".into(),
            output_path:    "data/out/orders_daily_incr.parquet".into(),
            watermark_path: "data/meta.json".into(),
            codec:          Codec::default(),
        }
    }
}
