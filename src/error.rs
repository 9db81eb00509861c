//! Error taxonomy for the ETL jobs.
//!
//! Every error here is fatal: the running job aborts, the failure is
//! surfaced to the operator, and the watermark stays as it was. Nothing
//! is retried in-process; retry is an orchestrator concern.

use std::path::PathBuf;

use datafusion::arrow::error::ArrowError;
use datafusion::error::DataFusionError;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The source glob matched nothing, or the engine could not open it.
    #[error("source unavailable at `{path}`: {reason}")]
    SourceUnavailable { path: String, reason: String },

    /// The watermark file exists but cannot be parsed.
    #[error("corrupt watermark state at `{path}`: {reason}")]
    CorruptState { path: PathBuf, reason: String },

    /// Post-aggregation sanity checks failed; the job aborts before
    /// anything is published.
    #[error("aggregate validation failed: {0}")]
    Validation(String),

    /// An output write failed. The destination only ever receives a
    /// completed temp file via rename, so partial bytes are never visible
    /// there.
    #[error("failed writing `{path}`: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("query engine error: {0}")]
    Engine(#[from] DataFusionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ArrowError> for Error {
    fn from(err: ArrowError) -> Self {
        Self::Engine(DataFusionError::from(err))
    }
}

impl Error {
    pub(crate) fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Write { path: path.into(), reason: reason.to_string() }
    }

    /// Short label for the stage that produced this error, used in
    /// operator-facing failure messages.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::SourceUnavailable { .. } => "scan",
            Self::CorruptState { .. } => "load-watermark",
            Self::Validation(_) => "validate",
            Self::Write { .. } => "publish",
            Self::Engine(_) => "query",
            Self::Io(_) => "io",
        }
    }
}
