//! Discovery of the newest available source partition.

use datafusion::arrow::array::{Array, AsArray, RecordBatch};
use datafusion::arrow::compute::cast;
use datafusion::arrow::datatypes::DataType;
use tracing::debug;

use crate::error::{Error, Result};
use crate::partition::PartitionKey;
use crate::session::EngineSession;

/// Read-only scanner over a registered source dataset.
#[derive(Debug)]
pub struct PartitionScanner<'a> {
    session: &'a EngineSession,
    table:   &'a str,
}

impl<'a> PartitionScanner<'a> {
    pub fn new(session: &'a EngineSession, table: &'a str) -> Self { Self { session, table } }

    /// The maximum partition key present in the source, or `None` when the
    /// source holds no rows. Never mutates engine or disk state.
    pub async fn max_available_key(&self) -> Result<Option<PartitionKey>> {
        let sql = format!("SELECT max(ds) AS max_ds FROM {}", self.table);
        let batches = self.session.query(&sql).await?;
        let key = first_cell_key(&batches)?;
        debug!(max_ds = ?key.map(|k| k.to_string()), "Scanned source for newest partition");
        Ok(key)
    }
}

/// Pull the first cell of the first column out as a partition key.
///
/// The column is cast to text first, so `ds` may be stored as a date or a
/// string in the source files.
fn first_cell_key(batches: &[RecordBatch]) -> Result<Option<PartitionKey>> {
    let Some(batch) = batches.iter().find(|b| b.num_rows() > 0) else {
        return Ok(None);
    };
    let column = cast(batch.column(0), &DataType::Utf8)?;
    let column = column.as_string::<i32>();
    if column.is_null(0) {
        return Ok(None);
    }
    let raw = column.value(0);
    raw.parse::<PartitionKey>().map(Some).map_err(|e| {
        Error::Validation(format!("source partition key `{raw}` does not parse as a date: {e}"))
    })
}
