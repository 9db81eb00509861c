//! Console reporting for the job binaries.

use std::time::Duration;

use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use datafusion::arrow::array::RecordBatch;
use datafusion::arrow::util::pretty;
use datafusion::error::DataFusionError;

use crate::error::Result;

/// Pretty-print result batches to stdout.
pub fn print_batches(batches: &[RecordBatch]) -> Result<()> {
    pretty::print_batches(batches).map_err(DataFusionError::from)?;
    Ok(())
}

/// One line of the end-of-run summary.
#[derive(Debug)]
pub struct SummaryRow {
    pub stage:   String,
    pub rows:    u64,
    pub elapsed: Duration,
}

impl SummaryRow {
    pub fn new(stage: impl Into<String>, rows: u64, elapsed: Duration) -> Self {
        Self { stage: stage.into(), rows, elapsed }
    }
}

/// Render run stages as a bordered summary table.
pub fn summary_table(rows: &[SummaryRow]) -> Table {
    let mut table = Table::new();
    let _ = table.load_preset(UTF8_FULL).set_header(vec!["stage", "rows", "elapsed"]);
    for row in rows {
        let _ = table.add_row(vec![
            row.stage.clone(),
            row.rows.to_string(),
            format!("{:.2}s", row.elapsed.as_secs_f64()),
        ]);
    }
    table
}
