//! Scoped handle over the embedded query engine.

use std::sync::Arc;

use datafusion::arrow::array::RecordBatch;
use datafusion::arrow::datatypes::SchemaRef;
use datafusion::common::ScalarValue;
use datafusion::datasource::MemTable;
use datafusion::prelude::{ParquetReadOptions, SessionContext};
use tracing::{debug, error};

use crate::error::{Error, Result};

/// Name the partitioned orders dataset is registered under.
pub const SOURCE_TABLE: &str = "orders";

/// An in-process engine session scoped to a single run.
///
/// Each job opens its own session, registers the datasets it needs, and
/// drops the handle at the end of the run. Components borrow the session;
/// none of them own or share engine state across runs.
pub struct EngineSession {
    ctx: SessionContext,
}

impl std::fmt::Debug for EngineSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineSession").finish_non_exhaustive()
    }
}

impl Default for EngineSession {
    fn default() -> Self { Self::new() }
}

impl EngineSession {
    pub fn new() -> Self { Self { ctx: SessionContext::new() } }

    /// Access the underlying session context for DataFrame pipelines.
    pub fn context(&self) -> &SessionContext { &self.ctx }

    /// Register a parquet dataset (a single file or a glob over partition
    /// files) under `table`.
    ///
    /// Fails with [`Error::SourceUnavailable`] when the path matches no
    /// files or the engine cannot open them.
    pub async fn register_source(&self, table: &str, path: &str) -> Result<()> {
        debug!(table, path, "Registering source dataset");
        self.ctx.register_parquet(table, path, ParquetReadOptions::default()).await.map_err(|e| {
            error!(error = %e, table, path, "Failed opening source dataset");
            Error::SourceUnavailable { path: path.to_string(), reason: e.to_string() }
        })
    }

    /// Register collected batches as an in-memory table for follow-up
    /// queries over an intermediate result.
    pub fn register_batches(
        &self,
        table: &str,
        schema: SchemaRef,
        batches: Vec<RecordBatch>,
    ) -> Result<()> {
        debug!(table, batches = batches.len(), "Registering in-memory table");
        let mem = MemTable::try_new(schema, vec![batches])?;
        drop(self.ctx.register_table(table, Arc::new(mem))?);
        Ok(())
    }

    /// Run a SQL statement and collect the full result.
    pub async fn query(&self, sql: &str) -> Result<Vec<RecordBatch>> {
        debug!(sql, "Running query");
        let batches = self
            .ctx
            .sql(sql)
            .await?
            .collect()
            .await
            .inspect_err(|error| error!(?error, "Failed running query"))?;
        Ok(batches)
    }

    /// Run a SQL statement with `$n` placeholders bound to `params`.
    ///
    /// Values always travel as typed parameters, never as text spliced
    /// into the statement.
    pub async fn query_with_params(
        &self,
        sql: &str,
        params: Vec<ScalarValue>,
    ) -> Result<Vec<RecordBatch>> {
        debug!(sql, "Running parameterized query");
        let df = self.ctx.sql(sql).await?.with_param_values(params)?;
        let batches =
            df.collect().await.inspect_err(|error| error!(?error, "Failed running query"))?;
        Ok(batches)
    }
}
