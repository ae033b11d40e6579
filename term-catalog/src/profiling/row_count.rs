//! Row-count estimation used to pick a table's sampling mode.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::metadata::TableRef;
use crate::warehouse::extract::scalar_u64;
use crate::warehouse::QueryExecutor;

/// Estimates how many rows a table holds.
///
/// Estimates only steer sampling, so they may be approximate. Failures are
/// absorbed by the orchestrator, which falls back to
/// [`SamplingConfig::unknown_row_count`](crate::profiling::SamplingConfig::unknown_row_count).
#[async_trait]
pub trait RowCountEstimator: Send + Sync {
    async fn estimate(&self, executor: &dyn QueryExecutor, table: &TableRef) -> Result<u64>;
}

/// Exact count through `SELECT COUNT(*)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountStarEstimator;

#[async_trait]
impl RowCountEstimator for CountStarEstimator {
    #[instrument(skip_all, fields(table = %table))]
    async fn estimate(&self, executor: &dyn QueryExecutor, table: &TableRef) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) AS row_count FROM {}", table.to_sql()?);
        let batches = executor.execute(&sql).await?;
        let rows = scalar_u64(&batches, 0, "row_count")?;
        debug!(rows, "Estimated row count");
        Ok(rows)
    }
}
