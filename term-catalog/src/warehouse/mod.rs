//! Warehouse connection boundary.
//!
//! The engine never talks to a warehouse directly: every statement goes
//! through a [`QueryExecutor`]. The crate implements it for DataFusion's
//! [`SessionContext`], which is what the CLI and the test suite use.

pub mod extract;

use std::fmt;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{CatalogError, Result};

/// SQL flavor spoken by a [`QueryExecutor`].
///
/// Only the sampling clause differs between dialects; everything else the
/// profiler emits is portable SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    /// Apache DataFusion (no `TABLESAMPLE`; sampling is rewritten as subqueries)
    #[default]
    DataFusion,
    /// Snowflake (`TABLESAMPLE BERNOULLI (p)` / `TABLESAMPLE (n ROWS)`)
    Snowflake,
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlDialect::DataFusion => write!(f, "datafusion"),
            SqlDialect::Snowflake => write!(f, "snowflake"),
        }
    }
}

/// Executes SQL statements against a warehouse.
///
/// Implementations must be usable from a single task at a time; the engine
/// keeps at most one statement in flight.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Runs a statement and returns every result batch.
    async fn execute(&self, sql: &str) -> Result<Vec<RecordBatch>>;

    /// The dialect used to render sampling clauses.
    fn dialect(&self) -> SqlDialect {
        SqlDialect::DataFusion
    }
}

#[async_trait]
impl QueryExecutor for SessionContext {
    #[instrument(skip(self), level = "trace")]
    async fn execute(&self, sql: &str) -> Result<Vec<RecordBatch>> {
        let df = self
            .sql(sql)
            .await
            .map_err(|e| CatalogError::query_with_sql(e.to_string(), sql))?;
        let batches = df
            .collect()
            .await
            .map_err(|e| CatalogError::query_with_sql(e.to_string(), sql))?;

        debug!(
            batches = batches.len(),
            rows = batches.iter().map(|b| b.num_rows()).sum::<usize>(),
            "Query completed"
        );
        Ok(batches)
    }
}

#[async_trait]
impl<T> QueryExecutor for Arc<T>
where
    T: QueryExecutor + ?Sized,
{
    async fn execute(&self, sql: &str) -> Result<Vec<RecordBatch>> {
        (**self).execute(sql).await
    }

    fn dialect(&self) -> SqlDialect {
        (**self).dialect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_context_executes_sql() {
        let ctx = SessionContext::new();
        let batches = ctx.execute("SELECT 1 AS one").await.unwrap();
        assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 1);
        assert_eq!(ctx.dialect(), SqlDialect::DataFusion);
    }

    #[tokio::test]
    async fn test_query_error_carries_statement() {
        let ctx = SessionContext::new();
        let err = ctx.execute("SELECT * FROM missing_table").await.unwrap_err();
        match err {
            CatalogError::Query { sql, .. } => {
                assert_eq!(sql.as_deref(), Some("SELECT * FROM missing_table"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_arc_executor_delegates() {
        let executor: Arc<dyn QueryExecutor> = Arc::new(SessionContext::new());
        let batches = executor.execute("SELECT 2 AS two").await.unwrap();
        assert_eq!(batches[0].num_rows(), 1);
    }

    #[test]
    fn test_dialect_serde() {
        assert_eq!(
            serde_json::to_string(&SqlDialect::Snowflake).unwrap(),
            "\"snowflake\""
        );
        let parsed: SqlDialect = serde_json::from_str("\"datafusion\"").unwrap();
        assert_eq!(parsed, SqlDialect::DataFusion);
    }
}
