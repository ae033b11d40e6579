//! Type-specific column statistics.
//!
//! The profiler issues one aggregation per column (two for character
//! columns) shaped by the column's [`TypeCategory`] and the table's
//! [`SamplingMode`]:
//!
//! - numeric: `MIN`, `MAX`, `AVG` (as `DOUBLE`) and `COUNT(DISTINCT)`;
//! - character: an unsampled `COUNT(DISTINCT)` plus the first
//!   [`ProfilingConfig::max_sample_values`] distinct values in sort order
//!   under the sampling clause;
//! - temporal: `MIN`, `MAX` and `COUNT(DISTINCT)`.
//!
//! Any failure is captured in [`ColumnProfile::Failed`]; profiling a column
//! never returns an error.
//!
//! # Example
//!
//! ```rust,no_run
//! use term_catalog::metadata::{ColumnMetadata, TableRef};
//! use term_catalog::profiling::{ColumnProfiler, SamplingMode};
//! use datafusion::prelude::SessionContext;
//!
//! # async fn example(ctx: SessionContext) {
//! let profiler = ColumnProfiler::builder().max_sample_values(20).build();
//! let column = ColumnMetadata::new("ORDERS", "STATUS", 4, "VARCHAR", true);
//! let profile = profiler
//!     .profile_column(&ctx, &TableRef::bare("ORDERS"), &column, &SamplingMode::Full)
//!     .await;
//! println!("{profile:?}");
//! # }
//! ```

use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::error::{CatalogError, Result};
use crate::log_query;
use crate::logging::LogConfig;
use crate::metadata::{ColumnMetadata, TableRef, TypeCategory};
use crate::profiling::SamplingMode;
use crate::security::{InputValidator, SqlSecurity};
use crate::warehouse::extract::{collect_strings, scalar_f64, scalar_string, scalar_u64};
use crate::warehouse::QueryExecutor;

/// Limits applied while collecting and rendering sample values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilingConfig {
    /// Maximum number of distinct values kept for character columns
    pub max_sample_values: usize,
    /// Maximum characters per value in [`TextProfile::summary`]
    pub max_value_length: usize,
    /// Maximum characters of the whole [`TextProfile::summary`]
    pub max_sample_text_length: usize,
    /// Separator placed before the total distinct count in summaries
    pub truncation_indicator: String,
    /// Fraction digits used when rendering numeric statistics
    pub decimal_places: usize,
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            max_sample_values: 50,
            max_value_length: 50,
            max_sample_text_length: 200,
            truncation_indicator: " ... ".to_string(),
            decimal_places: 2,
        }
    }
}

impl ProfilingConfig {
    pub fn validate(&self) -> Result<()> {
        InputValidator::validate_positive(
            self.max_sample_values as u64,
            "profiling.max_sample_values",
        )?;
        InputValidator::validate_positive(
            self.max_sample_text_length as u64,
            "profiling.max_sample_text_length",
        )?;
        Ok(())
    }

    /// Renders a numeric statistic with `decimal_places` fraction digits.
    pub fn format_numeric(&self, value: f64) -> String {
        format!("{value:.*}", self.decimal_places)
    }
}

/// Statistics of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericProfile {
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub avg_value: Option<f64>,
    pub distinct_count: u64,
}

/// Sample values of a character column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextProfile {
    /// Distinct non-null values in ascending order
    pub sample_values: Vec<String>,
    /// Distinct non-null values over the whole table
    pub total_distinct_count: u64,
    /// Whether `total_distinct_count` exceeded the sample cap
    pub overflow: bool,
}

impl TextProfile {
    /// Distinct values not included in `sample_values`, when overflowing.
    pub fn additional_values(&self) -> u64 {
        if self.overflow {
            self.total_distinct_count
                .saturating_sub(self.sample_values.len() as u64)
        } else {
            0
        }
    }

    /// Renders the sample as `a; b; c ... (N total distinct values)`.
    ///
    /// Values longer than `max_value_length` are cut and suffixed with
    /// `...`; the whole text never exceeds `max_sample_text_length` plus the
    /// length of a trailing `...`.
    pub fn summary(&self, config: &ProfilingConfig) -> String {
        let values: Vec<String> = self
            .sample_values
            .iter()
            .map(|v| {
                if v.chars().count() > config.max_value_length {
                    format!("{}...", take_chars(v, config.max_value_length))
                } else {
                    v.clone()
                }
            })
            .collect();

        let mut text = values.join("; ");
        if text.chars().count() > config.max_sample_text_length {
            text = format!("{}...", take_chars(&text, config.max_sample_text_length));
        }

        if self.overflow {
            let marker = format!(
                "{}({} total distinct values)",
                config.truncation_indicator, self.total_distinct_count
            );
            let marker_len = marker.chars().count();
            if text.chars().count() + marker_len > config.max_sample_text_length {
                let keep = config.max_sample_text_length.saturating_sub(marker_len);
                text = take_chars(&text, keep).to_string();
            }
            text.push_str(&marker);
        }
        text
    }
}

fn take_chars(value: &str, n: usize) -> &str {
    match value.char_indices().nth(n) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// Bounds of a date or timestamp column, rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalProfile {
    pub min_value: Option<String>,
    pub max_value: Option<String>,
    pub distinct_count: u64,
}

/// Outcome of profiling one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnProfile {
    Numeric(NumericProfile),
    Text(TextProfile),
    Temporal(TemporalProfile),
    /// No statistics are collected for the declared type
    NotApplicable { data_type: String },
    /// Collection was attempted and failed
    Failed { profiling_error: String },
}

impl ColumnProfile {
    pub fn is_failed(&self) -> bool {
        matches!(self, ColumnProfile::Failed { .. })
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self, ColumnProfile::NotApplicable { .. })
    }

    /// The profiling error, if collection failed.
    pub fn profiling_error(&self) -> Option<&str> {
        match self {
            ColumnProfile::Failed { profiling_error } => Some(profiling_error),
            _ => None,
        }
    }

    /// Distinct count for every variant that collects one.
    pub fn distinct_count(&self) -> Option<u64> {
        match self {
            ColumnProfile::Numeric(p) => Some(p.distinct_count),
            ColumnProfile::Text(p) => Some(p.total_distinct_count),
            ColumnProfile::Temporal(p) => Some(p.distinct_count),
            _ => None,
        }
    }
}

/// Computes [`ColumnProfile`]s through a [`QueryExecutor`].
#[derive(Debug, Clone, Default)]
pub struct ColumnProfiler {
    config: ProfilingConfig,
    log: LogConfig,
}

/// Builder for [`ColumnProfiler`].
#[derive(Debug, Clone, Default)]
pub struct ColumnProfilerBuilder {
    config: ProfilingConfig,
    log: LogConfig,
}

impl ColumnProfilerBuilder {
    /// Replaces the whole profiling configuration.
    pub fn config(mut self, config: ProfilingConfig) -> Self {
        self.config = config;
        self
    }

    /// Caps the number of distinct values kept for character columns.
    pub fn max_sample_values(mut self, max: usize) -> Self {
        self.config.max_sample_values = max;
        self
    }

    pub fn log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    pub fn build(self) -> ColumnProfiler {
        ColumnProfiler {
            config: self.config,
            log: self.log,
        }
    }
}

impl ColumnProfiler {
    pub fn builder() -> ColumnProfilerBuilder {
        ColumnProfilerBuilder::default()
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &ProfilingConfig {
        &self.config
    }

    /// Profiles one column under `mode`.
    #[instrument(skip_all, fields(table = %table, column = %column.column_name, mode = %mode))]
    pub async fn profile_column(
        &self,
        executor: &dyn QueryExecutor,
        table: &TableRef,
        column: &ColumnMetadata,
        mode: &SamplingMode,
    ) -> ColumnProfile {
        let category = column.type_category();
        let outcome = match category {
            TypeCategory::Numeric => self
                .profile_numeric(executor, table, &column.column_name, mode)
                .await
                .map(ColumnProfile::Numeric),
            TypeCategory::Character => self
                .profile_text(executor, table, &column.column_name, mode)
                .await
                .map(ColumnProfile::Text),
            TypeCategory::Temporal => self
                .profile_temporal(executor, table, &column.column_name, mode)
                .await
                .map(ColumnProfile::Temporal),
            TypeCategory::Other => Ok(ColumnProfile::NotApplicable {
                data_type: column.data_type.clone(),
            }),
        };

        outcome.unwrap_or_else(|e| {
            warn!(
                table = %table,
                column = %column.column_name,
                category = %category,
                error = %e,
                "Column profiling failed"
            );
            ColumnProfile::Failed {
                profiling_error: e.to_string(),
            }
        })
    }

    async fn run(&self, executor: &dyn QueryExecutor, sql: &str) -> Result<Vec<RecordBatch>> {
        log_query!(self.log, sql);
        executor.execute(sql).await
    }

    async fn profile_numeric(
        &self,
        executor: &dyn QueryExecutor,
        table: &TableRef,
        column_name: &str,
        mode: &SamplingMode,
    ) -> Result<NumericProfile> {
        let column = SqlSecurity::escape_identifier(column_name)?;
        let from = mode.from_clause(&table.to_sql()?, executor.dialect());
        let sql = format!(
            "SELECT \
                MIN(CAST({column} AS DOUBLE)) AS min_value, \
                MAX(CAST({column} AS DOUBLE)) AS max_value, \
                AVG(CAST({column} AS DOUBLE)) AS avg_value, \
                COUNT(DISTINCT {column}) AS distinct_count \
             {from}"
        );

        let batches = self.run(executor, &sql).await?;
        Ok(NumericProfile {
            min_value: scalar_f64(&batches, 0)?,
            max_value: scalar_f64(&batches, 1)?,
            avg_value: scalar_f64(&batches, 2)?,
            distinct_count: scalar_u64(&batches, 3, "distinct_count")?,
        })
    }

    async fn profile_text(
        &self,
        executor: &dyn QueryExecutor,
        table: &TableRef,
        column_name: &str,
        mode: &SamplingMode,
    ) -> Result<TextProfile> {
        let column = SqlSecurity::escape_identifier(column_name)?;
        let table_sql = table.to_sql()?;
        let cap = self.config.max_sample_values;

        let count_sql = format!(
            "SELECT COUNT(DISTINCT {column}) AS distinct_count \
             FROM {table_sql} \
             WHERE {column} IS NOT NULL"
        );
        let total_distinct_count =
            scalar_u64(&self.run(executor, &count_sql).await?, 0, "distinct_count")?;

        let from = mode.from_clause(&table_sql, executor.dialect());
        let values_sql = format!(
            "SELECT DISTINCT {column} \
             {from} \
             WHERE {column} IS NOT NULL \
             ORDER BY {column} \
             LIMIT {cap}"
        );
        let mut sample_values = collect_strings(&self.run(executor, &values_sql).await?, 0)?;
        if sample_values.len() > cap {
            return Err(CatalogError::invalid_data(format!(
                "Sample query returned {} values, expected at most {cap}",
                sample_values.len()
            )));
        }
        sample_values.dedup();

        Ok(TextProfile {
            sample_values,
            total_distinct_count,
            overflow: total_distinct_count > cap as u64,
        })
    }

    async fn profile_temporal(
        &self,
        executor: &dyn QueryExecutor,
        table: &TableRef,
        column_name: &str,
        mode: &SamplingMode,
    ) -> Result<TemporalProfile> {
        let column = SqlSecurity::escape_identifier(column_name)?;
        let from = mode.from_clause(&table.to_sql()?, executor.dialect());
        let sql = format!(
            "SELECT \
                MIN({column}) AS min_value, \
                MAX({column}) AS max_value, \
                COUNT(DISTINCT {column}) AS distinct_count \
             {from}"
        );

        let batches = self.run(executor, &sql).await?;
        Ok(TemporalProfile {
            min_value: scalar_string(&batches, 0)?,
            max_value: scalar_string(&batches, 1)?,
            distinct_count: scalar_u64(&batches, 2, "distinct_count")?,
        })
    }
}
