//! Profiling orchestration.
//!
//! The orchestrator walks column metadata in order, estimates each table's
//! row count once, selects the table's [`SamplingMode`], profiles and
//! classifies every column, and returns exactly one
//! [`EnrichedColumnRecord`] per input column.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::logging::LogConfig;
use crate::metadata::{ColumnMetadata, MetadataSource, TableRef};
use crate::profiling::{
    ClassificationResult, ColumnClassifier, ColumnProfile, ColumnProfiler, CountStarEstimator,
    RowCountEstimator, SamplingMode,
};
use crate::warehouse::QueryExecutor;

/// Progress information emitted after each profiled column.
#[derive(Debug, Clone)]
pub struct ProfilerProgress {
    /// Columns processed so far, including this one
    pub current: usize,
    /// Columns in the run
    pub total: usize,
    pub table_name: String,
    pub column_name: String,
}

/// Callback invoked with [`ProfilerProgress`] updates.
pub type ProgressCallback = Arc<dyn Fn(ProfilerProgress) + Send + Sync>;

/// One column's metadata, classification, sampling mode and profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedColumnRecord {
    #[serde(flatten)]
    pub metadata: ColumnMetadata,
    #[serde(flatten)]
    pub classification: ClassificationResult,
    pub sampling: SamplingMode,
    pub profile: ColumnProfile,
}

/// Counts describing a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub tables: usize,
    pub columns: usize,
    pub sampled_tables: usize,
    pub failed_columns: usize,
    pub not_applicable_columns: usize,
}

impl RunSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a EnrichedColumnRecord>) -> Self {
        let mut tables = HashSet::new();
        let mut sampled = HashSet::new();
        let mut summary = RunSummary::default();
        for record in records {
            summary.columns += 1;
            tables.insert(record.metadata.table_name.as_str());
            if record.sampling.is_sampled() {
                sampled.insert(record.metadata.table_name.as_str());
            }
            if record.profile.is_failed() {
                summary.failed_columns += 1;
            }
            if record.profile.is_not_applicable() {
                summary.not_applicable_columns += 1;
            }
        }
        summary.tables = tables.len();
        summary.sampled_tables = sampled.len();
        summary
    }
}

/// Builder for [`ProfilingOrchestrator`].
pub struct ProfilingOrchestratorBuilder {
    config: CatalogConfig,
    estimator: Arc<dyn RowCountEstimator>,
    log: LogConfig,
    progress_callback: Option<ProgressCallback>,
}

impl ProfilingOrchestratorBuilder {
    /// Replaces the default `COUNT(*)` row-count estimator.
    pub fn row_count_estimator<E>(mut self, estimator: E) -> Self
    where
        E: RowCountEstimator + 'static,
    {
        self.estimator = Arc::new(estimator);
        self
    }

    pub fn log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Registers a callback invoked after each column.
    pub fn progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProfilerProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Validates the configuration and builds the orchestrator.
    pub fn build(self) -> Result<ProfilingOrchestrator> {
        self.config.validate()?;

        let classifier = ColumnClassifier::new(self.config.classification.clone())
            .with_match_logging(self.log.log_classification);
        let profiler = ColumnProfiler::builder()
            .config(self.config.profiling.clone())
            .log_config(self.log)
            .build();

        Ok(ProfilingOrchestrator {
            config: self.config,
            classifier,
            profiler,
            estimator: self.estimator,
            progress_callback: self.progress_callback,
        })
    }
}

/// Drives metadata reading, classification and profiling for a schema.
pub struct ProfilingOrchestrator {
    config: CatalogConfig,
    classifier: ColumnClassifier,
    profiler: ColumnProfiler,
    estimator: Arc<dyn RowCountEstimator>,
    progress_callback: Option<ProgressCallback>,
}

impl ProfilingOrchestrator {
    pub fn builder(config: CatalogConfig) -> ProfilingOrchestratorBuilder {
        ProfilingOrchestratorBuilder {
            config,
            estimator: Arc::new(CountStarEstimator),
            log: LogConfig::default(),
            progress_callback: None,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn classifier(&self) -> &ColumnClassifier {
        &self.classifier
    }

    /// Reads metadata for `tables` (all base tables of `schema` when empty)
    /// and profiles every column.
    ///
    /// Fails with [`CatalogError::NoUsableMetadata`] when no column metadata
    /// can be read.
    #[instrument(skip_all, fields(schema = %schema, source = %metadata.description()))]
    pub async fn run(
        &self,
        executor: &dyn QueryExecutor,
        metadata: &dyn MetadataSource,
        schema: &str,
        tables: &[String],
    ) -> Result<Vec<EnrichedColumnRecord>> {
        let requested = if tables.is_empty() {
            let listed = metadata.list_tables(schema).await?;
            info!(tables = listed.len(), "Discovered tables");
            if listed.is_empty() {
                return Err(CatalogError::no_usable_metadata(schema, tables));
            }
            listed
        } else {
            tables.to_vec()
        };

        let columns = metadata.columns(schema, &requested).await?;
        if columns.is_empty() {
            return Err(CatalogError::no_usable_metadata(schema, tables));
        }
        info!(
            tables = requested.len(),
            columns = columns.len(),
            "Read column metadata"
        );

        Ok(self.profile_metadata(executor, schema, &columns).await)
    }

    /// Classifies and profiles already-read metadata.
    ///
    /// Always returns one record per input column, in input order.
    pub async fn profile_metadata(
        &self,
        executor: &dyn QueryExecutor,
        schema: &str,
        columns: &[ColumnMetadata],
    ) -> Vec<EnrichedColumnRecord> {
        let total = columns.len();
        let mut modes: HashMap<&str, SamplingMode> = HashMap::new();
        let mut records = Vec::with_capacity(total);

        for (idx, column) in columns.iter().enumerate() {
            let table = self.table_ref(schema, &column.table_name);

            let mode = match modes.get(column.table_name.as_str()) {
                Some(mode) => *mode,
                None => {
                    let mode = self.sampling_mode(executor, &table).await;
                    modes.insert(column.table_name.as_str(), mode);
                    mode
                }
            };

            let classification = self.classifier.classify(column);
            let profile = self
                .profiler
                .profile_column(executor, &table, column, &mode)
                .await;
            debug!(
                table = %column.table_name,
                column = %column.column_name,
                role = %classification.role,
                business_type = %classification.business_type,
                failed = profile.is_failed(),
                "Column processed"
            );

            records.push(EnrichedColumnRecord {
                metadata: column.clone(),
                classification,
                sampling: mode,
                profile,
            });
            self.report_progress(idx + 1, total, column);
        }

        let summary = RunSummary::from_records(&records);
        info!(
            tables = summary.tables,
            columns = summary.columns,
            sampled_tables = summary.sampled_tables,
            failed = summary.failed_columns,
            not_applicable = summary.not_applicable_columns,
            "Profiling completed"
        );
        records
    }

    fn table_ref(&self, schema: &str, table: &str) -> TableRef {
        TableRef::new(schema, table).with_catalog(self.config.warehouse.catalog.clone())
    }

    async fn sampling_mode(&self, executor: &dyn QueryExecutor, table: &TableRef) -> SamplingMode {
        let estimate = match self.estimator.estimate(executor, table).await {
            Ok(rows) => Some(rows),
            Err(e) => {
                warn!(
                    table = %table,
                    error = %e,
                    fallback_rows = self.config.sampling.unknown_row_count,
                    "Row count estimation failed, assuming a large table"
                );
                None
            }
        };
        let mode = self.config.sampling.select(estimate);
        info!(table = %table, rows = ?estimate, mode = %mode, "Selected sampling mode");
        mode
    }

    fn report_progress(&self, current: usize, total: usize, column: &ColumnMetadata) {
        if let Some(callback) = &self.progress_callback {
            callback(ProfilerProgress {
                current,
                total,
                table_name: column.table_name.clone(),
                column_name: column.column_name.clone(),
            });
        }
    }
}
