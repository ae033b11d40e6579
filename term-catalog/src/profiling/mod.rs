//! The profiling and classification engine.
//!
//! - [`SamplingConfig`] maps a row-count estimate to a [`SamplingMode`].
//! - [`ColumnClassifier`] assigns a [`SemanticRole`] and
//!   [`BusinessDataType`] from metadata alone.
//! - [`ColumnProfiler`] collects a [`ColumnProfile`] under a sampling mode.
//! - [`ProfilingOrchestrator`] ties them together into
//!   [`EnrichedColumnRecord`]s.

mod classifier;
mod orchestrator;
mod profiler;
mod row_count;
mod sampling;

pub use classifier::{
    BusinessDataType, ClassificationFallback, ClassificationResult, ClassificationRule,
    ClassificationRules, ColumnClassifier, RulePredicate, SemanticRole,
};
pub use orchestrator::{
    EnrichedColumnRecord, ProfilerProgress, ProfilingOrchestrator, ProfilingOrchestratorBuilder,
    ProgressCallback, RunSummary,
};
pub use profiler::{
    ColumnProfile, ColumnProfiler, ColumnProfilerBuilder, NumericProfile, ProfilingConfig,
    TemporalProfile, TextProfile,
};
pub use row_count::{CountStarEstimator, RowCountEstimator};
pub use sampling::{SamplingConfig, SamplingMode};
