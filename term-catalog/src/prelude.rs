//! Prelude for commonly used types and traits in term-catalog.

pub use crate::catalog::{Catalog, CatalogEntry};
pub use crate::config::CatalogConfig;
pub use crate::documentation::{CatalogDocumenter, DocumentationGenerator, TemplateGenerator};
pub use crate::error::{CatalogError, ErrorContext, Result};
pub use crate::formatters::{CatalogFormatter, FormatterConfig, OutputFormat};
pub use crate::logging::LogConfig;
pub use crate::metadata::{ColumnMetadata, InformationSchemaSource, MetadataSource, TableRef};
pub use crate::output::write_catalog;
pub use crate::profiling::{
    ClassificationResult, ColumnClassifier, ColumnProfile, EnrichedColumnRecord,
    ProfilingOrchestrator, SamplingMode,
};
pub use crate::warehouse::QueryExecutor;
