//! # Term Catalog - Warehouse Schema Cataloging for Rust
//!
//! Term Catalog builds a data dictionary for a warehouse schema. For every
//! column it reads the declared metadata, assigns a semantic role and a
//! business data type, collects a statistical profile under a sampling mode
//! chosen per table, and finally attaches a natural-language description.
//! Queries run through DataFusion, so any table registered with a
//! `SessionContext` can be cataloged.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use term_catalog::prelude::*;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let ctx = Arc::new(term_catalog::sources::catalog_session());
//! term_catalog::sources::register_sources(&ctx, &["data/*.csv".to_string()]).await?;
//!
//! let config = CatalogConfig::default();
//! let orchestrator = ProfilingOrchestrator::builder(config.clone()).build()?;
//! let metadata = InformationSchemaSource::new(ctx.clone());
//! let records = orchestrator
//!     .run(&*ctx, &metadata, &config.warehouse.schema, &[])
//!     .await?;
//!
//! let documenter = CatalogDocumenter::new(Arc::new(TemplateGenerator), config.documentation);
//! let catalog = Catalog::new(&config.warehouse.schema, documenter.document(records).await);
//! let path = write_catalog(&catalog, &config.output, FormatterConfig::default())?;
//! println!("Catalog written to {}", path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! 1. **Metadata**: [`metadata::MetadataSource`] lists tables and columns,
//!    by default from `information_schema`.
//! 2. **Sampling**: one row-count estimate per table selects a
//!    [`profiling::SamplingMode`] (full scan, percentage sample, fixed rows).
//! 3. **Classification**: [`profiling::ColumnClassifier`] applies ordered
//!    rules to name, declared type and nullability.
//! 4. **Profiling**: [`profiling::ColumnProfiler`] collects numeric, text or
//!    temporal statistics. A failing column is recorded, never fatal.
//! 5. **Documentation**: [`documentation::CatalogDocumenter`] adds table and
//!    column descriptions with validated fallbacks.
//! 6. **Output**: [`formatters`] render JSON, Markdown or plain text.
//!
//! ## Architecture
//!
//! - **`warehouse`**: the [`warehouse::QueryExecutor`] seam and Arrow value extraction
//! - **`metadata`**: column metadata types and sources
//! - **`profiling`**: sampling, classification, profiling and orchestration
//! - **`documentation`**: description generation and validation
//! - **`catalog`**, **`formatters`**, **`output`**: the final artifact
//! - **`sources`**: local CSV/TSV/Parquet/JSON files as tables
//! - **`config`**, **`logging`**, **`error`**, **`security`**: ambient concerns

pub mod catalog;
pub mod config;
pub mod documentation;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod metadata;
pub mod output;
pub mod prelude;
pub mod profiling;
pub mod security;
pub mod sources;
pub mod warehouse;
