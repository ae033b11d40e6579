//! Run configuration.
//!
//! [`CatalogConfig`] is an explicit value handed to the components that
//! need it; nothing reads configuration from process-wide state. Every
//! section deserializes with defaults, so a config file only lists what it
//! overrides:
//!
//! ```json
//! {
//!   "warehouse": { "schema": "sales" },
//!   "sampling": { "fixed_sample_rows": 5000 },
//!   "output": { "format": "markdown" }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::documentation::DocumentationConfig;
use crate::error::{CatalogError, Result};
use crate::formatters::OutputFormat;
use crate::profiling::{ClassificationRules, ProfilingConfig, SamplingConfig};

/// Where the warehouse objects live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    /// Schema to catalog
    pub schema: String,
    /// Catalog (database) qualifying table references, if any
    pub catalog: Option<String>,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            schema: "public".to_string(),
            catalog: None,
        }
    }
}

/// Where and how the catalog file is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub format: OutputFormat,
    /// File name prefix; a `_YYYYmmdd_HHMMSS` timestamp is appended
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./outputs"),
            format: OutputFormat::Json,
            file_prefix: "final_data_dictionary".to_string(),
        }
    }
}

/// Complete configuration of a catalog run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub warehouse: WarehouseConfig,
    pub sampling: SamplingConfig,
    pub profiling: ProfilingConfig,
    pub classification: ClassificationRules,
    pub documentation: DocumentationConfig,
    pub output: OutputConfig,
}

impl CatalogConfig {
    /// Loads and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::Configuration(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        let config = Self::from_json(&contents)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CatalogError::Configuration(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section for inconsistent values.
    pub fn validate(&self) -> Result<()> {
        if self.warehouse.schema.trim().is_empty() {
            return Err(CatalogError::Configuration(
                "warehouse.schema cannot be empty".to_string(),
            ));
        }
        self.sampling.validate()?;
        self.profiling.validate()?;
        self.classification.validate()?;
        self.documentation.validate()?;
        Ok(())
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.warehouse.schema = schema.into();
        self
    }

    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.warehouse.catalog = Some(catalog.into());
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_profiling(mut self, profiling: ProfilingConfig) -> Self {
        self.profiling = profiling;
        self
    }

    pub fn with_classification(mut self, rules: ClassificationRules) -> Self {
        self.classification = rules;
        self
    }

    pub fn with_documentation(mut self, documentation: DocumentationConfig) -> Self {
        self.documentation = documentation;
        self
    }

    pub fn with_output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output.directory = directory.into();
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output.format = format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.warehouse.schema, "public");
        assert_eq!(config.sampling.fixed_sample_rows, 1_000);
        assert_eq!(config.profiling.max_sample_values, 50);
        assert_eq!(config.documentation.batch_size, 10);
        assert_eq!(config.output.directory, PathBuf::from("./outputs"));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = CatalogConfig::from_json(
            r#"{
                "warehouse": { "schema": "sales" },
                "sampling": { "fixed_sample_rows": 5000 },
                "output": { "format": "markdown" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.warehouse.schema, "sales");
        assert_eq!(config.sampling.fixed_sample_rows, 5000);
        assert_eq!(config.sampling.full_scan_below, 10_000);
        assert_eq!(config.output.format, OutputFormat::Markdown);
        assert_eq!(config.classification.rules.len(), 6);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(CatalogConfig::from_json(r#"{"sampling": {"bernoulli_percent": 0}}"#).is_err());
        assert!(CatalogConfig::from_json(r#"{"warehouse": {"schema": " "}}"#).is_err());
        assert!(CatalogConfig::from_json(r#"{"documentation": {"batch_size": 0}}"#).is_err());
        assert!(CatalogConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"profiling": {{"max_sample_values": 20}}}}"#).unwrap();
        let config = CatalogConfig::from_file(file.path()).unwrap();
        assert_eq!(config.profiling.max_sample_values, 20);

        assert!(CatalogConfig::from_file("/nonexistent/config.json").is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = CatalogConfig::default()
            .with_schema("sales")
            .with_catalog("dw")
            .with_output_format(OutputFormat::Human)
            .with_output_directory("/tmp/catalog");
        assert_eq!(config.warehouse.catalog.as_deref(), Some("dw"));
        assert_eq!(config.output.format, OutputFormat::Human);
    }
}
