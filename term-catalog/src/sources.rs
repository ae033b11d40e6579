//! Local file sources for cataloging files with DataFusion.
//!
//! Each file becomes one table named after the file stem, keeping its case
//! (`data/ORDERS.csv` is table `ORDERS`). Supported extensions: `.csv`,
//! `.tsv`, `.parquet`, `.json` and `.ndjson` (newline-delimited JSON).
//! Glob patterns are expanded before registration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use datafusion::datasource::file_format::csv::CsvFormat;
use datafusion::datasource::file_format::json::JsonFormat;
use datafusion::datasource::file_format::parquet::ParquetFormat;
use datafusion::datasource::file_format::FileFormat as DataFusionFileFormat;
use datafusion::datasource::listing::{
    ListingOptions, ListingTable, ListingTableConfig, ListingTableUrl,
};
use datafusion::prelude::{SessionConfig, SessionContext};
use datafusion::sql::TableReference;
use tracing::{info, instrument};

use crate::error::{CatalogError, Result};

/// Creates a session with `information_schema` enabled, as required by
/// [`InformationSchemaSource`](crate::metadata::InformationSchemaSource).
pub fn catalog_session() -> SessionContext {
    SessionContext::new_with_config(SessionConfig::new().with_information_schema(true))
}

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Tsv,
    Parquet,
    Json,
}

impl FileFormat {
    /// Detects the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "tsv" => Ok(FileFormat::Tsv),
            "parquet" => Ok(FileFormat::Parquet),
            "json" | "ndjson" => Ok(FileFormat::Json),
            _ => Err(CatalogError::data_source(
                "file",
                format!("Unsupported file type: {}", path.display()),
            )),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            FileFormat::Csv => "CSV",
            FileFormat::Tsv => "TSV",
            FileFormat::Parquet => "Parquet",
            FileFormat::Json => "JSON",
        }
    }

    fn listing_format(&self) -> Arc<dyn DataFusionFileFormat> {
        match self {
            FileFormat::Csv => Arc::new(CsvFormat::default().with_has_header(true)),
            FileFormat::Tsv => Arc::new(
                CsvFormat::default()
                    .with_has_header(true)
                    .with_delimiter(b'\t'),
            ),
            FileFormat::Parquet => Arc::new(ParquetFormat::default()),
            FileFormat::Json => Arc::new(JsonFormat::default()),
        }
    }
}

/// A single file registered as one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    pub path: PathBuf,
    pub table_name: String,
    pub format: FileFormat,
}

impl FileSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = FileFormat::from_path(&path)?;
        let table_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                CatalogError::data_source(
                    format.name(),
                    format!("Cannot derive a table name from {}", path.display()),
                )
            })?
            .to_string();
        Ok(Self {
            path,
            table_name,
            format,
        })
    }

    /// Overrides the table name derived from the file stem.
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Registers the file with `ctx` as a base table.
    #[instrument(skip_all, fields(table = %self.table_name, format = self.format.name()))]
    pub async fn register(&self, ctx: &SessionContext) -> Result<()> {
        let path = self.path.to_str().ok_or_else(|| {
            CatalogError::data_source(self.format.name(), "Path contains invalid UTF-8")
        })?;
        let extension = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();

        let table_url = ListingTableUrl::parse(path)?;
        let options =
            ListingOptions::new(self.format.listing_format()).with_file_extension(extension);
        let config = ListingTableConfig::new(table_url)
            .with_listing_options(options)
            .infer_schema(&ctx.state())
            .await
            .map_err(|e| {
                CatalogError::data_source_with_source(
                    self.format.name(),
                    format!("Failed to read schema of {}", self.path.display()),
                    Box::new(e),
                )
            })?;
        let table = ListingTable::try_new(config)?;

        ctx.register_table(TableReference::bare(self.table_name.as_str()), Arc::new(table))?;
        info!(path = %self.path.display(), "Registered file source");
        Ok(())
    }
}

/// Expands paths and glob patterns into file sources.
///
/// Fails when a pattern is invalid, matches nothing, or when two files map
/// to the same table name.
pub fn expand_sources(patterns: &[String]) -> Result<Vec<FileSource>> {
    let mut sources = Vec::new();

    for pattern in patterns {
        let matches = glob::glob(pattern).map_err(|e| {
            CatalogError::Configuration(format!("Invalid glob pattern '{pattern}': {e}"))
        })?;

        let mut matched = false;
        for entry in matches {
            let path = entry.map_err(|e| CatalogError::Io(std::io::Error::from(e)))?;
            if path.is_file() {
                sources.push(FileSource::from_path(path)?);
                matched = true;
            }
        }
        if !matched {
            return Err(CatalogError::data_source(
                "file",
                format!("No files found matching '{pattern}'"),
            ));
        }
    }

    let mut seen = HashSet::new();
    for source in &sources {
        if !seen.insert(source.table_name.as_str()) {
            return Err(CatalogError::data_source(
                "file",
                format!("More than one file maps to table '{}'", source.table_name),
            ));
        }
    }

    Ok(sources)
}

/// Expands `patterns` and registers every file with `ctx`. Returns the
/// registered table names in registration order.
pub async fn register_sources(ctx: &SessionContext, patterns: &[String]) -> Result<Vec<String>> {
    let sources = expand_sources(patterns)?;
    let mut tables = Vec::with_capacity(sources.len());
    for source in &sources {
        source.register(ctx).await?;
        tables.push(source.table_name.clone());
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{InformationSchemaSource, MetadataSource};
    use crate::warehouse::QueryExecutor;
    use tempfile::TempDir;

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_path(Path::new("a.CSV")).unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_path(Path::new("a.tsv")).unwrap(), FileFormat::Tsv);
        assert_eq!(
            FileFormat::from_path(Path::new("a.ndjson")).unwrap(),
            FileFormat::Json
        );
        assert!(FileFormat::from_path(Path::new("a.xlsx")).is_err());
        assert!(FileFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_table_name_keeps_case() {
        let source = FileSource::from_path("/data/ORDERS.csv").unwrap();
        assert_eq!(source.table_name, "ORDERS");
        assert_eq!(source.with_table_name("orders_v2").table_name, "orders_v2");
    }

    #[test]
    fn test_expand_sources_rejects_duplicates_and_empty_matches() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::create_dir(dir.path().join("b")).unwrap();
        std::fs::write(dir.path().join("a/T.csv"), "x\n1\n").unwrap();
        std::fs::write(dir.path().join("b/T.csv"), "x\n1\n").unwrap();

        let pattern = format!("{}/*/T.csv", dir.path().display());
        assert!(expand_sources(&[pattern]).is_err());

        let missing = format!("{}/*.parquet", dir.path().display());
        assert!(expand_sources(&[missing]).is_err());
    }

    #[tokio::test]
    async fn test_register_csv_and_read_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CUSTOMERS.csv");
        std::fs::write(&path, "CUSTOMER_SK,CUSTOMER_NAME\n1,Ada\n2,Grace\n").unwrap();

        let ctx = catalog_session();
        let tables = register_sources(&ctx, &[path.display().to_string()])
            .await
            .unwrap();
        assert_eq!(tables, vec!["CUSTOMERS"]);

        let batches = ctx
            .execute("SELECT COUNT(*) FROM \"CUSTOMERS\"")
            .await
            .unwrap();
        assert_eq!(batches[0].num_rows(), 1);

        let source = InformationSchemaSource::new(Arc::new(ctx));
        let columns = source.columns("public", &[]).await.unwrap();
        let names: Vec<_> = columns.iter().map(|c| c.column_name.as_str()).collect();
        assert_eq!(names, vec!["CUSTOMER_SK", "CUSTOMER_NAME"]);
    }
}
