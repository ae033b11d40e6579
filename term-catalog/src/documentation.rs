//! Natural-language documentation of profiled columns.
//!
//! [`CatalogDocumenter`] turns [`EnrichedColumnRecord`]s into
//! [`CatalogEntry`]s. For each table it asks a [`DocumentationGenerator`]
//! for one table description and then for column descriptions in batches.
//! Generated text is cleaned and validated; anything missing, failing or
//! out of bounds is replaced by a fixed fallback, so documenting never
//! fails and never drops a column.
//!
//! [`TemplateGenerator`] is a deterministic offline generator built from
//! the classification and profile of each column. Text-generation services
//! plug in by implementing [`DocumentationGenerator`].

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::catalog::{group_by_table, CatalogEntry};
use crate::error::{CatalogError, Result};
use crate::profiling::{
    BusinessDataType, ColumnProfile, EnrichedColumnRecord, ProfilingConfig, SemanticRole,
};
use crate::security::InputValidator;

/// Leading list markers (`-`, `•`, `*`, `1.`, `2)`) on generated lines.
#[allow(clippy::expect_used)]
static LIST_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[-•*]|\d+[.)])\s*").expect("Failed to compile list marker regex")
});

/// Limits for the documentation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentationConfig {
    /// Columns described per generator call
    pub batch_size: usize,
    /// Shortest accepted description, in characters
    pub min_description_length: usize,
    /// Longest accepted description, in characters
    pub max_description_length: usize,
    /// Columns included in the table-description context
    pub max_context_columns: usize,
    /// Longest profile summary passed as context, in characters
    pub max_sample_values_length: usize,
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            min_description_length: 20,
            max_description_length: 200,
            max_context_columns: 10,
            max_sample_values_length: 100,
        }
    }
}

impl DocumentationConfig {
    pub fn validate(&self) -> Result<()> {
        InputValidator::validate_positive(self.batch_size as u64, "documentation.batch_size")?;
        if self.min_description_length > self.max_description_length {
            return Err(CatalogError::Configuration(format!(
                "documentation.min_description_length ({}) exceeds max_description_length ({})",
                self.min_description_length, self.max_description_length
            )));
        }
        Ok(())
    }
}

/// What a generator sees about one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnContext {
    pub column_name: String,
    pub data_type: String,
    pub role: SemanticRole,
    pub business_data_type: BusinessDataType,
    /// Rendered profile (sample values or value range), if any
    pub profile_summary: Option<String>,
}

/// What a generator sees about one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableContext {
    pub table_name: String,
    pub column_count: usize,
    /// The first `max_context_columns` columns
    pub columns: Vec<ColumnContext>,
}

/// Produces table and column descriptions.
#[async_trait]
pub trait DocumentationGenerator: Send + Sync {
    /// Describes a table in one or two sentences.
    async fn describe_table(&self, table: &TableContext) -> Result<String>;

    /// Describes a batch of columns, one description per line, in batch
    /// order. Lines may carry list markers.
    async fn describe_columns(
        &self,
        table_name: &str,
        table_description: &str,
        columns: &[ColumnContext],
    ) -> Result<String>;

    /// Generator name for logs.
    fn name(&self) -> &str;
}

/// Deterministic generator deriving descriptions from classifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateGenerator;

fn humanize(identifier: &str) -> String {
    identifier.to_lowercase().replace('_', " ").trim().to_string()
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl TemplateGenerator {
    fn describe_column(&self, table_name: &str, column: &ColumnContext) -> String {
        let table = humanize(table_name);
        let name = &column.column_name;
        let detail = column
            .profile_summary
            .as_deref()
            .map(|s| format!(" ({})", single_line(s)))
            .unwrap_or_default();

        match (column.role, column.business_data_type) {
            (SemanticRole::PrimaryKey, _) => {
                format!("Surrogate key {name} uniquely identifying each {table} record.")
            }
            (SemanticRole::ForeignKey, _) => {
                let lower = name.to_lowercase();
                let entity = humanize(lower.strip_suffix("_sk").unwrap_or(&lower));
                format!("Reference from {table} to the related {entity} record via {name}.")
            }
            (_, BusinessDataType::Currency) => {
                format!("Monetary amount recorded in {name}{detail}.")
            }
            (_, BusinessDataType::Quantity) => {
                format!("Quantity or count recorded in {name}{detail}.")
            }
            (_, BusinessDataType::Date) => format!("Date or time attribute {name}{detail}."),
            (_, BusinessDataType::Description) => {
                format!("Descriptive label {name} of the {table} record{detail}.")
            }
            (_, BusinessDataType::Text) => format!("Categorical attribute {name}{detail}."),
            _ => format!("Numeric attribute {name}{detail}."),
        }
    }
}

#[async_trait]
impl DocumentationGenerator for TemplateGenerator {
    async fn describe_table(&self, table: &TableContext) -> Result<String> {
        let mut description = format!(
            "Records of {} with {} columns",
            humanize(&table.table_name),
            table.column_count
        );

        let keys: Vec<&str> = table
            .columns
            .iter()
            .filter(|c| c.role == SemanticRole::PrimaryKey)
            .map(|c| c.column_name.as_str())
            .collect();
        if !keys.is_empty() {
            description.push_str(&format!(", identified by {}", keys.join(", ")));
        }

        let measures: Vec<&str> = table
            .columns
            .iter()
            .filter(|c| c.role == SemanticRole::Measure)
            .map(|c| c.column_name.as_str())
            .collect();
        if !measures.is_empty() {
            description.push_str(&format!(", measuring {}", measures.join(", ")));
        }

        description.push('.');
        Ok(description)
    }

    async fn describe_columns(
        &self,
        table_name: &str,
        _table_description: &str,
        columns: &[ColumnContext],
    ) -> Result<String> {
        Ok(columns
            .iter()
            .map(|c| format!("- {}", self.describe_column(table_name, c)))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn name(&self) -> &str {
        "template"
    }
}

/// Runs the documentation stage over enriched records.
pub struct CatalogDocumenter {
    generator: Arc<dyn DocumentationGenerator>,
    config: DocumentationConfig,
    profiling: ProfilingConfig,
}

impl CatalogDocumenter {
    pub fn new(generator: Arc<dyn DocumentationGenerator>, config: DocumentationConfig) -> Self {
        Self {
            generator,
            config,
            profiling: ProfilingConfig::default(),
        }
    }

    /// Sets the limits and precision used to render profiles into context.
    pub fn with_profiling_config(mut self, profiling: ProfilingConfig) -> Self {
        self.profiling = profiling;
        self
    }

    /// Documents every record; the output has one entry per input record,
    /// grouped by table in order of first appearance.
    #[instrument(skip_all, fields(generator = self.generator.name(), records = records.len()))]
    pub async fn document(&self, records: Vec<EnrichedColumnRecord>) -> Vec<CatalogEntry> {
        let mut entries = Vec::with_capacity(records.len());

        for (table_name, table_records) in group_by_table(&records, |r| r.metadata.table_name.as_str()) {
            let contexts: Vec<ColumnContext> =
                table_records.iter().map(|r| self.context(r)).collect();

            let table_description = self.table_description(table_name, &contexts).await;
            let column_descriptions = self
                .column_descriptions(table_name, &table_description, &contexts)
                .await;

            for (record, column_description) in table_records.into_iter().zip(column_descriptions)
            {
                entries.push(CatalogEntry {
                    record: record.clone(),
                    table_description: table_description.clone(),
                    column_description,
                });
            }
            info!(table = table_name, columns = contexts.len(), "Documented table");
        }

        entries
    }

    fn context(&self, record: &EnrichedColumnRecord) -> ColumnContext {
        let summary = match &record.profile {
            ColumnProfile::Text(p) => Some(p.summary(&self.profiling)),
            ColumnProfile::Numeric(p) => match (p.min_value, p.max_value) {
                (Some(min), Some(max)) => Some(format!(
                    "range {} to {}",
                    self.profiling.format_numeric(min),
                    self.profiling.format_numeric(max)
                )),
                _ => None,
            },
            ColumnProfile::Temporal(p) => match (&p.min_value, &p.max_value) {
                (Some(min), Some(max)) => Some(format!("range {min} to {max}")),
                _ => None,
            },
            ColumnProfile::NotApplicable { .. } | ColumnProfile::Failed { .. } => None,
        };

        ColumnContext {
            column_name: record.metadata.column_name.clone(),
            data_type: record.metadata.data_type.clone(),
            role: record.classification.role,
            business_data_type: record.classification.business_type,
            profile_summary: summary
                .filter(|s| !s.is_empty())
                .map(|s| truncate_with_ellipsis(&s, self.config.max_sample_values_length)),
        }
    }

    async fn table_description(&self, table_name: &str, columns: &[ColumnContext]) -> String {
        let fallback = || format!("Business data table containing {} data elements.", columns.len());
        let context = TableContext {
            table_name: table_name.to_string(),
            column_count: columns.len(),
            columns: columns
                .iter()
                .take(self.config.max_context_columns)
                .cloned()
                .collect(),
        };

        match self.generator.describe_table(&context).await {
            Ok(text) => {
                let text = text.trim().to_string();
                if self.is_valid(&text) {
                    text
                } else {
                    warn!(table = table_name, "Generated table description failed validation");
                    fallback()
                }
            }
            Err(e) => {
                warn!(table = table_name, error = %e, "Table description generation failed");
                fallback()
            }
        }
    }

    async fn column_descriptions(
        &self,
        table_name: &str,
        table_description: &str,
        columns: &[ColumnContext],
    ) -> Vec<String> {
        let fallback = |c: &ColumnContext| format!("Data field: {}", c.column_name);
        let mut descriptions = Vec::with_capacity(columns.len());

        for batch in columns.chunks(self.config.batch_size.max(1)) {
            let lines = match self
                .generator
                .describe_columns(table_name, table_description, batch)
                .await
            {
                Ok(text) => self.clean_lines(&text),
                Err(e) => {
                    warn!(
                        table = table_name,
                        batch = batch.len(),
                        error = %e,
                        "Column description generation failed"
                    );
                    Vec::new()
                }
            };

            for (idx, column) in batch.iter().enumerate() {
                let description = match lines.get(idx) {
                    Some(line) if self.is_valid(line) => line.clone(),
                    Some(_) => {
                        warn!(
                            table = table_name,
                            column = %column.column_name,
                            "Generated column description failed validation"
                        );
                        fallback(column)
                    }
                    None => fallback(column),
                };
                descriptions.push(description);
            }
        }

        descriptions
    }

    /// Splits a generator response into descriptions: list markers are
    /// removed, blank lines dropped and long lines shortened to the maximum
    /// length.
    fn clean_lines(&self, text: &str) -> Vec<String> {
        text.lines()
            .map(|line| LIST_MARKER.replace(line.trim(), "").trim().to_string())
            .filter(|line| !line.is_empty())
            .map(|line| truncate_with_ellipsis(&line, self.config.max_description_length))
            .collect()
    }

    fn is_valid(&self, description: &str) -> bool {
        let len = description.chars().count();
        len >= self.config.min_description_length && len <= self.config.max_description_length
    }
}

/// Shortens `text` to at most `max` characters, ending in `...` when cut.
fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let cut: String = text.chars().take(keep).collect();
    format!("{cut}...")
}
