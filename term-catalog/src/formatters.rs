//! Catalog formatting.
//!
//! A [`Catalog`] can be rendered as JSON (the machine-readable record set),
//! as Markdown for documentation sites, or as plain text for terminals.
//!
//! # Examples
//!
//! ```rust
//! use term_catalog::catalog::Catalog;
//! use term_catalog::formatters::{CatalogFormatter, MarkdownFormatter};
//!
//! let catalog = Catalog::new("public", vec![]);
//! let output = MarkdownFormatter::new().format(&catalog).unwrap();
//! assert!(output.contains("Data Catalog: public"));
//! ```

use std::fmt::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogEntry};
use crate::error::{CatalogError, Result};
use crate::profiling::{ColumnProfile, ProfilingConfig, SemanticRole};

/// Output format of a catalog file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
    Human,
}

impl OutputFormat {
    /// File extension used for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
            OutputFormat::Human => "txt",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Human => "human",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "human" | "text" | "txt" => Ok(OutputFormat::Human),
            other => Err(CatalogError::Configuration(format!(
                "Unknown output format '{other}' (expected json, markdown or human)"
            ))),
        }
    }
}

/// Configuration options for formatting a catalog.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include per-column profile statistics
    pub include_profiles: bool,
    /// Include the sampling mode of each table
    pub include_sampling: bool,
    /// Include the run summary
    pub include_summary: bool,
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
    /// Limits used when rendering text profiles
    pub profiling: ProfilingConfig,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_profiles: true,
            include_sampling: true,
            include_summary: true,
            use_colors: false,
            profiling: ProfilingConfig::default(),
        }
    }
}

impl FormatterConfig {
    /// Descriptions only.
    pub fn minimal() -> Self {
        Self {
            include_profiles: false,
            include_sampling: false,
            include_summary: false,
            use_colors: false,
            profiling: ProfilingConfig::default(),
        }
    }

    pub fn with_profiles(mut self, include: bool) -> Self {
        self.include_profiles = include;
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn with_profiling(mut self, profiling: ProfilingConfig) -> Self {
        self.profiling = profiling;
        self
    }
}

/// Renders a [`Catalog`] as text.
pub trait CatalogFormatter {
    fn format(&self, catalog: &Catalog) -> Result<String>;
}

/// Returns the formatter for an output format.
pub fn formatter_for(format: OutputFormat, config: FormatterConfig) -> Box<dyn CatalogFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter::with_config(config)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter::with_config(config)),
        OutputFormat::Human => Box::new(HumanFormatter::with_config(config)),
    }
}

/// One-line rendering of a column profile.
pub fn describe_profile(profile: &ColumnProfile, config: &ProfilingConfig) -> String {
    fn text(value: &Option<String>) -> &str {
        value.as_deref().unwrap_or("-")
    }

    let num = |value: Option<f64>| {
        value.map_or_else(|| "-".to_string(), |v| config.format_numeric(v))
    };

    match profile {
        ColumnProfile::Numeric(p) => format!(
            "min {}, max {}, avg {}, {} distinct",
            num(p.min_value),
            num(p.max_value),
            num(p.avg_value),
            p.distinct_count
        ),
        ColumnProfile::Text(p) => p.summary(config),
        ColumnProfile::Temporal(p) => format!(
            "{} to {}, {} distinct",
            text(&p.min_value),
            text(&p.max_value),
            p.distinct_count
        ),
        ColumnProfile::NotApplicable { data_type } => format!("not profiled ({data_type})"),
        ColumnProfile::Failed { profiling_error } => format!("profiling failed: {profiling_error}"),
    }
}

fn render_error(e: fmt::Error) -> CatalogError {
    CatalogError::Internal(format!("Failed to render catalog: {e}"))
}

/// Formats the catalog as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::with_config(FormatterConfig::default())
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogFormatter for JsonFormatter {
    fn format(&self, catalog: &Catalog) -> Result<String> {
        let mut value = serde_json::to_value(catalog)?;

        if let Some(entries) = value.get_mut("entries").and_then(|v| v.as_array_mut()) {
            for entry in entries.iter_mut().filter_map(|e| e.as_object_mut()) {
                if !self.config.include_profiles {
                    entry.remove("profile");
                }
                if !self.config.include_sampling {
                    entry.remove("sampling");
                }
            }
        }
        if !self.config.include_summary {
            if let Some(object) = value.as_object_mut() {
                object.remove("summary");
            }
        }

        let output = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(output)
    }
}

/// Formats the catalog as plain text for terminals.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn bold(&self, text: &str) -> String {
        if self.config.use_colors {
            format!("\x1b[1m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn role(&self, entry: &CatalogEntry) -> String {
        let role = entry.record.classification.role.to_string();
        if !self.config.use_colors {
            return role;
        }
        match entry.record.classification.role {
            SemanticRole::PrimaryKey => format!("\x1b[33m{role}\x1b[0m"),
            SemanticRole::ForeignKey => format!("\x1b[36m{role}\x1b[0m"),
            SemanticRole::Measure => format!("\x1b[32m{role}\x1b[0m"),
            SemanticRole::Dimension => role,
        }
    }

    fn render(&self, catalog: &Catalog, out: &mut String) -> fmt::Result {
        writeln!(out, "{}", self.bold(&format!("Data Catalog: {}", catalog.schema)))?;
        writeln!(out, "Generated: {}", catalog.generated_at.to_rfc3339())?;

        if self.config.include_summary {
            let s = &catalog.summary;
            writeln!(
                out,
                "Tables: {}  Columns: {}  Sampled tables: {}  Failed: {}  Not profiled: {}",
                s.tables, s.columns, s.sampled_tables, s.failed_columns, s.not_applicable_columns
            )?;
        }

        for table in catalog.tables() {
            writeln!(out)?;
            writeln!(out, "{}", self.bold(table.name))?;
            writeln!(out, "  {}", table.description)?;
            if self.config.include_sampling {
                if let Some(first) = table.entries.first() {
                    writeln!(out, "  Sampling: {}", first.record.sampling)?;
                }
            }
            for entry in &table.entries {
                let metadata = &entry.record.metadata;
                writeln!(
                    out,
                    "  - {} ({}{}) [{} / {}]",
                    metadata.column_name,
                    metadata.data_type,
                    if metadata.is_nullable { "" } else { ", not null" },
                    self.role(entry),
                    entry.record.classification.business_type
                )?;
                writeln!(out, "      {}", entry.column_description)?;
                if self.config.include_profiles {
                    writeln!(
                        out,
                        "      {}",
                        describe_profile(&entry.record.profile, &self.config.profiling)
                    )?;
                }
            }
        }
        Ok(())
    }
}

impl CatalogFormatter for HumanFormatter {
    fn format(&self, catalog: &Catalog) -> Result<String> {
        let mut output = String::new();
        self.render(catalog, &mut output).map_err(render_error)?;
        Ok(output)
    }
}

/// Formats the catalog as Markdown, one section and table per database table.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self::with_config(FormatterConfig::default())
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 1,
        }
    }

    /// Sets the heading level of the document title (1-6).
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 6);
        self
    }

    fn render(&self, catalog: &Catalog, out: &mut String) -> fmt::Result {
        let h = "#".repeat(self.heading_level as usize);

        writeln!(out, "{h} Data Catalog: {}", catalog.schema)?;
        writeln!(out)?;
        writeln!(out, "**Generated:** {}", catalog.generated_at.to_rfc3339())?;

        if self.config.include_summary {
            let s = &catalog.summary;
            writeln!(out)?;
            writeln!(out, "| Metric | Value |")?;
            writeln!(out, "|--------|-------|")?;
            writeln!(out, "| Tables | {} |", s.tables)?;
            writeln!(out, "| Columns | {} |", s.columns)?;
            writeln!(out, "| Sampled tables | {} |", s.sampled_tables)?;
            writeln!(out, "| Failed profiles | {} |", s.failed_columns)?;
            writeln!(out, "| Not profiled | {} |", s.not_applicable_columns)?;
        }

        for table in catalog.tables() {
            writeln!(out)?;
            writeln!(out, "{h}# {}", table.name)?;
            writeln!(out)?;
            writeln!(out, "{}", escape_cell(table.description))?;
            if self.config.include_sampling {
                if let Some(first) = table.entries.first() {
                    writeln!(out)?;
                    writeln!(out, "*Sampling: {}*", first.record.sampling)?;
                }
            }
            writeln!(out)?;

            if self.config.include_profiles {
                writeln!(out, "| Column | Type | Role | Business Type | Description | Profile |")?;
                writeln!(out, "|--------|------|------|---------------|-------------|---------|")?;
            } else {
                writeln!(out, "| Column | Type | Role | Business Type | Description |")?;
                writeln!(out, "|--------|------|------|---------------|-------------|")?;
            }

            for entry in &table.entries {
                let metadata = &entry.record.metadata;
                write!(
                    out,
                    "| {} | {} | {} | {} | {} |",
                    escape_cell(&metadata.column_name),
                    escape_cell(&metadata.data_type),
                    entry.record.classification.role,
                    entry.record.classification.business_type,
                    escape_cell(&entry.column_description)
                )?;
                if self.config.include_profiles {
                    write!(
                        out,
                        " {} |",
                        escape_cell(&describe_profile(
                            &entry.record.profile,
                            &self.config.profiling
                        ))
                    )?;
                }
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogFormatter for MarkdownFormatter {
    fn format(&self, catalog: &Catalog) -> Result<String> {
        let mut output = String::new();
        self.render(catalog, &mut output).map_err(render_error)?;
        Ok(output)
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}
