//! The consolidated catalog produced by a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profiling::{EnrichedColumnRecord, RunSummary};

/// A profiled column together with its generated documentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub record: EnrichedColumnRecord,
    pub table_description: String,
    pub column_description: String,
}

impl CatalogEntry {
    pub fn table_name(&self) -> &str {
        &self.record.metadata.table_name
    }

    pub fn column_name(&self) -> &str {
        &self.record.metadata.column_name
    }
}

/// Entries of one table, borrowed from a [`Catalog`].
#[derive(Debug, Clone)]
pub struct CatalogTable<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub entries: Vec<&'a CatalogEntry>,
}

/// Every catalog entry of a schema, stamped with its generation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub generated_at: DateTime<Utc>,
    pub schema: String,
    pub summary: RunSummary,
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Builds a catalog stamped with the current time.
    pub fn new(schema: impl Into<String>, entries: Vec<CatalogEntry>) -> Self {
        Self::with_timestamp(schema, entries, Utc::now())
    }

    pub fn with_timestamp(
        schema: impl Into<String>,
        entries: Vec<CatalogEntry>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let summary = RunSummary::from_records(entries.iter().map(|e| &e.record));
        Self {
            generated_at,
            schema: schema.into(),
            summary,
            entries,
        }
    }

    /// Entries grouped by table, in order of first appearance.
    pub fn tables(&self) -> Vec<CatalogTable<'_>> {
        group_by_table(&self.entries, |e| e.table_name())
            .into_iter()
            .map(|(name, entries)| CatalogTable {
                name,
                description: entries
                    .first()
                    .map(|e| e.table_description.as_str())
                    .unwrap_or_default(),
                entries,
            })
            .collect()
    }
}

/// Groups items by table name, keeping first-appearance order of tables and
/// input order within a table.
pub fn group_by_table<'a, T, F>(items: &'a [T], table_of: F) -> Vec<(&'a str, Vec<&'a T>)>
where
    F: Fn(&'a T) -> &'a str,
{
    let mut groups: Vec<(&'a str, Vec<&'a T>)> = Vec::new();
    for item in items {
        let table = table_of(item);
        match groups.iter_mut().find(|(name, _)| *name == table) {
            Some((_, members)) => members.push(item),
            None => groups.push((table, vec![item])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ColumnMetadata;
    use crate::profiling::{
        BusinessDataType, ClassificationResult, ColumnProfile, SamplingMode, SemanticRole,
    };

    fn entry(table: &str, column: &str) -> CatalogEntry {
        CatalogEntry {
            record: EnrichedColumnRecord {
                metadata: ColumnMetadata::new(table, column, 1, "Int64", true),
                classification: ClassificationResult::new(
                    SemanticRole::Dimension,
                    BusinessDataType::Numeric,
                ),
                sampling: SamplingMode::Full,
                profile: ColumnProfile::NotApplicable {
                    data_type: "Int64".to_string(),
                },
            },
            table_description: format!("{table} description"),
            column_description: format!("{column} description"),
        }
    }

    #[test]
    fn test_group_by_table_keeps_order() {
        let entries = vec![entry("B", "x"), entry("A", "y"), entry("B", "z")];
        let groups = group_by_table(&entries, |e| e.table_name());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "B");
        assert_eq!(
            groups[0].1.iter().map(|e| e.column_name()).collect::<Vec<_>>(),
            vec!["x", "z"]
        );
        assert_eq!(groups[1].0, "A");
    }

    #[test]
    fn test_catalog_tables_and_summary() {
        let catalog = Catalog::new("public", vec![entry("A", "x"), entry("A", "y")]);
        let tables = catalog.tables();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].description, "A description");
        assert_eq!(catalog.summary.columns, 2);
        assert_eq!(catalog.summary.not_applicable_columns, 2);
    }

    #[test]
    fn test_catalog_json_round_trip() {
        let catalog = Catalog::new("public", vec![entry("A", "x")]);
        let json = serde_json::to_string(&catalog).unwrap();
        let parsed: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, catalog);
    }
}
