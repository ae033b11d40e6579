//! Metadata reading: which tables exist and what their columns look like.

mod information_schema;
mod types;

pub use information_schema::InformationSchemaSource;
pub use types::{ColumnMetadata, TableRef, TypeCategory};

use async_trait::async_trait;

use crate::error::Result;

/// A source of column metadata for a warehouse schema.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Lists the base tables of a schema, sorted by name.
    async fn list_tables(&self, schema: &str) -> Result<Vec<String>>;

    /// Returns column metadata for `tables`, or for every table of the schema
    /// when `tables` is empty.
    ///
    /// Rows are grouped by table and ordered by ordinal position within a
    /// table. Unknown tables contribute no rows.
    async fn columns(&self, schema: &str, tables: &[String]) -> Result<Vec<ColumnMetadata>>;

    /// Short human-readable description for logs.
    fn description(&self) -> String;
}

/// In-memory metadata, for callers that already hold column definitions.
///
/// The schema argument is ignored; every row belongs to the one schema the
/// source was built for.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataSource {
    columns: Vec<ColumnMetadata>,
}

impl StaticMetadataSource {
    pub fn new(mut columns: Vec<ColumnMetadata>) -> Self {
        columns.sort_by(|a, b| {
            a.table_name
                .cmp(&b.table_name)
                .then(a.ordinal_position.cmp(&b.ordinal_position))
        });
        Self { columns }
    }
}

#[async_trait]
impl MetadataSource for StaticMetadataSource {
    async fn list_tables(&self, _schema: &str) -> Result<Vec<String>> {
        let mut tables: Vec<String> = self.columns.iter().map(|c| c.table_name.clone()).collect();
        tables.dedup();
        Ok(tables)
    }

    async fn columns(&self, _schema: &str, tables: &[String]) -> Result<Vec<ColumnMetadata>> {
        Ok(self
            .columns
            .iter()
            .filter(|c| tables.is_empty() || tables.contains(&c.table_name))
            .cloned()
            .collect())
    }

    fn description(&self) -> String {
        format!("static metadata ({} columns)", self.columns.len())
    }
}
