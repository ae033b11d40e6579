use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{ColumnMetadata, MetadataSource};
use crate::config::WarehouseConfig;
use crate::error::{CatalogError, Result};
use crate::security::SqlSecurity;
use crate::warehouse::extract::{column_by_name, i64_values, required_column, string_values, u64_values};
use crate::warehouse::{QueryExecutor, SqlDialect};

/// Reads metadata from the ANSI `information_schema` views.
///
/// Works against DataFusion (with `information_schema` enabled on the
/// session) and against warehouses exposing the standard views. Column
/// comments are read only where the dialect provides them.
pub struct InformationSchemaSource {
    executor: Arc<dyn QueryExecutor>,
    catalog: Option<String>,
}

impl InformationSchemaSource {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            executor,
            catalog: None,
        }
    }

    /// Source scoped to the catalog profiling queries are qualified with.
    pub fn for_warehouse(executor: Arc<dyn QueryExecutor>, warehouse: &WarehouseConfig) -> Self {
        let source = Self::new(executor);
        match &warehouse.catalog {
            Some(catalog) => source.with_catalog(catalog.clone()),
            None => source,
        }
    }

    /// Restricts lookups to one catalog (database).
    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    fn filters(&self, schema: &str, tables: &[String]) -> String {
        let mut filters = vec![format!("table_schema = {}", SqlSecurity::quote_literal(schema))];
        if let Some(catalog) = &self.catalog {
            filters.push(format!("table_catalog = {}", SqlSecurity::quote_literal(catalog)));
        }
        if !tables.is_empty() {
            let list = tables
                .iter()
                .map(|t| SqlSecurity::quote_literal(t))
                .collect::<Vec<_>>()
                .join(", ");
            filters.push(format!("table_name IN ({list})"));
        }
        filters.join(" AND ")
    }

    pub(crate) fn columns_sql(&self, schema: &str, tables: &[String]) -> String {
        let comment = match self.executor.dialect() {
            SqlDialect::Snowflake => ", comment",
            SqlDialect::DataFusion => "",
        };
        format!(
            "SELECT table_name, column_name, ordinal_position, is_nullable, data_type, \
             column_default, character_maximum_length, numeric_precision, numeric_scale{comment} \
             FROM information_schema.columns \
             WHERE {} \
             ORDER BY table_name, ordinal_position",
            self.filters(schema, tables)
        )
    }
}

#[async_trait]
impl MetadataSource for InformationSchemaSource {
    #[instrument(skip(self))]
    async fn list_tables(&self, schema: &str) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT table_name FROM information_schema.tables \
             WHERE {} AND table_type <> 'VIEW' \
             ORDER BY table_name",
            self.filters(schema, &[])
        );
        let batches = self.executor.execute(&sql).await?;

        let mut tables = Vec::new();
        for batch in &batches {
            let names = string_values(required_column(batch, "table_name")?)?;
            tables.extend(names.into_iter().flatten());
        }
        debug!(schema, tables = tables.len(), "Listed tables");
        Ok(tables)
    }

    #[instrument(skip(self, tables), fields(requested = tables.len()))]
    async fn columns(&self, schema: &str, tables: &[String]) -> Result<Vec<ColumnMetadata>> {
        let sql = self.columns_sql(schema, tables);
        let batches = self.executor.execute(&sql).await?;

        let mut columns = Vec::new();
        for batch in &batches {
            let table_names = string_values(required_column(batch, "table_name")?)?;
            let column_names = string_values(required_column(batch, "column_name")?)?;
            let ordinals = u64_values(required_column(batch, "ordinal_position")?)?;
            let nullables = string_values(required_column(batch, "is_nullable")?)?;
            let data_types = string_values(required_column(batch, "data_type")?)?;
            let defaults = string_values(required_column(batch, "column_default")?)?;
            let max_lengths = u64_values(required_column(batch, "character_maximum_length")?)?;
            let precisions = u64_values(required_column(batch, "numeric_precision")?)?;
            let scales = i64_values(required_column(batch, "numeric_scale")?)?;
            let comments = match column_by_name(batch, "comment") {
                Some(array) => string_values(array)?,
                None => vec![None; batch.num_rows()],
            };

            for row in 0..batch.num_rows() {
                let (Some(table_name), Some(column_name)) =
                    (table_names[row].clone(), column_names[row].clone())
                else {
                    return Err(CatalogError::invalid_data(
                        "information_schema.columns returned a row without a name",
                    ));
                };

                columns.push(ColumnMetadata {
                    table_name,
                    column_name,
                    ordinal_position: ordinals[row].unwrap_or_default(),
                    data_type: data_types[row].clone().unwrap_or_default(),
                    is_nullable: nullables[row]
                        .as_deref()
                        .is_none_or(|v| !v.eq_ignore_ascii_case("NO")),
                    column_default: defaults[row].clone(),
                    character_maximum_length: max_lengths[row],
                    numeric_precision: precisions[row],
                    numeric_scale: scales[row],
                    comment: comments[row].clone(),
                });
            }
        }

        debug!(schema, columns = columns.len(), "Read column metadata");
        Ok(columns)
    }

    fn description(&self) -> String {
        match &self.catalog {
            Some(catalog) => format!("information_schema ({catalog})"),
            None => "information_schema".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use datafusion::datasource::MemTable;
    use datafusion::prelude::{SessionConfig, SessionContext};
    use datafusion::sql::TableReference;

    fn context() -> SessionContext {
        let ctx = SessionContext::new_with_config(SessionConfig::new().with_information_schema(true));
        let schema = Arc::new(Schema::new(vec![
            Field::new("ORDER_SK", DataType::Int64, false),
            Field::new("STATUS", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(StringArray::from(vec![Some("OPEN"), None])),
            ],
        )
        .unwrap();
        let table = MemTable::try_new(schema, vec![vec![batch]]).unwrap();
        ctx.register_table(TableReference::bare("ORDERS"), Arc::new(table))
            .unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_reads_columns_in_ordinal_order() {
        let source = InformationSchemaSource::new(Arc::new(context()));
        let columns = source.columns("public", &[]).await.unwrap();

        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].table_name, "ORDERS");
        assert_eq!(columns[0].column_name, "ORDER_SK");
        assert!(!columns[0].is_nullable);
        assert_eq!(columns[0].data_type, "Int64");
        assert_eq!(columns[1].column_name, "STATUS");
        assert!(columns[1].is_nullable);
        assert!(columns[0].ordinal_position < columns[1].ordinal_position);
        assert!(columns[1].comment.is_none());
    }

    #[tokio::test]
    async fn test_table_filter_and_listing() {
        let source = InformationSchemaSource::new(Arc::new(context()));
        assert!(source
            .columns("public", &["MISSING".to_string()])
            .await
            .unwrap()
            .is_empty());
        assert_eq!(source.list_tables("public").await.unwrap(), vec!["ORDERS"]);
        assert!(source.list_tables("other").await.unwrap().is_empty());
    }

    #[test]
    fn test_filters_escape_literals() {
        let source = InformationSchemaSource::new(Arc::new(SessionContext::new()))
            .with_catalog("datafusion");
        let sql = source.columns_sql("pub'lic", &["A".to_string(), "B".to_string()]);
        assert!(sql.contains("table_schema = 'pub''lic'"));
        assert!(sql.contains("table_catalog = 'datafusion'"));
        assert!(sql.contains("table_name IN ('A', 'B')"));
        assert!(!sql.contains("comment"));
    }

    #[test]
    fn test_warehouse_catalog_scopes_lookups() {
        let executor: Arc<dyn QueryExecutor> = Arc::new(SessionContext::new());
        let scoped = WarehouseConfig {
            catalog: Some("dw".to_string()),
            ..Default::default()
        };
        let sql = InformationSchemaSource::for_warehouse(executor.clone(), &scoped)
            .columns_sql("public", &[]);
        assert!(sql.contains("table_catalog = 'dw'"));

        let sql = InformationSchemaSource::for_warehouse(executor, &WarehouseConfig::default())
            .columns_sql("public", &[]);
        assert!(!sql.contains("table_catalog"));
    }
}
