//! Column metadata records and declared-type normalization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::security::SqlSecurity;

/// Coarse category of a declared column type.
///
/// Both warehouse type names (`NUMBER(38,0)`, `VARCHAR(16777216)`,
/// `TIMESTAMP_NTZ`) and Arrow type names (`Int64`, `Utf8`,
/// `Timestamp(Nanosecond, None)`) are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    Numeric,
    Character,
    Temporal,
    Other,
}

const NUMERIC_TYPES: &[&str] = &[
    "NUMBER",
    "NUMERIC",
    "DECIMAL",
    "DEC",
    "INT",
    "INTEGER",
    "BIGINT",
    "SMALLINT",
    "TINYINT",
    "BYTEINT",
    "FLOAT",
    "FLOAT4",
    "FLOAT8",
    "DOUBLE",
    "DOUBLE PRECISION",
    "REAL",
    "INT8",
    "INT16",
    "INT32",
    "INT64",
    "UINT8",
    "UINT16",
    "UINT32",
    "UINT64",
    "FLOAT16",
    "FLOAT32",
    "FLOAT64",
    "DECIMAL32",
    "DECIMAL64",
    "DECIMAL128",
    "DECIMAL256",
];

const CHARACTER_TYPES: &[&str] = &[
    "VARCHAR",
    "CHAR",
    "CHARACTER",
    "CHARACTER VARYING",
    "NCHAR",
    "NVARCHAR",
    "STRING",
    "TEXT",
    "UTF8",
    "LARGEUTF8",
    "UTF8VIEW",
];

const TEMPORAL_TYPES: &[&str] = &[
    "DATE", "DATETIME", "TIME", "DATE32", "DATE64", "TIME32", "TIME64",
];

impl TypeCategory {
    /// Categorizes a declared type name.
    ///
    /// ```rust
    /// use term_catalog::metadata::TypeCategory;
    ///
    /// assert_eq!(TypeCategory::from_declared("NUMBER(38,0)"), TypeCategory::Numeric);
    /// assert_eq!(TypeCategory::from_declared("Utf8"), TypeCategory::Character);
    /// assert_eq!(TypeCategory::from_declared("TIMESTAMP_NTZ(9)"), TypeCategory::Temporal);
    /// assert_eq!(TypeCategory::from_declared("BOOLEAN"), TypeCategory::Other);
    /// ```
    pub fn from_declared(data_type: &str) -> Self {
        let upper = data_type.trim().to_uppercase();
        let base = upper
            .split(['(', '<'])
            .next()
            .unwrap_or_default()
            .trim();

        if NUMERIC_TYPES.contains(&base) {
            TypeCategory::Numeric
        } else if CHARACTER_TYPES.contains(&base) {
            TypeCategory::Character
        } else if TEMPORAL_TYPES.contains(&base) || base.starts_with("TIME") {
            TypeCategory::Temporal
        } else {
            TypeCategory::Other
        }
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeCategory::Numeric => "numeric",
            TypeCategory::Character => "character",
            TypeCategory::Temporal => "temporal",
            TypeCategory::Other => "other",
        };
        f.write_str(name)
    }
}

/// Metadata of one warehouse column, keyed by `(table_name, column_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub table_name: String,
    pub column_name: String,
    pub ordinal_position: u64,
    pub data_type: String,
    pub is_nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_maximum_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_precision: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_scale: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ColumnMetadata {
    /// Creates a metadata record with the required fields.
    pub fn new(
        table_name: impl Into<String>,
        column_name: impl Into<String>,
        ordinal_position: u64,
        data_type: impl Into<String>,
        is_nullable: bool,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
            ordinal_position,
            data_type: data_type.into(),
            is_nullable,
            column_default: None,
            character_maximum_length: None,
            numeric_precision: None,
            numeric_scale: None,
            comment: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.column_default = Some(default.into());
        self
    }

    pub fn with_max_length(mut self, length: u64) -> Self {
        self.character_maximum_length = Some(length);
        self
    }

    pub fn with_precision(mut self, precision: u64, scale: i64) -> Self {
        self.numeric_precision = Some(precision);
        self.numeric_scale = Some(scale);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Category of the declared type.
    pub fn type_category(&self) -> TypeCategory {
        TypeCategory::from_declared(&self.data_type)
    }
}

/// A possibly qualified table reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
}

impl TableRef {
    /// An unqualified reference.
    pub fn bare(table: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: None,
            table: table.into(),
        }
    }

    /// A schema-qualified reference.
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: Some(schema.into()),
            table: table.into(),
        }
    }

    pub fn with_catalog(mut self, catalog: Option<String>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Renders the reference with every part quoted.
    ///
    /// ```rust
    /// use term_catalog::metadata::TableRef;
    ///
    /// let table = TableRef::new("public", "ORDERS");
    /// assert_eq!(table.to_sql().unwrap(), "\"public\".\"ORDERS\"");
    /// ```
    pub fn to_sql(&self) -> Result<String> {
        let mut parts = Vec::with_capacity(3);
        if let Some(catalog) = &self.catalog {
            parts.push(SqlSecurity::escape_identifier(catalog)?);
        }
        if let Some(schema) = &self.schema {
            parts.push(SqlSecurity::escape_identifier(schema)?);
        }
        parts.push(SqlSecurity::escape_identifier(&self.table)?);
        Ok(parts.join("."))
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(catalog) = &self.catalog {
            write!(f, "{catalog}.")?;
        }
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        write!(f, "{}", self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warehouse_type_names() {
        assert_eq!(TypeCategory::from_declared("NUMBER"), TypeCategory::Numeric);
        assert_eq!(TypeCategory::from_declared("decimal(10, 2)"), TypeCategory::Numeric);
        assert_eq!(TypeCategory::from_declared("Double Precision"), TypeCategory::Numeric);
        assert_eq!(TypeCategory::from_declared("VARCHAR(255)"), TypeCategory::Character);
        assert_eq!(TypeCategory::from_declared("TEXT"), TypeCategory::Character);
        assert_eq!(TypeCategory::from_declared("DATE"), TypeCategory::Temporal);
        assert_eq!(TypeCategory::from_declared("TIMESTAMP_LTZ"), TypeCategory::Temporal);
        assert_eq!(
            TypeCategory::from_declared("TIME WITHOUT TIME ZONE"),
            TypeCategory::Temporal
        );
        assert_eq!(
            TypeCategory::from_declared("time with time zone"),
            TypeCategory::Temporal
        );
        assert_eq!(TypeCategory::from_declared("TIMETZ"), TypeCategory::Temporal);
        assert_eq!(TypeCategory::from_declared("VARIANT"), TypeCategory::Other);
        assert_eq!(TypeCategory::from_declared(""), TypeCategory::Other);
    }

    #[test]
    fn test_arrow_type_names() {
        assert_eq!(TypeCategory::from_declared("Int64"), TypeCategory::Numeric);
        assert_eq!(TypeCategory::from_declared("Decimal128(10, 2)"), TypeCategory::Numeric);
        assert_eq!(TypeCategory::from_declared("Utf8View"), TypeCategory::Character);
        assert_eq!(TypeCategory::from_declared("Date32"), TypeCategory::Temporal);
        assert_eq!(
            TypeCategory::from_declared("Timestamp(Nanosecond, None)"),
            TypeCategory::Temporal
        );
        assert_eq!(TypeCategory::from_declared("Boolean"), TypeCategory::Other);
        assert_eq!(
            TypeCategory::from_declared("Dictionary(Int32, Utf8)"),
            TypeCategory::Other
        );
    }

    #[test]
    fn test_table_ref_rendering() {
        let bare = TableRef::bare("ORDERS");
        assert_eq!(bare.to_sql().unwrap(), "\"ORDERS\"");
        assert_eq!(bare.to_string(), "ORDERS");

        let full = TableRef::new("sales", "ORDERS").with_catalog(Some("dw".to_string()));
        assert_eq!(full.to_sql().unwrap(), "\"dw\".\"sales\".\"ORDERS\"");
        assert_eq!(full.to_string(), "dw.sales.ORDERS");

        assert!(TableRef::bare("").to_sql().is_err());
    }

    #[test]
    fn test_column_metadata_builder() {
        let column = ColumnMetadata::new("ORDERS", "AMOUNT", 3, "NUMBER(12,2)", true)
            .with_precision(12, 2)
            .with_comment("Order total");
        assert_eq!(column.type_category(), TypeCategory::Numeric);
        assert_eq!(column.numeric_scale, Some(2));
        assert_eq!(column.comment.as_deref(), Some("Order total"));
        assert!(column.column_default.is_none());
    }
}
