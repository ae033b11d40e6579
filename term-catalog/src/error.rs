//! Error types for the Term catalog library.
//!
//! All fallible operations return [`CatalogError`]. Profiling failures of a
//! single column are *not* surfaced through this type: the orchestrator
//! records them on the column's profile and moves on. What reaches the caller
//! are the failures nothing downstream can recover from, such as a schema
//! without any readable column metadata.

use thiserror::Error;

/// The main error type for the Term catalog library.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The metadata source returned no columns for the requested tables.
    #[error("No usable metadata for schema '{schema}' (tables: {tables})")]
    NoUsableMetadata {
        /// Schema that was inspected
        schema: String,
        /// Comma separated table list, or `*` when all tables were requested
        tables: String,
    },

    /// A query issued through a [`QueryExecutor`](crate::warehouse::QueryExecutor) failed.
    #[error("Query failed: {message}")]
    Query {
        /// Detailed error message
        message: String,
        /// The statement that failed, if known
        sql: Option<String>,
    },

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from data source registration.
    #[error("Data source error: {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV", "Parquet")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error raised by a documentation generator.
    #[error("Documentation error for table '{table}': {message}")]
    Documentation { table: String, message: String },

    /// A query result did not have the expected shape.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Security-related error.
    #[error("Security error: {0}")]
    SecurityError(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, CatalogError>`.
pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    /// Creates a query error without the failing statement attached.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            sql: None,
        }
    }

    /// Creates a query error carrying the statement that failed.
    pub fn query_with_sql(message: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            sql: Some(sql.into()),
        }
    }

    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with a source error.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a documentation error for a table.
    pub fn documentation(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Documentation {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    /// Creates a "no usable metadata" error for the given request.
    pub fn no_usable_metadata(schema: impl Into<String>, tables: &[String]) -> Self {
        let tables = if tables.is_empty() {
            "*".to_string()
        } else {
            tables.join(", ")
        };
        Self::NoUsableMetadata {
            schema: schema.into(),
            tables,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<CatalogError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            CatalogError::Internal(inner) => CatalogError::Internal(format!("{msg}: {inner}")),
            other => CatalogError::Internal(format!("{msg}: {other}")),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let msg = f();
            match e.into() {
                CatalogError::Internal(inner) => CatalogError::Internal(format!("{msg}: {inner}")),
                other => CatalogError::Internal(format!("{msg}: {other}")),
            }
        })
    }
}
