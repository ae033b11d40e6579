//! SQL quoting and input validation for generated catalog queries.
//!
//! Every identifier spliced into SQL comes from warehouse metadata and goes
//! through [`SqlSecurity::escape_identifier`]: it is wrapped in double quotes
//! with embedded quotes doubled. Names such as `created_at` or `update_ts`
//! are accepted as-is.

use crate::error::{CatalogError, Result};

/// Maximum identifier length accepted by [`SqlSecurity::validate_identifier`].
pub const MAX_IDENTIFIER_LENGTH: usize = 255;

/// SQL identifier and literal escaping utilities.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Validates and quotes a SQL identifier (table name, column name, etc.).
    ///
    /// # Examples
    /// ```rust
    /// use term_catalog::security::SqlSecurity;
    ///
    /// assert_eq!(SqlSecurity::escape_identifier("ORDER_SK").unwrap(), "\"ORDER_SK\"");
    /// assert_eq!(SqlSecurity::escape_identifier("odd\"name").unwrap(), "\"odd\"\"name\"");
    /// assert!(SqlSecurity::escape_identifier("").is_err());
    /// ```
    pub fn escape_identifier(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;

        let escaped = identifier.replace('"', "\"\"");
        Ok(format!("\"{escaped}\""))
    }

    /// Validates a SQL identifier without quoting it.
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.is_empty() || identifier.trim().is_empty() {
            return Err(CatalogError::SecurityError(
                "SQL identifier cannot be empty or whitespace-only".to_string(),
            ));
        }

        if identifier.len() > MAX_IDENTIFIER_LENGTH {
            return Err(CatalogError::SecurityError(format!(
                "SQL identifier too long (max {MAX_IDENTIFIER_LENGTH} characters)"
            )));
        }

        if identifier.chars().any(|c| c == '\0' || c.is_control()) {
            return Err(CatalogError::SecurityError(
                "SQL identifier cannot contain null bytes or control characters".to_string(),
            ));
        }

        Ok(())
    }

    /// Renders a string as a single-quoted SQL literal.
    ///
    /// ```rust
    /// use term_catalog::security::SqlSecurity;
    ///
    /// assert_eq!(SqlSecurity::quote_literal("O'Brien"), "'O''Brien'");
    /// ```
    pub fn quote_literal(value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// Input validation utilities for configuration values.
pub struct InputValidator;

impl InputValidator {
    /// Validates a percentage in the half-open range `(0, 100]`.
    pub fn validate_sample_percent(value: f64, name: &str) -> Result<()> {
        if !value.is_finite() {
            return Err(CatalogError::Configuration(format!(
                "Invalid {name} value: must be finite (not NaN or infinite)"
            )));
        }
        if value <= 0.0 || value > 100.0 {
            return Err(CatalogError::Configuration(format!(
                "Invalid {name} value: must be in (0, 100], got {value}"
            )));
        }
        Ok(())
    }

    /// Validates that a count is strictly positive.
    pub fn validate_positive(value: u64, name: &str) -> Result<()> {
        if value == 0 {
            return Err(CatalogError::Configuration(format!(
                "Invalid {name} value: must be greater than zero"
            )));
        }
        Ok(())
    }
}
