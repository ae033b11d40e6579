//! Sampling strategy selection.
//!
//! A table's estimated row count picks one of three modes, and every column
//! of that table is profiled under the same mode:
//!
//! | rows                     | mode                         |
//! |--------------------------|------------------------------|
//! | `< 10,000`               | full scan                    |
//! | `10,000 ..< 1,000,000`   | Bernoulli sample (10 %)      |
//! | `>= 1,000,000` / unknown | fixed sample (1,000 rows)    |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::security::InputValidator;
use crate::warehouse::SqlDialect;

/// Thresholds and sizes driving [`SamplingConfig::select`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Tables with fewer rows than this are scanned in full
    pub full_scan_below: u64,
    /// Tables with at least this many rows get a fixed-size sample
    pub fixed_sample_from: u64,
    /// Row percentage kept by the Bernoulli sample
    pub bernoulli_percent: f64,
    /// Rows kept by the fixed-size sample
    pub fixed_sample_rows: u64,
    /// Row count assumed when estimation fails
    pub unknown_row_count: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            full_scan_below: 10_000,
            fixed_sample_from: 1_000_000,
            bernoulli_percent: 10.0,
            fixed_sample_rows: 1_000,
            unknown_row_count: 1_000_000,
        }
    }
}

impl SamplingConfig {
    /// Chooses the sampling mode for a table.
    ///
    /// `None` means the row count could not be estimated.
    ///
    /// ```rust
    /// use term_catalog::profiling::{SamplingConfig, SamplingMode};
    ///
    /// let config = SamplingConfig::default();
    /// assert_eq!(config.select(Some(9_999)), SamplingMode::Full);
    /// assert_eq!(config.select(Some(10_000)), SamplingMode::Bernoulli { percent: 10.0 });
    /// assert_eq!(config.select(None), SamplingMode::FixedRows { rows: 1_000 });
    /// ```
    pub fn select(&self, row_count: Option<u64>) -> SamplingMode {
        let rows = row_count.unwrap_or(self.unknown_row_count);
        if rows < self.full_scan_below {
            SamplingMode::Full
        } else if rows < self.fixed_sample_from {
            SamplingMode::Bernoulli {
                percent: self.bernoulli_percent,
            }
        } else {
            SamplingMode::FixedRows {
                rows: self.fixed_sample_rows,
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.full_scan_below >= self.fixed_sample_from {
            return Err(CatalogError::Configuration(format!(
                "sampling.full_scan_below ({}) must be less than sampling.fixed_sample_from ({})",
                self.full_scan_below, self.fixed_sample_from
            )));
        }
        InputValidator::validate_sample_percent(self.bernoulli_percent, "sampling.bernoulli_percent")?;
        InputValidator::validate_positive(self.fixed_sample_rows, "sampling.fixed_sample_rows")?;
        Ok(())
    }
}

/// How rows are drawn from a table while profiling it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SamplingMode {
    /// Every row is read
    Full,
    /// Each row is kept independently with the given probability (percent)
    Bernoulli { percent: f64 },
    /// At most `rows` rows are read
    FixedRows { rows: u64 },
}

impl SamplingMode {
    pub fn is_sampled(&self) -> bool {
        !matches!(self, SamplingMode::Full)
    }

    /// Renders the `FROM` clause reading `table_sql` under this mode.
    ///
    /// `table_sql` must already be a quoted table reference.
    pub fn from_clause(&self, table_sql: &str, dialect: SqlDialect) -> String {
        match (self, dialect) {
            (SamplingMode::Full, _) => format!("FROM {table_sql}"),
            (SamplingMode::Bernoulli { percent }, SqlDialect::DataFusion) => format!(
                "FROM (SELECT * FROM {table_sql} WHERE random() < {}) AS sampled",
                percent / 100.0
            ),
            (SamplingMode::FixedRows { rows }, SqlDialect::DataFusion) => {
                format!("FROM (SELECT * FROM {table_sql} LIMIT {rows}) AS sampled")
            }
            (SamplingMode::Bernoulli { percent }, SqlDialect::Snowflake) => {
                format!("FROM {table_sql} TABLESAMPLE BERNOULLI ({percent})")
            }
            (SamplingMode::FixedRows { rows }, SqlDialect::Snowflake) => {
                format!("FROM {table_sql} TABLESAMPLE ({rows} ROWS)")
            }
        }
    }
}

impl fmt::Display for SamplingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingMode::Full => write!(f, "full"),
            SamplingMode::Bernoulli { percent } => write!(f, "bernoulli({percent}%)"),
            SamplingMode::FixedRows { rows } => write!(f, "fixed({rows} rows)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        let config = SamplingConfig::default();
        assert_eq!(config.select(Some(0)), SamplingMode::Full);
        assert_eq!(config.select(Some(9_999)), SamplingMode::Full);
        assert_eq!(
            config.select(Some(10_000)),
            SamplingMode::Bernoulli { percent: 10.0 }
        );
        assert_eq!(
            config.select(Some(999_999)),
            SamplingMode::Bernoulli { percent: 10.0 }
        );
        assert_eq!(
            config.select(Some(1_000_000)),
            SamplingMode::FixedRows { rows: 1_000 }
        );
        assert_eq!(config.select(None), SamplingMode::FixedRows { rows: 1_000 });
    }

    #[test]
    fn test_custom_sample_size() {
        let config = SamplingConfig {
            fixed_sample_rows: 250,
            ..Default::default()
        };
        assert_eq!(
            config.select(Some(5_000_000)),
            SamplingMode::FixedRows { rows: 250 }
        );
    }

    #[test]
    fn test_datafusion_clauses() {
        let t = "\"public\".\"ORDERS\"";
        assert_eq!(
            SamplingMode::Full.from_clause(t, SqlDialect::DataFusion),
            "FROM \"public\".\"ORDERS\""
        );
        assert_eq!(
            SamplingMode::Bernoulli { percent: 10.0 }.from_clause(t, SqlDialect::DataFusion),
            "FROM (SELECT * FROM \"public\".\"ORDERS\" WHERE random() < 0.1) AS sampled"
        );
        assert_eq!(
            SamplingMode::FixedRows { rows: 1000 }.from_clause(t, SqlDialect::DataFusion),
            "FROM (SELECT * FROM \"public\".\"ORDERS\" LIMIT 1000) AS sampled"
        );
    }

    #[test]
    fn test_snowflake_clauses() {
        let t = "\"ORDERS\"";
        assert_eq!(
            SamplingMode::Bernoulli { percent: 10.0 }.from_clause(t, SqlDialect::Snowflake),
            "FROM \"ORDERS\" TABLESAMPLE BERNOULLI (10)"
        );
        assert_eq!(
            SamplingMode::FixedRows { rows: 1000 }.from_clause(t, SqlDialect::Snowflake),
            "FROM \"ORDERS\" TABLESAMPLE (1000 ROWS)"
        );
    }

    #[test]
    fn test_validation() {
        assert!(SamplingConfig::default().validate().is_ok());

        let inverted = SamplingConfig {
            full_scan_below: 2_000_000,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let bad_percent = SamplingConfig {
            bernoulli_percent: 0.0,
            ..Default::default()
        };
        assert!(bad_percent.validate().is_err());

        let zero_rows = SamplingConfig {
            fixed_sample_rows: 0,
            ..Default::default()
        };
        assert!(zero_rows.validate().is_err());
    }

    #[test]
    fn test_mode_serialization() {
        let json = serde_json::to_value(SamplingMode::Bernoulli { percent: 10.0 }).unwrap();
        assert_eq!(json["mode"], "bernoulli");
        assert_eq!(json["percent"], 10.0);
        assert_eq!(SamplingMode::FixedRows { rows: 5 }.to_string(), "fixed(5 rows)");
        assert!(!SamplingMode::Full.is_sampled());
    }
}
