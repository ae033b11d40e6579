//! Rule-based column classification.
//!
//! A column's semantic role and business data type are derived from its name,
//! declared type and nullability alone. Rules are evaluated in order and the
//! first match wins. The default table:
//!
//! 1. name ends with `_sk`, `NOT NULL` → primary_key / Identifier
//! 2. name ends with `_sk` → foreign_key / Identifier
//! 3. name contains `amount`, `price` or `cost` → measure / Currency
//! 4. name contains `quantity`, `qty` or `count` → measure / Quantity
//! 5. declared type is a date or time → dimension / Date
//! 6. name contains `name`, `desc` or `description` → dimension / Description
//! 7. otherwise dimension / Text for character types, Numeric for the rest
//!
//! Name matching is case-insensitive.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::metadata::{ColumnMetadata, TypeCategory};

/// Role a column plays in a dimensional model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticRole {
    PrimaryKey,
    ForeignKey,
    Measure,
    Dimension,
}

impl fmt::Display for SemanticRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticRole::PrimaryKey => "primary_key",
            SemanticRole::ForeignKey => "foreign_key",
            SemanticRole::Measure => "measure",
            SemanticRole::Dimension => "dimension",
        };
        f.write_str(name)
    }
}

/// Business-level data type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusinessDataType {
    Identifier,
    Currency,
    Quantity,
    Date,
    Description,
    Text,
    Numeric,
}

impl fmt::Display for BusinessDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Output of the classifier for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "column_role")]
    pub role: SemanticRole,
    #[serde(rename = "business_data_type")]
    pub business_type: BusinessDataType,
}

impl ClassificationResult {
    pub const fn new(role: SemanticRole, business_type: BusinessDataType) -> Self {
        Self {
            role,
            business_type,
        }
    }
}

/// Condition under which a [`ClassificationRule`] applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RulePredicate {
    /// Column name ends with one of the suffixes, optionally only for
    /// `NOT NULL` columns.
    KeySuffix {
        suffixes: Vec<String>,
        #[serde(default)]
        requires_not_null: bool,
    },
    /// Column name contains one of the keywords.
    NameContains { keywords: Vec<String> },
    /// Declared type falls into the category.
    DeclaredType { category: TypeCategory },
}

impl RulePredicate {
    /// `name` must already be lowercased.
    fn matches(&self, name: &str, category: TypeCategory, is_nullable: bool) -> bool {
        match self {
            RulePredicate::KeySuffix {
                suffixes,
                requires_not_null,
            } => {
                (!requires_not_null || !is_nullable)
                    && suffixes
                        .iter()
                        .any(|s| name.ends_with(s.to_lowercase().as_str()))
            }
            RulePredicate::NameContains { keywords } => keywords
                .iter()
                .any(|k| name.contains(k.to_lowercase().as_str())),
            RulePredicate::DeclaredType { category: expected } => category == *expected,
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let words = match self {
            RulePredicate::KeySuffix { suffixes, .. } => suffixes,
            RulePredicate::NameContains { keywords } => keywords,
            RulePredicate::DeclaredType { .. } => return Ok(()),
        };
        if words.is_empty() {
            return Err("predicate has no patterns".to_string());
        }
        if words.iter().any(|w| w.is_empty()) {
            return Err("predicate contains an empty pattern".to_string());
        }
        Ok(())
    }
}

/// One row of the decision table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub name: String,
    pub predicate: RulePredicate,
    pub result: ClassificationResult,
}

impl ClassificationRule {
    pub fn new(
        name: impl Into<String>,
        predicate: RulePredicate,
        role: SemanticRole,
        business_type: BusinessDataType,
    ) -> Self {
        Self {
            name: name.into(),
            predicate,
            result: ClassificationResult::new(role, business_type),
        }
    }
}

/// Result used when no rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationFallback {
    pub role: SemanticRole,
    /// Business type for character columns
    pub character: BusinessDataType,
    /// Business type for every other column
    pub other: BusinessDataType,
}

impl Default for ClassificationFallback {
    fn default() -> Self {
        Self {
            role: SemanticRole::Dimension,
            character: BusinessDataType::Text,
            other: BusinessDataType::Numeric,
        }
    }
}

/// Ordered decision table used by [`ColumnClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationRules {
    pub rules: Vec<ClassificationRule>,
    pub fallback: ClassificationFallback,
}

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self {
            rules: vec![
                ClassificationRule::new(
                    "surrogate_primary_key",
                    RulePredicate::KeySuffix {
                        suffixes: words(&["_sk"]),
                        requires_not_null: true,
                    },
                    SemanticRole::PrimaryKey,
                    BusinessDataType::Identifier,
                ),
                ClassificationRule::new(
                    "surrogate_foreign_key",
                    RulePredicate::KeySuffix {
                        suffixes: words(&["_sk"]),
                        requires_not_null: false,
                    },
                    SemanticRole::ForeignKey,
                    BusinessDataType::Identifier,
                ),
                ClassificationRule::new(
                    "currency_measure",
                    RulePredicate::NameContains {
                        keywords: words(&["amount", "price", "cost"]),
                    },
                    SemanticRole::Measure,
                    BusinessDataType::Currency,
                ),
                ClassificationRule::new(
                    "quantity_measure",
                    RulePredicate::NameContains {
                        keywords: words(&["quantity", "qty", "count"]),
                    },
                    SemanticRole::Measure,
                    BusinessDataType::Quantity,
                ),
                ClassificationRule::new(
                    "date_dimension",
                    RulePredicate::DeclaredType {
                        category: TypeCategory::Temporal,
                    },
                    SemanticRole::Dimension,
                    BusinessDataType::Date,
                ),
                ClassificationRule::new(
                    "descriptive_dimension",
                    RulePredicate::NameContains {
                        keywords: words(&["name", "desc", "description"]),
                    },
                    SemanticRole::Dimension,
                    BusinessDataType::Description,
                ),
            ],
            fallback: ClassificationFallback::default(),
        }
    }
}

impl ClassificationRules {
    /// Rejects rules whose predicates can never be meaningful.
    pub fn validate(&self) -> Result<()> {
        for rule in &self.rules {
            rule.predicate.validate().map_err(|e| {
                CatalogError::Configuration(format!("classification rule '{}': {e}", rule.name))
            })?;
        }
        Ok(())
    }
}

/// Classifies columns against a [`ClassificationRules`] table.
///
/// Classification is pure and total: the same inputs always give the same
/// result and every input gets one.
#[derive(Debug, Clone, Default)]
pub struct ColumnClassifier {
    rules: ClassificationRules,
    log_matches: bool,
}

impl ColumnClassifier {
    pub fn new(rules: ClassificationRules) -> Self {
        Self {
            rules,
            log_matches: false,
        }
    }

    /// Logs the matched rule of every classified column at debug level.
    pub fn with_match_logging(mut self, enabled: bool) -> Self {
        self.log_matches = enabled;
        self
    }

    pub fn rules(&self) -> &ClassificationRules {
        &self.rules
    }

    pub fn classify(&self, column: &ColumnMetadata) -> ClassificationResult {
        self.classify_parts(&column.column_name, &column.data_type, column.is_nullable)
    }

    pub fn classify_parts(
        &self,
        column_name: &str,
        data_type: &str,
        is_nullable: bool,
    ) -> ClassificationResult {
        let category = TypeCategory::from_declared(data_type);
        match self.matching_rule(column_name, data_type, is_nullable) {
            Some(rule) => {
                if self.log_matches {
                    debug!(column = column_name, rule = %rule.name, "Classification rule matched");
                }
                rule.result
            }
            None => {
                let fallback = &self.rules.fallback;
                let business_type = if category == TypeCategory::Character {
                    fallback.character
                } else {
                    fallback.other
                };
                ClassificationResult::new(fallback.role, business_type)
            }
        }
    }

    /// The first rule matching the column, if any.
    pub fn matching_rule(
        &self,
        column_name: &str,
        data_type: &str,
        is_nullable: bool,
    ) -> Option<&ClassificationRule> {
        let name = column_name.to_lowercase();
        let category = TypeCategory::from_declared(data_type);
        self.rules
            .rules
            .iter()
            .find(|rule| rule.predicate.matches(&name, category, is_nullable))
    }
}
