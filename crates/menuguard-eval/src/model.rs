use std::collections::BTreeMap;
use std::fmt;

use menuguard_core::Value;
use serde::{Deserialize, Serialize};

use crate::catalogue::Category;
use crate::errors::EvaluationError;

/// One named value of an offending row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

/// An offending row (or row pair), as an ordered list of fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViolationRow {
    pub fields: Vec<Field>,
}

impl ViolationRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }
}

impl fmt::Display for ViolationRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .fields
            .iter()
            .map(|field| format!("{}={}", field.name, field.value))
            .collect::<Vec<_>>();
        f.write_str(&parts.join(", "))
    }
}

/// Result of running one constraint against one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConstraintOutcome {
    Evaluated { violations: Vec<ViolationRow> },
    NotApplicable { missing_tables: Vec<String> },
    Error { error: EvaluationError },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintResult {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub outcome: ConstraintOutcome,
}

impl ConstraintResult {
    /// Number of violations, or `None` when the constraint did not evaluate.
    pub fn violation_count(&self) -> Option<usize> {
        match &self.outcome {
            ConstraintOutcome::Evaluated { violations } => Some(violations.len()),
            _ => None,
        }
    }

    pub fn violations(&self) -> &[ViolationRow] {
        match &self.outcome {
            ConstraintOutcome::Evaluated { violations } => violations,
            _ => &[],
        }
    }

    /// First `max` offending rows.
    pub fn preview(&self, max: usize) -> &[ViolationRow] {
        let violations = self.violations();
        &violations[..violations.len().min(max)]
    }

    pub fn passed(&self) -> bool {
        self.violation_count() == Some(0)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ConstraintOutcome::Error { .. })
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self.outcome, ConstraintOutcome::NotApplicable { .. })
    }

    /// Display name, e.g. `Missing Dish References`.
    pub fn title(&self) -> String {
        title_case(&self.name)
    }
}

/// Row count for one table of the evaluated snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetrics {
    pub table: String,
    pub rows: usize,
}

/// Results of one evaluation pass, keyed by constraint name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub tables: Vec<TableMetrics>,
    pub results: BTreeMap<String, ConstraintResult>,
}

impl ConstraintResults {
    pub fn get(&self, name: &str) -> Option<&ConstraintResult> {
        self.results.get(name)
    }

    /// Results ordered by constraint name.
    pub fn iter(&self) -> impl Iterator<Item = &ConstraintResult> {
        self.results.values()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn total_violations(&self) -> usize {
        self.iter().filter_map(ConstraintResult::violation_count).sum()
    }

    /// Constraints with at least one violation.
    pub fn failing(&self) -> impl Iterator<Item = &ConstraintResult> {
        self.iter()
            .filter(|result| result.violation_count().unwrap_or(0) > 0)
    }

    pub fn errors(&self) -> impl Iterator<Item = &EvaluationError> {
        self.iter().filter_map(|result| match &result.outcome {
            ConstraintOutcome::Error { error } => Some(error),
            _ => None,
        })
    }

    pub fn not_applicable(&self) -> impl Iterator<Item = &ConstraintResult> {
        self.iter().filter(|result| result.is_not_applicable())
    }

    /// True when nothing failed and nothing errored; not-applicable constraints are ignored.
    pub fn all_passed(&self) -> bool {
        self.iter()
            .all(|result| result.passed() || result.is_not_applicable())
    }
}

pub(crate) fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_capitalize_each_word() {
        assert_eq!(title_case("missing_dish_references"), "Missing Dish References");
        assert_eq!(title_case("empty__pages_"), "Empty Pages");
    }

    #[test]
    fn violation_rows_render_fields_in_order() {
        let row = ViolationRow::new()
            .with("dish_id1", 3_i64)
            .with("dish_id2", 5_i64)
            .with("name", "Soup");
        assert_eq!(row.to_string(), "dish_id1=3, dish_id2=5, name='Soup'");
        assert_eq!(row.get("dish_id2"), Some(&Value::Int(5)));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn preview_is_capped_and_errors_have_no_count() {
        let result = ConstraintResult {
            name: "invalid_negative_prices".to_string(),
            description: "Menu items with negative prices".to_string(),
            category: Category::ValueRange,
            outcome: ConstraintOutcome::Evaluated {
                violations: (0..7_i64)
                    .map(|id| ViolationRow::new().with("item_id", id))
                    .collect(),
            },
        };
        assert_eq!(result.preview(5).len(), 5);
        assert_eq!(result.preview(10).len(), 7);
        assert!(!result.passed());

        let failed = ConstraintResult {
            outcome: ConstraintOutcome::Error {
                error: EvaluationError {
                    constraint: "invalid_negative_prices".to_string(),
                    cause: crate::errors::RuleError::Pattern {
                        message: "bad".to_string(),
                    },
                },
            },
            ..result
        };
        assert!(failed.is_error());
        assert_eq!(failed.violation_count(), None);
        assert!(failed.violations().is_empty());
    }
}
