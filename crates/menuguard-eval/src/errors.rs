use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal errors emitted by the evaluation engine.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] menuguard_core::Error),
    #[error("invalid catalogue: {0}")]
    InvalidCatalogue(String),
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Why a single rule could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleError {
    #[error("table '{table}' not found in snapshot")]
    MissingTable { table: String },
    #[error("column '{column}' not found in {table}")]
    MissingColumn { table: String, column: String },
    #[error("{table}.{column} row {row}: expected {expected}, found {found}")]
    TypeMismatch {
        table: String,
        column: String,
        row: u64,
        expected: String,
        found: String,
    },
    #[error("invalid pattern: {message}")]
    Pattern { message: String },
}

/// A constraint whose predicate failed; recorded instead of raised.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("constraint '{constraint}' failed to evaluate: {cause}")]
pub struct EvaluationError {
    pub constraint: String,
    pub cause: RuleError,
}
