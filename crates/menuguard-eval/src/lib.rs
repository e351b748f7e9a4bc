//! Integrity constraint evaluation for menu dataset snapshots.
//!
//! A fixed catalogue of named rules is run against a snapshot; two runs
//! (raw and cleaned data) can then be compared constraint by constraint.

pub mod catalogue;
pub mod compare;
pub mod engine;
pub mod errors;
pub mod model;
pub mod options;
pub mod report;
mod rules;

pub use catalogue::{
    Category, ConstraintDef, CountRule, Hop, RangeRule, ReferenceRule, Rule, Target, TextRule,
    default_catalogue,
};
pub use compare::{
    ComparisonEntry, ComparisonReport, ComparisonStatus, ComparisonTotals, Side, classify, compare,
};
pub use engine::{Evaluator, evaluate, evaluate_all, evaluate_constraint};
pub use errors::{EvalError, EvaluationError, RuleError};
pub use model::{
    ConstraintOutcome, ConstraintResult, ConstraintResults, Field, TableMetrics, ViolationRow,
};
pub use options::EvaluateOptions;
pub use report::{SummaryRow, render_comparison, render_report, status_label, summary_rows};
