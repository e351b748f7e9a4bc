use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use menuguard_core::{Snapshot, TableRef, validate_snapshot};
use tracing::{debug, info, warn};

use crate::catalogue::{ConstraintDef, default_catalogue};
use crate::errors::{EvalError, EvaluationError};
use crate::model::{ConstraintOutcome, ConstraintResult, ConstraintResults, TableMetrics};
use crate::options::EvaluateOptions;
use crate::rules::evaluate_rule;

/// Evaluate snapshots against a constraint catalogue.
#[derive(Debug, Clone)]
pub struct Evaluator {
    options: EvaluateOptions,
    catalogue: Vec<ConstraintDef>,
}

impl Evaluator {
    /// Evaluator over the default catalogue built from `options`.
    pub fn new(options: EvaluateOptions) -> Self {
        let catalogue = default_catalogue(&options);
        Self { options, catalogue }
    }

    pub fn with_catalogue(options: EvaluateOptions, catalogue: Vec<ConstraintDef>) -> Self {
        Self { options, catalogue }
    }

    pub fn options(&self) -> &EvaluateOptions {
        &self.options
    }

    pub fn catalogue(&self) -> &[ConstraintDef] {
        &self.catalogue
    }

    pub fn evaluate(&self, snapshot: &Snapshot) -> Result<ConstraintResults, EvalError> {
        self.options.validate()?;
        evaluate_all(snapshot, &self.catalogue)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvaluateOptions::default())
    }
}

/// Evaluate a snapshot with the default options and catalogue.
pub fn evaluate(snapshot: &Snapshot) -> Result<ConstraintResults, EvalError> {
    Evaluator::default().evaluate(snapshot)
}

/// Run every constraint of `catalogue` against `snapshot`.
///
/// Only structural problems with the snapshot or a catalogue with duplicate
/// names fail the call; a constraint that cannot run is recorded as
/// not-applicable or as an evaluation error and the rest still run.
pub fn evaluate_all(
    snapshot: &Snapshot,
    catalogue: &[ConstraintDef],
) -> Result<ConstraintResults, EvalError> {
    let start = Instant::now();
    validate_snapshot(snapshot)?;
    check_catalogue(catalogue)?;

    let label = snapshot.label.clone().unwrap_or_else(|| "snapshot".to_string());
    info!(
        snapshot = %label,
        tables = snapshot.tables.len(),
        constraints = catalogue.len(),
        "evaluation started"
    );

    let mut results = BTreeMap::new();
    for def in catalogue {
        let outcome = evaluate_constraint(def, snapshot);
        results.insert(
            def.name.clone(),
            ConstraintResult {
                name: def.name.clone(),
                description: def.description.clone(),
                category: def.category,
                outcome,
            },
        );
    }

    let tables = snapshot
        .row_counts()
        .into_iter()
        .map(|(table, rows)| TableMetrics { table, rows })
        .collect();

    let results = ConstraintResults {
        label: snapshot.label.clone(),
        tables,
        results,
    };

    info!(
        snapshot = %label,
        total_violations = results.total_violations(),
        failing = results.failing().count(),
        errors = results.errors().count(),
        not_applicable = results.not_applicable().count(),
        duration_ms = start.elapsed().as_millis() as u64,
        "evaluation finished"
    );

    Ok(results)
}

/// Evaluate one constraint, converting failures into an outcome.
pub fn evaluate_constraint(def: &ConstraintDef, snapshot: &Snapshot) -> ConstraintOutcome {
    let missing = snapshot.missing_tables(&def.rule.required_tables());
    if !missing.is_empty() {
        let missing_tables = missing.iter().map(TableRef::name).collect::<Vec<_>>();
        debug!(
            constraint = %def.name,
            missing = ?missing_tables,
            "constraint not applicable"
        );
        return ConstraintOutcome::NotApplicable { missing_tables };
    }

    match evaluate_rule(&def.rule, snapshot) {
        Ok(violations) => {
            debug!(
                constraint = %def.name,
                violations = violations.len(),
                "constraint evaluated"
            );
            ConstraintOutcome::Evaluated { violations }
        }
        Err(cause) => {
            let error = EvaluationError {
                constraint: def.name.clone(),
                cause,
            };
            warn!(constraint = %def.name, error = %error.cause, "constraint evaluation failed");
            ConstraintOutcome::Error { error }
        }
    }
}

fn check_catalogue(catalogue: &[ConstraintDef]) -> Result<(), EvalError> {
    let mut names = BTreeSet::new();
    for def in catalogue {
        if !names.insert(def.name.as_str()) {
            return Err(EvalError::InvalidCatalogue(format!(
                "duplicate constraint name: {}",
                def.name
            )));
        }
    }
    Ok(())
}
