use serde::Serialize;

use crate::compare::{ComparisonReport, Side};
use crate::model::{ConstraintOutcome, ConstraintResult, ConstraintResults};

/// One line of the tabular summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub constraint: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<usize>,
    pub status: &'static str,
}

/// Status label for a single constraint result.
pub fn status_label(result: &ConstraintResult) -> &'static str {
    match &result.outcome {
        ConstraintOutcome::Evaluated { violations } if violations.is_empty() => "PASS",
        ConstraintOutcome::Evaluated { .. } => "FAIL",
        ConstraintOutcome::NotApplicable { .. } => "N/A",
        ConstraintOutcome::Error { .. } => "ERROR",
    }
}

/// Tabular summary ordered by constraint name.
pub fn summary_rows(results: &ConstraintResults) -> Vec<SummaryRow> {
    results
        .iter()
        .map(|result| SummaryRow {
            constraint: result.name.clone(),
            title: result.title(),
            violations: result.violation_count(),
            status: status_label(result),
        })
        .collect()
}

/// Render a deterministic markdown report for one evaluation run.
pub fn render_report(results: &ConstraintResults, max_examples: usize) -> String {
    let mut lines = Vec::new();
    let total = results.total_violations();
    let failing = results.failing().collect::<Vec<_>>();

    lines.push("# Integrity Validation Report".to_string());
    lines.push(String::new());
    if let Some(label) = &results.label {
        lines.push(format!("- snapshot: {label}"));
    }
    lines.push(format!("- constraints: {}", results.len()));
    lines.push(format!("- total_violations: {total}"));
    lines.push(String::new());

    lines.push("## Summary".to_string());
    if results.all_passed() {
        lines.push("All integrity constraints passed.".to_string());
    } else if total > 0 {
        lines.push(format!(
            "{total} integrity violation(s) found across {} constraint(s).",
            failing.len()
        ));
    }
    let errors = results.errors().count();
    if errors > 0 {
        lines.push(format!("{errors} constraint(s) could not be evaluated."));
    }
    lines.push(String::new());

    lines.push("## Tables".to_string());
    lines.push("| table | rows |".to_string());
    lines.push("| --- | --- |".to_string());
    for table in &results.tables {
        lines.push(format!("| {} | {} |", table.table, table.rows));
    }
    lines.push(String::new());

    lines.push("## Constraint results".to_string());
    lines.push("| constraint | status | violations | description |".to_string());
    lines.push("| --- | --- | --- | --- |".to_string());
    for row in summary_rows(results) {
        let description = results
            .get(&row.constraint)
            .map(|result| result.description.as_str())
            .unwrap_or_default();
        let violations = row
            .violations
            .map(|count| count.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "| {} | {} | {} | {} |",
            row.title, row.status, violations, description
        ));
    }
    lines.push(String::new());

    if !failing.is_empty() {
        lines.push("## Violation details".to_string());
        for result in &failing {
            lines.push(format!("### {}", result.title()));
            lines.push(format!("- description: {}", result.description));
            lines.push(format!("- violations: {}", result.violations().len()));
            for (idx, row) in result.preview(max_examples).iter().enumerate() {
                lines.push(format!("{}. {row}", idx + 1));
            }
            lines.push(String::new());
        }
    }

    if errors > 0 {
        lines.push("## Evaluation errors".to_string());
        for error in results.errors() {
            lines.push(format!("- {}: {}", error.constraint, error.cause));
        }
        lines.push(String::new());
    }

    lines.push("## Recommendations".to_string());
    if results.all_passed() {
        lines.push("- no violations detected; keep validating as part of the pipeline.".to_string());
    } else {
        if total > 0 {
            lines.push("- review the listed violations and update the cleaning stage.".to_string());
        }
        if errors > 0 {
            lines.push("- check the snapshot columns used by the failed constraints.".to_string());
        }
        lines.push("- re-run validation after corrections.".to_string());
    }
    lines.join("\n")
}

/// Render a deterministic markdown report for a baseline/candidate comparison.
pub fn render_comparison(report: &ComparisonReport) -> String {
    let mut lines = Vec::new();
    let totals = &report.totals;

    lines.push("# Validation Comparison Report".to_string());
    lines.push(String::new());
    if let Some(label) = &report.baseline_label {
        lines.push(format!("- baseline: {label}"));
    }
    if let Some(label) = &report.candidate_label {
        lines.push(format!("- candidate: {label}"));
    }
    lines.push(format!("- baseline_violations: {}", totals.baseline));
    lines.push(format!("- candidate_violations: {}", totals.candidate));
    lines.push(format!("- violations_fixed: {}", totals.fixed));
    lines.push(format!("- improvement_rate: {:.1}%", totals.improvement_rate));
    lines.push(String::new());

    lines.push("## Summary".to_string());
    if totals.candidate == 0 && totals.unmatched == 0 {
        lines.push("All integrity violations have been resolved.".to_string());
    } else if totals.candidate > 0 {
        lines.push(format!("{} violation(s) remain.", totals.candidate));
    }
    if totals.regressed > 0 {
        lines.push(format!(
            "{} constraint(s) regressed and need attention.",
            totals.regressed
        ));
    }
    if totals.unmatched > 0 {
        lines.push(format!(
            "{} constraint(s) could not be matched across runs.",
            totals.unmatched
        ));
    }
    lines.push(String::new());

    lines.push("## Detailed comparison".to_string());
    lines.push("| constraint | baseline | candidate | improvement | status |".to_string());
    lines.push("| --- | --- | --- | --- | --- |".to_string());
    for entry in &report.entries {
        let improvement = entry
            .improvement
            .map(|value| value.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "| {} | {} | {} | {} | {} |",
            entry.constraint,
            side_label(&entry.baseline),
            side_label(&entry.candidate),
            improvement,
            entry.status.label()
        ));
    }
    lines.join("\n")
}

fn side_label(side: &Side) -> String {
    match side {
        Side::Count(count) => count.to_string(),
        Side::NotApplicable => "n/a".to_string(),
        Side::Error => "error".to_string(),
        Side::Absent => "absent".to_string(),
    }
}
