use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::model::{ConstraintOutcome, ConstraintResult, ConstraintResults};

/// What one side of a comparison holds for a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "violations", rename_all = "snake_case")]
pub enum Side {
    Count(usize),
    NotApplicable,
    Error,
    Absent,
}

impl Side {
    fn of(result: Option<&ConstraintResult>) -> Self {
        match result.map(|result| &result.outcome) {
            Some(ConstraintOutcome::Evaluated { violations }) => Side::Count(violations.len()),
            Some(ConstraintOutcome::NotApplicable { .. }) => Side::NotApplicable,
            Some(ConstraintOutcome::Error { .. }) => Side::Error,
            None => Side::Absent,
        }
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            Side::Count(count) => Some(*count),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonStatus {
    /// Fewer violations in the candidate.
    Fixed,
    /// No violations left and none removed.
    Clean,
    /// Violations left, none removed.
    Remaining,
    /// More violations in the candidate than in the baseline.
    Regressed,
    /// Counts are not available on both sides.
    Unmatched,
}

impl ComparisonStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ComparisonStatus::Fixed => "FIXED",
            ComparisonStatus::Clean => "CLEAN",
            ComparisonStatus::Remaining => "REMAINING",
            ComparisonStatus::Regressed => "REGRESSED",
            ComparisonStatus::Unmatched => "UNMATCHED",
        }
    }

    /// Regressions count as remaining violations.
    pub fn is_remaining(&self) -> bool {
        matches!(
            self,
            ComparisonStatus::Remaining | ComparisonStatus::Regressed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub constraint: String,
    pub baseline: Side,
    pub candidate: Side,
    /// `baseline - candidate`; absent for unmatched entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement: Option<i64>,
    pub status: ComparisonStatus,
}

/// Totals over entries that have counts on both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTotals {
    pub baseline: usize,
    pub candidate: usize,
    /// Sum of positive improvements.
    pub fixed: usize,
    /// `fixed / baseline * 100`, or 100 when the baseline has no violations.
    pub improvement_rate: f64,
    pub regressed: usize,
    pub unmatched: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_label: Option<String>,
    /// Entries ordered by constraint name.
    pub entries: Vec<ComparisonEntry>,
    pub totals: ComparisonTotals,
}

impl ComparisonReport {
    pub fn get(&self, constraint: &str) -> Option<&ComparisonEntry> {
        self.entries
            .iter()
            .find(|entry| entry.constraint == constraint)
    }

    pub fn regressions(&self) -> impl Iterator<Item = &ComparisonEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.status == ComparisonStatus::Regressed)
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &ComparisonEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.status == ComparisonStatus::Unmatched)
    }
}

/// Classify a constraint from its baseline and candidate violation counts.
pub fn classify(baseline: usize, candidate: usize) -> (i64, ComparisonStatus) {
    let improvement = baseline as i64 - candidate as i64;
    let status = if improvement > 0 {
        ComparisonStatus::Fixed
    } else if candidate == 0 {
        ComparisonStatus::Clean
    } else if improvement < 0 {
        ComparisonStatus::Regressed
    } else {
        ComparisonStatus::Remaining
    };
    (improvement, status)
}

/// Outer-join two evaluation runs by constraint name.
///
/// A constraint missing from either run, or without a violation count on
/// either side, is kept as [`ComparisonStatus::Unmatched`]. A constraint that
/// is not applicable on both sides has nothing to compare and is `Clean`.
pub fn compare(baseline: &ConstraintResults, candidate: &ConstraintResults) -> ComparisonReport {
    let names = baseline
        .results
        .keys()
        .chain(candidate.results.keys())
        .collect::<BTreeSet<_>>();

    let mut entries = Vec::with_capacity(names.len());
    for name in names {
        let before = Side::of(baseline.get(name));
        let after = Side::of(candidate.get(name));
        let (improvement, status) = match (before, after) {
            (Side::Count(before), Side::Count(after)) => {
                let (improvement, status) = classify(before, after);
                (Some(improvement), status)
            }
            (Side::NotApplicable, Side::NotApplicable) => (Some(0), ComparisonStatus::Clean),
            _ => (None, ComparisonStatus::Unmatched),
        };

        match status {
            ComparisonStatus::Regressed => warn!(
                constraint = %name,
                baseline = ?before,
                candidate = ?after,
                "constraint regressed"
            ),
            ComparisonStatus::Unmatched => warn!(
                constraint = %name,
                baseline = ?before,
                candidate = ?after,
                "constraint unmatched"
            ),
            _ => {}
        }

        entries.push(ComparisonEntry {
            constraint: name.clone(),
            baseline: before,
            candidate: after,
            improvement,
            status,
        });
    }

    let totals = totals(&entries);
    info!(
        baseline = totals.baseline,
        candidate = totals.candidate,
        fixed = totals.fixed,
        regressed = totals.regressed,
        unmatched = totals.unmatched,
        "comparison finished"
    );

    ComparisonReport {
        baseline_label: baseline.label.clone(),
        candidate_label: candidate.label.clone(),
        entries,
        totals,
    }
}

fn totals(entries: &[ComparisonEntry]) -> ComparisonTotals {
    let mut totals = ComparisonTotals {
        baseline: 0,
        candidate: 0,
        fixed: 0,
        improvement_rate: 100.0,
        regressed: 0,
        unmatched: 0,
    };

    for entry in entries {
        match entry.status {
            ComparisonStatus::Unmatched => totals.unmatched += 1,
            ComparisonStatus::Regressed => totals.regressed += 1,
            _ => {}
        }
        if let (Some(before), Some(after)) = (entry.baseline.count(), entry.candidate.count()) {
            totals.baseline += before;
            totals.candidate += after;
            totals.fixed += before.saturating_sub(after);
        }
    }

    if totals.baseline > 0 {
        totals.improvement_rate = totals.fixed as f64 / totals.baseline as f64 * 100.0;
    }
    totals
}
