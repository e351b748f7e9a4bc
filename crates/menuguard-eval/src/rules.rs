use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use menuguard_core::{Snapshot, Table, TableRef, Value};
use regex::Regex;

use crate::catalogue::{CountRule, Hop, RangeRule, ReferenceRule, Rule, Target, TextRule};
use crate::errors::RuleError;
use crate::model::ViolationRow;

/// Run a single rule. Pure: the snapshot is only read.
pub(crate) fn evaluate_rule(
    rule: &Rule,
    snapshot: &Snapshot,
) -> Result<Vec<ViolationRow>, RuleError> {
    match rule {
        Rule::Referential(rule) => check_reference(rule, snapshot),
        Rule::Range(rule) => check_range(rule, snapshot),
        Rule::Text(rule) => check_text(rule, snapshot),
        Rule::CrossCount(rule) => check_count(rule, snapshot),
    }
}

/// A table paired with its name for error reporting.
struct View<'a> {
    name: String,
    table: &'a Table,
}

impl<'a> View<'a> {
    fn open(snapshot: &'a Snapshot, table_ref: TableRef) -> Result<Self, RuleError> {
        let table = snapshot
            .table(table_ref)
            .ok_or_else(|| RuleError::MissingTable {
                table: table_ref.name(),
            })?;
        Ok(Self {
            name: table_ref.name(),
            table,
        })
    }

    fn column(&self, column: &str) -> Result<usize, RuleError> {
        self.table
            .column_index(column)
            .ok_or_else(|| RuleError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    fn rows(&self) -> impl Iterator<Item = (usize, &'a [Value])> {
        self.table
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (idx, row.as_slice()))
    }

    fn mismatch(
        &self,
        column: &str,
        row_idx: usize,
        expected: &str,
        found: &Value,
    ) -> RuleError {
        RuleError::TypeMismatch {
            table: self.name.clone(),
            column: column.to_string(),
            row: row_idx as u64 + 1,
            expected: expected.to_string(),
            found: format!("{} {}", found.type_name(), found),
        }
    }

    fn number(
        &self,
        row: &[Value],
        idx: usize,
        column: &str,
        row_idx: usize,
    ) -> Result<Option<f64>, RuleError> {
        let value = cell(row, idx);
        if is_blank(value) {
            return Ok(None);
        }
        value
            .as_f64()
            .map(Some)
            .ok_or_else(|| self.mismatch(column, row_idx, "number", value))
    }

    fn integer(
        &self,
        row: &[Value],
        idx: usize,
        column: &str,
        row_idx: usize,
    ) -> Result<Option<i64>, RuleError> {
        let value = cell(row, idx);
        if is_blank(value) {
            return Ok(None);
        }
        value
            .as_i64()
            .map(Some)
            .ok_or_else(|| self.mismatch(column, row_idx, "integer", value))
    }

    fn text<'r>(
        &self,
        row: &'r [Value],
        idx: usize,
        column: &str,
        row_idx: usize,
    ) -> Result<Option<&'r str>, RuleError> {
        let value = cell(row, idx);
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_text()
            .map(Some)
            .ok_or_else(|| self.mismatch(column, row_idx, "text", value))
    }

    fn date(
        &self,
        row: &[Value],
        idx: usize,
        column: &str,
        row_idx: usize,
    ) -> Result<Option<NaiveDate>, RuleError> {
        let value = cell(row, idx);
        if is_blank(value) {
            return Ok(None);
        }
        value
            .as_text()
            .and_then(|text| NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok())
            .map(Some)
            .ok_or_else(|| self.mismatch(column, row_idx, "date (YYYY-MM-DD)", value))
    }
}

static NULL: Value = Value::Null;

/// Null, or text with nothing but whitespace. Numeric and date reads treat both as missing.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Text(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn cell(row: &[Value], idx: usize) -> &Value {
    row.get(idx).unwrap_or(&NULL)
}

/// Stable sort by the driving row's key; ties keep insertion order.
fn sort_by_key(mut rows: Vec<(Value, ViolationRow)>) -> Vec<ViolationRow> {
    rows.sort_by(|a, b| a.0.key_cmp(&b.0));
    rows.into_iter().map(|(_, row)| row).collect()
}

fn key_set(view: &View<'_>, column: &str) -> Result<HashSet<String>, RuleError> {
    let idx = view.column(column)?;
    Ok(view
        .rows()
        .filter_map(|(_, row)| cell(row, idx).key())
        .collect())
}

fn check_reference(
    rule: &ReferenceRule,
    snapshot: &Snapshot,
) -> Result<Vec<ViolationRow>, RuleError> {
    let child = View::open(snapshot, rule.child.table)?;
    let parent = View::open(snapshot, rule.parent)?;
    let key_idx = child.column(&rule.child.key)?;
    let fk_idx = child.column(&rule.column)?;
    let parent_keys = key_set(&parent, &rule.parent_key)?;

    let mut found = Vec::new();
    for (_, row) in child.rows() {
        let reference = cell(row, fk_idx);
        let Some(key) = reference.key() else {
            continue;
        };
        if !parent_keys.contains(&key) {
            let id = cell(row, key_idx).clone();
            found.push((
                id.clone(),
                ViolationRow::new()
                    .with(&rule.child.key_label, id)
                    .with(&rule.column_label, reference.clone()),
            ));
        }
    }

    Ok(sort_by_key(found))
}

fn check_range(rule: &RangeRule, snapshot: &Snapshot) -> Result<Vec<ViolationRow>, RuleError> {
    let target = rule.target();
    let view = View::open(snapshot, target.table)?;
    let key_idx = view.column(&target.key)?;
    let mut found = Vec::new();

    match rule {
        RangeRule::Below { column, bound, .. } | RangeRule::Above { column, bound, .. } => {
            let below = matches!(rule, RangeRule::Below { .. });
            let idx = view.column(column)?;
            for (row_idx, row) in view.rows() {
                let Some(value) = view.number(row, idx, column, row_idx)? else {
                    continue;
                };
                let out_of_range = if below { value < *bound } else { value > *bound };
                if out_of_range {
                    found.push(
                        ViolationRow::new()
                            .with(&target.key_label, cell(row, key_idx).clone())
                            .with(column, cell(row, idx).clone()),
                    );
                }
            }
        }
        RangeRule::Inverted { low, high, .. } => {
            let low_idx = view.column(low)?;
            let high_idx = view.column(high)?;
            for (row_idx, row) in view.rows() {
                let low_value = view.number(row, low_idx, low, row_idx)?;
                let high_value = view.number(row, high_idx, high, row_idx)?;
                if let (Some(low_value), Some(high_value)) = (low_value, high_value) {
                    if high_value < low_value {
                        found.push(
                            ViolationRow::new()
                                .with(&target.key_label, cell(row, key_idx).clone())
                                .with(low, cell(row, low_idx).clone())
                                .with(high, cell(row, high_idx).clone()),
                        );
                    }
                }
            }
        }
        RangeRule::DateAfter { column, cutoff, .. } => {
            let idx = view.column(column)?;
            for (row_idx, row) in view.rows() {
                let Some(date) = view.date(row, idx, column, row_idx)? else {
                    continue;
                };
                if date > *cutoff {
                    found.push(
                        ViolationRow::new()
                            .with(&target.key_label, cell(row, key_idx).clone())
                            .with(column, cell(row, idx).clone()),
                    );
                }
            }
        }
    }

    Ok(found)
}

fn check_text(rule: &TextRule, snapshot: &Snapshot) -> Result<Vec<ViolationRow>, RuleError> {
    match rule {
        TextRule::Blank { target, column } => check_blank(target, column, snapshot),
        TextRule::Duplicate { target, column } => check_duplicates(target, column, snapshot),
        TextRule::Formatting { target, column } => check_formatting(target, column, snapshot),
    }
}

fn check_blank(
    target: &Target,
    column: &str,
    snapshot: &Snapshot,
) -> Result<Vec<ViolationRow>, RuleError> {
    let view = View::open(snapshot, target.table)?;
    let key_idx = view.column(&target.key)?;
    let idx = view.column(column)?;
    let mut found = Vec::new();

    for (row_idx, row) in view.rows() {
        let blank = match view.text(row, idx, column, row_idx)? {
            Some(text) => text.trim().is_empty(),
            None => true,
        };
        if blank {
            found.push(
                ViolationRow::new()
                    .with(&target.key_label, cell(row, key_idx).clone())
                    .with(column, cell(row, idx).clone()),
            );
        }
    }

    Ok(found)
}

fn check_duplicates(
    target: &Target,
    column: &str,
    snapshot: &Snapshot,
) -> Result<Vec<ViolationRow>, RuleError> {
    let view = View::open(snapshot, target.table)?;
    let key_idx = view.column(&target.key)?;
    let idx = view.column(column)?;

    let mut groups: HashMap<&str, Vec<&Value>> = HashMap::new();
    let mut order = Vec::new();
    for (row_idx, row) in view.rows() {
        let Some(text) = view.text(row, idx, column, row_idx)? else {
            continue;
        };
        if text.trim().is_empty() {
            continue;
        }
        let ids = groups.entry(text).or_insert_with(|| {
            order.push(text);
            Vec::new()
        });
        ids.push(cell(row, key_idx));
    }

    let mut pairs = Vec::new();
    for text in order {
        let Some(ids) = groups.get(text) else {
            continue;
        };
        for (pos, first) in ids.iter().enumerate() {
            for second in &ids[pos + 1..] {
                let (low, high) = match first.key_cmp(second) {
                    std::cmp::Ordering::Less => (*first, *second),
                    std::cmp::Ordering::Greater => (*second, *first),
                    std::cmp::Ordering::Equal => continue,
                };
                if low.is_null() {
                    continue;
                }
                pairs.push((low.clone(), high.clone(), text));
            }
        }
    }

    pairs.sort_by(|a, b| a.0.key_cmp(&b.0).then_with(|| a.1.key_cmp(&b.1)));
    Ok(pairs
        .into_iter()
        .map(|(low, high, text)| {
            ViolationRow::new()
                .with(format!("{}1", target.key_label), low)
                .with(format!("{}2", target.key_label), high)
                .with(column, text)
        })
        .collect())
}

fn check_formatting(
    target: &Target,
    column: &str,
    snapshot: &Snapshot,
) -> Result<Vec<ViolationRow>, RuleError> {
    let view = View::open(snapshot, target.table)?;
    let key_idx = view.column(&target.key)?;
    let idx = view.column(column)?;
    let repeated_space = Regex::new(r"\s{2,}").map_err(|err| RuleError::Pattern {
        message: err.to_string(),
    })?;
    let mut found = Vec::new();

    for (row_idx, row) in view.rows() {
        let Some(text) = view.text(row, idx, column, row_idx)? else {
            continue;
        };
        if is_badly_formatted(text, &repeated_space) {
            found.push(
                ViolationRow::new()
                    .with(&target.key_label, cell(row, key_idx).clone())
                    .with(column, text),
            );
        }
    }

    Ok(found)
}

fn is_badly_formatted(text: &str, repeated_space: &Regex) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed != text || repeated_space.is_match(text) {
        return true;
    }
    match text.chars().next() {
        Some(first) => !first.to_uppercase().eq(std::iter::once(first)),
        None => true,
    }
}

fn check_count(rule: &CountRule, snapshot: &Snapshot) -> Result<Vec<ViolationRow>, RuleError> {
    match rule {
        CountRule::Childless {
            target,
            carry,
            child,
            child_column,
        } => check_childless(target, carry, *child, child_column, snapshot),
        CountRule::DeclaredCount {
            target,
            declared,
            path,
        } => check_declared_count(target, declared, path, snapshot),
    }
}

fn check_childless(
    target: &Target,
    carry: &[String],
    child: TableRef,
    child_column: &str,
    snapshot: &Snapshot,
) -> Result<Vec<ViolationRow>, RuleError> {
    let view = View::open(snapshot, target.table)?;
    let children = View::open(snapshot, child)?;
    let key_idx = view.column(&target.key)?;
    let carry_idx = carry
        .iter()
        .map(|column| view.column(column).map(|idx| (column, idx)))
        .collect::<Result<Vec<_>, _>>()?;
    let referenced = key_set(&children, child_column)?;

    let mut found = Vec::new();
    for (_, row) in view.rows() {
        let key = cell(row, key_idx);
        let has_child = key.key().is_some_and(|key| referenced.contains(&key));
        if !has_child {
            let mut violation = ViolationRow::new().with(&target.key_label, key.clone());
            for (column, idx) in &carry_idx {
                violation = violation.with(column.as_str(), cell(row, *idx).clone());
            }
            found.push((key.clone(), violation));
        }
    }

    Ok(sort_by_key(found))
}

/// Child keys grouped by the parent key they reference, with join multiplicity.
struct HopIndex {
    children: HashMap<String, Vec<String>>,
}

impl HopIndex {
    fn build(hop: &Hop, snapshot: &Snapshot) -> Result<Self, RuleError> {
        let view = View::open(snapshot, hop.table)?;
        let key_idx = view.column(&hop.key)?;
        let parent_idx = view.column(&hop.parent_column)?;
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        for (_, row) in view.rows() {
            let (Some(parent), Some(key)) = (cell(row, parent_idx).key(), cell(row, key_idx).key())
            else {
                continue;
            };
            children.entry(parent).or_default().push(key);
        }
        Ok(Self { children })
    }

    fn step(&self, keys: &[String]) -> Vec<String> {
        keys.iter()
            .filter_map(|key| self.children.get(key))
            .flatten()
            .cloned()
            .collect()
    }
}

fn check_declared_count(
    target: &Target,
    declared: &str,
    path: &[Hop],
    snapshot: &Snapshot,
) -> Result<Vec<ViolationRow>, RuleError> {
    let view = View::open(snapshot, target.table)?;
    let key_idx = view.column(&target.key)?;
    let declared_idx = view.column(declared)?;
    let hops = path
        .iter()
        .map(|hop| HopIndex::build(hop, snapshot))
        .collect::<Result<Vec<_>, _>>()?;

    let mut found = Vec::new();
    for (row_idx, row) in view.rows() {
        let Some(declared_count) = view.integer(row, declared_idx, declared, row_idx)? else {
            continue;
        };
        let key = cell(row, key_idx);
        let mut reached = key.key().into_iter().collect::<Vec<_>>();
        for hop in &hops {
            reached = hop.step(&reached);
        }
        let actual = reached.len() as i64;
        if declared_count != actual {
            found.push((
                key.clone(),
                ViolationRow::new()
                    .with(&target.key_label, key.clone())
                    .with("declared_count", declared_count)
                    .with("actual_count", actual),
            ));
        }
    }

    Ok(sort_by_key(found))
}
