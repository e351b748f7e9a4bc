use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{TableRef, Value};

/// Point-in-time view of the menu dataset, keyed by table name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Snapshot {
    /// Free-form label (e.g. `original`, `cleaned`) used in logs and reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Tables keyed by name (`Menu`, `MenuItem_cleaned`, ...).
    #[serde(default)]
    pub tables: BTreeMap<String, Table>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            tables: BTreeMap::new(),
        }
    }

    /// Insert or replace a table, returning the previous one.
    pub fn insert(&mut self, table_ref: TableRef, table: Table) -> Option<Table> {
        self.tables.insert(table_ref.name(), table)
    }

    /// Builder form of [`Snapshot::insert`].
    pub fn with_table(mut self, table_ref: TableRef, table: Table) -> Self {
        self.insert(table_ref, table);
        self
    }

    pub fn table(&self, table_ref: TableRef) -> Option<&Table> {
        self.tables.get(&table_ref.name())
    }

    pub fn contains(&self, table_ref: TableRef) -> bool {
        self.tables.contains_key(&table_ref.name())
    }

    /// Tables from `required` that are absent, in the given order.
    pub fn missing_tables(&self, required: &[TableRef]) -> Vec<TableRef> {
        required
            .iter()
            .filter(|table_ref| !self.contains(**table_ref))
            .copied()
            .collect()
    }

    /// Row count per table, ordered by table name.
    pub fn row_counts(&self) -> Vec<(String, usize)> {
        self.tables
            .iter()
            .map(|(name, table)| (name.clone(), table.rows.len()))
            .collect()
    }
}

/// A table of dynamically typed rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns);
        table.rows = rows;
        table
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    /// Case-insensitive column lookup.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|name| name.eq_ignore_ascii_case(column))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
