use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::schema::Snapshot;
use crate::types::{Entity, TableRef};

/// Validate the structural preconditions of a snapshot.
///
/// This checks:
/// - the four original tables are present
/// - column names are unique per table (case-insensitive)
/// - every row has exactly one value per column
pub fn validate_snapshot(snapshot: &Snapshot) -> Result<()> {
    let required = Entity::ALL.map(TableRef::original);
    let missing = snapshot.missing_tables(&required);
    if !missing.is_empty() {
        return Err(Error::MissingTables(
            missing.iter().map(TableRef::name).collect(),
        ));
    }

    for (name, table) in &snapshot.tables {
        let mut columns = BTreeSet::new();
        for column in &table.columns {
            if !columns.insert(column.to_lowercase()) {
                return Err(Error::InvalidSnapshot(format!(
                    "duplicate column name: {name}.{column}"
                )));
            }
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            if row.len() != table.columns.len() {
                return Err(Error::InvalidSnapshot(format!(
                    "row {} of {name} has {} value(s), expected {}",
                    row_idx + 1,
                    row.len(),
                    table.columns.len()
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Table;
    use crate::types::Value;

    fn base_snapshot() -> Snapshot {
        Snapshot::new()
            .with_table(
                TableRef::original(Entity::Menu),
                Table::new(["id", "page_count"]),
            )
            .with_table(
                TableRef::original(Entity::MenuPage),
                Table::new(["id", "menu_id"]),
            )
            .with_table(
                TableRef::original(Entity::MenuItem),
                Table::new(["id", "menu_page_id", "dish_id"]),
            )
            .with_table(TableRef::original(Entity::Dish), Table::new(["id", "name"]))
    }

    #[test]
    fn accepts_complete_snapshot() {
        assert!(validate_snapshot(&base_snapshot()).is_ok());
    }

    #[test]
    fn reports_every_missing_original_table() {
        let mut snapshot = base_snapshot();
        snapshot.tables.remove("Dish");
        snapshot.tables.remove("MenuPage");

        match validate_snapshot(&snapshot) {
            Err(Error::MissingTables(tables)) => {
                assert_eq!(tables, vec!["MenuPage".to_string(), "Dish".to_string()]);
            }
            other => panic!("expected missing tables, got {other:?}"),
        }
    }

    #[test]
    fn cleaned_tables_are_optional() {
        let snapshot = base_snapshot().with_table(
            TableRef::cleaned(Entity::Dish),
            Table::new(["id", "name"]),
        );
        assert!(validate_snapshot(&snapshot).is_ok());
    }

    #[test]
    fn rejects_ragged_rows() {
        let mut snapshot = base_snapshot();
        snapshot.insert(
            TableRef::original(Entity::Dish),
            Table::with_rows(["id", "name"], vec![vec![Value::Int(1)]]),
        );

        let err = validate_snapshot(&snapshot).expect_err("ragged row");
        assert!(err.to_string().contains("row 1 of Dish"));
    }

    #[test]
    fn rejects_duplicate_columns_ignoring_case() {
        let mut snapshot = base_snapshot();
        snapshot.insert(
            TableRef::original(Entity::Menu),
            Table::new(["id", "ID"]),
        );

        assert!(matches!(
            validate_snapshot(&snapshot),
            Err(Error::InvalidSnapshot(_))
        ));
    }
}
