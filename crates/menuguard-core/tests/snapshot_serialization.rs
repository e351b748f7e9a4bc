use menuguard_core::{Entity, Snapshot, Table, TableRef, Value, validate_snapshot};
use schemars::schema_for;

const SNAPSHOT_JSON: &str = r#"{
  "label": "original",
  "tables": {
    "Menu": {
      "columns": ["id", "date", "location", "place", "page_count", "dish_count"],
      "rows": [[5, "1900-04-15", "Hotel Eastman", "Hot Springs, AR", 2, 3]]
    },
    "MenuPage": {
      "columns": ["id", "menu_id"],
      "rows": [[10, 5], [11, 5]]
    },
    "MenuItem": {
      "columns": ["id", "menu_page_id", "dish_id", "price", "high_price"],
      "rows": [[1, 10, 7, 0.4, null], [2, 11, 8, 1.25, 1.5], [3, 11, null, null, null]]
    },
    "Dish": {
      "columns": ["id", "name", "first_appeared", "last_appeared"],
      "rows": [[7, "Consomme", 1897, 1927], [8, "Soup", 1900, 1900]]
    }
  }
}"#;

#[test]
fn snapshot_parses_from_json() {
    let snapshot: Snapshot = serde_json::from_str(SNAPSHOT_JSON).expect("parse snapshot");

    assert_eq!(snapshot.label.as_deref(), Some("original"));
    validate_snapshot(&snapshot).expect("snapshot is structurally valid");

    let items = snapshot
        .table(TableRef::original(Entity::MenuItem))
        .expect("menu items present");
    assert_eq!(items.len(), 3);
    let price = items.column_index("PRICE").expect("price column");
    assert_eq!(items.rows[0][price], Value::Float(0.4));
    assert_eq!(items.rows[2][price], Value::Null);

    assert_eq!(
        snapshot.row_counts(),
        vec![
            ("Dish".to_string(), 2),
            ("Menu".to_string(), 1),
            ("MenuItem".to_string(), 3),
            ("MenuPage".to_string(), 2),
        ]
    );
}

#[test]
fn cleaned_tables_use_suffixed_keys() {
    let mut items = Table::new(["id", "price"]);
    items.push_row(vec![Value::Int(1), Value::Float(12.0)]);
    assert!(!items.is_empty());
    let snapshot =
        Snapshot::labeled("cleaned").with_table(TableRef::cleaned(Entity::MenuItem), items);

    let json = serde_json::to_value(&snapshot).expect("serialize snapshot");
    assert!(json["tables"]["MenuItem_cleaned"].is_object());
    assert!(!snapshot.contains(TableRef::original(Entity::MenuItem)));
}

#[test]
fn json_schema_describes_tables() {
    let generated = schema_for!(Snapshot);
    let json = serde_json::to_value(&generated).expect("serialize generated schema");

    assert_eq!(json["title"], "Snapshot");
    assert!(json["properties"]["tables"].is_object());
    assert!(json["definitions"]["Table"].is_object());
    assert!(json["definitions"]["Value"].is_object());
}
