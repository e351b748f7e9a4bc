#![allow(dead_code)]

use menuguard_core::{Entity, Snapshot, Table, TableRef, Value};

pub fn menu_columns() -> Vec<&'static str> {
    vec!["id", "date", "location", "place", "page_count", "dish_count"]
}

pub fn item_columns() -> Vec<&'static str> {
    vec!["id", "menu_page_id", "dish_id", "price", "high_price"]
}

pub fn menu(id: i64, date: &str, page_count: i64, dish_count: i64) -> Vec<Value> {
    vec![
        Value::Int(id),
        Value::from(date),
        Value::from("Hotel Eastman"),
        Value::from("Hot Springs, AR"),
        Value::Int(page_count),
        Value::Int(dish_count),
    ]
}

pub fn page(id: i64, menu_id: Option<i64>) -> Vec<Value> {
    vec![Value::Int(id), Value::from(menu_id)]
}

pub fn item(
    id: i64,
    page_id: Option<i64>,
    dish_id: Option<i64>,
    price: Option<f64>,
    high_price: Option<f64>,
) -> Vec<Value> {
    vec![
        Value::Int(id),
        Value::from(page_id),
        Value::from(dish_id),
        Value::from(price),
        Value::from(high_price),
    ]
}

pub fn dish(id: i64, name: Option<&str>) -> Vec<Value> {
    vec![
        Value::Int(id),
        Value::from(name),
        Value::Int(1900),
        Value::Int(1910),
    ]
}

pub fn menu_table(rows: Vec<Vec<Value>>) -> Table {
    Table::with_rows(menu_columns(), rows)
}

pub fn page_table(rows: Vec<Vec<Value>>) -> Table {
    Table::with_rows(["id", "menu_id"], rows)
}

pub fn item_table(rows: Vec<Vec<Value>>) -> Table {
    Table::with_rows(item_columns(), rows)
}

pub fn dish_table(rows: Vec<Vec<Value>>) -> Table {
    Table::with_rows(["id", "name", "first_appeared", "last_appeared"], rows)
}

/// One menu with one page, two items, two dishes; satisfies every original constraint.
pub fn consistent_snapshot() -> Snapshot {
    Snapshot::labeled("original")
        .with_table(
            TableRef::original(Entity::Menu),
            menu_table(vec![menu(1, "1900-04-15", 1, 2)]),
        )
        .with_table(
            TableRef::original(Entity::MenuPage),
            page_table(vec![page(10, Some(1))]),
        )
        .with_table(
            TableRef::original(Entity::MenuItem),
            item_table(vec![
                item(100, Some(10), Some(7), Some(0.5), None),
                item(101, Some(10), Some(8), Some(1.0), Some(1.5)),
            ]),
        )
        .with_table(
            TableRef::original(Entity::Dish),
            dish_table(vec![dish(7, Some("Consomme")), dish(8, Some("Oysters"))]),
        )
}

/// Replace one table of the snapshot.
pub fn replace(mut snapshot: Snapshot, entity: Entity, table: Table) -> Snapshot {
    snapshot.insert(TableRef::original(entity), table);
    snapshot
}

/// Add cleaned copies of items and dishes.
pub fn with_cleaned(snapshot: Snapshot, items: Table, dishes: Table) -> Snapshot {
    snapshot
        .with_table(TableRef::cleaned(Entity::MenuItem), items)
        .with_table(TableRef::cleaned(Entity::Dish), dishes)
}
