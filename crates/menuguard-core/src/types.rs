use std::cmp::Ordering;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The four entities of the menu dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Entity {
    Menu,
    MenuPage,
    MenuItem,
    Dish,
}

impl Entity {
    pub const ALL: [Entity; 4] = [
        Entity::Menu,
        Entity::MenuPage,
        Entity::MenuItem,
        Entity::Dish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Menu => "Menu",
            Entity::MenuPage => "MenuPage",
            Entity::MenuItem => "MenuItem",
            Entity::Dish => "Dish",
        }
    }
}

/// Which copy of an entity a table holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Original,
    Cleaned,
}

/// Address of one table inside a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub entity: Entity,
    pub stage: Stage,
}

impl TableRef {
    pub const fn original(entity: Entity) -> Self {
        Self {
            entity,
            stage: Stage::Original,
        }
    }

    pub const fn cleaned(entity: Entity) -> Self {
        Self {
            entity,
            stage: Stage::Cleaned,
        }
    }

    /// Table name used as the snapshot key (`MenuItem`, `MenuItem_cleaned`).
    pub fn name(&self) -> String {
        match self.stage {
            Stage::Original => self.entity.as_str().to_string(),
            Stage::Cleaned => format!("{}_cleaned", self.entity.as_str()),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value; numeric text is parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            Value::Text(value) => parse_finite(value),
            Value::Null | Value::Bool(_) => None,
        }
    }

    /// Integer view of the value; integral floats and numeric text are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            Value::Float(value) => integral(*value),
            Value::Text(value) => {
                let trimmed = value.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| parse_finite(trimmed).and_then(integral))
            }
            Value::Null | Value::Bool(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Normalized join key. `5`, `5.0` and `"5"` share the key `"5"`; text is trimmed.
    pub fn key(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(value) => Some(value.to_string()),
            Value::Int(value) => Some(value.to_string()),
            Value::Float(value) => Some(float_key(*value)),
            Value::Text(value) => {
                let trimmed = value.trim();
                if let Ok(number) = trimmed.parse::<i64>() {
                    Some(number.to_string())
                } else if let Some(number) = parse_finite(trimmed) {
                    Some(float_key(number))
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }

    /// Total order used to sort rows by key: nulls first, then numbers, then text.
    pub fn key_cmp(&self, other: &Value) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        match (self.as_f64(), other.as_f64()) {
            (Some(left), Some(right)) => left.total_cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.key().cmp(&other.key()),
        }
    }

    /// Short type label used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Text(value) => write!(f, "'{value}'"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

fn parse_finite(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn integral(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

fn float_key(value: f64) -> String {
    integral(value)
        .map(|number| number.to_string())
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_spellings_share_a_key() {
        let int = Value::Int(5);
        let float = Value::Float(5.0);
        let text = Value::Text(" 5 ".to_string());
        assert_eq!(int.key(), Some("5".to_string()));
        assert_eq!(float.key(), int.key());
        assert_eq!(text.key(), int.key());
        assert_eq!(Value::Null.key(), None);
    }

    #[test]
    fn text_keys_ignore_surrounding_whitespace() {
        assert_eq!(Value::from(" abc ").key(), Value::from("abc").key());
        assert_eq!(Value::from(" 5").key(), Value::from("5").key());
        assert_ne!(Value::from("a bc").key(), Value::from("abc").key());
    }

    #[test]
    fn key_order_puts_nulls_first_and_compares_numbers_numerically() {
        let mut values = vec![
            Value::Int(10),
            Value::Text("abc".to_string()),
            Value::Null,
            Value::Float(2.5),
        ];
        values.sort_by(|a, b| a.key_cmp(b));
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Float(2.5),
                Value::Int(10),
                Value::Text("abc".to_string()),
            ]
        );
    }

    #[test]
    fn non_finite_text_is_not_numeric() {
        assert_eq!(Value::from("1.25").as_f64(), Some(1.25));
        assert_eq!(Value::from("inf").as_f64(), None);
        assert_eq!(Value::from("NaN").key(), Some("NaN".to_string()));
        assert_eq!(Value::from("7.0").as_i64(), Some(7));
    }

    #[test]
    fn cleaned_tables_carry_a_suffix() {
        assert_eq!(TableRef::original(Entity::MenuItem).name(), "MenuItem");
        assert_eq!(TableRef::cleaned(Entity::Dish).name(), "Dish_cleaned");
    }

    #[test]
    fn untagged_values_round_trip_through_json() {
        let values: Vec<Value> =
            serde_json::from_str(r#"[null, true, 3, 2.5, "Soup"]"#).expect("parse values");
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(3),
                Value::Float(2.5),
                Value::Text("Soup".to_string()),
            ]
        );
    }
}
