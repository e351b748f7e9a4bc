//! Declarative constraint catalogue.
//!
//! Each constraint is a named descriptor around a [`Rule`]; the evaluator
//! iterates descriptors generically and never branches on constraint names.

use chrono::NaiveDate;
use menuguard_core::{Entity, TableRef};
use serde::{Deserialize, Serialize};

use crate::options::EvaluateOptions;

/// Reporting group of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Referential,
    ValueRange,
    Completeness,
    Consistency,
    PostCleaning,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Referential => "referential",
            Category::ValueRange => "value_range",
            Category::Completeness => "completeness",
            Category::Consistency => "consistency",
            Category::PostCleaning => "post_cleaning",
        }
    }
}

/// A named integrity constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDef {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub rule: Rule,
}

impl ConstraintDef {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        rule: Rule,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category,
            rule,
        }
    }
}

/// The table a rule scans, its key column, and the label the key is reported under.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub table: TableRef,
    pub key: String,
    pub key_label: String,
}

impl Target {
    pub fn new(table: TableRef, key: impl Into<String>, key_label: impl Into<String>) -> Self {
        Self {
            table,
            key: key.into(),
            key_label: key_label.into(),
        }
    }
}

/// Predicate descriptor, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Referential(ReferenceRule),
    Range(RangeRule),
    Text(TextRule),
    CrossCount(CountRule),
}

impl Rule {
    /// Tables that must be present for the rule to apply.
    pub fn required_tables(&self) -> Vec<TableRef> {
        match self {
            Rule::Referential(rule) => vec![rule.child.table, rule.parent],
            Rule::Range(rule) => vec![rule.target().table],
            Rule::Text(rule) => vec![rule.target().table],
            Rule::CrossCount(CountRule::Childless { target, child, .. }) => {
                vec![target.table, *child]
            }
            Rule::CrossCount(CountRule::DeclaredCount { target, path, .. }) => {
                let mut tables = vec![target.table];
                tables.extend(path.iter().map(|hop| hop.table));
                tables
            }
        }
    }
}

/// Every non-null `child.column` must match some `parent.parent_key`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRule {
    pub child: Target,
    pub column: String,
    pub column_label: String,
    pub parent: TableRef,
    pub parent_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RangeRule {
    /// `column < bound`.
    Below {
        target: Target,
        column: String,
        bound: f64,
    },
    /// `column > bound`.
    Above {
        target: Target,
        column: String,
        bound: f64,
    },
    /// `high < low` when both are present.
    Inverted {
        target: Target,
        low: String,
        high: String,
    },
    /// `column` (a `YYYY-MM-DD` date) is after `cutoff`.
    DateAfter {
        target: Target,
        column: String,
        cutoff: NaiveDate,
    },
}

impl RangeRule {
    pub fn target(&self) -> &Target {
        match self {
            RangeRule::Below { target, .. }
            | RangeRule::Above { target, .. }
            | RangeRule::Inverted { target, .. }
            | RangeRule::DateAfter { target, .. } => target,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextRule {
    /// Null or whitespace-only text.
    Blank { target: Target, column: String },
    /// Every pair of rows sharing the same non-blank text, reported once as `(lower key, higher key)`.
    Duplicate { target: Target, column: String },
    /// Non-null text that is blank, untrimmed, starts lowercase, or repeats whitespace.
    Formatting { target: Target, column: String },
}

impl TextRule {
    pub fn target(&self) -> &Target {
        match self {
            TextRule::Blank { target, .. }
            | TextRule::Duplicate { target, .. }
            | TextRule::Formatting { target, .. } => target,
        }
    }
}

/// One parent-to-child step of a count path.
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    pub table: TableRef,
    pub key: String,
    pub parent_column: String,
}

impl Hop {
    pub fn new(table: TableRef, key: impl Into<String>, parent_column: impl Into<String>) -> Self {
        Self {
            table,
            key: key.into(),
            parent_column: parent_column.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CountRule {
    /// Target rows that no `child.child_column` refers to. `carry` columns are echoed.
    Childless {
        target: Target,
        carry: Vec<String>,
        child: TableRef,
        child_column: String,
    },
    /// Declared count differs from the rows reachable along `path`.
    DeclaredCount {
        target: Target,
        declared: String,
        path: Vec<Hop>,
    },
}

/// Build the default fifteen-constraint catalogue.
pub fn default_catalogue(options: &EvaluateOptions) -> Vec<ConstraintDef> {
    let menu = TableRef::original(Entity::Menu);
    let page = TableRef::original(Entity::MenuPage);
    let item = TableRef::original(Entity::MenuItem);
    let dish = TableRef::original(Entity::Dish);
    let item_cleaned = TableRef::cleaned(Entity::MenuItem);
    let dish_cleaned = TableRef::cleaned(Entity::Dish);

    vec![
        ConstraintDef::new(
            "missing_dish_references",
            "Menu items referencing non-existent dishes",
            Category::Referential,
            Rule::Referential(ReferenceRule {
                child: Target::new(item, "id", "menu_item_id"),
                column: "dish_id".to_string(),
                column_label: "dish_id".to_string(),
                parent: dish,
                parent_key: "id".to_string(),
            }),
        ),
        ConstraintDef::new(
            "missing_menu_references",
            "Menu pages referencing non-existent menus",
            Category::Referential,
            Rule::Referential(ReferenceRule {
                child: Target::new(page, "id", "page_id"),
                column: "menu_id".to_string(),
                column_label: "menu_id".to_string(),
                parent: menu,
                parent_key: "id".to_string(),
            }),
        ),
        ConstraintDef::new(
            "missing_page_references",
            "Menu items referencing non-existent menu pages",
            Category::Referential,
            Rule::Referential(ReferenceRule {
                child: Target::new(item, "id", "item_id"),
                column: "menu_page_id".to_string(),
                column_label: "page_id".to_string(),
                parent: page,
                parent_key: "id".to_string(),
            }),
        ),
        ConstraintDef::new(
            "invalid_negative_prices",
            "Menu items with negative prices",
            Category::ValueRange,
            Rule::Range(RangeRule::Below {
                target: Target::new(item, "id", "item_id"),
                column: "price".to_string(),
                bound: 0.0,
            }),
        ),
        ConstraintDef::new(
            "inconsistent_price_ranges",
            "Menu items where high_price < price",
            Category::ValueRange,
            Rule::Range(RangeRule::Inverted {
                target: Target::new(item, "id", "item_id"),
                low: "price".to_string(),
                high: "high_price".to_string(),
            }),
        ),
        ConstraintDef::new(
            "extreme_price_outliers",
            format!(
                "Menu items with extremely high prices (>${})",
                options.extreme_price_threshold
            ),
            Category::ValueRange,
            Rule::Range(RangeRule::Above {
                target: Target::new(item, "id", "item_id"),
                column: "price".to_string(),
                bound: options.extreme_price_threshold,
            }),
        ),
        ConstraintDef::new(
            "empty_dish_names",
            "Dishes with empty or null names",
            Category::Completeness,
            Rule::Text(TextRule::Blank {
                target: Target::new(dish, "id", "dish_id"),
                column: "name".to_string(),
            }),
        ),
        ConstraintDef::new(
            "duplicate_dish_names",
            "Dishes with duplicate names",
            Category::Completeness,
            Rule::Text(TextRule::Duplicate {
                target: Target::new(dish, "id", "dish_id"),
                column: "name".to_string(),
            }),
        ),
        ConstraintDef::new(
            "empty_menu_pages",
            "Menu pages with no menu items",
            Category::Consistency,
            Rule::CrossCount(CountRule::Childless {
                target: Target::new(page, "id", "page_id"),
                carry: vec!["menu_id".to_string()],
                child: item,
                child_column: "menu_page_id".to_string(),
            }),
        ),
        ConstraintDef::new(
            "inconsistent_page_counts",
            "Menus with inconsistent page counts",
            Category::Consistency,
            Rule::CrossCount(CountRule::DeclaredCount {
                target: Target::new(menu, "id", "menu_id"),
                declared: "page_count".to_string(),
                path: vec![Hop::new(page, "id", "menu_id")],
            }),
        ),
        ConstraintDef::new(
            "inconsistent_dish_counts",
            "Menus with inconsistent dish counts",
            Category::Consistency,
            Rule::CrossCount(CountRule::DeclaredCount {
                target: Target::new(menu, "id", "menu_id"),
                declared: "dish_count".to_string(),
                path: vec![
                    Hop::new(page, "id", "menu_id"),
                    Hop::new(item, "id", "menu_page_id"),
                ],
            }),
        ),
        ConstraintDef::new(
            "anachronistic_dates",
            format!(
                "Menus dated after {} (anachronistic for a historical dataset)",
                options.date_cutoff.format("%Y-%m-%d")
            ),
            Category::Consistency,
            Rule::Range(RangeRule::DateAfter {
                target: Target::new(menu, "id", "menu_id"),
                column: "date".to_string(),
                cutoff: options.date_cutoff,
            }),
        ),
        ConstraintDef::new(
            "cleaning_broke_references",
            "Cleaned data broke referential integrity",
            Category::PostCleaning,
            Rule::Referential(ReferenceRule {
                child: Target::new(item_cleaned, "id", "item_id"),
                column: "dish_id".to_string(),
                column_label: "dish_id".to_string(),
                parent: dish_cleaned,
                parent_key: "id".to_string(),
            }),
        ),
        ConstraintDef::new(
            "uncapped_outliers_remain",
            format!(
                "Price outliers remain uncapped after cleaning (>${})",
                options.cleaned_price_threshold
            ),
            Category::PostCleaning,
            Rule::Range(RangeRule::Above {
                target: Target::new(item_cleaned, "id", "item_id"),
                column: "price".to_string(),
                bound: options.cleaned_price_threshold,
            }),
        ),
        ConstraintDef::new(
            "uncleaned_dish_names",
            "Dish names with formatting issues (empty, untrimmed, not starting with a capital, or repeated spaces)",
            Category::PostCleaning,
            Rule::Text(TextRule::Formatting {
                target: Target::new(dish_cleaned, "id", "dish_id"),
                column: "name".to_string(),
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn default_catalogue_has_fifteen_unique_names() {
        let catalogue = default_catalogue(&EvaluateOptions::default());
        let names = catalogue
            .iter()
            .map(|def| def.name.as_str())
            .collect::<BTreeSet<_>>();
        assert_eq!(catalogue.len(), 15);
        assert_eq!(names.len(), 15);
    }

    #[test]
    fn post_cleaning_rules_require_cleaned_tables_only() {
        let catalogue = default_catalogue(&EvaluateOptions::default());
        for def in &catalogue {
            let stages = def
                .rule
                .required_tables()
                .iter()
                .map(|table| table.stage)
                .collect::<BTreeSet<_>>();
            let expected = if def.category == Category::PostCleaning {
                menuguard_core::Stage::Cleaned
            } else {
                menuguard_core::Stage::Original
            };
            assert_eq!(stages, BTreeSet::from([expected]), "{}", def.name);
        }
    }

    #[test]
    fn thresholds_flow_from_options() {
        let options = EvaluateOptions {
            extreme_price_threshold: 250.0,
            ..EvaluateOptions::default()
        };
        let catalogue = default_catalogue(&options);
        let outliers = catalogue
            .iter()
            .find(|def| def.name == "extreme_price_outliers")
            .expect("outlier constraint");
        match &outliers.rule {
            Rule::Range(RangeRule::Above { bound, .. }) => assert_eq!(*bound, 250.0),
            other => panic!("unexpected rule {other:?}"),
        }
        assert!(outliers.description.contains("250"));
    }
}
