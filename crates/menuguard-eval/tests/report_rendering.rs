mod support;

use menuguard_core::Entity;
use menuguard_eval::{compare, evaluate, render_comparison, render_report, summary_rows};

use support::*;

#[test]
fn clean_run_renders_all_passed() {
    let results = evaluate(&consistent_snapshot()).expect("evaluate");
    let report = render_report(&results, 5);

    assert!(report.starts_with("# Integrity Validation Report"));
    assert!(report.contains("- snapshot: original"));
    assert!(report.contains("All integrity constraints passed."));
    assert!(report.contains("| Missing Dish References | PASS | 0 |"));
    assert!(report.contains("| Cleaning Broke References | N/A | - |"));
    assert!(report.contains("| MenuItem | 2 |"));
    assert!(!report.contains("## Violation details"));
}

#[test]
fn violation_preview_is_capped() {
    let rows = (1..=7)
        .map(|id| item(id, Some(10), Some(7), Some(-(id as f64)), None))
        .collect::<Vec<_>>();
    let snapshot = replace(consistent_snapshot(), Entity::MenuItem, item_table(rows));
    let results = evaluate(&snapshot).expect("evaluate");
    let report = render_report(&results, 5);

    assert!(report.contains("### Invalid Negative Prices"));
    assert!(report.contains("- violations: 7"));
    assert!(report.contains("1. item_id=1, price=-1"));
    assert!(report.contains("5. item_id=5, price=-5"));
    assert!(!report.contains("item_id=6, price=-6"));
}

#[test]
fn evaluation_errors_are_listed() {
    let snapshot = replace(
        consistent_snapshot(),
        Entity::Menu,
        menu_table(vec![menu(1, "someday", 1, 2)]),
    );
    let results = evaluate(&snapshot).expect("evaluate");
    let report = render_report(&results, 5);

    assert!(report.contains("1 constraint(s) could not be evaluated."));
    assert!(report.contains("| Anachronistic Dates | ERROR | - |"));
    assert!(report.contains("## Evaluation errors"));
    assert!(report.contains("- anachronistic_dates: Menu.date row 1"));
}

#[test]
fn summary_rows_carry_titles_and_status() {
    let snapshot = replace(
        consistent_snapshot(),
        Entity::Dish,
        dish_table(vec![dish(7, Some("Consomme")), dish(8, None)]),
    );
    let results = evaluate(&snapshot).expect("evaluate");
    let rows = summary_rows(&results);

    assert_eq!(rows.len(), 15);
    let empty = rows
        .iter()
        .find(|row| row.constraint == "empty_dish_names")
        .expect("empty names row");
    assert_eq!(empty.title, "Empty Dish Names");
    assert_eq!(empty.violations, Some(1));
    assert_eq!(empty.status, "FAIL");

    let json = serde_json::to_value(&rows).expect("serialize rows");
    assert_eq!(json[0]["constraint"], "anachronistic_dates");
}

#[test]
fn comparison_report_lists_every_constraint() {
    let baseline = evaluate(&replace(
        consistent_snapshot(),
        Entity::MenuItem,
        item_table(vec![
            item(100, Some(10), Some(7), Some(-1.0), None),
            item(101, Some(10), Some(8), Some(1.0), None),
        ]),
    ))
    .expect("baseline");
    let candidate = evaluate(&consistent_snapshot()).expect("candidate");
    let comparison = compare(&baseline, &candidate);
    let report = render_comparison(&comparison);

    assert!(report.starts_with("# Validation Comparison Report"));
    assert!(report.contains("- violations_fixed: 1"));
    assert!(report.contains("- improvement_rate: 100.0%"));
    assert!(report.contains("All integrity violations have been resolved."));
    assert!(report.contains("| invalid_negative_prices | 1 | 0 | 1 | FIXED |"));
    assert!(report.contains("| cleaning_broke_references | n/a | n/a | 0 | CLEAN |"));
    let entry_rows = report
        .lines()
        .skip_while(|line| *line != "## Detailed comparison")
        .filter(|line| line.starts_with("| ") && !line.starts_with("| constraint |"))
        .filter(|line| !line.starts_with("| --- |"))
        .count();
    assert_eq!(entry_rows, comparison.entries.len());
    assert_eq!(entry_rows, 15);
}
