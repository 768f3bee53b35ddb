//! End-to-end diff scenarios.

use quarry_diff::diff;
use quarry_model::{
    Annotation, ColumnDescriptor, CompareKey, ResultSet, ResultSetMeta, Row, SemanticType, Value,
};

fn columns(names: &[&str]) -> Vec<ColumnDescriptor> {
    names
        .iter()
        .map(|n| ColumnDescriptor::new(*n, SemanticType::Text))
        .collect()
}

fn keyed_set(names: &[&str], key_columns: &[&str]) -> ResultSet {
    ResultSet::new(columns(names)).with_meta(ResultSetMeta {
        compare_keys: vec![CompareKey::Primary {
            names: key_columns.iter().map(ToString::to_string).collect(),
        }],
        ..ResultSetMeta::default()
    })
}

fn user_row(id: i64, name: &str) -> Row {
    Row::from_pairs([("id", Value::Int(id)), ("name", Value::Text(name.into()))])
}

/// Old `[{1,a},{2,b}]` vs new `[{1,A},{3,c}]`: one update, one delete,
/// one insert.
#[test]
fn insert_delete_update_scenario() {
    let mut old = keyed_set(&["id", "name"], &["id"]);
    old.push_row(user_row(1, "a"));
    old.push_row(user_row(2, "b"));
    let mut new = ResultSet::new(columns(&["id", "name"]));
    new.push_row(user_row(1, "A"));
    new.push_row(user_row(3, "c"));

    let summary = diff(&mut old, &mut new).unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.deleted, 1);
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.message, "Inserted:1, Deleted:1, Updated:1");

    // Row id=1: paired Upd annotations carrying the counterpart value.
    assert_eq!(
        old.rows[0].annotations_for("name"),
        &[Annotation::Upd {
            counterpart: Value::Text(String::from("A"))
        }]
    );
    assert_eq!(
        new.rows[0].annotations_for("name"),
        &[Annotation::Upd {
            counterpart: Value::Text(String::from("a"))
        }]
    );
    // The unchanged key column carries nothing.
    assert!(old.rows[0].annotations_for("id").is_empty());

    // Row id=2: every column marked deleted.
    assert_eq!(old.rows[1].annotations_for("id"), &[Annotation::Del]);
    assert_eq!(old.rows[1].annotations_for("name"), &[Annotation::Del]);

    // Row id=3: every column marked added, exactly once.
    assert_eq!(new.rows[1].annotations_for("id"), &[Annotation::Add]);
    assert_eq!(new.rows[1].annotations_for("name"), &[Annotation::Add]);
}

/// Identical sets produce no annotations and the "No changes" message.
#[test]
fn identical_sets_report_no_changes() {
    let mut old = keyed_set(&["id", "name"], &["id"]);
    old.push_row(user_row(1, "a"));
    let mut new = ResultSet::new(columns(&["id", "name"]));
    new.push_row(user_row(1, "a"));

    let summary = diff(&mut old, &mut new).unwrap();
    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.deleted, 0);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.message, "No changes");
    assert!(old.rows[0].annotations_for("name").is_empty());
    assert!(new.rows[0].annotations_for("name").is_empty());
}

/// Running the same diff twice yields identical annotations, not
/// doubled ones.
#[test]
fn repeated_diff_is_idempotent() {
    let mut old = keyed_set(&["id", "name"], &["id"]);
    old.push_row(user_row(1, "a"));
    old.push_row(user_row(2, "b"));
    let mut new = ResultSet::new(columns(&["id", "name"]));
    new.push_row(user_row(1, "A"));

    let first = diff(&mut old, &mut new).unwrap();
    let old_after_first = old.clone();
    let new_after_first = new.clone();

    let second = diff(&mut old, &mut new).unwrap();
    assert_eq!(first, second);
    assert_eq!(old, old_after_first);
    assert_eq!(new, new_after_first);
    assert_eq!(old.rows[0].annotations_for("name").len(), 1);
}

/// Several differing columns in one row still count the row once.
#[test]
fn multi_column_change_counts_one_update() {
    let mut old = keyed_set(&["id", "name", "email"], &["id"]);
    old.push_row(Row::from_pairs([
        ("id", "1"),
        ("name", "a"),
        ("email", "a@x"),
    ]));
    let mut new = ResultSet::new(columns(&["id", "name", "email"]));
    new.push_row(Row::from_pairs([
        ("id", "1"),
        ("name", "b"),
        ("email", "b@x"),
    ]));

    let summary = diff(&mut old, &mut new).unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(old.rows[0].annotations_for("name").len(), 1);
    assert_eq!(old.rows[0].annotations_for("email").len(), 1);
}

/// A composite compare key matches rows by the joined member values.
#[test]
fn composite_key_matches_across_sets() {
    let mut old = keyed_set(&["org", "user", "role"], &["org", "user"]);
    old.push_row(Row::from_pairs([
        ("org", "acme"),
        ("user", "sam"),
        ("role", "admin"),
    ]));
    let mut new = ResultSet::new(columns(&["org", "user", "role"]));
    new.push_row(Row::from_pairs([
        ("org", "acme"),
        ("user", "sam"),
        ("role", "viewer"),
    ]));

    let summary = diff(&mut old, &mut new).unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.message, "Inserted:0, Deleted:0, Updated:1");
}
