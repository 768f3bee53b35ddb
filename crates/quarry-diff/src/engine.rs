//! The row-set diff algorithm.

use std::collections::BTreeSet;

use quarry_model::{Annotation, CompareKey, ResultSet, Row, Value};
use tracing::debug;

use crate::error::{DiffError, Result};

/// Joins composite-key member values. Control characters cannot occur
/// in real cell text, so the concatenation never collides with data.
const KEY_SEPARATOR: &str = "\u{1}\u{2}";

/// Aggregate outcome of one diff run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSummary {
    /// Rows present only in the new set.
    pub inserted: usize,
    /// Rows present only in the old set.
    pub deleted: usize,
    /// Rows present in both with at least one differing column.
    pub updated: usize,
    /// Human-readable summary of the three counters.
    pub message: String,
}

/// Compares two result sets row-by-row using the old set's compare key,
/// mutating both sets' row annotations in place.
///
/// Prior annotations on both sets are cleared first, so repeated calls
/// on the same pair are idempotent. Rows are matched by a linear scan
/// with first-match-wins; no ordering is assumed between the sets.
///
/// # Errors
///
/// [`DiffError::NoCompareKey`] when the old set declares none, and
/// [`DiffError::UnusableCompareKey`] when no declared key is fully
/// satisfiable by the old set's columns. In both cases no mutation has
/// happened.
pub fn diff(old: &mut ResultSet, new: &mut ResultSet) -> Result<DiffSummary> {
    let key = usable_key(old)?;
    old.clear_annotations();
    new.clear_annotations();

    let key_columns: Vec<String> = key.columns().iter().map(|s| (*s).to_string()).collect();
    let old_columns: Vec<String> = old.keys.iter().map(|k| k.name.clone()).collect();
    let new_columns: Vec<String> = new.keys.iter().map(|k| k.name.clone()).collect();

    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut inserted = 0_usize;
    let mut deleted = 0_usize;
    let mut updated = 0_usize;

    for old_row in &mut old.rows {
        let key_value = row_key(old_row, &key_columns);
        seen.insert(key_value.clone());

        let matched = new
            .rows
            .iter_mut()
            .find(|row| row_key(row, &key_columns) == key_value);
        match matched {
            None => {
                for column in &old_columns {
                    old_row.annotate(column, Annotation::Del);
                }
                deleted += 1;
            }
            Some(new_row) => {
                let mut changed = false;
                for column in &old_columns {
                    let old_value = old_row.get(column).cloned().unwrap_or(Value::Null);
                    let new_value = new_row.get(column).cloned().unwrap_or(Value::Null);
                    if old_value.to_text() != new_value.to_text() {
                        old_row.annotate(
                            column,
                            Annotation::Upd {
                                counterpart: new_value,
                            },
                        );
                        new_row.annotate(
                            column,
                            Annotation::Upd {
                                counterpart: old_value,
                            },
                        );
                        changed = true;
                    }
                }
                if changed {
                    updated += 1;
                }
            }
        }
    }

    for new_row in &mut new.rows {
        if !seen.contains(&row_key(new_row, &key_columns)) {
            for column in &new_columns {
                new_row.annotate(column, Annotation::Add);
            }
            inserted += 1;
        }
    }

    debug!(inserted, deleted, updated, "diffed result sets");
    let message = if inserted == 0 && deleted == 0 && updated == 0 {
        String::from("No changes")
    } else {
        format!("Inserted:{inserted}, Deleted:{deleted}, Updated:{updated}")
    };
    Ok(DiffSummary {
        inserted,
        deleted,
        updated,
        message,
    })
}

/// The first declared compare key that the old set's columns satisfy.
fn usable_key(old: &ResultSet) -> Result<CompareKey> {
    if old.meta.compare_keys.is_empty() {
        return Err(DiffError::NoCompareKey);
    }
    old.meta
        .compare_keys
        .iter()
        .find(|key| key.satisfied_by(&old.keys))
        .cloned()
        .ok_or_else(|| DiffError::UnusableCompareKey {
            columns: old.keys.iter().map(|k| k.name.clone()).collect(),
        })
}

/// A row's identity under the compare key: the single raw value for a
/// one-column key, member values joined by [`KEY_SEPARATOR`] otherwise.
fn row_key(row: &Row, key_columns: &[String]) -> String {
    let parts: Vec<String> = key_columns
        .iter()
        .map(|column| row.get(column).map(Value::to_text).unwrap_or_default())
        .collect();
    parts.join(KEY_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_model::{ColumnDescriptor, ResultSetMeta, SemanticType};

    fn columns(names: &[&str]) -> Vec<ColumnDescriptor> {
        names
            .iter()
            .map(|n| ColumnDescriptor::new(*n, SemanticType::Text))
            .collect()
    }

    fn set_with_key(names: &[&str], key: CompareKey) -> ResultSet {
        ResultSet::new(columns(names)).with_meta(ResultSetMeta {
            compare_keys: vec![key],
            ..ResultSetMeta::default()
        })
    }

    #[test]
    fn test_no_compare_key_is_an_error() {
        let mut old = ResultSet::new(columns(&["id"]));
        let mut new = ResultSet::new(columns(&["id"]));
        assert_eq!(diff(&mut old, &mut new), Err(DiffError::NoCompareKey));
    }

    #[test]
    fn test_unsatisfiable_key_is_an_error_without_mutation() {
        let mut old = set_with_key(
            &["id"],
            CompareKey::Uniq {
                name: String::from("missing"),
            },
        );
        let mut row = Row::from_pairs([("id", 1_i64)]);
        row.annotate("id", Annotation::Add);
        old.push_row(row);
        let mut new = ResultSet::new(columns(&["id"]));

        let err = diff(&mut old, &mut new).unwrap_err();
        assert!(matches!(err, DiffError::UnusableCompareKey { .. }));
        // Stale annotation untouched: the failed call mutated nothing.
        assert_eq!(old.rows[0].annotations_for("id").len(), 1);
    }

    #[test]
    fn test_later_declared_key_is_used_when_first_is_unsatisfiable() {
        let mut old = set_with_key(
            &["id", "name"],
            CompareKey::Uniq {
                name: String::from("missing"),
            },
        );
        old.meta.compare_keys.push(CompareKey::Primary {
            names: vec![String::from("id")],
        });
        old.push_row(Row::from_pairs([("id", 1_i64)]));
        let mut new = ResultSet::new(columns(&["id", "name"]));
        new.push_row(Row::from_pairs([("id", 1_i64)]));

        assert!(diff(&mut old, &mut new).is_ok());
    }

    #[test]
    fn test_composite_key_values_do_not_glue() {
        // ("ab", "c") and ("a", "bc") must not collide.
        let key = CompareKey::Custom {
            names: vec![String::from("a"), String::from("b")],
        };
        let mut old = set_with_key(&["a", "b"], key);
        old.push_row(Row::from_pairs([("a", "ab"), ("b", "c")]));
        let mut new = ResultSet::new(columns(&["a", "b"]));
        new.push_row(Row::from_pairs([("a", "a"), ("b", "bc")]));

        let summary = diff(&mut old, &mut new).unwrap();
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.updated, 0);
    }

    #[test]
    fn test_null_and_missing_cells_compare_equal() {
        let key = CompareKey::Primary {
            names: vec![String::from("id")],
        };
        let mut old = set_with_key(&["id", "note"], key);
        old.push_row(Row::from_pairs([("id", Value::Int(1)), ("note", Value::Null)]));
        let mut new = ResultSet::new(columns(&["id", "note"]));
        new.push_row(Row::from_pairs([("id", Value::Int(1))]));

        let summary = diff(&mut old, &mut new).unwrap();
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.message, "No changes");
    }

    #[test]
    fn test_first_match_wins_on_duplicate_keys() {
        let key = CompareKey::Uniq {
            name: String::from("id"),
        };
        let mut old = set_with_key(&["id", "v"], key);
        old.push_row(Row::from_pairs([("id", "1"), ("v", "a")]));
        let mut new = ResultSet::new(columns(&["id", "v"]));
        new.push_row(Row::from_pairs([("id", "1"), ("v", "b")]));
        new.push_row(Row::from_pairs([("id", "1"), ("v", "a")]));

        let summary = diff(&mut old, &mut new).unwrap();
        // The first new row with the key is the counterpart, so the old
        // row reads as updated even though a later row matches exactly.
        assert_eq!(summary.updated, 1);
        assert_eq!(
            old.rows[0].annotations_for("v"),
            &[Annotation::Upd {
                counterpart: Value::Text(String::from("b"))
            }]
        );
    }
}
