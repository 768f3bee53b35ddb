//! Result sets, rows, and per-cell annotations.
//!
//! A result set is what a driver hands back for one query: an ordered
//! list of column descriptors, the rows, and metadata describing where
//! the set came from and how its rows are identified. The diff and
//! validation engines mutate row annotations in place; a run always
//! clears the previous run's annotations first, so repeated runs never
//! accumulate markers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rules::{NamedRule, RuleNode};
use crate::types::ColumnDescriptor;
use crate::value::{BindMap, Value};

/// A marker attached to a specific row/column by the diff or validation
/// engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Annotation {
    /// The row exists only in the new set.
    Add,
    /// The row exists only in the old set.
    Del,
    /// The value changed; carries the counterpart value from the other
    /// set.
    Upd {
        /// The value this cell has in the other result set.
        counterpart: Value,
    },
    /// A validation rule flagged this row.
    Rul {
        /// Name of the violated rule.
        rule: String,
        /// Human-readable violation message.
        message: String,
        /// The fact values that triggered the rule.
        facts: Vec<FactValue>,
    },
}

/// A fact name together with the value it had when a rule fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactValue {
    /// Fact (column) name.
    pub fact: String,
    /// Value at evaluation time; `Null` when the fact was absent.
    pub value: Value,
}

/// The column or columns whose values identify "the same logical row"
/// across two result sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CompareKey {
    /// Primary-key columns; their concatenated values form the identity.
    Primary {
        /// Ordered member column names.
        names: Vec<String>,
    },
    /// User-picked columns, same composite semantics as `Primary`.
    Custom {
        /// Ordered member column names.
        names: Vec<String>,
    },
    /// A single unique column.
    Uniq {
        /// The column name.
        name: String,
    },
}

impl CompareKey {
    /// The column names this key references.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Primary { names } | Self::Custom { names } => {
                names.iter().map(String::as_str).collect()
            }
            Self::Uniq { name } => vec![name.as_str()],
        }
    }

    /// A compare key is usable against a result set only if every
    /// referenced column exists in the set's keys.
    #[must_use]
    pub fn satisfied_by(&self, keys: &[ColumnDescriptor]) -> bool {
        self.columns()
            .iter()
            .all(|name| keys.iter().any(|k| k.name == *name))
    }
}

/// One row: a name→value map plus per-column annotation lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Cell values by column name. Column order lives on the result
    /// set's `keys`, not here.
    pub values: BTreeMap<String, Value>,
    /// Annotations by column name, appended by diff/validation runs.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, Vec<Annotation>>,
}

impl Row {
    /// Builds a row from (column, value) pairs.
    pub fn from_pairs<N, V>(pairs: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
            annotations: BTreeMap::new(),
        }
    }

    /// Returns the cell value for a column, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Appends an annotation to a column's list.
    pub fn annotate(&mut self, column: &str, annotation: Annotation) {
        self.annotations
            .entry(column.to_string())
            .or_default()
            .push(annotation);
    }

    /// Annotations recorded for a column.
    #[must_use]
    pub fn annotations_for(&self, column: &str) -> &[Annotation] {
        self.annotations
            .get(column)
            .map_or(&[], |list| list.as_slice())
    }

    /// Drops every annotation on this row.
    pub fn clear_annotations(&mut self) {
        self.annotations.clear();
    }
}

/// SQL provenance of a result set: the statement that produced it and
/// the query conditions it was built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlProvenance {
    /// Statement text as sent to the driver.
    pub statement: String,
    /// The rule tree the statement's WHERE clause was compiled from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<RuleNode>,
}

/// Metadata a result set carries alongside its rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSetMeta {
    /// Connection the set was fetched over.
    #[serde(default)]
    pub connection: String,
    /// Table the set was fetched from.
    #[serde(default)]
    pub table: String,
    /// Declared compare keys, in preference order.
    #[serde(default, rename = "compareKeys")]
    pub compare_keys: Vec<CompareKey>,
    /// Validation rules attached to this set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<NamedRule>,
    /// Where the set came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<SqlProvenance>,
}

/// An ordered sequence of column descriptors plus rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Column descriptors in display order.
    pub keys: Vec<ColumnDescriptor>,
    /// Row data.
    pub rows: Vec<Row>,
    /// Provenance and identity metadata.
    #[serde(default)]
    pub meta: ResultSetMeta,
}

impl ResultSet {
    /// Creates an empty result set with the given columns.
    #[must_use]
    pub fn new(keys: Vec<ColumnDescriptor>) -> Self {
        Self {
            keys,
            rows: Vec::new(),
            meta: ResultSetMeta::default(),
        }
    }

    /// Replaces the metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: ResultSetMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Appends a row.
    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Returns `true` if the set has a column with this name.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.keys.iter().any(|k| k.name == name)
    }

    /// Column names in display order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.keys.iter().map(|k| k.name.as_str()).collect()
    }

    /// Drops every annotation on every row. Diff and validation runs
    /// call this first so repeated runs stay idempotent.
    pub fn clear_annotations(&mut self) {
        for row in &mut self.rows {
            row.clear_annotations();
        }
    }
}

/// What a driver receives to execute one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    /// SQL text, possibly with `:name` placeholders.
    pub sql: String,
    /// Conditions the WHERE clause is compiled from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<RuleNode>,
    /// Named bind values for the SQL's placeholders.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub binds: BindMap,
}
