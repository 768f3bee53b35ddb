//! # quarry-model
//!
//! Shared data model for the Quarry data-access core: the uniform value
//! representation produced by drivers, semantic column types with lenient
//! coercion, tabular result sets with per-cell annotations, the boolean
//! rule-tree grammar used both for `WHERE` clause compilation and for row
//! validation, and the schema tree supplied by introspection.
//!
//! Everything in this crate is plain in-memory data: no I/O, no
//! connections, no SQL text manipulation. The SQL-side engines live in
//! `quarry-sql`; the diff and validation engines in `quarry-diff` and
//! `quarry-validate`.

pub mod resultset;
pub mod rules;
pub mod schema;
pub mod types;
pub mod value;

pub use resultset::{
    Annotation, CompareKey, FactValue, QueryParams, ResultSet, ResultSetMeta, Row, SqlProvenance,
};
pub use rules::{LeafValue, NamedRule, RuleError, RuleLeaf, RuleNode, RuleOperator};
pub use schema::{SchemaModel, SchemaNode, TableNode};
pub use types::{coerce, ColumnDescriptor, SemanticType};
pub use value::{parse_sequence, BindMap, Value};
