//! # quarry-validate
//!
//! Rule validation engine: evaluates the same boolean rule-tree grammar
//! the clause compiler consumes, but against every row of an
//! already-fetched result set. A rule tree that evaluates true marks a
//! violation — the rules encode *bad* conditions — and each violation
//! attaches a `Rul` annotation at the rule's target column, bounded by
//! the rule's configured limit.
//!
//! The engine is independent of the diff engine and never touches SQL
//! text; rows are processed strictly in sequence.

pub mod engine;
mod eval;

pub use engine::validate;
