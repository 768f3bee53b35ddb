//! # quarry-sql
//!
//! The SQL-side engines of the Quarry data-access core.
//!
//! - [`bind`] rewrites named-parameter SQL (`:name`) into the placeholder
//!   style a driver requires: positioned (`$1,$2,…`) or simple (`?`),
//!   expanding array-valued parameters into one placeholder per element.
//! - [`clause`] compiles a boolean rule tree into an indented,
//!   parameterized `WHERE` expression with named `:valN` placeholders,
//!   deferring final placeholder syntax to the bind normalizer — the same
//!   tree compiles once and binds in either style.
//! - [`sanitize`] rewrites dialect-variant SQL into a form the AST
//!   collaborator accepts; lossy by design, only the statement's shape
//!   survives.
//! - [`inspect`] extracts that shape (statement kind plus referenced
//!   table) on a best-effort basis; unparseable SQL is a routine `None`.
//!
//! ```rust
//! use quarry_model::BindMap;
//! use quarry_sql::bind::to_positioned;
//!
//! let mut binds = BindMap::new();
//! binds.insert(String::from("id"), 7_i64.into());
//! let normalized = to_positioned("SELECT * FROM users WHERE id = :id", &binds).unwrap();
//! assert_eq!(normalized.sql, "SELECT * FROM users WHERE id = $1");
//! ```

pub mod bind;
pub mod clause;
pub mod error;
pub mod inspect;
pub mod sanitize;

pub use bind::{strip_comments, to_positioned, to_simple, Normalized};
pub use clause::{compile, Compiled};
pub use error::{BindError, Result};
pub use inspect::{inspect, StatementInfo, StatementKind};
pub use sanitize::sanitize;
