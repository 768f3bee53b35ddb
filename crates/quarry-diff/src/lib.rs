//! # quarry-diff
//!
//! Row-set diff engine: compares an "old" and a "new" result set by the
//! old set's declared compare key and annotates every cell that was
//! inserted, deleted, or updated. Used by the browser's data-compare
//! view and by editors that preview pending changes.
//!
//! The engine operates purely on already-fetched result sets; it never
//! touches SQL text or a connection.

pub mod engine;
pub mod error;

pub use engine::{diff, DiffSummary};
pub use error::{DiffError, Result};
