//! Error types for the diff engine.

use thiserror::Error;

/// Errors that prevent a diff from running at all.
///
/// These indicate a caller programming error (a result set without a
/// usable identity), not malformed data; when they occur, neither
/// result set has been mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    /// The old result set declares no compare key at all.
    #[error("result set declares no compare key")]
    NoCompareKey,

    /// Compare keys are declared, but none is fully satisfiable by the
    /// old set's columns.
    #[error("no declared compare key is satisfied by columns: {}", .columns.join(", "))]
    UnusableCompareKey {
        /// The old set's column names.
        columns: Vec<String>,
    },
}

/// Result type alias for diff operations.
pub type Result<T> = std::result::Result<T, DiffError>;
