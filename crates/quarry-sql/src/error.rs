//! Error types for SQL normalization.

use thiserror::Error;

/// Errors from bind-parameter normalization.
///
/// Coercion problems never appear here — they degrade to NULL binds.
/// A missing bind parameter is a caller programming error and fails the
/// whole normalization call; the SQL is never partially rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// A named parameter in the SQL has no value in the bind map.
    #[error("missing bind parameter: {0}")]
    MissingParameter(String),

    /// Several named parameters have no value in the bind map.
    #[error("missing bind parameters: {}", .0.join(", "))]
    MissingParameters(Vec<String>),
}

/// Result type alias for normalization operations.
pub type Result<T> = std::result::Result<T, BindError>;
