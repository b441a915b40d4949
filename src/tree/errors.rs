//! Data tree errors

use thiserror::Error;

/// Result type for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors raised while building or (de)serializing data trees
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Field not declared for the table, or not usable as a plain leaf
    #[error("Field '{field}' rejected by schema of table '{table}': {reason}")]
    SchemaViolation {
        table: String,
        field: String,
        reason: String,
    },

    /// Key component count does not match the declared key leaves
    #[error("Key for table '{table}' has {found} components, schema declares {expected}")]
    InvalidKey {
        table: String,
        expected: usize,
        found: usize,
    },

    /// `name#value` field spec with a dangling name
    #[error("Malformed field spec '{0}'")]
    MalformedFieldSpec(String),

    /// Tree text could not be parsed
    #[error("Failed to parse tree: {0}")]
    Parse(String),

    /// Tree could not be serialized
    #[error("Failed to serialize tree: {0}")]
    Serialize(String),
}
