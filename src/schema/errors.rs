//! Schema error types
//!
//! Error codes:
//! - CFGVAL_UNKNOWN_TABLE
//! - CFGVAL_SCHEMA_IMMUTABLE
//! - CFGVAL_SCHEMA_MALFORMED
//! - CFGVAL_SCHEMA_DANGLING_REFERENCE

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while loading or registering table schemas
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No schema registered for the table
    #[error("Table '{0}' has no schema")]
    UnknownTable(String),

    /// Table registered twice
    #[error("Schema for table '{0}' is immutable")]
    Immutable(String),

    /// Schema file unreadable or structurally invalid
    #[error("Malformed schema '{path}': {reason}")]
    Malformed { path: String, reason: String },

    /// Leafref points at a table nobody registered
    #[error("Field '{table}.{field}' references unknown table '{target}'")]
    DanglingReference {
        table: String,
        field: String,
        target: String,
    },
}

impl SchemaError {
    /// Create an error for a malformed schema file
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::UnknownTable(_) => "CFGVAL_UNKNOWN_TABLE",
            SchemaError::Immutable(_) => "CFGVAL_SCHEMA_IMMUTABLE",
            SchemaError::Malformed { .. } => "CFGVAL_SCHEMA_MALFORMED",
            SchemaError::DanglingReference { .. } => "CFGVAL_SCHEMA_DANGLING_REFERENCE",
        }
    }
}
