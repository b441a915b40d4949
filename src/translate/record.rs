//! Structured error record

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::kind::ErrorKind;

/// Result of a validation call: `Err` carries the first failure found
pub type ValidationResult<T> = Result<T, ErrorRecord>;

/// Stable, language-neutral description of one validation outcome.
///
/// A record of kind [`ErrorKind::Success`] means the check passed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Error)]
#[error("[{kind}] {message}")]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub table_name: String,
    pub keys: Vec<String>,
    pub field: String,
    pub value: String,
    pub message: String,
    pub constraint_message: String,
    pub app_tag: String,
}

impl ErrorRecord {
    /// A passing result
    pub fn success() -> Self {
        Self::default()
    }

    /// A failure of `kind` with a message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            ..Self::default()
        }
    }

    /// Sets the table name
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table_name = table.into();
        self
    }

    /// Sets the key values
    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = keys;
        self
    }

    /// Sets the offending field and value
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.field = field.into();
        self.value = value.into();
        self
    }

    /// Sets the constraint message
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint_message = constraint.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.kind.is_success()
    }

    /// `Ok(())` for success, `Err(self)` otherwise
    pub fn into_result(self) -> ValidationResult<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self)
        }
    }
}
