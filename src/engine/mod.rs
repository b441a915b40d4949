//! Schema engine boundary
//!
//! The validation core never inspects schemas itself. It hands trees to a
//! [`SchemaEngine`], which validates them in one of two modes and, on
//! failure, keeps the first error pending as a raw
//! `(code, path, message, app_tag)` tuple until the next validation call.
//!
//! [`ModelEngine`] is the bundled implementation, driven by the table
//! schemas of a [`crate::schema::SchemaLoader`].

pub mod codes;
mod model;

pub use model::ModelEngine;

use std::fmt;

use crate::schema::TableSchema;
use crate::tree::{DataTree, TreeResult};

/// How much of the schema a validation pass enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Data considered in isolation: no reference resolution, no mandatory
    /// or cardinality checks across entries
    Edit,
    /// Complete configuration: references, mandatory fields, must rules,
    /// table limits and duplicate entries
    Full,
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::Edit => write!(f, "edit"),
            ValidationMode::Full => write!(f, "full"),
        }
    }
}

/// Raw error signal as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawError {
    pub code: u32,
    pub path: String,
    pub message: String,
    pub app_tag: String,
}

impl RawError {
    pub fn new(code: u32, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
            app_tag: String::new(),
        }
    }

    pub fn with_app_tag(mut self, app_tag: impl Into<String>) -> Self {
        self.app_tag = app_tag.into();
        self
    }
}

/// Marker returned by a failed validation; details are pending on the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineFailure;

/// A stateful schema-processing service bound to one schema context
pub trait SchemaEngine {
    /// Schema of `table`, if the engine knows it
    fn table_schema(&self, table: &str) -> Option<&TableSchema>;

    /// Parses the text form of a tree
    fn parse(&self, text: &str) -> TreeResult<DataTree>;

    /// Validates `tree`. On failure the first error stays pending until the
    /// next call to `validate` or `clear_error`.
    fn validate(&self, tree: &DataTree, mode: ValidationMode) -> Result<(), EngineFailure>;

    /// The pending error, if any
    fn first_error(&self) -> Option<RawError>;

    /// Discards the pending error
    fn clear_error(&self);
}
