//! Schema model for configuration tables
//!
//! A table schema declares the key leaves of the table, the typed fields an
//! entry may carry and the annotations that attach custom-validation hooks.
//!
//! # Design Principles
//!
//! - One table per schema file
//! - Schemas are immutable once registered
//! - Key leaves are ordinary declared fields, listed in key order
//! - Cross-table references (leafref) must name a registered table

mod errors;
mod loader;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use loader::SchemaLoader;
pub use types::{FieldDef, FieldType, MustRule, TableSchema};
