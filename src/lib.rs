//! cfgval - Schema-driven validation of configuration store edits
//!
//! Edits against a key/value configuration store are turned into data
//! trees, checked by a schema engine in a syntax pass and a semantic pass,
//! run through registered custom hooks, and any failure is reported as one
//! structured [`ErrorRecord`].
//!
//! ```text
//! EditRecord ─▶ tree ─▶ syntax ─▶ hooks ─▶ semantics ─▶ ErrorRecord
//!                          │                   │
//!                          └──── engine ◀──────┘
//! ```

pub mod cache;
pub mod config;
pub mod custom;
pub mod edit;
pub mod engine;
pub mod observability;
pub mod schema;
pub mod store;
pub mod translate;
pub mod tree;
pub mod validation;

#[cfg(test)]
mod fixtures;

pub use config::ValidatorConfig;
pub use edit::{EditRecord, Operation, ValidateKind};
pub use translate::{ErrorKind, ErrorRecord, ValidationResult};
pub use validation::{ValidationSession, Validator};
