//! Error translation
//!
//! Converts the engine's raw `(code, path, message, app_tag)` signal into an
//! [`ErrorRecord`] once, at the engine boundary. Schema-detected and
//! hook-detected failures share the same record shape.

mod kind;
mod record;
mod translator;

pub use kind::{Category, ErrorKind};
pub use record::{ErrorRecord, ValidationResult};
pub use translator::{translate, translate_pending};
