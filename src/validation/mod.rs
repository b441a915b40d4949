//! Validation pipeline
//!
//! - [`Validator`] runs the syntax and semantic passes of one request
//!   against the schema engine and translates the first failure
//! - [`ValidationSession`] validates a batch of edits in order, running
//!   custom hooks between the passes and keeping the session cache and the
//!   cumulative dependent-data tree
//!
//! Every call reports at most one [`crate::translate::ErrorRecord`]: the
//! first failure found.

mod orchestrator;
mod session;

pub use orchestrator::{ValidationRequest, ValidationState, Validator};
pub use session::ValidationSession;
