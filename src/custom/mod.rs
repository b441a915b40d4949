//! Custom validation hooks
//!
//! Business rules the schema language cannot express run as named hooks:
//! - [`HookRegistry`] maps stable names to callables
//! - [`invoke`] dispatches by name; an unregistered name passes
//! - [`ValidationContext`] is what a hook sees of the batch, the session
//!   cache and the store
//!
//! Schemas attach hook names to tables or fields via `custom_validation`.

mod context;
mod dispatcher;
mod errors;
pub mod hooks;
mod registry;

pub use context::ValidationContext;
pub use dispatcher::invoke;
pub use errors::{HookError, HookResult};
pub use registry::{Hook, HookRegistry};
