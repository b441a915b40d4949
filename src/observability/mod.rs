//! Observability for the validator
//!
//! - Structured logging through `tracing`, installed by [`init_logging`]
//! - Counters for validation outcomes in [`ValidationMetrics`]
//! - Begin/complete/failed logging around a unit of work with
//!   [`ObservationScope`]
//!
//! Observability is read-only: nothing here influences a validation result.

mod logging;
mod metrics;
mod scope;

pub use logging::{init_logging, LogConfig, LogFormat, LoggingError};
pub use metrics::{MetricsSnapshot, ValidationMetrics};
pub use scope::{ObservationScope, Timer};
