//! Edit records submitted for validation
//!
//! An edit names one store entry by its compound key (`TABLE|k1|k2`), the
//! operation applied to it and the field values it carries. Edits are built
//! by the caller and never mutated while a batch is being validated.

mod record;

pub use record::{EditRecord, Operation, RecordKey, ValidateKind, MULTI_VALUE_SUFFIX};
