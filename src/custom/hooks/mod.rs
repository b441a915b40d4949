//! Built-in hooks
//!
//! | Name                    | Attached to          | Rule                                   |
//! |-------------------------|----------------------|----------------------------------------|
//! | `ValidateMaxEntries`    | table                | store entries + batch creates ≤ limit  |
//! | `ValidateAddressFamily` | family field         | address fields match the family        |
//! | `ValidateUniqueValue`   | table or field       | value unique across the table          |

mod address_family;
mod max_entries;
mod unique_value;

pub use address_family::validate_address_family;
pub use max_entries::validate_max_entries;
pub use unique_value::validate_unique_value;

pub const MAX_ENTRIES: &str = "ValidateMaxEntries";
pub const ADDRESS_FAMILY: &str = "ValidateAddressFamily";
pub const UNIQUE_VALUE: &str = "ValidateUniqueValue";
