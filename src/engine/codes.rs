//! Raw validation codes reported by the schema engine
//!
//! These values cross the engine boundary only; the translator maps them to
//! [`crate::translate::ErrorKind`] and nothing upstream looks at them again.

pub const SUCCESS: u32 = 0;
/// Required element absent (e.g. key leaf)
pub const MISSING_ELEMENT: u32 = 1;
/// Element not declared by the schema
pub const INVALID_ELEMENT: u32 = 2;
/// Value does not satisfy its type statement (pattern, length, syntax)
pub const INVALID_STATEMENT: u32 = 3;
/// Leaf given several values
pub const TOO_MANY: u32 = 4;
/// Repeated value in a leaf-list
pub const DUPLICATE_ID: u32 = 5;
/// Value is not one of the enumeration names
pub const ENUM_INVALID: u32 = 6;
/// Enumeration value is not a well-formed name
pub const ENUM_INVALID_NAME: u32 = 7;
/// Enumeration value has surrounding whitespace
pub const ENUM_WHITESPACE: u32 = 8;
/// Integer outside its declared range
pub const OUT_OF_RANGE: u32 = 9;
/// Leaf-list below its minimum element count
pub const MIN_ELEMENTS: u32 = 10;
/// Leaf-list or table above its maximum element count
pub const MAX_ELEMENTS: u32 = 11;
/// Leafref target missing
pub const NO_LEAFREF: u32 = 12;
/// Must rule not satisfied
pub const MUST_FAILED: u32 = 13;
/// Mandatory leaf missing
pub const MANDATORY_MISSING: u32 = 14;
/// Entry already exists
pub const ALREADY_EXISTS: u32 = 15;
/// Entry does not exist
pub const KEY_NOT_EXIST: u32 = 16;
/// Two entries share a key
pub const DUPLICATE_KEY: u32 = 17;
/// Key value malformed
pub const INVALID_KEY: u32 = 18;
/// Key leaf absent from an entry
pub const MISSING_KEY: u32 = 19;
