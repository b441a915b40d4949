//! Configuration store boundary
//!
//! The validator only reads from the store:
//! - key enumeration by glob pattern (`ACL_RULE|*`)
//! - field-group fetch by key
//! - pipelined multi-key fetch
//!
//! An absent key reads as an empty field group. Patterns use `*` and `?`
//! wildcards; a backslash makes the next character literal.

mod errors;
mod memory;

pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;

use std::collections::BTreeMap;

/// Escapes glob metacharacters so `value` matches only itself
pub fn escape_glob(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Field name → value pairs stored under one key
pub type FieldMap = BTreeMap<String, String>;

/// Read-only access to the key-value configuration store
pub trait StoreClient {
    /// Keys matching a glob pattern
    fn keys(&self, pattern: &str) -> StoreResult<Vec<String>>;

    /// All fields stored under `key`; empty when the key is absent
    fn get_all(&self, key: &str) -> StoreResult<FieldMap>;

    /// Fetches several keys in one round trip, results in request order
    fn get_all_pipelined(&self, keys: &[String]) -> StoreResult<Vec<FieldMap>> {
        keys.iter().map(|k| self.get_all(k)).collect()
    }

    /// Returns whether `key` holds any fields
    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(!self.get_all(key)?.is_empty())
    }
}
