//! In-memory store

use std::collections::BTreeMap;

use regex::Regex;

use super::errors::{StoreError, StoreResult};
use super::{FieldMap, StoreClient};

/// A [`StoreClient`] over an ordered in-memory map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, FieldMap>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the fields under `key`
    pub fn insert<'a>(&mut self, key: impl Into<String>, fields: impl IntoIterator<Item = (&'a str, &'a str)>) {
        let fields = fields
            .into_iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        self.entries.insert(key.into(), fields);
    }

    /// Builder form of [`MemoryStore::insert`]
    pub fn with_entry<'a>(mut self, key: impl Into<String>, fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.insert(key, fields);
        self
    }

    /// Removes `key`, returning its fields
    pub fn remove(&mut self, key: &str) -> Option<FieldMap> {
        self.entries.remove(key)
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compiles a glob into an anchored regex
fn glob_to_regex(pattern: &str) -> StoreResult<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            '\\' => {
                let literal = chars.next().unwrap_or('\\');
                expr.push_str(&regex::escape(&literal.to_string()));
            }
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr).map_err(|e| StoreError::InvalidPattern(format!("{}: {}", pattern, e)))
}

impl StoreClient for MemoryStore {
    fn keys(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let re = glob_to_regex(pattern)?;
        Ok(self
            .entries
            .keys()
            .filter(|k| re.is_match(k))
            .cloned()
            .collect())
    }

    fn get_all(&self, key: &str) -> StoreResult<FieldMap> {
        Ok(self.entries.get(key).cloned().unwrap_or_default())
    }
}
