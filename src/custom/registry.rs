//! # Hook Registry

use std::collections::BTreeMap;
use std::fmt;

use super::context::ValidationContext;
use super::errors::{HookError, HookResult};
use super::hooks;
use crate::translate::ErrorRecord;

/// A custom validation callable
pub type Hook = Box<dyn Fn(&mut ValidationContext<'_>) -> ErrorRecord>;

/// Registry of named hooks
#[derive(Default)]
pub struct HookRegistry {
    hooks: BTreeMap<String, Hook>,
}

impl HookRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in hooks
    pub fn with_builtin_hooks() -> Self {
        let mut registry = Self::new();
        registry.insert(hooks::MAX_ENTRIES, Box::new(hooks::validate_max_entries));
        registry.insert(hooks::ADDRESS_FAMILY, Box::new(hooks::validate_address_family));
        registry.insert(hooks::UNIQUE_VALUE, Box::new(hooks::validate_unique_value));
        registry
    }

    /// Register a hook under `name`
    pub fn register<F>(&mut self, name: &str, hook: F) -> HookResult<()>
    where
        F: Fn(&mut ValidationContext<'_>) -> ErrorRecord + 'static,
    {
        if name.trim().is_empty() {
            return Err(HookError::InvalidName(name.to_string()));
        }
        if self.hooks.contains_key(name) {
            return Err(HookError::AlreadyRegistered(name.to_string()));
        }
        self.insert(name, Box::new(hook));
        Ok(())
    }

    fn insert(&mut self, name: &str, hook: Hook) {
        self.hooks.insert(name.to_string(), hook);
    }

    /// Get hook by name
    pub fn get(&self, name: &str) -> Option<&Hook> {
        self.hooks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}
