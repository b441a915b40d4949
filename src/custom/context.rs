//! What a hook sees

use crate::cache::SessionCache;
use crate::config::ValidatorConfig;
use crate::edit::{EditRecord, RecordKey};
use crate::store::StoreClient;
use crate::tree::EntryNode;

/// Request-scoped view handed to one hook call.
///
/// The node is the annotated field being checked (`node_value` joins
/// leaf-list values with `,`), or the table name and full key for a
/// table-level hook. The entry is the tree node built for the current edit.
pub struct ValidationContext<'a> {
    all_edits: &'a [EditRecord],
    current: usize,
    node_name: String,
    node_value: String,
    entry: Option<&'a EntryNode>,
    cache: &'a mut SessionCache,
    store: &'a dyn StoreClient,
    config: &'a ValidatorConfig,
}

impl<'a> ValidationContext<'a> {
    /// Context for `all_edits[current]` with no node selected
    pub fn new(
        all_edits: &'a [EditRecord],
        current: usize,
        cache: &'a mut SessionCache,
        store: &'a dyn StoreClient,
        config: &'a ValidatorConfig,
    ) -> Self {
        Self {
            all_edits,
            current,
            node_name: String::new(),
            node_value: String::new(),
            entry: None,
            cache,
            store,
            config,
        }
    }

    /// Selects the node under validation
    pub fn with_node(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.node_name = name.into();
        self.node_value = value.into();
        self
    }

    /// Points the cursor at the entry built for the current edit
    pub fn with_entry(mut self, entry: &'a EntryNode) -> Self {
        self.entry = Some(entry);
        self
    }

    /// Every edit of the batch, in submission order
    pub fn all_edits(&self) -> &'a [EditRecord] {
        self.all_edits
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_edit(&self) -> Option<&'a EditRecord> {
        self.all_edits.get(self.current)
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    pub fn node_value(&self) -> &str {
        &self.node_value
    }

    pub fn entry(&self) -> Option<&'a EntryNode> {
        self.entry
    }

    pub fn cache(&mut self) -> &mut SessionCache {
        &mut *self.cache
    }

    pub fn store(&self) -> &'a dyn StoreClient {
        self.store
    }

    pub fn config(&self) -> &'a ValidatorConfig {
        self.config
    }

    /// Parsed key of the current edit
    pub fn record_key(&self) -> Option<RecordKey> {
        self.current_edit()?.record_key(&self.config.key_separator)
    }

    /// Table of the current edit
    pub fn table(&self) -> Option<&'a str> {
        self.current_edit()?.table(&self.config.key_separator)
    }

    /// Key components of the current edit, without the table
    pub fn key_values(&self) -> Vec<String> {
        self.record_key().map(|k| k.components).unwrap_or_default()
    }

    /// Value of `name` in the current entry, falling back to the edit's
    /// own fields when no entry is attached
    pub fn field_value(&self, name: &str) -> Option<String> {
        if let Some(entry) = self.entry {
            return entry.value_of(name);
        }
        self.current_edit()?.field(name).map(str::to_string)
    }
}
