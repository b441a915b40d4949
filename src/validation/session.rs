//! Batch validation session
//!
//! A session validates batches of edits in submission order. For each edit:
//!
//! 1. The key is parsed and checked against the store and the edits this
//!    session already accepted (create of an existing key, update or
//!    delete of a missing one)
//! 2. The syntax pass runs on the edit alone
//! 3. Custom hooks run for every annotated field and for the table
//! 4. The semantic pass runs with the rest of the batch, the stored record
//!    (for updates), leafref targets fetched from the store and the
//!    session's cumulative dependent data merged in
//!
//! Batch neighbours that fail their own syntax pass are not used as
//! dependent data. Keys deleted earlier in the session are never fetched
//! from the store.
//!
//! Validation stops at the first failing edit. Accepted edits join the
//! cumulative tree, so later calls in the same session see them. An
//! accepted delete takes its entry out again.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use super::orchestrator::{ValidationRequest, Validator};
use crate::cache::SessionCache;
use crate::config::ValidatorConfig;
use crate::custom::{invoke, HookRegistry, ValidationContext};
use crate::edit::{EditRecord, RecordKey, MULTI_VALUE_SUFFIX};
use crate::engine::SchemaEngine;
use crate::observability::{ObservationScope, ValidationMetrics};
use crate::schema::TableSchema;
use crate::store::{escape_glob, StoreClient, StoreError};
use crate::translate::{ErrorKind, ErrorRecord, ValidationResult};
use crate::tree::{self, DataTree, EntryNode, TreeError};

/// One unit of validation work with its own cache and cumulative tree
pub struct ValidationSession<'a> {
    id: Uuid,
    started_at: DateTime<Utc>,
    validator: Validator<'a>,
    registry: &'a HookRegistry,
    store: &'a dyn StoreClient,
    config: &'a ValidatorConfig,
    metrics: Option<&'a ValidationMetrics>,
    cache: SessionCache,
    cumulative: Option<DataTree>,
    /// Key presence as left by accepted edits, overriding the store
    presence: HashMap<String, bool>,
}

impl<'a> ValidationSession<'a> {
    pub fn new(
        engine: &'a dyn SchemaEngine,
        registry: &'a HookRegistry,
        store: &'a dyn StoreClient,
        config: &'a ValidatorConfig,
    ) -> Self {
        let id = Uuid::new_v4();
        debug!(session = %id, "session opened");
        Self {
            id,
            started_at: Utc::now(),
            validator: Validator::new(engine),
            registry,
            store,
            config,
            metrics: None,
            cache: SessionCache::new(),
            cumulative: None,
            presence: HashMap::new(),
        }
    }

    /// Records outcomes into shared counters
    pub fn with_metrics(mut self, metrics: &'a ValidationMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// Dependent data accumulated so far
    pub fn cached_tree(&self) -> Option<&DataTree> {
        self.cumulative.as_ref()
    }

    /// Parses dependent data and adds it to the cumulative tree used by
    /// every later semantic pass of this session.
    pub fn add_dependent_data(&mut self, text: &str) -> ValidationResult<()> {
        let parsed = self
            .validator
            .engine()
            .parse(text)
            .map_err(|e| ErrorRecord::new(ErrorKind::SyntaxInvalidInputData, e.to_string()))?;

        debug!(session = %self.id, entries = parsed.entry_count(), "dependent data cached");
        tree::cache(&mut self.cumulative, parsed);
        if let Some(metrics) = self.metrics {
            metrics.increment_dependent_data();
        }
        Ok(())
    }

    /// Validates `edits` in order, stopping at the first failure.
    pub fn validate_edits(&mut self, edits: &[EditRecord]) -> ValidationResult<()> {
        let scope = ObservationScope::new("validate_edits")
            .with_field("session", self.id)
            .with_field("edits", edits.len());

        for idx in 0..edits.len() {
            match self.validate_edit(edits, idx) {
                Ok(()) => {
                    if let Some(metrics) = self.metrics {
                        metrics.increment_edits_accepted();
                    }
                }
                Err(error) => {
                    if let Some(metrics) = self.metrics {
                        metrics.increment_edits_rejected();
                    }
                    warn!(
                        session = %self.id,
                        edit = idx,
                        key = %edits[idx].key,
                        code = error.kind.code(),
                        "edit rejected"
                    );
                    scope.fail(&error.to_string());
                    return Err(error);
                }
            }
        }

        scope.complete();
        Ok(())
    }

    fn validate_edit(&mut self, edits: &[EditRecord], idx: usize) -> ValidationResult<()> {
        let edit = &edits[idx];
        let separator = self.config.key_separator.as_str();
        let engine = self.validator.engine();

        let key = edit.record_key(separator).ok_or_else(|| {
            ErrorRecord::new(ErrorKind::SemanticKeyInvalid, format!("Invalid key {}", edit.key))
        })?;
        let schema = engine.table_schema(&key.table).ok_or_else(|| {
            ErrorRecord::new(
                ErrorKind::InternalUnknown,
                format!("No schema loaded for table {}", key.table),
            )
            .with_table(&key.table)
            .with_keys(key.components.clone())
        })?;

        self.check_existence(edit, &key)?;

        let op = edit.operation;
        let edit_tree = DataTree::from_edit(schema, edit, separator).map_err(|e| tree_error(e, &key))?;

        if edit.validate_kind.wants_syntax() && !op.is_delete() {
            let mut request = ValidationRequest::new(edit_tree.clone());
            let result = self.validator.validate_syntax(&mut request);
            if let Some(metrics) = self.metrics {
                metrics.increment_syntax_passes();
            }
            result?;
        }

        let working = self.working_tree(schema, edit, &key, edit_tree)?;
        let key_refs: Vec<&str> = key.components.iter().map(String::as_str).collect();
        let entry = working.find_entry(&schema.name, &key_refs);

        for (name, value) in &edit.fields {
            let bare = name.strip_suffix(MULTI_VALUE_SUFFIX).unwrap_or(name.as_str());
            if let Some(hook) = schema.field(bare).and_then(|d| d.custom_validation.as_deref()) {
                self.run_hook(hook, edits, idx, bare, value, entry)?;
            }
        }
        if let Some(hook) = schema.custom_validation.as_deref() {
            self.run_hook(hook, edits, idx, &schema.name, &edit.key, entry)?;
        }

        if edit.validate_kind.wants_semantics() && !op.is_delete() {
            let dependent = self.batch_tree(edits, idx);
            let other = if self.config.fetch_leafref_targets {
                let roots: Vec<&DataTree> = [Some(&working), Some(&dependent), self.cumulative.as_ref()]
                    .into_iter()
                    .flatten()
                    .collect();
                Some(self.fetch_leafref_targets(&roots))
            } else {
                None
            };

            let mut request = ValidationRequest::new(working.clone());
            let result = self.validator.validate_semantics(
                &mut request,
                non_empty(dependent),
                self.cumulative.as_ref(),
                other.and_then(non_empty),
            );
            if let Some(metrics) = self.metrics {
                metrics.increment_semantic_passes();
            }
            result?;
        }

        self.presence.insert(edit.key.clone(), !op.is_delete());
        if op.is_delete() {
            if let Some(cumulative) = self.cumulative.as_mut() {
                cumulative.remove_entry(&key.table, &key_refs);
            }
        } else {
            tree::cache(&mut self.cumulative, working);
        }
        debug!(session = %self.id, key = %edit.key, operation = %op, "edit accepted");
        Ok(())
    }

    fn check_existence(&self, edit: &EditRecord, key: &RecordKey) -> ValidationResult<()> {
        let op = edit.operation;
        let exists = match self.presence.get(&edit.key) {
            Some(present) => *present,
            None => self
                .store
                .exists(&edit.key)
                .map_err(|e| store_error(&edit.key, e))?,
        };

        let failure = if op.is_create() && !op.is_update() && exists {
            Some((ErrorKind::SemanticKeyAlreadyExists, "already exists"))
        } else if !op.is_create() && (op.is_update() || op.is_delete()) && !exists {
            Some((ErrorKind::SemanticKeyNotExist, "does not exist"))
        } else {
            None
        };

        match failure {
            Some((kind, reason)) => Err(ErrorRecord::new(kind, format!("Key {} {}", edit.key, reason))
                .with_table(&key.table)
                .with_keys(key.components.clone())),
            None => Ok(()),
        }
    }

    /// The edit as it would be stored: an update is applied on top of the
    /// stored record.
    fn working_tree(
        &self,
        schema: &TableSchema,
        edit: &EditRecord,
        key: &RecordKey,
        edit_tree: DataTree,
    ) -> ValidationResult<DataTree> {
        if !edit.operation.is_update() {
            return Ok(edit_tree);
        }
        match self.stored_tree(schema, &edit.key)? {
            Some(stored) => Ok(stored.merged(edit_tree)),
            None => {
                debug!(key = %edit.key, table = %key.table, "no stored record to update");
                Ok(edit_tree)
            }
        }
    }

    /// Reads one store entry as a tree, keeping only fields the schema knows
    fn stored_tree(&self, schema: &TableSchema, store_key: &str) -> ValidationResult<Option<DataTree>> {
        let fields = self
            .store
            .get_all(store_key)
            .map_err(|e| store_error(store_key, e))?;
        if fields.is_empty() {
            return Ok(None);
        }

        let key = RecordKey::parse(store_key, &self.config.key_separator).ok_or_else(|| {
            ErrorRecord::new(ErrorKind::SemanticKeyInvalid, format!("Invalid key {}", store_key))
        })?;
        let known = fields
            .iter()
            .filter(|(name, _)| {
                let bare = name.strip_suffix(MULTI_VALUE_SUFFIX).unwrap_or(name.as_str());
                schema.field(bare).is_some() && !schema.is_key(bare)
            })
            .map(|(name, value)| (name.as_str(), value.as_str()));

        DataTree::from_record(schema, &key, known)
            .map(Some)
            .map_err(|e| tree_error(e, &key))
    }

    /// Every other non-delete edit of the batch. Edits that cannot be built
    /// or fail the syntax pass are left out; they fail on their own turn.
    fn batch_tree(&self, edits: &[EditRecord], current: usize) -> DataTree {
        let separator = self.config.key_separator.as_str();
        let engine = self.validator.engine();
        let mut batch = DataTree::new();

        for (idx, other) in edits.iter().enumerate() {
            if idx == current || other.operation.is_delete() || other.key == edits[current].key {
                continue;
            }
            let Some(key) = other.record_key(separator) else {
                continue;
            };
            let Some(schema) = engine.table_schema(&key.table) else {
                continue;
            };
            let built = DataTree::from_edit(schema, other, separator)
                .map_err(|e| tree_error(e, &key))
                .and_then(|t| self.syntax_checked(t))
                .and_then(|t| self.working_tree(schema, other, &key, t));
            match built {
                Ok(tree) => batch.merge(tree),
                Err(e) => debug!(key = %other.key, error = %e, "batch edit left out of dependent data"),
            }
        }
        batch
    }

    fn syntax_checked(&self, tree: DataTree) -> ValidationResult<DataTree> {
        let mut request = ValidationRequest::new(tree);
        self.validator.validate_syntax(&mut request)?;
        Ok(request.into_tree())
    }

    /// Fetches from the store every entry referenced by a leafref in
    /// `roots` and not already present, following references of fetched
    /// entries in turn. Keys this session deleted are skipped. Store
    /// failures leave the reference unresolved.
    fn fetch_leafref_targets(&self, roots: &[&DataTree]) -> DataTree {
        let engine = self.validator.engine();
        let mut fetched = DataTree::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: Vec<(String, EntryNode)> = roots
            .iter()
            .flat_map(|t| t.tables())
            .flat_map(|t| t.entries.iter().map(move |e| (t.name.clone(), e.clone())))
            .collect();

        while let Some((table, entry)) = queue.pop() {
            let Some(schema) = engine.table_schema(&table) else {
                continue;
            };
            for (field, target) in schema.leafrefs() {
                let Some(target_schema) = engine.table_schema(target) else {
                    continue;
                };
                for value in leafref_values(&entry, field) {
                    let present = roots.iter().any(|t| has_first_key(t, target, &value))
                        || has_first_key(&fetched, target, &value);
                    if present {
                        continue;
                    }

                    let keys = match self.keys_with_first_component(target, &value) {
                        Ok(keys) => keys,
                        Err(e) => {
                            warn!(table = target, value = %value, error = %e, "leafref target lookup failed");
                            continue;
                        }
                    };
                    for store_key in keys {
                        let deleted = self.presence.get(&store_key) == Some(&false);
                        if deleted || !visited.insert(store_key.clone()) {
                            continue;
                        }
                        match self.stored_tree(target_schema, &store_key) {
                            Ok(Some(tree)) => {
                                for node in tree.tables() {
                                    for e in &node.entries {
                                        queue.push((node.name.clone(), e.clone()));
                                    }
                                }
                                fetched.merge(tree);
                            }
                            Ok(None) => {}
                            Err(e) => warn!(key = %store_key, error = %e, "leafref target unreadable"),
                        }
                    }
                }
            }
        }

        debug!(entries = fetched.entry_count(), "leafref targets fetched");
        fetched
    }

    /// Store keys of `table` whose first component is exactly `value`
    fn keys_with_first_component(&self, table: &str, value: &str) -> Result<Vec<String>, StoreError> {
        let separator = escape_glob(&self.config.key_separator);
        let (table, value) = (escape_glob(table), escape_glob(value));
        let mut keys = self.store.keys(&format!("{}{}{}", table, separator, value))?;
        keys.extend(
            self.store
                .keys(&format!("{}{}{}{}*", table, separator, value, separator))?,
        );
        Ok(keys)
    }

    fn run_hook(
        &mut self,
        hook: &str,
        edits: &[EditRecord],
        idx: usize,
        node_name: &str,
        node_value: &str,
        entry: Option<&EntryNode>,
    ) -> ValidationResult<()> {
        let mut ctx = ValidationContext::new(edits, idx, &mut self.cache, self.store, self.config)
            .with_node(node_name, node_value);
        if let Some(entry) = entry {
            ctx = ctx.with_entry(entry);
        }

        let result = invoke(self.registry, hook, &mut ctx);
        if let Some(metrics) = self.metrics {
            metrics.record_hook(!result.is_success());
        }
        result.into_result()
    }
}

impl Drop for ValidationSession<'_> {
    fn drop(&mut self) {
        self.cache.clear();
        self.presence.clear();
        if let Some(cumulative) = self.cumulative.take() {
            tree::release(cumulative);
        }
        debug!(session = %self.id, "session closed");
    }
}

fn non_empty(tree: DataTree) -> Option<DataTree> {
    if tree.is_empty() {
        None
    } else {
        Some(tree)
    }
}

/// Values a leafref field holds in `entry`, key leaves included
fn leafref_values(entry: &EntryNode, field: &str) -> Vec<String> {
    if let Some(key) = entry.key_value(field) {
        return vec![key.to_string()];
    }
    entry
        .leaf(field)
        .map(|leaf| leaf.values.clone())
        .unwrap_or_default()
}

fn has_first_key(tree: &DataTree, table: &str, value: &str) -> bool {
    tree.table(table).map_or(false, |t| {
        t.entries
            .iter()
            .any(|e| e.keys.first().map_or(false, |(_, v)| v == value))
    })
}

fn tree_error(err: TreeError, key: &RecordKey) -> ErrorRecord {
    let record = match &err {
        TreeError::SchemaViolation { field, .. } => {
            ErrorRecord::new(ErrorKind::SyntaxInvalidField, err.to_string()).with_field(field.clone(), "")
        }
        TreeError::InvalidKey { .. } => ErrorRecord::new(ErrorKind::SemanticKeyInvalid, err.to_string()),
        TreeError::MalformedFieldSpec(_) | TreeError::Parse(_) => {
            ErrorRecord::new(ErrorKind::SyntaxInvalidInputData, err.to_string())
        }
        TreeError::Serialize(_) => ErrorRecord::new(ErrorKind::InternalUnknown, err.to_string()),
    };
    record.with_table(&key.table).with_keys(key.components.clone())
}

fn store_error(key: &str, err: StoreError) -> ErrorRecord {
    ErrorRecord::new(
        ErrorKind::InternalUnknown,
        format!("Store read for {} failed: {}", key, err),
    )
}
