//! Schema engine driven by loaded table schemas
//!
//! Edit mode checks, per entry:
//! - key leaves present
//! - every leaf declared by the schema
//! - single-valued leaves carry exactly one value
//! - values match their type (pattern, length, range, enumeration)
//! - no repeated values in a leaf-list
//!
//! Full mode additionally checks:
//! - leaf-list cardinality
//! - mandatory leaves
//! - must rules
//! - leafref targets present in the tree
//! - no two entries with the same key
//! - table entry limits

use std::cell::RefCell;
use std::collections::HashMap;

use regex::Regex;
use tracing::trace;

use super::codes;
use super::{EngineFailure, RawError, SchemaEngine, ValidationMode};
use crate::schema::{FieldDef, FieldType, SchemaError, SchemaLoader, SchemaResult, TableSchema};
use crate::tree::{DataTree, EntryNode, TableNode, TreeResult};

/// Engine validating trees against the schemas of a [`SchemaLoader`].
///
/// Holds one pending error at a time; not meant to be shared across threads.
#[derive(Debug)]
pub struct ModelEngine {
    loader: SchemaLoader,
    /// Compiled, anchored string patterns keyed by (table, field)
    patterns: HashMap<(String, String), Regex>,
    pending: RefCell<Option<RawError>>,
}

impl ModelEngine {
    /// Binds the engine to a set of schemas, compiling string patterns.
    pub fn new(loader: SchemaLoader) -> SchemaResult<Self> {
        let mut patterns = HashMap::new();
        for schema in loader.all_schemas() {
            for (field, def) in &schema.fields {
                if let FieldType::String {
                    pattern: Some(pattern),
                    ..
                } = &def.field_type
                {
                    let anchored = format!("^(?:{})$", pattern);
                    let regex = Regex::new(&anchored).map_err(|e| {
                        SchemaError::malformed(&schema.name, format!("field '{}': {}", field, e))
                    })?;
                    patterns.insert((schema.name.clone(), field.clone()), regex);
                }
            }
        }

        Ok(Self {
            loader,
            patterns,
            pending: RefCell::new(None),
        })
    }

    /// The schemas this engine is bound to
    pub fn loader(&self) -> &SchemaLoader {
        &self.loader
    }

    fn check_tree(&self, tree: &DataTree, mode: ValidationMode) -> Result<(), RawError> {
        for table in tree.tables() {
            let schema = self.loader.get(&table.name).ok_or_else(|| {
                RawError::new(
                    codes::INVALID_ELEMENT,
                    format!("/{}", table.name),
                    format!("Unknown element \"{}\".", table.name),
                )
            })?;

            for entry in &table.entries {
                self.check_entry_syntax(schema, entry)?;
            }

            if mode == ValidationMode::Full {
                self.check_table_semantics(schema, table, tree)?;
            }
        }
        Ok(())
    }

    fn check_entry_syntax(&self, schema: &TableSchema, entry: &EntryNode) -> Result<(), RawError> {
        let entry_path = entry.path(&schema.module, &schema.name);

        for (idx, key) in schema.keys.iter().enumerate() {
            match entry.keys.get(idx) {
                Some((name, value)) if name == key => {
                    if value.is_empty() {
                        return Err(RawError::new(
                            codes::INVALID_KEY,
                            &entry_path,
                            format!("Invalid key value \"\" for \"{}\".", key),
                        ));
                    }
                    if let Some(def) = schema.field(key) {
                        let path = entry.leaf_path(&schema.module, &schema.name, key);
                        self.check_value(schema, key, def, value, &path)?;
                    }
                }
                _ => {
                    return Err(RawError::new(
                        codes::MISSING_KEY,
                        &entry_path,
                        format!("List instance is missing its key \"{}\".", key),
                    ))
                }
            }
        }

        for leaf in &entry.leaves {
            let path = entry.leaf_path(&schema.module, &schema.name, &leaf.name);
            let def = schema.field(&leaf.name).ok_or_else(|| {
                RawError::new(
                    codes::INVALID_ELEMENT,
                    &path,
                    format!("Unknown element \"{}\".", leaf.name),
                )
            })?;

            if !def.multi && leaf.values.len() != 1 {
                return Err(RawError::new(
                    codes::TOO_MANY,
                    &path,
                    format!("Too many \"{}\" elements.", leaf.name),
                ));
            }

            let mut seen = Vec::with_capacity(leaf.values.len());
            for value in &leaf.values {
                if def.multi && seen.contains(&value) {
                    return Err(RawError::new(
                        codes::DUPLICATE_ID,
                        &path,
                        format!("Duplicate value \"{}\" in leaf-list \"{}\".", value, leaf.name),
                    ));
                }
                seen.push(value);
                self.check_value(schema, &leaf.name, def, value, &path)?;
            }
        }

        Ok(())
    }

    fn check_value(
        &self,
        schema: &TableSchema,
        field: &str,
        def: &FieldDef,
        value: &str,
        path: &str,
    ) -> Result<(), RawError> {
        let invalid = |code: u32, message: String| -> Result<(), RawError> {
            Err(RawError::new(code, path, message))
        };

        match &def.field_type {
            FieldType::String {
                min_length,
                max_length,
                ..
            } => {
                let len = value.chars().count();
                if min_length.map_or(false, |min| len < min) || max_length.map_or(false, |max| len > max) {
                    return invalid(
                        codes::INVALID_STATEMENT,
                        format!("Invalid length of value \"{}\" in \"{}\" element.", value, field),
                    );
                }
                let key = (schema.name.clone(), field.to_string());
                if let Some(regex) = self.patterns.get(&key) {
                    if !regex.is_match(value) {
                        return invalid(
                            codes::INVALID_STATEMENT,
                            format!("Invalid value \"{}\" in \"{}\" element.", value, field),
                        );
                    }
                }
            }
            FieldType::Integer { min, max } => {
                let number: i64 = match value.parse() {
                    Ok(n) => n,
                    Err(_) => {
                        return invalid(
                            codes::INVALID_STATEMENT,
                            format!("Invalid value \"{}\" in \"{}\" element.", value, field),
                        )
                    }
                };
                if min.map_or(false, |m| number < m) || max.map_or(false, |m| number > m) {
                    return invalid(
                        codes::OUT_OF_RANGE,
                        format!("Value \"{}\" is out of range for \"{}\".", value, field),
                    );
                }
            }
            FieldType::Boolean => {
                if value != "true" && value != "false" {
                    return invalid(
                        codes::INVALID_STATEMENT,
                        format!("Invalid value \"{}\" in \"{}\" element.", value, field),
                    );
                }
            }
            FieldType::Enumeration { values } => {
                if value.trim() != value {
                    return invalid(
                        codes::ENUM_WHITESPACE,
                        format!(
                            "Invalid value \"{}\" with surrounding whitespace in enumeration \"{}\".",
                            value, field
                        ),
                    );
                }
                let well_formed = !value.is_empty()
                    && value
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
                if !well_formed {
                    return invalid(
                        codes::ENUM_INVALID_NAME,
                        format!("Invalid enumeration value \"{}\" name in \"{}\".", value, field),
                    );
                }
                if !values.iter().any(|v| v == value) {
                    return invalid(
                        codes::ENUM_INVALID,
                        format!("Invalid value \"{}\" in \"{}\" enumeration.", value, field),
                    );
                }
            }
            FieldType::Leafref { .. } => {
                if value.is_empty() {
                    return invalid(
                        codes::INVALID_STATEMENT,
                        format!("Invalid value \"{}\" in \"{}\" element.", value, field),
                    );
                }
            }
        }
        Ok(())
    }

    fn check_table_semantics(
        &self,
        schema: &TableSchema,
        table: &TableNode,
        tree: &DataTree,
    ) -> Result<(), RawError> {
        for (idx, entry) in table.entries.iter().enumerate() {
            if table.entries[..idx].iter().any(|e| e.same_key(entry)) {
                return Err(RawError::new(
                    codes::DUPLICATE_KEY,
                    entry.path(&schema.module, &schema.name),
                    format!("Duplicate instance of \"{}\" list.", schema.name),
                ));
            }
            self.check_entry_semantics(schema, entry, tree)?;
        }

        if let Some(max) = schema.max_elements {
            if table.entries.len() > max {
                return Err(RawError::new(
                    codes::MAX_ELEMENTS,
                    format!("/{}:{}", schema.module, schema.name),
                    format!("Too many \"{}\" elements.", schema.name),
                ));
            }
        }

        Ok(())
    }

    fn check_entry_semantics(
        &self,
        schema: &TableSchema,
        entry: &EntryNode,
        tree: &DataTree,
    ) -> Result<(), RawError> {
        for (name, def) in &schema.fields {
            let path = entry.leaf_path(&schema.module, &schema.name, name);
            let leaf = entry.leaf(name);

            if def.mandatory && !schema.is_key(name) && leaf.is_none() {
                return Err(RawError::new(
                    codes::MANDATORY_MISSING,
                    &path,
                    format!("Missing required element \"{}\" in \"{}\".", name, schema.name),
                ));
            }

            if let Some(leaf) = leaf {
                let count = leaf.values.len();
                if def.min_elements.map_or(false, |min| count < min) {
                    return Err(RawError::new(
                        codes::MIN_ELEMENTS,
                        &path,
                        format!("Too few \"{}\" elements.", name),
                    ));
                }
                if def.max_elements.map_or(false, |max| count > max) {
                    return Err(RawError::new(
                        codes::MAX_ELEMENTS,
                        &path,
                        format!("Too many \"{}\" elements.", name),
                    ));
                }

                if let Some(rule) = &def.must {
                    let satisfied = rule
                        .requires
                        .iter()
                        .all(|r| entry.leaf(r).is_some() || entry.key_value(r).is_some());
                    if !satisfied {
                        return Err(RawError::new(codes::MUST_FAILED, &path, &rule.message)
                            .with_app_tag(&rule.app_tag));
                    }
                }
            }

            if let FieldType::Leafref { table: target } = &def.field_type {
                let values: Vec<&str> = match (entry.key_value(name), leaf) {
                    (Some(key), _) => vec![key],
                    (None, Some(leaf)) => leaf.values.iter().map(String::as_str).collect(),
                    (None, None) => Vec::new(),
                };
                for value in values {
                    if !references_entry(tree, target, value) {
                        return Err(RawError::new(
                            codes::NO_LEAFREF,
                            &path,
                            format!(
                                "Leafref \"{}\" with value \"{}\" points to a non-existing leaf.",
                                name, value
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Returns true if `table` holds an entry whose first key equals `value`
fn references_entry(tree: &DataTree, table: &str, value: &str) -> bool {
    tree.table(table).map_or(false, |t| {
        t.entries
            .iter()
            .any(|e| e.keys.first().map_or(false, |(_, v)| v == value))
    })
}

impl SchemaEngine for ModelEngine {
    fn table_schema(&self, table: &str) -> Option<&TableSchema> {
        self.loader.get(table)
    }

    fn parse(&self, text: &str) -> TreeResult<DataTree> {
        DataTree::parse(text)
    }

    fn validate(&self, tree: &DataTree, mode: ValidationMode) -> Result<(), EngineFailure> {
        self.clear_error();
        match self.check_tree(tree, mode) {
            Ok(()) => Ok(()),
            Err(raw) => {
                trace!(code = raw.code, path = %raw.path, %mode, "engine validation failed");
                *self.pending.borrow_mut() = Some(raw);
                Err(EngineFailure)
            }
        }
    }

    fn first_error(&self) -> Option<RawError> {
        self.pending.borrow().clone()
    }

    fn clear_error(&self) {
        self.pending.borrow_mut().take();
    }
}
