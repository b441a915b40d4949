//! Tree construction from edit records and store records

use crate::edit::{EditRecord, RecordKey, MULTI_VALUE_SUFFIX};
use crate::schema::TableSchema;

use super::errors::{TreeError, TreeResult};
use super::node::{DataTree, EntryNode};

/// Placeholder field store entries carry when they have no real fields
pub const NULL_FIELD: &str = "NULL";

/// Separator between names and values in a field spec
const SPEC_SEPARATOR: char = '#';

/// Appends one leaf, or several leaves encoded as `name#value#name#value`,
/// to `parent`.
///
/// Fails with `SchemaViolation` when a name is not declared by `schema` or
/// names a key leaf.
pub fn build_leaf(parent: &mut EntryNode, schema: &TableSchema, field_spec: &str) -> TreeResult<()> {
    let parts: Vec<&str> = field_spec.split(SPEC_SEPARATOR).collect();
    if parts.len() % 2 != 0 {
        return Err(TreeError::MalformedFieldSpec(field_spec.to_string()));
    }

    for pair in parts.chunks(2) {
        append_leaf(parent, schema, pair[0], pair[1])?;
    }
    Ok(())
}

/// Appends a single `name = value` leaf.
fn append_leaf(parent: &mut EntryNode, schema: &TableSchema, name: &str, value: &str) -> TreeResult<()> {
    if name == NULL_FIELD {
        return Ok(());
    }

    let bare = name.strip_suffix(MULTI_VALUE_SUFFIX).unwrap_or(name);
    let violation = |reason: &str| TreeError::SchemaViolation {
        table: schema.name.clone(),
        field: bare.to_string(),
        reason: reason.to_string(),
    };

    let def = schema.field(bare).ok_or_else(|| violation("unknown field"))?;
    if schema.is_key(bare) {
        return Err(violation("key leaves are set from the record key"));
    }

    let values = if def.multi {
        if value.is_empty() {
            Vec::new()
        } else {
            value.split(',').map(str::to_string).collect()
        }
    } else {
        vec![value.to_string()]
    };

    parent.set_leaf(bare, values, def.multi);
    Ok(())
}

impl DataTree {
    /// Builds a one-entry tree from a key and field pairs, e.g. a record
    /// fetched from the store.
    pub fn from_record<'a>(
        schema: &TableSchema,
        key: &RecordKey,
        fields: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> TreeResult<Self> {
        let entry = build_entry(schema, key, fields)?;
        let mut tree = DataTree::new();
        tree.push_entry(&schema.name, &schema.module, entry);
        Ok(tree)
    }

    /// Builds the tree for one edit. Deletes carry only their key.
    pub fn from_edit(schema: &TableSchema, edit: &EditRecord, separator: &str) -> TreeResult<Self> {
        let key = edit.record_key(separator).ok_or_else(|| TreeError::InvalidKey {
            table: schema.name.clone(),
            expected: schema.keys.len(),
            found: 0,
        })?;

        if edit.operation.is_delete() {
            return Self::from_record(schema, &key, std::iter::empty());
        }

        Self::from_record(
            schema,
            &key,
            edit.fields.iter().map(|(n, v)| (n.as_str(), v.as_str())),
        )
    }
}

fn build_entry<'a>(
    schema: &TableSchema,
    key: &RecordKey,
    fields: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> TreeResult<EntryNode> {
    if key.components.len() != schema.keys.len() {
        return Err(TreeError::InvalidKey {
            table: schema.name.clone(),
            expected: schema.keys.len(),
            found: key.components.len(),
        });
    }

    let keys = schema
        .keys
        .iter()
        .cloned()
        .zip(key.components.iter().cloned())
        .collect();
    let mut entry = EntryNode::new(keys);

    for (name, value) in fields {
        append_leaf(&mut entry, schema, name, value)?;
    }
    Ok(entry)
}
