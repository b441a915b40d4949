//! Edit record types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Suffix marking a multi-valued (leaf-list) field, e.g. `ports@`.
pub const MULTI_VALUE_SUFFIX: char = '@';

/// Which schema passes an edit asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidateKind {
    /// Only existence checks and custom hooks run
    None,
    /// Structural checks on the record in isolation
    SyntaxOnly,
    /// Cross-reference, mandatory and cardinality checks
    SemanticsOnly,
    /// Syntax pass followed by semantic pass
    #[default]
    All,
}

impl ValidateKind {
    /// Returns whether the syntax pass runs
    pub fn wants_syntax(&self) -> bool {
        matches!(self, ValidateKind::SyntaxOnly | ValidateKind::All)
    }

    /// Returns whether the semantic pass runs
    pub fn wants_semantics(&self) -> bool {
        matches!(self, ValidateKind::SemanticsOnly | ValidateKind::All)
    }
}

/// Operation bitmask applied by an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Operation(u8);

impl Operation {
    pub const NONE: Operation = Operation(0);
    pub const CREATE: Operation = Operation(1);
    pub const UPDATE: Operation = Operation(1 << 1);
    pub const DELETE: Operation = Operation(1 << 2);

    /// Raw bit value
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Returns true if every bit in `other` is set in `self`
    pub fn contains(&self, other: Operation) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_create(&self) -> bool {
        self.contains(Operation::CREATE)
    }

    pub fn is_update(&self) -> bool {
        self.contains(Operation::UPDATE)
    }

    pub fn is_delete(&self) -> bool {
        self.contains(Operation::DELETE)
    }
}

impl BitOr for Operation {
    type Output = Operation;

    fn bitor(self, rhs: Operation) -> Operation {
        Operation(self.0 | rhs.0)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.is_create() {
            names.push("CREATE");
        }
        if self.is_update() {
            names.push("UPDATE");
        }
        if self.is_delete() {
            names.push("DELETE");
        }
        if names.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}

/// A compound store key split into table name and key components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey {
    /// Table name (first component)
    pub table: String,
    /// Remaining key components, in order
    pub components: Vec<String>,
}

impl RecordKey {
    /// Splits `TABLE|k1|k2` on `separator`.
    ///
    /// Returns `None` if the table part is empty.
    pub fn parse(key: &str, separator: &str) -> Option<Self> {
        let mut parts = key.split(separator);
        let table = parts.next().filter(|t| !t.is_empty())?;
        Some(Self {
            table: table.to_string(),
            components: parts.map(str::to_string).collect(),
        })
    }
}

/// One configuration edit: operation, compound key and ordered fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRecord {
    /// Requested schema passes
    #[serde(default)]
    pub validate_kind: ValidateKind,
    /// Operation bitmask
    pub operation: Operation,
    /// Compound key, e.g. `ACL_RULE|acl1|rule1`
    pub key: String,
    /// Field name/value pairs in caller order
    #[serde(default)]
    pub fields: Vec<(String, String)>,
}

impl EditRecord {
    /// Create an edit with no fields
    pub fn new(validate_kind: ValidateKind, operation: Operation, key: impl Into<String>) -> Self {
        Self {
            validate_kind,
            operation,
            key: key.into(),
            fields: Vec::new(),
        }
    }

    /// Shorthand for a fully validated create
    pub fn create(key: impl Into<String>) -> Self {
        Self::new(ValidateKind::All, Operation::CREATE, key)
    }

    /// Shorthand for a fully validated update
    pub fn update(key: impl Into<String>) -> Self {
        Self::new(ValidateKind::All, Operation::UPDATE, key)
    }

    /// Shorthand for a delete
    pub fn delete(key: impl Into<String>) -> Self {
        Self::new(ValidateKind::All, Operation::DELETE, key)
    }

    /// Append a field, builder style
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Looks up a field value by name. Multi-valued fields match with or
    /// without their `@` suffix.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name || n.strip_suffix(MULTI_VALUE_SUFFIX) == Some(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parses the compound key
    pub fn record_key(&self, separator: &str) -> Option<RecordKey> {
        RecordKey::parse(&self.key, separator)
    }

    /// Table part of the compound key
    pub fn table(&self, separator: &str) -> Option<&str> {
        self.key.split(separator).next().filter(|t| !t.is_empty())
    }
}
