//! Table schema definitions
//!
//! Supported field types:
//! - string: UTF-8 string, optional regex pattern and length bounds
//! - integer: 64-bit signed integer, optional inclusive range
//! - boolean: `true` / `false`
//! - enumeration: one of a fixed set of names
//! - leafref: must equal the first key of an entry in another table

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field value types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    /// 64-bit signed integer
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    /// Boolean
    Boolean,
    /// Fixed set of names
    Enumeration { values: Vec<String> },
    /// Reference to an entry of another table
    Leafref { table: String },
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String { .. } => "string",
            FieldType::Integer { .. } => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Enumeration { .. } => "enumeration",
            FieldType::Leafref { .. } => "leafref",
        }
    }
}

/// Co-presence constraint: when the owning field is set, every field in
/// `requires` must be set in the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MustRule {
    /// Fields that must accompany the owning field
    pub requires: Vec<String>,
    /// Free-text constraint message reported on failure
    pub message: String,
    /// Application tag reported on failure
    #[serde(default)]
    pub app_tag: String,
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field data type
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Whether the field must be present once the entry is complete
    #[serde(default)]
    pub mandatory: bool,
    /// Whether the field holds a list of values (leaf-list)
    #[serde(default)]
    pub multi: bool,
    /// Minimum number of values for a multi-valued field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_elements: Option<usize>,
    /// Maximum number of values for a multi-valued field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_elements: Option<usize>,
    /// Co-presence constraint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub must: Option<MustRule>,
    /// Name of the custom-validation hook attached to this field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_validation: Option<String>,
}

impl FieldDef {
    fn of(field_type: FieldType) -> Self {
        Self {
            field_type,
            mandatory: false,
            multi: false,
            min_elements: None,
            max_elements: None,
            must: None,
            custom_validation: None,
        }
    }

    /// Unconstrained string field
    pub fn string() -> Self {
        Self::of(FieldType::String {
            pattern: None,
            min_length: None,
            max_length: None,
        })
    }

    /// String field constrained by a regex pattern
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::of(FieldType::String {
            pattern: Some(pattern.into()),
            min_length: None,
            max_length: None,
        })
    }

    /// Integer field with an inclusive range
    pub fn integer(min: Option<i64>, max: Option<i64>) -> Self {
        Self::of(FieldType::Integer { min, max })
    }

    /// Boolean field
    pub fn boolean() -> Self {
        Self::of(FieldType::Boolean)
    }

    /// Enumeration field
    pub fn enumeration(values: &[&str]) -> Self {
        Self::of(FieldType::Enumeration {
            values: values.iter().map(|v| v.to_string()).collect(),
        })
    }

    /// Reference to an entry of `table`
    pub fn leafref(table: impl Into<String>) -> Self {
        Self::of(FieldType::Leafref {
            table: table.into(),
        })
    }

    /// Mark the field mandatory
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Mark the field multi-valued with optional cardinality bounds
    pub fn multi(mut self, min_elements: Option<usize>, max_elements: Option<usize>) -> Self {
        self.multi = true;
        self.min_elements = min_elements;
        self.max_elements = max_elements;
        self
    }

    /// Attach a co-presence rule
    pub fn with_must(mut self, rule: MustRule) -> Self {
        self.must = Some(rule);
        self
    }

    /// Attach a custom-validation hook by name
    pub fn with_custom_validation(mut self, hook: impl Into<String>) -> Self {
        self.custom_validation = Some(hook.into());
        self
    }
}

/// Complete schema of one configuration table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name as used in store keys
    pub name: String,
    /// Module that owns the table, used as path prefix in errors
    pub module: String,
    /// Key leaf names, in key order
    pub keys: Vec<String>,
    /// Field definitions, key leaves included
    pub fields: BTreeMap<String, FieldDef>,
    /// Maximum number of entries the table may hold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_elements: Option<usize>,
    /// Hook run once per edit of this table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_validation: Option<String>,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TableSchema {
    /// Create a new table schema. Every key must also appear in `fields`.
    pub fn new(
        name: impl Into<String>,
        module: impl Into<String>,
        keys: &[&str],
        fields: BTreeMap<String, FieldDef>,
    ) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            keys: keys.iter().map(|k| k.to_string()).collect(),
            fields,
            max_elements: None,
            custom_validation: None,
            description: None,
        }
    }

    /// Limit the number of entries
    pub fn with_max_elements(mut self, max: usize) -> Self {
        self.max_elements = Some(max);
        self
    }

    /// Attach a table-level custom-validation hook
    pub fn with_custom_validation(mut self, hook: impl Into<String>) -> Self {
        self.custom_validation = Some(hook.into());
        self
    }

    /// Looks up a field definition
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Returns whether `name` is a key leaf
    pub fn is_key(&self, name: &str) -> bool {
        self.keys.iter().any(|k| k == name)
    }

    /// Returns the leafref target table of every referencing field
    pub fn leafrefs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().filter_map(|(name, def)| match &def.field_type {
            FieldType::Leafref { table } => Some((name.as_str(), table.as_str())),
            _ => None,
        })
    }

    /// Validates the schema structure itself (not an entry)
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Table name must not be empty".into());
        }

        if self.keys.is_empty() {
            return Err(format!("Table '{}' must declare at least one key", self.name));
        }

        for key in &self.keys {
            match self.fields.get(key) {
                None => return Err(format!("Key '{}' is not a declared field", key)),
                Some(def) if def.multi => {
                    return Err(format!("Key '{}' cannot be multi-valued", key))
                }
                Some(_) => {}
            }
        }

        for (name, def) in &self.fields {
            if let FieldType::String {
                pattern: Some(pattern),
                ..
            } = &def.field_type
            {
                Regex::new(pattern)
                    .map_err(|e| format!("Field '{}' has invalid pattern: {}", name, e))?;
            }

            if let (Some(min), Some(max)) = (def.min_elements, def.max_elements) {
                if min > max {
                    return Err(format!("Field '{}' has min_elements > max_elements", name));
                }
            }

            if let Some(rule) = &def.must {
                for required in &rule.requires {
                    if !self.fields.contains_key(required) {
                        return Err(format!(
                            "Must rule on '{}' requires undeclared field '{}'",
                            name, required
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}
