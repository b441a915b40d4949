//! Schema loader for table schemas stored on disk
//!
//! - One JSON file per table under the schema directory
//! - Non-JSON files are ignored
//! - Leafref targets are checked once all files are loaded

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::errors::{SchemaError, SchemaResult};
use super::types::TableSchema;

/// In-memory registry of table schemas, optionally backed by a directory.
#[derive(Debug, Clone, Default)]
pub struct SchemaLoader {
    /// Directory containing schema files
    schema_dir: PathBuf,
    /// Loaded schemas indexed by table name
    tables: BTreeMap<String, TableSchema>,
}

impl SchemaLoader {
    /// Creates a new loader reading from `schema_dir`.
    pub fn new(schema_dir: impl AsRef<Path>) -> Self {
        Self {
            schema_dir: schema_dir.as_ref().to_path_buf(),
            tables: BTreeMap::new(),
        }
    }

    /// Creates a loader with no backing directory, for programmatic schemas.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every `*.json` file from the schema directory, then checks
    /// cross-table references.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        let dir = self.schema_dir.display().to_string();
        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed(&dir, format!("Failed to read schema directory: {}", e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed(&dir, format!("Failed to read directory entry: {}", e))
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }

        // Directory order is platform dependent
        paths.sort();
        for path in &paths {
            self.load_schema_file(path)?;
        }

        self.check_references()?;
        info!(dir = %dir, tables = self.tables.len(), "schemas loaded");
        Ok(())
    }

    /// Loads a single schema file.
    fn load_schema_file(&mut self, path: &Path) -> SchemaResult<()> {
        let origin = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| SchemaError::malformed(&origin, format!("Failed to read file: {}", e)))?;

        let schema: TableSchema = serde_json::from_str(&content)
            .map_err(|e| SchemaError::malformed(&origin, format!("Invalid JSON: {}", e)))?;

        debug!(table = %schema.name, path = %origin, "schema file parsed");
        self.insert(schema, &origin)
    }

    /// Registers a schema directly.
    pub fn register(&mut self, schema: TableSchema) -> SchemaResult<()> {
        self.insert(schema, "<in-memory>")
    }

    fn insert(&mut self, schema: TableSchema, origin: &str) -> SchemaResult<()> {
        schema
            .validate_structure()
            .map_err(|e| SchemaError::malformed(origin, e))?;

        if self.tables.contains_key(&schema.name) {
            return Err(SchemaError::Immutable(schema.name));
        }

        self.tables.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Verifies that every leafref names a registered table.
    pub fn check_references(&self) -> SchemaResult<()> {
        for schema in self.tables.values() {
            for (field, target) in schema.leafrefs() {
                if !self.tables.contains_key(target) {
                    return Err(SchemaError::DanglingReference {
                        table: schema.name.clone(),
                        field: field.to_string(),
                        target: target.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Gets a schema by table name.
    pub fn get(&self, table: &str) -> Option<&TableSchema> {
        self.tables.get(table)
    }

    /// Gets a schema by table name or fails with `UnknownTable`.
    pub fn require(&self, table: &str) -> SchemaResult<&TableSchema> {
        self.get(table)
            .ok_or_else(|| SchemaError::UnknownTable(table.to_string()))
    }

    /// Checks if a table schema exists.
    pub fn exists(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Returns all loaded schemas in table-name order.
    pub fn all_schemas(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.tables.len()
    }

    /// Saves a schema to `<schema_dir>/<table>.json`.
    pub fn save_schema(&self, schema: &TableSchema) -> SchemaResult<PathBuf> {
        let path = self.schema_dir.join(format!("{}.json", schema.name));
        let origin = path.display().to_string();

        if path.exists() {
            return Err(SchemaError::Immutable(schema.name.clone()));
        }

        fs::create_dir_all(&self.schema_dir).map_err(|e| {
            SchemaError::malformed(&origin, format!("Failed to create schema directory: {}", e))
        })?;

        let content = serde_json::to_string_pretty(schema).map_err(|e| {
            SchemaError::malformed(&origin, format!("Failed to serialize schema: {}", e))
        })?;

        fs::write(&path, content)
            .map_err(|e| SchemaError::malformed(&origin, format!("Failed to write file: {}", e)))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::FieldDef;
    use tempfile::TempDir;

    fn acl_table() -> TableSchema {
        let mut fields = BTreeMap::new();
        fields.insert("aclname".into(), FieldDef::string());
        fields.insert("type".into(), FieldDef::enumeration(&["L3", "L3V6"]));
        TableSchema::new("ACL_TABLE", "sonic-acl", &["aclname"], fields)
    }

    fn acl_rule() -> TableSchema {
        let mut fields = BTreeMap::new();
        fields.insert("aclname".into(), FieldDef::leafref("ACL_TABLE"));
        fields.insert("rulename".into(), FieldDef::string());
        TableSchema::new("ACL_RULE", "sonic-acl", &["aclname", "rulename"], fields)
    }

    #[test]
    fn test_register_and_get() {
        let mut loader = SchemaLoader::in_memory();
        loader.register(acl_table()).unwrap();

        let schema = loader.get("ACL_TABLE");
        assert!(schema.is_some());
        assert_eq!(schema.unwrap().module, "sonic-acl");
        assert!(loader.require("NOPE").is_err());
    }

    #[test]
    fn test_schema_immutability() {
        let mut loader = SchemaLoader::in_memory();
        loader.register(acl_table()).unwrap();

        let result = loader.register(acl_table());
        assert_eq!(result.unwrap_err().code(), "CFGVAL_SCHEMA_IMMUTABLE");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());
        loader.save_schema(&acl_table()).unwrap();
        loader.save_schema(&acl_rule()).unwrap();

        let mut loader2 = SchemaLoader::new(temp_dir.path());
        loader2.load_all().unwrap();

        assert_eq!(loader2.schema_count(), 2);
        assert_eq!(loader2.get("ACL_RULE"), Some(&acl_rule()));
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());
        loader.save_schema(&acl_rule()).unwrap();

        let mut loader2 = SchemaLoader::new(temp_dir.path());
        let err = loader2.load_all().unwrap_err();
        assert_eq!(err.code(), "CFGVAL_SCHEMA_DANGLING_REFERENCE");
    }

    #[test]
    fn test_malformed_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        let err = loader.load_all().unwrap_err();
        assert_eq!(err.code(), "CFGVAL_SCHEMA_MALFORMED");
    }

    #[test]
    fn test_missing_directory_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path().join("absent"));
        assert!(loader.load_all().is_err());
    }
}
