//! Validator configuration
//!
//! Loaded from a JSON file. Every field except `schema_dir` has a default:
//!
//! ```json
//! {
//!   "schema_dir": "/usr/share/cfgval/schemas",
//!   "key_separator": "|",
//!   "max_entries": { "ACL_RULE": 1024 },
//!   "default_max_entries": 1024,
//!   "unique_fields": { "VXLAN_TUNNEL_MAP": "vni" },
//!   "fetch_leafref_targets": true,
//!   "logging": { "level": "info", "format": "plain" }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::LogConfig;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "CFGVAL_CONFIG_READ",
            ConfigError::Parse(_) => "CFGVAL_CONFIG_PARSE",
            ConfigError::Invalid(_) => "CFGVAL_CONFIG_INVALID",
        }
    }
}

/// Runtime settings for sessions and built-in hooks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Directory of table schema files
    pub schema_dir: PathBuf,

    /// Separator between table name and key components
    #[serde(default = "default_key_separator")]
    pub key_separator: String,

    /// Per-table entry limits enforced by `ValidateMaxEntries`
    #[serde(default = "default_max_entries")]
    pub max_entries: BTreeMap<String, usize>,

    /// Limit for tables absent from `max_entries`
    #[serde(default = "default_max_entries_limit")]
    pub default_max_entries: usize,

    /// Table → field whose value must be unique across the table
    #[serde(default = "default_unique_fields")]
    pub unique_fields: BTreeMap<String, String>,

    /// Whether semantic passes pull leafref targets from the store
    #[serde(default = "default_true")]
    pub fetch_leafref_targets: bool,

    #[serde(default)]
    pub logging: LogConfig,
}

fn default_key_separator() -> String {
    "|".to_string()
}

fn default_max_entries_limit() -> usize {
    1024
}

fn default_max_entries() -> BTreeMap<String, usize> {
    BTreeMap::from([("ACL_RULE".to_string(), default_max_entries_limit())])
}

fn default_unique_fields() -> BTreeMap<String, String> {
    BTreeMap::from([("VXLAN_TUNNEL_MAP".to_string(), "vni".to_string())])
}

fn default_true() -> bool {
    true
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::with_schema_dir(PathBuf::new())
    }
}

impl ValidatorConfig {
    /// Defaults with the given schema directory
    pub fn with_schema_dir(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            key_separator: default_key_separator(),
            max_entries: default_max_entries(),
            default_max_entries: default_max_entries_limit(),
            unique_fields: default_unique_fields(),
            fetch_leafref_targets: true,
            logging: LogConfig::default(),
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: ValidatorConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks value constraints serde cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        if self.key_separator.is_empty() {
            return Err(ConfigError::Invalid("key_separator must not be empty".into()));
        }

        if self.default_max_entries == 0 {
            return Err(ConfigError::Invalid("default_max_entries must be > 0".into()));
        }

        if let Some((table, _)) = self.max_entries.iter().find(|(_, limit)| **limit == 0) {
            return Err(ConfigError::Invalid(format!(
                "max_entries for {} must be > 0",
                table
            )));
        }

        if let Some((table, _)) = self.unique_fields.iter().find(|(_, field)| field.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "unique_fields for {} names no field",
                table
            )));
        }

        self.logging
            .env_filter()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(())
    }

    /// Entry limit for `table`
    pub fn max_entries_for(&self, table: &str) -> usize {
        self.max_entries
            .get(table)
            .copied()
            .unwrap_or(self.default_max_entries)
    }

    /// Field that must be unique within `table`, if configured
    pub fn unique_field_for(&self, table: &str) -> Option<&str> {
        self.unique_fields.get(table).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("cfgval.json");
        fs::write(&config_path, json!({ "schema_dir": "/tmp/schemas" }).to_string()).unwrap();

        let config = ValidatorConfig::load(&config_path).unwrap();
        assert_eq!(config.key_separator, "|");
        assert_eq!(config.max_entries_for("ACL_RULE"), 1024);
        assert_eq!(config.max_entries_for("PORT"), 1024);
        assert_eq!(config.unique_field_for("VXLAN_TUNNEL_MAP"), Some("vni"));
        assert!(config.fetch_leafref_targets);
    }

    #[test]
    fn test_config_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("cfgval.json");
        let config = json!({
            "schema_dir": "/tmp/schemas",
            "key_separator": ":",
            "max_entries": { "ACL_RULE": 10 },
            "default_max_entries": 50,
            "fetch_leafref_targets": false,
            "logging": { "level": "debug", "format": "json" }
        });
        fs::write(&config_path, config.to_string()).unwrap();

        let config = ValidatorConfig::load(&config_path).unwrap();
        assert_eq!(config.key_separator, ":");
        assert_eq!(config.max_entries_for("ACL_RULE"), 10);
        assert_eq!(config.max_entries_for("PORT"), 50);
        assert!(!config.fetch_leafref_targets);
    }

    #[test]
    fn test_config_rejects_empty_separator() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("cfgval.json");
        fs::write(
            &config_path,
            json!({ "schema_dir": "/tmp", "key_separator": "" }).to_string(),
        )
        .unwrap();

        let err = ValidatorConfig::load(&config_path).unwrap_err();
        assert_eq!(err.code(), "CFGVAL_CONFIG_INVALID");
    }

    #[test]
    fn test_config_rejects_zero_limit() {
        let mut config = ValidatorConfig::default();
        config.max_entries.insert("PORT".into(), 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_missing_file_and_bad_json() {
        let temp_dir = TempDir::new().unwrap();
        let missing = ValidatorConfig::load(&temp_dir.path().join("absent.json")).unwrap_err();
        assert_eq!(missing.code(), "CFGVAL_CONFIG_READ");

        let config_path = temp_dir.path().join("cfgval.json");
        fs::write(&config_path, "{ not json").unwrap();
        let bad = ValidatorConfig::load(&config_path).unwrap_err();
        assert_eq!(bad.code(), "CFGVAL_CONFIG_PARSE");
    }
}
