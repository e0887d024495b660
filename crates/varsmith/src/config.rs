//! Import configuration.
//!
//! An [`ImportConfig`] names the target collection and carries explicit scope
//! overrides. Overrides are keyed by flat variable name (`item_scopes`) or by
//! group path (`group_scopes`, e.g. `color/text`).
//!
//! # YAML format
//!
//! ```yaml
//! collection: Design Tokens
//! item_scopes:
//!   brand-primary: [TEXT_FILL, ALL_FILLS]
//! group_scopes:
//!   space: [GAP]
//! ```
//!
//! Every field is optional. JSON files with the same shape are accepted too.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scope::VariableScope;

/// Collection used when the configuration does not name one.
pub const DEFAULT_COLLECTION: &str = "CSS Variables";

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

/// Caller-supplied settings for one import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Target collection name.
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Scope overrides by flat variable name.
    pub item_scopes: BTreeMap<String, Vec<VariableScope>>,
    /// Scope overrides by group path.
    pub group_scopes: BTreeMap<String, Vec<VariableScope>>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            item_scopes: BTreeMap::new(),
            group_scopes: BTreeMap::new(),
        }
    }
}

impl ImportConfig {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Self::default()
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration file. `.json` files are read as JSON, anything
    /// else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Adds a per-name override, returning the config for chaining.
    pub fn with_item_scopes(mut self, name: impl Into<String>, scopes: Vec<VariableScope>) -> Self {
        self.item_scopes.insert(name.into(), scopes);
        self
    }

    /// Adds a per-group override, returning the config for chaining.
    pub fn with_group_scopes(mut self, group: impl Into<String>, scopes: Vec<VariableScope>) -> Self {
        self.group_scopes.insert(group.into(), scopes);
        self
    }
}
