//! Variable stores.
//!
//! A [`VariableStore`] is the host that finally owns the variables: a design
//! tool, a token file, a test double. The import pipeline talks to it twice:
//! once to read a [`Snapshot`] of what already exists, and once to apply the
//! finalized entries.
//!
//! [`MemoryStore`] is the in-process implementation. It keeps collections of
//! variables keyed by hierarchical name and serializes to a JSON document,
//! which makes it usable both as a test double and as a file-backed store.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::import::FinalizedEntry;
use crate::naming::to_hierarchical_name;
use crate::scope::VariableScope;
use crate::snapshot::Snapshot;
use crate::value::{VariableKind, VariableValue};

/// The host side of an import.
///
/// # Implementation Guidelines
///
/// - [`existing_variables`](Self::existing_variables) returns concrete values
///   only. Aliases stored by the host must be flattened to their target's
///   value first. Each variable should be registered under its stored name
///   and under the flat name of its code syntax, see
///   [`Snapshot::insert_with_code_syntax`].
///
/// - [`apply`](Self::apply) creates the collection when it does not exist,
///   creates or updates one variable per entry, and reports the counts.
pub trait VariableStore {
    /// Variables that already exist, as a name to value snapshot.
    fn existing_variables(&self) -> Result<Snapshot, StoreError>;

    /// Writes `entries` into `collection`.
    fn apply(&mut self, collection: &str, entries: &[FinalizedEntry]) -> Result<ImportSummary, StoreError>;
}

/// Counts of one [`VariableStore::apply`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub collection: String,
    pub added: usize,
    pub updated: usize,
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.added, self.updated) {
            (added, updated) if added > 0 && updated > 0 => write!(
                f,
                "Added {} and updated {} variables in {}",
                added, updated, self.collection
            ),
            (added, _) if added > 0 => {
                write!(f, "Added {} variables to {}", added, self.collection)
            }
            (_, updated) => write!(f, "Updated {} variables in {}", updated, self.collection),
        }
    }
}

/// A variable as a [`MemoryStore`] keeps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredVariable {
    /// Hierarchical name, unique within the collection.
    pub name: String,
    pub kind: VariableKind,
    /// Concrete base value.
    pub value: VariableValue,
    /// Hierarchical name of the aliased variable, if the base is an alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modes: BTreeMap<String, VariableValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub scopes: Vec<VariableScope>,
    /// Web code syntax, `var(--flat-name)`.
    pub code_syntax: String,
}

impl StoredVariable {
    fn from_entry(entry: &FinalizedEntry) -> Self {
        Self {
            name: entry.hierarchical_name.clone(),
            kind: entry.kind,
            value: entry.value.value.clone(),
            alias_of: entry.value.alias_of.as_deref().map(to_hierarchical_name),
            modes: entry
                .modes
                .iter()
                .map(|(mode, slot)| (mode.clone(), slot.value.clone()))
                .collect(),
            description: entry.description.clone(),
            scopes: entry.scopes.clone(),
            code_syntax: entry.code_syntax(),
        }
    }
}

/// A named group of variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredCollection {
    pub variables: Vec<StoredVariable>,
}

impl StoredCollection {
    pub fn get(&self, name: &str) -> Option<&StoredVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }
}

/// In-memory store, loadable from and savable to a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    pub collections: BTreeMap<String, StoredCollection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection(&self, name: &str) -> Option<&StoredCollection> {
        self.collections.get(name)
    }

    /// Loads a store document. A missing file yields an empty store.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl VariableStore for MemoryStore {
    fn existing_variables(&self) -> Result<Snapshot, StoreError> {
        let mut snapshot = Snapshot::new();
        for collection in self.collections.values() {
            for variable in &collection.variables {
                snapshot.insert_with_code_syntax(
                    &variable.name,
                    Some(&variable.code_syntax),
                    variable.value.clone(),
                );
            }
        }
        Ok(snapshot)
    }

    fn apply(&mut self, collection: &str, entries: &[FinalizedEntry]) -> Result<ImportSummary, StoreError> {
        // Refuse the whole batch before touching anything.
        if let Some(current) = self.collections.get(collection) {
            for entry in entries {
                if let Some(existing) = current.get(&entry.hierarchical_name) {
                    if existing.kind != entry.kind {
                        return Err(StoreError::TypeMismatch {
                            name: entry.hierarchical_name.clone(),
                            stored: existing.kind,
                            incoming: entry.kind,
                        });
                    }
                }
            }
        }

        let target = self.collections.entry(collection.to_string()).or_default();

        let mut summary = ImportSummary {
            collection: collection.to_string(),
            added: 0,
            updated: 0,
        };
        for entry in entries {
            let stored = StoredVariable::from_entry(entry);
            match target.position(&stored.name) {
                Some(index) => {
                    target.variables[index] = stored;
                    summary.updated += 1;
                }
                None => {
                    target.variables.push(stored);
                    summary.added += 1;
                }
            }
        }
        Ok(summary)
    }
}
