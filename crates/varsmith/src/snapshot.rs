//! Snapshot of variables that already exist in the target store.
//!
//! Aliases may point at variables that are not declared in the stylesheet but
//! already live in the store. A [`Snapshot`] maps those names to concrete
//! values. Each stored variable can be registered under its own name and
//! under the name taken from its code syntax, so `var(--brand)` finds a
//! variable stored as `color/brand` with code syntax `var(--brand)`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::value::VariableValue;

/// Name to concrete value lookup of pre-existing variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    entries: HashMap<String, VariableValue>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers a concrete value. Aliases are ignored: callers flatten them
    /// before building the snapshot.
    pub fn insert(&mut self, name: impl Into<String>, value: VariableValue) {
        if !value.is_alias() {
            self.entries.insert(name.into(), value);
        }
    }

    /// Registers a value under `name` and, when `code_syntax` has the form
    /// `var(--x)`, under `x` as well.
    pub fn insert_with_code_syntax(&mut self, name: &str, code_syntax: Option<&str>, value: VariableValue) {
        if let Some(flat) = code_syntax.and_then(parse_code_syntax) {
            self.insert(flat, value.clone());
        }
        self.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&VariableValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Reads a snapshot from a JSON object of name to value.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let raw: HashMap<String, VariableValue> = serde_json::from_str(json)?;
        let mut snapshot = Snapshot::new();
        for (name, value) in raw {
            snapshot.insert(name, value);
        }
        Ok(snapshot)
    }
}

/// Extracts `x` from `var(--x)`.
pub fn parse_code_syntax(code_syntax: &str) -> Option<&str> {
    let name = code_syntax
        .trim()
        .strip_prefix("var(--")?
        .strip_suffix(')')?;
    crate::declaration::is_valid_name(name).then_some(name)
}
