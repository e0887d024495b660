//! The in-pass variable table.
//!
//! Every declaration the classifier accepts lands in a [`VariableTable`]. The
//! table keeps first-declaration order, so output is stable regardless of
//! how many times a name is redeclared, and offers O(1) lookup by flat name.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::value::{VariableKind, VariableValue};

/// A value position of a variable: its base value or one of its modes.
///
/// A pending alias holds `VariableValue::Alias(target)`. Once resolved, `value`
/// is the concrete value copied from the target and `alias_of` still names
/// the direct target, so a store can link the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub value: VariableValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
}

impl Slot {
    pub fn new(value: VariableValue) -> Self {
        Self {
            value,
            alias_of: None,
        }
    }

    /// Returns true when the slot still waits for its alias target.
    pub fn is_pending(&self) -> bool {
        self.value.is_alias()
    }

    /// Returns the concrete value, or `None` while the slot is pending.
    pub fn concrete(&self) -> Option<&VariableValue> {
        if self.is_pending() {
            None
        } else {
            Some(&self.value)
        }
    }

    /// Materializes a pending alias with the target's concrete value.
    pub fn resolve_to(&mut self, target: &str, value: VariableValue) {
        self.value = value;
        self.alias_of = Some(target.to_string());
    }
}

impl From<VariableValue> for Slot {
    fn from(value: VariableValue) -> Self {
        Slot::new(value)
    }
}

/// A variable produced by one parse pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedVariable {
    /// Flat declaration name, without the leading `--`.
    pub name: String,
    /// Base value. For variables that only appear in mode blocks this is a
    /// zero-color fallback.
    pub value: Slot,
    /// Per-mode overrides. Empty means the variable has no modes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modes: BTreeMap<String, Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// False when the name never appears outside a mode block.
    pub declared: bool,
    /// Modes written by the top-level value itself (`light-dark()`), as
    /// opposed to mode blocks. They go away when the value is redeclared.
    #[serde(skip)]
    inline_modes: BTreeSet<String>,
}

impl ParsedVariable {
    pub fn new(name: impl Into<String>, value: VariableValue) -> Self {
        Self {
            name: name.into(),
            value: Slot::new(value),
            modes: BTreeMap::new(),
            description: None,
            declared: true,
            inline_modes: BTreeSet::new(),
        }
    }

    /// A variable first seen inside a mode block.
    pub fn mode_only(name: impl Into<String>) -> Self {
        Self {
            declared: false,
            ..Self::new(name, VariableValue::Color(Rgba::ZERO))
        }
    }

    pub fn kind(&self) -> VariableKind {
        self.value.value.kind()
    }

    pub fn has_modes(&self) -> bool {
        !self.modes.is_empty()
    }

    /// Returns the value for `mode`, falling back to the base value.
    pub fn value_for_mode(&self, mode: &str) -> &Slot {
        self.modes.get(mode).unwrap_or(&self.value)
    }
}

/// Ordered table of variables keyed by flat name.
#[derive(Debug, Default, Clone)]
pub struct VariableTable {
    variables: Vec<ParsedVariable>,
    index: HashMap<String, usize>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ParsedVariable> {
        self.index.get(name).map(|&i| &self.variables[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ParsedVariable> {
        match self.index.get(name) {
            Some(&i) => self.variables.get_mut(i),
            None => None,
        }
    }

    pub fn get_index(&self, index: usize) -> Option<&ParsedVariable> {
        self.variables.get(index)
    }

    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut ParsedVariable> {
        self.variables.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParsedVariable> {
        self.variables.iter()
    }

    /// Declares a top-level value for `name`.
    ///
    /// A redeclaration replaces the base value in place and keeps the variable's
    /// position. Modes set by mode blocks are kept; modes that came with the
    /// previous top-level value are dropped.
    pub fn declare(
        &mut self,
        name: &str,
        value: VariableValue,
        description: Option<String>,
    ) -> &mut ParsedVariable {
        let index = match self.index.get(name) {
            Some(&i) => {
                let existing = &mut self.variables[i];
                existing.value = Slot::new(value);
                for mode in std::mem::take(&mut existing.inline_modes) {
                    existing.modes.remove(&mode);
                }
                existing.declared = true;
                if description.is_some() {
                    existing.description = description;
                }
                i
            }
            None => self.push(ParsedVariable {
                description,
                ..ParsedVariable::new(name, value)
            }),
        };
        &mut self.variables[index]
    }

    /// Sets the value of `name` for one mode, creating a mode-only variable
    /// with a zero-color fallback base when the name is new.
    pub fn set_mode(&mut self, name: &str, mode: &str, value: VariableValue) -> &mut ParsedVariable {
        let index = match self.index.get(name) {
            Some(&i) => i,
            None => self.push(ParsedVariable::mode_only(name)),
        };
        let variable = &mut self.variables[index];
        variable.inline_modes.remove(mode);
        variable.modes.insert(mode.to_string(), Slot::new(value));
        variable
    }

    /// Declares a top-level value that carries its own per-mode values, as
    /// `light-dark()` does.
    pub fn declare_with_modes(
        &mut self,
        name: &str,
        value: VariableValue,
        modes: Vec<(&str, VariableValue)>,
        description: Option<String>,
    ) -> &mut ParsedVariable {
        let variable = self.declare(name, value, description);
        for (mode, value) in modes {
            variable.modes.insert(mode.to_string(), Slot::new(value));
            variable.inline_modes.insert(mode.to_string());
        }
        variable
    }

    pub fn into_variables(self) -> Vec<ParsedVariable> {
        self.variables
    }

    fn push(&mut self, variable: ParsedVariable) -> usize {
        let index = self.variables.len();
        self.index.insert(variable.name.clone(), index);
        self.variables.push(variable);
        index
    }
}
