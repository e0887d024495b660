//! Alias resolution.
//!
//! Every slot still holding `Alias(target)` after classification goes on a
//! worklist. Each round walks the worklist in declaration order and
//! materializes the slots whose target is available:
//!
//! - a target declared in this pass must itself be concrete; a pending
//!   in-pass target makes the slot wait for a later round and never falls
//!   through to the snapshot
//! - a target absent from the pass is looked up in the snapshot
//!
//! A mode slot copies the target's value for the same mode when the target
//! has one, and the target's base value otherwise. A target that only exists
//! in mode blocks has no base: only a same-mode value can satisfy the slot,
//! and anything else stays pending.
//!
//! The loop runs at most `N` rounds, `N` being the worklist length at the
//! start, and stops early after a round without progress. Whatever is left
//! (cycles, missing targets) is returned as [`UnresolvedAlias`] entries.

use log::{debug, warn};
use serde::Serialize;

use crate::snapshot::Snapshot;
use crate::value::VariableValue;
use crate::variable::{Slot, VariableTable};

/// An alias slot that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedAlias {
    /// Variable owning the slot.
    pub name: String,
    /// Name the slot refers to.
    pub target: String,
    /// Mode of the slot, `None` for the base value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl std::fmt::Display for UnresolvedAlias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.mode {
            Some(mode) => write!(f, "--{} [{}] -> --{}", self.name, mode, self.target),
            None => write!(f, "--{} -> --{}", self.name, self.target),
        }
    }
}

#[derive(Debug, Clone)]
struct PendingSlot {
    index: usize,
    mode: Option<String>,
    target: String,
}

/// Resolves every pending alias slot of `table` in place.
pub fn resolve_aliases(table: &mut VariableTable, snapshot: Option<&Snapshot>) -> Vec<UnresolvedAlias> {
    let mut pending = collect_pending(table);
    let bound = pending.len();
    let mut rounds = 0;

    while !pending.is_empty() && rounds < bound {
        rounds += 1;
        let before = pending.len();
        let mut remaining = Vec::with_capacity(before);

        for item in pending {
            match target_value(table, snapshot, &item) {
                Some(value) => materialize(table, &item, value),
                None => remaining.push(item),
            }
        }

        pending = remaining;
        if pending.len() == before {
            break;
        }
    }
    debug!(
        "alias resolution finished after {} round(s), {} unresolved",
        rounds,
        pending.len()
    );

    pending
        .into_iter()
        .map(|item| {
            let name = table
                .get_index(item.index)
                .map(|v| v.name.clone())
                .unwrap_or_default();
            let unresolved = UnresolvedAlias {
                name,
                target: item.target,
                mode: item.mode,
            };
            warn!("unresolved alias {}", unresolved);
            unresolved
        })
        .collect()
}

fn collect_pending(table: &VariableTable) -> Vec<PendingSlot> {
    let mut pending = Vec::new();
    for (index, variable) in table.iter().enumerate() {
        if let Some(target) = variable.value.value.alias_target() {
            pending.push(PendingSlot {
                index,
                mode: None,
                target: target.to_string(),
            });
        }
        for (mode, slot) in &variable.modes {
            if let Some(target) = slot.value.alias_target() {
                pending.push(PendingSlot {
                    index,
                    mode: Some(mode.clone()),
                    target: target.to_string(),
                });
            }
        }
    }
    pending
}

fn target_value(table: &VariableTable, snapshot: Option<&Snapshot>, item: &PendingSlot) -> Option<VariableValue> {
    match table.get(&item.target) {
        Some(target) => {
            let slot: Option<&Slot> = match &item.mode {
                Some(mode) if target.declared => Some(target.value_for_mode(mode)),
                Some(mode) => target.modes.get(mode),
                None if target.declared => Some(&target.value),
                None => None,
            };
            slot.and_then(Slot::concrete).cloned()
        }
        None => snapshot.and_then(|s| s.get(&item.target)).cloned(),
    }
}

fn materialize(table: &mut VariableTable, item: &PendingSlot, value: VariableValue) {
    let Some(variable) = table.get_index_mut(item.index) else {
        return;
    };
    let slot = match &item.mode {
        Some(mode) => variable.modes.get_mut(mode),
        None => Some(&mut variable.value),
    };
    if let Some(slot) = slot {
        slot.resolve_to(&item.target, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    fn red() -> VariableValue {
        VariableValue::Color(Rgba::new(1.0, 0.0, 0.0, 1.0))
    }

    fn blue() -> VariableValue {
        VariableValue::Color(Rgba::new(0.0, 0.0, 1.0, 1.0))
    }

    // =========================================================================
    // Base slots
    // =========================================================================

    #[test]
    fn test_chain_in_reverse_order() {
        let mut table = VariableTable::new();
        table.declare("a", VariableValue::alias("b"), None);
        table.declare("b", VariableValue::alias("c"), None);
        table.declare("c", red(), None);

        let unresolved = resolve_aliases(&mut table, None);
        assert!(unresolved.is_empty());

        let a = &table.get("a").unwrap().value;
        assert_eq!(a.value, red());
        assert_eq!(a.alias_of.as_deref(), Some("b"));
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut table = VariableTable::new();
        table.declare("a", VariableValue::alias("b"), None);
        table.declare("b", VariableValue::alias("a"), None);

        let unresolved = resolve_aliases(&mut table, None);
        let names: Vec<_> = unresolved.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(table.get("a").unwrap().value.is_pending());
    }

    #[test]
    fn test_self_reference_is_reported() {
        let mut table = VariableTable::new();
        table.declare("a", VariableValue::alias("a"), None);
        assert_eq!(resolve_aliases(&mut table, None).len(), 1);
    }

    #[test]
    fn test_missing_target_is_reported() {
        let mut table = VariableTable::new();
        table.declare("a", VariableValue::alias("nowhere"), None);

        let unresolved = resolve_aliases(&mut table, None);
        assert_eq!(
            unresolved,
            vec![UnresolvedAlias {
                name: "a".into(),
                target: "nowhere".into(),
                mode: None
            }]
        );
    }

    #[test]
    fn test_snapshot_target() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("brand", blue());

        let mut table = VariableTable::new();
        table.declare("accent", VariableValue::alias("brand"), None);

        assert!(resolve_aliases(&mut table, Some(&snapshot)).is_empty());
        assert_eq!(table.get("accent").unwrap().value.value, blue());
    }

    #[test]
    fn test_pending_in_pass_target_shadows_snapshot() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("b", blue());

        let mut table = VariableTable::new();
        table.declare("a", VariableValue::alias("b"), None);
        table.declare("b", VariableValue::alias("c"), None);
        table.declare("c", red(), None);

        assert!(resolve_aliases(&mut table, Some(&snapshot)).is_empty());
        assert_eq!(table.get("a").unwrap().value.value, red());
    }

    // =========================================================================
    // Mode slots
    // =========================================================================

    #[test]
    fn test_mode_slot_uses_target_mode_value() {
        let mut table = VariableTable::new();
        table.declare("ink", red(), None);
        table.set_mode("ink", "dark", blue());
        table.set_mode("text", "dark", VariableValue::alias("ink"));

        assert!(resolve_aliases(&mut table, None).is_empty());
        let slot = &table.get("text").unwrap().modes["dark"];
        assert_eq!(slot.value, blue());
        assert_eq!(slot.alias_of.as_deref(), Some("ink"));
    }

    #[test]
    fn test_mode_slot_falls_back_to_target_base() {
        let mut table = VariableTable::new();
        table.declare("ink", red(), None);
        table.set_mode("text", "dark", VariableValue::alias("ink"));

        assert!(resolve_aliases(&mut table, None).is_empty());
        assert_eq!(table.get("text").unwrap().modes["dark"].value, red());
    }

    #[test]
    fn test_mode_slot_uses_mode_only_target_in_same_mode() {
        let mut table = VariableTable::new();
        table.set_mode("ink", "dark", blue());
        table.declare("text", red(), None);
        table.set_mode("text", "dark", VariableValue::alias("ink"));

        assert!(resolve_aliases(&mut table, None).is_empty());
        assert_eq!(table.get("text").unwrap().modes["dark"].value, blue());
    }

    #[test]
    fn test_mode_only_target_without_that_mode_stays_unresolved() {
        let mut table = VariableTable::new();
        table.set_mode("ink", "dark", blue());
        table.set_mode("text", "light", VariableValue::alias("ink"));
        table.declare("text", red(), None);

        let unresolved = resolve_aliases(&mut table, None);
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].to_string(), "--text [light] -> --ink");
        assert!(table.get("text").unwrap().modes["light"].is_pending());
    }

    #[test]
    fn test_base_alias_to_mode_only_target_stays_unresolved() {
        let mut table = VariableTable::new();
        table.set_mode("ink", "dark", blue());
        table.declare("text", VariableValue::alias("ink"), None);

        let unresolved = resolve_aliases(&mut table, None);
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].mode, None);
        assert!(table.get("text").unwrap().value.is_pending());
    }

    #[test]
    fn test_unresolved_mode_slot_is_tagged() {
        let mut table = VariableTable::new();
        table.declare("text", red(), None);
        table.set_mode("text", "dark", VariableValue::alias("gone"));

        let unresolved = resolve_aliases(&mut table, None);
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].mode.as_deref(), Some("dark"));
        assert_eq!(unresolved[0].to_string(), "--text [dark] -> --gone");
    }

    #[test]
    fn test_long_chain_within_bound() {
        let mut table = VariableTable::new();
        for i in 0..20 {
            table.declare(&format!("v{}", i), VariableValue::alias(format!("v{}", i + 1)), None);
        }
        table.declare("v20", VariableValue::Number(3.0), None);

        assert!(resolve_aliases(&mut table, None).is_empty());
        assert_eq!(table.get("v0").unwrap().value.value, VariableValue::Number(3.0));
    }
}
