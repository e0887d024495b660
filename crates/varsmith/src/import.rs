//! The import pipeline.
//!
//! ```text
//! stylesheet text
//!     │  Declarations (scanner)
//!     ▼
//! Declaration ──► block_kind ──► Classifier ──► VariableTable
//!                                                   │  resolve_aliases
//!                                                   ▼
//!                                               ParseReport
//!                                                   │  finalize (scopes, names, types)
//!                                                   ▼
//!                                           Vec<FinalizedEntry> ──► VariableStore
//! ```
//!
//! Nothing in the pipeline fails as a whole. Declarations no grammar accepts
//! end up in [`ParseReport::skipped`], aliases that never resolve in
//! [`ParseReport::unresolved`], and neither reaches the finalized list.
//!
//! ```rust
//! use varsmith::{finalize, parse_stylesheet, ImportConfig, VariableKind};
//!
//! let css = r#"
//!     :root {
//!         --brand-color: #3366ff;
//!         --gap-small: 0.5rem;
//!         --accent: var(--brand-color);
//!     }
//! "#;
//! let report = parse_stylesheet(css, None);
//! let entries = finalize(&report, &ImportConfig::default());
//!
//! assert_eq!(entries.len(), 3);
//! assert_eq!(entries[0].hierarchical_name, "brand/color");
//! assert_eq!(entries[1].value.value.as_number(), Some(8.0));
//! assert_eq!(entries[2].kind, VariableKind::Color);
//! assert_eq!(entries[2].value.alias_of.as_deref(), Some("brand-color"));
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::classify::{Classified, Classifier, LookupContext};
use crate::color::Rgba;
use crate::config::ImportConfig;
use crate::declaration::Declarations;
use crate::modes::{block_kind, BlockKind, DARK, LIGHT};
use crate::naming::to_hierarchical_name;
use crate::resolve::{resolve_aliases, UnresolvedAlias};
use crate::scope::{scopes_for, VariableScope};
use crate::snapshot::Snapshot;
use crate::store::{ImportSummary, VariableStore};
use crate::value::{VariableKind, VariableValue};
use crate::variable::{ParsedVariable, Slot, VariableTable};

/// A declaration no grammar accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDeclaration {
    pub name: String,
    pub value: String,
}

/// Result of one parse pass.
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    /// Variables in first-declaration order. Unresolved slots stay aliases.
    pub variables: Vec<ParsedVariable>,
    pub unresolved: Vec<UnresolvedAlias>,
    pub skipped: Vec<SkippedDeclaration>,
}

/// A fully resolved variable, ready for a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedEntry {
    /// Flat declaration name.
    pub name: String,
    /// Name with group path, e.g. `brand/color`.
    pub hierarchical_name: String,
    pub kind: VariableKind,
    pub value: Slot,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modes: BTreeMap<String, Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub scopes: Vec<VariableScope>,
}

impl FinalizedEntry {
    /// `var(--name)`, the code syntax a store records for the entry.
    pub fn code_syntax(&self) -> String {
        format!("var(--{})", self.name)
    }
}

/// What [`run_import`] did.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub summary: ImportSummary,
    pub entries: Vec<FinalizedEntry>,
    pub unresolved: Vec<UnresolvedAlias>,
    pub skipped: Vec<SkippedDeclaration>,
}

/// Scans, classifies and resolves every custom property of `css`.
///
/// `snapshot` provides values of variables that already exist in the
/// target store; in-pass declarations shadow it.
pub fn parse_stylesheet(css: &str, snapshot: Option<&Snapshot>) -> ParseReport {
    let classifier = Classifier::default();
    let mut table = VariableTable::new();
    let mut skipped = Vec::new();

    for declaration in Declarations::new(css) {
        let description = declaration.description().map(String::from);
        match block_kind(&declaration) {
            BlockKind::Malformed => {
                debug!(
                    "ignoring --{} in malformed mode block '{}'",
                    declaration.name,
                    declaration.selector.as_deref().unwrap_or_default()
                );
            }
            BlockKind::TopLevel => {
                let classified = {
                    let lookup = LookupContext::new(&table, snapshot);
                    classifier.classify(&declaration.value, &lookup)
                };
                match classified {
                    Some(Classified::Single(value)) => {
                        table.declare(&declaration.name, value, description);
                    }
                    Some(Classified::Dual { light, dark }) => {
                        table.declare_with_modes(
                            &declaration.name,
                            light.clone(),
                            vec![(LIGHT, light), (DARK, dark)],
                            description,
                        );
                    }
                    None => skip(&mut skipped, declaration.name, declaration.value),
                }
            }
            BlockKind::Mode(mode) => match classifier.classify_mode_value(&declaration.value) {
                Some(value) => {
                    let variable = table.set_mode(&declaration.name, &mode, value);
                    if variable.description.is_none() {
                        variable.description = description;
                    }
                }
                None => skip(&mut skipped, declaration.name, declaration.value),
            },
        }
    }

    let unresolved = resolve_aliases(&mut table, snapshot);
    debug!(
        "parsed {} variable(s), {} skipped, {} unresolved",
        table.len(),
        skipped.len(),
        unresolved.len()
    );

    ParseReport {
        variables: table.into_variables(),
        unresolved,
        skipped,
    }
}

fn skip(skipped: &mut Vec<SkippedDeclaration>, name: String, value: String) {
    debug!("skipping --{}: unsupported value '{}'", name, value);
    skipped.push(SkippedDeclaration { name, value });
}

/// Turns resolved variables into store entries.
///
/// Variables whose base value never resolved are left out, as are mode
/// slots that never resolved or whose type differs from the variable's.
/// A variable declared only in mode blocks takes its type from its first
/// mode value and keeps a zero fallback base of that type.
pub fn finalize(report: &ParseReport, config: &ImportConfig) -> Vec<FinalizedEntry> {
    report
        .variables
        .iter()
        .filter_map(|variable| finalize_variable(variable, config))
        .collect()
}

fn finalize_variable(variable: &ParsedVariable, config: &ImportConfig) -> Option<FinalizedEntry> {
    if variable.value.is_pending() {
        return None;
    }

    let kind = if variable.declared {
        variable.kind()
    } else {
        variable
            .modes
            .values()
            .find_map(|slot| slot.concrete().map(VariableValue::kind))?
    };

    let value = if variable.declared {
        variable.value.clone()
    } else {
        Slot::new(fallback_value(kind))
    };

    let mut modes = BTreeMap::new();
    for (mode, slot) in &variable.modes {
        match slot.concrete() {
            Some(concrete) if concrete.kind() == kind => {
                modes.insert(mode.clone(), slot.clone());
            }
            Some(concrete) => warn!(
                "dropping {} value of --{} in mode '{}': variable is {}",
                concrete.kind(),
                variable.name,
                mode,
                kind
            ),
            None => {}
        }
    }
    if !variable.declared && modes.is_empty() {
        return None;
    }

    Some(FinalizedEntry {
        name: variable.name.clone(),
        hierarchical_name: to_hierarchical_name(&variable.name),
        kind,
        value,
        modes,
        description: variable.description.clone(),
        scopes: scopes_for(&variable.name, kind, config),
    })
}

fn fallback_value(kind: VariableKind) -> VariableValue {
    match kind {
        VariableKind::Number => VariableValue::Number(0.0),
        _ => VariableValue::Color(Rgba::ZERO),
    }
}

/// Runs a full import of `css` against `store`.
///
/// The store's existing variables feed alias resolution, then the finalized
/// entries are applied to the configured collection.
pub fn run_import(
    css: &str,
    config: &ImportConfig,
    store: &mut dyn VariableStore,
) -> crate::Result<ImportOutcome> {
    let snapshot = store.existing_variables()?;
    let report = parse_stylesheet(css, Some(&snapshot));
    let entries = finalize(&report, config);
    let summary = store.apply(&config.collection, &entries)?;
    info!("{}", summary);

    Ok(ImportOutcome {
        summary,
        entries,
        unresolved: report.unresolved,
        skipped: report.skipped,
    })
}

/// Renders entries back as a stylesheet: base values under `:root`, mode
/// values under `[data-mode="<mode>"]` blocks. Colors are written as hex.
pub fn render_stylesheet(entries: &[FinalizedEntry]) -> String {
    let mut out = String::from(":root {\n");
    let mut by_mode: BTreeMap<&str, Vec<(&str, &VariableValue)>> = BTreeMap::new();

    for entry in entries {
        let _ = writeln!(out, "  --{}: {};", entry.name, entry.value.value);
        for (mode, slot) in &entry.modes {
            by_mode
                .entry(mode.as_str())
                .or_default()
                .push((entry.name.as_str(), &slot.value));
        }
    }
    out.push_str("}\n");

    for (mode, values) in by_mode {
        let _ = writeln!(out, "\n[data-mode=\"{}\"] {{", mode);
        for (name, value) in values {
            let _ = writeln!(out, "  --{}: {};", name, value);
        }
        out.push_str("}\n");
    }
    out
}
