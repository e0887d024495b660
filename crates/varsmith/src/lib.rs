//! Typed design variables from stylesheet custom properties.
//!
//! `varsmith` reads the `--name: value;` declarations of a stylesheet and
//! turns them into typed variables a design tool can store: numbers, colors,
//! and aliases to other variables. Aliases are resolved, light and dark
//! values are kept as modes, and every variable gets a hierarchical name and
//! a set of usage scopes inferred from its name.
//!
//! # Quick Start
//!
//! ```rust
//! use varsmith::{run_import, ImportConfig, MemoryStore, VariableStore};
//!
//! let css = r#"
//!     :root {
//!         --brand-primary: oklch(0.6 0.15 250);
//!         --radius-md: 6px;
//!         --surface: light-dark(#ffffff, #101010);
//!     }
//! "#;
//!
//! let mut store = MemoryStore::new();
//! let outcome = run_import(css, &ImportConfig::default(), &mut store).unwrap();
//!
//! assert_eq!(outcome.summary.added, 3);
//! assert_eq!(outcome.summary.to_string(), "Added 3 variables to CSS Variables");
//! assert!(store.existing_variables().unwrap().contains("radius/md"));
//! ```
//!
//! # What a value can be
//!
//! | Declaration                          | Variable                        |
//! |--------------------------------------|---------------------------------|
//! | `var(--other)`                       | alias, resolved to its target   |
//! | `12`, `-0.5`, `8px`, `1.5rem`, `50%` | number (rem × 16, % ÷ 100)      |
//! | `#fff`, `rgb(...)`, `hsl(...)`, ...  | color                           |
//! | `oklch(...)`, `oklab(...)`           | color, gamut clamped            |
//! | `oklch(from var(--x) l c h)`         | color derived from another one  |
//! | `light-dark(a, b)`                   | color with light and dark modes |
//!
//! Anything else (font stacks, shadows, `calc()`) is skipped and reported.
//!
//! # Modes
//!
//! Values declared inside `[data-theme="dark"]`-like attribute selectors, or
//! inside `@media (prefers-color-scheme: dark)`, become mode values of the
//! variable of the same name. See [`modes`].
//!
//! # Architecture
//!
//! ```text
//! parse_stylesheet ──► ParseReport ──► finalize ──► FinalizedEntry ──► VariableStore
//!   (scan, classify,                    (types, names,
//!    resolve aliases)                    scopes)
//! ```
//!
//! The host side is the [`VariableStore`] trait. [`MemoryStore`] implements
//! it in memory with JSON persistence.

mod classify;
pub mod color;
mod config;
mod declaration;
mod error;
mod import;
pub mod modes;
mod naming;
pub mod relative;
mod resolve;
mod scope;
mod snapshot;
mod store;
mod value;
mod variable;

// Scanning and classification
pub use classify::{
    light_dark_arguments, parse_alias, parse_number, parse_unit, Classified, Classifier, Lookup,
    LookupContext, REM_PX,
};
pub use declaration::{is_valid_name, Declaration, Declarations};

// Values and variables
pub use color::Rgba;
pub use value::{VariableKind, VariableValue};
pub use variable::{ParsedVariable, Slot, VariableTable};

// Resolution and the import pipeline
pub use import::{
    finalize, parse_stylesheet, render_stylesheet, run_import, FinalizedEntry, ImportOutcome,
    ParseReport, SkippedDeclaration,
};
pub use resolve::{resolve_aliases, UnresolvedAlias};

// Naming, scopes and configuration
pub use config::{ImportConfig, DEFAULT_COLLECTION};
pub use naming::{group_of, leaf_of, to_flat_name, to_hierarchical_name, PATH_SEPARATOR};
pub use scope::{infer_scopes, normalize, scopes_for, VariableScope};

// Host side
pub use snapshot::{parse_code_syntax, Snapshot};
pub use store::{ImportSummary, MemoryStore, StoredCollection, StoredVariable, VariableStore};

pub use error::{ConfigError, Result, StoreError, VarsmithError};
