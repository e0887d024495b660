//! Command-line front end for varsmith.
//!
//! Two commands:
//!
//! - `varsmith preview <css>` lists what an import would produce, without
//!   touching any store.
//! - `varsmith import <css> --store <file>` imports into a JSON store file,
//!   creating it when missing.
//!
//! [`execute`] runs a parsed [`Cli`] against any writer so the commands can
//! be driven from tests.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::debug;
use varsmith::{finalize, parse_stylesheet, run_import, ImportConfig, MemoryStore, Snapshot};

mod render;

pub use render::Palette;

/// Turns stylesheet custom properties into typed design variables.
#[derive(Debug, Parser)]
#[command(name = "varsmith")]
#[command(version)]
#[command(about = "Turns stylesheet custom properties into typed design variables")]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the variables a stylesheet would produce
    Preview {
        /// Stylesheet to read
        css: PathBuf,

        /// Import configuration (YAML, or JSON by extension)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Existing variables to resolve aliases against (JSON)
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Import a stylesheet into a store file
    Import {
        /// Stylesheet to read
        css: PathBuf,

        /// Store file (JSON), created when missing
        #[arg(long)]
        store: PathBuf,

        /// Import configuration (YAML, or JSON by extension)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Target collection, overrides the configuration
        #[arg(long)]
        collection: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

/// Runs `cli`, writing command output to `out`.
pub fn execute(cli: &Cli, out: &mut dyn Write, use_color: bool) -> Result<()> {
    let palette = Palette::new(use_color && !cli.no_color);
    match &cli.command {
        Command::Preview {
            css,
            config,
            snapshot,
            format,
        } => preview(css, config.as_deref(), snapshot.as_deref(), *format, &palette, out),
        Command::Import {
            css,
            store,
            config,
            collection,
        } => import(css, store, config.as_deref(), collection.as_deref(), &palette, out),
    }
}

fn preview(
    css: &Path,
    config: Option<&Path>,
    snapshot: Option<&Path>,
    format: Format,
    palette: &Palette,
    out: &mut dyn Write,
) -> Result<()> {
    let stylesheet = read_stylesheet(css)?;
    let config = load_config(config)?;
    let snapshot = snapshot.map(load_snapshot).transpose()?;

    let report = parse_stylesheet(&stylesheet, snapshot.as_ref());
    let entries = finalize(&report, &config);
    debug!("previewing {} entries from {}", entries.len(), css.display());

    match format {
        Format::Json => {
            let json = render::preview_json(&entries, &report.unresolved, &report.skipped)?;
            writeln!(out, "{}", json)?;
        }
        Format::Text => {
            let text = render::preview_text(&entries, &report.unresolved, &report.skipped, palette);
            write!(out, "{}", text)?;
        }
    }
    Ok(())
}

fn import(
    css: &Path,
    store_path: &Path,
    config: Option<&Path>,
    collection: Option<&str>,
    palette: &Palette,
    out: &mut dyn Write,
) -> Result<()> {
    let stylesheet = read_stylesheet(css)?;
    let mut config = load_config(config)?;
    if let Some(collection) = collection {
        config.collection = collection.to_string();
    }

    let mut store = MemoryStore::load(store_path)
        .with_context(|| format!("failed to load store {}", store_path.display()))?;
    let outcome = run_import(&stylesheet, &config, &mut store)
        .with_context(|| format!("failed to import {}", css.display()))?;
    store
        .save(store_path)
        .with_context(|| format!("failed to save store {}", store_path.display()))?;

    write!(out, "{}", render::import_text(&outcome, palette))?;
    Ok(())
}

fn read_stylesheet(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read stylesheet {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<ImportConfig> {
    match path {
        Some(path) => ImportConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ImportConfig::default()),
    }
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    Snapshot::from_json(&json).with_context(|| format!("invalid snapshot {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_preview_defaults() {
        let cli = Cli::try_parse_from(["varsmith", "preview", "tokens.css"]).unwrap();
        match cli.command {
            Command::Preview { format, config, .. } => {
                assert_eq!(format, Format::Text);
                assert!(config.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_import_requires_store() {
        assert!(Cli::try_parse_from(["varsmith", "import", "tokens.css"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "varsmith",
            "import",
            "tokens.css",
            "--store",
            "store.json",
            "-v",
            "--no-color",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);
    }
}
