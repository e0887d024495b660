//! Text and JSON output of the commands.

use std::fmt::Write as _;

use console::Style;
use serde::Serialize;
use varsmith::{FinalizedEntry, ImportOutcome, SkippedDeclaration, UnresolvedAlias};

/// Styles for terminal output. Every style is plain when color is off.
#[derive(Debug, Clone)]
pub struct Palette {
    pub name: Style,
    pub kind: Style,
    pub value: Style,
    pub muted: Style,
    pub header: Style,
    pub warning: Style,
}

impl Palette {
    pub fn new(use_color: bool) -> Self {
        let style = |style: Style| style.force_styling(use_color);
        Self {
            name: style(Style::new().cyan()),
            kind: style(Style::new().yellow()),
            value: style(Style::new().green()),
            muted: style(Style::new().dim()),
            header: style(Style::new().bold()),
            warning: style(Style::new().red()),
        }
    }
}

#[derive(Serialize)]
struct PreviewDocument<'a> {
    entries: &'a [FinalizedEntry],
    unresolved: &'a [UnresolvedAlias],
    skipped: &'a [SkippedDeclaration],
}

pub fn preview_json(
    entries: &[FinalizedEntry],
    unresolved: &[UnresolvedAlias],
    skipped: &[SkippedDeclaration],
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&PreviewDocument {
        entries,
        unresolved,
        skipped,
    })
}

/// One line per entry (name, type, value, alias target, scopes), an
/// indented line per mode value, then skipped and unresolved declarations.
pub fn preview_text(
    entries: &[FinalizedEntry],
    unresolved: &[UnresolvedAlias],
    skipped: &[SkippedDeclaration],
    palette: &Palette,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        palette
            .header
            .apply_to(format!("{} variable(s)", entries.len()))
    );

    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    for entry in entries {
        let mut line = format!(
            "  {}  {}  {}",
            palette.name.apply_to(format!("{:<width$}", entry.name, width = width)),
            palette.kind.apply_to(format!("{:<5}", entry.kind.as_str())),
            palette.value.apply_to(entry.value.value.to_string()),
        );
        if let Some(target) = &entry.value.alias_of {
            let _ = write!(line, " {}", palette.muted.apply_to(format!("-> {}", target)));
        }
        if !entry.scopes.is_empty() {
            let scopes: Vec<_> = entry.scopes.iter().map(|s| s.as_str()).collect();
            let _ = write!(line, "  [{}]", scopes.join(", "));
        }
        let _ = writeln!(out, "{}", line);

        for (mode, slot) in &entry.modes {
            let _ = writeln!(
                out,
                "  {}  {}",
                palette
                    .muted
                    .apply_to(format!("{:>width$}", mode, width = width)),
                palette.value.apply_to(slot.value.to_string()),
            );
        }
    }

    if !skipped.is_empty() {
        let _ = writeln!(
            out,
            "\n{}",
            palette
                .header
                .apply_to(format!("Skipped {} declaration(s):", skipped.len()))
        );
        for item in skipped {
            let _ = writeln!(out, "  --{}: {}", item.name, palette.muted.apply_to(&item.value));
        }
    }
    write_unresolved(&mut out, unresolved, palette);
    out
}

/// The store summary line followed by any unresolved aliases.
pub fn import_text(outcome: &ImportOutcome, palette: &Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.header.apply_to(&outcome.summary));
    write_unresolved(&mut out, &outcome.unresolved, palette);
    out
}

fn write_unresolved(out: &mut String, unresolved: &[UnresolvedAlias], palette: &Palette) {
    if unresolved.is_empty() {
        return;
    }
    let _ = writeln!(
        out,
        "\n{}",
        palette
            .warning
            .apply_to(format!("Unresolved {} alias(es):", unresolved.len()))
    );
    for alias in unresolved {
        let _ = writeln!(out, "  {}", alias);
    }
}
