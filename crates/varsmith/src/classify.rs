//! Value classification.
//!
//! The [`Classifier`] turns the raw value text of one declaration into a typed
//! [`VariableValue`]. Grammars are tried in a fixed order and the first match
//! wins:
//!
//! | # | Grammar | Example | Result |
//! |---|---------|---------|--------|
//! | 1 | alias | `var(--brand)` | `Alias("brand")` |
//! | 2 | number | `-1.5` | `Number(-1.5)` |
//! | 3 | unit literal | `0.5rem`, `50%`, `12px` | `Number(8)`, `Number(0.5)`, `Number(12)` |
//! | 4 | dual mode | `light-dark(#fff, #000)` | light and dark values |
//! | 5 | relative color | `oklch(from var(--brand) l c h)` | `Color` |
//! | 6 | hue indirection | `oklch(0.7 0.1 var(--hue))` | `Color` |
//! | 7 | color literal | `#3366ff`, `rgb(...)`, `oklch(...)` | `Color` |
//!
//! Anything else is rejected with `None`; the caller records it as skipped.
//!
//! Grammars 4 to 6 read other variables through a [`Lookup`]. During a parse
//! pass that is a [`LookupContext`] over the variables classified so far,
//! backed by the existing-variable [`Snapshot`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::color::{gamut_clamp, parse_color, ConversionTable, Rgba};
use crate::relative::OklchExpression;
use crate::snapshot::Snapshot;
use crate::value::VariableValue;
use crate::variable::VariableTable;

static ALIAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^var\(--([A-Za-z0-9_-]+)\)$").expect("valid alias regex"));

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?(?:\d*\.)?\d+$").expect("valid number regex"));

static UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([-+]?(?:\d*\.)?\d+)([A-Za-z%]+)$").expect("valid unit regex")
});

/// Pixels per `rem`.
pub const REM_PX: f64 = 16.0;

/// Read access to variable values by flat name.
pub trait Lookup {
    /// Concrete value of `name`, following aliases where the lookup can.
    fn value(&self, name: &str) -> Option<&VariableValue>;

    fn color(&self, name: &str) -> Option<Rgba> {
        self.value(name).and_then(VariableValue::as_color)
    }

    fn number(&self, name: &str) -> Option<f64> {
        self.value(name).and_then(VariableValue::as_number)
    }
}

impl Lookup for Snapshot {
    fn value(&self, name: &str) -> Option<&VariableValue> {
        self.get(name)
    }
}

/// Lookup over the variables of the current pass, then the snapshot.
///
/// In-pass variables shadow the snapshot. Alias chains inside the pass are
/// followed, at most one hop per variable, so cycles end in `None`.
/// Variables that only exist in mode blocks are not visible: their base is a
/// placeholder.
#[derive(Debug, Clone, Copy)]
pub struct LookupContext<'a> {
    table: &'a VariableTable,
    snapshot: Option<&'a Snapshot>,
}

impl<'a> LookupContext<'a> {
    pub fn new(table: &'a VariableTable, snapshot: Option<&'a Snapshot>) -> Self {
        Self { table, snapshot }
    }
}

impl Lookup for LookupContext<'_> {
    fn value(&self, name: &str) -> Option<&VariableValue> {
        let mut current = name;
        for _ in 0..=self.table.len() {
            match self.table.get(current).filter(|v| v.declared) {
                Some(variable) => match &variable.value.value {
                    VariableValue::Alias(target) => current = target,
                    concrete => return Some(concrete),
                },
                None => return self.snapshot.and_then(|s| s.get(current)),
            }
        }
        None
    }
}

/// Outcome of classifying one value.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Single(VariableValue),
    /// `light-dark(...)`: the light value doubles as the base value.
    Dual {
        light: VariableValue,
        dark: VariableValue,
    },
}

impl Classified {
    /// The value stored in the base slot.
    pub fn base(&self) -> &VariableValue {
        match self {
            Classified::Single(value) => value,
            Classified::Dual { light, .. } => light,
        }
    }
}

/// Classifies raw value text. Holds only the conversion table.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    conversions: &'a ConversionTable,
}

impl Default for Classifier<'static> {
    fn default() -> Self {
        Classifier::new(ConversionTable::standard())
    }
}

impl<'a> Classifier<'a> {
    pub fn new(conversions: &'a ConversionTable) -> Self {
        Self { conversions }
    }

    /// Classifies a top-level value.
    pub fn classify(&self, raw: &str, lookup: &dyn Lookup) -> Option<Classified> {
        let raw = raw.trim();

        if let Some(alias) = parse_alias(raw) {
            return Some(Classified::Single(alias));
        }
        if let Some(number) = parse_number(raw) {
            return Some(Classified::Single(VariableValue::Number(number)));
        }
        if let Some(number) = parse_unit(raw) {
            return Some(Classified::Single(VariableValue::Number(number)));
        }
        if let Some(args) = light_dark_arguments(raw) {
            let [light, dark] = args;
            let light = self.classify_color(light, lookup)?;
            let dark = self.classify_color(dark, lookup)?;
            return Some(Classified::Dual { light, dark });
        }
        self.classify_color(raw, lookup).map(Classified::Single)
    }

    /// Classifies a value declared inside a mode block: only aliases and color
    /// literals are accepted.
    pub fn classify_mode_value(&self, raw: &str) -> Option<VariableValue> {
        let raw = raw.trim();
        parse_alias(raw).or_else(|| parse_color(raw).map(|c| VariableValue::Color(gamut_clamp(c))))
    }

    /// Alias, relative color, hue indirection, then color literal.
    fn classify_color(&self, raw: &str, lookup: &dyn Lookup) -> Option<VariableValue> {
        let raw = raw.trim();
        if let Some(alias) = parse_alias(raw) {
            return Some(alias);
        }
        if let Some(expr) = OklchExpression::parse(raw) {
            return expr
                .evaluate(lookup, self.conversions)
                .map(VariableValue::Color);
        }
        parse_color(raw).map(|c| VariableValue::Color(gamut_clamp(c)))
    }
}

/// `var(--name)` exactly.
pub fn parse_alias(raw: &str) -> Option<VariableValue> {
    ALIAS
        .captures(raw)
        .map(|caps| VariableValue::alias(&caps[1]))
}

/// Optionally signed integer or decimal.
pub fn parse_number(raw: &str) -> Option<f64> {
    if !NUMBER.is_match(raw) {
        return None;
    }
    raw.parse::<f64>().ok()
}

/// Number followed by a unit. `rem` is scaled to pixels and `%` to a
/// fraction; other units pass the number through.
pub fn parse_unit(raw: &str) -> Option<f64> {
    let caps = UNIT.captures(raw)?;
    let number: f64 = caps[1].parse().ok()?;
    let unit = caps[2].to_ascii_lowercase();
    Some(match unit.as_str() {
        "rem" => number * REM_PX,
        "%" => number / 100.0,
        _ => number,
    })
}

/// Splits `light-dark(a, b)` into its two arguments, respecting nested
/// parentheses.
pub fn light_dark_arguments(raw: &str) -> Option<[&str; 2]> {
    let head = raw.get(..11)?;
    if !head.eq_ignore_ascii_case("light-dark(") || !raw.ends_with(')') {
        return None;
    }
    let inner = &raw[11..raw.len() - 1];

    let mut depth = 0usize;
    let mut split = None;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                if split.is_some() {
                    return None;
                }
                split = Some(i);
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }

    let at = split?;
    let light = inner[..at].trim();
    let dark = inner[at + 1..].trim();
    if light.is_empty() || dark.is_empty() {
        return None;
    }
    Some([light, dark])
}
