//! Variable values: concrete numbers and colors, or aliases to other variables.
//!
//! A [`VariableValue`] is what the classifier produces for a single slot. An
//! alias is a forward reference by flat name; the resolver replaces it with a
//! concrete value when the target can be found.
//!
//! ```rust
//! use varsmith::{VariableKind, VariableValue};
//!
//! let spacing: VariableValue = 16.0.into();
//! assert_eq!(spacing.kind(), VariableKind::Number);
//!
//! let alias = VariableValue::alias("brand-primary");
//! assert!(alias.is_alias());
//! assert_eq!(alias.kind(), VariableKind::Alias);
//! ```

use serde::{Deserialize, Serialize};

use crate::color::Rgba;

/// The type of a variable value.
///
/// `Alias` is transient: after resolution every finalized variable is either
/// `Number` or `Color`. Numbers are reported as `FLOAT`, the name design
/// tools use for numeric variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VariableKind {
    #[serde(rename = "FLOAT")]
    Number,
    Color,
    Alias,
}

impl VariableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableKind::Number => "FLOAT",
            VariableKind::Color => "COLOR",
            VariableKind::Alias => "ALIAS",
        }
    }

    /// Returns true for kinds that carry a concrete value.
    pub fn is_concrete(&self) -> bool {
        !matches!(self, VariableKind::Alias)
    }
}

impl std::fmt::Display for VariableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A slot value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "UPPERCASE")]
pub enum VariableValue {
    #[serde(rename = "FLOAT")]
    Number(f64),
    Color(Rgba),
    /// Reference to another variable by flat name, without the leading `--`.
    Alias(String),
}

impl VariableValue {
    pub fn alias(target: impl Into<String>) -> Self {
        VariableValue::Alias(target.into())
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, VariableValue::Alias(_))
    }

    /// Returns the alias target, if this is an alias.
    pub fn alias_target(&self) -> Option<&str> {
        match self {
            VariableValue::Alias(target) => Some(target),
            _ => None,
        }
    }

    pub fn kind(&self) -> VariableKind {
        match self {
            VariableValue::Number(_) => VariableKind::Number,
            VariableValue::Color(_) => VariableKind::Color,
            VariableValue::Alias(_) => VariableKind::Alias,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            VariableValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            VariableValue::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl From<f64> for VariableValue {
    fn from(n: f64) -> Self {
        VariableValue::Number(n)
    }
}

impl From<Rgba> for VariableValue {
    fn from(color: Rgba) -> Self {
        VariableValue::Color(color)
    }
}

impl std::fmt::Display for VariableValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableValue::Number(n) => write!(f, "{}", n),
            VariableValue::Color(c) => f.write_str(&c.to_hex()),
            VariableValue::Alias(target) => write!(f, "var(--{})", target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_each_variant() {
        assert_eq!(VariableValue::Number(1.5).kind(), VariableKind::Number);
        assert_eq!(VariableValue::Color(Rgba::ZERO).kind(), VariableKind::Color);
        assert_eq!(VariableValue::alias("x").kind(), VariableKind::Alias);
        assert!(!VariableKind::Alias.is_concrete());
    }

    #[test]
    fn test_alias_target() {
        assert_eq!(VariableValue::alias("brand").alias_target(), Some("brand"));
        assert_eq!(VariableValue::Number(1.0).alias_target(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(VariableValue::Number(16.0).to_string(), "16");
        assert_eq!(VariableValue::alias("a-b").to_string(), "var(--a-b)");
        assert_eq!(
            VariableValue::Color(Rgba::new(1.0, 0.0, 0.0, 1.0)).to_string(),
            "#ff0000"
        );
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(VariableValue::Number(4.0)).unwrap();
        assert_eq!(json["type"], "FLOAT");
        assert_eq!(json["value"], 4.0);

        let back: VariableValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, VariableValue::Number(4.0));
    }

    #[test]
    fn test_value_tag_matches_kind() {
        for value in [
            VariableValue::Number(1.0),
            VariableValue::Color(Rgba::ZERO),
        ] {
            let tag = serde_json::to_value(&value).unwrap()["type"].clone();
            let kind = serde_json::to_value(value.kind()).unwrap();
            assert_eq!(tag, kind);
        }
    }

    #[test]
    fn test_kind_serializes_uppercase() {
        let json = serde_json::to_string(&VariableKind::Color).unwrap();
        assert_eq!(json, "\"COLOR\"");
        let json = serde_json::to_string(&VariableKind::Number).unwrap();
        assert_eq!(json, "\"FLOAT\"");
    }
}
