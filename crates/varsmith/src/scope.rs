//! Usage scopes inferred from variable names.
//!
//! Design tools restrict where a variable may be applied with a list of scope
//! tags. Scopes are inferred from the flat name in three steps:
//!
//! 1. The name is normalized: runs of non-alphanumeric characters become `_`
//!    and everything is uppercased, so `font-size-lg` reads `FONT_SIZE_LG`.
//! 2. Every scope whose identifier appears in the normalized name is added.
//! 3. Every other scope whose keyword list has a hit is added. `RADIUS` is
//!    enough for `CORNER_RADIUS`, `LEADING` for `LINE_HEIGHT`.
//!
//! The result is filtered through the type compatibility table: a color never
//! gets a numeric scope and vice versa. String-only scopes (`TEXT_CONTENT`,
//! `FONT_FAMILY`, `FONT_STYLE`) never survive, since neither type may carry them.
//!
//! ```rust
//! use varsmith::{infer_scopes, VariableKind, VariableScope};
//!
//! let scopes = infer_scopes("card-radius", VariableKind::Number);
//! assert_eq!(scopes, vec![VariableScope::CornerRadius]);
//!
//! // Same keyword, wrong type.
//! assert!(infer_scopes("card-radius", VariableKind::Color).is_empty());
//! ```

use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::ImportConfig;
use crate::naming::group_of;
use crate::value::VariableKind;

/// A usage scope tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableScope {
    TextContent,
    CornerRadius,
    WidthHeight,
    Gap,
    AllFills,
    FrameFill,
    ShapeFill,
    TextFill,
    StrokeColor,
    StrokeFloat,
    EffectFloat,
    EffectColor,
    Opacity,
    FontFamily,
    FontStyle,
    FontWeight,
    FontSize,
    LineHeight,
    LetterSpacing,
    ParagraphSpacing,
    ParagraphIndent,
}

impl VariableScope {
    /// Every scope, in inference order.
    pub const ALL: [VariableScope; 21] = [
        VariableScope::TextContent,
        VariableScope::CornerRadius,
        VariableScope::WidthHeight,
        VariableScope::Gap,
        VariableScope::AllFills,
        VariableScope::FrameFill,
        VariableScope::ShapeFill,
        VariableScope::TextFill,
        VariableScope::StrokeColor,
        VariableScope::StrokeFloat,
        VariableScope::EffectFloat,
        VariableScope::EffectColor,
        VariableScope::Opacity,
        VariableScope::FontFamily,
        VariableScope::FontStyle,
        VariableScope::FontWeight,
        VariableScope::FontSize,
        VariableScope::LineHeight,
        VariableScope::LetterSpacing,
        VariableScope::ParagraphSpacing,
        VariableScope::ParagraphIndent,
    ];

    /// The scope identifier, as design tools spell it.
    pub fn as_str(self) -> &'static str {
        match self {
            VariableScope::TextContent => "TEXT_CONTENT",
            VariableScope::CornerRadius => "CORNER_RADIUS",
            VariableScope::WidthHeight => "WIDTH_HEIGHT",
            VariableScope::Gap => "GAP",
            VariableScope::AllFills => "ALL_FILLS",
            VariableScope::FrameFill => "FRAME_FILL",
            VariableScope::ShapeFill => "SHAPE_FILL",
            VariableScope::TextFill => "TEXT_FILL",
            VariableScope::StrokeColor => "STROKE_COLOR",
            VariableScope::StrokeFloat => "STROKE_FLOAT",
            VariableScope::EffectFloat => "EFFECT_FLOAT",
            VariableScope::EffectColor => "EFFECT_COLOR",
            VariableScope::Opacity => "OPACITY",
            VariableScope::FontFamily => "FONT_FAMILY",
            VariableScope::FontStyle => "FONT_STYLE",
            VariableScope::FontWeight => "FONT_WEIGHT",
            VariableScope::FontSize => "FONT_SIZE",
            VariableScope::LineHeight => "LINE_HEIGHT",
            VariableScope::LetterSpacing => "LETTER_SPACING",
            VariableScope::ParagraphSpacing => "PARAGRAPH_SPACING",
            VariableScope::ParagraphIndent => "PARAGRAPH_INDENT",
        }
    }

    /// Synonyms that select this scope, already normalized.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            VariableScope::TextContent => &["TEXT", "CONTENT", "STRING"],
            VariableScope::CornerRadius => &["RADIUS", "BORDER_RADIUS", "ROUNDNESS"],
            VariableScope::WidthHeight => &["WIDTH", "HEIGHT", "DIMENSION"],
            VariableScope::Gap => &["GAP", "SPACING", "SPACE"],
            VariableScope::AllFills => &["FILL", "BACKGROUND"],
            VariableScope::FrameFill => &["FRAME_FILL"],
            VariableScope::ShapeFill => &["SHAPE_FILL"],
            VariableScope::TextFill => &["TEXT_FILL", "FONT_COLOR"],
            VariableScope::StrokeColor => &["STROKE_COLOR", "BORDER_COLOR"],
            VariableScope::StrokeFloat => &["STROKE_WIDTH", "BORDER_WIDTH"],
            VariableScope::EffectFloat => &["BLUR", "SHADOW_SPREAD", "EFFECT_SIZE"],
            VariableScope::EffectColor => &["SHADOW_COLOR", "GLOW_COLOR"],
            VariableScope::Opacity => &["OPACITY", "ALPHA", "TRANSPARENCY"],
            VariableScope::FontFamily => &["FONT", "TYPEFACE", "FONT_FAMILY"],
            VariableScope::FontStyle => &["STYLE", "FONT_STYLE"],
            VariableScope::FontWeight => &["FONT_WEIGHT", "WEIGHT"],
            VariableScope::FontSize => &["FONT_SIZE", "TEXT_SIZE"],
            VariableScope::LineHeight => &["LINE_HEIGHT", "LEADING"],
            VariableScope::LetterSpacing => &["LETTER_SPACING", "TRACKING"],
            VariableScope::ParagraphSpacing => &["PARAGRAPH_SPACING", "PARAGRAPH_GAP"],
            VariableScope::ParagraphIndent => &["PARAGRAPH_INDENT", "INDENTATION"],
        }
    }

    /// Returns `true` if numeric variables may carry this scope.
    pub fn is_number_scope(self) -> bool {
        matches!(
            self,
            VariableScope::CornerRadius
                | VariableScope::WidthHeight
                | VariableScope::Gap
                | VariableScope::StrokeFloat
                | VariableScope::EffectFloat
                | VariableScope::Opacity
                | VariableScope::FontWeight
                | VariableScope::FontSize
                | VariableScope::LineHeight
                | VariableScope::LetterSpacing
                | VariableScope::ParagraphSpacing
                | VariableScope::ParagraphIndent
        )
    }

    /// Returns `true` if color variables may carry this scope.
    pub fn is_color_scope(self) -> bool {
        matches!(
            self,
            VariableScope::AllFills
                | VariableScope::FrameFill
                | VariableScope::ShapeFill
                | VariableScope::TextFill
                | VariableScope::StrokeColor
                | VariableScope::EffectColor
        )
    }

    /// Returns `true` if a variable of `kind` may carry this scope.
    pub fn applies_to(self, kind: VariableKind) -> bool {
        match kind {
            VariableKind::Number => self.is_number_scope(),
            VariableKind::Color => self.is_color_scope(),
            VariableKind::Alias => false,
        }
    }

    /// Parses a scope identifier such as `CORNER_RADIUS`.
    pub fn parse(s: &str) -> Option<VariableScope> {
        let wanted = normalize(s);
        VariableScope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == wanted)
    }
}

impl std::fmt::Display for VariableScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collapses non-alphanumeric runs into `_` and uppercases.
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_uppercase());
            in_separator = false;
        } else if !in_separator {
            out.push('_');
            in_separator = true;
        }
    }
    out
}

/// Infers the scopes of a variable from its flat name, filtered by `kind`.
pub fn infer_scopes(name: &str, kind: VariableKind) -> Vec<VariableScope> {
    let normalized = normalize(name);

    let mut scopes: Vec<VariableScope> = VariableScope::ALL
        .into_iter()
        .filter(|scope| normalized.contains(scope.as_str()))
        .collect();

    for scope in VariableScope::ALL {
        if scopes.contains(&scope) {
            continue;
        }
        if scope.keywords().iter().any(|kw| normalized.contains(kw)) {
            scopes.push(scope);
        }
    }

    scopes.retain(|scope| scope.applies_to(kind));
    scopes
}

/// Final scopes for a variable: per-name override, else per-group override,
/// else inference. Overrides go through the same type filter as inference.
pub fn scopes_for(name: &str, kind: VariableKind, config: &ImportConfig) -> Vec<VariableScope> {
    let group = group_of(name);
    let explicit = config
        .item_scopes
        .get(name)
        .filter(|scopes| !scopes.is_empty())
        .or_else(|| {
            config
                .group_scopes
                .get(&group)
                .filter(|scopes| !scopes.is_empty())
        });

    match explicit {
        Some(overrides) => {
            let mut accepted = Vec::with_capacity(overrides.len());
            for &scope in overrides {
                if !scope.applies_to(kind) {
                    warn!(
                        "scope {} does not apply to {} variable '{}', dropped",
                        scope, kind, name
                    );
                } else if !accepted.contains(&scope) {
                    accepted.push(scope);
                }
            }
            accepted
        }
        None => infer_scopes(name, kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Normalization and vocabulary
    // =========================================================================

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("font-size-lg"), "FONT_SIZE_LG");
        assert_eq!(normalize("a--b__c"), "A_B_C");
        assert_eq!(normalize("x.y z"), "X_Y_Z");
    }

    #[test]
    fn test_every_scope_is_typed_or_string_only() {
        for scope in VariableScope::ALL {
            assert!(
                !(scope.is_number_scope() && scope.is_color_scope()),
                "{} is both",
                scope
            );
        }
        let string_only: Vec<_> = VariableScope::ALL
            .into_iter()
            .filter(|s| !s.is_number_scope() && !s.is_color_scope())
            .collect();
        assert_eq!(
            string_only,
            vec![
                VariableScope::TextContent,
                VariableScope::FontFamily,
                VariableScope::FontStyle
            ]
        );
    }

    #[test]
    fn test_compatibility_table_sizes() {
        let numeric = VariableScope::ALL.iter().filter(|s| s.is_number_scope()).count();
        let color = VariableScope::ALL.iter().filter(|s| s.is_color_scope()).count();
        assert_eq!(numeric, 12);
        assert_eq!(color, 6);
        assert!(VariableScope::ALL.iter().all(|s| s.applies_to(VariableKind::Number) == s.is_number_scope()));
    }

    #[test]
    fn test_parse_scope() {
        assert_eq!(
            VariableScope::parse("corner-radius"),
            Some(VariableScope::CornerRadius)
        );
        assert_eq!(VariableScope::parse("GAP"), Some(VariableScope::Gap));
        assert_eq!(VariableScope::parse("nope"), None);
    }

    #[test]
    fn test_serde_identifier() {
        let json = serde_json::to_string(&VariableScope::StrokeFloat).unwrap();
        assert_eq!(json, "\"STROKE_FLOAT\"");
    }

    // =========================================================================
    // Inference
    // =========================================================================

    #[test]
    fn test_exact_identifier_match() {
        assert_eq!(
            infer_scopes("line-height-body", VariableKind::Number),
            vec![VariableScope::LineHeight, VariableScope::WidthHeight]
        );
    }

    #[test]
    fn test_keyword_match() {
        assert_eq!(
            infer_scopes("leading-tight", VariableKind::Number),
            vec![VariableScope::LineHeight]
        );
        assert_eq!(
            infer_scopes("space-4", VariableKind::Number),
            vec![VariableScope::Gap]
        );
    }

    #[test]
    fn test_color_keeps_only_color_scopes() {
        assert_eq!(
            infer_scopes("text-fill-primary", VariableKind::Color),
            vec![VariableScope::TextFill, VariableScope::AllFills]
        );
    }

    #[test]
    fn test_numeric_keyword_on_color_is_filtered() {
        assert!(infer_scopes("radius-accent", VariableKind::Color).is_empty());
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(infer_scopes("brand-primary", VariableKind::Color).is_empty());
    }

    // =========================================================================
    // Overrides
    // =========================================================================

    #[test]
    fn test_item_override_wins() {
        let mut config = ImportConfig::default();
        config
            .item_scopes
            .insert("brand-primary".into(), vec![VariableScope::TextFill]);
        config
            .group_scopes
            .insert("brand".into(), vec![VariableScope::AllFills]);

        assert_eq!(
            scopes_for("brand-primary", VariableKind::Color, &config),
            vec![VariableScope::TextFill]
        );
        assert_eq!(
            scopes_for("brand-secondary", VariableKind::Color, &config),
            vec![VariableScope::AllFills]
        );
    }

    #[test]
    fn test_empty_override_falls_through() {
        let mut config = ImportConfig::default();
        config.item_scopes.insert("gap-sm".into(), vec![]);
        assert_eq!(
            scopes_for("gap-sm", VariableKind::Number, &config),
            vec![VariableScope::Gap]
        );
    }

    #[test]
    fn test_override_is_type_filtered() {
        let mut config = ImportConfig::default();
        config.group_scopes.insert(
            "border".into(),
            vec![VariableScope::StrokeColor, VariableScope::StrokeFloat],
        );
        assert_eq!(
            scopes_for("border-width", VariableKind::Number, &config),
            vec![VariableScope::StrokeFloat]
        );
    }
}
