//! OKLCH expressions that read other variables.
//!
//! Two grammars share one parser:
//!
//! - **Relative colors**: `oklch(from var(--base) <l> <c> <h> [/ <alpha>])`
//!   derives a color from a declared base color.
//! - **Hue indirection**: `oklch(<l> <c> var(--hue) [/ <alpha>])` takes its
//!   hue from a numeric variable.
//!
//! # Operands
//!
//! | Operand | Lightness | Chroma | Hue | Alpha |
//! |---------|-----------|--------|-----|-------|
//! | `l`, `c`, `h`, `alpha` | base channel | base channel | base channel | base channel |
//! | number | `0..1` | absolute | degrees | `0..1` |
//! | percentage | `/ 100` | `/ 100 * 0.4` | rejected | `/ 100` |
//! | `<n>deg` | rejected | rejected | degrees | rejected |
//! | `var(--n)` | value | value `* 0.4` | value | value |
//! | `calc(h + x)`, `calc(h - x)` | rejected | rejected | offset | rejected |
//!
//! Any operand that cannot be evaluated (unknown or non-numeric reference,
//! base that is not a color) makes the whole expression fail.
//!
//! ```rust
//! use varsmith::color::{ConversionTable, Rgba};
//! use varsmith::relative::OklchExpression;
//! use varsmith::{Snapshot, VariableValue};
//!
//! let mut vars = Snapshot::new();
//! vars.insert("brand", VariableValue::Color(Rgba::new(0.2, 0.4, 1.0, 1.0)));
//!
//! let expr = OklchExpression::parse("oklch(from var(--brand) l c h / 0.5)").unwrap();
//! let color = expr.evaluate(&vars, ConversionTable::standard()).unwrap();
//! assert!((color.b - 1.0).abs() < 1e-6);
//! assert!((color.a - 0.5).abs() < 1e-6);
//! ```

use cssparser::{ParseError, Parser, ParserInput, Token};

use crate::classify::Lookup;
use crate::color::{gamut_clamp, ColorModel, ConversionTable, Rgba, CHROMA_REFERENCE};
use crate::declaration::is_valid_name;

/// A channel of the base color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Lightness,
    Chroma,
    Hue,
    Alpha,
}

impl Channel {
    fn from_keyword(keyword: &str) -> Option<Channel> {
        match keyword.to_ascii_lowercase().as_str() {
            "l" => Some(Channel::Lightness),
            "c" => Some(Channel::Chroma),
            "h" => Some(Channel::Hue),
            "alpha" => Some(Channel::Alpha),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Channel::Lightness => 0,
            Channel::Chroma => 1,
            Channel::Hue => 2,
            Channel::Alpha => 3,
        }
    }
}

/// One channel operand, as written.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Channel(Channel),
    Number(f64),
    /// Percentage as a fraction.
    Percentage(f64),
    /// Angle in degrees.
    Angle(f64),
    /// Numeric variable, by flat name.
    Reference(String),
    /// `calc(h + delta)`, or `calc(h - delta)` when `negate` is set.
    HueOffset { delta: Box<Operand>, negate: bool },
}

/// A parsed `oklch(...)` expression that needs variable lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct OklchExpression {
    /// Base color variable for relative colors.
    pub base: Option<String>,
    pub lightness: Operand,
    pub chroma: Operand,
    pub hue: Operand,
    pub alpha: Option<Operand>,
}

impl OklchExpression {
    /// Parses an `oklch(...)` function. Returns `None` when the text does not
    /// follow either grammar, including plain literals with no reference.
    pub fn parse(text: &str) -> Option<OklchExpression> {
        let mut input = ParserInput::new(text.trim());
        let mut parser = Parser::new(&mut input);
        let expr = parser.parse_entirely(parse_expression).ok()?;
        if expr.is_relative() || expr.is_hue_indirection() {
            Some(expr)
        } else {
            None
        }
    }

    pub fn is_relative(&self) -> bool {
        self.base.is_some()
    }

    /// Literal lightness and chroma, hue from a variable.
    pub fn is_hue_indirection(&self) -> bool {
        let literal = |op: &Operand| matches!(op, Operand::Number(_) | Operand::Percentage(_));
        self.base.is_none()
            && literal(&self.lightness)
            && literal(&self.chroma)
            && matches!(self.hue, Operand::Reference(_))
    }

    /// Evaluates the expression to a gamut-clamped sRGB color.
    pub fn evaluate(&self, lookup: &dyn Lookup, table: &ConversionTable) -> Option<Rgba> {
        let base = match &self.base {
            Some(name) => {
                let color = lookup.color(name)?;
                let [l, c, h] = color.to_model(table, ColorModel::Oklch);
                Some([l, c, h, color.a])
            }
            None => None,
        };

        let l = evaluate_operand(&self.lightness, Channel::Lightness, base, lookup)?;
        let c = evaluate_operand(&self.chroma, Channel::Chroma, base, lookup)?;
        let h = evaluate_operand(&self.hue, Channel::Hue, base, lookup)?;
        let alpha = match &self.alpha {
            Some(op) => evaluate_operand(op, Channel::Alpha, base, lookup)?,
            None => base.map_or(1.0, |b| b[3]),
        };

        let color = Rgba::from_model(table, ColorModel::Oklch, [l, c.max(0.0), h], alpha);
        Some(gamut_clamp(color))
    }
}

fn evaluate_operand(
    operand: &Operand,
    channel: Channel,
    base: Option<[f64; 4]>,
    lookup: &dyn Lookup,
) -> Option<f64> {
    let value = match operand {
        Operand::Channel(source) => base?[source.index()],
        Operand::Number(n) => *n,
        Operand::Percentage(fraction) => match channel {
            Channel::Chroma => fraction * CHROMA_REFERENCE,
            Channel::Hue => return None,
            Channel::Lightness | Channel::Alpha => *fraction,
        },
        Operand::Angle(degrees) if channel == Channel::Hue => *degrees,
        Operand::Angle(_) => return None,
        Operand::Reference(name) => {
            let n = lookup.number(name)?;
            if channel == Channel::Chroma {
                n * CHROMA_REFERENCE
            } else {
                n
            }
        }
        Operand::HueOffset { delta, negate } => {
            if channel != Channel::Hue {
                return None;
            }
            let start = base?[Channel::Hue.index()];
            let delta = evaluate_operand(delta, Channel::Hue, base, lookup)?;
            if *negate {
                start - delta
            } else {
                start + delta
            }
        }
    };
    value.is_finite().then_some(value)
}

// ─── Parsing ────────────────────────────────────────────────────────────────

fn invalid<'i, T>(input: &Parser<'i, '_>) -> Result<T, ParseError<'i, ()>> {
    Err(input.new_custom_error::<(), ()>(()))
}

fn parse_expression<'i>(input: &mut Parser<'i, '_>) -> Result<OklchExpression, ParseError<'i, ()>> {
    input.expect_function_matching("oklch")?;
    input.parse_nested_block(|input| {
        let base = if input.try_parse(|i| i.expect_ident_matching("from")).is_ok() {
            input.expect_function_matching("var")?;
            Some(input.parse_nested_block(parse_reference)?)
        } else {
            None
        };

        let lightness = parse_operand(input)?;
        let chroma = parse_operand(input)?;
        let hue = parse_operand(input)?;
        let alpha = if input.is_exhausted() {
            None
        } else {
            input.expect_delim('/')?;
            Some(parse_operand(input)?)
        };

        Ok(OklchExpression {
            base,
            lightness,
            chroma,
            hue,
            alpha,
        })
    })
}

/// Body of `var(--name)`, returning the name without dashes.
fn parse_reference<'i>(input: &mut Parser<'i, '_>) -> Result<String, ParseError<'i, ()>> {
    let ident = input.expect_ident()?.clone();
    match ident.strip_prefix("--") {
        Some(name) if is_valid_name(name) => Ok(name.to_string()),
        _ => invalid(input),
    }
}

fn parse_operand<'i>(input: &mut Parser<'i, '_>) -> Result<Operand, ParseError<'i, ()>> {
    match input.next()?.clone() {
        Token::Ident(ident) => match Channel::from_keyword(&ident) {
            Some(channel) => Ok(Operand::Channel(channel)),
            None => invalid(input),
        },
        Token::Function(name) if name.eq_ignore_ascii_case("calc") => {
            input.parse_nested_block(parse_hue_offset)
        }
        token => parse_simple(input, token),
    }
}

/// Numbers, percentages, angles and references.
fn parse_simple<'i>(input: &mut Parser<'i, '_>, token: Token<'i>) -> Result<Operand, ParseError<'i, ()>> {
    match token {
        Token::Number { value, .. } => Ok(Operand::Number(f64::from(value))),
        Token::Percentage { unit_value, .. } => Ok(Operand::Percentage(f64::from(unit_value))),
        Token::Dimension { value, unit, .. } if unit.eq_ignore_ascii_case("deg") => {
            Ok(Operand::Angle(f64::from(value)))
        }
        Token::Function(name) if name.eq_ignore_ascii_case("var") => {
            input.parse_nested_block(parse_reference).map(Operand::Reference)
        }
        _ => invalid(input),
    }
}

/// Body of `calc(h + x)` / `calc(h - x)`.
fn parse_hue_offset<'i>(input: &mut Parser<'i, '_>) -> Result<Operand, ParseError<'i, ()>> {
    input.expect_ident_matching("h")?;
    let (negate, delta) = match input.next()?.clone() {
        Token::Delim('+') => {
            let token = input.next()?.clone();
            (false, parse_simple(input, token)?)
        }
        Token::Delim('-') => {
            let token = input.next()?.clone();
            (true, parse_simple(input, token)?)
        }
        // `h -30` tokenizes as a signed number.
        token @ (Token::Number { has_sign: true, .. } | Token::Dimension { has_sign: true, .. }) => {
            (false, parse_simple(input, token)?)
        }
        _ => return invalid(input),
    };
    if matches!(delta, Operand::Percentage(_)) {
        return invalid(input);
    }
    Ok(Operand::HueOffset {
        delta: Box::new(delta),
        negate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;
    use crate::value::VariableValue;

    fn lookup() -> Snapshot {
        let mut vars = Snapshot::new();
        vars.insert("brand", VariableValue::Color(Rgba::new(0.2, 0.4, 1.0, 1.0)));
        vars.insert("glass", VariableValue::Color(Rgba::new(1.0, 1.0, 1.0, 0.25)));
        vars.insert("shift", VariableValue::Number(30.0));
        vars.insert("chroma", VariableValue::Number(0.5));
        vars.insert("hue", VariableValue::Number(29.2339));
        vars
    }

    fn lch_of(color: Rgba) -> [f64; 3] {
        color.to_model(ConversionTable::standard(), ColorModel::Oklch)
    }

    fn eval(text: &str) -> Option<Rgba> {
        OklchExpression::parse(text)?.evaluate(&lookup(), ConversionTable::standard())
    }

    fn assert_close(a: f64, b: f64, tolerance: f64) {
        assert!((a - b).abs() < tolerance, "expected {}, got {}", b, a);
    }

    // =========================================================================
    // Parsing
    // =========================================================================

    #[test]
    fn test_parse_relative() {
        let expr = OklchExpression::parse("oklch(from var(--brand) l 50% calc(h + 30))").unwrap();
        assert_eq!(expr.base.as_deref(), Some("brand"));
        assert_eq!(expr.lightness, Operand::Channel(Channel::Lightness));
        assert_eq!(expr.chroma, Operand::Percentage(0.5));
        assert_eq!(
            expr.hue,
            Operand::HueOffset {
                delta: Box::new(Operand::Number(30.0)),
                negate: false
            }
        );
    }

    #[test]
    fn test_parse_hue_indirection() {
        let expr = OklchExpression::parse("oklch(70% 0.1 var(--hue))").unwrap();
        assert!(expr.is_hue_indirection());
        assert!(!expr.is_relative());
    }

    #[test]
    fn test_plain_literal_is_not_an_expression() {
        assert!(OklchExpression::parse("oklch(0.7 0.1 200)").is_none());
    }

    #[test]
    fn test_hue_indirection_requires_literal_lightness() {
        assert!(OklchExpression::parse("oklch(var(--a) 0.1 var(--hue))").is_none());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(OklchExpression::parse("oklch(from var(--brand) l c)").is_none());
        assert!(OklchExpression::parse("oklch(from brand l c h)").is_none());
        assert!(OklchExpression::parse("oklch(from var(--brand) l c calc(l + 1))").is_none());
        assert!(OklchExpression::parse("rgb(from var(--brand) r g b)").is_none());
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    #[test]
    fn test_identity_keeps_base_color() {
        let color = eval("oklch(from var(--brand) l c h)").unwrap();
        assert_close(color.r, 0.2, 1e-6);
        assert_close(color.g, 0.4, 1e-6);
        assert_close(color.b, 1.0, 1e-6);
        assert_close(color.a, 1.0, 1e-9);
    }

    #[test]
    fn test_lightness_override() {
        let color = eval("oklch(from var(--brand) 0.9 0.02 h)").unwrap();
        assert_close(lch_of(color)[0], 0.9, 1e-4);
    }

    #[test]
    fn test_chroma_percentage_scales_by_reference() {
        let color = eval("oklch(from var(--brand) 0.5 25% h)").unwrap();
        // 25% of 0.4 is 0.1, well inside the gamut at this lightness.
        assert_close(lch_of(color)[1], 0.1, 1e-3);
    }

    #[test]
    fn test_chroma_reference_scales_by_reference() {
        let direct = eval("oklch(from var(--brand) 0.6 0.2 h)").unwrap();
        let via_var = eval("oklch(from var(--brand) 0.6 var(--chroma) h)").unwrap();
        assert_close(via_var.r, direct.r, 1e-6);
        assert_close(via_var.g, direct.g, 1e-6);
        assert_close(via_var.b, direct.b, 1e-6);
    }

    #[test]
    fn test_hue_offset_with_reference() {
        let base = lch_of(eval("oklch(from var(--brand) 0.6 0.05 h)").unwrap());
        let shifted = lch_of(eval("oklch(from var(--brand) 0.6 0.05 calc(h - var(--shift)))").unwrap());
        let diff = (base[2] - shifted[2]).rem_euclid(360.0);
        assert_close(diff, 30.0, 0.5);
    }

    #[test]
    fn test_hue_offset_signed_number() {
        let plus = eval("oklch(from var(--brand) 0.6 0.05 calc(h + 30))").unwrap();
        let minus = eval("oklch(from var(--brand) 0.6 0.05 calc(h -30))").unwrap();
        assert_ne!(plus, minus);
    }

    #[test]
    fn test_alpha_keeps_base_or_overrides() {
        let kept = eval("oklch(from var(--glass) l c h)").unwrap();
        assert_close(kept.a, 0.25, 1e-9);

        let overridden = eval("oklch(from var(--glass) l c h / 80%)").unwrap();
        assert_close(overridden.a, 0.8, 1e-6);

        let keyword = eval("oklch(from var(--glass) l c h / alpha)").unwrap();
        assert_close(keyword.a, 0.25, 1e-9);
    }

    #[test]
    fn test_result_is_gamut_clamped() {
        let color = eval("oklch(from var(--brand) 0.9 0.4 h)").unwrap();
        assert!(color.is_displayable());
    }

    #[test]
    fn test_hue_indirection_evaluates() {
        let color = eval("oklch(0.62796 0.25768 var(--hue))").unwrap();
        assert_close(color.r, 1.0, 1e-3);
        assert_close(color.g, 0.0, 1e-3);
        assert_close(color.a, 1.0, 1e-9);
    }

    #[test]
    fn test_dangling_references_fail() {
        assert!(eval("oklch(from var(--missing) l c h)").is_none());
        assert!(eval("oklch(from var(--shift) l c h)").is_none());
        assert!(eval("oklch(from var(--brand) l var(--brand) h)").is_none());
        assert!(eval("oklch(0.5 0.1 var(--missing))").is_none());
    }

    #[test]
    fn test_hue_percentage_is_rejected() {
        assert!(eval("oklch(from var(--brand) l c 50%)").is_none());
    }
}
