//! Color literal bridge.
//!
//! This module is the single door between the value engine and color math.
//! It offers three capabilities:
//!
//! - [`parse_color`]: turn a literal into a normalized [`Rgba`]
//! - [`ConversionTable::convert`]: move channels between [`ColorModel`]s
//! - [`gamut_clamp`]: force a computed color back into the displayable range
//!
//! # Supported literals
//!
//! | Form | Handled by |
//! |------|------------|
//! | `oklch(L C H [/ A])` | native, via `cssparser` tokens |
//! | `oklab(L a b [/ A])` | native, via `cssparser` tokens |
//! | `#rgb`, `#rrggbb`, `#rrggbbaa` | `csscolorparser` |
//! | `rgb()`, `rgba()`, `hsl()`, `hsla()`, `hwb()` | `csscolorparser` |
//! | named colors, `transparent` | `csscolorparser` |
//!
//! Bare words made only of hex digits (`bad`, `face`) are rejected even though
//! the delegate would read them as unprefixed hex.
//!
//! # Example
//!
//! ```rust
//! use varsmith::color::{parse_color, Rgba};
//!
//! let color = parse_color("#3366ff").unwrap();
//! assert_eq!(color, Rgba::new(0.2, 0.4, 1.0, 1.0));
//!
//! assert!(parse_color("not-a-color").is_none());
//! ```

mod space;

pub use space::{ColorModel, ConversionTable, ModelConversion};

use cssparser::{ParseError, Parser, ParserInput, Token};
use serde::{Deserialize, Serialize};

/// Fixed reference maximum for OKLCH chroma; `100%` chroma maps to this.
pub const CHROMA_REFERENCE: f64 = 0.4;

/// A normalized sRGB color with alpha, every channel a fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    /// All channels zero: the deterministic fallback for mode-only variables.
    pub const ZERO: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a color from channels in another model, keeping `alpha` as given.
    pub fn from_model(
        table: &ConversionTable,
        model: ColorModel,
        channels: [f64; 3],
        alpha: f64,
    ) -> Self {
        let [r, g, b] = table.convert(channels, model, ColorModel::Srgb);
        Self { r, g, b, a: alpha }
    }

    /// Returns the three color channels expressed in `model`.
    pub fn to_model(&self, table: &ConversionTable, model: ColorModel) -> [f64; 3] {
        table.convert([self.r, self.g, self.b], ColorModel::Srgb, model)
    }

    /// Returns true when every channel is finite and within `[0, 1]`.
    pub fn is_displayable(&self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| c.is_finite() && (0.0..=1.0).contains(c))
    }

    /// Formats the color as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        let mut hex = format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b));
        if byte(self.a) != 255 {
            hex.push_str(&format!("{:02x}", byte(self.a)));
        }
        hex
    }
}

/// Forces every channel into `[0, 1]`. Non-finite channels become zero.
pub fn gamut_clamp(color: Rgba) -> Rgba {
    if color.is_displayable() {
        return color;
    }
    let clamp = |c: f64| if c.is_finite() { c.clamp(0.0, 1.0) } else { 0.0 };
    Rgba {
        r: clamp(color.r),
        g: clamp(color.g),
        b: clamp(color.b),
        a: clamp(color.a),
    }
}

/// Parses a color literal into a normalized, unclamped [`Rgba`].
///
/// Returns `None` for anything that is not a supported color, including text
/// that looks like a color function but fails its grammar or range checks.
pub fn parse_color(text: &str) -> Option<Rgba> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let lower = text.to_ascii_lowercase();
    if lower.starts_with("oklch(") {
        return parse_native(text, ColorModel::Oklch);
    }
    if lower.starts_with("oklab(") {
        return parse_native(text, ColorModel::Oklab);
    }

    // The delegate accepts unprefixed hex; a bare word of hex digits is a name, not a color.
    if !text.starts_with('#')
        && !text.contains('(')
        && text.chars().all(|c| c.is_ascii_hexdigit())
    {
        return None;
    }

    let parsed = csscolorparser::parse(text).ok()?;
    Some(Rgba {
        r: widen_channel(parsed.r),
        g: widen_channel(parsed.g),
        b: widen_channel(parsed.b),
        a: widen_channel(parsed.a),
    })
}

/// Widens a single-precision channel, snapping it to `n / 255` when it sits
/// on a byte boundary so `#3366ff` reads back as exactly `0.2`.
fn widen_channel(channel: f32) -> f64 {
    let value = f64::from(channel);
    let scaled = value * 255.0;
    let byte = scaled.round();
    if (scaled - byte).abs() < 1e-4 {
        byte / 255.0
    } else {
        value
    }
}

fn parse_native(text: &str, model: ColorModel) -> Option<Rgba> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let (channels, alpha) = parser
        .parse_entirely(|input| parse_native_function(input, model))
        .ok()?;
    Some(Rgba::from_model(
        ConversionTable::standard(),
        model,
        channels,
        alpha,
    ))
}

fn parse_native_function<'i>(
    input: &mut Parser<'i, '_>,
    model: ColorModel,
) -> Result<([f64; 3], f64), ParseError<'i, ()>> {
    let name = match model {
        ColorModel::Oklch => "oklch",
        _ => "oklab",
    };
    input.expect_function_matching(name)?;
    input.parse_nested_block(|input| {
        let lightness = parse_lightness(input)?;
        let (second, third) = match model {
            ColorModel::Oklch => (parse_chroma(input)?, parse_hue(input)?),
            _ => (parse_axis(input)?, parse_axis(input)?),
        };
        let alpha = parse_optional_alpha(input)?.unwrap_or(1.0);
        Ok(([lightness, second, third], alpha))
    })
}

/// Lightness: a number on the native `0..1` scale, or a percentage.
pub(crate) fn parse_lightness<'i>(input: &mut Parser<'i, '_>) -> Result<f64, ParseError<'i, ()>> {
    match input.next()?.clone() {
        Token::Number { value, .. } => Ok(f64::from(value)),
        Token::Percentage { unit_value, .. } => Ok(f64::from(unit_value)),
        _ => Err(input.new_custom_error::<(), ()>(())),
    }
}

/// Chroma: an absolute number, or a percentage of [`CHROMA_REFERENCE`].
pub(crate) fn parse_chroma<'i>(input: &mut Parser<'i, '_>) -> Result<f64, ParseError<'i, ()>> {
    match input.next()?.clone() {
        Token::Number { value, .. } => Ok(f64::from(value)),
        Token::Percentage { unit_value, .. } => Ok(f64::from(unit_value) * CHROMA_REFERENCE),
        _ => Err(input.new_custom_error::<(), ()>(())),
    }
}

/// Hue: a bare number or a `deg` dimension, in degrees.
pub(crate) fn parse_hue<'i>(input: &mut Parser<'i, '_>) -> Result<f64, ParseError<'i, ()>> {
    match input.next()?.clone() {
        Token::Number { value, .. } => Ok(f64::from(value)),
        Token::Dimension { value, unit, .. } if unit.eq_ignore_ascii_case("deg") => {
            Ok(f64::from(value))
        }
        _ => Err(input.new_custom_error::<(), ()>(())),
    }
}

/// OKLab `a`/`b` axis: a number, or a percentage of [`CHROMA_REFERENCE`].
fn parse_axis<'i>(input: &mut Parser<'i, '_>) -> Result<f64, ParseError<'i, ()>> {
    parse_chroma(input)
}

/// Parses a trailing `/ <alpha>` if present.
fn parse_optional_alpha<'i>(
    input: &mut Parser<'i, '_>,
) -> Result<Option<f64>, ParseError<'i, ()>> {
    if input.is_exhausted() {
        return Ok(None);
    }
    input.expect_delim('/')?;
    match input.next()?.clone() {
        Token::Number { value, .. } => Ok(Some(f64::from(value))),
        Token::Percentage { unit_value, .. } => Ok(Some(f64::from(unit_value))),
        _ => Err(input.new_custom_error::<(), ()>(())),
    }
}
