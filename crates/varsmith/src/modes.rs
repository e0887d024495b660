//! Mode block detection.
//!
//! A block contributes per-mode values when its selector carries a data
//! attribute whose value names the mode:
//!
//! ```css
//! [data-theme="dark"] { --surface: #111; }
//! :root[data-mode=light] { --surface: var(--white); }
//! ```
//!
//! Colour-scheme media queries are understood as well, so
//! `@media (prefers-color-scheme: dark) { :root { ... } }` feeds the `dark` mode.
//!
//! Selectors with an attribute selector that does not capture a mode name
//! (`[data-theme]`, `[lang=en]`) mark a malformed mode block, and the whole
//! block is ignored. Anything else is top level.

use cssparser::{ParseError, Parser, ParserInput, Token};

use crate::declaration::Declaration;

pub const LIGHT: &str = "light";
pub const DARK: &str = "dark";

/// How the declarations of a block are treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// Base values.
    TopLevel,
    /// Overrides for the named mode.
    Mode(String),
    /// A mode block without a usable mode name; its declarations are ignored.
    Malformed,
}

/// Classifies the block a declaration was found in.
pub fn block_kind(declaration: &Declaration) -> BlockKind {
    match selector_kind(declaration.selector.as_deref()) {
        BlockKind::TopLevel => match declaration.at_rule.as_deref().and_then(media_mode) {
            Some(mode) => BlockKind::Mode(mode),
            None => BlockKind::TopLevel,
        },
        other => other,
    }
}

/// Classifies a block by its selector.
pub fn selector_kind(selector: Option<&str>) -> BlockKind {
    let Some(selector) = selector else {
        return BlockKind::TopLevel;
    };
    let mut input = ParserInput::new(selector);
    let mut parser = Parser::new(&mut input);

    let mut saw_attribute = false;
    while let Ok(token) = parser.next() {
        if !matches!(token, Token::SquareBracketBlock) {
            continue;
        }
        saw_attribute = true;
        if let Ok(mode) = parser.parse_nested_block(parse_mode_attribute) {
            return BlockKind::Mode(mode);
        }
    }

    if saw_attribute {
        BlockKind::Malformed
    } else {
        BlockKind::TopLevel
    }
}

/// `data-<attr>=<mode>` with the mode as an identifier or quoted string.
fn parse_mode_attribute<'i>(input: &mut Parser<'i, '_>) -> Result<String, ParseError<'i, ()>> {
    let attribute = input.expect_ident()?.clone();
    let is_data = attribute
        .strip_prefix("data-")
        .is_some_and(|rest| !rest.is_empty());
    if !is_data {
        return Err(input.new_custom_error::<(), ()>(()));
    }
    input.expect_delim('=')?;
    let mode = input.expect_ident_or_string()?.clone();
    if mode.trim().is_empty() {
        return Err(input.new_custom_error::<(), ()>(()));
    }
    Ok(mode.as_ref().to_string())
}

/// Maps `@media (prefers-color-scheme: <scheme>)` to a mode name.
fn media_mode(prelude: &str) -> Option<String> {
    let query = prelude.strip_prefix("@media")?;
    let mut input = ParserInput::new(query);
    let mut parser = Parser::new(&mut input);

    let mut found = None;
    loop {
        match parser.next() {
            Ok(Token::ParenthesisBlock) => {
                let scheme = parser.parse_nested_block(|input| {
                    input.expect_ident_matching("prefers-color-scheme")?;
                    input.expect_colon()?;
                    let value = input.expect_ident()?.clone();
                    match value.as_ref() {
                        LIGHT => Ok(LIGHT.to_string()),
                        DARK => Ok(DARK.to_string()),
                        _ => Err(input.new_custom_error::<(), ()>(())),
                    }
                });
                if let Ok(scheme) = scheme {
                    found = Some(scheme);
                }
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }
    found
}
