//! Custom-property declaration scanner.
//!
//! [`Declarations`] walks stylesheet text and yields one [`Declaration`] per
//! `--name: value` statement. It understands just enough structure to do this
//! reliably:
//!
//! - block comments are skipped, and removed from inside values
//! - strings and parenthesized groups may contain `;`, `{` and `}`
//! - `{` opens a block whose prelude becomes the current selector, `}` closes it
//! - a block comment on the same line after the terminating `;` is captured
//!
//! Everything else (regular properties, at-rules, stray text) is skipped.
//!
//! The iterator borrows the source and is `Clone`: a clone resumes from the same
//! position, so a caller can look ahead and restart.
//!
//! ```rust
//! use varsmith::Declarations;
//!
//! let css = ":root { --gap: 8px; /* base gap */ color: red; }";
//! let found: Vec<_> = Declarations::new(css).collect();
//!
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].name, "gap");
//! assert_eq!(found[0].value, "8px");
//! assert_eq!(found[0].comment.as_deref(), Some("base gap"));
//! assert_eq!(found[0].selector.as_deref(), Some(":root"));
//! ```

/// One custom-property statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Property name without the leading `--`.
    pub name: String,
    /// Raw value text, trimmed, with block comments removed.
    pub value: String,
    /// Trailing same-line block comment, trimmed.
    pub comment: Option<String>,
    /// Prelude of the innermost enclosing block, `None` at top level.
    pub selector: Option<String>,
    /// Prelude of the nearest enclosing at-rule block, such as `@media (...)`.
    pub at_rule: Option<String>,
}

impl Declaration {
    /// The comment as a description. Comments starting with `-` are
    /// directives and never become descriptions.
    pub fn description(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .filter(|c| !c.is_empty() && !c.starts_with('-'))
    }
}

/// Returns true when `name` is a legal custom-property name body.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Lazy iterator over the custom-property declarations of a stylesheet.
#[derive(Debug, Clone)]
pub struct Declarations<'a> {
    source: &'a str,
    pos: usize,
    selectors: Vec<String>,
}

/// What ended a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    Semicolon,
    OpenBlock,
    CloseBlock,
    End,
}

impl<'a> Declarations<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            selectors: Vec::new(),
        }
    }

    fn bytes(&self) -> &'a [u8] {
        self.source.as_bytes()
    }

    /// Skips whitespace and block comments.
    fn skip_trivia(&mut self) {
        let bytes = self.bytes();
        loop {
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if bytes[self.pos..].starts_with(b"/*") {
                self.pos = comment_end(self.source, self.pos);
            } else {
                return;
            }
        }
    }

    /// Reads up to the next top-level `;`, `{` or `}` and returns the
    /// statement text with comments stripped. `self.pos` is left on the
    /// terminator.
    fn read_statement(&mut self) -> (String, Terminator) {
        let bytes = self.bytes();
        let mut text = String::new();
        let mut depth = 0usize;
        let mut chunk_start = self.pos;

        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'/' if bytes[self.pos..].starts_with(b"/*") => {
                    text.push_str(&self.source[chunk_start..self.pos]);
                    text.push(' ');
                    self.pos = comment_end(self.source, self.pos);
                    chunk_start = self.pos;
                    continue;
                }
                quote @ (b'"' | b'\'') => {
                    self.pos = string_end(bytes, self.pos, quote);
                    continue;
                }
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b';' | b'{' | b'}' if depth == 0 => {
                    text.push_str(&self.source[chunk_start..self.pos]);
                    let terminator = match bytes[self.pos] {
                        b';' => Terminator::Semicolon,
                        b'{' => Terminator::OpenBlock,
                        _ => Terminator::CloseBlock,
                    };
                    return (text, terminator);
                }
                _ => {}
            }
            self.pos += 1;
        }

        text.push_str(&self.source[chunk_start..]);
        (text, Terminator::End)
    }

    /// Captures a block comment that follows on the same line.
    fn trailing_comment(&mut self) -> Option<String> {
        let bytes = self.bytes();
        let mut cursor = self.pos;
        while cursor < bytes.len() && (bytes[cursor] == b' ' || bytes[cursor] == b'\t') {
            cursor += 1;
        }
        if !bytes[cursor..].starts_with(b"/*") {
            return None;
        }
        let end = comment_end(self.source, cursor);
        let inner_end = if self.source[..end].ends_with("*/") && end >= cursor + 4 {
            end - 2
        } else {
            end
        };
        self.pos = end;
        Some(self.source[cursor + 2..inner_end].trim().to_string())
    }

    fn declaration(&self, statement: &str) -> Option<Declaration> {
        let body = statement.trim().strip_prefix("--")?;
        let (name, value) = body.split_once(':')?;
        let name = name.trim();
        if !is_valid_name(name) {
            return None;
        }
        Some(Declaration {
            name: name.to_string(),
            value: value.trim().to_string(),
            comment: None,
            selector: self.selectors.last().cloned(),
            at_rule: self
                .selectors
                .iter()
                .rev()
                .find(|prelude| prelude.starts_with('@'))
                .cloned(),
        })
    }
}

impl Iterator for Declarations<'_> {
    type Item = Declaration;

    fn next(&mut self) -> Option<Declaration> {
        loop {
            self.skip_trivia();
            if self.pos >= self.source.len() {
                return None;
            }

            let (statement, terminator) = self.read_statement();
            match terminator {
                Terminator::OpenBlock => {
                    self.selectors.push(statement.trim().to_string());
                    self.pos += 1;
                }
                Terminator::CloseBlock if statement.trim().is_empty() => {
                    self.selectors.pop();
                    self.pos += 1;
                }
                // Last statement of a block without `;`: yield it and leave
                // the `}` for the next call.
                Terminator::CloseBlock | Terminator::End => {
                    if let Some(declaration) = self.declaration(&statement) {
                        return Some(declaration);
                    }
                }
                Terminator::Semicolon => {
                    self.pos += 1;
                    if let Some(declaration) = self.declaration(&statement) {
                        let comment = self.trailing_comment();
                        return Some(Declaration {
                            comment,
                            ..declaration
                        });
                    }
                }
            }
        }
    }
}

impl std::iter::FusedIterator for Declarations<'_> {}

/// Position just past the comment starting at `start`, or end of input.
fn comment_end(source: &str, start: usize) -> usize {
    match source[start + 2..].find("*/") {
        Some(offset) => start + 2 + offset + 2,
        None => source.len(),
    }
}

/// Position just past the string starting at `start`, or end of input.
fn string_end(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut cursor = start + 1;
    while cursor < bytes.len() {
        match bytes[cursor] {
            b'\\' => cursor += 2,
            b if b == quote => return cursor + 1,
            _ => cursor += 1,
        }
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(css: &str) -> Vec<String> {
        Declarations::new(css).map(|d| d.name).collect()
    }

    // =========================================================================
    // Basic statements
    // =========================================================================

    #[test]
    fn test_top_level_and_block_declarations() {
        let css = "--a: 1;\n:root { --b: 2; --c: red; }";
        let found: Vec<_> = Declarations::new(css).collect();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].selector, None);
        assert_eq!(found[1].selector.as_deref(), Some(":root"));
        assert_eq!(found[2].value, "red");
    }

    #[test]
    fn test_skips_regular_properties_and_at_rules() {
        let css = "@import url(x.css);\nbody { color: red; --x: 1; margin: 0 }";
        assert_eq!(names(css), vec!["x"]);
    }

    #[test]
    fn test_last_statement_without_semicolon() {
        let css = ":root { --a: 1; --b: 2 }\n--c: 3";
        assert_eq!(names(css), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_rejects_invalid_names() {
        let css = ":root { --: 1; --bad name: 2; --ok_name-2: 3; }";
        assert_eq!(names(css), vec!["ok_name-2"]);
    }

    // =========================================================================
    // Nesting: parens, strings, blocks
    // =========================================================================

    #[test]
    fn test_semicolon_inside_parens_and_strings() {
        let css = r#"--font: "a;b"; --c: light-dark(var(--x), rgb(0 0 0));"#;
        let found: Vec<_> = Declarations::new(css).collect();
        assert_eq!(found[0].value, r#""a;b""#);
        assert_eq!(found[1].value, "light-dark(var(--x), rgb(0 0 0))");
    }

    #[test]
    fn test_at_rule_context() {
        let css = "@media (prefers-color-scheme: dark) { :root { --a: red; } }\n:root { --b: 1; }";
        let found: Vec<_> = Declarations::new(css).collect();
        assert_eq!(found[0].selector.as_deref(), Some(":root"));
        assert_eq!(
            found[0].at_rule.as_deref(),
            Some("@media (prefers-color-scheme: dark)")
        );
        assert_eq!(found[1].at_rule, None);
    }

    #[test]
    fn test_selector_stack() {
        let css = "[data-theme=dark] { --a: red; }\n--b: 1;\nhtml { --c: 2; }";
        let found: Vec<_> = Declarations::new(css).collect();
        assert_eq!(found[0].selector.as_deref(), Some("[data-theme=dark]"));
        assert_eq!(found[1].selector, None);
        assert_eq!(found[2].selector.as_deref(), Some("html"));
    }

    // =========================================================================
    // Comments
    // =========================================================================

    #[test]
    fn test_embedded_comments_are_removed() {
        let css = "--a: /* lead */ 12 /* tail */;";
        let found: Vec<_> = Declarations::new(css).collect();
        assert_eq!(found[0].value, "12");
        assert_eq!(found[0].comment, None);
    }

    #[test]
    fn test_trailing_comment_same_line_only() {
        let css = "--a: 1; /* first */\n--b: 2;\n/* not b */\n--c: 3;";
        let found: Vec<_> = Declarations::new(css).collect();
        assert_eq!(found[0].comment.as_deref(), Some("first"));
        assert_eq!(found[1].comment, None);
        assert_eq!(found[2].comment, None);
    }

    #[test]
    fn test_directive_comment_is_not_a_description() {
        let css = "--a: 1; /* -skip */\n--b: 2; /* Body text */";
        let found: Vec<_> = Declarations::new(css).collect();
        assert_eq!(found[0].comment.as_deref(), Some("-skip"));
        assert_eq!(found[0].description(), None);
        assert_eq!(found[1].description(), Some("Body text"));
    }

    #[test]
    fn test_unterminated_comment_ends_input() {
        let css = "--a: 1; /* open\n--b: 2;";
        let found: Vec<_> = Declarations::new(css).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].comment.as_deref(), Some("open\n--b: 2;"));
    }

    // =========================================================================
    // Iterator behavior
    // =========================================================================

    #[test]
    fn test_clone_restarts_from_same_position() {
        let css = "--a: 1; --b: 2; --c: 3;";
        let mut iter = Declarations::new(css);
        iter.next();
        let rest: Vec<_> = iter.clone().map(|d| d.name).collect();
        assert_eq!(rest, vec!["b", "c"]);
        assert_eq!(iter.next().map(|d| d.name).as_deref(), Some("b"));
    }

    #[test]
    fn test_empty_input() {
        assert!(Declarations::new("").next().is_none());
        assert!(Declarations::new("  /* only */  ").next().is_none());
    }
}
