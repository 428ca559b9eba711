//! Lexer for the template expression language.

use crate::error::TemplateParseError;

/// Template expression token kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExprTokenKind {
    /// A name.
    Identifier,
    /// `let`, `as`, `null`, `undefined`, `true`, `false`, `this`, `typeof`, `void`, `in`.
    Keyword,
    /// A numeric literal.
    Number,
    /// A quoted string literal.
    String,
    /// A backtick template literal, kept raw.
    Template,
    /// An operator such as `+`, `?.` or `===`.
    Operator,
    /// One of `( ) [ ] { } , : ; .`.
    Character,
    /// End of input.
    Eof,
}

/// A template expression token.
///
/// `start`/`end` are offsets into the whole template text.
#[derive(Clone, Debug, PartialEq)]
pub struct ExprToken {
    /// The token kind.
    pub kind: ExprTokenKind,
    /// Token text; the cooked value for strings.
    pub text: String,
    /// Start offset.
    pub start: u32,
    /// End offset.
    pub end: u32,
}

impl ExprToken {
    /// Returns `true` if this is the character `c`.
    pub fn is_char(&self, c: char) -> bool {
        self.kind == ExprTokenKind::Character && self.text.len() == 1 && self.text.starts_with(c)
    }

    /// Returns `true` if this is the operator `op`.
    pub fn is_op(&self, op: &str) -> bool {
        self.kind == ExprTokenKind::Operator && self.text == op
    }

    /// Returns `true` if this is the keyword `kw`.
    pub fn is_keyword(&self, kw: &str) -> bool {
        self.kind == ExprTokenKind::Keyword && self.text == kw
    }
}

const KEYWORDS: &[&str] = &[
    "let", "as", "null", "undefined", "true", "false", "this", "typeof", "void", "in",
];

const OPERATORS: &[&str] = &[
    "===", "!==", "**", "==", "!=", "<=", ">=", "&&", "||", "??", "?.", "+", "-", "*", "/", "%",
    "<", ">", "!", "=", "?", "|", "&",
];

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$' || (!c.is_ascii() && c.is_alphabetic())
}

fn is_ident_part(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

/// Tokenizes `text`, which starts at `offset` in the template.
pub fn tokenize(text: &str, offset: u32) -> Result<Vec<ExprToken>, TemplateParseError> {
    let mut tokens = Vec::new();
    let bytes = text.as_bytes();
    let mut pos = 0usize;
    let at = |p: usize| offset + p as u32;

    while pos < text.len() {
        let Some(c) = text[pos..].chars().next() else { break };
        if c.is_whitespace() {
            pos += c.len_utf8();
            continue;
        }
        let start = pos;
        if is_ident_start(c) {
            while let Some(c) = text[pos..].chars().next() {
                if !is_ident_part(c) {
                    break;
                }
                pos += c.len_utf8();
            }
            let word = &text[start..pos];
            let kind = if KEYWORDS.contains(&word) {
                ExprTokenKind::Keyword
            } else {
                ExprTokenKind::Identifier
            };
            tokens.push(ExprToken {
                kind,
                text: word.to_string(),
                start: at(start),
                end: at(pos),
            });
            continue;
        }
        if c.is_ascii_digit() || (c == '.' && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit)) {
            pos += 1;
            while pos < bytes.len() {
                let b = bytes[pos];
                let exponent_sign = (b == b'+' || b == b'-')
                    && matches!(bytes[pos - 1], b'e' | b'E')
                    && !text[start..pos].starts_with("0x");
                if b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || exponent_sign {
                    pos += 1;
                } else {
                    break;
                }
            }
            tokens.push(ExprToken {
                kind: ExprTokenKind::Number,
                text: text[start..pos].to_string(),
                start: at(start),
                end: at(pos),
            });
            continue;
        }
        if c == '\'' || c == '"' {
            let (value, end) = scan_string(text, pos, c).ok_or(TemplateParseError::Unterminated {
                what: "string literal",
                offset: at(start),
            })?;
            pos = end;
            tokens.push(ExprToken {
                kind: ExprTokenKind::String,
                text: value,
                start: at(start),
                end: at(pos),
            });
            continue;
        }
        if c == '`' {
            let end = scan_template(text, pos).ok_or(TemplateParseError::Unterminated {
                what: "template literal",
                offset: at(start),
            })?;
            pos = end;
            tokens.push(ExprToken {
                kind: ExprTokenKind::Template,
                text: text[start..pos].to_string(),
                start: at(start),
                end: at(pos),
            });
            continue;
        }
        if "()[]{},:;".contains(c)
            || (c == '.' && !text[pos..].starts_with("..."))
        {
            pos += 1;
            tokens.push(ExprToken {
                kind: ExprTokenKind::Character,
                text: c.to_string(),
                start: at(start),
                end: at(pos),
            });
            continue;
        }
        let op = OPERATORS.iter().find(|op| {
            text[pos..].starts_with(**op)
                // `a?.5:1` is a conditional, not optional chaining.
                && !(**op == "?." && bytes.get(pos + 2).is_some_and(u8::is_ascii_digit))
        });
        match op {
            Some(op) => {
                pos += op.len();
                tokens.push(ExprToken {
                    kind: ExprTokenKind::Operator,
                    text: op.to_string(),
                    start: at(start),
                    end: at(pos),
                });
            }
            None => {
                return Err(TemplateParseError::Expression {
                    message: format!("unexpected character `{c}`"),
                    offset: at(start),
                })
            }
        }
    }

    tokens.push(ExprToken {
        kind: ExprTokenKind::Eof,
        text: String::new(),
        start: at(text.len()),
        end: at(text.len()),
    });
    Ok(tokens)
}

/// Scans a quoted string starting at `start`; returns the cooked value and
/// the offset after the closing quote.
fn scan_string(text: &str, start: usize, quote: char) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut chars = text[start + 1..].char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                let (_, escaped) = chars.next()?;
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    'b' => '\u{8}',
                    'f' => '\u{c}',
                    'v' => '\u{b}',
                    '0' => '\0',
                    other => other,
                });
            }
            c if c == quote => return Some((value, start + 1 + i + 1)),
            c => value.push(c),
        }
    }
    None
}

/// Scans a template literal starting at the opening backtick; returns the
/// offset after the closing backtick.
fn scan_template(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'`' => return Some(pos + 1),
            b'$' if bytes.get(pos + 1) == Some(&b'{') => {
                pos = skip_substitution(text, pos + 2)?;
            }
            _ => pos += 1,
        }
    }
    None
}

/// Skips a `${...}` body starting after `${`; returns the offset after `}`.
pub(crate) fn skip_substitution(text: &str, mut pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(pos + 1),
            b'}' => depth -= 1,
            q @ (b'\'' | b'"') => {
                let (_, end) = scan_string(text, pos, q as char)?;
                pos = end;
                continue;
            }
            b'`' => {
                pos = scan_template(text, pos)?;
                continue;
            }
            _ => {}
        }
        pos += 1;
    }
    None
}
