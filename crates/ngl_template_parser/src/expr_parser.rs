//! Parser for the template expression language.
//!
//! Bindings (`[x]="..."`, interpolations, block parameters) allow pipes but
//! no assignment; actions (`(event)="..."`) allow assignment and `;` chains
//! but no pipes. `??` binds tighter than `&&`, and the branches of `?:` may
//! contain pipes.

use crate::error::TemplateParseError;
use crate::expr::*;
use crate::expr_lexer::{self, ExprToken, ExprTokenKind};
use ngl_source::{FileId, Span};
use serde::{Deserialize, Serialize};

/// The result of parsing structural directive microsyntax
/// (`*ngFor="let item of items; index as i"`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateBindings {
    /// Expressions evaluated against the component.
    pub exprs: Vec<TemplateExpr>,
    /// Local names the directive introduces.
    pub locals: Vec<String>,
}

/// Parses a binding expression (pipes allowed, no assignment).
pub fn parse_binding(text: &str, file: FileId, offset: u32) -> Result<TemplateExpr, TemplateParseError> {
    let mut parser = ExprParser::new(text, file, offset, false)?;
    if parser.peek().kind == ExprTokenKind::Eof {
        return Ok(parser.empty());
    }
    let expr = parser.parse_pipe()?;
    parser.expect_eof()?;
    Ok(expr)
}

/// Parses an event handler (assignments and `;` chains allowed, no pipes).
pub fn parse_action(text: &str, file: FileId, offset: u32) -> Result<TemplateExpr, TemplateParseError> {
    let mut parser = ExprParser::new(text, file, offset, true)?;
    let start = parser.peek().start;
    let mut exprs = Vec::new();
    while parser.peek().kind != ExprTokenKind::Eof {
        if parser.eat_char(';') {
            continue;
        }
        exprs.push(parser.parse_pipe()?);
        if !parser.eat_char(';') {
            parser.expect_eof()?;
        }
    }
    Ok(match exprs.len() {
        0 => parser.empty(),
        1 => exprs.remove(0),
        _ => {
            let end = exprs.last().map_or(start, |e| e.span.end);
            TemplateExpr::new(TemplateExprKind::Chain(exprs), Span::new(file, start, end))
        }
    })
}

/// Finds `{{ ... }}` interpolations in `text` and parses each one.
///
/// Returns `None` if the text has no interpolation.
pub fn parse_interpolation(
    text: &str,
    file: FileId,
    offset: u32,
) -> Result<Option<Vec<TemplateExpr>>, TemplateParseError> {
    let mut exprs = Vec::new();
    let mut pos = 0usize;
    let mut found = false;
    while let Some(open) = text[pos..].find("{{") {
        let body_start = pos + open + 2;
        let Some(close) = find_interpolation_end(&text[body_start..]) else {
            return Err(TemplateParseError::Unterminated {
                what: "interpolation",
                offset: offset + (pos + open) as u32,
            });
        };
        found = true;
        let body = &text[body_start..body_start + close];
        exprs.push(parse_binding(body, file, offset + body_start as u32)?);
        pos = body_start + close + 2;
    }
    Ok(found.then_some(exprs))
}

/// Finds the `}}` closing an interpolation body, skipping quoted strings.
pub(crate) fn find_interpolation_end(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if matches!(b, b'\'' | b'"' | b'`') => quote = Some(b),
            None if b == b'}' && bytes.get(i + 1) == Some(&b'}') => return Some(i),
            None => {}
        }
        i += 1;
    }
    None
}

/// Parses structural directive microsyntax (the value of `*ngFor`, `*ngIf`).
pub fn parse_template_bindings(
    text: &str,
    file: FileId,
    offset: u32,
) -> Result<TemplateBindings, TemplateParseError> {
    let mut parser = ExprParser::new(text, file, offset, false)?;
    let mut bindings = TemplateBindings::default();
    let mut first = true;
    while parser.peek().kind != ExprTokenKind::Eof {
        if parser.peek().is_keyword("let") {
            parser.advance();
            let name = parser.expect_identifier()?;
            bindings.locals.push(name.text);
            if parser.eat_op("=") {
                // The context key (`index`, `$implicit`) is not a component read.
                parser.expect_identifier()?;
            }
        } else {
            let is_key = !first
                && parser.peek().kind == ExprTokenKind::Identifier
                && !parser.peek_at(1).is_char('.')
                && !parser.peek_at(1).is_char('(')
                && !parser.peek_at(1).is_char('[');
            if is_key {
                parser.advance();
                parser.eat_char(':');
                if parser.peek().is_keyword("as") {
                    parser.advance();
                    let alias = parser.expect_identifier()?;
                    bindings.locals.push(alias.text);
                    first = false;
                    if !parser.eat_char(';') {
                        parser.eat_char(',');
                    }
                    continue;
                }
            }
            bindings.exprs.push(parser.parse_pipe()?);
            if parser.peek().is_keyword("as") {
                parser.advance();
                let alias = parser.expect_identifier()?;
                bindings.locals.push(alias.text);
            }
        }
        first = false;
        // Separators are optional: `let item of items` is two bindings.
        if !parser.eat_char(';') {
            parser.eat_char(',');
        }
    }
    Ok(bindings)
}

struct ExprParser<'a> {
    tokens: Vec<ExprToken>,
    pos: usize,
    source: &'a str,
    offset: u32,
    file: FileId,
    action: bool,
}

impl<'a> ExprParser<'a> {
    fn new(source: &'a str, file: FileId, offset: u32, action: bool) -> Result<Self, TemplateParseError> {
        Ok(Self {
            tokens: expr_lexer::tokenize(source, offset)?,
            pos: 0,
            source,
            offset,
            file,
            action,
        })
    }

    fn peek(&self) -> &ExprToken {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &ExprToken {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn advance(&mut self) -> ExprToken {
        let tok = self.peek().clone();
        if tok.kind != ExprTokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn prev_end(&self) -> u32 {
        if self.pos == 0 {
            self.offset
        } else {
            self.tokens[self.pos - 1].end
        }
    }

    fn span(&self, start: u32) -> Span {
        Span::new(self.file, start, self.prev_end())
    }

    fn empty(&self) -> TemplateExpr {
        let end = self.offset + self.source.len() as u32;
        TemplateExpr::new(TemplateExprKind::Empty, Span::new(self.file, self.offset, end))
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, TemplateParseError> {
        Err(TemplateParseError::Expression {
            message: message.into(),
            offset: self.peek().start,
        })
    }

    fn unexpected<T>(&self) -> Result<T, TemplateParseError> {
        let tok = self.peek();
        if tok.kind == ExprTokenKind::Eof {
            self.error("unexpected end of expression")
        } else {
            self.error(format!("unexpected token `{}`", tok.text))
        }
    }

    fn eat_char(&mut self, c: char) -> bool {
        if self.peek().is_char(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if self.peek().is_op(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_char(&mut self, c: char) -> Result<(), TemplateParseError> {
        if self.eat_char(c) {
            Ok(())
        } else {
            self.error(format!("expected `{c}`"))
        }
    }

    fn expect_eof(&self) -> Result<(), TemplateParseError> {
        if self.peek().kind == ExprTokenKind::Eof {
            Ok(())
        } else {
            self.unexpected()
        }
    }

    /// Identifier or keyword used as a name (`item.as`, `{ null: 1 }`).
    fn expect_identifier(&mut self) -> Result<ExprToken, TemplateParseError> {
        match self.peek().kind {
            ExprTokenKind::Identifier | ExprTokenKind::Keyword => Ok(self.advance()),
            _ => self.error("expected identifier"),
        }
    }

    fn parse_pipe(&mut self) -> Result<TemplateExpr, TemplateParseError> {
        let start = self.peek().start;
        let mut expr = self.parse_expression()?;
        while self.peek().is_op("|") {
            if self.action {
                return self.error("cannot have a pipe in an action expression");
            }
            self.advance();
            let name = self.expect_identifier()?;
            let mut args = Vec::new();
            while self.eat_char(':') {
                args.push(self.parse_expression()?);
            }
            expr = TemplateExpr::new(
                TemplateExprKind::BindingPipe {
                    exp: Box::new(expr),
                    name: name.text,
                    name_span: Span::new(self.file, name.start, name.end),
                    args,
                },
                self.span(start),
            );
        }
        Ok(expr)
    }

    fn parse_expression(&mut self) -> Result<TemplateExpr, TemplateParseError> {
        let start = self.peek().start;
        let target = self.parse_conditional()?;
        if !self.peek().is_op("=") {
            return Ok(target);
        }
        if !self.action {
            return self.error("bindings cannot contain assignments");
        }
        self.advance();
        let value = Box::new(self.parse_expression()?);
        let kind = match target.kind {
            TemplateExprKind::PropertyRead {
                receiver,
                name,
                name_span,
            } => TemplateExprKind::PropertyWrite {
                receiver,
                name,
                name_span,
                value,
            },
            TemplateExprKind::KeyedRead { receiver, key } => TemplateExprKind::KeyedWrite {
                receiver,
                key,
                value,
            },
            _ => {
                return Err(TemplateParseError::Expression {
                    message: "invalid assignment target".to_string(),
                    offset: start,
                })
            }
        };
        Ok(TemplateExpr::new(kind, self.span(start)))
    }

    fn parse_conditional(&mut self) -> Result<TemplateExpr, TemplateParseError> {
        let start = self.peek().start;
        let condition = self.parse_binary(0)?;
        if !self.eat_op("?") {
            return Ok(condition);
        }
        let true_exp = self.parse_pipe()?;
        self.expect_char(':')?;
        let false_exp = self.parse_pipe()?;
        Ok(TemplateExpr::new(
            TemplateExprKind::Conditional {
                condition: Box::new(condition),
                true_exp: Box::new(true_exp),
                false_exp: Box::new(false_exp),
            },
            self.span(start),
        ))
    }

    fn peek_binary_op(&self) -> Option<TemplateBinaryOp> {
        let tok = self.peek();
        match tok.kind {
            ExprTokenKind::Operator => TemplateBinaryOp::from_text(&tok.text),
            ExprTokenKind::Keyword if tok.text == "in" => Some(TemplateBinaryOp::In),
            _ => None,
        }
    }

    fn parse_binary(&mut self, min_bp: u8) -> Result<TemplateExpr, TemplateParseError> {
        let start = self.peek().start;
        let mut lhs = self.parse_prefix()?;
        while let Some(op) = self.peek_binary_op() {
            let (l_bp, r_bp) = op.binding_power();
            if l_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_binary(r_bp)?;
            lhs = TemplateExpr::new(
                TemplateExprKind::Binary {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                self.span(start),
            );
        }
        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<TemplateExpr, TemplateParseError> {
        let start = self.peek().start;
        let tok = self.peek().clone();
        if tok.is_op("-") || tok.is_op("+") {
            self.advance();
            let expr = self.parse_prefix()?;
            let op = if tok.text == "-" { '-' } else { '+' };
            return Ok(TemplateExpr::new(
                TemplateExprKind::Unary {
                    op,
                    expr: Box::new(expr),
                },
                self.span(start),
            ));
        }
        if tok.is_op("!") {
            self.advance();
            let expr = self.parse_prefix()?;
            return Ok(TemplateExpr::new(
                TemplateExprKind::PrefixNot(Box::new(expr)),
                self.span(start),
            ));
        }
        if tok.is_keyword("typeof") || tok.is_keyword("void") {
            self.advance();
            let expr = Box::new(self.parse_prefix()?);
            let kind = if tok.text == "typeof" {
                TemplateExprKind::TypeofExpr(expr)
            } else {
                TemplateExprKind::VoidExpr(expr)
            };
            return Ok(TemplateExpr::new(kind, self.span(start)));
        }
        self.parse_call_chain()
    }

    fn parse_call_chain(&mut self) -> Result<TemplateExpr, TemplateParseError> {
        let start = self.peek().start;
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat_char('.') {
                expr = self.parse_access(expr, start, false)?;
            } else if self.eat_op("?.") {
                if self.eat_char('[') {
                    let key = self.parse_pipe()?;
                    self.expect_char(']')?;
                    expr = TemplateExpr::new(
                        TemplateExprKind::SafeKeyedRead {
                            receiver: Box::new(expr),
                            key: Box::new(key),
                        },
                        self.span(start),
                    );
                } else if self.eat_char('(') {
                    let args = self.parse_call_args()?;
                    expr = TemplateExpr::new(
                        TemplateExprKind::SafeCall {
                            receiver: Box::new(expr),
                            args,
                        },
                        self.span(start),
                    );
                } else {
                    expr = self.parse_access(expr, start, true)?;
                }
            } else if self.eat_char('[') {
                let key = self.parse_pipe()?;
                self.expect_char(']')?;
                expr = TemplateExpr::new(
                    TemplateExprKind::KeyedRead {
                        receiver: Box::new(expr),
                        key: Box::new(key),
                    },
                    self.span(start),
                );
            } else if self.eat_char('(') {
                let args = self.parse_call_args()?;
                expr = TemplateExpr::new(
                    TemplateExprKind::Call {
                        receiver: Box::new(expr),
                        args,
                    },
                    self.span(start),
                );
            } else if self.eat_op("!") {
                expr = TemplateExpr::new(
                    TemplateExprKind::NonNullAssert(Box::new(expr)),
                    self.span(start),
                );
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_access(
        &mut self,
        receiver: TemplateExpr,
        start: u32,
        safe: bool,
    ) -> Result<TemplateExpr, TemplateParseError> {
        let name = self.expect_identifier()?;
        let name_span = Span::new(self.file, name.start, name.end);
        let receiver = Box::new(receiver);
        let kind = if safe {
            TemplateExprKind::SafePropertyRead {
                receiver,
                name: name.text,
                name_span,
            }
        } else {
            TemplateExprKind::PropertyRead {
                receiver,
                name: name.text,
                name_span,
            }
        };
        Ok(TemplateExpr::new(kind, self.span(start)))
    }

    fn parse_call_args(&mut self) -> Result<Vec<TemplateExpr>, TemplateParseError> {
        let mut args = Vec::new();
        if self.eat_char(')') {
            return Ok(args);
        }
        loop {
            args.push(self.parse_pipe()?);
            if self.eat_char(')') {
                return Ok(args);
            }
            self.expect_char(',')?;
        }
    }

    fn parse_primary(&mut self) -> Result<TemplateExpr, TemplateParseError> {
        let tok = self.peek().clone();
        let start = tok.start;
        let literal = |value| TemplateExprKind::LiteralPrimitive(value);
        let kind = match tok.kind {
            ExprTokenKind::Character if tok.is_char('(') => {
                self.advance();
                let inner = self.parse_pipe()?;
                self.expect_char(')')?;
                TemplateExprKind::Parenthesized(Box::new(inner))
            }
            ExprTokenKind::Character if tok.is_char('[') => {
                self.advance();
                let mut items = Vec::new();
                while !self.eat_char(']') {
                    items.push(self.parse_pipe()?);
                    if !self.peek().is_char(']') {
                        self.expect_char(',')?;
                    }
                }
                TemplateExprKind::LiteralArray(items)
            }
            ExprTokenKind::Character if tok.is_char('{') => {
                self.advance();
                self.parse_literal_map()?
            }
            ExprTokenKind::Keyword => {
                self.advance();
                match tok.text.as_str() {
                    "null" => literal(LiteralValue::Null),
                    "undefined" => literal(LiteralValue::Undefined),
                    "true" => literal(LiteralValue::Bool(true)),
                    "false" => literal(LiteralValue::Bool(false)),
                    "this" => TemplateExprKind::ThisReceiver,
                    _ => {
                        // Other keywords are ordinary names in expressions.
                        self.pos -= 1;
                        return self.parse_implicit_read();
                    }
                }
            }
            ExprTokenKind::Identifier => return self.parse_implicit_read(),
            ExprTokenKind::Number => {
                self.advance();
                literal(LiteralValue::Number(tok.text))
            }
            ExprTokenKind::String => {
                self.advance();
                literal(LiteralValue::Str(tok.text))
            }
            ExprTokenKind::Template => {
                self.advance();
                self.parse_template_literal(&tok)?
            }
            _ => return self.unexpected(),
        };
        Ok(TemplateExpr::new(kind, self.span(start)))
    }

    fn parse_implicit_read(&mut self) -> Result<TemplateExpr, TemplateParseError> {
        let name = self.advance();
        let name_span = Span::new(self.file, name.start, name.end);
        let receiver = TemplateExpr::new(
            TemplateExprKind::ImplicitReceiver,
            Span::point(self.file, name.start),
        );
        Ok(TemplateExpr::new(
            TemplateExprKind::PropertyRead {
                receiver: Box::new(receiver),
                name: name.text,
                name_span,
            },
            name_span,
        ))
    }

    fn parse_literal_map(&mut self) -> Result<TemplateExprKind, TemplateParseError> {
        let mut entries = Vec::new();
        while !self.eat_char('}') {
            let key_tok = self.peek().clone();
            let quoted = key_tok.kind == ExprTokenKind::String;
            if !quoted {
                self.expect_identifier()?;
            } else {
                self.advance();
            }
            let value = if self.eat_char(':') {
                self.parse_pipe()?
            } else if quoted {
                return self.error("expected `:`");
            } else {
                let name_span = Span::new(self.file, key_tok.start, key_tok.end);
                TemplateExpr::new(
                    TemplateExprKind::PropertyRead {
                        receiver: Box::new(TemplateExpr::new(
                            TemplateExprKind::ImplicitReceiver,
                            Span::point(self.file, key_tok.start),
                        )),
                        name: key_tok.text.clone(),
                        name_span,
                    },
                    name_span,
                )
            };
            entries.push(LiteralMapEntry {
                key: key_tok.text,
                quoted,
                value,
            });
            if !self.peek().is_char('}') {
                self.expect_char(',')?;
            }
        }
        Ok(TemplateExprKind::LiteralMap(entries))
    }

    fn parse_template_literal(&mut self, tok: &ExprToken) -> Result<TemplateExprKind, TemplateParseError> {
        let local_start = (tok.start - self.offset) as usize;
        let local_end = (tok.end - self.offset) as usize;
        let raw = &self.source[local_start + 1..local_end - 1];
        let body_offset = tok.start + 1;
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();
        let mut chunk = String::new();
        let mut pos = 0usize;
        let bytes = raw.as_bytes();
        while pos < bytes.len() {
            match bytes[pos] {
                b'\\' if pos + 1 < bytes.len() => {
                    let escaped = raw[pos + 1..].chars().next().unwrap_or('\\');
                    chunk.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                    pos += 1 + escaped.len_utf8();
                }
                b'$' if bytes.get(pos + 1) == Some(&b'{') => {
                    let inner_start = pos + 2;
                    let end = expr_lexer::skip_substitution(raw, inner_start).ok_or(
                        TemplateParseError::Unterminated {
                            what: "template substitution",
                            offset: body_offset + pos as u32,
                        },
                    )?;
                    let inner = &raw[inner_start..end - 1];
                    exprs.push(parse_binding(inner, self.file, body_offset + inner_start as u32)?);
                    quasis.push(std::mem::take(&mut chunk));
                    pos = end;
                }
                _ => {
                    let c = raw[pos..].chars().next().unwrap_or(' ');
                    chunk.push(c);
                    pos += c.len_utf8();
                }
            }
        }
        quasis.push(chunk);
        Ok(TemplateExprKind::TemplateLiteral { quasis, exprs })
    }
}
