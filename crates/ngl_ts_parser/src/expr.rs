//! Pratt expression parser for TypeScript.
//!
//! | BP (L,R) | Operators |
//! |----------|-----------|
//! | (1,2)    | `||` `??` |
//! | (3,4)    | `&&` |
//! | (5,6)    | `|` |
//! | (7,8)    | `^` |
//! | (9,10)   | `&` |
//! | (11,12)  | `==` `!=` `===` `!==` |
//! | (13,14)  | `<` `<=` `>` `>=` `instanceof` `in` `as` `satisfies` |
//! | (15,16)  | `<<` `>>` `>>>` |
//! | (17,18)  | `+` `-` |
//! | (19,20)  | `*` `/` `%` |
//! | (22,21)  | `**` (right-assoc) |
//!
//! Assignment, arrow functions, `yield` and the conditional operator sit
//! above the binary operators and are handled by
//! [`TsParser::parse_assignment_expr`]. Since the lexer never joins `>`
//! characters, shift and `>=` operators are assembled here from adjacent
//! `>` and `=` tokens.

use crate::ast::*;
use crate::lexer::{self, TemplateSegment};
use crate::parser::TsParser;
use crate::token::TsToken;
use ngl_source::Span;

/// Binding power for binary operators. Returns (left_bp, right_bp).
fn infix_binding_power(op: BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::Or | BinaryOp::Nullish => (1, 2),
        BinaryOp::And => (3, 4),
        BinaryOp::BitOr => (5, 6),
        BinaryOp::BitXor => (7, 8),
        BinaryOp::BitAnd => (9, 10),
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => (11, 12),
        BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq
        | BinaryOp::Instanceof
        | BinaryOp::In => (13, 14),
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => (15, 16),
        BinaryOp::Add | BinaryOp::Sub => (17, 18),
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => (19, 20),
        BinaryOp::Exp => (22, 21),
    }
}

/// Left binding power of `as` / `satisfies`.
const TYPE_ASSERTION_BP: u8 = 13;

impl TsParser<'_> {
    /// Parses a full expression, including the comma operator.
    pub fn parse_expr(&mut self) -> Expr {
        let first = self.parse_assignment_expr();
        if !self.at(TsToken::Comma) {
            return first;
        }
        let start = first.span;
        let mut exprs = vec![first];
        while self.eat(TsToken::Comma) {
            exprs.push(self.parse_assignment_expr());
        }
        Expr::new(ExprKind::Sequence(exprs), start.to(self.prev_span()))
    }

    /// Parses an assignment expression (no top-level comma).
    pub(crate) fn parse_assignment_expr(&mut self) -> Expr {
        if let Some(arrow) = self.try_parse_arrow() {
            return arrow;
        }
        if self.at_contextual("yield") && self.starts_operand(1) {
            let start = self.current_span();
            self.advance();
            self.eat(TsToken::Star);
            let arg = if self.newline_before() || !self.starts_operand(0) {
                None
            } else {
                Some(Box::new(self.parse_assignment_expr()))
            };
            return Expr::new(ExprKind::Yield(arg), start.to(self.prev_span()));
        }

        let lhs = self.parse_conditional_expr();
        if let Some((op, len)) = self.peek_assign_op() {
            for _ in 0..len {
                self.advance();
            }
            let value = self.parse_assignment_expr();
            let span = lhs.span.to(value.span);
            return Expr::new(
                ExprKind::Assign {
                    op,
                    target: Box::new(lhs),
                    value: Box::new(value),
                },
                span,
            );
        }
        lhs
    }

    fn parse_conditional_expr(&mut self) -> Expr {
        let test = self.parse_binary_expr(0);
        if !self.at(TsToken::Question) {
            return test;
        }
        self.advance();
        let saved = self.no_in;
        self.no_in = false;
        let consequent = self.parse_assignment_expr();
        self.no_in = saved;
        self.expect(TsToken::Colon);
        let alternate = self.parse_assignment_expr();
        let span = test.span.to(alternate.span);
        Expr::new(
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            span,
        )
    }

    /// Parses a binary expression with minimum binding power.
    pub(crate) fn parse_binary_expr(&mut self, min_bp: u8) -> Expr {
        let mut lhs = self.parse_unary_expr();
        loop {
            if (self.at_contextual("as") || self.at_contextual("satisfies"))
                && !self.newline_before()
                && TYPE_ASSERTION_BP >= min_bp
            {
                self.advance();
                let type_span = self.skip_type(true);
                let span = lhs.span.to(type_span);
                lhs = Expr::new(
                    ExprKind::TypeAssertion {
                        expr: Box::new(lhs),
                        type_span,
                    },
                    span,
                );
                continue;
            }
            let Some((op, len)) = self.peek_binary_op() else {
                break;
            };
            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            for _ in 0..len {
                self.advance();
            }
            let rhs = self.parse_binary_expr(r_bp);
            let span = lhs.span.to(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                span,
            );
        }
        lhs
    }

    /// Returns `true` if token `pos + offset` is glued to the one before it.
    fn adjacent(&self, offset: usize) -> bool {
        let prev = self.peek_token(offset - 1);
        let tok = self.peek_token(offset);
        tok.span.start == prev.span.end
    }

    fn peek_binary_op(&self) -> Option<(BinaryOp, usize)> {
        let op = match self.current() {
            TsToken::Gt => {
                let glued = |k: TsToken, i: usize| self.peek_kind(i) == k && self.adjacent(i);
                if glued(TsToken::Gt, 1) {
                    if glued(TsToken::Gt, 2) {
                        if glued(TsToken::Eq, 3) {
                            return None;
                        }
                        return Some((BinaryOp::UShr, 3));
                    }
                    if glued(TsToken::Eq, 2) {
                        return None;
                    }
                    return Some((BinaryOp::Shr, 2));
                }
                if glued(TsToken::Eq, 1) {
                    return Some((BinaryOp::GtEq, 2));
                }
                BinaryOp::Gt
            }
            TsToken::QuestionQuestion => BinaryOp::Nullish,
            TsToken::PipePipe => BinaryOp::Or,
            TsToken::AmpAmp => BinaryOp::And,
            TsToken::Pipe => BinaryOp::BitOr,
            TsToken::Caret => BinaryOp::BitXor,
            TsToken::Amp => BinaryOp::BitAnd,
            TsToken::EqEq => BinaryOp::Eq,
            TsToken::BangEq => BinaryOp::NotEq,
            TsToken::EqEqEq => BinaryOp::StrictEq,
            TsToken::BangEqEq => BinaryOp::StrictNotEq,
            TsToken::Lt => BinaryOp::Lt,
            TsToken::LtEq => BinaryOp::LtEq,
            TsToken::Instanceof => BinaryOp::Instanceof,
            TsToken::In if !self.no_in => BinaryOp::In,
            TsToken::LtLt => BinaryOp::Shl,
            TsToken::Plus => BinaryOp::Add,
            TsToken::Minus => BinaryOp::Sub,
            TsToken::Star => BinaryOp::Mul,
            TsToken::Slash => BinaryOp::Div,
            TsToken::Percent => BinaryOp::Rem,
            TsToken::StarStar => BinaryOp::Exp,
            _ => return None,
        };
        Some((op, 1))
    }

    fn peek_assign_op(&self) -> Option<(AssignOp, usize)> {
        let op = match self.current() {
            TsToken::Eq => AssignOp::Assign,
            TsToken::PlusEq => AssignOp::Add,
            TsToken::MinusEq => AssignOp::Sub,
            TsToken::StarEq => AssignOp::Mul,
            TsToken::SlashEq => AssignOp::Div,
            TsToken::PercentEq => AssignOp::Rem,
            TsToken::StarStarEq => AssignOp::Exp,
            TsToken::LtLtEq => AssignOp::Shl,
            TsToken::AmpEq => AssignOp::BitAnd,
            TsToken::PipeEq => AssignOp::BitOr,
            TsToken::CaretEq => AssignOp::BitXor,
            TsToken::AmpAmpEq => AssignOp::And,
            TsToken::PipePipeEq => AssignOp::Or,
            TsToken::QuestionQuestionEq => AssignOp::Nullish,
            TsToken::Gt => {
                let glued = |k: TsToken, i: usize| self.peek_kind(i) == k && self.adjacent(i);
                if glued(TsToken::Gt, 1) && glued(TsToken::Eq, 2) {
                    return Some((AssignOp::Shr, 3));
                }
                if glued(TsToken::Gt, 1) && glued(TsToken::Gt, 2) && glued(TsToken::Eq, 3) {
                    return Some((AssignOp::UShr, 4));
                }
                return None;
            }
            _ => return None,
        };
        Some((op, 1))
    }

    /// Returns `true` if the token at `pos + offset` can start an operand.
    fn starts_operand(&self, offset: usize) -> bool {
        let tok = self.peek_token(offset);
        if offset > 0 && tok.newline_before {
            return false;
        }
        tok.kind.is_identifier_name()
            || matches!(
                tok.kind,
                TsToken::PrivateName
                    | TsToken::Number
                    | TsToken::String
                    | TsToken::Template
                    | TsToken::Regex
                    | TsToken::LeftParen
                    | TsToken::LeftBracket
                    | TsToken::LeftBrace
                    | TsToken::Bang
                    | TsToken::Tilde
                    | TsToken::Minus
                    | TsToken::Plus
                    | TsToken::PlusPlus
                    | TsToken::MinusMinus
                    | TsToken::Lt
                    | TsToken::Slash
                    | TsToken::SlashEq
            )
    }

    /// Parses prefix operators.
    fn parse_unary_expr(&mut self) -> Expr {
        let start = self.current_span();
        let op = match self.current() {
            TsToken::Bang => Some(UnaryOp::Not),
            TsToken::Minus => Some(UnaryOp::Neg),
            TsToken::Plus => Some(UnaryOp::Plus),
            TsToken::Tilde => Some(UnaryOp::BitNot),
            TsToken::Typeof => Some(UnaryOp::Typeof),
            TsToken::Void => Some(UnaryOp::Void),
            TsToken::Delete => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary_expr();
            let span = start.to(operand.span);
            return Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            );
        }
        if self.at(TsToken::PlusPlus) || self.at(TsToken::MinusMinus) {
            let op = if self.at(TsToken::PlusPlus) {
                UpdateOp::Increment
            } else {
                UpdateOp::Decrement
            };
            self.advance();
            let operand = self.parse_unary_expr();
            let span = start.to(operand.span);
            return Expr::new(
                ExprKind::Update {
                    op,
                    prefix: true,
                    operand: Box::new(operand),
                },
                span,
            );
        }
        if self.at_contextual("await") && self.starts_operand(1) {
            self.advance();
            let operand = self.parse_unary_expr();
            let span = start.to(operand.span);
            return Expr::new(ExprKind::Await(Box::new(operand)), span);
        }
        if self.at(TsToken::Lt) {
            // Angle-bracket assertion `<T>expr`.
            let type_span = self.skip_type_params().unwrap_or(start);
            let expr = self.parse_unary_expr();
            let span = start.to(expr.span);
            return Expr::new(
                ExprKind::TypeAssertion {
                    expr: Box::new(expr),
                    type_span,
                },
                span,
            );
        }
        self.parse_postfix_expr()
    }

    fn parse_postfix_expr(&mut self) -> Expr {
        let expr = self.parse_lhs_expr();
        if (self.at(TsToken::PlusPlus) || self.at(TsToken::MinusMinus)) && !self.newline_before() {
            let op = if self.at(TsToken::PlusPlus) {
                UpdateOp::Increment
            } else {
                UpdateOp::Decrement
            };
            self.advance();
            let span = expr.span.to(self.prev_span());
            return Expr::new(
                ExprKind::Update {
                    op,
                    prefix: false,
                    operand: Box::new(expr),
                },
                span,
            );
        }
        expr
    }

    /// Parses a primary expression followed by member accesses and calls.
    fn parse_lhs_expr(&mut self) -> Expr {
        let base = if self.at(TsToken::New) {
            self.parse_new_expr()
        } else {
            self.parse_primary_expr()
        };
        self.parse_call_tail(base, true)
    }

    /// Parses `.x`, `?.x`, `[i]`, `(args)`, `` `tpl` ``, `!` and `<T>(args)`
    /// suffixes. Calls are excluded while parsing the callee of `new`.
    fn parse_call_tail(&mut self, mut expr: Expr, allow_calls: bool) -> Expr {
        loop {
            match self.current() {
                TsToken::Dot => {
                    self.advance();
                    let property = self.expect_identifier_name();
                    let span = expr.span.to(property.span);
                    expr = Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            property,
                            optional: false,
                        },
                        span,
                    );
                }
                TsToken::QuestionDot => {
                    self.advance();
                    expr = match self.current() {
                        TsToken::LeftBracket => self.parse_index(expr, true),
                        TsToken::LeftParen if allow_calls => self.parse_call(expr, true, None),
                        TsToken::Lt if allow_calls => {
                            let type_args = self.try_type_args();
                            self.parse_call(expr, true, type_args)
                        }
                        _ => {
                            let property = self.expect_identifier_name();
                            let span = expr.span.to(property.span);
                            Expr::new(
                                ExprKind::Member {
                                    object: Box::new(expr),
                                    property,
                                    optional: true,
                                },
                                span,
                            )
                        }
                    };
                }
                TsToken::LeftBracket => expr = self.parse_index(expr, false),
                TsToken::LeftParen if allow_calls => expr = self.parse_call(expr, false, None),
                TsToken::Lt if allow_calls => match self.try_type_args() {
                    Some(type_args) if self.at(TsToken::LeftParen) => {
                        expr = self.parse_call(expr, false, Some(type_args));
                    }
                    Some(_) => {}
                    None => break,
                },
                TsToken::Template => {
                    let quasi = self.parse_template_literal();
                    let span = expr.span.to(quasi.span);
                    expr = Expr::new(
                        ExprKind::TaggedTemplate {
                            tag: Box::new(expr),
                            quasi: Box::new(quasi),
                        },
                        span,
                    );
                }
                TsToken::Bang if !self.newline_before() => {
                    self.advance();
                    let span = expr.span.to(self.prev_span());
                    expr = Expr::new(ExprKind::NonNull(Box::new(expr)), span);
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_index(&mut self, object: Expr, optional: bool) -> Expr {
        self.expect(TsToken::LeftBracket);
        let saved = self.no_in;
        self.no_in = false;
        let index = self.parse_expr();
        self.no_in = saved;
        self.expect(TsToken::RightBracket);
        let span = object.span.to(self.prev_span());
        Expr::new(
            ExprKind::Index {
                object: Box::new(object),
                index: Box::new(index),
                optional,
            },
            span,
        )
    }

    fn parse_call(&mut self, callee: Expr, optional: bool, type_args: Option<Span>) -> Expr {
        let args = self.parse_arguments();
        let span = callee.span.to(self.prev_span());
        Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
                optional,
                type_args,
            },
            span,
        )
    }

    /// Parses a parenthesized argument list.
    pub(crate) fn parse_arguments(&mut self) -> Vec<Expr> {
        self.expect(TsToken::LeftParen);
        let saved = self.no_in;
        self.no_in = false;
        let mut args = Vec::new();
        while !self.at(TsToken::RightParen) && !self.at_eof() {
            let before = self.pos;
            args.push(self.parse_spread_or_assignment());
            if self.pos == before || !self.eat(TsToken::Comma) {
                break;
            }
        }
        self.no_in = saved;
        self.expect(TsToken::RightParen);
        args
    }

    fn parse_spread_or_assignment(&mut self) -> Expr {
        if self.at(TsToken::DotDotDot) {
            let start = self.current_span();
            self.advance();
            let inner = self.parse_assignment_expr();
            let span = start.to(inner.span);
            return Expr::new(ExprKind::Spread(Box::new(inner)), span);
        }
        self.parse_assignment_expr()
    }

    fn parse_new_expr(&mut self) -> Expr {
        let start = self.current_span();
        self.expect(TsToken::New);
        if self.eat(TsToken::Dot) {
            self.expect_identifier_name();
            return Expr::new(ExprKind::MetaProperty, start.to(self.prev_span()));
        }
        let callee_base = if self.at(TsToken::New) {
            self.parse_new_expr()
        } else {
            self.parse_primary_expr()
        };
        let callee = self.parse_call_tail(callee_base, false);
        self.skip_type_params();
        let args = if self.at(TsToken::LeftParen) {
            self.parse_arguments()
        } else {
            Vec::new()
        };
        Expr::new(
            ExprKind::New {
                callee: Box::new(callee),
                args,
            },
            start.to(self.prev_span()),
        )
    }

    /// Parses a primary expression.
    pub(crate) fn parse_primary_expr(&mut self) -> Expr {
        let span = self.current_span();
        match self.current() {
            TsToken::Identifier => {
                if self.current_text() == "async"
                    && self.peek_kind(1) == TsToken::Function
                    && !self.peek_token(1).newline_before
                {
                    self.advance();
                    return self.parse_function_expr(span, true);
                }
                let id = self.take_ident();
                Expr::new(ExprKind::Ident(id), span)
            }
            TsToken::This => {
                self.advance();
                Expr::new(ExprKind::This, span)
            }
            TsToken::Super => {
                self.advance();
                Expr::new(ExprKind::Super, span)
            }
            TsToken::Number => {
                let raw = self.current_text().to_string();
                self.advance();
                Expr::new(ExprKind::Number(raw), span)
            }
            TsToken::String => {
                let text = self.current_text();
                let body = text.get(1..text.len().saturating_sub(1)).unwrap_or("");
                let value = lexer::cook(body);
                let verbatim = value == body;
                self.advance();
                Expr::new(ExprKind::Str { value, verbatim }, span)
            }
            TsToken::Template => self.parse_template_literal(),
            TsToken::Regex => {
                let raw = self.current_text().to_string();
                self.advance();
                Expr::new(ExprKind::Regex(raw), span)
            }
            TsToken::True | TsToken::False => {
                let value = self.at(TsToken::True);
                self.advance();
                Expr::new(ExprKind::Bool(value), span)
            }
            TsToken::Null => {
                self.advance();
                Expr::new(ExprKind::Null, span)
            }
            TsToken::LeftParen => {
                self.advance();
                let saved = self.no_in;
                self.no_in = false;
                let inner = self.parse_expr();
                self.no_in = saved;
                self.expect(TsToken::RightParen);
                Expr::new(ExprKind::Paren(Box::new(inner)), span.to(self.prev_span()))
            }
            TsToken::LeftBracket => self.parse_array_literal(),
            TsToken::LeftBrace => self.parse_object_literal(),
            TsToken::Function => self.parse_function_expr(span, false),
            TsToken::Class => {
                let class = self.parse_class_decl(Vec::new(), false);
                let span = class.span;
                Expr::new(ExprKind::Class(Box::new(class)), span)
            }
            TsToken::At => {
                let decorators = self.parse_decorators();
                let class = self.parse_class_decl(decorators, false);
                let span = class.span;
                Expr::new(ExprKind::Class(Box::new(class)), span)
            }
            TsToken::Import => {
                self.advance();
                if self.eat(TsToken::Dot) {
                    self.expect_identifier_name();
                    return Expr::new(ExprKind::MetaProperty, span.to(self.prev_span()));
                }
                Expr::new(
                    ExprKind::Ident(Ident {
                        name: "import".to_string(),
                        span,
                    }),
                    span,
                )
            }
            _ => {
                self.expected("expression");
                Expr::new(ExprKind::Error, span)
            }
        }
    }

    fn parse_function_expr(&mut self, start: Span, is_async: bool) -> Expr {
        self.expect(TsToken::Function);
        let is_generator = self.eat(TsToken::Star);
        let name = if self.at(TsToken::Identifier) {
            Some(self.take_ident())
        } else {
            None
        };
        let function = self.parse_function_rest(name, is_async, is_generator, start);
        let span = function.span;
        Expr::new(ExprKind::Function(Box::new(function)), span)
    }

    /// Parses a template literal token, including its substitutions.
    fn parse_template_literal(&mut self) -> Expr {
        let span = self.current_span();
        self.advance();
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();
        for segment in lexer::template_segments(self.source, span) {
            match segment {
                TemplateSegment::Quasi(start, end) => {
                    let raw = self
                        .source
                        .get(start as usize..end as usize)
                        .unwrap_or("")
                        .to_string();
                    quasis.push(TemplateQuasi {
                        cooked: lexer::cook(&raw),
                        raw,
                        span: Span::new(self.file, start, end),
                    });
                }
                TemplateSegment::Substitution(start, end) => {
                    let tokens =
                        lexer::lex_range(self.source, self.file, start as usize, end as usize, self.sink);
                    let mut sub = TsParser::new(tokens, self.source, self.file, self.sink);
                    let expr = sub.parse_expr();
                    if !sub.at_eof() {
                        sub.expected("`}`");
                    }
                    exprs.push(expr);
                }
            }
        }
        Expr::new(ExprKind::Template { quasis, exprs }, span)
    }

    fn parse_array_literal(&mut self) -> Expr {
        let start = self.current_span();
        self.expect(TsToken::LeftBracket);
        let saved = self.no_in;
        self.no_in = false;
        let mut elements = Vec::new();
        while !self.at(TsToken::RightBracket) && !self.at_eof() {
            if self.eat(TsToken::Comma) {
                continue;
            }
            let before = self.pos;
            elements.push(self.parse_spread_or_assignment());
            if self.pos == before || !self.eat(TsToken::Comma) {
                break;
            }
        }
        self.no_in = saved;
        self.expect(TsToken::RightBracket);
        Expr::new(ExprKind::Array(elements), start.to(self.prev_span()))
    }

    fn parse_object_literal(&mut self) -> Expr {
        let start = self.current_span();
        self.expect(TsToken::LeftBrace);
        let saved = self.no_in;
        self.no_in = false;
        let mut props = Vec::new();
        while !self.at(TsToken::RightBrace) && !self.at_eof() {
            let before = self.pos;
            props.push(self.parse_object_prop());
            if self.pos == before || !self.eat(TsToken::Comma) {
                break;
            }
        }
        self.no_in = saved;
        self.expect(TsToken::RightBrace);
        Expr::new(ExprKind::Object(props), start.to(self.prev_span()))
    }

    fn parse_object_prop(&mut self) -> ObjectProp {
        let start = self.current_span();
        if self.eat(TsToken::DotDotDot) {
            let expr = self.parse_assignment_expr();
            let span = start.to(expr.span);
            return ObjectProp::Spread(expr, span);
        }

        let not_a_key_follows = |p: &Self| {
            matches!(
                p.peek_kind(1),
                TsToken::Comma | TsToken::Colon | TsToken::LeftParen | TsToken::RightBrace | TsToken::Eq
            )
        };
        let mut kind = MethodKind::Method;
        let mut is_async = false;
        if (self.at_contextual("get") || self.at_contextual("set")) && !not_a_key_follows(self) {
            kind = if self.current_text() == "get" {
                MethodKind::Getter
            } else {
                MethodKind::Setter
            };
            self.advance();
        } else if self.at_contextual("async") && !not_a_key_follows(self) {
            is_async = true;
            self.advance();
        }
        let is_generator = self.eat(TsToken::Star);
        let key = self.parse_prop_key();

        if self.at(TsToken::LeftParen) || self.at(TsToken::Lt) {
            let function = self.parse_function_rest(None, is_async, is_generator, start);
            return ObjectProp::Method {
                key,
                kind,
                function: Box::new(function),
                span: start.to(self.prev_span()),
            };
        }
        if self.eat(TsToken::Colon) {
            let value = self.parse_assignment_expr();
            let span = start.to(value.span);
            return ObjectProp::KeyValue { key, value, span };
        }
        match key {
            PropKey::Ident(id) => {
                if self.eat(TsToken::Eq) {
                    // Cover grammar for destructuring assignment defaults.
                    self.parse_assignment_expr();
                }
                ObjectProp::Shorthand(id)
            }
            other => {
                self.expected("`:`");
                let span = other.span();
                ObjectProp::KeyValue {
                    key: other,
                    value: Expr::new(ExprKind::Error, span),
                    span,
                }
            }
        }
    }

    // ========================================================================
    // Arrow functions
    // ========================================================================

    /// Parses an arrow function if one starts at the current token.
    fn try_parse_arrow(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let mut offset = 0;
        let is_async = self.at_contextual("async")
            && matches!(self.peek_kind(1), TsToken::Identifier | TsToken::LeftParen)
            && !self.peek_token(1).newline_before;
        if is_async {
            offset = 1;
        }

        let single_param = self.peek_kind(offset) == TsToken::Identifier
            && self.peek_kind(offset + 1) == TsToken::Arrow
            && !self.peek_token(offset + 1).newline_before;
        if single_param {
            if is_async {
                self.advance();
            }
            let id = self.take_ident();
            let param = Param {
                decorators: Vec::new(),
                modifiers: Vec::new(),
                rest: false,
                span: id.span,
                pattern: Pattern::Ident(id),
                optional: false,
                type_ann: None,
                default: None,
            };
            return Some(self.parse_arrow_rest(vec![param], is_async, None, start));
        }

        if self.peek_kind(offset) != TsToken::LeftParen || !self.paren_starts_arrow(offset) {
            return None;
        }
        if is_async {
            self.advance();
        }
        let params = self.parse_params();
        let return_type = if self.eat(TsToken::Colon) {
            Some(self.skip_type(false))
        } else {
            None
        };
        Some(self.parse_arrow_rest(params, is_async, return_type, start))
    }

    /// Looks past the parenthesized group at `pos + offset` for `=>`,
    /// optionally preceded by a return type annotation.
    fn paren_starts_arrow(&mut self, offset: usize) -> bool {
        let mut i = self.pos + offset;
        let mut depth = 0usize;
        while i < self.tokens.len() {
            match self.tokens[i].kind {
                TsToken::LeftParen | TsToken::LeftBracket | TsToken::LeftBrace => depth += 1,
                TsToken::RightParen | TsToken::RightBracket | TsToken::RightBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        break;
                    }
                }
                TsToken::Eof => return false,
                _ => {}
            }
            i += 1;
        }
        let after = i + 1;
        match self.tokens.get(after).map(|t| (t.kind, t.newline_before)) {
            Some((TsToken::Arrow, false)) => true,
            Some((TsToken::Colon, _)) => {
                let starts_type = self.tokens.get(after + 1).is_some_and(|t| {
                    t.kind.is_identifier_name()
                        || matches!(
                            t.kind,
                            TsToken::LeftParen
                                | TsToken::LeftBrace
                                | TsToken::LeftBracket
                                | TsToken::String
                                | TsToken::Number
                        )
                });
                if !starts_type {
                    return false;
                }
                let saved = self.pos;
                self.pos = after + 1;
                self.skip_type(false);
                let is_arrow = self.at(TsToken::Arrow);
                self.pos = saved;
                is_arrow
            }
            _ => false,
        }
    }

    fn parse_arrow_rest(
        &mut self,
        params: Vec<Param>,
        is_async: bool,
        return_type: Option<Span>,
        start: Span,
    ) -> Expr {
        self.expect(TsToken::Arrow);
        let body = if self.at(TsToken::LeftBrace) {
            FunctionBody::Block(self.parse_block())
        } else {
            FunctionBody::Expr(Box::new(self.parse_assignment_expr()))
        };
        let span = start.to(self.prev_span());
        let function = Function {
            name: None,
            params,
            body: Some(body),
            is_arrow: true,
            is_async,
            is_generator: false,
            return_type,
            span,
        };
        Expr::new(ExprKind::Function(Box::new(function)), span)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parse_expression;
    use ngl_diagnostics::DiagnosticSink;
    use ngl_source::FileId;

    fn parse(source: &str) -> Expr {
        let sink = DiagnosticSink::new();
        let expr = parse_expression(source, FileId::from_raw(0), &sink);
        let errors = sink.take_all();
        assert!(
            errors.is_empty(),
            "unexpected errors in {source:?}: {:?}",
            errors.iter().map(|e| &e.message).collect::<Vec<_>>()
        );
        expr
    }

    fn text(source: &str, expr: &Expr) -> String {
        source[expr.span.start as usize..expr.span.end as usize].to_string()
    }

    #[test]
    fn member_chain_spans() {
        let src = "this.user.first.name";
        let expr = parse(src);
        let ExprKind::Member { object, property, .. } = &expr.kind else { panic!("member") };
        assert_eq!(property.name, "name");
        assert_eq!(text(src, object), "this.user.first");
        assert_eq!(text(src, &expr), src);
    }

    #[test]
    fn generic_call() {
        let expr = parse("signal<number[]>(0)");
        let ExprKind::Call { callee, args, type_args, .. } = &expr.kind else { panic!("call") };
        assert_eq!(callee.as_ident(), Some("signal"));
        assert_eq!(args.len(), 1);
        assert!(type_args.is_some());
    }

    #[test]
    fn comparison_is_not_generic_call() {
        let expr = parse("a < b && c > (d)");
        let ExprKind::Binary { op, .. } = &expr.kind else { panic!("binary") };
        assert_eq!(*op, BinaryOp::And);
    }

    #[test]
    fn shift_operators_from_adjacent_gt() {
        let expr = parse("a >> 2 >= b");
        let ExprKind::Binary { op, left, .. } = &expr.kind else { panic!("binary") };
        assert_eq!(*op, BinaryOp::GtEq);
        assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Shr, .. }));
        let expr = parse("a >>>= 1");
        assert!(matches!(expr.kind, ExprKind::Assign { op: AssignOp::UShr, .. }));
    }

    #[test]
    fn precedence() {
        let expr = parse("a + b * c ?? d");
        let ExprKind::Binary { op, left, .. } = &expr.kind else { panic!("binary") };
        assert_eq!(*op, BinaryOp::Nullish);
        let ExprKind::Binary { op, right, .. } = &left.kind else { panic!("binary") };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn arrow_functions() {
        assert!(matches!(parse("x => x + 1").kind, ExprKind::Function(ref f) if f.is_arrow));
        assert!(matches!(parse("(a: number, b = 2): number => a").kind, ExprKind::Function(ref f) if f.params.len() == 2));
        assert!(matches!(parse("async () => { await load(); }").kind, ExprKind::Function(ref f) if f.is_async));
        assert!(matches!(parse("(value) => ({ ...value, a: 1 })").kind, ExprKind::Function(_)));
        assert!(matches!(parse("c ? (a) : b").kind, ExprKind::Conditional { .. }));
    }

    #[test]
    fn assignment_is_right_associative() {
        let expr = parse("this.a = this.b = 1");
        let ExprKind::Assign { value, .. } = &expr.kind else { panic!("assign") };
        assert!(matches!(value.kind, ExprKind::Assign { .. }));
    }

    #[test]
    fn optional_chaining_and_non_null() {
        let src = "this.user()?.profile!.name";
        let expr = parse(src);
        let ExprKind::Member { object, optional, .. } = &expr.kind else { panic!("member") };
        assert!(!optional);
        assert!(matches!(object.kind, ExprKind::NonNull(_)));
        let expr = parse("a?.[0]?.(1)");
        assert!(matches!(expr.kind, ExprKind::Call { optional: true, .. }));
    }

    #[test]
    fn template_substitutions_are_parsed() {
        let src = "`total: ${this.count} of ${ items.length }`";
        let expr = parse(src);
        let ExprKind::Template { quasis, exprs } = &expr.kind else { panic!("template") };
        assert_eq!(quasis.len(), 3);
        assert_eq!(quasis[0].cooked, "total: ");
        assert_eq!(exprs.len(), 2);
        assert_eq!(text(src, &exprs[0]), "this.count");
    }

    #[test]
    fn object_literal_forms() {
        let expr = parse("{ a: 1, b, ...c, d() { }, get e() { return 1; }, 'f': 2, [g]: 3 }");
        let ExprKind::Object(props) = &expr.kind else { panic!("object") };
        assert_eq!(props.len(), 7);
        assert_eq!(props[0].key_name(), Some("a"));
        assert!(matches!(props[1], ObjectProp::Shorthand(_)));
        assert!(matches!(props[2], ObjectProp::Spread(..)));
        assert!(matches!(props[3], ObjectProp::Method { kind: MethodKind::Method, .. }));
        assert!(matches!(props[4], ObjectProp::Method { kind: MethodKind::Getter, .. }));
        assert_eq!(props[5].key_name(), Some("f"));
        assert_eq!(props[6].key_name(), None);
    }

    #[test]
    fn type_assertions() {
        assert!(matches!(parse("x as const").kind, ExprKind::TypeAssertion { .. }));
        assert!(matches!(parse("(x as Foo<Bar>).y").kind, ExprKind::Member { .. }));
        assert!(matches!(parse("x as T ? a : b").kind, ExprKind::Conditional { .. }));
    }

    #[test]
    fn new_with_type_args() {
        let expr = parse("new Map<string, number>()");
        assert!(matches!(expr.kind, ExprKind::New { .. }));
        let expr = parse("new Foo().bar()");
        let ExprKind::Call { callee, .. } = &expr.kind else { panic!("call") };
        assert!(matches!(callee.kind, ExprKind::Member { .. }));
    }

    #[test]
    fn update_expressions() {
        assert!(matches!(parse("this.count++").kind, ExprKind::Update { prefix: false, .. }));
        assert!(matches!(parse("--this.count").kind, ExprKind::Update { prefix: true, .. }));
    }

    #[test]
    fn string_verbatim_flag() {
        assert!(matches!(parse("'plain'").kind, ExprKind::Str { verbatim: true, .. }));
        assert!(matches!(parse(r"'a\nb'").kind, ExprKind::Str { verbatim: false, .. }));
    }
}
