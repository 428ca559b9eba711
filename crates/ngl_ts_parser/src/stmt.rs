//! Statement parsing: blocks, declarations, control flow and loops.

use crate::ast::*;
use crate::parser::TsParser;
use crate::token::TsToken;

impl TsParser<'_> {
    /// Parses a `{ ... }` block.
    pub(crate) fn parse_block(&mut self) -> Block {
        let start = self.current_span();
        self.expect(TsToken::LeftBrace);
        let mut stmts = Vec::new();
        while !self.at(TsToken::RightBrace) && !self.at_eof() {
            let before = self.pos;
            stmts.push(self.parse_statement());
            if self.pos == before {
                self.error(&format!("unexpected `{}`", self.current_text()));
                self.advance();
            }
        }
        self.expect(TsToken::RightBrace);
        Block {
            stmts,
            span: start.to(self.prev_span()),
        }
    }

    /// Parses a single statement.
    pub(crate) fn parse_statement(&mut self) -> Stmt {
        let start = self.current_span();
        let kind = match self.current() {
            TsToken::LeftBrace => StmtKind::Block(self.parse_block()),
            TsToken::Semicolon | TsToken::Debugger => {
                self.advance();
                self.eat(TsToken::Semicolon);
                StmtKind::Empty
            }
            TsToken::Const if self.peek_kind(1) == TsToken::Enum => {
                self.skip_declaration();
                StmtKind::Empty
            }
            TsToken::Const | TsToken::Var => {
                let decl = self.parse_var_decl();
                self.eat_semicolon();
                StmtKind::Var(decl)
            }
            TsToken::Let
                if self.peek_kind(1).is_identifier_name()
                    || matches!(self.peek_kind(1), TsToken::LeftBrace | TsToken::LeftBracket) =>
            {
                let decl = self.parse_var_decl();
                self.eat_semicolon();
                StmtKind::Var(decl)
            }
            TsToken::If => self.parse_if(),
            TsToken::For => self.parse_for(),
            TsToken::While => {
                self.advance();
                let test = self.parse_paren_expr();
                let body = Box::new(self.parse_statement());
                StmtKind::While { test, body }
            }
            TsToken::Do => {
                self.advance();
                let body = Box::new(self.parse_statement());
                self.expect(TsToken::While);
                let test = self.parse_paren_expr();
                self.eat(TsToken::Semicolon);
                StmtKind::DoWhile { body, test }
            }
            TsToken::Return => {
                self.advance();
                let value = if self.at(TsToken::Semicolon)
                    || self.at(TsToken::RightBrace)
                    || self.at_eof()
                    || self.newline_before()
                {
                    None
                } else {
                    Some(self.parse_expr())
                };
                self.eat_semicolon();
                StmtKind::Return(value)
            }
            TsToken::Break | TsToken::Continue => {
                let is_break = self.at(TsToken::Break);
                self.advance();
                if self.at(TsToken::Identifier) && !self.newline_before() {
                    self.advance();
                }
                self.eat_semicolon();
                if is_break {
                    StmtKind::Break
                } else {
                    StmtKind::Continue
                }
            }
            TsToken::Throw => {
                self.advance();
                let value = self.parse_expr();
                self.eat_semicolon();
                StmtKind::Throw(value)
            }
            TsToken::Try => self.parse_try(),
            TsToken::Switch => self.parse_switch(),
            TsToken::Function => {
                let fn_start = self.current_span();
                self.advance();
                let is_generator = self.eat(TsToken::Star);
                let name = Some(self.expect_ident());
                StmtKind::Function(Box::new(self.parse_function_rest(
                    name,
                    false,
                    is_generator,
                    fn_start,
                )))
            }
            TsToken::Identifier
                if self.current_text() == "async"
                    && self.peek_kind(1) == TsToken::Function
                    && !self.peek_token(1).newline_before =>
            {
                let fn_start = self.current_span();
                self.advance();
                self.advance();
                let is_generator = self.eat(TsToken::Star);
                let name = Some(self.expect_ident());
                StmtKind::Function(Box::new(self.parse_function_rest(
                    name,
                    true,
                    is_generator,
                    fn_start,
                )))
            }
            TsToken::Class => StmtKind::Class(Box::new(self.parse_class_decl(Vec::new(), false))),
            TsToken::Identifier
                if self.current_text() == "abstract" && self.peek_kind(1) == TsToken::Class =>
            {
                StmtKind::Class(Box::new(self.parse_class_decl(Vec::new(), false)))
            }
            TsToken::At => {
                let decorators = self.parse_decorators();
                StmtKind::Class(Box::new(self.parse_class_decl(decorators, false)))
            }
            TsToken::Identifier if self.peek_kind(1) == TsToken::Colon => {
                let label = self.take_ident();
                self.advance();
                let body = Box::new(self.parse_statement());
                StmtKind::Labeled { label, body }
            }
            _ if self.at_type_level_declaration() => {
                self.skip_declaration();
                StmtKind::Empty
            }
            _ => {
                let expr = self.parse_expr();
                if matches!(expr.kind, ExprKind::Error) {
                    self.recover_to_statement_end();
                    StmtKind::Error
                } else {
                    self.eat_semicolon();
                    StmtKind::Expr(expr)
                }
            }
        };
        Stmt {
            kind,
            span: start.to(self.prev_span()),
        }
    }

    /// Parses `( expr )`.
    fn parse_paren_expr(&mut self) -> Expr {
        self.expect(TsToken::LeftParen);
        let expr = self.parse_expr();
        self.expect(TsToken::RightParen);
        expr
    }

    /// Parses `var`/`let`/`const` followed by declarators, without the terminator.
    pub(crate) fn parse_var_decl(&mut self) -> VarDecl {
        let start = self.current_span();
        let kind = match self.current() {
            TsToken::Var => VarKind::Var,
            TsToken::Let => VarKind::Let,
            _ => VarKind::Const,
        };
        self.advance();
        let mut declarators = Vec::new();
        loop {
            let decl_start = self.current_span();
            let pattern = self.parse_binding_pattern();
            self.eat(TsToken::Bang);
            let type_ann = if self.eat(TsToken::Colon) {
                Some(self.skip_type(false))
            } else {
                None
            };
            let init = if self.eat(TsToken::Eq) {
                Some(self.parse_assignment_expr())
            } else {
                None
            };
            declarators.push(Declarator {
                pattern,
                type_ann,
                init,
                span: decl_start.to(self.prev_span()),
            });
            if !self.eat(TsToken::Comma) {
                break;
            }
        }
        VarDecl {
            kind,
            declarators,
            span: start.to(self.prev_span()),
        }
    }

    fn parse_if(&mut self) -> StmtKind {
        self.expect(TsToken::If);
        let test = self.parse_paren_expr();
        let consequent = Box::new(self.parse_statement());
        let alternate = if self.eat(TsToken::Else) {
            Some(Box::new(self.parse_statement()))
        } else {
            None
        };
        StmtKind::If {
            test,
            consequent,
            alternate,
        }
    }

    fn parse_for(&mut self) -> StmtKind {
        self.expect(TsToken::For);
        self.eat_contextual("await");
        self.expect(TsToken::LeftParen);

        let init = if self.at(TsToken::Semicolon) {
            None
        } else if matches!(self.current(), TsToken::Const | TsToken::Var | TsToken::Let) {
            let saved = self.no_in;
            self.no_in = true;
            let decl = self.parse_var_decl();
            self.no_in = saved;
            Some(ForInit::Var(decl))
        } else {
            let saved = self.no_in;
            self.no_in = true;
            let expr = self.parse_expr();
            self.no_in = saved;
            Some(ForInit::Expr(expr))
        };

        if let Some(head) = &init {
            let is_of = self.at_contextual("of");
            let is_in = self.at(TsToken::In);
            if is_of || is_in {
                self.advance();
                let right = if is_of {
                    self.parse_assignment_expr()
                } else {
                    self.parse_expr()
                };
                self.expect(TsToken::RightParen);
                let body = Box::new(self.parse_statement());
                let left = match head.clone() {
                    ForInit::Var(decl) => ForHead::Var(decl),
                    ForInit::Expr(expr) => ForHead::Expr(expr),
                };
                return StmtKind::ForOf {
                    left,
                    right,
                    is_in,
                    body,
                };
            }
        }

        self.expect(TsToken::Semicolon);
        let test = if self.at(TsToken::Semicolon) {
            None
        } else {
            Some(self.parse_expr())
        };
        self.expect(TsToken::Semicolon);
        let update = if self.at(TsToken::RightParen) {
            None
        } else {
            Some(self.parse_expr())
        };
        self.expect(TsToken::RightParen);
        let body = Box::new(self.parse_statement());
        StmtKind::For {
            init,
            test,
            update,
            body,
        }
    }

    fn parse_try(&mut self) -> StmtKind {
        self.expect(TsToken::Try);
        let block = self.parse_block();
        let handler = if self.eat(TsToken::Catch) {
            let param = if self.eat(TsToken::LeftParen) {
                let pattern = self.parse_binding_pattern();
                if self.eat(TsToken::Colon) {
                    self.skip_type(false);
                }
                self.expect(TsToken::RightParen);
                Some(pattern)
            } else {
                None
            };
            let body = self.parse_block();
            Some(CatchClause { param, body })
        } else {
            None
        };
        let finalizer = if self.eat(TsToken::Finally) {
            Some(self.parse_block())
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            self.error("expected `catch` or `finally`");
        }
        StmtKind::Try {
            block,
            handler,
            finalizer,
        }
    }

    fn parse_switch(&mut self) -> StmtKind {
        self.expect(TsToken::Switch);
        let discriminant = self.parse_paren_expr();
        self.expect(TsToken::LeftBrace);
        let mut cases = Vec::new();
        while !self.at(TsToken::RightBrace) && !self.at_eof() {
            let start = self.current_span();
            let test = if self.eat(TsToken::Case) {
                Some(self.parse_expr())
            } else if self.eat(TsToken::Default) {
                None
            } else {
                self.expected("`case` or `default`");
                self.recover_to_statement_end();
                continue;
            };
            self.expect(TsToken::Colon);
            let mut body = Vec::new();
            while !matches!(
                self.current(),
                TsToken::Case | TsToken::Default | TsToken::RightBrace | TsToken::Eof
            ) {
                let before = self.pos;
                body.push(self.parse_statement());
                if self.pos == before {
                    self.advance();
                }
            }
            cases.push(SwitchCase {
                test,
                body,
                span: start.to(self.prev_span()),
            });
        }
        self.expect(TsToken::RightBrace);
        StmtKind::Switch {
            discriminant,
            cases,
        }
    }
}
