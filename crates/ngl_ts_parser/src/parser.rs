//! Core parser infrastructure and top-level TypeScript parsing rules.
//!
//! The [`TsParser`] struct provides primitive operations (advance, expect, eat,
//! automatic semicolon insertion), error recovery, type-annotation skipping,
//! and the top-level item and import rules. Declarations, statements and
//! expressions live in `decl.rs`, `stmt.rs` and `expr.rs`.

use crate::ast::*;
use crate::token::{Token, TsToken};
use ngl_diagnostics::code::{Category, DiagnosticCode};
use ngl_diagnostics::{Diagnostic, DiagnosticSink};
use ngl_source::{FileId, Span};

/// A recursive descent parser for TypeScript source text.
///
/// The parser consumes a token stream produced by the lexer and builds a
/// [`Program`]. Errors are reported to the diagnostic sink and represented as
/// `Error` variants in the AST for error recovery.
pub struct TsParser<'src> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) source: &'src str,
    pub(crate) file: FileId,
    pub(crate) sink: &'src DiagnosticSink,
    /// Set while parsing a `for` head, where `in` ends the expression.
    pub(crate) no_in: bool,
}

impl<'src> TsParser<'src> {
    /// Creates a new parser from a token stream produced by the lexer.
    ///
    /// The `tokens` must have been lexed from `source` for the given `file`
    /// and must end with an `Eof` token.
    pub fn new(
        tokens: Vec<Token>,
        source: &'src str,
        file: FileId,
        sink: &'src DiagnosticSink,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            file,
            sink,
            no_in: false,
        }
    }

    // ========================================================================
    // Primitive operations
    // ========================================================================

    /// Returns the kind of the current token.
    pub(crate) fn current(&self) -> TsToken {
        self.tokens[self.pos].kind
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    /// Returns the source text of the current token.
    pub(crate) fn current_text(&self) -> &'src str {
        self.text_of(self.current_span())
    }

    /// Returns the source text of a span.
    pub(crate) fn text_of(&self, span: Span) -> &'src str {
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or("")
    }

    /// Returns `true` if the current token matches the given kind.
    pub(crate) fn at(&self, kind: TsToken) -> bool {
        self.current() == kind
    }

    /// Returns `true` if the current token is the identifier `word`.
    pub(crate) fn at_contextual(&self, word: &str) -> bool {
        self.at(TsToken::Identifier) && self.current_text() == word
    }

    /// Returns `true` if the parser is at end of file.
    pub(crate) fn at_eof(&self) -> bool {
        self.current() == TsToken::Eof
    }

    /// Returns `true` if a line break precedes the current token.
    pub(crate) fn newline_before(&self) -> bool {
        self.tokens[self.pos].newline_before
    }

    /// Returns the span of the previous token.
    pub(crate) fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    /// Advances past the current token.
    pub(crate) fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    /// Consumes the current token if it matches the given kind.
    pub(crate) fn eat(&mut self, kind: TsToken) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes the identifier `word` if it is the current token.
    pub(crate) fn eat_contextual(&mut self, word: &str) -> bool {
        if self.at_contextual(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to match the given kind. Emits an error if not.
    pub(crate) fn expect(&mut self, kind: TsToken) {
        if !self.eat(kind) {
            self.expected(token_description(kind));
        }
    }

    /// Returns the token at `pos + offset`.
    pub(crate) fn peek_token(&self, offset: usize) -> Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        self.tokens[idx]
    }

    /// Returns the kind of the token at `pos + offset`.
    pub(crate) fn peek_kind(&self, offset: usize) -> TsToken {
        self.peek_token(offset).kind
    }

    /// Returns `true` if the token at `pos + offset` is the identifier `word`.
    pub(crate) fn peek_is_contextual(&self, offset: usize, word: &str) -> bool {
        let tok = self.peek_token(offset);
        tok.kind == TsToken::Identifier && self.text_of(tok.span) == word
    }

    /// Expects and returns an identifier. Emits an error and returns a
    /// placeholder if not.
    pub(crate) fn expect_ident(&mut self) -> Ident {
        if self.at(TsToken::Identifier) {
            self.take_ident()
        } else {
            self.expected("identifier");
            Ident {
                name: "<missing>".to_string(),
                span: self.current_span(),
            }
        }
    }

    /// Consumes the current token as an identifier, whatever its kind.
    pub(crate) fn take_ident(&mut self) -> Ident {
        let ident = Ident {
            name: self.current_text().to_string(),
            span: self.current_span(),
        };
        self.advance();
        ident
    }

    /// Consumes a property name after `.`: any identifier, reserved word or
    /// private name.
    pub(crate) fn expect_identifier_name(&mut self) -> Ident {
        if self.current().is_identifier_name() || self.at(TsToken::PrivateName) {
            self.take_ident()
        } else {
            self.expected("property name");
            Ident {
                name: "<missing>".to_string(),
                span: self.current_span(),
            }
        }
    }

    /// Consumes a statement terminator, applying automatic semicolon insertion.
    pub(crate) fn eat_semicolon(&mut self) {
        if self.eat(TsToken::Semicolon)
            || self.at(TsToken::RightBrace)
            || self.at_eof()
            || self.newline_before()
        {
            return;
        }
        self.expected("`;`");
        self.recover_to_statement_end();
    }

    // ========================================================================
    // Error handling and recovery
    // ========================================================================

    /// Emits an error diagnostic at the current position.
    pub(crate) fn error(&self, msg: &str) {
        self.error_at(msg, self.current_span());
    }

    /// Emits an error diagnostic at `span`.
    pub(crate) fn error_at(&self, msg: &str, span: Span) {
        self.sink.emit(
            Diagnostic::error(DiagnosticCode::new(Category::Error, 102), msg, span)
                .with_message_id("parseError"),
        );
    }

    /// Emits an "expected X" error at the current position.
    pub(crate) fn expected(&self, what: &str) {
        let found = if self.at_eof() {
            "end of file".to_string()
        } else {
            format!("`{}`", self.current_text())
        };
        self.error(&format!("expected {what}, found {found}"));
    }

    /// Skips tokens up to the end of the current statement: a `;` (consumed),
    /// a `}` closing the enclosing block (not consumed), or a token starting
    /// a new line.
    pub(crate) fn recover_to_statement_end(&mut self) {
        let mut depth = 0usize;
        let start = self.pos;
        while !self.at_eof() {
            match self.current() {
                TsToken::LeftBrace | TsToken::LeftParen | TsToken::LeftBracket => depth += 1,
                TsToken::RightBrace | TsToken::RightParen | TsToken::RightBracket => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                TsToken::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                _ if depth == 0 && self.pos > start && self.newline_before() => return,
                _ => {}
            }
            self.advance();
        }
    }

    /// Skips a balanced bracket group starting at the current opening token.
    pub(crate) fn skip_balanced(&mut self) {
        let mut depth = 0usize;
        while !self.at_eof() {
            match self.current() {
                TsToken::LeftBrace | TsToken::LeftParen | TsToken::LeftBracket => depth += 1,
                TsToken::RightBrace | TsToken::RightParen | TsToken::RightBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// Skips a type annotation and returns its span.
    ///
    /// The type ends at the first token at nesting depth zero that cannot
    /// continue it. With `in_expr` set (after `as`/`satisfies`) conditional
    /// types are not recognised, so `x as T ? a : b` stops before `?`.
    pub(crate) fn skip_type(&mut self, in_expr: bool) -> Span {
        let start = self.current_span();
        let first = self.pos;
        let mut depth = 0usize;
        let mut expect_operand = true;
        let mut closed_paren = false;
        let mut pending_conditional = 0usize;
        let mut saw_extends = false;

        while !self.at_eof() {
            let tok = self.current();
            if depth > 0 {
                match tok {
                    TsToken::LeftParen | TsToken::LeftBracket | TsToken::LeftBrace | TsToken::Lt => {
                        depth += 1
                    }
                    TsToken::RightParen | TsToken::RightBracket | TsToken::RightBrace | TsToken::Gt => {
                        depth -= 1;
                        if depth == 0 {
                            closed_paren = tok == TsToken::RightParen;
                            expect_operand = false;
                            self.advance();
                            continue;
                        }
                    }
                    _ => {}
                }
                self.advance();
                continue;
            }

            if expect_operand {
                match tok {
                    TsToken::LeftParen | TsToken::LeftBracket | TsToken::LeftBrace => {
                        depth += 1;
                        self.advance();
                    }
                    TsToken::Lt => {
                        // Generic function type `<T>(x: T) => T`.
                        depth += 1;
                        self.advance();
                    }
                    TsToken::Pipe | TsToken::Amp | TsToken::Minus | TsToken::Typeof | TsToken::New => {
                        self.advance();
                    }
                    TsToken::Identifier
                        if matches!(
                            self.current_text(),
                            "keyof" | "readonly" | "unique" | "infer" | "asserts" | "abstract"
                        ) && (self.peek_kind(1).is_identifier_name()
                            || matches!(
                                self.peek_kind(1),
                                TsToken::LeftParen | TsToken::LeftBracket | TsToken::LeftBrace | TsToken::New
                            )) =>
                    {
                        self.advance();
                    }
                    k if k.is_identifier_name()
                        || matches!(
                            k,
                            TsToken::String | TsToken::Number | TsToken::Template | TsToken::Star
                        ) =>
                    {
                        self.advance();
                        expect_operand = false;
                        closed_paren = false;
                    }
                    _ => break,
                }
                continue;
            }

            if self.newline_before() && !matches!(tok, TsToken::Pipe | TsToken::Amp | TsToken::Dot) {
                break;
            }
            match tok {
                TsToken::Pipe | TsToken::Amp | TsToken::Dot => {
                    expect_operand = true;
                    self.advance();
                }
                TsToken::LeftBracket | TsToken::Lt => {
                    depth += 1;
                    self.advance();
                }
                TsToken::Arrow if closed_paren => {
                    expect_operand = true;
                    self.advance();
                }
                TsToken::Extends if !in_expr => {
                    saw_extends = true;
                    expect_operand = true;
                    self.advance();
                }
                TsToken::Identifier if self.current_text() == "is" => {
                    expect_operand = true;
                    self.advance();
                }
                TsToken::Question if saw_extends && !in_expr => {
                    pending_conditional += 1;
                    expect_operand = true;
                    self.advance();
                }
                TsToken::Colon if pending_conditional > 0 => {
                    pending_conditional -= 1;
                    expect_operand = true;
                    self.advance();
                }
                _ => break,
            }
        }

        if self.pos == first {
            self.expected("type");
            return start;
        }
        start.to(self.prev_span())
    }

    /// Skips `<...>` type parameters if present and returns their span.
    pub(crate) fn skip_type_params(&mut self) -> Option<Span> {
        if !self.at(TsToken::Lt) {
            return None;
        }
        let start = self.current_span();
        let mut depth = 0usize;
        while !self.at_eof() {
            match self.current() {
                TsToken::Lt | TsToken::LeftParen | TsToken::LeftBracket | TsToken::LeftBrace => {
                    depth += 1
                }
                TsToken::Gt | TsToken::RightParen | TsToken::RightBracket | TsToken::RightBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return Some(start.to(self.prev_span()));
                    }
                }
                _ => {}
            }
            self.advance();
        }
        Some(start.to(self.prev_span()))
    }

    /// Tries to read explicit type arguments before a call (`signal<number>(0)`).
    ///
    /// On success the parser is left on the `(` and the span of `<...>` is
    /// returned; otherwise nothing is consumed.
    pub(crate) fn try_type_args(&mut self) -> Option<Span> {
        if !self.at(TsToken::Lt) {
            return None;
        }
        let saved = self.pos;
        let start = self.current_span();
        let mut depth = 0usize;
        while !self.at_eof() {
            match self.current() {
                TsToken::Lt | TsToken::LeftParen | TsToken::LeftBracket | TsToken::LeftBrace => {
                    depth += 1
                }
                TsToken::Gt | TsToken::RightParen | TsToken::RightBracket | TsToken::RightBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    if depth == 0 {
                        let end = self.current_span();
                        self.advance();
                        if self.at(TsToken::LeftParen) || self.at(TsToken::Template) {
                            return Some(start.to(end));
                        }
                        break;
                    }
                }
                TsToken::Semicolon
                | TsToken::AmpAmp
                | TsToken::PipePipe
                | TsToken::QuestionQuestion
                | TsToken::Eq
                | TsToken::EqEq
                | TsToken::EqEqEq
                | TsToken::BangEq
                | TsToken::BangEqEq
                | TsToken::PlusPlus
                | TsToken::MinusMinus
                | TsToken::Plus
                | TsToken::Slash
                | TsToken::Percent => break,
                _ => {}
            }
            self.advance();
        }
        self.pos = saved;
        None
    }

    // ========================================================================
    // Top-level parsing
    // ========================================================================

    /// Parses a complete source file.
    pub fn parse_program(&mut self) -> Program {
        let start = self.current_span();
        let mut items = Vec::new();

        while !self.at_eof() {
            let before = self.pos;
            items.push(self.parse_item());
            if self.pos == before {
                // Nothing consumed: report and skip the offending token.
                self.error(&format!("unexpected `{}`", self.current_text()));
                self.advance();
            }
        }

        let span = start.to(self.prev_span());
        Program { items, span }
    }

    fn parse_item(&mut self) -> Item {
        match self.current() {
            TsToken::Import
                if !matches!(self.peek_kind(1), TsToken::LeftParen | TsToken::Dot) =>
            {
                self.parse_import()
            }
            TsToken::Export => self.parse_export(),
            TsToken::At => {
                let decorators = self.parse_decorators();
                let exported = self.eat(TsToken::Export);
                if exported {
                    self.eat(TsToken::Default);
                }
                Item::Class(self.parse_class_decl(decorators, exported))
            }
            TsToken::Class => Item::Class(self.parse_class_decl(Vec::new(), false)),
            TsToken::Identifier
                if self.current_text() == "abstract" && self.peek_kind(1) == TsToken::Class =>
            {
                Item::Class(self.parse_class_decl(Vec::new(), false))
            }
            _ if self.at_type_level_declaration() => Item::Skipped(self.skip_declaration()),
            _ => Item::Stmt(self.parse_statement()),
        }
    }

    fn parse_export(&mut self) -> Item {
        let start = self.current_span();
        self.expect(TsToken::Export);
        match self.current() {
            TsToken::Default => {
                self.advance();
                match self.current() {
                    TsToken::Class => Item::Class(self.parse_class_decl(Vec::new(), true)),
                    TsToken::At => {
                        let decorators = self.parse_decorators();
                        Item::Class(self.parse_class_decl(decorators, true))
                    }
                    TsToken::Identifier
                        if self.current_text() == "abstract"
                            && self.peek_kind(1) == TsToken::Class =>
                    {
                        Item::Class(self.parse_class_decl(Vec::new(), true))
                    }
                    _ => Item::Stmt(self.parse_statement()),
                }
            }
            TsToken::Class => Item::Class(self.parse_class_decl(Vec::new(), true)),
            TsToken::At => {
                let decorators = self.parse_decorators();
                Item::Class(self.parse_class_decl(decorators, true))
            }
            TsToken::Identifier
                if self.current_text() == "abstract" && self.peek_kind(1) == TsToken::Class =>
            {
                Item::Class(self.parse_class_decl(Vec::new(), true))
            }
            TsToken::LeftBrace | TsToken::Star | TsToken::Eq => {
                self.recover_to_statement_end();
                Item::Skipped(start.to(self.prev_span()))
            }
            TsToken::Import => {
                self.recover_to_statement_end();
                Item::Skipped(start.to(self.prev_span()))
            }
            _ if self.at_type_level_declaration() => {
                let span = self.skip_declaration();
                Item::Skipped(start.to(span))
            }
            _ => Item::Stmt(self.parse_statement()),
        }
    }

    /// Returns `true` at `interface`, `type X =`, `enum`, `const enum`,
    /// `declare ...`, `namespace X {` and `module X {`.
    pub(crate) fn at_type_level_declaration(&self) -> bool {
        match self.current() {
            TsToken::Enum => true,
            TsToken::Const => self.peek_kind(1) == TsToken::Enum,
            TsToken::Identifier => {
                let next = self.peek_token(1);
                if next.newline_before {
                    return false;
                }
                match self.current_text() {
                    "interface" => next.kind == TsToken::Identifier,
                    "type" => matches!(next.kind, TsToken::Identifier | TsToken::LeftBrace),
                    "declare" => next.kind.is_identifier_name(),
                    "namespace" | "module" => {
                        matches!(next.kind, TsToken::Identifier | TsToken::String)
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Skips an interface, type alias, enum, namespace or ambient declaration.
    pub(crate) fn skip_declaration(&mut self) -> Span {
        let start = self.current_span();
        let first = self.pos;
        let mut depth = 0usize;
        while !self.at_eof() {
            let tok = self.current();
            if depth == 0 && self.pos > first {
                if tok == TsToken::Semicolon {
                    self.advance();
                    break;
                }
                if self.newline_before() && self.at_statement_start() {
                    break;
                }
            }
            match tok {
                TsToken::LeftBrace | TsToken::LeftParen | TsToken::LeftBracket => depth += 1,
                TsToken::RightBrace | TsToken::RightParen | TsToken::RightBracket => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    if depth == 0 && tok == TsToken::RightBrace {
                        self.advance();
                        if !matches!(
                            self.current(),
                            TsToken::Pipe | TsToken::Amp | TsToken::LeftBracket | TsToken::Dot
                        ) || self.newline_before()
                        {
                            self.eat(TsToken::Semicolon);
                            break;
                        }
                        continue;
                    }
                }
                _ => {}
            }
            self.advance();
        }
        start.to(self.prev_span())
    }

    fn at_statement_start(&self) -> bool {
        match self.current() {
            TsToken::Export
            | TsToken::Import
            | TsToken::Class
            | TsToken::Const
            | TsToken::Let
            | TsToken::Var
            | TsToken::Function
            | TsToken::At
            | TsToken::Enum => true,
            TsToken::Identifier => matches!(
                self.current_text(),
                "interface" | "type" | "declare" | "abstract" | "async" | "namespace"
            ),
            _ => false,
        }
    }

    /// Parses an import declaration.
    fn parse_import(&mut self) -> Item {
        let start = self.current_span();
        self.expect(TsToken::Import);

        let mut decl = ImportDecl {
            type_only: false,
            default: None,
            namespace: None,
            named: Vec::new(),
            named_span: None,
            source: String::new(),
            source_span: Span::DUMMY,
            span: start,
        };

        if self.at(TsToken::String) {
            self.read_module_specifier(&mut decl);
            self.eat_semicolon();
            decl.span = start.to(self.prev_span());
            return Item::Import(decl);
        }

        if self.at_contextual("type")
            && (self.peek_kind(1) == TsToken::LeftBrace
                || self.peek_kind(1) == TsToken::Star
                || (self.peek_kind(1) == TsToken::Identifier && !self.peek_is_contextual(1, "from")))
        {
            self.advance();
            decl.type_only = true;
        }

        if self.at(TsToken::Identifier) && !self.at_contextual("from") {
            decl.default = Some(self.take_ident());
            if self.at(TsToken::Eq) {
                // `import x = require('...')`
                self.recover_to_statement_end();
                return Item::Skipped(start.to(self.prev_span()));
            }
            self.eat(TsToken::Comma);
        }

        if self.eat(TsToken::Star) {
            if !self.eat_contextual("as") {
                self.expected("`as`");
            }
            decl.namespace = Some(self.expect_ident());
        } else if self.at(TsToken::LeftBrace) {
            let open = self.current_span();
            self.advance();
            while !self.at(TsToken::RightBrace) && !self.at_eof() {
                let spec_start = self.current_span();
                if self.at_contextual("type")
                    && self.peek_kind(1).is_identifier_name()
                    && !self.peek_is_contextual(1, "as")
                {
                    self.advance();
                }
                if !self.current().is_identifier_name() && !self.at(TsToken::String) {
                    self.expected("import specifier");
                    break;
                }
                let imported = self.take_ident();
                let local = if self.eat_contextual("as") {
                    self.expect_ident()
                } else {
                    imported.clone()
                };
                decl.named.push(ImportSpecifier {
                    imported,
                    local,
                    span: spec_start.to(self.prev_span()),
                });
                if !self.eat(TsToken::Comma) {
                    break;
                }
            }
            let close = self.current_span();
            self.expect(TsToken::RightBrace);
            decl.named_span = Some(open.to(close));
        }

        if !self.eat_contextual("from") {
            self.expected("`from`");
        }
        if self.at(TsToken::String) {
            self.read_module_specifier(&mut decl);
        } else {
            self.expected("module specifier");
        }
        if self.at_contextual("with") || self.at_contextual("assert") || self.at(TsToken::With) {
            self.advance();
            if self.at(TsToken::LeftBrace) {
                self.skip_balanced();
            }
        }
        self.eat_semicolon();
        decl.span = start.to(self.prev_span());
        Item::Import(decl)
    }

    fn read_module_specifier(&mut self, decl: &mut ImportDecl) {
        let span = self.current_span();
        let text = self.current_text();
        decl.source = crate::lexer::cook(&text[1..text.len().saturating_sub(1).max(1)]);
        decl.source_span = span;
        self.advance();
    }
}

/// A human-readable name for a token kind in "expected ..." messages.
pub(crate) fn token_description(kind: TsToken) -> &'static str {
    match kind {
        TsToken::LeftParen => "`(`",
        TsToken::RightParen => "`)`",
        TsToken::LeftBrace => "`{`",
        TsToken::RightBrace => "`}`",
        TsToken::LeftBracket => "`[`",
        TsToken::RightBracket => "`]`",
        TsToken::Semicolon => "`;`",
        TsToken::Comma => "`,`",
        TsToken::Colon => "`:`",
        TsToken::Arrow => "`=>`",
        TsToken::Eq => "`=`",
        TsToken::Gt => "`>`",
        TsToken::Class => "`class`",
        TsToken::While => "`while`",
        TsToken::Identifier => "identifier",
        _ => "token",
    }
}

#[cfg(test)]
mod tests {
    use crate::parse_source;
    use crate::ast::*;
    use ngl_diagnostics::DiagnosticSink;
    use ngl_source::FileId;

    fn parse_ok(source: &str) -> Program {
        let sink = DiagnosticSink::new();
        let program = parse_source(source, FileId::from_raw(0), &sink);
        let errors = sink.take_all();
        assert!(
            errors.is_empty(),
            "unexpected errors: {:?}",
            errors.iter().map(|e| &e.message).collect::<Vec<_>>()
        );
        program
    }

    #[test]
    fn imports() {
        let program = parse_ok(
            "import { Component, signal as s, type OnInit } from '@angular/core';\n\
             import * as rx from 'rxjs';\n\
             import Default, { a } from './x';\n\
             import './side-effect';\n\
             import type { T } from './types';",
        );
        let imports: Vec<_> = program.imports().collect();
        assert_eq!(imports.len(), 5);
        assert_eq!(imports[0].source, "@angular/core");
        assert_eq!(imports[0].named.len(), 3);
        assert_eq!(imports[0].named[1].imported.name, "signal");
        assert_eq!(imports[0].named[1].local.name, "s");
        assert_eq!(imports[0].named[2].imported.name, "OnInit");
        assert!(imports[0].imports_name("Component"));
        assert_eq!(imports[1].namespace.as_ref().unwrap().name, "rx");
        assert_eq!(imports[2].default.as_ref().unwrap().name, "Default");
        assert!(imports[3].named.is_empty());
        assert!(imports[4].type_only);
        assert!(program.import_from("./types").is_none());
    }

    #[test]
    fn type_level_declarations_are_skipped() {
        let program = parse_ok(
            "interface A { x: number; y(): void }\n\
             type B = { a: string } | null;\n\
             type C = 'a' | 'b'\n\
             export enum D { One, Two }\n\
             declare const e: number;\n\
             export type { A };\n\
             export * from './f';\n\
             const z = 1;",
        );
        let skipped = program
            .items
            .iter()
            .filter(|i| matches!(i, Item::Skipped(_)))
            .count();
        assert_eq!(skipped, 7);
        assert!(matches!(program.items.last(), Some(Item::Stmt(_))));
    }

    #[test]
    fn decorated_exported_class() {
        let program = parse_ok(
            "@Component({ selector: 'app-home', template: '<p></p>' })\n\
             export class HomePage implements OnInit, OnDestroy {\n\
             }\n",
        );
        let class = program.classes().next().unwrap();
        assert!(class.exported);
        assert_eq!(class.name.as_ref().unwrap().name, "HomePage");
        assert!(class.decorator("Component").is_some());
        let names: Vec<_> = class.implements.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["OnInit", "OnDestroy"]);
    }

    #[test]
    fn reports_garbage_and_continues() {
        let sink = DiagnosticSink::new();
        let program = parse_source("const a = ;\nclass B {}", FileId::from_raw(0), &sink);
        assert!(sink.has_errors());
        assert_eq!(program.classes().count(), 1);
    }
}
