//! Lexical analyzer for TypeScript source text.
//!
//! Converts source text into a sequence of [`Token`]s. Whitespace and comments
//! are skipped, but each token remembers whether a line break preceded it so
//! the parser can apply automatic semicolon insertion. A `/` is lexed as a
//! regular expression whenever the previous token cannot end an expression.
//!
//! Template literals are lexed as a single [`TsToken::Template`] token; the
//! parser splits them with [`template_segments`] and lexes each `${...}`
//! substitution separately with [`lex_range`].

use crate::token::{lookup_keyword, Token, TsToken};
use ngl_diagnostics::code::{Category, DiagnosticCode};
use ngl_diagnostics::{Diagnostic, DiagnosticSink};
use ngl_source::{FileId, Span};

/// Lexes the given TypeScript source text into a vector of tokens.
///
/// The returned vector always ends with a [`TsToken::Eof`] token. Lexer errors
/// are reported via the diagnostic sink and produce [`TsToken::Error`] tokens.
pub fn lex(source: &str, file: FileId, sink: &DiagnosticSink) -> Vec<Token> {
    lex_range(source, file, 0, source.len(), sink)
}

/// Lexes the byte range `start..end` of `source`, producing tokens with
/// file-absolute spans.
pub fn lex_range(
    source: &str,
    file: FileId,
    start: usize,
    end: usize,
    sink: &DiagnosticSink,
) -> Vec<Token> {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: start,
        end: end.min(source.len()),
        file,
        sink,
        prev: None,
        newline: false,
    };
    lexer.lex_all()
}

/// One piece of a template literal.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TemplateSegment {
    /// Literal text between the delimiters, as an absolute byte range.
    Quasi(u32, u32),
    /// The expression text inside `${` and `}`, as an absolute byte range.
    Substitution(u32, u32),
}

/// Splits the template literal token at `span` into its segments.
///
/// Quasis and substitutions alternate, starting and ending with a quasi.
pub fn template_segments(source: &str, span: Span) -> Vec<TemplateSegment> {
    let bytes = &source.as_bytes()[..(span.end as usize).min(source.len())];
    scan_template(bytes, span.start as usize).segments
}

/// Decodes the escape sequences of a string or template literal body.
pub fn cook(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push('\\');
            break;
        };
        match esc {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !chars.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push('x');
                        out.push_str(&hex);
                    }
                }
            }
            'u' => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    let h: String = chars.by_ref().take_while(|c| *c != '}').collect();
                    h
                } else {
                    chars.by_ref().take(4).collect()
                };
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push('u');
                        out.push_str(&hex);
                    }
                }
            }
            other => out.push(other),
        }
    }
    out
}

struct TemplateScan {
    /// Index just past the closing backtick (or the end of input).
    end: usize,
    segments: Vec<TemplateSegment>,
    terminated: bool,
}

/// Scans a template literal whose opening backtick is at `open`.
fn scan_template(bytes: &[u8], open: usize) -> TemplateScan {
    let mut segments = Vec::new();
    let mut i = open + 1;
    let mut quasi_start = i;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                segments.push(TemplateSegment::Quasi(quasi_start as u32, i as u32));
                return TemplateScan {
                    end: i + 1,
                    segments,
                    terminated: true,
                };
            }
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                segments.push(TemplateSegment::Quasi(quasi_start as u32, i as u32));
                let sub_start = i + 2;
                let close = skip_balanced_brace(bytes, sub_start);
                segments.push(TemplateSegment::Substitution(
                    sub_start as u32,
                    close.min(bytes.len()) as u32,
                ));
                i = close + 1;
                quasi_start = i;
            }
            _ => i += 1,
        }
    }
    let len = bytes.len();
    segments.push(TemplateSegment::Quasi(quasi_start.min(len) as u32, len as u32));
    TemplateScan {
        end: len,
        segments,
        terminated: false,
    }
}

/// Returns the index of the `}` closing a substitution that starts at `i`.
fn skip_balanced_brace(bytes: &[u8], mut i: usize) -> usize {
    let mut depth = 1usize;
    while i < bytes.len() {
        match bytes[i] {
            q @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() && bytes[i] != q && bytes[i] != b'\n' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'`' => {
                i = scan_template(bytes, i).end;
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    end: usize,
    file: FileId,
    sink: &'a DiagnosticSink,
    prev: Option<TsToken>,
    newline: bool,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        if self.pos == 0 && self.peek() == b'#' && self.peek_at(1) == b'!' {
            while self.pos < self.end && self.source[self.pos] != b'\n' {
                self.pos += 1;
            }
        }
        loop {
            self.skip_whitespace_and_comments();
            if self.pos >= self.end {
                tokens.push(Token {
                    kind: TsToken::Eof,
                    span: Span::new(self.file, self.end as u32, self.end as u32),
                    newline_before: true,
                });
                break;
            }
            let newline_before = std::mem::take(&mut self.newline);
            let (kind, span) = self.next_token();
            self.prev = Some(kind);
            tokens.push(Token {
                kind,
                span,
                newline_before,
            });
        }
        tokens
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        let idx = self.pos + offset;
        if idx < self.end {
            self.source[idx]
        } else {
            0
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(self.file, start as u32, self.pos as u32)
    }

    fn error(&self, msg: &str, span: Span) {
        self.sink.emit(
            Diagnostic::error(DiagnosticCode::new(Category::Error, 101), msg, span)
                .with_message_id("lexError"),
        );
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.end {
                let b = self.source[self.pos];
                if b == b'\n' || b == b'\r' {
                    self.newline = true;
                    self.pos += 1;
                } else if b.is_ascii_whitespace() {
                    self.pos += 1;
                } else if self.source[self.pos..self.end].starts_with("\u{feff}".as_bytes()) {
                    self.pos += 3;
                } else if self.source[self.pos..self.end].starts_with("\u{a0}".as_bytes()) {
                    self.pos += 2;
                } else {
                    break;
                }
            }
            if self.pos >= self.end {
                return;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'/' {
                while self.pos < self.end && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'*' {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.pos >= self.end {
                        self.error("unterminated block comment", self.span_from(start));
                        break;
                    }
                    if self.source[self.pos] == b'\n' {
                        self.newline = true;
                    }
                    if self.source[self.pos] == b'*' && self.peek_at(1) == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }
            return;
        }
    }

    fn next_token(&mut self) -> (TsToken, Span) {
        let start = self.pos;
        let b = self.peek();

        if is_ident_start(b) || b == b'\\' {
            return self.lex_identifier(start);
        }
        if b.is_ascii_digit() || (b == b'.' && self.peek_at(1).is_ascii_digit()) {
            return self.lex_number(start);
        }
        match b {
            b'\'' | b'"' => return self.lex_string(start, b),
            b'`' => return self.lex_template(start),
            b'#' if is_ident_start(self.peek_at(1)) => {
                self.pos += 1;
                while self.pos < self.end && is_ident_continue(self.source[self.pos]) {
                    self.pos += 1;
                }
                return (TsToken::PrivateName, self.span_from(start));
            }
            b'/' if !self.prev.is_some_and(TsToken::ends_expression) => {
                return self.lex_regex(start);
            }
            _ => {}
        }
        self.lex_punct(start)
    }

    fn lex_identifier(&mut self, start: usize) -> (TsToken, Span) {
        while self.pos < self.end {
            let b = self.source[self.pos];
            if is_ident_continue(b) {
                self.pos += 1;
            } else if b == b'\\' && self.peek_at(1) == b'u' {
                self.pos += 2;
            } else {
                break;
            }
        }
        let span = self.span_from(start);
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("");
        // Reserved words after a dot are plain property names (`this.delete()`).
        let kind = match lookup_keyword(text) {
            Some(_) if self.prev == Some(TsToken::Dot) || self.prev == Some(TsToken::QuestionDot) => {
                TsToken::Identifier
            }
            Some(kw) => kw,
            None => TsToken::Identifier,
        };
        (kind, span)
    }

    fn lex_number(&mut self, start: usize) -> (TsToken, Span) {
        if self.peek() == b'0' && matches!(self.peek_at(1), b'x' | b'X' | b'o' | b'O' | b'b' | b'B') {
            self.pos += 2;
            while self.pos < self.end && (self.source[self.pos].is_ascii_hexdigit() || self.source[self.pos] == b'_') {
                self.pos += 1;
            }
        } else {
            self.eat_digits();
            if self.peek() == b'.' {
                self.pos += 1;
                self.eat_digits();
            }
            if matches!(self.peek(), b'e' | b'E') {
                let sign = usize::from(matches!(self.peek_at(1), b'+' | b'-'));
                if self.peek_at(1 + sign).is_ascii_digit() {
                    self.pos += 1 + sign;
                    self.eat_digits();
                }
            }
        }
        if self.peek() == b'n' {
            self.pos += 1;
        }
        if is_ident_start(self.peek()) {
            let err_start = self.pos;
            while self.pos < self.end && is_ident_continue(self.source[self.pos]) {
                self.pos += 1;
            }
            self.error(
                "identifier directly after numeric literal",
                self.span_from(err_start),
            );
            return (TsToken::Error, self.span_from(start));
        }
        (TsToken::Number, self.span_from(start))
    }

    fn eat_digits(&mut self) {
        while self.pos < self.end && (self.source[self.pos].is_ascii_digit() || self.source[self.pos] == b'_') {
            self.pos += 1;
        }
    }

    fn lex_string(&mut self, start: usize, quote: u8) -> (TsToken, Span) {
        self.pos += 1;
        loop {
            if self.pos >= self.end || self.source[self.pos] == b'\n' {
                self.error("unterminated string literal", self.span_from(start));
                return (TsToken::Error, self.span_from(start));
            }
            match self.source[self.pos] {
                b'\\' => {
                    // Line continuations keep the literal open.
                    if self.peek_at(1) == b'\r' && self.peek_at(2) == b'\n' {
                        self.pos += 3;
                    } else {
                        self.pos += 2;
                    }
                }
                b if b == quote => {
                    self.pos += 1;
                    return (TsToken::String, self.span_from(start));
                }
                _ => self.pos += 1,
            }
        }
    }

    fn lex_template(&mut self, start: usize) -> (TsToken, Span) {
        let scan = scan_template(&self.source[..self.end], start);
        self.pos = scan.end;
        if !scan.terminated {
            self.error("unterminated template literal", self.span_from(start));
            return (TsToken::Error, self.span_from(start));
        }
        (TsToken::Template, self.span_from(start))
    }

    fn lex_regex(&mut self, start: usize) -> (TsToken, Span) {
        self.pos += 1;
        let mut in_class = false;
        loop {
            if self.pos >= self.end || self.source[self.pos] == b'\n' {
                self.error("unterminated regular expression", self.span_from(start));
                return (TsToken::Error, self.span_from(start));
            }
            match self.source[self.pos] {
                b'\\' => self.pos += 2,
                b'[' => {
                    in_class = true;
                    self.pos += 1;
                }
                b']' => {
                    in_class = false;
                    self.pos += 1;
                }
                b'/' if !in_class => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        while self.pos < self.end && is_ident_continue(self.source[self.pos]) {
            self.pos += 1;
        }
        (TsToken::Regex, self.span_from(start))
    }

    fn lex_punct(&mut self, start: usize) -> (TsToken, Span) {
        let (kind, len) = match (self.peek(), self.peek_at(1), self.peek_at(2), self.peek_at(3)) {
            (b'.', b'.', b'.', _) => (TsToken::DotDotDot, 3),
            (b'.', ..) => (TsToken::Dot, 1),
            (b'(', ..) => (TsToken::LeftParen, 1),
            (b')', ..) => (TsToken::RightParen, 1),
            (b'{', ..) => (TsToken::LeftBrace, 1),
            (b'}', ..) => (TsToken::RightBrace, 1),
            (b'[', ..) => (TsToken::LeftBracket, 1),
            (b']', ..) => (TsToken::RightBracket, 1),
            (b';', ..) => (TsToken::Semicolon, 1),
            (b',', ..) => (TsToken::Comma, 1),
            (b':', ..) => (TsToken::Colon, 1),
            (b'@', ..) => (TsToken::At, 1),
            (b'~', ..) => (TsToken::Tilde, 1),
            (b'?', b'?', b'=', _) => (TsToken::QuestionQuestionEq, 3),
            (b'?', b'?', ..) => (TsToken::QuestionQuestion, 2),
            (b'?', b'.', d, _) if !d.is_ascii_digit() => (TsToken::QuestionDot, 2),
            (b'?', ..) => (TsToken::Question, 1),
            (b'=', b'=', b'=', _) => (TsToken::EqEqEq, 3),
            (b'=', b'=', ..) => (TsToken::EqEq, 2),
            (b'=', b'>', ..) => (TsToken::Arrow, 2),
            (b'=', ..) => (TsToken::Eq, 1),
            (b'!', b'=', b'=', _) => (TsToken::BangEqEq, 3),
            (b'!', b'=', ..) => (TsToken::BangEq, 2),
            (b'!', ..) => (TsToken::Bang, 1),
            (b'<', b'<', b'=', _) => (TsToken::LtLtEq, 3),
            (b'<', b'<', ..) => (TsToken::LtLt, 2),
            (b'<', b'=', ..) => (TsToken::LtEq, 2),
            (b'<', ..) => (TsToken::Lt, 1),
            (b'>', ..) => (TsToken::Gt, 1),
            (b'+', b'+', ..) => (TsToken::PlusPlus, 2),
            (b'+', b'=', ..) => (TsToken::PlusEq, 2),
            (b'+', ..) => (TsToken::Plus, 1),
            (b'-', b'-', ..) => (TsToken::MinusMinus, 2),
            (b'-', b'=', ..) => (TsToken::MinusEq, 2),
            (b'-', ..) => (TsToken::Minus, 1),
            (b'*', b'*', b'=', _) => (TsToken::StarStarEq, 3),
            (b'*', b'*', ..) => (TsToken::StarStar, 2),
            (b'*', b'=', ..) => (TsToken::StarEq, 2),
            (b'*', ..) => (TsToken::Star, 1),
            (b'/', b'=', ..) => (TsToken::SlashEq, 2),
            (b'/', ..) => (TsToken::Slash, 1),
            (b'%', b'=', ..) => (TsToken::PercentEq, 2),
            (b'%', ..) => (TsToken::Percent, 1),
            (b'&', b'&', b'=', _) => (TsToken::AmpAmpEq, 3),
            (b'&', b'&', ..) => (TsToken::AmpAmp, 2),
            (b'&', b'=', ..) => (TsToken::AmpEq, 2),
            (b'&', ..) => (TsToken::Amp, 1),
            (b'|', b'|', b'=', _) => (TsToken::PipePipeEq, 3),
            (b'|', b'|', ..) => (TsToken::PipePipe, 2),
            (b'|', b'=', ..) => (TsToken::PipeEq, 2),
            (b'|', ..) => (TsToken::Pipe, 1),
            (b'^', b'=', ..) => (TsToken::CaretEq, 2),
            (b'^', ..) => (TsToken::Caret, 1),
            _ => {
                // Skip one whole UTF-8 character.
                let width = match self.peek() {
                    b if b >= 0xf0 => 4,
                    b if b >= 0xe0 => 3,
                    b if b >= 0xc0 => 2,
                    _ => 1,
                };
                self.pos = (self.pos + width).min(self.end);
                let span = self.span_from(start);
                self.error("unexpected character", span);
                return (TsToken::Error, span);
            }
        };
        self.pos += len;
        (kind, self.span_from(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_str(source: &str) -> Vec<Token> {
        let sink = DiagnosticSink::new();
        let tokens = lex(source, FileId::from_raw(0), &sink);
        assert!(!sink.has_errors(), "unexpected lex errors: {:?}", sink.take_all());
        tokens
    }

    fn kinds(source: &str) -> Vec<TsToken> {
        lex_str(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn class_member_tokens() {
        assert_eq!(
            kinds("readonly count = signal(0);"),
            vec![
                TsToken::Identifier,
                TsToken::Identifier,
                TsToken::Eq,
                TsToken::Identifier,
                TsToken::LeftParen,
                TsToken::Number,
                TsToken::RightParen,
                TsToken::Semicolon,
                TsToken::Eof,
            ]
        );
    }

    #[test]
    fn private_names_and_optional_chaining() {
        assert_eq!(
            kinds("this.#count?.x ?? y"),
            vec![
                TsToken::This,
                TsToken::Dot,
                TsToken::PrivateName,
                TsToken::QuestionDot,
                TsToken::Identifier,
                TsToken::QuestionQuestion,
                TsToken::Identifier,
                TsToken::Eof,
            ]
        );
    }

    #[test]
    fn ternary_with_decimal_is_not_optional_chain() {
        assert_eq!(
            kinds("a?.5:1"),
            vec![
                TsToken::Identifier,
                TsToken::Question,
                TsToken::Number,
                TsToken::Colon,
                TsToken::Number,
                TsToken::Eof,
            ]
        );
    }

    #[test]
    fn greater_than_is_always_single() {
        assert_eq!(
            kinds("a >>= b"),
            vec![TsToken::Identifier, TsToken::Gt, TsToken::Gt, TsToken::Eq, TsToken::Identifier, TsToken::Eof]
        );
    }

    #[test]
    fn keyword_after_dot_is_identifier() {
        assert_eq!(
            kinds("this.default"),
            vec![TsToken::This, TsToken::Dot, TsToken::Identifier, TsToken::Eof]
        );
    }

    #[test]
    fn newline_flags() {
        let tokens = lex_str("a\nb /* x\n */ c");
        assert!(!tokens[0].newline_before);
        assert!(tokens[1].newline_before);
        assert!(tokens[2].newline_before);
    }

    #[test]
    fn regex_versus_division() {
        assert_eq!(
            kinds("x = a / b"),
            vec![TsToken::Identifier, TsToken::Eq, TsToken::Identifier, TsToken::Slash, TsToken::Identifier, TsToken::Eof]
        );
        assert_eq!(
            kinds("x = /a[/]b/g"),
            vec![TsToken::Identifier, TsToken::Eq, TsToken::Regex, TsToken::Eof]
        );
    }

    #[test]
    fn template_is_one_token() {
        let tokens = lex_str("`a ${ {b: `c${d}`}.b } e` + 1");
        assert_eq!(tokens[0].kind, TsToken::Template);
        assert_eq!(tokens[1].kind, TsToken::Plus);
    }

    #[test]
    fn template_segments_split() {
        let src = "`a${x}b${y}`";
        let tokens = lex_str(src);
        let segs = template_segments(src, tokens[0].span);
        assert_eq!(
            segs,
            vec![
                TemplateSegment::Quasi(1, 2),
                TemplateSegment::Substitution(4, 5),
                TemplateSegment::Quasi(6, 7),
                TemplateSegment::Substitution(9, 10),
                TemplateSegment::Quasi(11, 11),
            ]
        );
    }

    #[test]
    fn lex_range_uses_absolute_spans() {
        let src = "`${this.a}`";
        let sink = DiagnosticSink::new();
        let tokens = lex_range(src, FileId::from_raw(0), 3, 9, &sink);
        assert_eq!(tokens[0].kind, TsToken::This);
        assert_eq!(tokens[0].span.start, 3);
        assert_eq!(tokens[2].span, Span::new(FileId::from_raw(0), 8, 9));
        assert_eq!(tokens[3].kind, TsToken::Eof);
    }

    #[test]
    fn cook_escapes() {
        assert_eq!(cook(r"a\nb"), "a\nb");
        assert_eq!(cook(r"A\u{42}\x43"), "ABC");
        assert_eq!(cook(r"it\'s"), "it's");
        assert_eq!(cook("plain"), "plain");
    }

    #[test]
    fn numbers() {
        assert_eq!(kinds("0x1F 1_000 1.5e3 10n .5"), vec![TsToken::Number; 5].into_iter().chain([TsToken::Eof]).collect::<Vec<_>>());
    }

    #[test]
    fn unterminated_string_reports() {
        let sink = DiagnosticSink::new();
        let tokens = lex("'abc\n", FileId::from_raw(0), &sink);
        assert_eq!(tokens[0].kind, TsToken::Error);
        assert!(sink.has_errors());
    }
}
