//! Token types for the TypeScript lexer.
//!
//! Reserved words get their own [`TsToken`] variant. Contextual keywords
//! (`readonly`, `implements`, `as`, `async`, `get`, ...) are lexed as
//! [`TsToken::Identifier`] and recognized by the parser from the token text,
//! because each of them is also a valid member or variable name.

use ngl_source::Span;
use serde::{Deserialize, Serialize};

/// A TypeScript token kind.
///
/// Literal values are not stored in the token; they are retrieved from the
/// source text using the token's span.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TsToken {
    // === Reserved words ===
    /// `break`
    Break,
    /// `case`
    Case,
    /// `catch`
    Catch,
    /// `class`
    Class,
    /// `const`
    Const,
    /// `continue`
    Continue,
    /// `debugger`
    Debugger,
    /// `default`
    Default,
    /// `delete`
    Delete,
    /// `do`
    Do,
    /// `else`
    Else,
    /// `enum`
    Enum,
    /// `export`
    Export,
    /// `extends`
    Extends,
    /// `false`
    False,
    /// `finally`
    Finally,
    /// `for`
    For,
    /// `function`
    Function,
    /// `if`
    If,
    /// `import`
    Import,
    /// `in`
    In,
    /// `instanceof`
    Instanceof,
    /// `let`
    Let,
    /// `new`
    New,
    /// `null`
    Null,
    /// `return`
    Return,
    /// `super`
    Super,
    /// `switch`
    Switch,
    /// `this`
    This,
    /// `throw`
    Throw,
    /// `true`
    True,
    /// `try`
    Try,
    /// `typeof`
    Typeof,
    /// `var`
    Var,
    /// `void`
    Void,
    /// `while`
    While,
    /// `with`
    With,

    // === Literals and names ===
    /// An identifier or contextual keyword.
    Identifier,
    /// A `#name` private identifier.
    PrivateName,
    /// A numeric literal (decimal, hex, octal, binary, bigint).
    Number,
    /// A single- or double-quoted string literal.
    String,
    /// A complete template literal, substitutions included.
    Template,
    /// A regular expression literal.
    Regex,

    // === Punctuation ===
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `...`
    DotDotDot,
    /// `?`
    Question,
    /// `?.`
    QuestionDot,
    /// `??`
    QuestionQuestion,
    /// `??=`
    QuestionQuestionEq,
    /// `:`
    Colon,
    /// `=>`
    Arrow,
    /// `@`
    At,

    // === Operators ===
    /// `=`
    Eq,
    /// `==`
    EqEq,
    /// `===`
    EqEqEq,
    /// `!=`
    BangEq,
    /// `!==`
    BangEqEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`; `>>`, `>=` and friends are assembled by the parser from adjacent tokens.
    Gt,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    StarStar,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `<<`
    LtLt,
    /// `&`
    Amp,
    /// `&&`
    AmpAmp,
    /// `|`
    Pipe,
    /// `||`
    PipePipe,
    /// `^`
    Caret,
    /// `!`
    Bang,
    /// `~`
    Tilde,
    /// `+=`
    PlusEq,
    /// `-=`
    MinusEq,
    /// `*=`
    StarEq,
    /// `**=`
    StarStarEq,
    /// `/=`
    SlashEq,
    /// `%=`
    PercentEq,
    /// `<<=`
    LtLtEq,
    /// `&=`
    AmpEq,
    /// `&&=`
    AmpAmpEq,
    /// `|=`
    PipeEq,
    /// `||=`
    PipePipeEq,
    /// `^=`
    CaretEq,

    // === Special ===
    /// A character sequence the lexer could not understand.
    Error,
    /// End of input.
    Eof,
}

impl TsToken {
    /// Returns `true` if this token is a reserved word.
    pub fn is_keyword(self) -> bool {
        (self as u8) <= (TsToken::With as u8)
    }

    /// Returns `true` if the token can be used as a property name after `.`
    /// or as an object/class member key.
    pub fn is_identifier_name(self) -> bool {
        self == TsToken::Identifier || self.is_keyword()
    }

    /// Returns `true` if a `/` following this token is a division operator
    /// rather than the start of a regular expression.
    pub fn ends_expression(self) -> bool {
        matches!(
            self,
            TsToken::Identifier
                | TsToken::PrivateName
                | TsToken::Number
                | TsToken::String
                | TsToken::Template
                | TsToken::Regex
                | TsToken::This
                | TsToken::Super
                | TsToken::True
                | TsToken::False
                | TsToken::Null
                | TsToken::RightParen
                | TsToken::RightBracket
                | TsToken::RightBrace
                | TsToken::PlusPlus
                | TsToken::MinusMinus
        )
    }
}

/// A token with its kind and source location.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Token {
    /// The kind of token.
    pub kind: TsToken,
    /// The source span of the token text.
    pub span: Span,
    /// Whether a line terminator separates this token from the previous one.
    ///
    /// Drives automatic semicolon insertion and the restricted productions
    /// (`return`, postfix `++`/`--`).
    pub newline_before: bool,
}

/// Looks up a reserved word from its text.
pub fn lookup_keyword(text: &str) -> Option<TsToken> {
    match text {
        "break" => Some(TsToken::Break),
        "case" => Some(TsToken::Case),
        "catch" => Some(TsToken::Catch),
        "class" => Some(TsToken::Class),
        "const" => Some(TsToken::Const),
        "continue" => Some(TsToken::Continue),
        "debugger" => Some(TsToken::Debugger),
        "default" => Some(TsToken::Default),
        "delete" => Some(TsToken::Delete),
        "do" => Some(TsToken::Do),
        "else" => Some(TsToken::Else),
        "enum" => Some(TsToken::Enum),
        "export" => Some(TsToken::Export),
        "extends" => Some(TsToken::Extends),
        "false" => Some(TsToken::False),
        "finally" => Some(TsToken::Finally),
        "for" => Some(TsToken::For),
        "function" => Some(TsToken::Function),
        "if" => Some(TsToken::If),
        "import" => Some(TsToken::Import),
        "in" => Some(TsToken::In),
        "instanceof" => Some(TsToken::Instanceof),
        "let" => Some(TsToken::Let),
        "new" => Some(TsToken::New),
        "null" => Some(TsToken::Null),
        "return" => Some(TsToken::Return),
        "super" => Some(TsToken::Super),
        "switch" => Some(TsToken::Switch),
        "this" => Some(TsToken::This),
        "throw" => Some(TsToken::Throw),
        "true" => Some(TsToken::True),
        "try" => Some(TsToken::Try),
        "typeof" => Some(TsToken::Typeof),
        "var" => Some(TsToken::Var),
        "void" => Some(TsToken::Void),
        "while" => Some(TsToken::While),
        "with" => Some(TsToken::With),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup() {
        assert_eq!(lookup_keyword("class"), Some(TsToken::Class));
        assert_eq!(lookup_keyword("this"), Some(TsToken::This));
        assert_eq!(lookup_keyword("Class"), None);
    }

    #[test]
    fn contextual_keywords_are_identifiers() {
        assert_eq!(lookup_keyword("readonly"), None);
        assert_eq!(lookup_keyword("implements"), None);
        assert_eq!(lookup_keyword("async"), None);
        assert_eq!(lookup_keyword("as"), None);
    }

    #[test]
    fn keyword_ranges() {
        assert!(TsToken::Break.is_keyword());
        assert!(TsToken::With.is_keyword());
        assert!(!TsToken::Identifier.is_keyword());
        assert!(TsToken::Default.is_identifier_name());
        assert!(!TsToken::Dot.is_identifier_name());
    }

    #[test]
    fn regex_context() {
        assert!(TsToken::RightParen.ends_expression());
        assert!(TsToken::Identifier.ends_expression());
        assert!(!TsToken::Return.ends_expression());
        assert!(!TsToken::Eq.ends_expression());
    }
}
