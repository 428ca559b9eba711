//! Hand-rolled recursive descent parser for the TypeScript used in Angular
//! component sources.
//!
//! The parser builds a full AST for classes, statements and expressions,
//! which the lint rules walk, while type annotations, interfaces, type
//! aliases, enums and ambient declarations are skipped and kept only as
//! spans. The main entry point is [`parse_file`].
//!
//! # Architecture
//!
//! - **Lexer** ([`lexer`]): Converts source text to tokens, including
//!   regular expression literals and whole template literals.
//! - **Parser** ([`parser`]): Recursive descent parser with Pratt expression
//!   parsing and statement-level error recovery.
//! - **AST** ([`ast`]): All AST node types with spans and serde support.

#![warn(missing_docs)]

/// AST node types for the TypeScript parser.
pub mod ast;
mod decl;
mod expr;
/// Lexical analyzer for TypeScript source text.
pub mod lexer;
/// Recursive descent parser for TypeScript with error recovery.
pub mod parser;
mod stmt;
/// Token types for the TypeScript lexer.
pub mod token;

pub use ast::Program;
pub use parser::TsParser;
pub use token::{Token, TsToken};

use ngl_diagnostics::DiagnosticSink;
use ngl_source::{FileId, SourceDb};

/// Parses a TypeScript source file into an AST.
///
/// Errors are reported to the diagnostic sink and represented as `Error`
/// variants in the AST.
pub fn parse_file(file_id: FileId, source_db: &SourceDb, sink: &DiagnosticSink) -> Program {
    let file = source_db.get_file(file_id);
    parse_source(&file.content, file_id, sink)
}

/// Parses TypeScript source text that is not registered in a [`SourceDb`].
pub fn parse_source(source: &str, file: FileId, sink: &DiagnosticSink) -> Program {
    let tokens = lexer::lex(source, file, sink);
    let mut parser = TsParser::new(tokens, source, file, sink);
    parser.parse_program()
}

/// Parses a single expression spanning the whole of `source`.
pub fn parse_expression(source: &str, file: FileId, sink: &DiagnosticSink) -> ast::Expr {
    let tokens = lexer::lex(source, file, sink);
    let mut parser = TsParser::new(tokens, source, file, sink);
    let expr = parser.parse_expr();
    if !parser.at_eof() {
        parser.expected("end of expression");
    }
    expr
}
