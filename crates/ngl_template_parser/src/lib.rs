//! Parser for Angular component templates.
//!
//! Produces a [`Template`] tree of elements, text, comments and control-flow
//! blocks (`@if`, `@for`, `@switch`, `@defer`, `@let`), with every binding
//! value parsed into a [`TemplateExpr`]. The lint rules walk this tree to
//! find signal reads and Ionic attribute usages.
//!
//! # Architecture
//!
//! - **Markup** (`html`): A single-pass scanner with a stack of open
//!   elements and blocks. Elements close implicitly; blocks must close.
//! - **Expressions** ([`expr_lexer`], [`expr_parser`]): The template
//!   expression language, including pipes, safe navigation and the
//!   structural-directive microsyntax.
//! - **Relocation** ([`Relocate`]): Spans are relative to the template
//!   text; inline templates are shifted into the component file.
//!
//! Parsing is strict: a malformed template yields a
//! [`TemplateParseError`] rather than a partial tree.

#![warn(missing_docs)]

/// Template node types.
pub mod ast;
mod error;
/// Template expression AST.
pub mod expr;
/// Lexer for template expressions.
pub mod expr_lexer;
/// Parser for template expressions and microsyntax.
pub mod expr_parser;
mod html;
mod relocate;

pub use ast::{
    Attribute, AttributeBinding, AttributeKind, AttributeValue, Element, Template, TemplateNode,
};
pub use error::TemplateParseError;
pub use expr::{LiteralValue, TemplateBinaryOp, TemplateExpr, TemplateExprKind};
pub use expr_parser::TemplateBindings;
pub use relocate::Relocate;

use ngl_source::FileId;

/// Parses template text. Spans are offsets into `text`, tagged with `file`.
pub fn parse_template(text: &str, file: FileId) -> Result<Template, TemplateParseError> {
    html::HtmlParser::new(text, file).parse()
}
