//! Token-level scanning of `.d.ts` declaration files.
//!
//! Declarations are not parsed into a tree. The scanner walks the
//! TypeScript token stream and slices type text straight out of the source,
//! which is all the classifier needs.

use ngl_diagnostics::DiagnosticSink;
use ngl_source::FileId;
use ngl_ts_parser::lexer::lex;
use ngl_ts_parser::{Token, TsToken};
use std::collections::{HashMap, HashSet};

/// What one declaration file contributes to name resolution.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DtsModule {
    /// Top-level `type Name = ...` aliases, name to right-hand side text.
    pub aliases: HashMap<String, String>,
    /// Top-level interface, class and enum names.
    pub declarations: HashSet<String>,
    /// Module specifiers from `import`/`export ... from` and `import("...")`.
    pub references: Vec<String>,
}

/// One `interface IonXxx { ... }` from `namespace Components`.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentInterface {
    /// The interface name.
    pub name: String,
    /// Property signatures in declaration order.
    pub props: Vec<PropSignature>,
}

/// A property signature and its type text.
#[derive(Clone, Debug, PartialEq)]
pub struct PropSignature {
    /// The property name, unquoted.
    pub name: String,
    /// The type annotation as written.
    pub type_text: String,
}

struct Scanner<'a> {
    text: &'a str,
    toks: Vec<Token>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        // Lexer errors only matter for linted sources; declaration files are
        // scanned best-effort.
        let sink = DiagnosticSink::new();
        Self {
            text,
            toks: lex(text, FileId::DUMMY, &sink),
        }
    }

    fn kind(&self, i: usize) -> TsToken {
        self.toks.get(i).map_or(TsToken::Eof, |t| t.kind)
    }

    fn slice(&self, i: usize) -> &'a str {
        match self.toks.get(i) {
            Some(t) => self
                .text
                .get(t.span.start as usize..t.span.end as usize)
                .unwrap_or(""),
            None => "",
        }
    }

    fn is_word(&self, i: usize, word: &str) -> bool {
        self.kind(i) == TsToken::Identifier && self.slice(i) == word
    }

    fn string_value(&self, i: usize) -> Option<String> {
        if self.kind(i) != TsToken::String {
            return None;
        }
        let raw = self.slice(i);
        raw.get(1..raw.len().saturating_sub(1)).map(str::to_string)
    }

    /// Source text from the start of token `from` to the end of token `to`.
    fn text_between(&self, from: usize, to: usize) -> String {
        match (self.toks.get(from), self.toks.get(to)) {
            (Some(a), Some(b)) if from <= to => self
                .text
                .get(a.span.start as usize..b.span.end as usize)
                .unwrap_or("")
                .to_string(),
            _ => String::new(),
        }
    }

    /// Skips a `<...>` parameter list starting at `i`; returns the index after it.
    fn skip_angle(&self, mut i: usize) -> usize {
        if self.kind(i) != TsToken::Lt {
            return i;
        }
        let mut depth = 0usize;
        loop {
            match self.kind(i) {
                TsToken::Lt => depth += 1,
                TsToken::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        return i + 1;
                    }
                }
                TsToken::Eof => return i,
                _ => {}
            }
            i += 1;
        }
    }

    /// Finds the last token of a type starting at `i`: the token before a
    /// `;` or `,`/closing bracket at nesting depth zero.
    fn type_end(&self, start: usize) -> usize {
        let mut depth = 0usize;
        let mut i = start;
        loop {
            match self.kind(i) {
                TsToken::LeftParen | TsToken::LeftBracket | TsToken::LeftBrace | TsToken::Lt => {
                    depth += 1
                }
                TsToken::RightParen
                | TsToken::RightBracket
                | TsToken::RightBrace
                | TsToken::Gt => {
                    if depth == 0 {
                        return i.saturating_sub(1);
                    }
                    depth -= 1;
                }
                TsToken::Semicolon | TsToken::Comma if depth == 0 => {
                    return i.saturating_sub(1)
                }
                TsToken::Eof => return i.saturating_sub(1),
                _ => {}
            }
            i += 1;
        }
    }

    /// Index of the `}` matching the `{` at `open`.
    fn matching_brace(&self, open: usize) -> usize {
        let mut depth = 0usize;
        let mut i = open;
        loop {
            match self.kind(i) {
                TsToken::LeftBrace => depth += 1,
                TsToken::RightBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return i;
                    }
                }
                TsToken::Eof => return i,
                _ => {}
            }
            i += 1;
        }
    }
}

/// Scans a declaration file for aliases, declarations and module references.
pub fn scan_module(text: &str) -> DtsModule {
    let s = Scanner::new(text);
    let mut module = DtsModule::default();
    let mut depth = 0usize;
    let mut i = 0;
    while s.kind(i) != TsToken::Eof {
        match s.kind(i) {
            TsToken::LeftBrace => depth += 1,
            TsToken::RightBrace => depth = depth.saturating_sub(1),
            TsToken::Identifier if s.slice(i) == "from" => {
                if let Some(spec) = s.string_value(i + 1) {
                    module.references.push(spec);
                }
            }
            TsToken::Import if s.kind(i + 1) == TsToken::LeftParen => {
                if let Some(spec) = s.string_value(i + 2) {
                    module.references.push(spec);
                }
            }
            TsToken::Identifier
                if depth == 0 && s.slice(i) == "type" && s.kind(i + 1) == TsToken::Identifier =>
            {
                let name = s.slice(i + 1).to_string();
                let eq = s.skip_angle(i + 2);
                if s.kind(eq) == TsToken::Eq {
                    let end = s.type_end(eq + 1);
                    module.aliases.insert(name, s.text_between(eq + 1, end));
                }
            }
            TsToken::Class | TsToken::Enum if depth == 0 => {
                if s.kind(i + 1) == TsToken::Identifier {
                    module.declarations.insert(s.slice(i + 1).to_string());
                }
            }
            TsToken::Identifier
                if depth == 0 && s.slice(i) == "interface" && s.kind(i + 1) == TsToken::Identifier =>
            {
                module.declarations.insert(s.slice(i + 1).to_string());
            }
            _ => {}
        }
        i += 1;
    }
    module
}

/// Extracts the component interfaces of `namespace Components`.
///
/// Returns `None` when the namespace is absent.
pub fn scan_components(text: &str) -> Option<Vec<ComponentInterface>> {
    let s = Scanner::new(text);
    let mut i = 0;
    let open = loop {
        match s.kind(i) {
            TsToken::Eof => return None,
            TsToken::Identifier
                if s.slice(i) == "namespace"
                    && s.is_word(i + 1, "Components")
                    && s.kind(i + 2) == TsToken::LeftBrace =>
            {
                break i + 2;
            }
            _ => i += 1,
        }
    };
    let close = s.matching_brace(open);

    let mut interfaces = Vec::new();
    let mut i = open + 1;
    while i < close {
        if s.is_word(i, "interface") && s.kind(i + 1) == TsToken::Identifier {
            let name = s.slice(i + 1).to_string();
            let mut body = i + 2;
            while body < close && s.kind(body) != TsToken::LeftBrace {
                body += 1;
            }
            let body_end = s.matching_brace(body);
            interfaces.push(ComponentInterface {
                name,
                props: scan_members(&s, body + 1, body_end),
            });
            i = body_end + 1;
        } else if s.kind(i) == TsToken::LeftBrace {
            i = s.matching_brace(i) + 1;
        } else {
            i += 1;
        }
    }
    Some(interfaces)
}

fn scan_members(s: &Scanner<'_>, start: usize, end: usize) -> Vec<PropSignature> {
    let mut props = Vec::new();
    let mut i = start;
    while i < end {
        match s.kind(i) {
            TsToken::Semicolon | TsToken::Comma => {
                i += 1;
                continue;
            }
            _ => {}
        }
        if s.is_word(i, "readonly") && matches!(s.kind(i + 1), TsToken::String | TsToken::Identifier) {
            i += 1;
        }
        let name = match s.kind(i) {
            TsToken::String => s.string_value(i),
            k if k.is_identifier_name() => Some(s.slice(i).to_string()),
            _ => None,
        };
        let mut next = i + 1;
        if s.kind(next) == TsToken::Question {
            next += 1;
        }
        match (name, s.kind(next)) {
            (Some(name), TsToken::Colon) => {
                let type_end = s.type_end(next + 1);
                props.push(PropSignature {
                    name,
                    type_text: s.text_between(next + 1, type_end),
                });
                i = type_end + 1;
            }
            _ => {
                // Method or index signature.
                i = (s.type_end(i) + 1).max(i + 1);
            }
        }
    }
    props
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENTS: &str = r#"
import { Color, Mode } from "./interface";
import { AnimationBuilder } from "./utils/animation/animation-interface";
export { SpinnerTypes } from "./components/spinner/spinner-configs";
export namespace Components {
    interface IonItem {
        /**
          * If `true`, a button tag will be rendered.
         */
        "button": boolean;
        "color"?: Color;
        "lines"?: 'full' | 'inset' | 'none';
        "routerAnimation"?: AnimationBuilder | undefined;
    }
    interface IonModal {
        "dismiss": (data?: any, role?: string) => Promise<boolean>;
        "present": () => Promise<void>;
        "breakpoints"?: number[];
    }
    interface IonProgressBar {
        "value": number;
    }
}
declare namespace LocalJSX {
    interface IonItem {
        "onIonFocus"?: (event: CustomEvent<void>) => void;
    }
}
"#;

    #[test]
    fn components_namespace() {
        let interfaces = scan_components(COMPONENTS).unwrap();
        let names: Vec<_> = interfaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["IonItem", "IonModal", "IonProgressBar"]);
        let item = &interfaces[0];
        assert_eq!(item.props.len(), 4);
        assert_eq!(item.props[0].name, "button");
        assert_eq!(item.props[0].type_text, "boolean");
        assert_eq!(item.props[2].type_text, "'full' | 'inset' | 'none'");
        assert_eq!(item.props[3].type_text, "AnimationBuilder | undefined");
        let modal = &interfaces[1];
        assert_eq!(modal.props[0].type_text, "(data?: any, role?: string) => Promise<boolean>");
        assert_eq!(modal.props[2].type_text, "number[]");
    }

    #[test]
    fn missing_namespace() {
        assert!(scan_components("export interface Foo {}").is_none());
    }

    #[test]
    fn module_aliases_and_references() {
        let module = scan_module(
            r#"
export * from "./components/alert/alert-interface";
export { Mode } from './global';
export declare type PredefinedColors = 'primary' | 'secondary';
export type Color = PredefinedColors | string;
export type LiteralUnion<T extends U, U = string> = T | (U & Record<never, never>);
export interface AnimationBuilder { (el: any): Animation }
export declare class Foo {}
type Ref = import("./interface").Color;
"#,
        );
        assert_eq!(module.aliases["PredefinedColors"], "'primary' | 'secondary'");
        assert_eq!(module.aliases["Color"], "PredefinedColors | string");
        assert_eq!(module.aliases["LiteralUnion"], "T | (U & Record<never, never>)");
        assert!(module.declarations.contains("AnimationBuilder"));
        assert!(module.declarations.contains("Foo"));
        assert_eq!(
            module.references,
            ["./components/alert/alert-interface", "./global", "./interface"]
        );
    }
}
