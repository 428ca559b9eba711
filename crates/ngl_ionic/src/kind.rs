//! Classification of declared property types into value kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The inferred value category of a component attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Any string, possibly restricted to a literal set.
    String,
    /// `boolean`.
    Boolean,
    /// `number`.
    Number,
    /// An object, array or function type.
    Object,
    /// A union mixing objects with primitives, or unresolvable parts.
    Complex,
    /// Nothing is known; never reported.
    Unknown,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::Object => "object",
            ValueKind::Complex => "complex",
            ValueKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// The classified type of one attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeType {
    /// The value kind.
    pub kind: ValueKind,
    /// For string attributes declared as a union of string literals, the
    /// permitted values in declaration order. Empty means unrestricted.
    pub values: Vec<String>,
}

impl AttributeType {
    /// An attribute type without a literal set.
    pub fn of(kind: ValueKind) -> Self {
        Self {
            kind,
            values: Vec::new(),
        }
    }
}

/// How a type name resolved.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Resolution {
    /// A `type` alias with this right-hand side.
    Alias(Arc<str>),
    /// An interface, class or enum.
    Declared,
    /// Not found in any crawled declaration file.
    Unresolved,
}

/// Name lookup used while classifying.
pub(crate) trait ResolveType {
    fn resolve(&self, name: &str) -> Resolution;
}

/// Aliases that stand for strings even when their declaration cannot be
/// found or is generic.
const STRING_ALIASES: &[&str] = &[
    "Color",
    "PredefinedColors",
    "LiteralUnion",
    "Mode",
    "TextFieldTypes",
    "AutocompleteTypes",
];

const OBJECT_TYPES: &[&str] = &[
    "Array",
    "ReadonlyArray",
    "Promise",
    "Record",
    "Partial",
    "Required",
    "Map",
    "Set",
    "Date",
    "RegExp",
    "Function",
    "Object",
    "object",
    "symbol",
    "Node",
    "Window",
    "Document",
    "CustomEvent",
];

const MAX_ALIAS_DEPTH: usize = 16;

#[derive(Clone, Debug, PartialEq)]
enum Member {
    StrLit(String),
    Str,
    Num,
    Bool,
    Nullish,
    Any,
    Object,
    Unresolved,
}

/// Classifies a property's type text.
pub(crate) fn classify_type(text: &str, resolver: &dyn ResolveType) -> AttributeType {
    let mut members = Vec::new();
    let mut seen = Vec::new();
    expand(text, resolver, &mut seen, &mut members);
    classify_members(&members)
}

fn classify_members(members: &[Member]) -> AttributeType {
    let significant: Vec<&Member> = members.iter().filter(|m| **m != Member::Nullish).collect();
    if significant.is_empty() {
        return AttributeType::of(ValueKind::Unknown);
    }
    if significant.iter().all(|m| matches!(m, Member::StrLit(_))) {
        let mut values: Vec<String> = Vec::new();
        for m in &significant {
            if let Member::StrLit(v) = m {
                if !values.contains(v) {
                    values.push(v.clone());
                }
            }
        }
        return AttributeType {
            kind: ValueKind::String,
            values,
        };
    }

    let has = |pred: fn(&Member) -> bool| significant.iter().any(|m| pred(m));
    let has_str = has(|m| matches!(m, Member::Str | Member::StrLit(_) | Member::Any));
    let has_num = has(|m| *m == Member::Num);
    let has_bool = has(|m| *m == Member::Bool);
    let has_obj = has(|m| *m == Member::Object);
    let has_unresolved = has(|m| *m == Member::Unresolved);

    let kind = if has_unresolved {
        if significant.len() == 1 {
            ValueKind::Unknown
        } else {
            ValueKind::Complex
        }
    } else if has_obj {
        if has_str || has_num || has_bool {
            ValueKind::Complex
        } else {
            ValueKind::Object
        }
    } else if has_str {
        ValueKind::String
    } else if has_bool && has_num {
        ValueKind::Complex
    } else if has_bool {
        ValueKind::Boolean
    } else {
        ValueKind::Number
    };
    AttributeType::of(kind)
}

fn expand(text: &str, resolver: &dyn ResolveType, seen: &mut Vec<String>, out: &mut Vec<Member>) {
    let text = strip_parens(text.trim());
    let text = text.strip_prefix('|').map_or(text, str::trim_start);

    let union = split_top_level(text, b'|');
    if union.len() > 1 {
        for part in union {
            expand(part, resolver, seen, out);
        }
        return;
    }

    let intersection = split_top_level(text, b'&');
    if intersection.len() > 1 {
        // `string & {}` and friends narrow a primitive; keep only the
        // primitive parts when there are any.
        let mut parts = Vec::new();
        for part in intersection {
            expand(part, resolver, seen, &mut parts);
        }
        let primitive: Vec<Member> = parts
            .iter()
            .filter(|m| !matches!(m, Member::Object | Member::Unresolved))
            .cloned()
            .collect();
        if primitive.is_empty() {
            out.push(Member::Object);
        } else {
            out.extend(primitive);
        }
        return;
    }

    out.push(match text {
        "" => return,
        "string" => Member::Str,
        "number" | "bigint" => Member::Num,
        "boolean" | "true" | "false" => Member::Bool,
        "undefined" | "null" | "void" | "never" => Member::Nullish,
        "any" | "unknown" => Member::Any,
        _ => return expand_named(text, resolver, seen, out),
    });
}

fn expand_named(text: &str, resolver: &dyn ResolveType, seen: &mut Vec<String>, out: &mut Vec<Member>) {
    if let Some(value) = string_literal(text) {
        out.push(Member::StrLit(value));
        return;
    }
    if text.starts_with('`') {
        out.push(Member::Str);
        return;
    }
    if text.starts_with(|c: char| c.is_ascii_digit() || c == '-') && text.parse::<f64>().is_ok() {
        out.push(Member::Num);
        return;
    }
    if text.starts_with('{')
        || text.starts_with('[')
        || text.ends_with("[]")
        || text.starts_with("new ")
        || text.starts_with("typeof ")
        || text.starts_with("keyof ")
        || contains_top_level_arrow(text)
    {
        out.push(Member::Object);
        return;
    }

    let name = type_name(text);
    let short = name.rsplit('.').next().unwrap_or(name);
    if STRING_ALIASES.contains(&short) {
        out.push(Member::Str);
        return;
    }
    if OBJECT_TYPES.contains(&short)
        || short.starts_with("HTML")
        || short.ends_with("Element")
        || short.ends_with("Event")
    {
        out.push(Member::Object);
        return;
    }
    if seen.iter().any(|s| s == short) || seen.len() >= MAX_ALIAS_DEPTH {
        out.push(Member::Unresolved);
        return;
    }
    match resolver.resolve(short) {
        Resolution::Alias(rhs) => {
            seen.push(short.to_string());
            expand(&rhs, resolver, seen, out);
            seen.pop();
        }
        Resolution::Declared => out.push(Member::Object),
        Resolution::Unresolved => out.push(Member::Unresolved),
    }
}

/// Strips an inline `import("...").` qualifier and generic arguments.
fn type_name(text: &str) -> &str {
    let text = match text.strip_prefix("import(") {
        Some(rest) => rest.find(").").map_or(text, |i| &rest[i + 2..]),
        None => text,
    };
    let end = text.find('<').unwrap_or(text.len());
    text[..end].trim()
}

fn string_literal(text: &str) -> Option<String> {
    let quote = text.chars().next()?;
    if (quote == '\'' || quote == '"') && text.len() >= 2 && text.ends_with(quote) {
        Some(text[1..text.len() - 1].to_string())
    } else {
        None
    }
}

/// Removes parentheses wrapping the whole of `text`.
fn strip_parens(mut text: &str) -> &str {
    while text.starts_with('(') && text.ends_with(')') {
        let inner = &text[1..text.len() - 1];
        // `(a) | (b)` starts and ends with parens but is not wrapped.
        if !balanced(inner) {
            break;
        }
        text = inner.trim();
    }
    text
}

fn balanced(text: &str) -> bool {
    let mut depth = 0i32;
    for b in text.bytes() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Splits on `sep` outside brackets and quotes.
fn split_top_level(text: &str, sep: u8) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == sep && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'(' | b'[' | b'{' | b'<' => depth += 1,
                b')' | b']' | b'}' => depth -= 1,
                b'>' if i > 0 && bytes[i - 1] != b'=' => depth -= 1,
                _ => {}
            },
        }
        i += 1;
    }
    parts.push(text[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

fn contains_top_level_arrow(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'>' if i > 0 && bytes[i - 1] == b'=' => {
                if depth == 0 {
                    return true;
                }
            }
            b'>' => depth -= 1,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Aliases(HashMap<&'static str, &'static str>, Vec<&'static str>);

    impl ResolveType for Aliases {
        fn resolve(&self, name: &str) -> Resolution {
            match self.0.get(name) {
                Some(rhs) => Resolution::Alias(Arc::from(*rhs)),
                None if self.1.contains(&name) => Resolution::Declared,
                None => Resolution::Unresolved,
            }
        }
    }

    fn resolver() -> Aliases {
        Aliases(
            HashMap::from([
                ("SpinnerTypes", "'bubbles' | 'circles' | 'dots'"),
                ("Loop", "Loop | 'x'"),
                ("RouterDirection", "'forward' | 'back' | 'root'"),
                ("Size", "'small' | 'default' | 'large' | number"),
            ]),
            vec!["AnimationBuilder"],
        )
    }

    fn kind(text: &str) -> ValueKind {
        classify_type(text, &resolver()).kind
    }

    #[test]
    fn primitives() {
        assert_eq!(kind("boolean"), ValueKind::Boolean);
        assert_eq!(kind("boolean | undefined"), ValueKind::Boolean);
        assert_eq!(kind("number"), ValueKind::Number);
        assert_eq!(kind("string"), ValueKind::String);
        assert_eq!(kind("any"), ValueKind::String);
        assert_eq!(kind("undefined"), ValueKind::Unknown);
    }

    #[test]
    fn string_mixed_with_primitives_is_string() {
        assert_eq!(kind("string | number"), ValueKind::String);
        assert_eq!(kind("string | boolean | undefined"), ValueKind::String);
        assert_eq!(kind("Size"), ValueKind::String);
    }

    #[test]
    fn literal_unions_carry_values() {
        let ty = classify_type("'full' | 'inset' | 'none' | undefined", &resolver());
        assert_eq!(ty.kind, ValueKind::String);
        assert_eq!(ty.values, ["full", "inset", "none"]);
        let ty = classify_type("SpinnerTypes | null", &resolver());
        assert_eq!(ty.values, ["bubbles", "circles", "dots"]);
        assert!(classify_type("Size", &resolver()).values.is_empty());
    }

    #[test]
    fn known_string_aliases() {
        assert_eq!(kind("Color"), ValueKind::String);
        assert_eq!(kind("LiteralUnion<'a' | 'b', string>"), ValueKind::String);
        assert_eq!(kind("string & {}"), ValueKind::String);
    }

    #[test]
    fn objects() {
        assert_eq!(kind("number[]"), ValueKind::Object);
        assert_eq!(kind("AnimationBuilder | undefined"), ValueKind::Object);
        assert_eq!(kind("(data?: any) => Promise<boolean>"), ValueKind::Object);
        assert_eq!(kind("{ lower: number; upper: number }"), ValueKind::Object);
        assert_eq!(kind("HTMLElement | string"), ValueKind::Complex);
        assert_eq!(kind("number | { lower: number; upper: number }"), ValueKind::Complex);
    }

    #[test]
    fn unresolved_names() {
        assert_eq!(kind("Mystery"), ValueKind::Unknown);
        assert_eq!(kind("Mystery | boolean"), ValueKind::Complex);
        assert_eq!(kind("Loop"), ValueKind::Complex);
    }

    #[test]
    fn inline_import_qualifier() {
        assert_eq!(kind("import(\"./x\").RouterDirection"), ValueKind::String);
    }

    #[test]
    fn parenthesized() {
        assert_eq!(kind("(boolean)"), ValueKind::Boolean);
        assert_eq!(kind("('a') | ('b')"), ValueKind::String);
    }

    #[test]
    fn display() {
        assert_eq!(ValueKind::Complex.to_string(), "complex");
    }
}
