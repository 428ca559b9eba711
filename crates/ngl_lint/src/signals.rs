//! The reactive identifier table of a component class.
//!
//! Paths are collected lexically from field initializers: a field whose
//! initializer calls a signal constructor is an identifier, and object
//! literals are searched recursively so `state = { user: signal(u) }` yields
//! `state.user`. Nothing here checks types; `signal` is recognized by name.

use std::collections::BTreeMap;

use ngl_source::Span;
use ngl_ts_parser::ast::{ClassDecl, Expr, ExprKind, ModifierKind, ModifierList, ObjectProp};

/// Constructors of writable signals.
pub const WRITABLE_CONSTRUCTORS: &[&str] = &["signal", "model", "linkedSignal"];

/// Constructors of read-only signals.
pub const READONLY_CONSTRUCTORS: &[&str] = &[
    "computed",
    "input",
    "toSignal",
    "viewChild",
    "viewChildren",
    "contentChild",
    "contentChildren",
];

/// Constructors that also come in a `name.required(...)` form.
const REQUIRED_FORMS: &[&str] = &["input", "model", "viewChild", "contentChild"];

/// Accessor producing a read-only view of a writable signal.
const READONLY_VIEW: &str = "asReadonly";

/// Mutable or read-only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalKind {
    /// Supports `set` and `update`.
    Writable,
    /// Can only be read by calling it.
    ReadOnly,
}

/// One reactive identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalEntry {
    /// Mutable or read-only.
    pub kind: SignalKind,
    /// The constructor as written: `signal`, `input.required`, `asReadonly`.
    pub constructor: String,
    /// Span of the initializer expression.
    pub declaration: Span,
}

/// Dotted paths reachable from `this` that hold signals.
#[derive(Clone, Debug, Default)]
pub struct SignalTable {
    entries: BTreeMap<String, SignalEntry>,
}

impl SignalTable {
    /// Builds the table from the instance fields of a class.
    ///
    /// Static fields are skipped; `#name` fields keep their `#`.
    pub fn from_class(class: &ClassDecl) -> Self {
        let mut table = Self::default();
        for prop in class.properties() {
            if prop.modifiers.has(ModifierKind::Static) {
                continue;
            }
            let (Some(name), Some(value)) = (prop.key.member_name(), &prop.value) else {
                continue;
            };
            table.collect(name.to_string(), value);
        }
        table
    }

    fn collect(&mut self, path: String, expr: &Expr) {
        if let Some((kind, constructor)) = classify_initializer(expr) {
            self.entries.insert(
                path,
                SignalEntry {
                    kind,
                    constructor,
                    declaration: expr.span,
                },
            );
            return;
        }
        let ExprKind::Object(props) = &expr.unwrap_transparent().kind else {
            return;
        };
        if is_derived_config(props) {
            return;
        }
        for prop in props {
            if let ObjectProp::KeyValue { key, value, .. } = prop {
                if let Some(name) = key.name() {
                    self.collect(format!("{path}.{name}"), value);
                }
            }
        }
    }

    /// Adds an entry directly.
    pub fn insert(&mut self, path: impl Into<String>, entry: SignalEntry) {
        self.entries.insert(path.into(), entry);
    }

    /// Looks up an exact path.
    pub fn get(&self, path: &str) -> Option<&SignalEntry> {
        self.entries.get(path)
    }

    /// Returns `true` if `path` is an identifier.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the class declares no signals.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All identifier paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Paths of the read-only identifiers.
    pub fn readonly_paths(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, e)| e.kind == SignalKind::ReadOnly)
            .map(|(p, _)| p.as_str())
    }

    /// The longest prefix of `segments` that is an identifier.
    ///
    /// Returns the number of segments matched and the entry.
    pub fn longest_match(&self, segments: &[&str]) -> Option<(usize, &SignalEntry)> {
        let mut path = String::new();
        let mut best = None;
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                path.push('.');
            }
            path.push_str(segment);
            if let Some(entry) = self.entries.get(&path) {
                best = Some((i + 1, entry));
            }
        }
        best
    }
}

/// Recognizes an initializer that creates a signal.
///
/// Returns the kind and the constructor as written.
pub fn classify_initializer(expr: &Expr) -> Option<(SignalKind, String)> {
    let ExprKind::Call { callee, .. } = &expr.unwrap_transparent().kind else {
        return None;
    };
    match &callee.unwrap_transparent().kind {
        ExprKind::Ident(id) => constructor_kind(&id.name).map(|k| (k, id.name.clone())),
        ExprKind::Member {
            object, property, ..
        } => {
            if property.name == READONLY_VIEW {
                return Some((SignalKind::ReadOnly, READONLY_VIEW.to_string()));
            }
            let base = object.as_ident()?;
            if property.name == "required" && REQUIRED_FORMS.contains(&base) {
                constructor_kind(base).map(|k| (k, format!("{base}.required")))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn constructor_kind(name: &str) -> Option<SignalKind> {
    if WRITABLE_CONSTRUCTORS.contains(&name) {
        Some(SignalKind::Writable)
    } else if READONLY_CONSTRUCTORS.contains(&name) {
        Some(SignalKind::ReadOnly)
    } else {
        None
    }
}

/// `{ source: ..., computation: ... }` describes a derived signal; the
/// signals inside it are inputs, not declarations.
fn is_derived_config(props: &[ObjectProp]) -> bool {
    let has = |key: &str| props.iter().any(|p| p.key_name() == Some(key));
    has("source") && has("computation")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngl_diagnostics::DiagnosticSink;
    use ngl_source::FileId;
    use ngl_ts_parser::parse_source;

    fn table(body: &str) -> SignalTable {
        let src = format!("@Component({{}})\nclass A {{\n{body}\n}}\n");
        let program = parse_source(&src, FileId::from_raw(0), &DiagnosticSink::new());
        let table = SignalTable::from_class(program.classes().next().unwrap());
        table
    }

    #[test]
    fn direct_constructors() {
        let t = table(
            "count = signal(0);\n\
             double = computed(() => this.count() * 2);\n\
             name = input.required<string>();\n\
             value = model(0);\n\
             view = this.count.asReadonly();\n\
             plain = 1;\n\
             fired = output<void>();\n\
             static shared = signal(1);",
        );
        assert_eq!(t.paths().collect::<Vec<_>>(), ["count", "double", "name", "value", "view"]);
        assert_eq!(t.get("count").unwrap().kind, SignalKind::Writable);
        assert_eq!(t.get("double").unwrap().kind, SignalKind::ReadOnly);
        assert_eq!(t.get("name").unwrap().constructor, "input.required");
        assert_eq!(t.get("value").unwrap().kind, SignalKind::Writable);
        assert_eq!(t.get("view").unwrap().kind, SignalKind::ReadOnly);
        assert_eq!(t.readonly_paths().collect::<Vec<_>>(), ["double", "name", "view"]);
    }

    #[test]
    fn nested_object_literals() {
        let t = table("a = { b: signal(0), c: signal(0), d: { e: computed(() => 1) } };");
        assert!(t.contains("a.b"));
        assert!(t.contains("a.c"));
        assert!(t.contains("a.d.e"));
        assert!(!t.contains("a"));
        assert!(!t.contains("a.d"));
    }

    #[test]
    fn derived_config_is_not_a_declaration() {
        let t = table("x = { source: signal(0), computation: () => 1 };");
        assert!(t.is_empty());
    }

    #[test]
    fn private_names_keep_their_hash() {
        let t = table("#count = signal(0);\ncount = 0;");
        assert!(t.contains("#count"));
        assert!(!t.contains("count"));
        assert_eq!(t.longest_match(&["count"]), None);
        assert_eq!(t.longest_match(&["#count"]).map(|(n, _)| n), Some(1));
    }

    #[test]
    fn longest_match_prefers_deeper_paths() {
        let mut t = table("user = { first: signal({ name: '' }) };");
        assert_eq!(t.longest_match(&["user", "first", "name"]).map(|m| m.0), Some(2));
        assert_eq!(t.longest_match(&["user"]), None);
        t.insert(
            "user",
            SignalEntry {
                kind: SignalKind::Writable,
                constructor: "signal".into(),
                declaration: Span::DUMMY,
            },
        );
        assert_eq!(t.longest_match(&["user", "first"]).map(|m| m.0), Some(2));
        assert_eq!(t.longest_match(&["user", "other"]).map(|m| m.0), Some(1));
    }
}
