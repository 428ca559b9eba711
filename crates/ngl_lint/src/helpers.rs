//! Tree helpers shared by several lint rules.
//!
//! The member-chain walker is the one place that turns `this.a.b.c` (code)
//! or `a.b.c` (template) into an ordered list of segments plus the node the
//! chain hangs off. Both signal checkers and `prefer-readonly` use it.

use ngl_diagnostics::Replacement;
use ngl_source::Span;
use ngl_template_parser::{TemplateExpr, TemplateExprKind};
use ngl_ts_parser::ast::{
    Block, ClassDecl, ClassMember, Expr, ExprKind, ForHead, ForInit, Function, FunctionBody,
    ObjectProp, Program, PropKey, Stmt, StmtKind, VarDecl,
};

/// Decorator marking a UI component class.
pub const COMPONENT_DECORATOR: &str = "Component";

/// Returns `true` for classes decorated with `@Component`.
pub fn is_component(class: &ClassDecl) -> bool {
    class.decorator(COMPONENT_DECORATOR).is_some()
}

/// Returns `true` if the class carries any of the given decorators.
pub fn has_any_decorator(class: &ClassDecl, names: &[&str]) -> bool {
    names.iter().any(|name| class.decorator(name).is_some())
}

/// The properties of the object literal passed to `@Component(...)`.
pub fn component_metadata(class: &ClassDecl) -> Option<&[ObjectProp]> {
    let arg = class.decorator(COMPONENT_DECORATOR)?.args().first()?;
    match &arg.unwrap_transparent().kind {
        ExprKind::Object(props) => Some(props),
        _ => None,
    }
}

/// The value of a `key: value` property in an object literal.
pub fn metadata_value<'a>(props: &'a [ObjectProp], key: &str) -> Option<&'a Expr> {
    props.iter().find_map(|prop| match prop {
        ObjectProp::KeyValue { key: k, value, .. } if k.name() == Some(key) => Some(value),
        _ => None,
    })
}

// ============================================================================
// Member chains
// ============================================================================

/// One step of a member chain walk.
pub enum ChainStep<'a, N> {
    /// `object.name`; continue at `object`.
    Member {
        /// The accessed object.
        object: &'a N,
        /// The property name as written.
        name: &'a str,
        /// Span of the property name.
        name_span: Span,
        /// Optional chaining (`?.`).
        optional: bool,
    },
    /// A wrapper that does not end the chain (`x!`, `(x)`).
    Through(&'a N),
    /// Not part of a member chain.
    Stop,
}

/// A tree node that can take part in member chains.
pub trait ChainNode: Sized {
    /// How the walk continues from this node.
    fn step(&self) -> ChainStep<'_, Self>;
    /// The node's span.
    fn node_span(&self) -> Span;
}

impl ChainNode for Expr {
    fn step(&self) -> ChainStep<'_, Self> {
        match &self.kind {
            ExprKind::Member {
                object,
                property,
                optional,
            } => ChainStep::Member {
                object,
                name: &property.name,
                name_span: property.span,
                optional: *optional,
            },
            ExprKind::NonNull(inner) | ExprKind::Paren(inner) => ChainStep::Through(inner),
            _ => ChainStep::Stop,
        }
    }

    fn node_span(&self) -> Span {
        self.span
    }
}

impl ChainNode for TemplateExpr {
    fn step(&self) -> ChainStep<'_, Self> {
        match &self.kind {
            TemplateExprKind::PropertyRead {
                receiver,
                name,
                name_span,
            } => ChainStep::Member {
                object: receiver,
                name,
                name_span: *name_span,
                optional: false,
            },
            TemplateExprKind::SafePropertyRead {
                receiver,
                name,
                name_span,
            } => ChainStep::Member {
                object: receiver,
                name,
                name_span: *name_span,
                optional: true,
            },
            TemplateExprKind::NonNullAssert(inner) | TemplateExprKind::Parenthesized(inner) => {
                ChainStep::Through(inner)
            }
            _ => ChainStep::Stop,
        }
    }

    fn node_span(&self) -> Span {
        self.span
    }
}

/// One property access in a chain.
pub struct ChainLink<'a, N> {
    /// The property name as written (private names keep their `#`).
    pub name: &'a str,
    /// Span of the property name.
    pub name_span: Span,
    /// The access expression ending at this property.
    pub node: &'a N,
    /// Whether the access uses `?.`.
    pub optional: bool,
}


/// A member-access chain split into its segments, innermost first.
pub struct MemberChain<'a, N> {
    /// The node the chain hangs off (`this`, a call, an identifier...).
    pub root: &'a N,
    /// Property accesses from the root outwards.
    pub links: Vec<ChainLink<'a, N>>,
}

impl<'a, N: ChainNode> MemberChain<'a, N> {
    /// Walks `node` down to the first node that is not a member access.
    pub fn of(node: &'a N) -> Self {
        let mut links = Vec::new();
        let mut current = node;
        loop {
            match current.step() {
                ChainStep::Member {
                    object,
                    name,
                    name_span,
                    optional,
                } => {
                    links.push(ChainLink {
                        name,
                        name_span,
                        node: current,
                        optional,
                    });
                    current = object;
                }
                ChainStep::Through(inner) => current = inner,
                ChainStep::Stop => break,
            }
        }
        links.reverse();
        Self {
            root: current,
            links,
        }
    }

    /// Number of property accesses.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` when the node is not a member access at all.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Segment names as written, root outwards.
    pub fn names(&self) -> Vec<&'a str> {
        self.links.iter().map(|l| l.name).collect()
    }

    /// Span from the start of the chain to the end of segment `index`.
    pub fn span_through(&self, index: usize) -> Option<Span> {
        self.links.get(index).map(|l| l.node.node_span())
    }
}

impl MemberChain<'_, Expr> {
    /// Returns `true` when the chain starts at `this`.
    pub fn is_this_rooted(&self) -> bool {
        matches!(self.root.kind, ExprKind::This)
    }
}

impl MemberChain<'_, TemplateExpr> {
    /// Returns `true` when the chain starts at the component instance.
    pub fn is_component_rooted(&self) -> bool {
        self.root.is_component_receiver()
    }
}

// ============================================================================
// Expression walks
// ============================================================================

/// Calls `f` on every expression under `stmt`, parents before children.
///
/// Nested functions and class bodies are entered too. Returning `false`
/// from `f` skips the children of that expression.
pub fn walk_stmt(stmt: &Stmt, f: &mut impl FnMut(&Expr) -> bool) {
    match &stmt.kind {
        StmtKind::Expr(expr) | StmtKind::Throw(expr) | StmtKind::Return(Some(expr)) => {
            walk_expr(expr, f)
        }
        StmtKind::Var(decl) => walk_var(decl, f),
        StmtKind::If {
            test,
            consequent,
            alternate,
        } => {
            walk_expr(test, f);
            walk_stmt(consequent, f);
            if let Some(alternate) = alternate {
                walk_stmt(alternate, f);
            }
        }
        StmtKind::Block(block) => walk_block(block, f),
        StmtKind::For {
            init,
            test,
            update,
            body,
        } => {
            match init {
                Some(ForInit::Var(decl)) => walk_var(decl, f),
                Some(ForInit::Expr(expr)) => walk_expr(expr, f),
                None => {}
            }
            for expr in test.iter().chain(update) {
                walk_expr(expr, f);
            }
            walk_stmt(body, f);
        }
        StmtKind::ForOf {
            left, right, body, ..
        } => {
            match left {
                ForHead::Var(decl) => walk_var(decl, f),
                ForHead::Expr(expr) => walk_expr(expr, f),
            }
            walk_expr(right, f);
            walk_stmt(body, f);
        }
        StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
            walk_expr(test, f);
            walk_stmt(body, f);
        }
        StmtKind::Switch {
            discriminant,
            cases,
        } => {
            walk_expr(discriminant, f);
            for case in cases {
                if let Some(test) = &case.test {
                    walk_expr(test, f);
                }
                case.body.iter().for_each(|s| walk_stmt(s, f));
            }
        }
        StmtKind::Try {
            block,
            handler,
            finalizer,
        } => {
            walk_block(block, f);
            if let Some(handler) = handler {
                walk_block(&handler.body, f);
            }
            if let Some(finalizer) = finalizer {
                walk_block(finalizer, f);
            }
        }
        StmtKind::Labeled { body, .. } => walk_stmt(body, f),
        StmtKind::Function(function) => walk_function(function, f),
        StmtKind::Class(class) => walk_class(class, f),
        StmtKind::Return(None)
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Empty
        | StmtKind::Error => {}
    }
}

/// Walks every statement of a block.
pub fn walk_block(block: &Block, f: &mut impl FnMut(&Expr) -> bool) {
    for stmt in &block.stmts {
        walk_stmt(stmt, f);
    }
}

fn walk_var(decl: &VarDecl, f: &mut impl FnMut(&Expr) -> bool) {
    for init in decl.declarators.iter().filter_map(|d| d.init.as_ref()) {
        walk_expr(init, f);
    }
}

/// Walks parameter defaults and the body of a function.
pub fn walk_function(function: &Function, f: &mut impl FnMut(&Expr) -> bool) {
    for default in function.params.iter().filter_map(|p| p.default.as_ref()) {
        walk_expr(default, f);
    }
    match &function.body {
        Some(FunctionBody::Block(block)) => walk_block(block, f),
        Some(FunctionBody::Expr(expr)) => walk_expr(expr, f),
        None => {}
    }
}

/// Walks field initializers, methods, the constructor and static blocks.
pub fn walk_class(class: &ClassDecl, f: &mut impl FnMut(&Expr) -> bool) {
    for member in &class.members {
        match member {
            ClassMember::Property(prop) => {
                if let Some(value) = &prop.value {
                    walk_expr(value, f);
                }
            }
            ClassMember::Method(method) => walk_function(&method.function, f),
            ClassMember::Constructor(ctor) => {
                if let Some(body) = &ctor.body {
                    walk_block(body, f);
                }
            }
            ClassMember::StaticBlock(block) => walk_block(block, f),
            ClassMember::Other(_) => {}
        }
    }
}

/// Calls `f` on `expr`, then on its sub-expressions if `f` returned `true`.
pub fn walk_expr(expr: &Expr, f: &mut impl FnMut(&Expr) -> bool) {
    if !f(expr) {
        return;
    }
    match &expr.kind {
        ExprKind::Template { exprs: items, .. }
        | ExprKind::Array(items)
        | ExprKind::Sequence(items) => items.iter().for_each(|e| walk_expr(e, f)),
        ExprKind::TaggedTemplate { tag, quasi } => {
            walk_expr(tag, f);
            walk_expr(quasi, f);
        }
        ExprKind::Object(props) => {
            for prop in props {
                match prop {
                    ObjectProp::KeyValue { key, value, .. } => {
                        if let PropKey::Computed(key, _) = key {
                            walk_expr(key, f);
                        }
                        walk_expr(value, f);
                    }
                    ObjectProp::Spread(inner, _) => walk_expr(inner, f),
                    ObjectProp::Method { function, .. } => walk_function(function, f),
                    ObjectProp::Shorthand(_) => {}
                }
            }
        }
        ExprKind::Spread(inner)
        | ExprKind::Paren(inner)
        | ExprKind::NonNull(inner)
        | ExprKind::Await(inner)
        | ExprKind::Yield(Some(inner))
        | ExprKind::Member { object: inner, .. }
        | ExprKind::Unary { operand: inner, .. }
        | ExprKind::Update { operand: inner, .. }
        | ExprKind::TypeAssertion { expr: inner, .. } => walk_expr(inner, f),
        ExprKind::Index { object, index, .. } => {
            walk_expr(object, f);
            walk_expr(index, f);
        }
        ExprKind::Call { callee, args, .. } | ExprKind::New { callee, args } => {
            walk_expr(callee, f);
            args.iter().for_each(|a| walk_expr(a, f));
        }
        ExprKind::Binary { left, right, .. } => {
            walk_expr(left, f);
            walk_expr(right, f);
        }
        ExprKind::Assign { target, value, .. } => {
            walk_expr(target, f);
            walk_expr(value, f);
        }
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            walk_expr(test, f);
            walk_expr(consequent, f);
            walk_expr(alternate, f);
        }
        ExprKind::Function(function) => walk_function(function, f),
        ExprKind::Class(class) => walk_class(class, f),
        ExprKind::Ident(_)
        | ExprKind::This
        | ExprKind::Super
        | ExprKind::Number(_)
        | ExprKind::Str { .. }
        | ExprKind::Regex(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::Yield(None)
        | ExprKind::MetaProperty
        | ExprKind::Error => {}
    }
}

/// The bare name of `this.name` / `this.#name`.
pub fn this_member(expr: &Expr) -> Option<&str> {
    match &expr.unwrap_transparent().kind {
        ExprKind::Member {
            object, property, ..
        } if matches!(object.unwrap_transparent().kind, ExprKind::This) => {
            Some(property.bare_name())
        }
        _ => None,
    }
}

// ============================================================================
// Imports
// ============================================================================

/// Edits that make `names` importable from `module`.
///
/// Names already imported from the module are skipped. New names are appended
/// to the first value import of `module` with a `{ ... }` group, or a new
/// import declaration is added after the last import.
pub fn import_edits(program: &Program, module: &str, names: &[&str]) -> Vec<Replacement> {
    let missing: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| !imports_value(program, module, name))
        .collect();
    if missing.is_empty() {
        return Vec::new();
    }

    let group = program
        .imports()
        .filter(|i| i.source == module && !i.type_only)
        .find(|i| i.named_span.is_some());
    if let Some(import) = group {
        let addition: String = missing.iter().map(|n| format!(", {n}")).collect();
        return match (import.named.last(), import.named_span) {
            (Some(last), _) => vec![Replacement::insert_after(last.span, addition)],
            (None, Some(braces)) => vec![Replacement::replace(
                braces,
                format!("{{ {} }}", missing.join(", ")),
            )],
            (None, None) => Vec::new(),
        };
    }

    let declaration = format!("import {{ {} }} from '{module}';", missing.join(", "));
    match program.imports().last() {
        Some(last) => vec![Replacement::insert_after(last.span, format!("\n{declaration}"))],
        None => vec![Replacement::insert(
            Span::point(program.span.file, program.span.start),
            format!("{declaration}\n"),
        )],
    }
}

/// Returns `true` if `name` is imported from `module` as a value.
pub fn imports_value(program: &Program, module: &str, name: &str) -> bool {
    program
        .imports()
        .any(|i| i.source == module && !i.type_only && i.imports_name(name))
}

// ============================================================================
// Text
// ============================================================================

/// Returns `true` if `text` mentions `word` as a whole identifier.
pub fn mentions_identifier(text: &str, word: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$';
    text.match_indices(word).any(|(at, _)| {
        let before = text[..at].chars().next_back();
        let after = text[at + word.len()..].chars().next();
        !before.is_some_and(|c| is_ident(c) || c == '.' || c == '#')
            && !after.is_some_and(is_ident)
    })
}

/// Whether an expression needs parentheses as the right operand of a binary
/// operator.
pub fn needs_parens(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Binary { .. }
            | ExprKind::Assign { .. }
            | ExprKind::Conditional { .. }
            | ExprKind::Sequence(_)
            | ExprKind::Function(_)
            | ExprKind::TypeAssertion { .. }
            | ExprKind::Yield(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngl_diagnostics::DiagnosticSink;
    use ngl_source::FileId;
    use ngl_ts_parser::{parse_expression, parse_source};

    fn expr(src: &str) -> Expr {
        parse_expression(src, FileId::from_raw(0), &DiagnosticSink::new())
    }

    fn text(src: &str, span: Span) -> &str {
        &src[span.start as usize..span.end as usize]
    }

    #[test]
    fn code_chain_segments() {
        let src = "this.user!.first.#name";
        let e = expr(src);
        let chain = MemberChain::of(&e);
        assert!(chain.is_this_rooted());
        assert_eq!(chain.names(), ["user", "first", "#name"]);
        assert_eq!(text(src, chain.span_through(0).unwrap()), "this.user");
        assert_eq!(text(src, chain.span_through(1).unwrap()), "this.user!.first");
    }

    #[test]
    fn code_chain_stops_at_call() {
        let src = "this.items().length";
        let e = expr(src);
        let chain = MemberChain::of(&e);
        assert!(!chain.is_this_rooted());
        assert_eq!(chain.names(), ["length"]);
        assert_eq!(text(src, chain.root.span), "this.items()");
    }

    #[test]
    fn template_chain_with_safe_navigation() {
        let e = ngl_template_parser::expr_parser::parse_binding("user?.first.name", FileId::from_raw(0), 0)
            .unwrap();
        let chain = MemberChain::of(&e);
        assert!(chain.is_component_rooted());
        assert_eq!(chain.names(), ["user", "first", "name"]);
        assert!(chain.links[1].optional);
    }

    #[test]
    fn import_edit_appends_to_group() {
        let src = "import { Component, OnInit } from '@angular/core';\nclass A {}\n";
        let program = parse_source(src, FileId::from_raw(0), &DiagnosticSink::new());
        let edits = import_edits(&program, "@angular/core", &["OnInit", "OnDestroy"]);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].new_text, ", OnDestroy");
        assert_eq!(edits[0].span.start as usize, src.find(" }").unwrap());
    }

    #[test]
    fn import_edit_adds_declaration() {
        let src = "import { Component } from '@angular/core';\nclass A {}\n";
        let program = parse_source(src, FileId::from_raw(0), &DiagnosticSink::new());
        let edits = import_edits(&program, "@ionic/angular", &["ViewWillEnter"]);
        assert_eq!(
            edits[0].new_text,
            "\nimport { ViewWillEnter } from '@ionic/angular';"
        );
        assert!(import_edits(&program, "@angular/core", &["Component"]).is_empty());
    }

    #[test]
    fn walk_visits_nested_functions_and_can_prune() {
        let src = "class A { m() { if (a) { this.x = () => this.y++; } } }";
        let program = parse_source(src, FileId::from_raw(0), &DiagnosticSink::new());
        let class = program.classes().next().unwrap();
        let mut members = Vec::new();
        walk_class(class, &mut |e| {
            members.extend(this_member(e).map(str::to_string));
            true
        });
        assert_eq!(members, ["x", "y"]);

        let mut count = 0;
        walk_class(class, &mut |e| {
            count += 1;
            !matches!(e.kind, ExprKind::Function(_))
        });
        // a, the assignment, its target, its object, the arrow
        assert_eq!(count, 5);
    }

    #[test]
    fn whole_identifier_mentions() {
        assert!(mentions_identifier("value + 1", "value"));
        assert!(mentions_identifier("f(value)", "value"));
        assert!(!mentions_identifier("this.value", "value"));
        assert!(!mentions_identifier("values", "value"));
        assert!(!mentions_identifier("newValue", "Value"));
    }
}
