//! W105: Signal usage — signals read without being called, or written to
//! without `set`/`update`, in component class bodies.

use ngl_diagnostics::{
    Category, Diagnostic, DiagnosticCode, DiagnosticSink, Replacement, Severity, SuggestedFix,
};
use ngl_source::Span;
use ngl_ts_parser::ast::{
    AssignOp, Block, ClassDecl, ClassMember, Expr, ExprKind, ForHead, ForInit, Function,
    FunctionBody, ModifierKind, ModifierList, ObjectProp, PropKey, Stmt, StmtKind, UnaryOp,
    UpdateOp, VarDecl,
};

use crate::helpers::{mentions_identifier, needs_parens, ChainLink, MemberChain};
use crate::signals::{classify_initializer, SignalEntry, SignalKind, SignalTable};
use crate::unit::LintUnit;
use crate::LintRule;

/// Parameter name used in generated `update` callbacks.
const CALLBACK_PARAM: &str = "value";

/// Local holding the copied array in generated mutation callbacks.
const COPY_NAME: &str = "next";

/// Helpers that take the signal object itself.
const SIGNAL_HELPERS: &[&str] = &["toObservable", "untracked", "isSignal"];

/// Array methods that mutate their receiver.
const ARRAY_MUTATORS: &[&str] = &[
    "push",
    "pop",
    "shift",
    "unshift",
    "splice",
    "sort",
    "reverse",
    "fill",
    "copyWithin",
];

/// Detects signals in component classes that are read as plain values,
/// overwritten by assignment, or mutated in place.
///
/// Chains rooted at `this` are matched against the class's [`SignalTable`]
/// by longest prefix. A chain that goes exactly one segment past the match
/// (`this.count.set`) is treated as using the signal API; a chain that ends
/// at the match or goes two or more segments past it reads the signal
/// without calling it.
pub struct SignalUsage;

impl LintRule for SignalUsage {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Warning, 105)
    }

    fn name(&self) -> &str {
        "signal-usage"
    }

    fn description(&self) -> &str {
        "signal read without being called or written without set/update"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check_unit(&self, unit: &LintUnit, sink: &DiagnosticSink) {
        for class in unit.components() {
            let table = SignalTable::from_class(class);
            if table.is_empty() {
                continue;
            }
            let mut checker = CodeChecker {
                code: self.code(),
                unit,
                table: &table,
                sink,
                own: None,
            };
            checker.check_class(class);
        }
    }
}

/// How the value of an expression is consumed by its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Use {
    /// Any plain read.
    Read,
    /// The test of an `if`, possibly under `!`, `&&`, `||` or `??`.
    Test,
    /// The callee of a call.
    Callee,
    /// An argument of a helper that expects the signal object.
    Exempt,
}

/// Whether an expression is a statement of its own, so that rewriting it
/// does not change the value seen by a parent expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Position {
    Statement,
    Expression,
}

struct CodeChecker<'a> {
    code: DiagnosticCode,
    unit: &'a LintUnit,
    table: &'a SignalTable,
    sink: &'a DiagnosticSink,
    /// Path of the field whose initializer is being walked.
    own: Option<String>,
}

/// A chain that resolves to exactly one identifier.
struct FullMatch<'e> {
    path: String,
    entry: &'e SignalEntry,
    /// The chain expression, `this.a.b`.
    span: Span,
}

impl CodeChecker<'_> {
    fn check_class(&mut self, class: &ClassDecl) {
        for member in &class.members {
            match member {
                ClassMember::Property(prop) if !prop.modifiers.has(ModifierKind::Static) => {
                    if let Some(value) = &prop.value {
                        self.own = prop.key.member_name().map(str::to_string);
                        self.visit_expr(value, Use::Read);
                        self.own = None;
                    }
                }
                ClassMember::Method(method) if !method.modifiers.has(ModifierKind::Static) => {
                    self.visit_function(&method.function);
                }
                ClassMember::Constructor(ctor) => {
                    if let Some(body) = &ctor.body {
                        self.visit_block(body);
                    }
                }
                _ => {}
            }
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn visit_function(&self, function: &Function) {
        for param in &function.params {
            if let Some(default) = &param.default {
                self.visit_expr(default, Use::Read);
            }
        }
        match &function.body {
            Some(FunctionBody::Block(block)) => self.visit_block(block),
            // The body's value is the arrow's return value.
            Some(FunctionBody::Expr(expr)) => self.visit_expr(expr, Use::Read),
            None => {}
        }
    }

    fn visit_block(&self, block: &Block) {
        for stmt in &block.stmts {
            self.visit_stmt(stmt);
        }
    }

    fn visit_var(&self, decl: &VarDecl) {
        for declarator in &decl.declarators {
            if let Some(init) = &declarator.init {
                self.visit_expr(init, Use::Read);
            }
        }
    }

    fn visit_stmt(&self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(expr) => self.visit_expr_at(expr, Use::Read, Position::Statement),
            StmtKind::Var(decl) => self.visit_var(decl),
            StmtKind::Return(Some(expr)) | StmtKind::Throw(expr) => {
                self.visit_expr(expr, Use::Read)
            }
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => {
                self.visit_expr(test, Use::Test);
                self.visit_stmt(consequent);
                if let Some(alternate) = alternate {
                    self.visit_stmt(alternate);
                }
            }
            StmtKind::Block(block) => self.visit_block(block),
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                match init {
                    Some(ForInit::Var(decl)) => self.visit_var(decl),
                    Some(ForInit::Expr(expr)) => {
                        self.visit_expr_at(expr, Use::Read, Position::Statement)
                    }
                    None => {}
                }
                if let Some(test) = test {
                    self.visit_expr(test, Use::Read);
                }
                if let Some(update) = update {
                    self.visit_expr_at(update, Use::Read, Position::Statement);
                }
                self.visit_stmt(body);
            }
            StmtKind::ForOf {
                left, right, body, ..
            } => {
                match left {
                    ForHead::Var(decl) => self.visit_var(decl),
                    ForHead::Expr(expr) => self.visit_expr(expr, Use::Read),
                }
                self.visit_expr(right, Use::Read);
                self.visit_stmt(body);
            }
            StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
                self.visit_expr(test, Use::Read);
                self.visit_stmt(body);
            }
            StmtKind::Switch {
                discriminant,
                cases,
            } => {
                self.visit_expr(discriminant, Use::Read);
                for case in cases {
                    if let Some(test) = &case.test {
                        self.visit_expr(test, Use::Read);
                    }
                    for stmt in &case.body {
                        self.visit_stmt(stmt);
                    }
                }
            }
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                self.visit_block(block);
                if let Some(handler) = handler {
                    self.visit_block(&handler.body);
                }
                if let Some(finalizer) = finalizer {
                    self.visit_block(finalizer);
                }
            }
            StmtKind::Labeled { body, .. } => self.visit_stmt(body),
            // `this` is rebound inside function declarations and nested classes.
            StmtKind::Function(_)
            | StmtKind::Class(_)
            | StmtKind::Return(None)
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Empty
            | StmtKind::Error => {}
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn visit_expr(&self, expr: &Expr, usage: Use) {
        self.visit_expr_at(expr, usage, Position::Expression);
    }

    fn visit_expr_at(&self, expr: &Expr, usage: Use, position: Position) {
        match &expr.kind {
            ExprKind::Member { .. } => self.visit_chain(expr, usage),
            ExprKind::Call { callee, args, .. } => self.visit_call(expr, callee, args, position),
            ExprKind::Assign { op, target, value } => {
                self.visit_assign(expr, *op, target, value, position)
            }
            ExprKind::Update { op, operand, .. } => {
                self.visit_update(expr, *op, operand, position)
            }
            ExprKind::Paren(inner) | ExprKind::NonNull(inner) => {
                self.visit_expr_at(inner, usage, position)
            }
            ExprKind::TypeAssertion { expr: inner, .. } => self.visit_expr(inner, usage),
            ExprKind::Unary { op, operand } => {
                let inner = if *op == UnaryOp::Not && usage == Use::Test {
                    Use::Test
                } else {
                    Use::Read
                };
                self.visit_expr(operand, inner);
            }
            ExprKind::Binary { op, left, right } => {
                let inner = if usage == Use::Test && op.is_logical() {
                    Use::Test
                } else {
                    Use::Read
                };
                self.visit_expr(left, inner);
                self.visit_expr(right, inner);
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.visit_expr(test, Use::Read);
                self.visit_expr(consequent, Use::Read);
                self.visit_expr(alternate, Use::Read);
            }
            ExprKind::Function(function) => {
                if function.is_arrow {
                    self.visit_function(function);
                }
            }
            ExprKind::Array(items) | ExprKind::Sequence(items) => {
                for item in items {
                    self.visit_expr(item, Use::Read);
                }
            }
            ExprKind::New { callee, args } => {
                self.visit_expr(callee, Use::Read);
                for arg in args {
                    self.visit_expr(arg, Use::Read);
                }
            }
            ExprKind::Object(props) => {
                for prop in props {
                    match prop {
                        ObjectProp::KeyValue { key, value, .. } => {
                            if let PropKey::Computed(key, _) = key {
                                self.visit_expr(key, Use::Read);
                            }
                            self.visit_expr(value, Use::Read);
                        }
                        ObjectProp::Spread(inner, _) => self.visit_expr(inner, Use::Read),
                        ObjectProp::Shorthand(_) | ObjectProp::Method { .. } => {}
                    }
                }
            }
            ExprKind::Spread(inner) | ExprKind::Await(inner) | ExprKind::Yield(Some(inner)) => {
                self.visit_expr(inner, Use::Read)
            }
            ExprKind::Template { exprs, .. } => {
                for inner in exprs {
                    self.visit_expr(inner, Use::Read);
                }
            }
            ExprKind::TaggedTemplate { tag, quasi } => {
                self.visit_expr(tag, Use::Callee);
                self.visit_expr(quasi, Use::Read);
            }
            ExprKind::Index { object, index, .. } => {
                self.visit_expr(object, Use::Read);
                self.visit_expr(index, Use::Read);
            }
            ExprKind::Ident(_)
            | ExprKind::This
            | ExprKind::Super
            | ExprKind::Number(_)
            | ExprKind::Str { .. }
            | ExprKind::Regex(_)
            | ExprKind::Bool(_)
            | ExprKind::Null
            | ExprKind::Class(_)
            | ExprKind::Yield(None)
            | ExprKind::MetaProperty
            | ExprKind::Error => {}
        }
    }

    /// Classifies a member chain and reports an uncalled signal in it.
    fn visit_chain(&self, expr: &Expr, usage: Use) {
        let chain = MemberChain::of(expr);
        if !chain.is_this_rooted() {
            self.visit_expr(chain.root, Use::Read);
            return;
        }
        let names = chain.names();
        let Some((matched, _)) = self.table.longest_match(&names) else {
            return;
        };
        if self.is_own(&names, matched) {
            return;
        }
        let depth = names.len();
        let flagged = match usage {
            Use::Test => true,
            Use::Read => depth != matched + 1,
            Use::Callee | Use::Exempt => depth >= matched + 2,
        };
        if !flagged {
            return;
        }

        let path = names[..matched].join(".");
        let span = chain.links[matched - 1].node.span;
        let (id, message) = if usage == Use::Test {
            (
                "signalInCondition",
                format!("signal `{path}` is tested without being called"),
            )
        } else {
            (
                "signalNotInvoked",
                format!("signal `{path}` is read without being called"),
            )
        };
        let fix = SuggestedFix::single(
            format!("call `{path}()`"),
            Replacement::insert_after(span, "()"),
        );
        self.sink.emit(
            Diagnostic::warning(self.code, message, span)
                .with_message_id(id)
                .with_data("identifier", path.as_str())
                .with_help("a signal is a function; call it to read the current value")
                .with_fix(fix),
        );
    }

    fn visit_call(&self, expr: &Expr, callee: &Expr, args: &[Expr], position: Position) {
        if callee
            .as_ident()
            .is_some_and(|name| SIGNAL_HELPERS.contains(&name))
        {
            for arg in args {
                self.visit_expr(arg, Use::Exempt);
            }
            return;
        }
        if self.check_array_mutation(expr, callee, args, position == Position::Statement) {
            for arg in args {
                self.visit_expr(arg, Use::Read);
            }
            return;
        }
        self.visit_expr(callee, Use::Callee);
        for arg in args {
            self.visit_expr(arg, Use::Read);
        }
    }

    /// `this.items().push(x)` mutates the array the signal holds. Only a
    /// statement-level call is rewritten, since `update` returns nothing.
    fn check_array_mutation(&self, expr: &Expr, callee: &Expr, args: &[Expr], fixable: bool) -> bool {
        let ExprKind::Member {
            object, property, ..
        } = &callee.kind
        else {
            return false;
        };
        if !ARRAY_MUTATORS.contains(&property.name.as_str()) {
            return false;
        }
        let ExprKind::Call {
            callee: signal,
            args: signal_args,
            ..
        } = &object.unwrap_transparent().kind
        else {
            return false;
        };
        if !signal_args.is_empty() {
            return false;
        }
        let Some(target) = self.full_match(signal) else {
            return false;
        };
        if target.entry.kind != SignalKind::Writable {
            return false;
        }

        let method = property.name.as_str();
        let path = target.path;
        let args_text = args
            .iter()
            .map(|arg| self.unit.text(arg.span))
            .collect::<Vec<_>>()
            .join(", ");
        let fix = (fixable
            && !mentions_identifier(&args_text, CALLBACK_PARAM)
            && !mentions_identifier(&args_text, COPY_NAME))
        .then(|| {
            let signal_text = self.unit.text(target.span);
            SuggestedFix::single(
                format!("update `{path}` with a modified copy"),
                Replacement::replace(
                    expr.span,
                    format!(
                        "{signal_text}.update({CALLBACK_PARAM} => {{ const {COPY_NAME} = [...{CALLBACK_PARAM}]; {COPY_NAME}.{method}({args_text}); return {COPY_NAME}; }})"
                    ),
                ),
            )
        });
        self.sink.emit(
            Diagnostic::warning(
                self.code,
                format!("`{method}()` mutates the array held by signal `{path}` in place"),
                expr.span,
            )
            .with_message_id("signalMutation")
            .with_data("identifier", path.as_str())
            .with_data("method", method)
            .with_note("the signal keeps the same reference and does not notify its consumers")
            .with_optional_fix(fix),
        );
        true
    }

    fn visit_assign(&self, expr: &Expr, op: AssignOp, target: &Expr, value: &Expr, position: Position) {
        let fixable = position == Position::Statement;
        let place = target.unwrap_transparent();

        // this.count() = v
        if let ExprKind::Call { callee, args, .. } = &place.kind {
            if let Some(matched) = args.is_empty().then(|| self.full_match(callee)).flatten() {
                match matched.entry.kind {
                    SignalKind::ReadOnly => self.report_readonly(expr.span, &matched.path),
                    SignalKind::Writable => {
                        let fix = fixable
                            .then(|| self.write_fix(expr.span, &matched, op, value))
                            .flatten();
                        self.emit(
                            "signalCallAssignment",
                            format!("the value returned by signal `{}` is not assignable", matched.path),
                            expr.span,
                            &matched.path,
                            fix,
                        );
                    }
                }
                self.visit_expr(value, Use::Read);
                return;
            }
        }

        let chain = MemberChain::of(place);
        if chain.is_this_rooted() {
            let names = chain.names();
            if let Some((matched, entry)) = self.table.longest_match(&names) {
                if !self.is_own(&names, matched) {
                    let signal = FullMatch {
                        path: names[..matched].join("."),
                        entry,
                        span: chain.links[matched - 1].node.span,
                    };
                    self.check_chain_assignment(expr, op, place, value, &signal, &chain.links[matched..], fixable);
                }
                self.visit_expr(value, Use::Read);
                return;
            }
        }

        self.visit_expr(target, Use::Read);
        self.visit_expr(value, Use::Read);
    }

    #[allow(clippy::too_many_arguments)]
    fn check_chain_assignment(
        &self,
        expr: &Expr,
        op: AssignOp,
        place: &Expr,
        value: &Expr,
        signal: &FullMatch<'_>,
        keys: &[ChainLink<'_, Expr>],
        fixable: bool,
    ) {
        let path = &signal.path;
        if signal.entry.kind == SignalKind::ReadOnly {
            self.report_readonly(expr.span, path);
            return;
        }

        if keys.is_empty() {
            // `this.count = signal(1)` replaces the signal on purpose.
            let redeclared = op == AssignOp::Assign
                && classify_initializer(value).is_some_and(|(kind, _)| kind == signal.entry.kind);
            if redeclared {
                return;
            }
            let fix = fixable
                .then(|| self.write_fix(expr.span, signal, op, value))
                .flatten();
            self.emit(
                "signalAssignment",
                format!("signal `{path}` is overwritten by assignment"),
                expr.span,
                path,
                fix,
            );
            return;
        }

        let fix = (fixable && op == AssignOp::Assign)
            .then(|| self.nested_fix(expr.span, signal, keys, value))
            .flatten();
        let target_text = self.unit.text(place.span);
        self.sink.emit(
            Diagnostic::warning(
                self.code,
                format!("`{target_text}` mutates the value of signal `{path}` in place"),
                expr.span,
            )
            .with_message_id("nestedSignalAssignment")
            .with_data("identifier", path.as_str())
            .with_data("target", target_text)
            .with_help(format!("replace the value through `{path}.update(...)`"))
            .with_optional_fix(fix),
        );
    }

    fn visit_update(&self, expr: &Expr, op: UpdateOp, operand: &Expr, position: Position) {
        let Some(matched) = self.full_match(operand) else {
            self.visit_expr(operand, Use::Read);
            return;
        };
        if matched.entry.kind == SignalKind::ReadOnly {
            self.report_readonly(expr.span, &matched.path);
            return;
        }
        let sign = match op {
            UpdateOp::Increment => "+",
            UpdateOp::Decrement => "-",
        };
        let fix = (position == Position::Statement).then(|| {
            let signal_text = self.unit.text(matched.span);
            SuggestedFix::single(
                format!("use `{}.update(...)`", matched.path),
                Replacement::replace(
                    expr.span,
                    format!("{signal_text}.update({CALLBACK_PARAM} => {CALLBACK_PARAM} {sign} 1)"),
                ),
            )
        });
        self.emit(
            "signalAssignment",
            format!("signal `{}` is overwritten by `{sign}{sign}`", matched.path),
            expr.span,
            &matched.path,
            fix,
        );
    }

    // ------------------------------------------------------------------
    // Fixes
    // ------------------------------------------------------------------

    /// `this.x = v` → `this.x.set(v)`; `this.x op= v` → `this.x.update(value => value op v)`.
    fn write_fix(&self, span: Span, signal: &FullMatch<'_>, op: AssignOp, value: &Expr) -> Option<SuggestedFix> {
        let value_text = self.unit.text(value.span);
        if value_text.is_empty() {
            return None;
        }
        let signal_text = self.unit.text(signal.span);
        let replacement = match op.binary_text() {
            None => format!("{signal_text}.set({value_text})"),
            Some(binary) => {
                if mentions_identifier(value_text, CALLBACK_PARAM) {
                    return None;
                }
                let rhs = if needs_parens(value) {
                    format!("({value_text})")
                } else {
                    value_text.to_string()
                };
                format!("{signal_text}.update({CALLBACK_PARAM} => {CALLBACK_PARAM} {binary} {rhs})")
            }
        };
        let verb = if op == AssignOp::Assign { "set" } else { "update" };
        Some(SuggestedFix::single(
            format!("use `{}.{verb}(...)`", signal.path),
            Replacement::replace(span, replacement),
        ))
    }

    /// Rebuilds every level between the signal and the assigned key with
    /// object spreads.
    fn nested_fix(
        &self,
        span: Span,
        signal: &FullMatch<'_>,
        keys: &[ChainLink<'_, Expr>],
        value: &Expr,
    ) -> Option<SuggestedFix> {
        let value_text = self.unit.text(value.span);
        if value_text.is_empty() || mentions_identifier(value_text, CALLBACK_PARAM) {
            return None;
        }
        if keys.iter().any(|k| k.optional || k.name.starts_with('#')) {
            return None;
        }
        let names: Vec<&str> = keys.iter().map(|k| k.name).collect();
        let body = spread_levels(CALLBACK_PARAM, &names, value_text);
        let signal_text = self.unit.text(signal.span);
        Some(SuggestedFix::single(
            format!("replace the value of `{}` with an updated copy", signal.path),
            Replacement::replace(span, format!("{signal_text}.update({CALLBACK_PARAM} => ({body}))")),
        ))
    }

    // ------------------------------------------------------------------
    // Matching and reporting
    // ------------------------------------------------------------------

    /// Resolves `expr` when it names an identifier exactly (`this.a.b`).
    fn full_match<'t>(&'t self, expr: &Expr) -> Option<FullMatch<'t>> {
        let chain = MemberChain::of(expr);
        if !chain.is_this_rooted() || chain.is_empty() {
            return None;
        }
        let names = chain.names();
        let (matched, entry) = self.table.longest_match(&names)?;
        if matched != names.len() || self.is_own(&names, matched) {
            return None;
        }
        Some(FullMatch {
            path: names.join("."),
            entry,
            span: chain.links[matched - 1].node.span,
        })
    }

    /// Whether the matched path lies in the initializer being walked.
    fn is_own(&self, names: &[&str], matched: usize) -> bool {
        let Some(own) = &self.own else {
            return false;
        };
        let path = names[..matched].join(".");
        path == *own || path.starts_with(&format!("{own}."))
    }

    fn report_readonly(&self, span: Span, path: &str) {
        self.emit(
            "readonlySignalAssignment",
            format!("read-only signal `{path}` cannot be assigned"),
            span,
            path,
            None,
        );
    }

    fn emit(&self, id: &str, message: String, span: Span, path: &str, fix: Option<SuggestedFix>) {
        self.sink.emit(
            Diagnostic::warning(self.code, message, span)
                .with_message_id(id)
                .with_data("identifier", path)
                .with_optional_fix(fix),
        );
    }
}

/// `{ ...base, k1: { ...base.k1, k2: rhs } }`
fn spread_levels(base: &str, keys: &[&str], rhs: &str) -> String {
    match keys {
        [] => rhs.to_string(),
        [key, rest @ ..] => {
            let inner = spread_levels(&format!("{base}.{key}"), rest, rhs);
            format!("{{ ...{base}, {key}: {inner} }}")
        }
    }
}
