//! W106: Template signal usage — signals read in a component template
//! without being called.

use ngl_diagnostics::{
    Category, Diagnostic, DiagnosticCode, DiagnosticSink, Replacement, Severity, SuggestedFix,
};
use ngl_source::Span;
use ngl_template_parser::{
    Attribute, AttributeBinding, AttributeKind, Element, TemplateExpr, TemplateExprKind,
    TemplateNode,
};

use crate::helpers::MemberChain;
use crate::signals::{SignalKind, SignalTable};
use crate::unit::{ComponentTemplate, LintUnit};
use crate::LintRule;

/// Context variables every `@for` block provides.
const FOR_CONTEXT: &[&str] = &["$index", "$first", "$last", "$even", "$odd", "$count"];

/// Detects signals read in templates without being called, and signals
/// overwritten from event bindings.
///
/// Names are resolved against the component's [`SignalTable`] after
/// template-local names (`@let`, `@for` items and aliases, `@if ...; as`,
/// `#refs`, structural directive locals) have been ruled out.
pub struct TemplateSignalUsage;

impl LintRule for TemplateSignalUsage {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Warning, 106)
    }

    fn name(&self) -> &str {
        "template-signal-usage"
    }

    fn description(&self) -> &str {
        "signal read in a template without being called"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check_unit(&self, unit: &LintUnit, sink: &DiagnosticSink) {
        for class in unit.components() {
            let Some(template) = unit.template_of(class) else {
                continue;
            };
            let table = SignalTable::from_class(class);
            if table.is_empty() {
                continue;
            }
            let mut refs = Vec::new();
            template
                .template
                .for_each_element(&mut |el| refs.extend(el.references().map(str::to_string)));

            let mut checker = TemplateChecker {
                code: self.code(),
                unit,
                template,
                table: &table,
                sink,
                scopes: vec![refs],
            };
            checker.visit_nodes(&template.template.nodes);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Use {
    Read,
    Callee,
}

struct TemplateChecker<'a> {
    code: DiagnosticCode,
    unit: &'a LintUnit,
    template: &'a ComponentTemplate,
    table: &'a SignalTable,
    sink: &'a DiagnosticSink,
    /// Template-local names, innermost scope last.
    scopes: Vec<Vec<String>>,
}

impl TemplateChecker<'_> {
    fn visit_nodes(&mut self, nodes: &[TemplateNode]) {
        let lets = nodes
            .iter()
            .filter_map(|node| match node {
                TemplateNode::LetDeclaration(decl) => Some(decl.name.clone()),
                _ => None,
            })
            .collect();
        self.scopes.push(lets);
        for node in nodes {
            self.visit_node(node);
        }
        self.scopes.pop();
    }

    fn visit_scoped(&mut self, locals: Vec<String>, nodes: &[TemplateNode]) {
        self.scopes.push(locals);
        self.visit_nodes(nodes);
        self.scopes.pop();
    }

    fn visit_node(&mut self, node: &TemplateNode) {
        match node {
            TemplateNode::Element(el) => self.visit_element(el),
            TemplateNode::Text(_) | TemplateNode::Comment(_) => {}
            TemplateNode::BoundText(text) => {
                for expr in &text.exprs {
                    self.visit_expr(expr, Use::Read);
                }
            }
            TemplateNode::IfBlock(block) => {
                for branch in &block.branches {
                    if let Some(condition) = &branch.condition {
                        self.visit_expr(condition, Use::Read);
                    }
                    let locals = branch.alias.iter().cloned().collect();
                    self.visit_scoped(locals, &branch.children);
                }
            }
            TemplateNode::ForBlock(block) => {
                self.visit_expr(&block.expression, Use::Read);
                let mut locals = vec![block.item.clone()];
                locals.extend(block.context_aliases.iter().cloned());
                locals.extend(FOR_CONTEXT.iter().map(|s| s.to_string()));
                self.scopes.push(locals);
                if let Some(track) = &block.track {
                    self.visit_expr(track, Use::Read);
                }
                self.visit_nodes(&block.children);
                self.scopes.pop();
                if let Some(empty) = &block.empty {
                    self.visit_nodes(empty);
                }
            }
            TemplateNode::SwitchBlock(block) => {
                self.visit_expr(&block.expression, Use::Read);
                for case in &block.cases {
                    if let Some(expr) = &case.expression {
                        self.visit_expr(expr, Use::Read);
                    }
                    self.visit_nodes(&case.children);
                }
            }
            TemplateNode::DeferBlock(block) => {
                for trigger in &block.triggers {
                    self.visit_expr(trigger, Use::Read);
                }
                self.visit_nodes(&block.children);
                for nodes in [&block.placeholder, &block.loading, &block.error]
                    .into_iter()
                    .flatten()
                {
                    self.visit_nodes(nodes);
                }
            }
            TemplateNode::LetDeclaration(decl) => self.visit_expr(&decl.value, Use::Read),
        }
    }

    fn visit_element(&mut self, el: &Element) {
        // Structural directive expressions are evaluated outside the
        // element's own locals.
        let (structural, rest): (Vec<&Attribute>, Vec<&Attribute>) = el
            .attributes
            .iter()
            .partition(|a| a.kind == AttributeKind::Structural);
        for attr in structural {
            self.visit_attribute(attr);
        }
        let locals = el.template_locals().into_iter().map(str::to_string).collect();
        self.scopes.push(locals);
        for attr in rest {
            self.visit_attribute(attr);
        }
        self.visit_nodes(&el.children);
        self.scopes.pop();
    }

    fn visit_attribute(&self, attr: &Attribute) {
        match (&attr.kind, &attr.binding) {
            (AttributeKind::TwoWay, AttributeBinding::Expr(expr)) => {
                // `[(value)]="name"` binds the signal itself.
                if self.resolve_full(expr).is_none() {
                    self.visit_expr(expr, Use::Read);
                }
            }
            (_, AttributeBinding::Expr(expr)) => self.visit_expr(expr, Use::Read),
            (_, AttributeBinding::Action(expr)) => self.visit_action(expr),
            (_, AttributeBinding::Interpolation(exprs)) => {
                for expr in exprs {
                    self.visit_expr(expr, Use::Read);
                }
            }
            (_, AttributeBinding::Template(bindings)) => {
                for expr in &bindings.exprs {
                    self.visit_expr(expr, Use::Read);
                }
            }
            (_, AttributeBinding::None) => {}
        }
    }

    fn visit_action(&self, expr: &TemplateExpr) {
        match &expr.kind {
            TemplateExprKind::Chain(exprs) => {
                for expr in exprs {
                    self.visit_action(expr);
                }
            }
            TemplateExprKind::PropertyWrite {
                receiver,
                name,
                name_span,
                value,
            } => {
                if !self.check_write(expr, receiver, name, *name_span, value) {
                    self.visit_expr(receiver, Use::Read);
                }
                self.visit_expr(value, Use::Read);
            }
            _ => self.visit_expr(expr, Use::Read),
        }
    }

    /// Reports `count = 0` and `user.name = x` in event handlers. Returns
    /// `true` when the target resolved to a signal.
    fn check_write(
        &self,
        expr: &TemplateExpr,
        receiver: &TemplateExpr,
        name: &str,
        name_span: Span,
        value: &TemplateExpr,
    ) -> bool {
        let chain = MemberChain::of(receiver);
        if !chain.is_component_rooted() {
            return false;
        }
        let mut names = chain.names();
        names.push(name);
        if self.is_shadowed(&chain, &names) {
            return false;
        }
        let Some((matched, entry)) = self.table.longest_match(&names) else {
            return false;
        };
        let path = names[..matched].join(".");

        if matched == names.len() {
            if entry.kind == SignalKind::ReadOnly {
                self.emit(
                    "readonlySignalAssignment",
                    format!("read-only signal `{path}` cannot be assigned"),
                    expr.span,
                    &path,
                    None,
                );
                return true;
            }
            let target = self.unit.text(Span::new(expr.span.file, expr.span.start, name_span.end));
            let value_text = self.unit.text(value.span);
            let fix = (!target.is_empty() && !value_text.is_empty())
                .then(|| {
                    SuggestedFix::single(
                        format!("use `{path}.set(...)`"),
                        Replacement::replace(expr.span, format!("{target}.set({value_text})")),
                    )
                })
                .and_then(|fix| self.template.fix(fix));
            self.emit(
                "signalAssignment",
                format!("signal `{path}` is overwritten by assignment"),
                expr.span,
                &path,
                fix,
            );
            return true;
        }

        self.emit(
            "nestedSignalAssignment",
            format!("the template mutates the value of signal `{path}` in place"),
            expr.span,
            &path,
            None,
        );
        true
    }

    fn visit_expr(&self, expr: &TemplateExpr, usage: Use) {
        match &expr.kind {
            TemplateExprKind::PropertyRead { .. }
            | TemplateExprKind::SafePropertyRead { .. }
            | TemplateExprKind::NonNullAssert(_)
            | TemplateExprKind::Parenthesized(_) => self.visit_chain(expr, usage),
            TemplateExprKind::Call { receiver, args }
            | TemplateExprKind::SafeCall { receiver, args } => {
                self.visit_expr(receiver, Use::Callee);
                for arg in args {
                    self.visit_expr(arg, Use::Read);
                }
            }
            _ => expr.for_each_child(|child| self.visit_expr(child, Use::Read)),
        }
    }

    fn visit_chain(&self, expr: &TemplateExpr, usage: Use) {
        let chain = MemberChain::of(expr);
        if chain.is_empty() {
            self.visit_expr(chain.root, usage);
            return;
        }
        if !chain.is_component_rooted() {
            self.visit_expr(chain.root, Use::Read);
            return;
        }
        let names = chain.names();
        if self.is_shadowed(&chain, &names) {
            return;
        }
        let Some((matched, _)) = self.table.longest_match(&names) else {
            return;
        };
        let depth = names.len();
        let flagged = match usage {
            Use::Read => depth != matched + 1,
            Use::Callee => depth >= matched + 2,
        };
        if !flagged {
            return;
        }

        let path = names[..matched].join(".");
        let span = chain.links[matched - 1].node.span;
        let fix = self.template.fix(SuggestedFix::single(
            format!("call `{path}()`"),
            Replacement::insert_after(span, "()"),
        ));
        self.sink.emit(
            Diagnostic::warning(
                self.code,
                format!("signal `{path}` is read in the template without being called"),
                self.template.report_span(span),
            )
            .with_message_id("signalNotInvoked")
            .with_data("identifier", path.as_str())
            .with_help(format!("call it: `{path}()`"))
            .with_optional_fix(fix),
        );
    }

    /// Whether the first segment names a template local rather than a
    /// component member.
    fn is_shadowed(&self, chain: &MemberChain<'_, TemplateExpr>, names: &[&str]) -> bool {
        let implicit = matches!(chain.root.kind, TemplateExprKind::ImplicitReceiver);
        implicit
            && names
                .first()
                .is_some_and(|first| self.scopes.iter().flatten().any(|local| local == first))
    }

    /// Resolves an expression that names an identifier exactly.
    fn resolve_full(&self, expr: &TemplateExpr) -> Option<String> {
        let chain = MemberChain::of(expr);
        if chain.is_empty() || !chain.is_component_rooted() {
            return None;
        }
        let names = chain.names();
        if self.is_shadowed(&chain, &names) {
            return None;
        }
        let (matched, _) = self.table.longest_match(&names)?;
        (matched == names.len()).then(|| names.join("."))
    }

    fn emit(&self, id: &str, message: String, span: Span, path: &str, fix: Option<SuggestedFix>) {
        self.sink.emit(
            Diagnostic::warning(self.code, message, self.template.report_span(span))
                .with_message_id(id)
                .with_data("identifier", path)
                .with_optional_fix(fix),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed, ids, lint, lint_with_fs};
    use ngl_diagnostics::apply_fixes;
    use ngl_source::MemoryFileSystem;

    fn page(fields: &str, template: &str) -> String {
        format!(
            "@Component({{\n  selector: 'app-home',\n  template: `{template}`,\n}})\nexport class HomePage {{\n  {fields}\n}}\n"
        )
    }

    #[test]
    fn rule_metadata() {
        let rule = TemplateSignalUsage;
        assert_eq!(rule.code(), DiagnosticCode::new(Category::Warning, 106));
        assert_eq!(rule.name(), "template-signal-usage");
        assert_eq!(rule.default_severity(), Severity::Warning);
    }

    #[test]
    fn interpolation_is_fixed_in_place() {
        let src = page("count = signal(0);", "<p>{{ count }}</p>");
        let diags = lint(&TemplateSignalUsage, &src);
        assert_eq!(ids(&diags), ["signalNotInvoked"]);
        let out = fixed(&TemplateSignalUsage, &src);
        assert!(out.contains("<p>{{ count() }}</p>"));
        assert!(lint(&TemplateSignalUsage, &out).is_empty());
    }

    #[test]
    fn called_signals_and_one_level_access_pass() {
        let src = page(
            "count = signal(0);\n  user = signal({ name: '' });",
            "<p>{{ count() }} {{ user().name }} {{ count.set }}</p><ion-button (click)=\"count.set(1)\"></ion-button>",
        );
        assert!(lint(&TemplateSignalUsage, &src).is_empty());
    }

    #[test]
    fn switch_discriminant_and_cases_each_report() {
        let src = page(
            "mode = signal('a');\n  first = signal('a');\n  second = signal('b');",
            "@switch (mode) { @case (first) { <p>1</p> } @case (second) { <p>2</p> } @default { <p>0</p> } }",
        );
        let diags = lint(&TemplateSignalUsage, &src);
        assert_eq!(ids(&diags), ["signalNotInvoked"; 3]);
        let paths: Vec<_> = diags.iter().map(|d| d.data["identifier"].as_str()).collect();
        assert_eq!(paths, ["mode", "first", "second"]);
    }

    #[test]
    fn control_flow_and_pipes_are_walked() {
        let src = page(
            "items = signal([]);\n  loading = signal(false);\n  date = signal(0);",
            "@if (loading) { <ion-spinner></ion-spinner> } @for (item of items; track item.id) { {{ date | date }} } @defer (when loading) { <p></p> }",
        );
        let diags = lint(&TemplateSignalUsage, &src);
        let paths: Vec<_> = diags.iter().map(|d| d.data["identifier"].as_str()).collect();
        assert_eq!(paths, ["loading", "items", "date", "loading"]);
    }

    #[test]
    fn template_locals_shadow_signals() {
        let src = page(
            "count = signal(0);\n  items = signal([]);",
            "@for (count of items(); track $index) { {{ count }} } @let total = items(); {{ total }} <ion-input #count></ion-input>",
        );
        assert!(lint(&TemplateSignalUsage, &src).is_empty());
    }

    #[test]
    fn safe_navigation_two_levels_past_the_match() {
        let src = page("user = signal({ address: { city: '' } });", "{{ user?.address?.city }}");
        let out = fixed(&TemplateSignalUsage, &src);
        assert!(out.contains("{{ user()?.address?.city }}"));
    }

    #[test]
    fn two_way_binding_accepts_bare_writable_signal() {
        let src = page("query = signal('');", "<ion-searchbar [(value)]=\"query\"></ion-searchbar>");
        assert!(lint(&TemplateSignalUsage, &src).is_empty());
    }

    #[test]
    fn event_assignment_becomes_set() {
        let src = page("count = signal(0);", "<ion-button (click)=\"count = count() + 1\"></ion-button>");
        let diags = lint(&TemplateSignalUsage, &src);
        assert_eq!(ids(&diags), ["signalAssignment"]);
        let out = fixed(&TemplateSignalUsage, &src);
        assert!(out.contains("(click)=\"count.set(count() + 1)\""));
    }

    #[test]
    fn event_writes_into_readonly_and_nested_values() {
        let src = page(
            "name = input('');\n  user = signal({ name: '' });",
            "<ion-button (click)=\"name = 'x'; user.name = 'y'\"></ion-button>",
        );
        let diags = lint(&TemplateSignalUsage, &src);
        assert_eq!(ids(&diags), ["readonlySignalAssignment", "nestedSignalAssignment"]);
        assert!(diags.iter().all(|d| d.fix.is_none()));
    }

    #[test]
    fn external_template_fix_targets_the_html_file() {
        let fs = MemoryFileSystem::new().with_file("/app/src/home.page.html", "<p>{{ count }}</p>\n");
        let src = "@Component({ templateUrl: './home.page.html' })\nexport class HomePage {\n  count = signal(0);\n}\n";
        let (db, diags) = lint_with_fs(&TemplateSignalUsage, src, &fs);
        assert_eq!(diags.len(), 1);
        let file = diags[0].primary_span.file;
        let html = &db.get_file(file).content;
        let out = apply_fixes(html, file, &diags).unwrap();
        assert_eq!(out.text, "<p>{{ count() }}</p>\n");
    }

    #[test]
    fn escaped_inline_template_reports_without_fix() {
        let src = "@Component({ template: '<p title=\\'a\\'>{{ count }}</p>' })\nexport class HomePage {\n  count = signal(0);\n}\n";
        let diags = lint(&TemplateSignalUsage, src);
        assert_eq!(ids(&diags), ["signalNotInvoked"]);
        assert!(diags[0].fix.is_none());
    }

    #[test]
    fn non_components_are_ignored() {
        let src = "@Directive({ selector: '[x]' })\nexport class X {\n  count = signal(0);\n}\n";
        assert!(lint(&TemplateSignalUsage, src).is_empty());
    }
}
