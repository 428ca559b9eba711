//! C101: Prefer readonly — Angular-managed members that are never reassigned
//! should be declared `readonly`.

use std::collections::HashSet;

use ngl_config::PreferReadonlyOptions;
use ngl_diagnostics::{
    Category, Diagnostic, DiagnosticCode, DiagnosticSink, Replacement, Severity, SuggestedFix,
};
use ngl_ts_parser::ast::{
    ClassDecl, ClassMember, Expr, ExprKind, ModifierKind, ModifierList, PropertyDecl,
};

use crate::helpers::{this_member, walk_block, walk_expr, walk_function};
use crate::signals::classify_initializer;
use crate::unit::LintUnit;
use crate::LintRule;

/// Calls whose result is owned by the framework rather than the class.
const MANAGED_FACTORIES: &[&str] = &["inject", "output", "outputFromObservable"];

/// Detects signal, `inject()` and `output()` fields that are missing
/// `readonly`.
///
/// A field assigned anywhere outside the constructor body proper is left
/// alone; assignments inside callbacks created by the constructor count as
/// reassignments.
pub struct PreferReadonly {
    options: PreferReadonlyOptions,
}

impl PreferReadonly {
    /// Creates the rule from `[lint.rules.prefer-readonly]`.
    pub fn new(options: PreferReadonlyOptions) -> Self {
        Self { options }
    }
}

impl LintRule for PreferReadonly {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Convention, 101)
    }

    fn name(&self) -> &str {
        "prefer-readonly"
    }

    fn description(&self) -> &str {
        "framework-managed member should be readonly"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check_unit(&self, unit: &LintUnit, sink: &DiagnosticSink) {
        for class in unit.components() {
            let reassigned = reassigned_members(class);
            for prop in class.properties() {
                if !self.is_candidate(prop) {
                    continue;
                }
                let Some(name) = prop.key.name() else {
                    continue;
                };
                let bare = name.trim_start_matches('#');
                if reassigned.contains(bare) {
                    continue;
                }
                let key = prop.key.span();
                sink.emit(
                    Diagnostic::warning(
                        self.code(),
                        format!("`{bare}` is never reassigned; mark it `readonly`"),
                        key,
                    )
                    .with_message_id("preferReadonly")
                    .with_data("name", bare)
                    .with_fix(SuggestedFix::single(
                        "add `readonly`",
                        Replacement::insert(key, "readonly "),
                    )),
                );
            }
        }
    }
}

impl PreferReadonly {
    fn is_candidate(&self, prop: &PropertyDecl) -> bool {
        if prop.modifiers.has(ModifierKind::Static)
            || prop.modifiers.has(ModifierKind::Readonly)
            || prop.modifiers.has(ModifierKind::Declare)
            || prop.modifiers.has(ModifierKind::Accessor)
        {
            return false;
        }
        if self.options.ignore_private_properties
            && (prop.modifiers.has(ModifierKind::Private) || prop.key.is_private_name())
        {
            return false;
        }
        prop.value.as_ref().is_some_and(|value| {
            classify_initializer(value).is_some() || is_managed_factory(value)
        })
    }
}

fn is_managed_factory(expr: &Expr) -> bool {
    match &expr.unwrap_transparent().kind {
        ExprKind::Call { callee, .. } => callee
            .as_ident()
            .is_some_and(|name| MANAGED_FACTORIES.contains(&name)),
        _ => false,
    }
}

/// Names of `this.*` members written outside the constructor body.
fn reassigned_members(class: &ClassDecl) -> HashSet<String> {
    let mut names = HashSet::new();
    let mut record = |expr: &Expr| {
        if let Some(name) = written_member(expr) {
            names.insert(name.to_string());
        }
        true
    };

    for member in &class.members {
        match member {
            ClassMember::Property(prop) => {
                if let Some(value) = &prop.value {
                    walk_expr(value, &mut record);
                }
            }
            ClassMember::Method(method) => walk_function(&method.function, &mut record),
            ClassMember::StaticBlock(block) => walk_block(block, &mut record),
            ClassMember::Constructor(ctor) => {
                let Some(body) = &ctor.body else { continue };
                // Direct writes are initialization; writes in closures are not.
                walk_block(body, &mut |expr| match &expr.kind {
                    ExprKind::Function(function) => {
                        walk_function(function, &mut record);
                        false
                    }
                    ExprKind::Class(_) => false,
                    _ => true,
                });
            }
            ClassMember::Other(_) => {}
        }
    }
    names
}

fn written_member(expr: &Expr) -> Option<&str> {
    match &expr.kind {
        ExprKind::Assign { target, .. } => this_member(target),
        ExprKind::Update { operand, .. } => this_member(operand),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed, ids, lint};

    fn rule() -> PreferReadonly {
        PreferReadonly::new(PreferReadonlyOptions::default())
    }

    #[test]
    fn rule_metadata() {
        let rule = rule();
        assert_eq!(rule.code(), DiagnosticCode::new(Category::Convention, 101));
        assert_eq!(rule.name(), "prefer-readonly");
        assert_eq!(rule.default_severity(), Severity::Warning);
    }

    #[test]
    fn managed_members_get_readonly() {
        let src = "@Component({})\nexport class HomePage {\n  \
                   count = signal(0);\n  \
                   protected total = computed(() => this.count() * 2);\n  \
                   private http = inject(HttpClient);\n  \
                   closed = output<void>();\n  \
                   plain = 0;\n  \
                   readonly done = signal(false);\n}\n";
        let diags = lint(&rule(), src);
        assert_eq!(ids(&diags), ["preferReadonly"; 4]);
        let names: Vec<_> = diags.iter().map(|d| d.data["name"].as_str()).collect();
        assert_eq!(names, ["count", "total", "http", "closed"]);

        let out = fixed(&rule(), src);
        assert!(out.contains("  readonly count = signal(0);"));
        assert!(out.contains("  protected readonly total = computed("));
        assert!(out.contains("  private readonly http = inject(HttpClient);"));
        assert!(lint(&rule(), &out).is_empty());
    }

    #[test]
    fn reassignment_outside_the_constructor_is_respected() {
        let src = "@Component({})\nexport class HomePage {\n  \
                   a = signal(0);\n  b = signal(0);\n  c = signal(0);\n  d = signal(0);\n  \
                   constructor() {\n    this.a = signal(1);\n    \
                   effect(() => { this.b = signal(2); });\n  }\n  \
                   reset() { this.c = signal(0); }\n  \
                   handler = () => { this.d = signal(3); };\n}\n";
        let diags = lint(&rule(), src);
        let names: Vec<_> = diags.iter().map(|d| d.data["name"].as_str()).collect();
        assert_eq!(names, ["a"]);
    }

    #[test]
    fn private_members_can_be_ignored() {
        let src = "@Component({})\nexport class HomePage {\n  \
                   private store = inject(Store);\n  #router = inject(Router);\n  \
                   name = input('');\n}\n";
        let ignoring = PreferReadonly::new(PreferReadonlyOptions {
            ignore_private_properties: true,
        });
        let diags = lint(&ignoring, src);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].data["name"], "name");

        assert_eq!(lint(&rule(), src).len(), 3);
    }

    #[test]
    fn static_members_and_non_components_are_ignored() {
        let src = "@Component({})\nexport class A {\n  static count = signal(0);\n}\n\
                   @Injectable()\nexport class B {\n  http = inject(HttpClient);\n}\n";
        assert!(lint(&rule(), src).is_empty());
    }
}
