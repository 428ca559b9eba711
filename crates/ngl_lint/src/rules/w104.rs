//! W104: Lifecycle interface — hook methods and `implements` clauses that do
//! not match.

use std::collections::BTreeMap;

use ngl_diagnostics::{
    Category, Diagnostic, DiagnosticCode, DiagnosticSink, Replacement, Severity, SuggestedFix,
};
use ngl_source::Span;
use ngl_ts_parser::ast::{ClassDecl, ModifierKind, ModifierList, Program};

use crate::helpers::import_edits;
use crate::unit::LintUnit;
use crate::LintRule;

const ANGULAR_CORE: &str = "@angular/core";
const IONIC_ANGULAR: &str = "@ionic/angular";
const IONIC_STANDALONE: &str = "@ionic/angular/standalone";

/// Where a lifecycle interface is exported from.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Framework {
    Angular,
    Ionic,
}

/// Hook method, interface, framework.
const HOOKS: &[(&str, &str, Framework)] = &[
    ("ngOnChanges", "OnChanges", Framework::Angular),
    ("ngOnInit", "OnInit", Framework::Angular),
    ("ngDoCheck", "DoCheck", Framework::Angular),
    ("ngAfterContentInit", "AfterContentInit", Framework::Angular),
    ("ngAfterContentChecked", "AfterContentChecked", Framework::Angular),
    ("ngAfterViewInit", "AfterViewInit", Framework::Angular),
    ("ngAfterViewChecked", "AfterViewChecked", Framework::Angular),
    ("ngOnDestroy", "OnDestroy", Framework::Angular),
    ("ionViewWillEnter", "ViewWillEnter", Framework::Ionic),
    ("ionViewDidEnter", "ViewDidEnter", Framework::Ionic),
    ("ionViewWillLeave", "ViewWillLeave", Framework::Ionic),
    ("ionViewDidLeave", "ViewDidLeave", Framework::Ionic),
];

/// Detects lifecycle hooks declared without their interface, and lifecycle
/// interfaces implemented without their hook.
///
/// All missing interfaces of a class are added by one fix, attached to the
/// first report, together with the imports they need.
pub struct LifecycleInterface;

impl LintRule for LifecycleInterface {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Warning, 104)
    }

    fn name(&self) -> &str {
        "lifecycle-interface"
    }

    fn description(&self) -> &str {
        "lifecycle hook and implemented interface do not match"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check_unit(&self, unit: &LintUnit, sink: &DiagnosticSink) {
        for class in unit.components() {
            self.check_class(&unit.program, class, sink);
        }
    }
}

impl LifecycleInterface {
    fn check_class(&self, program: &Program, class: &ClassDecl, sink: &DiagnosticSink) {
        let hook_span = |hook: &str| {
            class
                .methods()
                .filter(|m| !m.modifiers.has(ModifierKind::Static))
                .find(|m| m.key.name() == Some(hook))
                .map(|m| m.key.span())
        };
        let implements = |iface: &str| class.implements.iter().any(|i| unqualified(&i.name) == iface);

        let missing: Vec<(&str, &str, Framework, Span)> = HOOKS
            .iter()
            .filter_map(|&(hook, iface, framework)| {
                let span = hook_span(hook)?;
                (!implements(iface)).then_some((hook, iface, framework, span))
            })
            .collect();

        let mut fix = add_interfaces_fix(program, class, &missing);
        for &(hook, iface, _, span) in &missing {
            sink.emit(
                Diagnostic::warning(
                    self.code(),
                    format!("`{hook}` is declared but the class does not implement `{iface}`"),
                    span,
                )
                .with_message_id("missingInterface")
                .with_data("hook", hook)
                .with_data("interface", iface)
                .with_optional_fix(fix.take()),
            );
        }

        for declared in &class.implements {
            let name = unqualified(&declared.name);
            let Some(&(hook, iface, _)) = HOOKS.iter().find(|(_, i, _)| *i == name) else {
                continue;
            };
            if hook_span(hook).is_none() {
                sink.emit(
                    Diagnostic::warning(
                        self.code(),
                        format!("the class implements `{iface}` but does not declare `{hook}`"),
                        declared.span,
                    )
                    .with_message_id("missingHook")
                    .with_data("hook", hook)
                    .with_data("interface", iface),
                );
            }
        }
    }
}

fn add_interfaces_fix(
    program: &Program,
    class: &ClassDecl,
    missing: &[(&str, &str, Framework, Span)],
) -> Option<SuggestedFix> {
    if missing.is_empty() {
        return None;
    }
    let names: Vec<&str> = missing.iter().map(|m| m.1).collect();
    let list = names.join(", ");
    let mut replacements = vec![match class.implements.last() {
        Some(last) => Replacement::insert_after(last.span, format!(", {list}")),
        None => Replacement::insert(
            Span::point(class.span.file, class.header_end),
            format!(" implements {list}"),
        ),
    }];

    let mut by_module: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for &(_, iface, framework, _) in missing {
        by_module
            .entry(module_for(program, framework))
            .or_default()
            .push(iface);
    }
    for (module, ifaces) in by_module {
        replacements.extend(import_edits(program, module, &ifaces));
    }
    Some(SuggestedFix::new(
        format!("implement {list}"),
        replacements,
    ))
}

/// `ng.OnInit` → `OnInit`.
fn unqualified(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Standalone Ionic projects import from `@ionic/angular/standalone`.
fn module_for(program: &Program, framework: Framework) -> &'static str {
    match framework {
        Framework::Angular => ANGULAR_CORE,
        Framework::Ionic if program.import_from(IONIC_STANDALONE).is_some() => IONIC_STANDALONE,
        Framework::Ionic => IONIC_ANGULAR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed, ids, lint};

    #[test]
    fn rule_metadata() {
        let rule = LifecycleInterface;
        assert_eq!(rule.code(), DiagnosticCode::new(Category::Warning, 104));
        assert_eq!(rule.name(), "lifecycle-interface");
        assert_eq!(rule.default_severity(), Severity::Warning);
    }

    #[test]
    fn missing_interfaces_are_added_with_imports() {
        let src = "import { Component } from '@angular/core';\n\n\
                   @Component({ selector: 'app-home' })\n\
                   export class HomePage {\n  ngOnInit() {}\n  ionViewWillEnter() {}\n}\n";
        let diags = lint(&LifecycleInterface, src);
        assert_eq!(ids(&diags), ["missingInterface", "missingInterface"]);
        assert!(diags[0].fix.is_some());
        assert!(diags[1].fix.is_none());

        let out = fixed(&LifecycleInterface, src);
        assert!(out.starts_with(
            "import { Component, OnInit } from '@angular/core';\nimport { ViewWillEnter } from '@ionic/angular';\n"
        ));
        assert!(out.contains("export class HomePage implements OnInit, ViewWillEnter {"));
        assert!(lint(&LifecycleInterface, &out).is_empty());
    }

    #[test]
    fn appends_to_an_existing_implements_clause() {
        let src = "import { Component, OnInit, OnDestroy } from '@angular/core';\n\
                   @Component({})\n\
                   export class HomePage implements OnInit {\n  ngOnInit() {}\n  ngOnDestroy() {}\n}\n";
        let out = fixed(&LifecycleInterface, src);
        assert!(out.contains("export class HomePage implements OnInit, OnDestroy {"));
        assert!(out.starts_with("import { Component, OnInit, OnDestroy } from '@angular/core';\n"));
    }

    #[test]
    fn standalone_ionic_imports() {
        let src = "import { Component } from '@angular/core';\n\
                   import { IonContent } from '@ionic/angular/standalone';\n\
                   @Component({})\n\
                   export class HomePage {\n  ionViewDidLeave() {}\n}\n";
        let out = fixed(&LifecycleInterface, src);
        assert!(out.contains("import { IonContent, ViewDidLeave } from '@ionic/angular/standalone';"));
    }

    #[test]
    fn interface_without_hook_is_reported_without_fix() {
        let src = "@Component({})\nexport class HomePage implements OnDestroy {\n  ngOnInit() {}\n}\n";
        let diags = lint(&LifecycleInterface, src);
        assert_eq!(ids(&diags), ["missingInterface", "missingHook"]);
        assert_eq!(diags[1].data["hook"], "ngOnDestroy");
        assert!(diags[1].fix.is_none());
    }

    #[test]
    fn matching_hooks_and_interfaces_pass() {
        let src = "@Component({})\nexport class HomePage implements OnInit, ViewDidEnter {\n  ngOnInit() {}\n  ionViewDidEnter() {}\n  ngOnInitLater() {}\n}\n";
        assert!(lint(&LifecycleInterface, src).is_empty());
    }

    #[test]
    fn non_components_are_ignored() {
        let src = "@Injectable()\nexport class Store {\n  ngOnDestroy() {}\n}\n";
        assert!(lint(&LifecycleInterface, src).is_empty());
    }
}
