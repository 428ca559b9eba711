//! C102: Prefer inject — constructor parameter injection in Angular classes.

use ngl_diagnostics::{
    Category, Diagnostic, DiagnosticCode, DiagnosticSink, Replacement, Severity, SuggestedFix,
};
use ngl_ts_parser::ast::{ClassDecl, Constructor, ModifierKind, ModifierList, Param};

use crate::helpers::{has_any_decorator, import_edits};
use crate::unit::LintUnit;
use crate::LintRule;

const ANGULAR_CORE: &str = "@angular/core";

/// Classes whose constructors Angular's injector calls.
const INJECTABLE_DECORATORS: &[&str] = &["Component", "Directive", "Pipe", "Injectable"];

/// Parameter decorators and the `inject()` option each one becomes.
const FLAG_DECORATORS: &[(&str, &str)] = &[
    ("Optional", "optional"),
    ("Self", "self"),
    ("SkipSelf", "skipSelf"),
    ("Host", "host"),
];

/// Detects dependencies received through constructor parameters.
///
/// When the constructor does nothing but declare parameter properties, the
/// first report carries a fix that rewrites it into `inject()` fields.
pub struct PreferInject;

impl LintRule for PreferInject {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Convention, 102)
    }

    fn name(&self) -> &str {
        "prefer-inject"
    }

    fn description(&self) -> &str {
        "constructor parameter injection instead of inject()"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check_unit(&self, unit: &LintUnit, sink: &DiagnosticSink) {
        for class in unit.program.classes() {
            if has_any_decorator(class, INJECTABLE_DECORATORS) {
                self.check_class(unit, class, sink);
            }
        }
    }
}

impl PreferInject {
    fn check_class(&self, unit: &LintUnit, class: &ClassDecl, sink: &DiagnosticSink) {
        let Some(ctor) = class.constructor() else {
            return;
        };
        let injected: Vec<&Param> = ctor.params.iter().filter(|p| is_injected(p)).collect();
        if injected.is_empty() {
            return;
        }

        let mut fix = rewrite_fix(unit, ctor);
        for param in injected {
            let name = param.pattern.as_ident().map_or("parameter", |id| id.name.as_str());
            sink.emit(
                Diagnostic::warning(
                    self.code(),
                    format!("`{name}` is injected through the constructor; use `inject()`"),
                    param.span,
                )
                .with_message_id("preferInject")
                .with_data("name", name)
                .with_optional_fix(fix.take()),
            );
        }
    }
}

fn is_injected(param: &Param) -> bool {
    param.type_ann.is_some()
        || param.decorators.iter().any(|d| {
            d.name()
                .is_some_and(|n| n == "Inject" || FLAG_DECORATORS.iter().any(|(f, _)| *f == n))
        })
}

/// One `inject()` field per parameter, replacing the whole constructor.
fn rewrite_fix(unit: &LintUnit, ctor: &Constructor) -> Option<SuggestedFix> {
    if !ctor.body.as_ref().is_some_and(|b| b.stmts.is_empty()) {
        return None;
    }
    unit.program.import_from(ANGULAR_CORE)?;

    let lines = ctor
        .params
        .iter()
        .map(|p| field_for(unit, p))
        .collect::<Option<Vec<_>>>()?;
    let indent = unit.indentation_at(ctor.span);
    let mut replacements = vec![Replacement::replace(
        ctor.span,
        lines.join(&format!("\n{indent}")),
    )];
    replacements.extend(import_edits(&unit.program, ANGULAR_CORE, &["inject"]));
    Some(SuggestedFix::new("convert to `inject()` fields", replacements))
}

/// `private readonly http = inject(HttpClient);`
fn field_for(unit: &LintUnit, param: &Param) -> Option<String> {
    if param.rest || param.optional || param.default.is_some() {
        return None;
    }
    let name = param.pattern.as_ident()?;
    let access = [
        (ModifierKind::Public, "public "),
        (ModifierKind::Protected, "protected "),
        (ModifierKind::Private, "private "),
    ]
    .into_iter()
    .find(|(kind, _)| param.modifiers.has(*kind))
    .map(|(_, text)| text);
    if access.is_none() && !param.modifiers.has(ModifierKind::Readonly) {
        return None;
    }

    let type_text = param
        .type_ann
        .map(|span| unit.text(span).trim_start_matches(':').trim());
    let mut token = None;
    let mut flags = Vec::new();
    for decorator in &param.decorators {
        match decorator.name()? {
            "Inject" => match decorator.args() {
                [arg] => token = Some(unit.text(arg.span)),
                _ => return None,
            },
            other => {
                let (_, flag) = FLAG_DECORATORS.iter().find(|(d, _)| *d == other)?;
                flags.push(format!("{flag}: true"));
            }
        }
    }

    let (annotation, token) = match token {
        Some(token) => (type_text.map(|t| format!(": {t}")), token),
        None => {
            let ty = type_text.filter(|t| is_type_reference(t))?;
            (None, ty)
        }
    };
    let options = if flags.is_empty() {
        String::new()
    } else {
        format!(", {{ {} }}", flags.join(", "))
    };
    Some(format!(
        "{}readonly {}{} = inject({token}{options});",
        access.unwrap_or(""),
        name.name,
        annotation.unwrap_or_default(),
    ))
}

/// A plain (possibly namespaced) class name usable as an injection token.
fn is_type_reference(text: &str) -> bool {
    !text.is_empty()
        && text.split('.').all(|part| {
            part.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
                && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed, ids, lint};

    const IMPORTS: &str =
        "import { Component, Inject, Optional, SkipSelf } from '@angular/core';\n";

    #[test]
    fn rule_metadata() {
        let rule = PreferInject;
        assert_eq!(rule.code(), DiagnosticCode::new(Category::Convention, 102));
        assert_eq!(rule.name(), "prefer-inject");
        assert_eq!(rule.default_severity(), Severity::Warning);
    }

    #[test]
    fn parameter_properties_become_inject_fields() {
        let src = format!(
            "{IMPORTS}@Component({{}})\nexport class HomePage {{\n  \
             constructor(private http: HttpClient, @Optional() @Inject(CONFIG) readonly config: AppConfig) {{}}\n}}\n"
        );
        let diags = lint(&PreferInject, &src);
        assert_eq!(ids(&diags), ["preferInject", "preferInject"]);
        assert_eq!(diags[1].data["name"], "config");
        assert!(diags[0].fix.is_some());
        assert!(diags[1].fix.is_none());

        let out = fixed(&PreferInject, &src);
        assert!(out.starts_with(
            "import { Component, Inject, Optional, SkipSelf, inject } from '@angular/core';\n"
        ));
        assert!(out.contains(
            "  private readonly http = inject(HttpClient);\n  \
             readonly config: AppConfig = inject(CONFIG, { optional: true });\n}"
        ));
        assert!(lint(&PreferInject, &out).is_empty());
    }

    #[test]
    fn multiple_flags_are_combined() {
        let src = format!(
            "{IMPORTS}@Injectable()\nexport class Store {{\n  \
             constructor(@Optional() @SkipSelf() protected parent: Store) {{}}\n}}\n"
        );
        let out = fixed(&PreferInject, &src);
        assert!(out.contains(
            "  protected readonly parent = inject(Store, { optional: true, skipSelf: true });"
        ));
    }

    #[test]
    fn constructors_with_logic_are_reported_without_fix() {
        let src = format!(
            "{IMPORTS}@Component({{}})\nexport class HomePage {{\n  \
             constructor(private http: HttpClient) {{\n    this.load();\n  }}\n}}\n"
        );
        let diags = lint(&PreferInject, &src);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].fix.is_none());
    }

    #[test]
    fn plain_parameters_block_the_fix() {
        let src = format!(
            "{IMPORTS}@Directive({{}})\nexport class Focus {{\n  \
             constructor(private el: ElementRef<HTMLElement>, zone: NgZone) {{}}\n}}\n"
        );
        let diags = lint(&PreferInject, &src);
        assert_eq!(ids(&diags), ["preferInject", "preferInject"]);
        assert!(diags.iter().all(|d| d.fix.is_none()));
    }

    #[test]
    fn missing_core_import_blocks_the_fix() {
        let src = "@Pipe({})\nexport class Price {\n  constructor(private fmt: Formatter) {}\n}\n";
        let diags = lint(&PreferInject, src);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].fix.is_none());
    }

    #[test]
    fn undecorated_classes_and_untyped_parameters_pass() {
        let src = "export class Plain {\n  constructor(private http: HttpClient) {}\n}\n\
                   @Component({})\nexport class HomePage {\n  constructor(name) {}\n}\n";
        assert!(lint(&PreferInject, src).is_empty());
    }
}
