//! W107: Ion boolean attribute — boolean Ionic attributes written as strings.

use std::sync::Arc;

use ngl_diagnostics::{
    Category, Diagnostic, DiagnosticCode, DiagnosticSink, Replacement, Severity, SuggestedFix,
};
use ngl_ionic::naming::camel_case;
use ngl_ionic::{AttributeTypeOracle, ValueKind};
use ngl_template_parser::{Attribute, AttributeBinding, AttributeKind};

use crate::unit::{ComponentTemplate, LintUnit};
use crate::LintRule;

/// How a static attribute value reads as a boolean.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum StaticBoolean {
    Literal(bool),
    /// `null` / `undefined`: never reported.
    Exempt,
    Other,
}

/// Classifies the text of a static attribute. A bare attribute is `true`.
pub(super) fn boolean_value(attr: &Attribute) -> StaticBoolean {
    let text = attr.value.as_ref().map_or("", |v| v.text.trim());
    match text.to_ascii_lowercase().as_str() {
        "" | "true" | "1" | "yes" => StaticBoolean::Literal(true),
        "false" | "0" | "no" => StaticBoolean::Literal(false),
        "null" | "undefined" => StaticBoolean::Exempt,
        _ => StaticBoolean::Other,
    }
}

/// Static attributes without interpolation, the only ones whose type can be
/// wrong as written.
pub(super) fn is_plain_static(attr: &Attribute) -> bool {
    attr.kind == AttributeKind::Static && matches!(attr.binding, AttributeBinding::None)
}

/// Replaces `attr` with `[name]="expr"`.
pub(super) fn bind_fix(
    template: &ComponentTemplate,
    attr: &Attribute,
    expr: &str,
) -> Option<SuggestedFix> {
    let binding = format!("[{}]=\"{expr}\"", camel_case(&attr.name));
    template.fix(SuggestedFix::single(
        format!("bind as `{binding}`"),
        Replacement::replace(attr.span, binding),
    ))
}

/// Detects boolean Ionic attributes given a boolean-looking string value,
/// which the component receives as a (truthy) string.
pub struct IonBooleanAttribute {
    oracle: Arc<AttributeTypeOracle>,
}

impl IonBooleanAttribute {
    /// Creates the rule over a shared oracle.
    pub fn new(oracle: Arc<AttributeTypeOracle>) -> Self {
        Self { oracle }
    }
}

impl LintRule for IonBooleanAttribute {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Warning, 107)
    }

    fn name(&self) -> &str {
        "ion-boolean-attribute"
    }

    fn description(&self) -> &str {
        "boolean Ionic attribute set with a string"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn enabled_by_default(&self) -> bool {
        false
    }

    fn check_unit(&self, unit: &LintUnit, sink: &DiagnosticSink) {
        for template in &unit.templates {
            template.template.for_each_element(&mut |el| {
                for attr in el.attributes.iter().filter(|a| is_plain_static(a)) {
                    if self.oracle.kind(&el.name, &attr.name) != ValueKind::Boolean {
                        continue;
                    }
                    let StaticBoolean::Literal(value) = boolean_value(attr) else {
                        continue;
                    };
                    let written = attr.value.as_ref().map_or("", |v| v.text.as_str());
                    sink.emit(
                        Diagnostic::warning(
                            self.code(),
                            format!(
                                "`{}` on `<{}>` is a boolean; bind `{value}` instead of a string",
                                attr.name, el.name
                            ),
                            template.report_span(attr.span),
                        )
                        .with_message_id("booleanAttribute")
                        .with_data("attribute", attr.name.as_str())
                        .with_data("value", written)
                        .with_data("suggested", value.to_string())
                        .with_optional_fix(bind_fix(template, attr, &value.to_string())),
                    );
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed, ids, ionic_oracle, lint};

    fn rule() -> IonBooleanAttribute {
        IonBooleanAttribute::new(ionic_oracle())
    }

    fn page(template: &str) -> String {
        format!("@Component({{ template: `{template}` }})\nexport class HomePage {{}}\n")
    }

    #[test]
    fn rule_metadata() {
        let rule = rule();
        assert_eq!(rule.code(), DiagnosticCode::new(Category::Warning, 107));
        assert_eq!(rule.name(), "ion-boolean-attribute");
        assert_eq!(rule.default_severity(), Severity::Warning);
        assert!(!rule.enabled_by_default());
    }

    #[test]
    fn boolean_strings_become_bindings() {
        let src = page(r#"<ion-item button="true" detail="No"></ion-item><ion-input disabled></ion-input>"#);
        let diags = lint(&rule(), &src);
        assert_eq!(ids(&diags), ["booleanAttribute"; 3]);
        assert_eq!(diags[1].data["suggested"], "false");
        assert_eq!(diags[1].data["value"], "No");

        let out = fixed(&rule(), &src);
        assert!(out.contains(
            r#"<ion-item [button]="true" [detail]="false"></ion-item><ion-input [disabled]="true"></ion-input>"#
        ));
        assert!(lint(&rule(), &out).is_empty());
    }

    #[test]
    fn other_values_and_attributes_are_left_alone() {
        let src = page(
            r#"<ion-item button="maybe" detail="null" lines="full" [button]="isButton"></ion-item><div hidden="true"></div><ion-item button="{{ flag }}"></ion-item>"#,
        );
        assert!(lint(&rule(), &src).is_empty());
    }
}
