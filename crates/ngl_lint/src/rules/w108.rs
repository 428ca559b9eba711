//! W108: Ion attribute type — Ionic attribute values that do not match the
//! declared property type.

use std::sync::Arc;

use ngl_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Label, Severity};
use ngl_ionic::{AttributeTypeOracle, ValueKind};
use ngl_source::Span;
use ngl_template_parser::{Attribute, AttributeBinding, AttributeKind, Element, LiteralValue};

use super::w107::{bind_fix, boolean_value, is_plain_static, StaticBoolean};
use crate::unit::{ComponentTemplate, LintUnit};
use crate::LintRule;

/// Detects static Ionic attributes whose value cannot have the declared type,
/// and string literals outside a restricted set.
///
/// | kind | fix |
/// |------|-----|
/// | boolean | bind the canonical `true` / `false` |
/// | number | bind the numeral (`0` for a bare attribute) |
/// | object, complex | bind `null` as a placeholder |
/// | restricted string | none |
///
/// `null` and `undefined` values are never reported.
pub struct IonAttributeType {
    oracle: Arc<AttributeTypeOracle>,
}

impl IonAttributeType {
    /// Creates the rule over a shared oracle.
    pub fn new(oracle: Arc<AttributeTypeOracle>) -> Self {
        Self { oracle }
    }
}

impl LintRule for IonAttributeType {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Warning, 108)
    }

    fn name(&self) -> &str {
        "ion-attribute-type"
    }

    fn description(&self) -> &str {
        "Ionic attribute value does not match its declared type"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check_unit(&self, unit: &LintUnit, sink: &DiagnosticSink) {
        for template in &unit.templates {
            template.template.for_each_element(&mut |el| {
                if !self.oracle.is_component(&el.name) {
                    return;
                }
                for attr in &el.attributes {
                    let kind = self.oracle.kind(&el.name, &attr.name);
                    if kind == ValueKind::Unknown {
                        continue;
                    }
                    let check = AttributeCheck {
                        rule: self,
                        template,
                        element: el,
                        attr,
                        sink,
                    };
                    if is_plain_static(attr) {
                        check.static_value(kind);
                    } else if attr.kind == AttributeKind::Property {
                        check.bound_string();
                    }
                }
            });
        }
    }
}

struct AttributeCheck<'a> {
    rule: &'a IonAttributeType,
    template: &'a ComponentTemplate,
    element: &'a Element,
    attr: &'a Attribute,
    sink: &'a DiagnosticSink,
}

impl AttributeCheck<'_> {
    fn written(&self) -> &str {
        self.attr.value.as_ref().map_or("", |v| v.text.trim())
    }

    fn static_value(&self, kind: ValueKind) {
        let written = self.written();
        if matches!(written, "null" | "undefined") {
            return;
        }
        match kind {
            ValueKind::Boolean => match boolean_value(self.attr) {
                StaticBoolean::Literal(value) => {
                    let value = value.to_string();
                    self.report(
                        "booleanAttribute",
                        format!("`{}` is a boolean; bind `{value}` instead of a string", self.attr.name),
                        kind,
                        Some(&value),
                    );
                }
                StaticBoolean::Other => self.report(
                    "invalidBooleanValue",
                    format!("`{written}` is not a boolean value for `{}`", self.attr.name),
                    kind,
                    None,
                ),
                StaticBoolean::Exempt => {}
            },
            ValueKind::Number => {
                let numeral = if written.is_empty() {
                    Some("0")
                } else {
                    is_numeral(written).then_some(written)
                };
                match numeral {
                    Some(numeral) => self.report(
                        "numberAttribute",
                        format!("`{}` is a number; bind `{numeral}` instead of a string", self.attr.name),
                        kind,
                        Some(numeral),
                    ),
                    None => self.report(
                        "invalidNumberValue",
                        format!("`{written}` is not a number value for `{}`", self.attr.name),
                        kind,
                        None,
                    ),
                }
            }
            ValueKind::Object | ValueKind::Complex => self.report(
                "objectAttribute",
                format!(
                    "`{}` expects an object and cannot be set from a string; bind it instead",
                    self.attr.name
                ),
                kind,
                Some("null"),
            ),
            ValueKind::String => self.restricted_string(written, self.attr.span),
            ValueKind::Unknown => {}
        }
    }

    /// `[lines]="'wide'"` is checked against the permitted literals too.
    fn bound_string(&self) {
        let AttributeBinding::Expr(expr) = &self.attr.binding else {
            return;
        };
        if let Some(LiteralValue::Str(value)) = expr.as_literal() {
            self.restricted_string(value, expr.span);
        }
    }

    fn restricted_string(&self, value: &str, span: Span) {
        let Some(allowed) = self.rule.oracle.allowed_values(&self.element.name, &self.attr.name)
        else {
            return;
        };
        if allowed.iter().any(|a| a == value) {
            return;
        }
        let span = self.template.report_span(span);
        self.sink.emit(
            Diagnostic::warning(
                self.rule.code(),
                format!(
                    "`{value}` is not a permitted value for `{}` on `<{}>`",
                    self.attr.name, self.element.name
                ),
                span,
            )
            .with_message_id("invalidStringValue")
            .with_data("attribute", self.attr.name.as_str())
            .with_data("value", value)
            .with_data("allowed", allowed.join(", "))
            .with_label(Label::primary(span, "not in the declared union"))
            .with_help(format!("expected one of: {}", allowed.join(", "))),
        );
    }

    /// Reports the whole attribute; `bind` is the expression to bind, if any.
    fn report(&self, message_id: &str, message: String, kind: ValueKind, bind: Option<&str>) {
        let mut diagnostic = Diagnostic::warning(
            self.rule.code(),
            message,
            self.template.report_span(self.attr.span),
        )
        .with_message_id(message_id)
        .with_data("attribute", self.attr.name.as_str())
        .with_data("value", self.written())
        .with_data("kind", kind.to_string());
        if let Some(bind) = bind {
            diagnostic = diagnostic
                .with_data("suggested", bind)
                .with_optional_fix(bind_fix(self.template, self.attr, bind));
        }
        self.sink.emit(diagnostic);
    }
}

/// A decimal or exponent numeral as JavaScript would read it.
fn is_numeral(text: &str) -> bool {
    let body = text.strip_prefix('-').unwrap_or(text);
    body.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && body.parse::<f64>().is_ok_and(f64::is_finite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed, ids, ionic_oracle, lint};

    fn rule() -> IonAttributeType {
        IonAttributeType::new(ionic_oracle())
    }

    fn page(template: &str) -> String {
        format!("@Component({{ template: `{template}` }})\nexport class HomePage {{}}\n")
    }

    #[test]
    fn rule_metadata() {
        let rule = rule();
        assert_eq!(rule.code(), DiagnosticCode::new(Category::Warning, 108));
        assert_eq!(rule.name(), "ion-attribute-type");
        assert_eq!(rule.default_severity(), Severity::Warning);
        assert!(rule.enabled_by_default());
    }

    #[test]
    fn permitted_string_passes() {
        assert!(lint(&rule(), &page(r#"<ion-item lines="full"></ion-item>"#)).is_empty());
    }

    #[test]
    fn boolean_string_is_bound() {
        let src = page(r#"<ion-item button="true"></ion-item>"#);
        assert_eq!(ids(&lint(&rule(), &src)), ["booleanAttribute"]);
        assert!(fixed(&rule(), &src).contains(r#"<ion-item [button]="true"></ion-item>"#));
    }

    #[test]
    fn bare_number_attribute_binds_zero() {
        let src = page(r#"<ion-progress-bar value buffer="0.5"></ion-progress-bar>"#);
        let diags = lint(&rule(), &src);
        assert_eq!(ids(&diags), ["numberAttribute", "numberAttribute"]);
        let out = fixed(&rule(), &src);
        assert!(out.contains(r#"<ion-progress-bar [value]="0" [buffer]="0.5"></ion-progress-bar>"#));
        assert!(lint(&rule(), &out).is_empty());
    }

    #[test]
    fn unusable_values_are_reported_without_fix() {
        let src = page(
            r#"<ion-item button="maybe" lines="wide"></ion-item><ion-progress-bar value="half"></ion-progress-bar>"#,
        );
        let diags = lint(&rule(), &src);
        assert_eq!(ids(&diags), ["invalidBooleanValue", "invalidStringValue", "invalidNumberValue"]);
        assert!(diags.iter().all(|d| d.fix.is_none()));
        assert_eq!(diags[1].data["allowed"], "full, inset, none");
    }

    #[test]
    fn object_attributes_bind_null() {
        let src = page(r#"<ion-item router-animation="slide"></ion-item>"#);
        let diags = lint(&rule(), &src);
        assert_eq!(ids(&diags), ["objectAttribute"]);
        assert_eq!(diags[0].data["kind"], "object");
        assert!(fixed(&rule(), &src).contains(r#"<ion-item [routerAnimation]="null"></ion-item>"#));
    }

    #[test]
    fn bound_string_literals_are_checked() {
        let src = page(r#"<ion-input [type]="'email'"></ion-input><ion-input [type]="'text'" [type]="kind"></ion-input>"#);
        let diags = lint(&rule(), &src);
        assert_eq!(ids(&diags), ["invalidStringValue"]);
        let span = diags[0].primary_span;
        assert_eq!(&src[span.start as usize..span.end as usize], "'email'");
    }

    #[test]
    fn null_undefined_and_interpolation_are_exempt() {
        let src = page(
            r#"<ion-item button="null" router-animation="undefined" lines="{{ mode }}"></ion-item><ion-progress-bar value="undefined"></ion-progress-bar><ion-input [type]="null"></ion-input><div value="x"></div>"#,
        );
        assert!(lint(&rule(), &src).is_empty());
    }
}
