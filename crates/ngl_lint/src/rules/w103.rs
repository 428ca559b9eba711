//! W103: Denied element — template uses an element from the deny-list.

use ngl_config::DenyElementOptions;
use ngl_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Label, Severity};

use crate::error::RuleSetupError;
use crate::unit::LintUnit;
use crate::LintRule;

/// Overlay components that are meant to be created through their controller
/// services rather than declared in templates.
pub const DEFAULT_DENIED_ELEMENTS: &[&str] = &[
    "ion-action-sheet",
    "ion-alert",
    "ion-loading",
    "ion-modal",
    "ion-picker",
    "ion-popover",
    "ion-toast",
];

/// Detects elements whose tag name is on the deny-list.
///
/// Tag names are compared case-insensitively.
pub struct DenyElement {
    elements: Vec<String>,
}

impl DenyElement {
    /// Creates the rule with an explicit deny-list.
    pub fn new(elements: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            elements: elements
                .into_iter()
                .map(|e| e.into().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Builds the rule from `[lint.rules.deny-element]`.
    ///
    /// Without the table the default overlay list applies. A table without
    /// `elements` is a setup error.
    pub fn from_options(options: Option<&DenyElementOptions>) -> Result<Self, RuleSetupError> {
        match options {
            None => Ok(Self::new(DEFAULT_DENIED_ELEMENTS.iter().copied())),
            Some(DenyElementOptions {
                elements: Some(elements),
            }) => Ok(Self::new(elements.iter().cloned())),
            Some(DenyElementOptions { elements: None }) => Err(RuleSetupError::MissingOption {
                rule: "deny-element",
                option: "elements",
            }),
        }
    }

    /// The denied tag names, lower-cased.
    pub fn elements(&self) -> &[String] {
        &self.elements
    }
}

impl LintRule for DenyElement {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Warning, 103)
    }

    fn name(&self) -> &str {
        "deny-element"
    }

    fn description(&self) -> &str {
        "template uses a denied element"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check_unit(&self, unit: &LintUnit, sink: &DiagnosticSink) {
        for template in &unit.templates {
            template.template.for_each_element(&mut |el| {
                let tag = el.name.to_ascii_lowercase();
                if !self.elements.contains(&tag) {
                    return;
                }
                let span = template.report_span(el.name_span);
                sink.emit(
                    Diagnostic::warning(
                        self.code(),
                        format!("`<{}>` is not allowed in templates", el.name),
                        span,
                    )
                    .with_message_id("deniedElement")
                    .with_data("element", tag)
                    .with_label(Label::primary(span, "denied element")),
                );
            });
        }
    }
}
