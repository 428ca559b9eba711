//! Lint rules and engine for Angular/Ionic component sources.
//!
//! Each TypeScript file is loaded into a [`LintUnit`]: the parsed code tree
//! plus the parsed template of every `@Component` class, inline or external.
//! The [`LintEngine`] runs every enabled [`LintRule`] over a unit.
//!
//! # Rule Categories
//!
//! - **C-series (conventions):** `prefer-readonly`, `prefer-inject`
//! - **W-series (warnings):** denied elements, lifecycle interfaces, signal
//!   usage in code and templates, Ionic attribute types
//! - **E-series (errors):** TypeScript lexer and parser errors, emitted while
//!   loading a unit

#![warn(missing_docs)]

mod engine;
mod error;
pub mod helpers;
mod rules;
pub mod signals;
mod unit;

pub use engine::LintEngine;
pub use error::RuleSetupError;
pub use rules::register_builtin_rules;
pub use rules::{
    DenyElement, IonAttributeType, IonBooleanAttribute, LifecycleInterface, PreferInject,
    PreferReadonly, SignalUsage, TemplateSignalUsage, DEFAULT_DENIED_ELEMENTS,
};
pub use signals::{SignalEntry, SignalKind, SignalTable};
pub use unit::{ComponentTemplate, LintUnit, TemplateOrigin};

use ngl_diagnostics::{DiagnosticCode, DiagnosticSink, Severity};

/// A single lint rule that checks one source file and its templates.
///
/// Each rule has a unique diagnostic code, a kebab-case name, a description
/// and a default severity. `check_unit` is called once per file and reports
/// through the sink; every diagnostic carries a stable `message_id`.
pub trait LintRule: Send + Sync {
    /// Returns the diagnostic code for this rule (e.g., W105, C101).
    fn code(&self) -> DiagnosticCode;

    /// Returns the short kebab-case name of this rule (e.g., "signal-usage").
    fn name(&self) -> &str;

    /// Returns a human-readable description of what this rule checks.
    fn description(&self) -> &str;

    /// Returns the default severity for diagnostics emitted by this rule.
    fn default_severity(&self) -> Severity;

    /// Whether the rule runs without being listed under `lint.warn`.
    fn enabled_by_default(&self) -> bool {
        true
    }

    /// Checks a loaded file and emits diagnostics to the sink.
    fn check_unit(&self, unit: &LintUnit, sink: &DiagnosticSink);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Arc;

    use ngl_diagnostics::{apply_fixes, Diagnostic};
    use ngl_ionic::{AttributeTypeOracle, DEFAULT_CACHE_CAPACITY};
    use ngl_source::{FileSystem, MemoryFileSystem, SourceDb};

    pub const PAGE_PATH: &str = "/app/src/home.page.ts";

    const IONIC_TYPES: &str = "/app/node_modules/@ionic/core/dist/types";

    const COMPONENTS_DTS: &str = r#"
import { AnimationBuilder } from "./utils/animation/animation-interface";
export namespace Components {
    interface IonInput {
        "disabled": boolean;
        "placeholder"?: string;
        "type": 'text' | 'number' | 'password';
    }
    interface IonItem {
        "button": boolean;
        "detail"?: boolean;
        "lines"?: 'full' | 'inset' | 'none';
        "routerAnimation": AnimationBuilder | undefined;
    }
    interface IonProgressBar {
        "buffer": number;
        "value": number;
    }
}
"#;

    /// An oracle over a small `@ionic/core` declaration tree.
    pub fn ionic_oracle() -> Arc<AttributeTypeOracle> {
        let fs = MemoryFileSystem::new()
            .with_file(format!("{IONIC_TYPES}/components.d.ts"), COMPONENTS_DTS)
            .with_file(
                format!("{IONIC_TYPES}/utils/animation/animation-interface.d.ts"),
                "export interface AnimationBuilder { (el: any): Animation }\n",
            );
        Arc::new(AttributeTypeOracle::new(
            format!("{IONIC_TYPES}/components.d.ts"),
            Arc::new(fs),
            DEFAULT_CACHE_CAPACITY,
        ))
    }

    /// Loads `source` as a component file and runs one rule over it.
    pub fn lint(rule: &dyn LintRule, source: &str) -> Vec<Diagnostic> {
        lint_with_fs(rule, source, &MemoryFileSystem::new()).1
    }

    pub fn lint_with_fs(
        rule: &dyn LintRule,
        source: &str,
        fs: &dyn FileSystem,
    ) -> (SourceDb, Vec<Diagnostic>) {
        let mut db = SourceDb::new();
        let file = db.add_source(PAGE_PATH, source.to_string());
        let load_sink = DiagnosticSink::new();
        let unit = LintUnit::load(&mut db, fs, file, &load_sink);
        let sink = DiagnosticSink::new();
        rule.check_unit(&unit, &sink);
        (db, sink.take_all())
    }

    /// Message ids of the diagnostics, in report order.
    pub fn ids(diags: &[Diagnostic]) -> Vec<&str> {
        diags.iter().map(|d| d.message_id.as_str()).collect()
    }

    /// Applies one pass of fixes to the component file.
    pub fn fixed(rule: &dyn LintRule, source: &str) -> String {
        let diags = lint(rule, source);
        let file = ngl_source::FileId::from_raw(0);
        apply_fixes(source, file, &diags).unwrap().text
    }
}
