//! Conformance test helpers for the ngl linter.
//!
//! Provides shared pipeline functions that load component sources from an
//! in-memory project (with a small `@ionic/core` declaration tree), run them
//! through the full lint engine, and return structured results for assertion
//! in integration tests. [`RuleTester`] runs a single rule against
//! `valid`/`invalid` fixtures in the usual lint-fixture style.

#![warn(missing_docs)]

use std::path::Path;
use std::sync::Arc;

use ngl_config::{LintConfig, ProjectConfig};
use ngl_diagnostics::{apply_fixes, Diagnostic, DiagnosticSink, Severity};
use ngl_ionic::AttributeTypeOracle;
use ngl_lint::{LintEngine, LintRule, RuleSetupError};
use ngl_source::{FileId, MemoryFileSystem, SourceDb};

/// Root directory of the in-memory fixture project.
pub const PROJECT_ROOT: &str = "/project";

/// Path the component under test is loaded from.
pub const COMPONENT_PATH: &str = "/project/src/app/home/home.page.ts";

const IONIC_TYPES: &str = "/project/node_modules/@ionic/core/dist/types";

const COMPONENTS_DTS: &str = r#"
import { Color, RouterDirection } from "./interface";
import { SpinnerTypes } from "./components/spinner/spinner-configs";
import { AnimationBuilder } from "./utils/animation/animation-interface";
export namespace Components {
    interface IonButton {
        "color"?: Color;
        "disabled": boolean;
        "expand"?: 'full' | 'block';
        "routerDirection": RouterDirection;
        "strong": boolean;
    }
    interface IonInput {
        "debounce"?: number;
        "disabled": boolean;
        "placeholder"?: string;
        "type": 'text' | 'number' | 'password' | 'email';
        "value"?: string | number | null;
    }
    interface IonItem {
        "button": boolean;
        "color"?: Color;
        "detail"?: boolean;
        "lines"?: 'full' | 'inset' | 'none';
        "routerAnimation": AnimationBuilder | undefined;
    }
    interface IonProgressBar {
        "buffer": number;
        "value": number;
    }
    interface IonSpinner {
        "name"?: SpinnerTypes;
        "paused": boolean;
    }
}
"#;

/// Result of running source text through the lint engine.
pub struct PipelineResult {
    /// Every file loaded during the run (the component and its templates).
    pub source_db: SourceDb,
    /// The component file.
    pub file: FileId,
    /// All diagnostics emitted during the run.
    pub diagnostics: Vec<Diagnostic>,
    /// Whether any errors were emitted.
    pub has_errors: bool,
    /// Number of error-severity diagnostics.
    pub error_count: usize,
    /// Number of warning-severity diagnostics.
    pub warning_count: usize,
}

impl PipelineResult {
    fn new(source_db: SourceDb, file: FileId, diagnostics: Vec<Diagnostic>) -> Self {
        let error_count = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        let warning_count = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        Self {
            source_db,
            file,
            diagnostics,
            has_errors: error_count > 0,
            error_count,
            warning_count,
        }
    }

    /// Message ids of the diagnostics, in report order.
    pub fn message_ids(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.message_id.as_str()).collect()
    }

    /// Diagnostics raised by the named rule.
    pub fn from_rule(&self, rule: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.rule.as_deref() == Some(rule))
            .collect()
    }

    /// The text of `path` after one pass of every emitted fix.
    pub fn fixed_text(&self, path: &str) -> String {
        let Some(file) = self.source_db.find(Path::new(path)) else {
            panic!("{path} was not loaded");
        };
        let source = &self.source_db.get_file(file).content;
        apply_fixes(source, file, &self.diagnostics).unwrap().text
    }

    /// The component file after one pass of every emitted fix.
    pub fn fixed(&self) -> String {
        let source = &self.source_db.get_file(self.file).content;
        apply_fixes(source, self.file, &self.diagnostics).unwrap().text
    }
}

/// The fixture project: the `@ionic/core` declaration files and nothing else.
pub fn ionic_fixture() -> MemoryFileSystem {
    MemoryFileSystem::new()
        .with_file(format!("{IONIC_TYPES}/components.d.ts"), COMPONENTS_DTS)
        .with_file(
            format!("{IONIC_TYPES}/interface.d.ts"),
            "export * from \"./components/router/utils/interface\";\n\
             export declare type PredefinedColors = 'primary' | 'secondary' | 'danger';\n\
             export declare type Color = PredefinedColors | string;\n",
        )
        .with_file(
            format!("{IONIC_TYPES}/components/router/utils/interface.d.ts"),
            "export type RouterDirection = 'forward' | 'back' | 'root';\n",
        )
        .with_file(
            format!("{IONIC_TYPES}/components/spinner/spinner-configs.d.ts"),
            "export type SpinnerTypes = 'bubbles' | 'circles' | 'dots';\n",
        )
        .with_file(
            format!("{IONIC_TYPES}/utils/animation/animation-interface.d.ts"),
            "export interface AnimationBuilder { (el: any): Animation }\n",
        )
}

/// An oracle over the declaration files in `fs`, located the way the
/// default configuration locates them under [`PROJECT_ROOT`].
pub fn ionic_oracle(fs: Arc<MemoryFileSystem>, config: &ProjectConfig) -> Arc<AttributeTypeOracle> {
    Arc::new(AttributeTypeOracle::new(
        config.ionic.components_dts(Path::new(PROJECT_ROOT)),
        fs,
        config.ionic.cache_capacity,
    ))
}

/// Creates a minimal `ProjectConfig`.
pub fn make_config() -> ProjectConfig {
    toml::from_str(
        r#"
[project]
name = "conformance_test"
"#,
    )
    .unwrap()
}

/// Creates a `ProjectConfig` with lint deny/allow/warn overrides.
pub fn make_config_with_lint(deny: &[&str], allow: &[&str], warn: &[&str]) -> ProjectConfig {
    let list = |names: &[&str]| {
        names
            .iter()
            .map(|s| format!("\"{s}\""))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let toml_str = format!(
        r#"
[project]
name = "conformance_test"

[lint]
deny = [{deny}]
allow = [{allow}]
warn = [{warn}]
"#,
        deny = list(deny),
        allow = list(allow),
        warn = list(warn),
    );
    toml::from_str(&toml_str).unwrap()
}

/// Creates a `ProjectConfig` from a full `ngl.toml` text.
pub fn make_config_from_toml(text: &str) -> ProjectConfig {
    toml::from_str(text).unwrap()
}

/// Builds the engine every pipeline function runs, or the setup error.
pub fn build_engine(config: &ProjectConfig, fs: Arc<MemoryFileSystem>) -> Result<LintEngine, RuleSetupError> {
    LintEngine::new(&config.lint, ionic_oracle(fs, config))
}

/// Runs every default rule over a component source.
pub fn full_pipeline(source: &str) -> PipelineResult {
    full_pipeline_with_config(source, &[], &make_config())
}

/// Runs the rules over a component source with custom lint levels.
pub fn full_pipeline_with_lint(source: &str, deny: &[&str], allow: &[&str], warn: &[&str]) -> PipelineResult {
    full_pipeline_with_config(source, &[], &make_config_with_lint(deny, allow, warn))
}

/// Runs the rules over a component source, with extra project files
/// (external templates) available to the loader.
///
/// Each entry in `files` is `(path, text)` with an absolute path inside
/// [`PROJECT_ROOT`].
pub fn full_pipeline_with_config(
    source: &str,
    files: &[(&str, &str)],
    config: &ProjectConfig,
) -> PipelineResult {
    let mut fs = ionic_fixture();
    for (path, text) in files {
        fs.insert(path, *text);
    }
    let fs = Arc::new(fs);
    let engine = build_engine(config, Arc::clone(&fs)).unwrap();

    let mut source_db = SourceDb::new();
    let file = source_db.add_source(COMPONENT_PATH, source.to_string());
    let sink = DiagnosticSink::new();
    engine.lint_file(&mut source_db, &*fs, file, &sink);
    PipelineResult::new(source_db, file, sink.take_all())
}

/// An `invalid` fixture: code, the expected message ids in report order,
/// and the text after one fix pass.
pub struct InvalidCase<'a> {
    /// The component source.
    pub code: &'a str,
    /// Expected message ids, in report order.
    pub errors: &'a [&'a str],
    /// Expected text after applying every emitted fix once. `None` asserts
    /// that no fix is offered.
    pub output: Option<&'a str>,
}

/// Runs one rule over `valid` and `invalid` fixtures.
///
/// The rule is enabled through `lint.warn`, so rules that are off by
/// default are tested the same way as the others.
pub struct RuleTester {
    engine: LintEngine,
    fs: MemoryFileSystem,
}

impl RuleTester {
    /// Creates a tester for `rule` over the Ionic fixture project.
    pub fn new(rule: impl LintRule + 'static) -> Self {
        let config = LintConfig {
            warn: vec![rule.name().to_string()],
            ..LintConfig::default()
        };
        let mut engine = LintEngine::without_rules(&config);
        engine.register(Box::new(rule));
        Self {
            engine,
            fs: ionic_fixture(),
        }
    }

    /// Adds a project file, such as an external template.
    pub fn with_file(mut self, path: &str, text: &str) -> Self {
        self.fs.insert(path, text);
        self
    }

    /// Lints `code` as the component file.
    pub fn run(&self, code: &str) -> PipelineResult {
        let mut source_db = SourceDb::new();
        let file = source_db.add_source(COMPONENT_PATH, code.to_string());
        let sink = DiagnosticSink::new();
        self.engine.lint_file(&mut source_db, &self.fs, file, &sink);
        PipelineResult::new(source_db, file, sink.take_all())
    }

    /// Asserts that `code` produces no reports.
    pub fn valid(&self, code: &str) {
        let result = self.run(code);
        assert!(
            result.diagnostics.is_empty(),
            "expected no reports for:\n{code}\ngot: {:?}",
            result.message_ids()
        );
    }

    /// Asserts the reports and fix output of an `invalid` fixture.
    pub fn invalid(&self, case: InvalidCase<'_>) {
        let result = self.run(case.code);
        assert_eq!(
            result.message_ids(),
            case.errors,
            "unexpected reports for:\n{}",
            case.code
        );
        match case.output {
            Some(output) => assert_eq!(result.fixed(), output),
            None => assert!(
                result.diagnostics.iter().all(|d| d.fix.is_none()),
                "expected no fix for:\n{}",
                case.code
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngl_ionic::ValueKind;

    #[test]
    fn fixture_oracle_resolves_aliases() {
        let config = make_config();
        let oracle = ionic_oracle(Arc::new(ionic_fixture()), &config);
        assert_eq!(oracle.kind("ion-item", "button"), ValueKind::Boolean);
        assert_eq!(oracle.kind("ion-item", "color"), ValueKind::String);
        assert_eq!(oracle.kind("ion-item", "router-animation"), ValueKind::Object);
        assert_eq!(
            oracle.allowed_values("ion-spinner", "name").unwrap(),
            ["bubbles", "circles", "dots"]
        );
        assert_eq!(oracle.kind("ion-input", "value"), ValueKind::String);
    }

    #[test]
    fn lint_levels_reach_the_config() {
        let config = make_config_with_lint(&["W105"], &["prefer-readonly"], &[]);
        assert_eq!(config.lint.deny, ["W105"]);
        assert_eq!(config.lint.allow, ["prefer-readonly"]);
        assert!(config.lint.warn.is_empty());
    }
}
