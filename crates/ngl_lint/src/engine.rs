//! Lint engine that manages rule registration, configuration, and execution.
//!
//! The `LintEngine` accepts a `LintConfig` to control which rules are denied,
//! allowed, or enabled through `warn`, then runs each enabled rule over a
//! loaded [`LintUnit`].

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use ngl_config::LintConfig;
use ngl_diagnostics::{DiagnosticSink, Severity};
use ngl_ionic::AttributeTypeOracle;
use ngl_source::{FileId, FileSystem, SourceDb};

use crate::error::RuleSetupError;
use crate::rules::register_builtin_rules;
use crate::unit::LintUnit;
use crate::LintRule;

/// The lint engine that orchestrates running lint rules on source files.
///
/// Rules are registered at construction time. The engine respects the
/// `LintConfig` to suppress rules (allow), promote rules to errors (deny),
/// or turn on rules that are off by default (warn).
pub struct LintEngine {
    /// All registered lint rules.
    rules: Vec<Box<dyn LintRule>>,
    /// Rule names that should be promoted to error severity.
    denied: HashSet<String>,
    /// Rule names that should be suppressed (not reported).
    allowed: HashSet<String>,
    /// Rule names enabled explicitly.
    warned: HashSet<String>,
}

impl LintEngine {
    /// Creates a lint engine with every builtin rule, configured by `config`.
    ///
    /// The attribute-type rules answer their lookups through `oracle`.
    /// Fails when a rule option table is incomplete or a deny/allow/warn list
    /// names an unknown rule.
    pub fn new(
        config: &LintConfig,
        oracle: Arc<AttributeTypeOracle>,
    ) -> Result<Self, RuleSetupError> {
        let mut engine = Self::without_rules(config);
        register_builtin_rules(&mut engine, &config.rules, oracle)?;
        engine.resolve_codes();

        let known: HashSet<&str> = engine.rule_names().into_iter().collect();
        let listed = engine.denied.iter().chain(&engine.allowed).chain(&engine.warned);
        if let Some(unknown) = listed.filter(|name| !known.contains(name.as_str())).min() {
            return Err(RuleSetupError::UnknownRule(unknown.clone()));
        }
        Ok(engine)
    }

    /// Rewrites codes such as `W105` in the rule lists to rule names.
    fn resolve_codes(&mut self) {
        let by_code: Vec<(String, String)> = self
            .rules
            .iter()
            .map(|r| (r.code().to_string(), r.name().to_string()))
            .collect();
        let resolve = |set: &mut HashSet<String>| {
            *set = set
                .drain()
                .map(|entry| {
                    by_code
                        .iter()
                        .find(|(code, _)| code.eq_ignore_ascii_case(&entry))
                        .map_or(entry, |(_, name)| name.clone())
                })
                .collect();
        };
        resolve(&mut self.denied);
        resolve(&mut self.allowed);
        resolve(&mut self.warned);
    }

    /// Creates an engine with the given configuration but no rules.
    pub fn without_rules(config: &LintConfig) -> Self {
        Self {
            rules: Vec::new(),
            denied: config.deny.iter().cloned().collect(),
            allowed: config.allow.iter().cloned().collect(),
            warned: config.warn.iter().cloned().collect(),
        }
    }

    /// Registers a lint rule with the engine.
    pub fn register(&mut self, rule: Box<dyn LintRule>) {
        self.rules.push(rule);
    }

    /// Returns the number of registered rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the names of all registered rules.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Iterates over the registered rules.
    pub fn rules(&self) -> impl Iterator<Item = &dyn LintRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Returns `true` if `rule` runs under the current configuration.
    pub fn is_enabled(&self, rule: &dyn LintRule) -> bool {
        let name = rule.name();
        if self.allowed.contains(name) {
            return false;
        }
        rule.enabled_by_default() || self.warned.contains(name) || self.denied.contains(name)
    }

    /// Runs all enabled lint rules on a loaded unit.
    ///
    /// Each rule reports into a temporary sink. Its diagnostics are tagged
    /// with the rule name and promoted to error severity when the rule is
    /// denied.
    pub fn run(&self, unit: &LintUnit, sink: &DiagnosticSink) {
        for rule in &self.rules {
            if !self.is_enabled(rule.as_ref()) {
                continue;
            }
            let rule_name = rule.name();

            let temp_sink = DiagnosticSink::new();
            rule.check_unit(unit, &temp_sink);

            let is_denied = self.denied.contains(rule_name);
            for mut diag in temp_sink.take_all() {
                if is_denied {
                    diag.severity = Severity::Error;
                }
                diag.rule = Some(rule_name.to_string());
                sink.emit(diag);
            }
        }
    }

    /// Loads a file already in `source_db` and runs every enabled rule.
    ///
    /// Syntax errors and external templates are handled by
    /// [`LintUnit::load`].
    pub fn lint_file(
        &self,
        source_db: &mut SourceDb,
        fs: &dyn FileSystem,
        file: FileId,
        sink: &DiagnosticSink,
    ) -> LintUnit {
        let unit = LintUnit::load(source_db, fs, file, sink);
        self.run(&unit, sink);
        unit
    }

    /// Reads `path` through `fs`, then lints it like [`lint_file`](Self::lint_file).
    pub fn lint_path(
        &self,
        source_db: &mut SourceDb,
        fs: &dyn FileSystem,
        path: &Path,
        sink: &DiagnosticSink,
    ) -> std::io::Result<LintUnit> {
        let file = source_db.load_file(fs, path)?;
        Ok(self.lint_file(source_db, fs, file, sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngl_config::{DenyElementOptions, RuleOptions};
    use ngl_diagnostics::{Category, Diagnostic, DiagnosticCode};
    use ngl_source::MemoryFileSystem;

    struct DummyRule {
        on: bool,
    }

    impl LintRule for DummyRule {
        fn code(&self) -> DiagnosticCode {
            DiagnosticCode::new(Category::Warning, 999)
        }
        fn name(&self) -> &str {
            "dummy-rule"
        }
        fn description(&self) -> &str {
            "a test rule"
        }
        fn default_severity(&self) -> Severity {
            Severity::Warning
        }
        fn enabled_by_default(&self) -> bool {
            self.on
        }
        fn check_unit(&self, unit: &LintUnit, sink: &DiagnosticSink) {
            sink.emit(
                Diagnostic::warning(self.code(), "dummy warning", unit.program.span)
                    .with_message_id("dummy"),
            );
        }
    }

    fn oracle() -> Arc<AttributeTypeOracle> {
        Arc::new(AttributeTypeOracle::new(
            "/node_modules/@ionic/core/dist/types/components.d.ts",
            Arc::new(MemoryFileSystem::new()),
            8,
        ))
    }

    fn config(deny: &[&str], allow: &[&str], warn: &[&str]) -> LintConfig {
        let list = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        LintConfig {
            deny: list(deny),
            allow: list(allow),
            warn: list(warn),
            rules: RuleOptions::default(),
        }
    }

    fn run(engine: &LintEngine) -> Vec<Diagnostic> {
        let mut db = SourceDb::new();
        let file = db.add_source("/app/a.ts", "export class A {}\n".to_string());
        let sink = DiagnosticSink::new();
        engine.lint_file(&mut db, &MemoryFileSystem::new(), file, &sink);
        sink.take_all()
    }

    #[test]
    fn engine_registers_builtin_rules() {
        let engine = LintEngine::new(&LintConfig::default(), oracle()).unwrap();
        assert_eq!(engine.rule_count(), 8);
        let names = engine.rule_names();
        assert!(names.contains(&"signal-usage"));
        assert!(names.contains(&"ion-attribute-type"));
    }

    #[test]
    fn engine_custom_rule_tags_rule_name() {
        let mut engine = LintEngine::without_rules(&LintConfig::default());
        engine.register(Box::new(DummyRule { on: true }));
        let diags = run(&engine);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].rule.as_deref(), Some("dummy-rule"));
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn engine_allow_suppresses_rule() {
        let mut engine = LintEngine::without_rules(&config(&[], &["dummy-rule"], &[]));
        engine.register(Box::new(DummyRule { on: true }));
        assert!(run(&engine).is_empty());
    }

    #[test]
    fn engine_deny_promotes_severity() {
        let mut engine = LintEngine::without_rules(&config(&["dummy-rule"], &[], &[]));
        engine.register(Box::new(DummyRule { on: true }));
        let diags = run(&engine);
        assert_eq!(diags[0].severity, Severity::Error);
    }

    #[test]
    fn off_by_default_rules_need_warn() {
        let mut engine = LintEngine::without_rules(&LintConfig::default());
        engine.register(Box::new(DummyRule { on: false }));
        assert!(run(&engine).is_empty());

        let mut engine = LintEngine::without_rules(&config(&[], &[], &["dummy-rule"]));
        engine.register(Box::new(DummyRule { on: false }));
        assert_eq!(run(&engine).len(), 1);
    }

    #[test]
    fn unknown_rule_is_a_setup_error() {
        let err = LintEngine::new(&config(&["no-such-rule"], &[], &[]), oracle())
            .err()
            .unwrap();
        assert_eq!(err, RuleSetupError::UnknownRule("no-such-rule".to_string()));
    }

    #[test]
    fn rule_codes_are_accepted_in_lists() {
        let engine = LintEngine::new(&config(&["w105"], &["C101"], &["W107"]), oracle()).unwrap();
        let enabled: Vec<&str> = engine
            .rules()
            .filter(|r| engine.is_enabled(*r))
            .map(|r| r.name())
            .collect();
        assert!(enabled.contains(&"ion-boolean-attribute"));
        assert!(!enabled.contains(&"prefer-readonly"));
        assert!(engine.denied.contains("signal-usage"));
    }

    #[test]
    fn deny_element_without_elements_is_fatal() {
        let mut cfg = LintConfig::default();
        cfg.rules.deny_element = Some(DenyElementOptions { elements: None });
        let err = LintEngine::new(&cfg, oracle()).err().unwrap();
        assert!(matches!(err, RuleSetupError::MissingOption { rule: "deny-element", .. }));
    }
}
