//! Ionic attribute checks against the fixture `@ionic/core` declarations.

use std::sync::Arc;

use ngl_config::LintConfig;
use ngl_conformance::{full_pipeline, full_pipeline_with_lint, COMPONENT_PATH};
use ngl_diagnostics::DiagnosticSink;
use ngl_ionic::AttributeTypeOracle;
use ngl_lint::LintEngine;
use ngl_source::{MemoryFileSystem, SourceDb};

fn page(template: &str) -> String {
    format!("@Component({{ selector: 'app-home', template: `{template}` }})\nexport class HomePage {{}}\n")
}

// ===========================================================================
// Oracle boundary
// ===========================================================================

#[test]
fn permitted_string_value_is_clean() {
    let result = full_pipeline(&page(r#"<ion-item lines="full"></ion-item>"#));
    assert!(result.diagnostics.is_empty());
}

#[test]
fn boolean_string_is_rewritten_to_a_binding() {
    let source = page(r#"<ion-item button="true"></ion-item>"#);
    let result = full_pipeline(&source);
    assert_eq!(result.message_ids(), ["booleanAttribute"]);
    assert_eq!(result.diagnostics[0].rule.as_deref(), Some("ion-attribute-type"));
    assert_eq!(result.fixed(), page(r#"<ion-item [button]="true"></ion-item>"#));
}

#[test]
fn bare_number_attribute_binds_zero() {
    let source = page("<ion-progress-bar value></ion-progress-bar>");
    let result = full_pipeline(&source);
    assert_eq!(result.message_ids(), ["numberAttribute"]);
    assert_eq!(result.fixed(), page(r#"<ion-progress-bar [value]="0"></ion-progress-bar>"#));
}

#[test]
fn null_and_undefined_are_exempt_at_every_kind() {
    let source = page(
        r#"<ion-item button="null" lines="undefined" router-animation="null"></ion-item><ion-progress-bar value="undefined"></ion-progress-bar><ion-spinner [name]="null" paused="undefined"></ion-spinner>"#,
    );
    let result = full_pipeline_with_lint(&source, &[], &[], &["ion-boolean-attribute"]);
    assert!(result.diagnostics.is_empty(), "{:?}", result.message_ids());
}

// ===========================================================================
// Kinds and fixes
// ===========================================================================

#[test]
fn alias_resolved_strings() {
    let source = page(
        r#"<ion-button color="tertiary" router-direction="back"></ion-button><ion-button router-direction="sideways"></ion-button>"#,
    );
    let result = full_pipeline(&source);
    assert_eq!(result.message_ids(), ["invalidStringValue"]);
    let diag = &result.diagnostics[0];
    assert_eq!(diag.data["attribute"], "router-direction");
    assert_eq!(diag.data["allowed"], "forward, back, root");
    assert!(diag.fix.is_none());
}

#[test]
fn object_attributes_get_a_null_placeholder() {
    let source = page(r#"<ion-item router-animation="fade"></ion-item>"#);
    let result = full_pipeline(&source);
    assert_eq!(result.message_ids(), ["objectAttribute"]);
    assert_eq!(result.fixed(), page(r#"<ion-item [routerAnimation]="null"></ion-item>"#));
}

#[test]
fn boolean_words_are_case_insensitive() {
    let source = page(r#"<ion-input disabled="YES"></ion-input><ion-item detail="0"></ion-item>"#);
    let result = full_pipeline(&source);
    let suggested: Vec<&str> = result
        .diagnostics
        .iter()
        .map(|d| d.data["suggested"].as_str())
        .collect();
    assert_eq!(suggested, ["true", "false"]);
}

// ===========================================================================
// The two attribute rules together
// ===========================================================================

#[test]
fn boolean_rule_alone_matches_the_general_rule() {
    let source = page(r#"<ion-item button="false"></ion-item>"#);
    let result = full_pipeline_with_lint(&source, &[], &["ion-attribute-type"], &["ion-boolean-attribute"]);
    assert_eq!(result.message_ids(), ["booleanAttribute"]);
    assert_eq!(result.diagnostics[0].rule.as_deref(), Some("ion-boolean-attribute"));
    assert_eq!(result.fixed(), page(r#"<ion-item [button]="false"></ion-item>"#));
}

#[test]
fn overlapping_fixes_apply_once() {
    let source = page(r#"<ion-item button="true"></ion-item>"#);
    let result = full_pipeline_with_lint(&source, &[], &[], &["W107"]);
    assert_eq!(result.message_ids(), ["booleanAttribute", "booleanAttribute"]);
    assert_eq!(result.fixed(), page(r#"<ion-item [button]="true"></ion-item>"#));
}

// ===========================================================================
// Degraded declarations
// ===========================================================================

#[test]
fn missing_declarations_silence_the_attribute_rules() {
    let config = LintConfig {
        warn: vec!["ion-boolean-attribute".to_string()],
        ..LintConfig::default()
    };
    let fs = Arc::new(MemoryFileSystem::new());
    let oracle = Arc::new(AttributeTypeOracle::new(
        "/project/node_modules/@ionic/core/dist/types/components.d.ts",
        fs.clone(),
        8,
    ));
    let engine = LintEngine::new(&config, Arc::clone(&oracle)).unwrap();

    let mut db = SourceDb::new();
    let file = db.add_source(
        COMPONENT_PATH,
        page(r#"<ion-item button="true"></ion-item><ion-progress-bar value></ion-progress-bar>"#),
    );
    let sink = DiagnosticSink::new();
    engine.lint_file(&mut db, &*fs, file, &sink);
    assert!(sink.take_all().is_empty());
    assert!(!oracle.is_component("ion-item"));
}
