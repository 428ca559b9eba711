//! `ngl lint` — the lint pipeline.
//!
//! 1. Find the project root (walk up looking for `ngl.toml`)
//! 2. Load config via `ngl_config`, merging `--allow`/`--deny`
//! 3. Collect `.ts` files from the arguments or the configured `src`
//! 4. Lint each file; with `--fix`, re-lint and apply fixes until the file
//!    converges, then write every changed file back
//! 5. Render the remaining diagnostics

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ngl_config::LintConfig;
use ngl_diagnostics::{
    apply_fixes, Diagnostic, DiagnosticRenderer, DiagnosticSink, JsonRenderer, Severity,
    TerminalRenderer,
};
use ngl_ionic::AttributeTypeOracle;
use ngl_lint::LintEngine;
use ngl_source::{FileSystem, OsFileSystem, SourceDb};
use tracing::{debug, warn};

use crate::pipeline::{collect_targets, discover_source_files, resolve_project_root, OverlayFileSystem};
use crate::{GlobalArgs, LintArgs, ReportFormat};

/// Upper bound on lint + fix rounds for one file.
pub const MAX_FIX_PASSES: usize = 10;

/// Runs the `ngl lint` command.
///
/// Returns exit code 0 if no error-severity diagnostics remain, 1 otherwise.
pub fn run(args: &LintArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = ngl_config::load_config(&project_dir)?;

    if !global.quiet && args.format == ReportFormat::Text {
        eprintln!("   Checking {}", config.project.name);
    }

    let files = if args.paths.is_empty() {
        let src_dir = project_dir.join(&config.project.src);
        if src_dir.is_dir() {
            discover_source_files(&src_dir)?
        } else {
            Vec::new()
        }
    } else {
        collect_targets(&args.paths)?
    };
    if files.is_empty() {
        if !global.quiet {
            eprintln!("warning: no TypeScript sources found");
        }
        return Ok(0);
    }

    let merged = merge_lint_config(&config.lint, args);
    let oracle = Arc::new(AttributeTypeOracle::new(
        config.ionic.components_dts(&project_dir),
        Arc::new(OsFileSystem),
        config.ionic.cache_capacity,
    ));
    let engine = LintEngine::new(&merged, Arc::clone(&oracle))?;

    let mut overlay = OverlayFileSystem::new(OsFileSystem);
    let mut totals = Totals::default();
    for path in &files {
        let checked = check_file(&engine, &mut overlay, path, args.fix)?;
        totals.fixes += checked.fixes;
        render(&checked, args.format, global);
        for diag in &checked.diagnostics {
            match diag.severity {
                Severity::Error => totals.errors += 1,
                Severity::Warning => totals.warnings += 1,
                _ => {}
            }
        }
    }
    let written = if args.fix { overlay.write_back()? } else { 0 };
    debug!(stats = ?oracle.cache_stats(), "oracle caches");

    if !global.quiet && args.format == ReportFormat::Text {
        if args.fix {
            eprintln!(
                "   Fixed: {} fix(es) in {} file(s)",
                totals.fixes, written
            );
        }
        eprintln!(
            "   Result: {} error(s), {} warning(s)",
            totals.errors, totals.warnings
        );
    }

    Ok(if totals.errors > 0 { 1 } else { 0 })
}

#[derive(Default)]
struct Totals {
    errors: usize,
    warnings: usize,
    fixes: usize,
}

/// The last lint pass over one file.
pub struct CheckedFile {
    /// Files loaded by the pass, for rendering.
    pub source_db: SourceDb,
    /// Diagnostics that remain.
    pub diagnostics: Vec<Diagnostic>,
    /// Fixes applied across all passes.
    pub fixes: usize,
}

/// Lints `path`. With `fix`, applies fixes to the file and its external
/// templates in `overlay` until a pass changes nothing or
/// [`MAX_FIX_PASSES`] is reached.
pub fn check_file<F: FileSystem>(
    engine: &LintEngine,
    overlay: &mut OverlayFileSystem<F>,
    path: &Path,
    fix: bool,
) -> Result<CheckedFile, Box<dyn std::error::Error>> {
    let mut fixes = 0;
    for pass in 1..=MAX_FIX_PASSES {
        let (source_db, diagnostics) = lint_once(engine, &*overlay, path)?;
        if !fix {
            return Ok(CheckedFile {
                source_db,
                diagnostics,
                fixes,
            });
        }

        let mut changed: Vec<(PathBuf, String)> = Vec::new();
        for file in source_db.files() {
            let outcome = apply_fixes(&file.content, file.id, &diagnostics)?;
            if outcome.changed()
                && ngl_common::ContentHash::of_str(&outcome.text) != file.content_hash
            {
                fixes += outcome.applied;
                changed.push((file.path.clone(), outcome.text));
            }
        }
        debug!(path = %path.display(), pass, files = changed.len(), "fix pass");
        if changed.is_empty() {
            return Ok(CheckedFile {
                source_db,
                diagnostics,
                fixes,
            });
        }
        for (file_path, text) in changed {
            overlay.set(file_path, text);
        }
    }

    warn!(path = %path.display(), passes = MAX_FIX_PASSES, "fixes did not converge");
    let (source_db, diagnostics) = lint_once(engine, &*overlay, path)?;
    Ok(CheckedFile {
        source_db,
        diagnostics,
        fixes,
    })
}

fn lint_once(
    engine: &LintEngine,
    fs: &dyn FileSystem,
    path: &Path,
) -> std::io::Result<(SourceDb, Vec<Diagnostic>)> {
    let mut source_db = SourceDb::new();
    let sink = DiagnosticSink::new();
    engine.lint_path(&mut source_db, fs, path, &sink)?;
    Ok((source_db, sink.take_all()))
}

fn render(checked: &CheckedFile, format: ReportFormat, global: &GlobalArgs) {
    match format {
        ReportFormat::Text => {
            if global.quiet {
                return;
            }
            let renderer = TerminalRenderer::new(global.color, 80);
            for diag in &checked.diagnostics {
                eprintln!("{}", renderer.render(diag, &checked.source_db));
            }
        }
        ReportFormat::Json => {
            for diag in &checked.diagnostics {
                println!("{}", JsonRenderer.render(diag, &checked.source_db));
            }
        }
    }
}

/// Merges CLI `--allow`/`--deny` flags with the config file's lint section.
///
/// CLI flags take precedence: if a rule appears in both CLI `--allow` and
/// config `deny`, the CLI `--allow` wins.
fn merge_lint_config(config: &LintConfig, args: &LintArgs) -> LintConfig {
    let mut merged = config.clone();

    for rule in &args.deny {
        merged.allow.retain(|r| r != rule);
        if !merged.deny.contains(rule) {
            merged.deny.push(rule.clone());
        }
    }
    for rule in &args.allow {
        merged.deny.retain(|r| r != rule);
        if !merged.allow.contains(rule) {
            merged.allow.push(rule.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngl_config::RuleOptions;
    use ngl_source::MemoryFileSystem;

    fn args(allow: &[&str], deny: &[&str]) -> LintArgs {
        LintArgs {
            paths: Vec::new(),
            fix: false,
            allow: allow.iter().map(|s| s.to_string()).collect(),
            deny: deny.iter().map(|s| s.to_string()).collect(),
            format: ReportFormat::Text,
        }
    }

    fn config(deny: &[&str], allow: &[&str]) -> LintConfig {
        LintConfig {
            deny: deny.iter().map(|s| s.to_string()).collect(),
            allow: allow.iter().map(|s| s.to_string()).collect(),
            warn: vec!["ion-boolean-attribute".to_string()],
            rules: RuleOptions::default(),
        }
    }

    fn engine() -> LintEngine {
        let oracle = Arc::new(AttributeTypeOracle::new(
            "/app/node_modules/@ionic/core/dist/types/components.d.ts",
            Arc::new(MemoryFileSystem::new()),
            16,
        ));
        LintEngine::new(&LintConfig::default(), oracle).unwrap()
    }

    #[test]
    fn merge_config_cli_deny_overrides() {
        let merged = merge_lint_config(&config(&[], &["signal-usage"]), &args(&[], &["signal-usage"]));
        assert!(merged.deny.contains(&"signal-usage".to_string()));
        assert!(!merged.allow.contains(&"signal-usage".to_string()));
    }

    #[test]
    fn merge_config_cli_allow_overrides() {
        let merged = merge_lint_config(&config(&["prefer-inject"], &[]), &args(&["prefer-inject"], &[]));
        assert!(merged.allow.contains(&"prefer-inject".to_string()));
        assert!(!merged.deny.contains(&"prefer-inject".to_string()));
    }

    #[test]
    fn merge_config_keeps_warn_and_options() {
        let merged = merge_lint_config(&config(&["W103"], &[]), &args(&[], &["W105"]));
        assert_eq!(merged.deny, ["W103", "W105"]);
        assert_eq!(merged.warn, ["ion-boolean-attribute"]);
    }

    #[test]
    fn fix_loop_converges_across_passes() {
        // readonly and the signal call are separate fixes on one member
        let src = "@Component({ template: '{{ count }}' })\n\
                   export class HomePage {\n  count = signal(0);\n  \
                   double() { return this.count * 2; }\n}\n";
        let base = MemoryFileSystem::new().with_file("/app/src/home.page.ts", src);
        let mut overlay = OverlayFileSystem::new(base);
        let checked =
            check_file(&engine(), &mut overlay, Path::new("/app/src/home.page.ts"), true).unwrap();
        assert!(checked.diagnostics.is_empty(), "{:?}", checked.diagnostics);
        assert_eq!(checked.fixes, 3);

        let fixed = overlay
            .read_to_string(Path::new("/app/src/home.page.ts"))
            .unwrap();
        assert!(fixed.contains("template: '{{ count() }}'"));
        assert!(fixed.contains("  readonly count = signal(0);"));
        assert!(fixed.contains("return this.count() * 2;"));
    }

    #[test]
    fn external_templates_are_fixed_in_the_overlay() {
        let base = MemoryFileSystem::new()
            .with_file(
                "/app/src/home.page.ts",
                "@Component({ templateUrl: './home.page.html' })\n\
                 export class HomePage {\n  readonly title = signal('');\n}\n",
            )
            .with_file("/app/src/home.page.html", "<h1>{{ title }}</h1>\n");
        let mut overlay = OverlayFileSystem::new(base);
        let checked =
            check_file(&engine(), &mut overlay, Path::new("/app/src/home.page.ts"), true).unwrap();
        assert!(checked.diagnostics.is_empty());
        let edited: Vec<_> = overlay.edited().collect();
        assert_eq!(edited, [Path::new("/app/src/home.page.html")]);
        assert_eq!(
            overlay
                .read_to_string(Path::new("/app/src/home.page.html"))
                .unwrap(),
            "<h1>{{ title() }}</h1>\n"
        );
    }

    #[test]
    fn without_fix_nothing_changes() {
        let src = "@Component({})\nexport class HomePage {\n  count = signal(0);\n}\n";
        let base = MemoryFileSystem::new().with_file("/app/src/home.page.ts", src);
        let mut overlay = OverlayFileSystem::new(base);
        let checked =
            check_file(&engine(), &mut overlay, Path::new("/app/src/home.page.ts"), false).unwrap();
        assert_eq!(checked.diagnostics.len(), 1);
        assert_eq!(checked.diagnostics[0].rule.as_deref(), Some("prefer-readonly"));
        assert_eq!(overlay.edited().count(), 0);
    }

    #[test]
    fn lint_end_to_end_on_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::write(
            root.join("ngl.toml"),
            "[project]\nname = \"app\"\n\n[lint]\ndeny = [\"W105\"]\n",
        )
        .unwrap();
        std::fs::create_dir_all(root.join("src/app")).unwrap();
        let page = root.join("src/app/home.page.ts");
        std::fs::write(
            &page,
            "@Component({})\nexport class HomePage {\n  readonly count = signal(0);\n  \
             show() { return this.count; }\n}\n",
        )
        .unwrap();

        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(root.join("ngl.toml").display().to_string()),
        };
        let mut lint_args = args(&[], &[]);
        lint_args.paths = vec![root.join("src")];
        assert_eq!(run(&lint_args, &global).unwrap(), 1);

        lint_args.fix = true;
        assert_eq!(run(&lint_args, &global).unwrap(), 0);
        assert!(std::fs::read_to_string(&page)
            .unwrap()
            .contains("return this.count();"));
    }
}
