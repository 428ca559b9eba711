//! Diagnostic rendering backends for human-readable and machine-readable output.

use crate::diagnostic::Diagnostic;
use crate::label::LabelStyle;
use ngl_source::SourceDb;
use serde_json::json;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// ```text
/// warning[W105]: signal `count` is read without being called
///   --> src/app/home.page.ts:12:14
///    |
/// 12 |     total = this.count + 1;
///    |                  ^^^^^ call it: `count()`
///    |
///    = help: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
    /// The terminal width for line wrapping.
    pub width: u16,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool, width: u16) -> Self {
        Self { color, width }
    }

    fn paint(&self, text: &str, ansi: &str) -> String {
        if self.color {
            format!("\x1b[{ansi}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = String::new();

        let header = format!("{}[{}]", diag.severity, diag.code);
        let ansi = if diag.severity.is_error() { "1;31" } else { "1;33" };
        out.push_str(&format!("{}: {}\n", self.paint(&header, ansi), diag.message));

        if !diag.primary_span.is_dummy() {
            let resolved = source_db.resolve_span(diag.primary_span);
            out.push_str(&format!("  --> {resolved}\n"));

            let file = source_db.get_file(diag.primary_span.file);
            let (line, col) = file.line_col(diag.primary_span.start);
            let line_num = line.to_string();
            let padding = " ".repeat(line_num.len());
            let line_content = get_source_line(&file.content, diag.primary_span.start);

            out.push_str(&format!("{padding} |\n"));
            out.push_str(&format!("{line_num} | {line_content}\n"));

            // Underline stops at the end of the first line of a multi-line span.
            let remaining = line_content.len().saturating_sub(col as usize - 1).max(1);
            let span_len = (diag.primary_span.len() as usize).clamp(1, remaining);
            let carets = "^".repeat(span_len);
            let col_padding = " ".repeat((col as usize).saturating_sub(1));
            let primary_msg = diag
                .labels
                .iter()
                .find(|l| l.style == LabelStyle::Primary)
                .map(|l| format!(" {}", l.message))
                .unwrap_or_default();

            out.push_str(&format!("{padding} | {col_padding}{carets}{primary_msg}\n"));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        if let Some(fix) = &diag.fix {
            out.push_str(&format!("   = fix: {}\n", fix.message));
        }

        out
    }
}

/// Renders one diagnostic per line as a JSON object with a resolved location.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRenderer;

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let location = (!diag.primary_span.is_dummy()).then(|| {
            let r = source_db.resolve_span(diag.primary_span);
            json!({
                "file": r.file_path.display().to_string(),
                "line": r.start_line,
                "column": r.start_col,
                "endLine": r.end_line,
                "endColumn": r.end_col,
            })
        });
        json!({
            "code": diag.code.to_string(),
            "rule": diag.rule,
            "severity": diag.severity.to_string(),
            "messageId": diag.message_id,
            "message": diag.message,
            "data": diag.data,
            "location": location,
            "fixable": diag.fix.is_some(),
        })
        .to_string()
    }
}

/// Extracts the line of source code containing the given byte offset.
fn get_source_line(content: &str, byte_offset: u32) -> &str {
    let offset = (byte_offset as usize).min(content.len());
    let start = content[..offset].rfind('\n').map_or(0, |pos| pos + 1);
    let end = content[offset..]
        .find('\n')
        .map_or(content.len(), |pos| offset + pos);
    &content[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use crate::label::Label;
    use crate::suggested_fix::{Replacement, SuggestedFix};
    use ngl_source::Span;

    #[test]
    fn render_warning_with_span_and_fix() {
        let mut db = SourceDb::new();
        let id = db.add_source("home.page.ts", "    total = this.count + 1;\n".to_string());
        let span = Span::new(id, 17, 22);
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Warning, 105),
            "signal `count` is read without being called",
            span,
        )
        .with_label(Label::primary(span, "call it: `count()`"))
        .with_fix(SuggestedFix::single(
            "append `()`",
            Replacement::insert_after(span, "()"),
        ));

        let output = TerminalRenderer::new(false, 80).render(&diag, &db);
        assert!(output.contains("warning[W105]: signal `count` is read without being called"));
        assert!(output.contains("--> home.page.ts:1:18"));
        assert!(output.contains("total = this.count + 1;"));
        assert!(output.contains("^^^^^ call it: `count()`"));
        assert!(output.contains("= fix: append `()`"));
    }

    #[test]
    fn render_dummy_span_without_location() {
        let db = SourceDb::new();
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Error, 999),
            "general error",
            Span::DUMMY,
        )
        .with_help("check the configuration");
        let output = TerminalRenderer::new(false, 80).render(&diag, &db);
        assert!(output.contains("error[E999]: general error"));
        assert!(!output.contains("-->"));
        assert!(output.contains("= help: check the configuration"));
    }

    #[test]
    fn colored_header() {
        let db = SourceDb::new();
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Error, 1), "x", Span::DUMMY);
        let output = TerminalRenderer::new(true, 80).render(&diag, &db);
        assert!(output.starts_with("\x1b[1;31merror[E001]\x1b[0m"));
    }

    #[test]
    fn json_render_includes_location_and_identity() {
        let mut db = SourceDb::new();
        let id = db.add_source("a.html", "<ion-item button=\"true\">".to_string());
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Warning, 108),
            "attribute `button` expects a boolean",
            Span::new(id, 10, 23),
        )
        .with_message_id("booleanAttribute")
        .with_data("attribute", "button");
        let line = JsonRenderer.render(&diag, &db);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["code"], "W108");
        assert_eq!(value["messageId"], "booleanAttribute");
        assert_eq!(value["data"]["attribute"], "button");
        assert_eq!(value["location"]["line"], 1);
        assert_eq!(value["location"]["column"], 11);
        assert_eq!(value["fixable"], false);
    }
}
