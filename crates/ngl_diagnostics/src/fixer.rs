//! Applies suggested fixes to a file's text.
//!
//! The protocol: every fix is applied atomically, fixes are considered in
//! source order of the range they cover, and a fix whose range starts at or
//! before the end of an already applied fix is skipped. Skipped fixes are
//! picked up by a later pass once the text has been re-linted.

use crate::diagnostic::Diagnostic;
use crate::suggested_fix::{Replacement, SuggestedFix};
use ngl_common::{InternalError, NglResult};
use ngl_source::{FileId, Span};

/// The result of applying one pass of fixes to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    /// The rewritten text.
    pub text: String,
    /// Number of fixes applied.
    pub applied: usize,
    /// Number of fixes skipped because they overlapped an applied fix.
    pub skipped: usize,
}

impl FixOutcome {
    /// Returns `true` if the pass changed the text.
    pub fn changed(&self) -> bool {
        self.applied > 0
    }
}

/// Applies every fix from `diagnostics` that targets `file` to `source`.
///
/// Fixes that touch other files are ignored. Returns an error only when a
/// single fix is malformed (its own replacements overlap or run past the end
/// of the text), which is a bug in the rule that produced it.
pub fn apply_fixes(source: &str, file: FileId, diagnostics: &[Diagnostic]) -> NglResult<FixOutcome> {
    let mut candidates: Vec<(Span, &SuggestedFix)> = diagnostics
        .iter()
        .filter_map(|d| d.fix.as_ref())
        .filter_map(|fix| fix.covering_span().map(|span| (span, fix)))
        .filter(|(span, _)| span.file == file)
        .collect();
    candidates.sort_by_key(|(span, _)| (span.start, span.end));

    let mut text = String::with_capacity(source.len());
    let mut cursor = 0usize;
    let mut last_end: Option<u32> = None;
    let mut applied = 0;
    let mut skipped = 0;

    for (range, fix) in candidates {
        if last_end.is_some_and(|end| range.start <= end) {
            skipped += 1;
            continue;
        }
        let edits = ordered_edits(fix, source.len())?;
        for edit in edits {
            let start = edit.span.start as usize;
            let end = edit.span.end as usize;
            text.push_str(slice(source, cursor, start)?);
            text.push_str(&edit.new_text);
            cursor = end;
        }
        last_end = Some(range.end);
        applied += 1;
    }
    text.push_str(slice(source, cursor, source.len())?);

    Ok(FixOutcome {
        text,
        applied,
        skipped,
    })
}

/// Sorts a fix's replacements and checks they are disjoint and in bounds.
fn ordered_edits(fix: &SuggestedFix, len: usize) -> NglResult<Vec<&Replacement>> {
    let mut edits: Vec<&Replacement> = fix.replacements.iter().collect();
    edits.sort_by_key(|r| (r.span.start, r.span.end));
    let mut prev_end = 0u32;
    for (i, edit) in edits.iter().enumerate() {
        if edit.span.end as usize > len || edit.span.start > edit.span.end {
            return Err(InternalError::new(format!(
                "fix `{}` edits {}..{} outside a {len}-byte file",
                fix.message, edit.span.start, edit.span.end
            )));
        }
        if i > 0 && edit.span.start < prev_end {
            return Err(InternalError::new(format!(
                "fix `{}` has overlapping edits",
                fix.message
            )));
        }
        prev_end = edit.span.end;
    }
    Ok(edits)
}

fn slice(source: &str, start: usize, end: usize) -> NglResult<&str> {
    source
        .get(start..end)
        .ok_or_else(|| InternalError::new(format!("fix boundary {start}..{end} splits a character")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};

    const F: FileId = FileId::DUMMY;

    fn file() -> FileId {
        FileId::from_raw(0)
    }

    fn span(start: u32, end: u32) -> Span {
        Span::new(file(), start, end)
    }

    fn diag(fix: SuggestedFix) -> Diagnostic {
        Diagnostic::warning(DiagnosticCode::new(Category::Warning, 105), "m", span(0, 0))
            .with_fix(fix)
    }

    #[test]
    fn applies_insertion() {
        let src = "x = this.count;";
        let d = diag(SuggestedFix::single("call", Replacement::insert(span(14, 14), "()")));
        let out = apply_fixes(src, file(), &[d]).unwrap();
        assert_eq!(out.text, "x = this.count();");
        assert_eq!(out.applied, 1);
        assert!(out.changed());
    }

    #[test]
    fn multi_edit_fix_is_atomic() {
        let src = "this.count = 5;";
        let d = diag(SuggestedFix::new(
            "use set",
            vec![
                Replacement::replace(span(10, 13), ".set("),
                Replacement::insert(span(14, 14), ")"),
            ],
        ));
        let out = apply_fixes(src, file(), &[d]).unwrap();
        assert_eq!(out.text, "this.count.set(5);");
    }

    #[test]
    fn overlapping_fix_is_skipped() {
        let src = "abcdef";
        let first = diag(SuggestedFix::single("a", Replacement::replace(span(0, 3), "X")));
        let second = diag(SuggestedFix::single("b", Replacement::replace(span(2, 5), "Y")));
        let out = apply_fixes(src, file(), &[second, first]).unwrap();
        assert_eq!(out.text, "Xdef");
        assert_eq!(out.applied, 1);
        assert_eq!(out.skipped, 1);
    }

    #[test]
    fn touching_fixes_are_not_both_applied() {
        let src = "ab";
        let first = diag(SuggestedFix::single("a", Replacement::insert(span(1, 1), "(")));
        let second = diag(SuggestedFix::single("b", Replacement::insert(span(1, 1), ")")));
        let out = apply_fixes(src, file(), &[first, second]).unwrap();
        assert_eq!(out.text, "a(b");
        assert_eq!(out.skipped, 1);
    }

    #[test]
    fn other_files_are_ignored() {
        let src = "abc";
        let d = diag(SuggestedFix::single(
            "elsewhere",
            Replacement::insert(Span::new(FileId::from_raw(7), 0, 0), "z"),
        ));
        let out = apply_fixes(src, file(), &[d]).unwrap();
        assert_eq!(out.text, "abc");
        assert!(!out.changed());
    }

    #[test]
    fn out_of_bounds_edit_is_internal_error() {
        let d = diag(SuggestedFix::single("bad", Replacement::insert(span(10, 10), "x")));
        assert!(apply_fixes("abc", file(), &[d]).is_err());
    }

    #[test]
    fn self_overlapping_fix_is_internal_error() {
        let d = diag(SuggestedFix::new(
            "bad",
            vec![
                Replacement::replace(span(0, 2), "x"),
                Replacement::replace(span(1, 3), "y"),
            ],
        ));
        assert!(apply_fixes("abcd", file(), &[d]).is_err());
    }

    #[test]
    fn diagnostics_without_fix_leave_text_alone() {
        let d = Diagnostic::warning(DiagnosticCode::new(Category::Warning, 103), "m", Span::DUMMY);
        let out = apply_fixes("<ion-modal>", F, &[d]).unwrap();
        assert_eq!(out.text, "<ion-modal>");
    }
}
