//! Auto-applicable fix suggestions for diagnostics.

use ngl_source::Span;
use serde::{Deserialize, Serialize};

/// A text replacement to apply to source code as part of a suggested fix.
///
/// An empty `span` is an insertion; an empty `new_text` is a removal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// The source span to replace.
    pub span: Span,
    /// The new text to put in place of the span.
    pub new_text: String,
}

impl Replacement {
    /// Replaces the text covered by `span`.
    pub fn replace(span: Span, new_text: impl Into<String>) -> Self {
        Self {
            span,
            new_text: new_text.into(),
        }
    }

    /// Inserts text at the start of `span`.
    pub fn insert(span: Span, text: impl Into<String>) -> Self {
        Self::replace(span.start_point(), text)
    }

    /// Inserts text at the end of `span`.
    pub fn insert_after(span: Span, text: impl Into<String>) -> Self {
        Self::replace(span.end_point(), text)
    }

    /// Removes the text covered by `span`.
    pub fn remove(span: Span) -> Self {
        Self::replace(span, String::new())
    }
}

/// A suggested fix that can be applied automatically.
///
/// All replacements of one fix are applied together or not at all.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuggestedFix {
    /// A description of what this fix does.
    pub message: String,
    /// The text replacements that together implement this fix.
    pub replacements: Vec<Replacement>,
}

impl SuggestedFix {
    /// Creates a fix from a message and its replacements.
    pub fn new(message: impl Into<String>, replacements: Vec<Replacement>) -> Self {
        Self {
            message: message.into(),
            replacements,
        }
    }

    /// Creates a fix consisting of a single replacement.
    pub fn single(message: impl Into<String>, replacement: Replacement) -> Self {
        Self::new(message, vec![replacement])
    }

    /// Returns the smallest span covering every replacement, if all
    /// replacements live in the same file.
    pub fn covering_span(&self) -> Option<Span> {
        let first = self.replacements.first()?.span;
        self.replacements.iter().skip(1).try_fold(first, |acc, r| {
            (r.span.file == acc.file).then(|| acc.merge(r.span))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngl_source::FileId;

    fn span(start: u32, end: u32) -> Span {
        Span::new(FileId::from_raw(0), start, end)
    }

    #[test]
    fn replacement_constructors() {
        assert_eq!(Replacement::insert(span(4, 9), "x").span, span(4, 4));
        assert_eq!(Replacement::insert_after(span(4, 9), "x").span, span(9, 9));
        assert!(Replacement::remove(span(1, 2)).new_text.is_empty());
    }

    #[test]
    fn covering_span_spans_all_edits() {
        let fix = SuggestedFix::new(
            "use set()",
            vec![
                Replacement::replace(span(10, 13), ".set("),
                Replacement::insert(span(20, 20), ")"),
            ],
        );
        assert_eq!(fix.covering_span(), Some(span(10, 20)));
    }

    #[test]
    fn covering_span_rejects_cross_file_fix() {
        let other = Span::new(FileId::from_raw(1), 0, 1);
        let fix = SuggestedFix::new(
            "x",
            vec![Replacement::insert(span(0, 0), "a"), Replacement::insert(other, "b")],
        );
        assert_eq!(fix.covering_span(), None);
        assert_eq!(SuggestedFix::new("empty", Vec::new()).covering_span(), None);
    }
}
