//! Byte-offset ranges within source files.

use crate::file_id::FileId;
use serde::{Deserialize, Serialize};

/// A byte offset range within a source file.
///
/// `start` is inclusive and `end` is exclusive. Spans produced by the
/// template parser start out relative to the template text and are moved to
/// file offsets with [`Span::shifted`] once the template's position inside
/// the component file is known.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The source file this span belongs to.
    pub file: FileId,
    /// Byte offset of the start of the span (inclusive).
    pub start: u32,
    /// Byte offset of the end of the span (exclusive).
    pub end: u32,
}

impl Span {
    /// A dummy span used when no source location is available.
    pub const DUMMY: Span = Span {
        file: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    /// Creates a new span in the given file with the given byte range.
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Creates an empty span at `offset`, used for pure insertions.
    pub fn point(file: FileId, offset: u32) -> Self {
        Self {
            file,
            start: offset,
            end: offset,
        }
    }

    /// Merges two spans in the same file, producing a span that covers both.
    ///
    /// # Panics
    ///
    /// Panics if the two spans are from different files.
    pub fn merge(self, other: Span) -> Span {
        assert_eq!(
            self.file, other.file,
            "cannot merge spans from different files"
        );
        Span {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns this span moved by `delta` bytes and re-homed into `file`.
    pub fn shifted(self, file: FileId, delta: u32) -> Span {
        Span {
            file,
            start: self.start + delta,
            end: self.end + delta,
        }
    }

    /// Returns the empty span at this span's end.
    pub fn end_point(self) -> Span {
        Span::point(self.file, self.end)
    }

    /// Returns the empty span at this span's start.
    pub fn start_point(self) -> Span {
        Span::point(self.file, self.start)
    }

    /// Returns the span from this span's start to `other`'s end.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.file, self.start, other.end)
    }

    /// Returns the span between this span's end and `other`'s start.
    pub fn between(self, other: Span) -> Span {
        Span::new(self.file, self.end, other.start)
    }

    /// Returns `true` if `other` lies entirely inside this span.
    pub fn contains(&self, other: Span) -> bool {
        self.file == other.file && self.start <= other.start && other.end <= self.end
    }

    /// Returns `true` if the two spans share at least one byte, or if either is
    /// an insertion point located strictly inside the other.
    pub fn overlaps(&self, other: Span) -> bool {
        self.file == other.file && self.start < other.end && other.start < self.end
    }

    /// Returns the length of this span in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` if this span has zero length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if this is the dummy span.
    pub fn is_dummy(&self) -> bool {
        self.file == FileId::DUMMY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f() -> FileId {
        FileId::from_raw(0)
    }

    #[test]
    fn merge_is_order_independent() {
        let a = Span::new(f(), 5, 15);
        let b = Span::new(f(), 10, 25);
        assert_eq!(a.merge(b), Span::new(f(), 5, 25));
        assert_eq!(a.merge(b), b.merge(a));
    }

    #[test]
    fn shifted_moves_and_rehomes() {
        let template = FileId::from_raw(1);
        let s = Span::new(f(), 2, 7).shifted(template, 100);
        assert_eq!(s, Span::new(template, 102, 107));
    }

    #[test]
    fn points() {
        let s = Span::new(f(), 4, 9);
        assert_eq!(s.end_point(), Span::new(f(), 9, 9));
        assert_eq!(s.start_point(), Span::new(f(), 4, 4));
        assert!(s.end_point().is_empty());
    }

    #[test]
    fn to_and_between() {
        let a = Span::new(f(), 0, 4);
        let b = Span::new(f(), 7, 10);
        assert_eq!(a.to(b), Span::new(f(), 0, 10));
        assert_eq!(a.between(b), Span::new(f(), 4, 7));
    }

    #[test]
    fn containment_and_overlap() {
        let outer = Span::new(f(), 0, 20);
        assert!(outer.contains(Span::new(f(), 3, 8)));
        assert!(!outer.contains(Span::new(f(), 15, 25)));
        assert!(outer.overlaps(Span::new(f(), 15, 25)));
        assert!(!Span::new(f(), 0, 5).overlaps(Span::new(f(), 5, 9)));
        assert!(!outer.overlaps(Span::new(FileId::from_raw(2), 3, 8)));
    }

    #[test]
    fn len_and_empty() {
        assert_eq!(Span::new(f(), 10, 20).len(), 10);
        assert!(Span::point(f(), 5).is_empty());
    }

    #[test]
    fn dummy_span() {
        assert!(Span::DUMMY.is_dummy());
        assert!(!Span::point(f(), 0).is_dummy());
    }

    #[test]
    fn serde_roundtrip() {
        let s = Span::new(FileId::from_raw(1), 10, 20);
        let json = serde_json::to_string(&s).unwrap();
        let back: Span = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
