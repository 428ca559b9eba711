//! Source file representation with line-start indexing for line/column lookup.

use crate::file_id::FileId;
use ngl_common::ContentHash;
use std::path::PathBuf;

/// A file loaded into the lint run.
pub struct SourceFile {
    /// The identifier of this file within the [`SourceDb`](crate::SourceDb).
    pub id: FileId,
    /// The path of this file (or a synthetic name for in-memory sources).
    pub path: PathBuf,
    /// The full text content of the file.
    pub content: String,
    /// Byte offsets of each line start (the first entry is always 0).
    line_starts: Vec<u32>,
    /// Hash of the file content, compared between fix passes.
    pub content_hash: ContentHash,
}

impl SourceFile {
    /// Creates a new `SourceFile` with precomputed line starts and content hash.
    pub fn new(id: FileId, path: PathBuf, content: String) -> Self {
        let line_starts = compute_line_starts(&content);
        let content_hash = ContentHash::of_str(&content);
        Self {
            id,
            path,
            content,
            line_starts,
            content_hash,
        }
    }

    /// Converts a byte offset into 1-indexed (line, column) coordinates.
    pub fn line_col(&self, byte_offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line = (line_idx as u32) + 1;
        let col = byte_offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// Returns a substring of the file content between byte offsets.
    ///
    /// Out-of-range offsets are clamped to the content length.
    pub fn snippet(&self, start: u32, end: u32) -> &str {
        let len = self.content.len();
        let start = (start as usize).min(len);
        let end = (end as usize).clamp(start, len);
        self.content.get(start..end).unwrap_or("")
    }
}

/// Computes the byte offsets of each line start in the given content.
fn compute_line_starts(content: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    starts.extend(
        content
            .bytes()
            .enumerate()
            .filter(|(_, b)| *b == b'\n')
            .map(|(i, _)| (i + 1) as u32),
    );
    starts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_file(content: &str) -> SourceFile {
        SourceFile::new(
            FileId::from_raw(0),
            PathBuf::from("home.page.ts"),
            content.to_string(),
        )
    }

    #[test]
    fn line_starts_computation() {
        let f = make_file("a\nbc\nd");
        assert_eq!(f.line_starts, vec![0, 2, 5]);
    }

    #[test]
    fn line_col_resolution() {
        let f = make_file("class A {\n  x = 1;\n}");
        assert_eq!(f.line_col(0), (1, 1));
        assert_eq!(f.line_col(12), (2, 3));
        assert_eq!(f.line_col(19), (3, 1));
    }

    #[test]
    fn snippet_extraction_and_clamping() {
        let f = make_file("this.count");
        assert_eq!(f.snippet(5, 10), "count");
        assert_eq!(f.snippet(5, 99), "count");
        assert_eq!(f.snippet(50, 60), "");
    }

    #[test]
    fn content_hash_matches() {
        let f = make_file("x");
        assert_eq!(f.content_hash, ContentHash::of_str("x"));
    }
}
