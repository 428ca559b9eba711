//! Central database of every file a lint run reads.

use crate::file_id::FileId;
use crate::fs::{normalize_path, FileSystem};
use crate::resolved_span::ResolvedSpan;
use crate::source_file::SourceFile;
use crate::span::Span;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// The source database, owning all loaded text and resolving
/// [`FileId`] + byte offsets to line/column coordinates for diagnostics.
///
/// A file is loaded at most once per path: two components sharing a
/// `templateUrl` get the same `FileId`.
pub struct SourceDb {
    files: Vec<SourceFile>,
    by_path: HashMap<PathBuf, FileId>,
}

impl SourceDb {
    /// Creates an empty source database.
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            by_path: HashMap::new(),
        }
    }

    /// Loads a file through `fs` and returns its [`FileId`].
    ///
    /// If the same (normalized) path was loaded before, the existing id is
    /// returned without reading again.
    pub fn load_file(&mut self, fs: &dyn FileSystem, path: &Path) -> Result<FileId, io::Error> {
        let key = normalize_path(path);
        if let Some(id) = self.by_path.get(&key) {
            return Ok(*id);
        }
        let content = fs.read_to_string(&key)?;
        Ok(self.add_source(key, content))
    }

    /// Adds a file from an in-memory string.
    ///
    /// The `name` is used as the file path in diagnostics.
    pub fn add_source(&mut self, name: impl Into<PathBuf>, content: String) -> FileId {
        let path = name.into();
        let id = FileId::from_raw(self.files.len() as u32);
        self.by_path.insert(normalize_path(&path), id);
        self.files.push(SourceFile::new(id, path, content));
        id
    }

    /// Looks up a previously loaded file by path.
    pub fn find(&self, path: &Path) -> Option<FileId> {
        self.by_path.get(&normalize_path(path)).copied()
    }

    /// Returns the [`SourceFile`] for the given [`FileId`].
    ///
    /// # Panics
    ///
    /// Panics if the `FileId` is invalid.
    pub fn get_file(&self, id: FileId) -> &SourceFile {
        &self.files[id.as_raw() as usize]
    }

    /// Returns the number of loaded files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates over all loaded files in load order.
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    /// Resolves a [`Span`] to human-readable line/column coordinates.
    pub fn resolve_span(&self, span: Span) -> ResolvedSpan {
        let file = self.get_file(span.file);
        let (start_line, start_col) = file.line_col(span.start);
        let (end_line, end_col) = file.line_col(span.end.saturating_sub(1).max(span.start));
        ResolvedSpan {
            file_path: file.path.clone(),
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Returns the source text corresponding to a [`Span`].
    ///
    /// Dummy spans yield the empty string.
    pub fn snippet(&self, span: Span) -> &str {
        if span.is_dummy() {
            return "";
        }
        self.get_file(span.file).snippet(span.start, span.end)
    }
}

impl Default for SourceDb {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;

    #[test]
    fn add_and_get() {
        let mut db = SourceDb::new();
        let id = db.add_source("a.ts", "export class A {}".to_string());
        assert_eq!(db.get_file(id).content, "export class A {}");
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn resolve_span_lines() {
        let mut db = SourceDb::new();
        let id = db.add_source("t.html", "<p>\n{{ a }}\n</p>".to_string());
        let resolved = db.resolve_span(Span::new(id, 7, 8));
        assert_eq!(resolved.file_path, PathBuf::from("t.html"));
        assert_eq!((resolved.start_line, resolved.start_col), (2, 4));
        assert_eq!((resolved.end_line, resolved.end_col), (2, 4));
    }

    #[test]
    fn snippet_and_dummy() {
        let mut db = SourceDb::new();
        let id = db.add_source("a.ts", "this.count".to_string());
        assert_eq!(db.snippet(Span::new(id, 5, 10)), "count");
        assert_eq!(db.snippet(Span::DUMMY), "");
    }

    #[test]
    fn load_file_is_deduplicated_by_path() {
        let fs = MemoryFileSystem::new().with_file("/app/home.html", "<ion-content/>");
        let mut db = SourceDb::new();
        let a = db.load_file(&fs, Path::new("/app/home.html")).unwrap();
        let b = db.load_file(&fs, Path::new("/app/x/../home.html")).unwrap();
        assert_eq!(a, b);
        assert_eq!(db.len(), 1);
        assert_eq!(db.find(Path::new("/app/home.html")), Some(a));
    }

    #[test]
    fn load_missing_file_errors() {
        let fs = MemoryFileSystem::new();
        let mut db = SourceDb::new();
        assert!(db.load_file(&fs, Path::new("/missing.html")).is_err());
        assert!(db.is_empty());
    }
}
