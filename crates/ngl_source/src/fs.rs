//! The file-system read interface used for templates and declaration files.
//!
//! Rules never touch `std::fs` directly. The pipeline hands them a
//! [`FileSystem`], which is [`OsFileSystem`] in the CLI and
//! [`MemoryFileSystem`] in tests. A failed read is an ordinary `io::Error`
//! that callers degrade to "absent".

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Read-only access to files referenced by the sources being linted.
pub trait FileSystem: Send + Sync {
    /// Reads the whole file at `path` as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Returns `true` if `path` names an existing regular file.
    fn is_file(&self, path: &Path) -> bool;
}

/// The real file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// An in-memory file system keyed by lexically normalized paths.
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: HashMap<PathBuf, String>,
}

impl MemoryFileSystem {
    /// Creates an empty in-memory file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a file.
    pub fn insert(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .insert(normalize_path(path.as_ref()), content.into());
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    /// Returns the number of files held.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no files are held.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(&normalize_path(path))
            .cloned()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                )
            })
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize_path(path))
    }
}

/// Lexically normalizes a path, folding `.` and `..` components.
///
/// No file-system access happens; `..` at the root of a relative path is
/// kept so that `../x` stays meaningful.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().map(|c| c.as_os_str()).collect()
}

/// Resolves `relative` against the directory containing `from_file`.
pub fn resolve_relative(from_file: &Path, relative: &str) -> PathBuf {
    let base = from_file.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&base.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(
            normalize_path(Path::new("/a/b/./c/../d.html")),
            PathBuf::from("/a/b/d.html")
        );
        assert_eq!(
            normalize_path(Path::new("../x/./y")),
            PathBuf::from("../x/y")
        );
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn resolve_relative_to_file_directory() {
        let p = resolve_relative(
            Path::new("/app/src/home/home.page.ts"),
            "./home.page.html",
        );
        assert_eq!(p, PathBuf::from("/app/src/home/home.page.html"));
        let p = resolve_relative(Path::new("/app/src/home/home.page.ts"), "../shared/a.html");
        assert_eq!(p, PathBuf::from("/app/src/shared/a.html"));
    }

    #[test]
    fn memory_fs_reads_normalized_paths() {
        let fs = MemoryFileSystem::new().with_file("/app/a/../b.html", "<p></p>");
        assert_eq!(fs.read_to_string(Path::new("/app/b.html")).unwrap(), "<p></p>");
        assert!(fs.is_file(Path::new("/app/./b.html")));
        assert_eq!(fs.len(), 1);
    }

    #[test]
    fn memory_fs_missing_file_is_not_found() {
        let fs = MemoryFileSystem::new();
        let err = fs.read_to_string(Path::new("/nope.html")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(fs.is_empty());
    }

    #[test]
    fn os_fs_reads_real_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.html");
        std::fs::write(&path, "<ion-item></ion-item>").unwrap();
        assert!(OsFileSystem.is_file(&path));
        assert_eq!(
            OsFileSystem.read_to_string(&path).unwrap(),
            "<ion-item></ion-item>"
        );
        assert!(!OsFileSystem.is_file(&dir.path().join("missing")));
    }
}
