//! Shared pipeline helpers for CLI commands.
//!
//! Project root resolution, source file discovery, and the overlay file
//! system that holds fixed file contents until they are written back.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use ngl_config::CONFIG_FILE_NAME;
use ngl_source::FileSystem;

use crate::GlobalArgs;

/// Directories never descended into during discovery.
const SKIPPED_DIRS: &[&str] = &["node_modules", "dist", "www", ".angular", ".git"];

/// Walks up from `start` looking for the nearest directory containing
/// `ngl.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE_NAME).is_file())
        .map(Path::to_path_buf)
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir →
/// itself). Otherwise walks up from the current directory looking for
/// `ngl.toml`, and falls back to the current directory.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        let cwd = std::env::current_dir()?;
        Ok(find_project_root(&cwd).unwrap_or(cwd))
    }
}

/// Expands the command-line paths into the TypeScript files to lint.
///
/// Directories are searched recursively; files are taken as given. The
/// result is sorted and free of duplicates.
pub fn collect_targets(paths: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk_dir(path, &mut files)?;
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file or directory: {}", path.display()),
            ));
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Discovers TypeScript sources under `dir` (recursive), sorted by path.
pub fn discover_source_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk_dir(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            let skipped = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| SKIPPED_DIRS.contains(&n));
            if !skipped {
                walk_dir(&path, files)?;
            }
        } else if is_lint_target(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// `.ts` files, excluding declaration files.
pub fn is_lint_target(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".ts") && !name.ends_with(".d.ts")
}

/// A file system that serves pending edits before falling back to `base`.
///
/// `ngl lint --fix` re-lints fixed text from the overlay, so nothing touches
/// the disk until every file has converged.
pub struct OverlayFileSystem<F> {
    base: F,
    edits: BTreeMap<PathBuf, String>,
}

impl<F: FileSystem> OverlayFileSystem<F> {
    /// Creates an overlay with no pending edits.
    pub fn new(base: F) -> Self {
        Self {
            base,
            edits: BTreeMap::new(),
        }
    }

    /// Records new content for `path`.
    pub fn set(&mut self, path: impl Into<PathBuf>, content: String) {
        self.edits.insert(path.into(), content);
    }

    /// Paths with pending edits, in order.
    pub fn edited(&self) -> impl Iterator<Item = &Path> {
        self.edits.keys().map(PathBuf::as_path)
    }

    /// Writes every pending edit to disk and returns how many files changed.
    pub fn write_back(self) -> io::Result<usize> {
        let count = self.edits.len();
        for (path, content) in self.edits {
            std::fs::write(&path, content)?;
            tracing::debug!(path = %path.display(), "wrote fixed file");
        }
        Ok(count)
    }
}

impl<F: FileSystem> FileSystem for OverlayFileSystem<F> {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        match self.edits.get(path) {
            Some(content) => Ok(content.clone()),
            None => self.base.read_to_string(path),
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        self.edits.contains_key(path) || self.base.is_file(path)
    }
}
