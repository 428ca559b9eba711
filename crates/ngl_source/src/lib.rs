//! Source file management, span tracking and file-system access for the linter.
//!
//! This crate provides the [`SourceDb`] holding every file a lint run touches
//! (component sources and external templates), [`FileId`] and [`Span`] for
//! source locations, [`ResolvedSpan`] for line/column display, and the
//! [`FileSystem`] read interface so template and declaration lookups can be
//! served from disk or from memory in tests.

#![warn(missing_docs)]

pub mod file_id;
pub mod fs;
pub mod resolved_span;
pub mod source_db;
pub mod source_file;
pub mod span;

pub use file_id::FileId;
pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use resolved_span::ResolvedSpan;
pub use source_db::SourceDb;
pub use source_file::SourceFile;
pub use span::Span;
