//! Diagnostic creation, severity management, fix application and rendering.
//!
//! This crate provides structured [`Diagnostic`] messages carrying a stable
//! message id and interpolated data, the thread-safe [`DiagnosticSink`] that
//! rules report into, [`SuggestedFix`] text edits together with the
//! [`apply_fixes`] protocol that applies them without overlap, and
//! [`DiagnosticRenderer`] implementations for terminal and JSON output.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod fixer;
pub mod label;
pub mod renderer;
pub mod severity;
pub mod sink;
pub mod suggested_fix;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use fixer::{apply_fixes, FixOutcome};
pub use label::{Label, LabelStyle};
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
pub use suggested_fix::{Replacement, SuggestedFix};
