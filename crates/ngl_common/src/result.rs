//! Common result and error types for the ngl toolchain.

/// The result type for fallible internal operations.
///
/// `Err` means an invariant inside ngl was broken (a bug), not that the
/// linted project is wrong. Problems in user sources are reported through the
/// diagnostic sink and the operation still returns `Ok`.
pub type NglResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in ngl rather than in the linted code.
#[derive(Debug, thiserror::Error)]
#[error("internal linter error: {message}")]
pub struct InternalError {
    /// Description of the broken invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
