//! Error types for declaration mining.

use std::path::PathBuf;

/// A failure to read or interpret a declaration file.
///
/// The oracle never propagates these to rules: a failed build logs the error
/// and answers every lookup as unknown.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The declaration file could not be read.
    #[error("failed to read declaration file {path}: {source}")]
    Read {
        /// The path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The components declaration file has no `namespace Components`.
    #[error("no `namespace Components` found in {path}")]
    MissingNamespace {
        /// The declaration file path.
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path() {
        let err = OracleError::MissingNamespace {
            path: PathBuf::from("dist/types/components.d.ts"),
        };
        assert!(err.to_string().contains("components.d.ts"));
    }
}
