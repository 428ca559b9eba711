//! Errors raised while configuring the lint engine.

use thiserror::Error;

/// A rule could not be set up from the lint configuration.
///
/// Unlike problems in linted files, these abort the run before any file is
/// checked.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleSetupError {
    /// A rule option table is present but lacks a mandatory option.
    #[error("rule `{rule}` requires the `{option}` option")]
    MissingOption {
        /// The rule name.
        rule: &'static str,
        /// The missing option.
        option: &'static str,
    },

    /// A deny/allow/warn list names a rule that does not exist.
    #[error("unknown lint rule `{0}`")]
    UnknownRule(String),
}
