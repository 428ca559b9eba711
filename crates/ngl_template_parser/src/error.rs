//! Error type for template parsing.

/// A fatal problem found while parsing a template.
///
/// Offsets are byte offsets into the template text, before relocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateParseError {
    /// A closing tag with no matching open element.
    #[error("unexpected closing tag `</{name}>` at offset {offset}")]
    UnexpectedClosingTag {
        /// The tag name.
        name: String,
        /// Offset of the `</`.
        offset: u32,
    },

    /// A comment, quoted value, tag or interpolation that runs to end of input.
    #[error("unterminated {what} at offset {offset}")]
    Unterminated {
        /// What was left open.
        what: &'static str,
        /// Offset where it started.
        offset: u32,
    },

    /// A control-flow block without its closing `}`.
    #[error("unclosed block `@{name}` at offset {offset}")]
    UnclosedBlock {
        /// The block name.
        name: String,
        /// Offset of the `@`.
        offset: u32,
    },

    /// A block that is malformed or in the wrong place.
    #[error("invalid block `@{name}` at offset {offset}: {message}")]
    InvalidBlock {
        /// The block name.
        name: String,
        /// What is wrong with it.
        message: String,
        /// Offset of the `@`.
        offset: u32,
    },

    /// A binding expression that does not parse.
    #[error("expression error at offset {offset}: {message}")]
    Expression {
        /// The parser message.
        message: String,
        /// Offset of the offending token.
        offset: u32,
    },
}

impl TemplateParseError {
    /// The byte offset the error points at.
    pub fn offset(&self) -> u32 {
        match self {
            TemplateParseError::UnexpectedClosingTag { offset, .. }
            | TemplateParseError::Unterminated { offset, .. }
            | TemplateParseError::UnclosedBlock { offset, .. }
            | TemplateParseError::InvalidBlock { offset, .. }
            | TemplateParseError::Expression { offset, .. } => *offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_closing_tag() {
        let err = TemplateParseError::UnexpectedClosingTag {
            name: "div".to_string(),
            offset: 12,
        };
        assert_eq!(format!("{err}"), "unexpected closing tag `</div>` at offset 12");
        assert_eq!(err.offset(), 12);
    }

    #[test]
    fn display_expression() {
        let err = TemplateParseError::Expression {
            message: "unexpected `)`".to_string(),
            offset: 3,
        };
        assert_eq!(format!("{err}"), "expression error at offset 3: unexpected `)`");
    }
}
