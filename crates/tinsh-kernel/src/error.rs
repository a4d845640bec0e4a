//! Error taxonomy for evaluation.
//!
//! Fatal errors abort the whole evaluation and only surface at
//! [`Kernel::execute_bash`](crate::Kernel::execute_bash) as an [`ErrorReport`].
//! `CommandNotFound` and `InvalidAssignment` are local: the evaluator turns
//! them into a failing return code and keeps going.

use serde::Serialize;
use thiserror::Error;

use crate::parser::ParseError;

/// Result type for evaluation.
pub type ShellResult<T> = Result<T, ShellError>;

/// Errors raised while evaluating a tree.
#[derive(Debug, Clone, Error)]
pub enum ShellError {
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
    #[error("invalid assignment: {0}")]
    InvalidAssignment(String),
    #[error("command not found: {0}")]
    CommandNotFound(String),
    #[error("unknown expansion type: {0}")]
    UnknownExpansionType(String),
    #[error("invalid/unsupported syntax")]
    Parse(#[from] ParseError),
    #[error("protocol violation: unexpected root {0}")]
    ProtocolViolation(String),
}

impl ShellError {
    /// Whether this error aborts the evaluation.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ShellError::InvalidAssignment(_) | ShellError::CommandNotFound(_)
        )
    }

    /// The user-visible message, newline-terminated.
    pub fn message(&self) -> String {
        format!("{self}\n")
    }
}

/// What the top-level entry point reports instead of output.
///
/// Serializes as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub error: String,
}

impl ErrorReport {
    /// Render as a JSON object.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"error\":{:?}}}", self.error))
    }
}

impl From<&ShellError> for ErrorReport {
    fn from(err: &ShellError) -> Self {
        Self {
            error: err.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_hides_details() {
        let err = ShellError::Parse(ParseError::UnexpectedEof);
        assert_eq!(err.message(), "invalid/unsupported syntax\n");
    }

    #[test]
    fn fatal_classes() {
        assert!(ShellError::UnsupportedFeature("redirection".into()).is_fatal());
        assert!(ShellError::UnknownExpansionType("arithmetic".into()).is_fatal());
        assert!(ShellError::ProtocolViolation("Function".into()).is_fatal());
        assert!(!ShellError::CommandNotFound("x".into()).is_fatal());
        assert!(!ShellError::InvalidAssignment("x".into()).is_fatal());
    }

    #[test]
    fn command_not_found_text() {
        let err = ShellError::CommandNotFound("doesnotexist".into());
        assert_eq!(err.message(), "command not found: doesnotexist\n");
    }

    #[test]
    fn report_serializes_as_error_object() {
        let report = ErrorReport::from(&ShellError::UnsupportedFeature("background execution".into()));
        let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(json["error"], "unsupported feature: background execution\n");
    }
}
