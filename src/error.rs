use std::fmt;

use thiserror::Error;

/// Failures produced while turning a passage into a [`StudyRecord`](crate::models::StudyRecord).
#[derive(Debug, Error)]
pub enum StudyError {
    /// No usable API credential. Not retryable without operator action.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network failure, non-success HTTP status, or timeout.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Model returned no response text")]
    EmptyResponse,

    /// Text came back but is not syntactically valid JSON.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Parses, but a required field is missing, mistyped, or outside its enumeration.
    #[error("Schema violation at {path}: {reason}")]
    SchemaViolation { path: String, reason: String },

    /// A configuration value is present but unusable (e.g. the HTTP client cannot be built).
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl StudyError {
    pub fn schema_violation(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StudyError::Configuration(_) | StudyError::Config(_) => ErrorKind::Configuration,
            StudyError::Transport(_) => ErrorKind::Transport,
            StudyError::EmptyResponse => ErrorKind::EmptyResponse,
            StudyError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            StudyError::SchemaViolation { .. } => ErrorKind::SchemaViolation,
        }
    }
}

/// Diagnostic tag for a [`StudyError`], kept in session state instead of the error itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Transport,
    EmptyResponse,
    MalformedResponse,
    SchemaViolation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Transport => "transport",
            ErrorKind::EmptyResponse => "empty_response",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::SchemaViolation => "schema_violation",
        };
        f.write_str(name)
    }
}

pub type Result<T> = std::result::Result<T, StudyError>;
