//! Error types for doctools.

use std::borrow::Cow;

/// Errors that can occur while compiling, registering or calling tools.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Malformed documentation for '{function}': {reason}")]
    MalformedDocumentation {
        function: String,
        reason: DocumentationFault,
    },

    #[error("Tool function '{name}' not found")]
    FunctionNotFound { name: Cow<'static, str> },

    #[error("Tool function '{name}' is already registered")]
    AlreadyRegistered { name: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] DeserializationError),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl ToolError {
    pub(crate) fn malformed(function: &str, reason: DocumentationFault) -> Self {
        ToolError::MalformedDocumentation {
            function: function.to_owned(),
            reason,
        }
    }
}

/// What exactly is wrong with a documentation block.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentationFault {
    #[error("documentation is missing or empty")]
    Empty,

    /// `line` is 1-based within the trimmed documentation block.
    #[error("line {line}: parameter marker needs `:param <name>: <type>: <description>`, got `{text}`")]
    MarkerSegments { line: usize, text: String },

    #[error("line {line}: parameter marker has no parameter name: `{text}`")]
    MissingParameterName { line: usize, text: String },
}

/// Specific deserialization errors
#[derive(Debug, thiserror::Error)]
#[error("Failed to deserialize JSON: {source}")]
pub struct DeserializationError {
    #[source]
    pub source: serde_json::Error,
}

impl From<serde_json::Error> for DeserializationError {
    fn from(err: serde_json::Error) -> Self {
        DeserializationError { source: err }
    }
}
