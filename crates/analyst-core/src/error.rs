//! Error Types

use thiserror::Error;

/// Result type alias for orchestration operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Orchestration error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// A single oracle call failed (may be retried on the next chain entry)
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// Every oracle in the fallback chain failed
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// An oracle returned a value outside the declared option set
    #[error("Oracle protocol violation: {value:?} not in {options:?}")]
    OracleProtocolViolation { value: String, options: Vec<String> },

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool validation failed
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Parse error (e.g. structured oracle output)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Session error
    #[error("Session error: {0}")]
    Session(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Whether the next oracle in a fallback chain should be tried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AgentError::Oracle(_) | AgentError::Parse(_) | AgentError::Io(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Oracle(msg) => format!("The language model encountered an error: {}", msg),
            AgentError::OracleUnavailable(_) => {
                "No language model is currently available. Please try again.".into()
            }
            AgentError::OracleProtocolViolation { .. } => {
                "The language model returned an unexpected routing decision.".into()
            }
            AgentError::ToolNotFound(name) => format!("The tool '{}' is not available.", name),
            AgentError::ToolValidation(msg) => format!("Invalid tool input: {}", msg),
            AgentError::ToolExecution(msg) => format!("Tool error: {}", msg),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        AgentError::Other(err.to_string())
    }
}
