//! Error types for termcoder core

use thiserror::Error;

/// Result type alias using the core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Error calling model: {0}")]
    Provider(String),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Tool-specific errors
///
/// The `Display` text of each variant is what the model sees in the
/// `error` field of a failed tool result.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// Recoverable validation failure with a message meant for the model
    #[error("{0}")]
    Validation(String),

    #[error("Command timed out ({0}s limit)")]
    Timeout(u64),

    #[error("{0}")]
    ExecutionFailed(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
