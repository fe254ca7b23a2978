//! Error Handling
//!
//! Unified error types for the application layer.
//! Uses thiserror for ergonomic error definitions.

use form_copilot_core::CoreError;
use form_copilot_llm::LlmError;
use thiserror::Error;

use crate::services::intake::IntakeError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Collaborator setup errors (client construction, credentials)
    #[error("Collaborator error: {0}")]
    Llm(#[from] LlmError),

    /// Domain errors bubbled up from the core crate
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Session misuse or corruption surfaced by the intake engine
    #[error("Intake error: {0}")]
    Intake(#[from] IntakeError),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
