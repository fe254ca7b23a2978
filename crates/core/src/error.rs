//! Core Error Types
//!
//! Defines the foundational error types used across the Form Copilot workspace.
//! These error types are dependency-free (only thiserror + std) to keep the core
//! crate lightweight.
//!
//! The application crate extends these with variants for configuration files,
//! the collaborator and session misuse.

use thiserror::Error;

/// Core error type for the Form Copilot workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown field or phase names
    #[error("Unknown {kind}: {value}")]
    Unknown { kind: &'static str, value: String },

    /// Attempted mutation of a sealed (submitted) form
    #[error("Form is sealed: {0}")]
    Sealed(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an unknown-name error
    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        Self::Unknown {
            kind,
            value: value.into(),
        }
    }

    /// Create a sealed-form error
    pub fn sealed(msg: impl Into<String>) -> Self {
        Self::Sealed(msg.into())
    }
}

impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
