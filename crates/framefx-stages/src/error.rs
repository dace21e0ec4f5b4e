//! Error types for stage construction and chain parsing

use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors produced while building stages from names and parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No stage is registered under this name
    #[error("Unknown stage '{0}'")]
    UnknownStage(String),

    /// A parameter is missing, extra, or out of range
    #[error("Invalid parameter for stage '{stage}': {reason}")]
    InvalidParameter { stage: String, reason: String },

    /// The stage list names no stages
    #[error("Stage list is empty")]
    EmptyList,
}

impl RegistryError {
    /// Create a parameter error for a named stage
    pub fn invalid(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            stage: stage.into(),
            reason: reason.into(),
        }
    }
}
