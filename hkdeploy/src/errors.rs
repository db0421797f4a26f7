//! Error types for the deployment helper

use thiserror::Error;

/// Main error type for the deployment helper
#[derive(Error, Debug)]
pub enum HelperError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Platform API error: {0}")]
    ApiError(String),

    #[error("Git error: {0}")]
    GitError(String),

    #[error("Log stream error: {0}")]
    StreamError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for HelperError {
    fn from(err: anyhow::Error) -> Self {
        HelperError::Internal(err.to_string())
    }
}
