//! Error types for the signage toolkit

use thiserror::Error;

/// Main error type for the signage toolkit
#[derive(Error, Debug)]
pub enum SignageError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file not found in {0}")]
    ConfigNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote side reports the resource as absent (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Empty files are temporarily disallowed by the remote store
    #[error("Empty file is not allowed: {path}")]
    EmptyFile { path: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File walk error: {0}")]
    Walk(#[from] ignore::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl SignageError {
    /// Whether the error is the "already absent" kind
    pub fn is_not_found(&self) -> bool {
        matches!(self, SignageError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, SignageError>;
