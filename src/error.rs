//! Error types for the relay handlers
//!
//! Every variant names the step that failed. Handlers return these unmodified
//! to the Lambda runtime, which reports them as the invocation error.

use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read configuration file {path}: {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path}: {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to get OpenAI API key: failed to retrieve secret {secret_name}: {reason}")]
    SecretRetrieval { secret_name: String, reason: String },

    #[error("failed to get OpenAI API key: secret {secret_name} has no string value")]
    SecretMissing { secret_name: String },

    #[error("failed to get OpenAI API key: failed to parse secret JSON for {secret_name}: {source}")]
    SecretMalformed {
        secret_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to get OpenAI API key: {field} not found in secret {secret_name}")]
    CredentialMissing { secret_name: String, field: String },

    #[error("failed to get ChatGPT response: failed to create chat completion with {model}: {reason}")]
    CompletionFailed { model: String, reason: String },

    #[error("failed to get ChatGPT response: no response choices returned by {model}")]
    NoChoices { model: String },

    #[error("Invalid event payload: {0}")]
    InvalidEvent(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
