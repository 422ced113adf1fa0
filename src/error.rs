use thiserror::Error;

/// The primary error type of the client core.
///
/// Failures of server calls never travel past the API gateway; they are logged there and
/// turned into a toast. This type is what the layers below the gateway (and the settings
/// storage) report upwards.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or the connection dropped.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The (possibly truncated) response body.
        body: String,
    },
    /// The response body was not the expected JSON.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    /// User input was rejected before any request was sent.
    #[error("Validation error on field '{field}': {message}")]
    Validation {
        /// The name of the field that failed validation.
        field: String,
        /// A message describing the validation error.
        message: String,
    },
    /// Reading or writing persisted settings failed.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),
    /// The owning context has been torn down.
    #[error("Context closed")]
    Closed,
}

impl ClientError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        ClientError::Validation { field: field.to_string(), message: message.into() }
    }

    /// Failures worth retrying when they happen on the push stream.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Network(_) => true,
            ClientError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// A type alias for `Result<T, ClientError>`, used throughout the crate.
pub type ClientResult<T> = Result<T, ClientError>;

/// Helpers for checking user input before a request is built.
pub mod validation {
    use super::*;

    /// Rejects empty or whitespace-only values; `message` is what the user gets to see.
    pub fn require_non_empty(value: &str, field: &str, message: &str) -> ClientResult<()> {
        if value.trim().is_empty() {
            return Err(ClientError::validation(field, message));
        }
        Ok(())
    }

    /// Rejects values carrying NUL characters, which the server cannot store as file names.
    pub fn reject_nul(value: &str, field: &str) -> ClientResult<()> {
        if value.contains('\0') {
            return Err(ClientError::validation(field, "contains null characters"));
        }
        Ok(())
    }
}
