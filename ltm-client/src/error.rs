//! Error types for the `ltm-client` crate.

use thiserror::Error;

use crate::validation::ValidationErrorItem;

/// Errors that can occur when talking to the long-term memory service.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// The service could not be reached: timeout, refused connection, or a
    /// transport failure while reading the response.
    #[error("Memory backend unavailable: {message}")]
    BackendUnavailable {
        /// A description of the failure.
        message: String,
    },

    /// The service rejected the request with a field-level validation document.
    #[error("Memory backend rejected the request ({status}): {}", describe(.detail))]
    ValidationRejected {
        /// HTTP status code (normally 422).
        status: u16,
        /// The validation errors as reported by the service.
        detail: Vec<ValidationErrorItem>,
    },

    /// Any other non-success status, or a body that could not be decoded.
    #[error("Unexpected memory backend response ({status}): {body}")]
    UnexpectedBackendResponse {
        /// HTTP status code.
        status: u16,
        /// The raw response body.
        body: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A request body could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MemoryError {
    /// Whether repeating the same call could succeed.
    ///
    /// Only transport failures qualify; the service answering with an error
    /// will answer the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MemoryError::BackendUnavailable { .. })
    }
}

fn describe(detail: &[ValidationErrorItem]) -> String {
    if detail.is_empty() {
        return "no detail".to_string();
    }
    detail.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// A convenience result type for memory client operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
