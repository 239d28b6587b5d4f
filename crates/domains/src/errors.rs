//! # DomainError
//!
//! Centralized error type returned by every port.
//! Services convert these into result values before they reach a caller.

use thiserror::Error;

/// The primary error type for port operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Persistent key-value store failure (read, write, or remove)
    #[error("storage error: {0}")]
    Storage(String),

    /// A stored or received document could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Remote endpoint answered with a non-2xx status
    #[error("remote returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// Remote endpoint rejected the credentials (HTTP 401)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Connection-level failure before a response was received
    #[error("network error: {0}")]
    Network(String),

    /// Request exceeded its configured deadline
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Input rejected before any I/O happened
    #[error("validation error: {0}")]
    Validation(String),

    /// Adapter misconfiguration (e.g., malformed base URL)
    #[error("configuration error: {0}")]
    Config(String),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// True for failures that should route a search to the local cache.
    pub fn is_remote_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Remote { .. }
                | Self::Unauthorized(_)
                | Self::Network(_)
                | Self::Timeout(_)
                | Self::Serialization(_)
        )
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// A specialized Result type for port operations.
pub type Result<T> = std::result::Result<T, DomainError>;
