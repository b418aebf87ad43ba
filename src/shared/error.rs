//! Shared Error Types
//!
//! Errors raised while encoding or decoding the records the service keeps
//! in its state store (sync state, track snapshot, error log, tokens).
//!
//! # Usage
//!
//! ```rust
//! use tracksync::shared::error::SharedError;
//!
//! let error = SharedError::serialization("record is not an object");
//! ```
use thiserror::Error;

/// Record encoding and decoding errors
#[derive(Debug, Error, Clone)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
