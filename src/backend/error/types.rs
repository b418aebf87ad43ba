/**
 * Backend Error Types
 *
 * Errors returned by HTTP handlers. Each variant maps to an HTTP status
 * and is rendered as JSON by the `conversion` module.
 *
 * # Status Mapping
 *
 * - `HandlerError` - the status it carries (401 for a bad cron secret)
 * - `StorageError` - 503, the state store is unreachable or corrupt
 */

use crate::backend::store::StoreError;
use axum::http::StatusCode;
use thiserror::Error;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use tracksync::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::UNAUTHORIZED, "Unauthorized");
/// assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Request-level failure with an explicit status
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// The state store failed; the tick (if any) persisted nothing
    #[error("Storage error: {0}")]
    StorageError(#[from] StoreError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// 401 for a missing or wrong cron secret
    pub fn unauthorized() -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::StorageError(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::StorageError(err) => format!("State store unavailable: {}", err),
        }
    }
}
