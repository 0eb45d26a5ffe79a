//! Error types for authenticated request handling.
//!
//! Ordinary HTTP error statuses are never errors here — they come back as
//! [`ApiResponse`](crate::ApiResponse) values for the caller to interpret.
//! Only transport failures and integration mistakes surface as `Err`.

use thiserror::Error;

/// Error type for the authenticated request path.
#[derive(Debug, Error)]
pub enum AuthError {
    /// An authenticated operation was attempted before a session was
    /// attached. This is an integration bug in the caller, not retryable.
    #[error("no session attached to the gateway")]
    NotInitialized,

    /// Network or transport-level HTTP error from reqwest.
    ///
    /// Includes connection failures, timeouts, and TLS errors.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport-level failure reported by a non-reqwest executor.
    #[error("network error: {0}")]
    Network(String),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error (invalid base URL, bad endpoint path).
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience Result type alias for gateway operations.
pub type AuthResult<T> = Result<T, AuthError>;
