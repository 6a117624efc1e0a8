//! Error Handling Module
//!
//! This module provides the crate-wide error type for key validation,
//! including retryability classification used by the fixed-delay retry
//! executor.
//!
//! Failures never cross the orchestrator boundary as errors: the wrapper
//! layer converts every `KeyCheckError` into a failure-shaped
//! [`ValidationResult`](crate::types::ValidationResult). The error type exists
//! for the layers underneath (adapters, cache, governor, queue).

use thiserror::Error;

use crate::types::Provider;

/// Errors that can occur while identifying or validating an API key.
#[derive(Error, Debug, Clone)]
pub enum KeyCheckError {
    /// The input string matched no known provider pattern.
    #[error("Unable to identify key provider")]
    UnidentifiedKey,

    /// A provider was identified but no validator is registered for it.
    #[error("No validator available for provider: {0}")]
    ProviderNotRegistered(Provider),

    /// HTTP transport error (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The provider answered with a non-success status code.
    #[error("API error {code}: {message}")]
    ApiError {
        /// HTTP status code
        code: u16,
        /// Provider-supplied or synthesized message
        message: String,
    },

    /// The provider signalled throttling (HTTP 429).
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The provider's response body could not be parsed.
    #[error("JSON parse error: {0}")]
    JsonError(String),

    /// The validation did not complete within the configured timeout.
    #[error("Validation timed out after {0} seconds")]
    Timeout(u64),

    /// The caller cancelled the validation.
    #[error("Validation cancelled")]
    Cancelled,

    /// Invalid settings or registry wiring detected at startup.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Catch-all for defects that should not happen.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl KeyCheckError {
    /// Whether a retry with the same input may succeed.
    ///
    /// Only throttling and transient transport/server failures qualify;
    /// rejected credentials and local errors are terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited(_) => true,
            Self::HttpError(_) => true,
            Self::ApiError { code, .. } => matches!(code, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Convenience constructor for API errors.
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for KeyCheckError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::HttpError(format!("request timed out: {err}"))
        } else if err.is_decode() {
            Self::JsonError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for KeyCheckError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(KeyCheckError::RateLimited("429".into()).is_retryable());
        assert!(KeyCheckError::api_error(503, "unavailable").is_retryable());
        assert!(!KeyCheckError::api_error(401, "bad key").is_retryable());
        assert!(!KeyCheckError::UnidentifiedKey.is_retryable());
        assert!(!KeyCheckError::Cancelled.is_retryable());
    }
}
