//! The provider error type and its rate-limit classification.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// A failure returned by a wrapped provider operation.
///
/// Providers signal HTTP 429 in several shapes: a direct status code, a
/// nested response status, a provider-specific error code, or only a
/// message substring. The error carries all of them and
/// [`is_rate_limited`](Self::is_rate_limited) checks each in turn.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderError {
    /// Human-readable failure description.
    pub message: String,

    /// Direct HTTP status of the failed call, when known.
    pub status: Option<u16>,

    /// Status of a nested provider response, when the failure wraps one.
    pub response_status: Option<u16>,

    /// Provider-specific numeric error code, when supplied.
    pub error_code: Option<i64>,

    /// Provider-supplied quota reset time, when the response carried one.
    pub retry_after: Option<DateTime<Utc>>,
}

impl ProviderError {
    /// Creates an error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            response_status: None,
            error_code: None,
            retry_after: None,
        }
    }

    /// Attaches the direct HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches a nested response status.
    pub fn with_response_status(mut self, status: u16) -> Self {
        self.response_status = Some(status);
        self
    }

    /// Attaches a provider-specific error code.
    pub fn with_error_code(mut self, code: i64) -> Self {
        self.error_code = Some(code);
        self
    }

    /// Attaches a provider-supplied quota reset time.
    pub fn with_retry_after(mut self, at: DateTime<Utc>) -> Self {
        self.retry_after = Some(at);
        self
    }

    /// Whether this failure is a rate-limit condition.
    ///
    /// True when any status shape carries 429, or the message contains
    /// "rate limit" (case-insensitive).
    pub fn is_rate_limited(&self) -> bool {
        self.status == Some(429)
            || self.response_status == Some(429)
            || self.error_code == Some(429)
            || self.message.to_ascii_lowercase().contains("rate limit")
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        let status = error.status().map(|s| s.as_u16());
        let mut converted = ProviderError::new(error.to_string());
        if let Some(status) = status {
            converted = converted.with_status(status);
        }
        converted
    }
}

impl From<reqwest_middleware::Error> for ProviderError {
    fn from(error: reqwest_middleware::Error) -> Self {
        match error {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            reqwest_middleware::Error::Middleware(e) => ProviderError::new(e.to_string()),
        }
    }
}
