//! Sink error types.

use thiserror::Error;

use super::template::TemplateServiceError;

/// Errors raised while dispatching to a notification sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink configuration is unusable.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The delivery call itself failed.
    #[error("failed to deliver notification: {0}")]
    DeliveryFailed(String),

    /// The message template could not be rendered.
    #[error("template error: {0}")]
    Template(#[from] TemplateServiceError),

    /// An unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}
