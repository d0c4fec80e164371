//! Sink trait seams.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::error::SinkError;
use crate::models::{AlertCandidate, Severity};

/// A destination for routed alerts.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers one alert to the sink.
    async fn deliver(&self, alert: &AlertCandidate, severity: Severity) -> Result<(), SinkError>;

    /// The sink's display name, used in dispatch logs.
    fn name(&self) -> String;
}

/// A gateway for per-recipient SMS dispatch.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Sends one text about the alert to the given phone number.
    async fn send(
        &self,
        to: &str,
        alert: &AlertCandidate,
        severity: Severity,
    ) -> Result<(), SinkError>;
}
