//! Notification sinks.
//!
//! Each routing destination is a [`NotificationSink`] (webhook channels,
//! stdout for development) or the [`SmsGateway`]. Sinks own their message
//! templates and retry policies; the router only decides *where* an alert
//! goes.

pub mod error;
pub mod sms;
pub mod stdout;
pub mod template;
mod traits;
pub mod webhook;

pub use error::SinkError;
pub use sms::HttpSmsGateway;
pub use stdout::StdoutSink;
pub use template::TemplateService;
pub use traits::{NotificationSink, SmsGateway};
pub use webhook::WebhookSink;

#[cfg(test)]
pub use traits::{MockNotificationSink, MockSmsGateway};

use serde_json::json;

use crate::models::{AlertCandidate, Severity};

/// Builds the template render context for an alert.
///
/// The alert serializes with absent optional fields. The fields templates
/// commonly interpolate are therefore also materialized at the top level
/// with defaults, which keeps strict undefined handling on without making
/// every template guard itself.
pub(crate) fn render_context(alert: &AlertCandidate, severity: Severity) -> serde_json::Value {
    json!({
        "alert": alert,
        "severity": severity,
        "escalated": severity == Severity::Critical,
        "usd_value": alert.usd_value.unwrap_or(0.0),
        "text": alert.text.clone().unwrap_or_default(),
        "signature": alert.signature.clone().unwrap_or_default(),
        "source_id": alert.source_id,
    })
}
