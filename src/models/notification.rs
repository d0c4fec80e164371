//! Notification message templates and severity levels.

use serde::{Deserialize, Serialize};

/// A title/body template pair for a notification channel.
///
/// Both fields are minijinja templates rendered against the serialized
/// alert candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// Template for the notification title.
    pub title: String,

    /// Template for the notification body.
    pub body: String,
}

/// Visual severity of a dispatched notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine activity.
    Info,
    /// Escalated activity, e.g. a transfer above the SMS threshold.
    Critical,
}

impl Severity {
    /// The embed accent colour used by webhook channel payloads.
    pub fn embed_color(self) -> u32 {
        match self {
            Severity::Info => 0x3498DB,
            Severity::Critical => 0xE74C3C,
        }
    }
}
