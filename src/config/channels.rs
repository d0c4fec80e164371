//! Channel sink configuration loading.

use std::path::Path;

use config::{Config, ConfigError, File};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::HttpRetryConfig;
use crate::models::NotificationMessage;

/// The routing role a channel sink fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelRole {
    /// Receives alerts from priority-flagged social accounts.
    Priority,
    /// Receives alerts confirmed to reference a known token.
    Topic,
    /// Receives every social alert, unconditionally.
    Firehose,
    /// Receives every transaction alert.
    WalletActivity,
}

/// Configuration for one webhook channel sink.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Channel name, used in logs.
    pub name: String,

    /// The routing role this channel fills.
    pub role: ChannelRole,

    /// Webhook delivery URL. When omitted the channel prints to standard
    /// output instead (development only).
    #[serde(default)]
    pub url: Option<Url>,

    /// Message templates for this channel.
    #[serde(default)]
    pub message: NotificationMessage,

    /// Optional HMAC signing secret for the payload.
    #[serde(default)]
    pub secret: Option<String>,

    /// Retry policy for deliveries to this channel.
    #[serde(default)]
    pub retry_policy: HttpRetryConfig,
}

/// Errors raised while validating the channel configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelValidationError {
    /// A required routing role has no channel.
    #[error("no channel configured for role {0:?}")]
    MissingRole(ChannelRole),

    /// Two channels claim the same routing role.
    #[error("duplicate channel for role {0:?}")]
    DuplicateRole(ChannelRole),
}

/// The full set of configured channel sinks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelsConfig {
    /// All configured channels.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl ChannelsConfig {
    /// Loads and validates the channel configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let s = Config::builder().add_source(File::from(path)).build()?;
        let config: Self = s.try_deserialize()?;
        config.validate().map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(config)
    }

    /// Ensures every routing role is filled exactly once.
    pub fn validate(&self) -> Result<(), ChannelValidationError> {
        use ChannelRole::*;
        for role in [Priority, Topic, Firehose, WalletActivity] {
            match self.channels.iter().filter(|c| c.role == role).count() {
                0 => return Err(ChannelValidationError::MissingRole(role)),
                1 => {}
                _ => return Err(ChannelValidationError::DuplicateRole(role)),
            }
        }
        Ok(())
    }

    /// Returns the channel filling the given role.
    pub fn channel(&self, role: ChannelRole) -> Option<&ChannelConfig> {
        self.channels.iter().find(|c| c.role == role)
    }
}
