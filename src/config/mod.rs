//! Configuration module for Vigil.

mod app_config;
mod channels;
mod http_retry;
mod quota;
mod sources;

pub use app_config::{AppConfig, ProvidersConfig, ServerConfig, SmsGatewayConfig};
pub use channels::{ChannelConfig, ChannelRole, ChannelValidationError, ChannelsConfig};
pub use http_retry::{HttpRetryConfig, JitterSetting};
pub use quota::{BatchPacingConfig, EndpointQuotaConfig, QuotaValidationError, SchedulerConfig};
pub use sources::SourcesConfig;

use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Deserializes a `Duration` from an integer number of milliseconds.
pub(crate) fn deserialize_duration_from_ms<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let ms = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(ms))
}

/// Deserializes a `Duration` from an integer number of seconds.
pub(crate) fn deserialize_duration_from_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    Ok(Duration::from_secs(secs))
}
