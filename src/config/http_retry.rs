//! Retry policy configuration for outbound HTTP clients (sink webhooks,
//! provider lookups, the SMS gateway).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{deserialize_duration_from_ms, deserialize_duration_from_secs};

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff() -> Duration {
    Duration::from_millis(250)
}

fn default_max_backoff() -> Duration {
    Duration::from_secs(10)
}

fn default_backoff_base() -> u32 {
    2
}

/// Jitter applied to the exponential backoff schedule.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JitterSetting {
    /// Deterministic backoff.
    None,
    /// Randomize each backoff up to its full length.
    #[default]
    Full,
}

/// Retry policy for transient HTTP failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HttpRetryConfig {
    /// Maximum number of retries for transient errors.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Exponent base for the backoff schedule.
    #[serde(default = "default_backoff_base")]
    pub backoff_base: u32,

    /// Backoff before the first retry.
    #[serde(
        default = "default_initial_backoff",
        deserialize_with = "deserialize_duration_from_ms"
    )]
    pub initial_backoff_ms: Duration,

    /// Upper bound on any single backoff.
    #[serde(
        default = "default_max_backoff",
        deserialize_with = "deserialize_duration_from_secs"
    )]
    pub max_backoff_secs: Duration,

    /// Jitter mode.
    #[serde(default)]
    pub jitter: JitterSetting,
}

impl Default for HttpRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_base: default_backoff_base(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
            jitter: JitterSetting::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_yaml_with_defaults() {
        let yaml = "max_retries: 5";
        let config: HttpRetryConfig = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.max_retries, 5);
        assert_eq!(config.initial_backoff_ms, Duration::from_millis(250));
        assert_eq!(config.jitter, JitterSetting::Full);
    }
}
