//! Quota and pacing configuration for the request scheduler.

use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

use super::deserialize_duration_from_ms;

fn default_safety_margin() -> f64 {
    0.9
}

fn default_batch_min_interval() -> Duration {
    Duration::from_millis(2_000)
}

fn default_batch_max_retries() -> u32 {
    3
}

fn default_batch_retry_delay() -> Duration {
    Duration::from_millis(5_000)
}

/// Quota policy for one logical class of external operation.
///
/// Loaded once at startup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EndpointQuotaConfig {
    /// Number of requests the provider allows per window.
    pub requests_per_window: u32,

    /// Length of the provider's accounting window, in minutes. Fractional
    /// values are accepted (e.g. `0.25` for a 15-second window).
    pub window_size_minutes: f64,
}

impl EndpointQuotaConfig {
    /// The window length as a `Duration`.
    pub fn window_size(&self) -> Duration {
        Duration::from_secs_f64(self.window_size_minutes * 60.0)
    }

    /// The number of requests actually begun per window, after the safety
    /// margin is applied: `floor(requests_per_window × margin)`.
    pub fn safe_limit(&self, safety_margin: f64) -> u32 {
        (f64::from(self.requests_per_window) * safety_margin).floor() as u32
    }
}

/// Pacing and retry policy applied to batch-class endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchPacingConfig {
    /// Minimum gap between consecutive batch-class calls, shared globally
    /// across all batch endpoints.
    #[serde(
        default = "default_batch_min_interval",
        deserialize_with = "deserialize_duration_from_ms"
    )]
    pub min_interval_ms: Duration,

    /// Maximum number of retries after classified rate-limit failures.
    #[serde(default = "default_batch_max_retries")]
    pub max_retries: u32,

    /// Fixed pause between retry attempts.
    #[serde(
        default = "default_batch_retry_delay",
        deserialize_with = "deserialize_duration_from_ms"
    )]
    pub retry_delay_ms: Duration,
}

impl Default for BatchPacingConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_batch_min_interval(),
            max_retries: default_batch_max_retries(),
            retry_delay_ms: default_batch_retry_delay(),
        }
    }
}

/// The full scheduler configuration: the per-endpoint quota table, the
/// global safety margin and the batch pacing policy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchedulerConfig {
    /// Quota table, keyed by endpoint name.
    #[serde(default)]
    pub endpoints: HashMap<String, EndpointQuotaConfig>,

    /// Fraction of each provider quota the scheduler is willing to spend.
    /// Must lie within `(0, 1]`.
    #[serde(default = "default_safety_margin")]
    pub safety_margin: f64,

    /// Pacing policy for batch-class endpoints.
    #[serde(default)]
    pub batch: BatchPacingConfig,

    /// Endpoint names subject to the batch pacing policy. Every entry must
    /// also appear in the quota table.
    #[serde(default)]
    pub batch_endpoints: HashSet<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            endpoints: HashMap::new(),
            safety_margin: default_safety_margin(),
            batch: BatchPacingConfig::default(),
            batch_endpoints: HashSet::new(),
        }
    }
}

/// Errors raised by [`SchedulerConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum QuotaValidationError {
    /// The safety margin lies outside `(0, 1]`.
    #[error("safety_margin must be within (0, 1], got {0}")]
    SafetyMargin(f64),

    /// An endpoint declared a zero request budget.
    #[error("endpoint '{0}': requests_per_window must be positive")]
    ZeroRequests(String),

    /// An endpoint declared a non-positive window length.
    #[error("endpoint '{0}': window_size_minutes must be positive and finite")]
    InvalidWindow(String),

    /// The margin rounds an endpoint's usable budget down to zero, which
    /// would block every caller forever.
    #[error("endpoint '{0}': safe limit rounds down to zero; raise requests_per_window or safety_margin")]
    UnusableLimit(String),

    /// A batch endpoint has no quota entry.
    #[error("batch endpoint '{0}' has no entry in the quota table")]
    UnknownBatchEndpoint(String),
}

impl SchedulerConfig {
    /// Validates the quota table. Called once at startup; the scheduler
    /// assumes a validated configuration.
    pub fn validate(&self) -> Result<(), QuotaValidationError> {
        if !(self.safety_margin > 0.0 && self.safety_margin <= 1.0) {
            return Err(QuotaValidationError::SafetyMargin(self.safety_margin));
        }

        for (name, quota) in &self.endpoints {
            if quota.requests_per_window == 0 {
                return Err(QuotaValidationError::ZeroRequests(name.clone()));
            }
            if !(quota.window_size_minutes > 0.0 && quota.window_size_minutes.is_finite()) {
                return Err(QuotaValidationError::InvalidWindow(name.clone()));
            }
            if quota.safe_limit(self.safety_margin) == 0 {
                return Err(QuotaValidationError::UnusableLimit(name.clone()));
            }
        }

        for name in &self.batch_endpoints {
            if !self.endpoints.contains_key(name) {
                return Err(QuotaValidationError::UnknownBatchEndpoint(name.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quota(requests: u32, minutes: f64) -> EndpointQuotaConfig {
        EndpointQuotaConfig { requests_per_window: requests, window_size_minutes: minutes }
    }

    #[test]
    fn safe_limit_floors() {
        assert_eq!(quota(10, 1.0).safe_limit(0.9), 9);
        assert_eq!(quota(10, 1.0).safe_limit(0.5), 5);
        assert_eq!(quota(7, 1.0).safe_limit(0.9), 6);
        assert_eq!(quota(1, 1.0).safe_limit(1.0), 1);
    }

    #[test]
    fn fractional_window_sizes_are_supported() {
        assert_eq!(quota(10, 0.25).window_size(), Duration::from_secs(15));
        assert_eq!(quota(10, 15.0).window_size(), Duration::from_secs(900));
    }

    #[test]
    fn validate_rejects_bad_margin() {
        let mut config = SchedulerConfig::default();
        config.safety_margin = 0.0;
        assert_eq!(config.validate(), Err(QuotaValidationError::SafetyMargin(0.0)));

        config.safety_margin = 1.5;
        assert_eq!(config.validate(), Err(QuotaValidationError::SafetyMargin(1.5)));
    }

    #[test]
    fn validate_rejects_unusable_limit() {
        let mut config = SchedulerConfig::default();
        config.safety_margin = 0.5;
        config.endpoints.insert("search".into(), quota(1, 1.0));

        assert_eq!(
            config.validate(),
            Err(QuotaValidationError::UnusableLimit("search".into()))
        );
    }

    #[test]
    fn validate_rejects_unknown_batch_endpoint() {
        let mut config = SchedulerConfig::default();
        config.endpoints.insert("search".into(), quota(10, 1.0));
        config.batch_endpoints.insert("timeline".into());

        assert_eq!(
            config.validate(),
            Err(QuotaValidationError::UnknownBatchEndpoint("timeline".into()))
        );
    }

    #[test]
    fn default_config_is_valid() {
        assert!(SchedulerConfig::default().validate().is_ok());
    }

    #[test]
    fn parses_from_yaml_with_defaults() {
        let yaml = "
            endpoints:
              feed-timeline:
                requests_per_window: 15
                window_size_minutes: 15
            batch_endpoints: [feed-timeline]
        ";
        let config: SchedulerConfig = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.safety_margin, 0.9);
        assert_eq!(config.batch.max_retries, 3);
        assert_eq!(config.batch.min_interval_ms, Duration::from_millis(2_000));
        assert!(config.batch_endpoints.contains("feed-timeline"));
        assert!(config.validate().is_ok());
    }
}
