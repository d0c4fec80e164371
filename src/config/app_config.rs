//! Application configuration loading.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

use super::{
    HttpRetryConfig, SchedulerConfig, deserialize_duration_from_ms, deserialize_duration_from_secs,
};
use crate::models::NotificationMessage;

fn default_poll_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_sms_usd_threshold() -> f64 {
    1_000.0
}

fn default_event_channel_capacity() -> usize {
    256
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_listen_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_base_url() -> Url {
    Url::parse("http://127.0.0.1:9/").expect("static placeholder url is valid")
}

fn default_sms_body() -> NotificationMessage {
    NotificationMessage {
        title: String::new(),
        body: "[vigil] {{ alert.kind }} from {{ alert.source_id }}".to_string(),
    }
}

/// HTTP server configuration for the webhook receiver.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the webhook server binds to.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Shared token expected in the `Authorization` header of webhook
    /// deliveries. When unset, deliveries are accepted unauthenticated
    /// (development only).
    #[serde(default)]
    pub webhook_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { listen_address: default_listen_address(), webhook_token: None }
    }
}

/// SMS gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SmsGatewayConfig {
    /// Gateway message endpoint.
    #[serde(default = "default_base_url")]
    pub url: Url,

    /// Basic-auth username (account id).
    #[serde(default)]
    pub username: String,

    /// Basic-auth password (API token).
    #[serde(default)]
    pub password: String,

    /// Sender phone number.
    #[serde(default)]
    pub from: String,

    /// Template for the text body; the title is unused by SMS.
    #[serde(default = "default_sms_body")]
    pub message: NotificationMessage,

    /// Retry policy for gateway calls.
    #[serde(default)]
    pub retry_policy: HttpRetryConfig,
}

impl Default for SmsGatewayConfig {
    fn default() -> Self {
        Self {
            url: default_base_url(),
            username: String::new(),
            password: String::new(),
            from: String::new(),
            message: default_sms_body(),
            retry_policy: HttpRetryConfig::default(),
        }
    }
}

/// Base URLs and credentials for the external data providers.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Base URL of the social feed API.
    #[serde(default = "default_base_url")]
    pub feed_base_url: Url,

    /// Bearer token for the social feed API.
    #[serde(default)]
    pub feed_token: Option<String>,

    /// Base URL of the token data / market metrics API.
    #[serde(default = "default_base_url")]
    pub token_data_base_url: Url,

    /// API key for the token data API.
    #[serde(default)]
    pub token_data_api_key: Option<String>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            feed_base_url: default_base_url(),
            feed_token: None,
            token_data_base_url: default_base_url(),
            token_data_api_key: None,
        }
    }
}

/// Application configuration for Vigil.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Scheduler quota table and pacing policy.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Retry policy for outbound HTTP clients.
    #[serde(default)]
    pub http_retry: HttpRetryConfig,

    /// Webhook server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// SMS gateway configuration.
    #[serde(default)]
    pub sms: SmsGatewayConfig,

    /// External provider endpoints.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Interval between feed polling cycles.
    #[serde(
        default = "default_poll_interval",
        deserialize_with = "deserialize_duration_from_ms"
    )]
    pub poll_interval_ms: Duration,

    /// USD value at and above which transaction alerts are escalated and
    /// texted to the wallet's registered subscriber.
    #[serde(default = "default_sms_usd_threshold")]
    pub sms_usd_threshold: f64,

    /// Capacity of the scheduler observability channel.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Maximum time to wait for graceful shutdown.
    #[serde(
        default = "default_shutdown_timeout",
        deserialize_with = "deserialize_duration_from_secs"
    )]
    pub shutdown_timeout_secs: Duration,

    /// Path to the channel sink configuration file.
    #[serde(skip_deserializing)]
    pub channels_config_path: PathBuf,

    /// Path to the monitored sources configuration file.
    #[serde(skip_deserializing)]
    pub sources_config_path: PathBuf,
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading `app.yaml` from the
    /// configuration directory, with `VIGIL__`-prefixed environment
    /// variables taking precedence.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{config_dir_str}/app.yaml")))
            .add_source(Environment::with_prefix("VIGIL").separator("__"))
            .build()?;
        let mut config: Self = s.try_deserialize()?;

        config
            .scheduler
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;

        let config_path = Path::new(config_dir_str);
        config.channels_config_path = config_path.join("channels.yaml");
        config.sources_config_path = config_path.join("sources.yaml");

        Ok(config)
    }

    /// Creates a new `AppConfigBuilder` for testing purposes.
    #[cfg(test)]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// A builder for creating `AppConfig` instances for testing.
#[cfg(test)]
#[derive(Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.config.scheduler = scheduler;
        self
    }

    pub fn poll_interval(mut self, interval_ms: u64) -> Self {
        self.config.poll_interval_ms = Duration::from_millis(interval_ms);
        self
    }

    pub fn sms_usd_threshold(mut self, threshold: f64) -> Self {
        self.config.sms_usd_threshold = threshold;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
