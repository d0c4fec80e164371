//! Pooled, retrying HTTP clients.
//!
//! Sinks and providers request a client for their retry policy from a
//! shared [`HttpClientPool`]; clients are created once per policy and
//! reused so connection pools stay warm.

mod pool;

pub use pool::{HttpClientPool, HttpClientPoolError};

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{Jitter, RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{HttpRetryConfig, JitterSetting};

/// Wraps a base client with retry middleware for transient failures.
pub fn create_retrying_client(
    policy: &HttpRetryConfig,
    base_client: reqwest::Client,
) -> ClientWithMiddleware {
    let builder = match policy.jitter {
        JitterSetting::None => ExponentialBackoff::builder().jitter(Jitter::None),
        JitterSetting::Full => ExponentialBackoff::builder().jitter(Jitter::Full),
    };

    let retry_policy = builder
        .base(policy.backoff_base)
        .retry_bounds(policy.initial_backoff_ms, policy.max_backoff_secs)
        .build_with_max_retries(policy.max_retries);

    ClientBuilder::new(base_client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}
