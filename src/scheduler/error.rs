//! Scheduler error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::providers::ProviderError;

/// Errors surfaced by [`RequestScheduler::schedule`].
///
/// [`RequestScheduler::schedule`]: super::RequestScheduler::schedule
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The provider reported the endpoint's quota as spent. Retryable on a
    /// later cycle, after `resets_at`.
    #[error("quota exhausted for endpoint '{endpoint}', retry after {resets_at}")]
    QuotaExceeded {
        /// The rate-limited endpoint.
        endpoint: String,
        /// When the provider expects the quota to reset: its own hint when
        /// supplied, otherwise one minute from classification.
        resets_at: DateTime<Utc>,
    },

    /// The endpoint key has no entry in the quota table.
    #[error("endpoint '{0}' has no quota configuration")]
    UnknownEndpoint(String),

    /// The wrapped operation failed with anything other than a rate-limit
    /// condition. Never retried by the scheduler for non-batch endpoints;
    /// the caller decides.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl SchedulerError {
    /// Whether this is a classified rate-limit failure.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, SchedulerError::QuotaExceeded { .. })
    }
}
