//! # Request Scheduler
//!
//! The scheduler wraps every outbound provider call and enforces the
//! request quotas the providers impose.
//!
//! ## Core behaviour
//!
//! - **Windowed quota accounting**: each endpoint has a sliding window
//!   (`window_size`) and a usable budget of
//!   `floor(requests_per_window × safety_margin)` slots. A caller that
//!   finds the window full waits out the remainder and goes again once the
//!   window turns over.
//! - **Batch pacing**: endpoints flagged batch-class are additionally
//!   serialized through a single global gate that keeps consecutive starts
//!   at least `min_interval_ms` apart, and classified rate-limit failures
//!   are retried up to `max_retries` times with a fixed pause in between.
//! - **Failure classification**: provider failures carrying HTTP 429 in
//!   any of its observed shapes reset the affected window and surface as
//!   [`SchedulerError::QuotaExceeded`] with a reset-time hint; everything
//!   else passes through unchanged.
//!
//! Every transition is published on the [`SchedulerEvents`] channel;
//! publication never influences control flow.

mod error;
mod events;
mod window;

use std::{collections::HashMap, future::Future, time::Duration};

use chrono::Utc;
use tokio::time::Instant;

pub use error::SchedulerError;
pub use events::{SchedulerEvent, SchedulerEvents};

use crate::{config::SchedulerConfig, providers::ProviderError};
use window::{SlotAttempt, WindowStore};

/// Resolved quota policy for one endpoint.
#[derive(Debug, Clone, Copy)]
struct EndpointQuota {
    window_size: Duration,
    safe_limit: u32,
    batch: bool,
}

/// Batch pacing policy, resolved from configuration.
#[derive(Debug, Clone, Copy)]
struct BatchPacing {
    min_interval: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

/// The quota-aware request scheduler.
///
/// One instance owns all window and pacing state for the process. The
/// quota table is immutable after construction.
pub struct RequestScheduler {
    quotas: HashMap<String, EndpointQuota>,
    batch: BatchPacing,
    windows: WindowStore,
    /// Instant the last batch-class operation was released, shared across
    /// every batch endpoint. The lock is held through pacing and slot
    /// acquisition, which is what serializes batch-class calls.
    batch_gate: tokio::sync::Mutex<Option<Instant>>,
    events: SchedulerEvents,
}

impl RequestScheduler {
    /// Builds a scheduler from a validated configuration.
    pub fn new(config: &SchedulerConfig, events: SchedulerEvents) -> Self {
        let quotas = config
            .endpoints
            .iter()
            .map(|(name, quota)| {
                (
                    name.clone(),
                    EndpointQuota {
                        window_size: quota.window_size(),
                        safe_limit: quota.safe_limit(config.safety_margin),
                        batch: config.batch_endpoints.contains(name),
                    },
                )
            })
            .collect();

        Self {
            quotas,
            batch: BatchPacing {
                min_interval: config.batch.min_interval_ms,
                max_retries: config.batch.max_retries,
                retry_delay: config.batch.retry_delay_ms,
            },
            windows: WindowStore::new(),
            batch_gate: tokio::sync::Mutex::new(None),
            events,
        }
    }

    /// Runs `operation` against the endpoint's quota.
    ///
    /// Suspends until a window slot is available, executes the operation,
    /// and classifies any failure. Batch-class endpoints take the paced,
    /// retrying path instead. The operation must be re-invocable because
    /// the batch path may call it several times.
    pub async fn schedule<T, F, Fut>(
        &self,
        endpoint: &str,
        mut operation: F,
    ) -> Result<T, SchedulerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let quota = self
            .quotas
            .get(endpoint)
            .ok_or_else(|| SchedulerError::UnknownEndpoint(endpoint.to_string()))?;

        if quota.batch {
            return self.schedule_batch(endpoint, *quota, operation).await;
        }

        self.acquire_slot(endpoint, *quota).await;
        self.events.emit(SchedulerEvent::RequestScheduled { endpoint: endpoint.to_string() });

        match operation().await {
            Ok(value) => {
                self.events
                    .emit(SchedulerEvent::RequestCompleted { endpoint: endpoint.to_string() });
                Ok(value)
            }
            Err(error) => Err(self.classify_failure(endpoint, error)),
        }
    }

    /// Reserves a window slot, waiting out the window remainder as many
    /// times as it takes. The re-check after each wait observes the
    /// expired window and replaces it.
    async fn acquire_slot(&self, endpoint: &str, quota: EndpointQuota) {
        loop {
            match self.windows.try_acquire(endpoint, quota.window_size, quota.safe_limit) {
                SlotAttempt::Acquired { window_was_reset } => {
                    if window_was_reset {
                        self.events
                            .emit(SchedulerEvent::RateLimitReset { endpoint: endpoint.to_string() });
                    }
                    return;
                }
                SlotAttempt::Exhausted { resume_in } => {
                    self.events.emit(SchedulerEvent::RateLimitWarning {
                        endpoint: endpoint.to_string(),
                        resume_in,
                    });
                    tracing::warn!(
                        endpoint,
                        wait_ms = resume_in.as_millis() as u64,
                        "endpoint budget spent, waiting for window to turn over"
                    );
                    tokio::time::sleep(resume_in).await;
                }
            }
        }
    }

    /// The batch path: global pacing, window accounting, then a bounded
    /// retry loop around classified rate-limit failures.
    async fn schedule_batch<T, F, Fut>(
        &self,
        endpoint: &str,
        quota: EndpointQuota,
        mut operation: F,
    ) -> Result<T, SchedulerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            {
                let mut gate = self.batch_gate.lock().await;
                if let Some(last) = *gate {
                    let since_last = last.elapsed();
                    if since_last < self.batch.min_interval {
                        tokio::time::sleep(self.batch.min_interval - since_last).await;
                    }
                }
                self.acquire_slot(endpoint, quota).await;
                *gate = Some(Instant::now());
            }

            self.events.emit(SchedulerEvent::RequestScheduled { endpoint: endpoint.to_string() });

            match operation().await {
                Ok(value) => {
                    self.events
                        .emit(SchedulerEvent::RequestCompleted { endpoint: endpoint.to_string() });
                    return Ok(value);
                }
                Err(error) => {
                    let classified = self.classify_failure(endpoint, error);
                    if classified.is_quota_exceeded() && attempt < self.batch.max_retries {
                        attempt += 1;
                        tracing::warn!(
                            endpoint,
                            attempt,
                            max_retries = self.batch.max_retries,
                            "batch call rate limited, retrying"
                        );
                        tokio::time::sleep(self.batch.retry_delay).await;
                        continue;
                    }
                    return Err(classified);
                }
            }
        }
    }

    /// Classifies a provider failure. Rate-limit conditions reset the
    /// affected window and surface as `QuotaExceeded` with a reset hint;
    /// everything else is re-raised unchanged.
    fn classify_failure(&self, endpoint: &str, error: ProviderError) -> SchedulerError {
        if error.is_rate_limited() {
            self.windows.reset(endpoint);
            self.events.emit(SchedulerEvent::RateLimitExceeded { endpoint: endpoint.to_string() });
            let resets_at =
                error.retry_after.unwrap_or_else(|| Utc::now() + chrono::Duration::seconds(60));
            tracing::warn!(endpoint, %resets_at, "provider reported quota exhausted");
            SchedulerError::QuotaExceeded { endpoint: endpoint.to_string(), resets_at }
        } else {
            self.events.emit(SchedulerEvent::RequestFailed { endpoint: endpoint.to_string() });
            SchedulerError::Provider(error)
        }
    }
}
