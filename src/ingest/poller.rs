//! The social feed poller.
//!
//! Iterates the monitored accounts sequentially each cycle, so effective
//! concurrency against the feed endpoint stays bounded and batch pacing in
//! the scheduler sees one submission at a time.

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::{
    classifier::EventClassifier,
    providers::SocialFeedProvider,
    router::AlertRouter,
    scheduler::{RequestScheduler, SchedulerError},
    state::SourceRegistry,
};

/// Endpoint key the poller schedules timeline fetches under. Must have an
/// entry in the scheduler's quota table.
pub const FEED_TIMELINE_ENDPOINT: &str = "feed-timeline";

/// The poll-based social feed reader.
pub struct FeedPoller {
    scheduler: Arc<RequestScheduler>,
    feed: Arc<dyn SocialFeedProvider>,
    classifier: Arc<EventClassifier>,
    router: Arc<AlertRouter>,
    registry: Arc<SourceRegistry>,
    poll_interval: Duration,
}

impl FeedPoller {
    /// Creates a poller over the given services.
    pub fn new(
        scheduler: Arc<RequestScheduler>,
        feed: Arc<dyn SocialFeedProvider>,
        classifier: Arc<EventClassifier>,
        router: Arc<AlertRouter>,
        registry: Arc<SourceRegistry>,
        poll_interval: Duration,
    ) -> Self {
        Self { scheduler, feed, classifier, router, registry, poll_interval }
    }

    /// Runs polling cycles until cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("feed poller stopping");
                    return;
                }
                _ = ticker.tick() => {
                    self.poll_cycle().await;
                }
            }
        }
    }

    /// Polls every monitored account once, in sequence.
    ///
    /// A quota-exceeded failure ends the cycle: the budget is spent, and
    /// the remaining accounts are picked up next cycle. Other provider
    /// failures skip only the affected account.
    pub async fn poll_cycle(&self) {
        for account in self.registry.accounts() {
            let result = self
                .scheduler
                .schedule(FEED_TIMELINE_ENDPOINT, || {
                    let feed = self.feed.clone();
                    let account_id = account.id.clone();
                    let since = account.last_seen_post.clone();
                    async move { feed.fetch_timeline(&account_id, since.as_deref()).await }
                })
                .await;

            match result {
                Ok(posts) => {
                    tracing::debug!(
                        account = %account.handle,
                        count = posts.len(),
                        "fetched timeline page"
                    );
                    for post in &posts {
                        if let Some(alert) = self.classifier.classify_post(post, &account).await {
                            self.router.route(&alert).await;
                        }
                    }
                    if let Some(newest) = posts.last() {
                        self.registry.advance_cursor(&account.id, &newest.id);
                    }
                }
                Err(SchedulerError::QuotaExceeded { endpoint, resets_at }) => {
                    tracing::warn!(
                        %endpoint,
                        %resets_at,
                        "feed quota exhausted, deferring remaining accounts to the next cycle"
                    );
                    return;
                }
                Err(e) => {
                    tracing::error!(account = %account.handle, error = %e, "timeline fetch failed");
                }
            }
        }
    }
}
