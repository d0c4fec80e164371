//! # Notification Router
//!
//! Maps alert candidates to destinations:
//!
//! - priority social alerts → priority channel + SMS to every active
//!   subscriber
//! - on-topic social alerts → topic channel + SMS to every active
//!   subscriber (independent of priority; both can fire for one post)
//! - every social alert → the firehose channel, unconditionally
//! - transaction alerts → the wallet-activity channel, escalated at the
//!   USD threshold; at-threshold alerts are also texted to the wallet's
//!   registered subscriber
//!
//! SMS recipients are deduplicated within one alert, and every dispatch is
//! isolated: a failing sink is logged and never blocks the others.

use std::{collections::HashSet, sync::Arc};

use futures::{FutureExt, future::BoxFuture};

use crate::{
    models::{AlertCandidate, Severity},
    sinks::{NotificationSink, SinkError, SmsGateway},
    state::SourceRegistry,
};

/// The channel sinks the router dispatches to, by role.
pub struct ChannelSinks {
    /// Receives alerts from priority-flagged accounts.
    pub priority: Arc<dyn NotificationSink>,
    /// Receives alerts confirmed to reference a known token.
    pub topic: Arc<dyn NotificationSink>,
    /// Receives every social alert.
    pub firehose: Arc<dyn NotificationSink>,
    /// Receives every transaction alert.
    pub wallet_activity: Arc<dyn NotificationSink>,
}

/// The alert router.
pub struct AlertRouter {
    channels: ChannelSinks,
    sms: Arc<dyn SmsGateway>,
    registry: Arc<SourceRegistry>,
    sms_usd_threshold: f64,
}

impl AlertRouter {
    /// Creates a router over the given sinks and source registry.
    pub fn new(
        channels: ChannelSinks,
        sms: Arc<dyn SmsGateway>,
        registry: Arc<SourceRegistry>,
        sms_usd_threshold: f64,
    ) -> Self {
        Self { channels, sms, registry, sms_usd_threshold }
    }

    /// Routes one alert to every destination its tags and value select.
    ///
    /// Dispatch failures are logged per sink; routing itself never fails.
    pub async fn route(&self, alert: &AlertCandidate) {
        let mut dispatches: Vec<(String, BoxFuture<'_, Result<(), SinkError>>)> = Vec::new();

        if alert.kind.is_social() {
            let mut texted = HashSet::new();

            if alert.priority {
                dispatches.push((
                    self.channels.priority.name(),
                    self.channels.priority.deliver(alert, Severity::Info).boxed(),
                ));
                self.queue_subscriber_texts(alert, &mut texted, &mut dispatches);
            }

            if alert.on_topic {
                dispatches.push((
                    self.channels.topic.name(),
                    self.channels.topic.deliver(alert, Severity::Info).boxed(),
                ));
                self.queue_subscriber_texts(alert, &mut texted, &mut dispatches);
            }

            dispatches.push((
                self.channels.firehose.name(),
                self.channels.firehose.deliver(alert, Severity::Info).boxed(),
            ));
        } else {
            let usd_value = alert.usd_value.unwrap_or(0.0);
            let severity = if usd_value >= self.sms_usd_threshold {
                Severity::Critical
            } else {
                Severity::Info
            };

            dispatches.push((
                self.channels.wallet_activity.name(),
                self.channels.wallet_activity.deliver(alert, severity).boxed(),
            ));

            if usd_value >= self.sms_usd_threshold {
                let registered = self
                    .registry
                    .wallet(&alert.source_id)
                    .and_then(|w| w.subscriber)
                    .and_then(|id| self.registry.subscriber(&id));
                if let Some(subscriber) = registered {
                    if subscriber.active {
                        let sms = self.sms.clone();
                        let phone = subscriber.phone;
                        let label = format!("sms:{}", subscriber.id);
                        dispatches.push((
                            label,
                            async move { sms.send(&phone, alert, Severity::Critical).await }
                                .boxed(),
                        ));
                    }
                }
            }
        }

        let results = futures::future::join_all(
            dispatches.into_iter().map(|(label, dispatch)| async move { (label, dispatch.await) }),
        )
        .await;

        for (label, result) in results {
            if let Err(e) = result {
                tracing::error!(sink = %label, error = %e, "alert dispatch failed");
            }
        }
    }

    /// Queues one SMS per active subscriber not already texted for this
    /// alert.
    fn queue_subscriber_texts<'a>(
        &'a self,
        alert: &'a AlertCandidate,
        texted: &mut HashSet<String>,
        dispatches: &mut Vec<(String, BoxFuture<'a, Result<(), SinkError>>)>,
    ) {
        for subscriber in self.registry.active_subscribers() {
            if !texted.insert(subscriber.phone.clone()) {
                continue;
            }
            let sms = self.sms.clone();
            let phone = subscriber.phone;
            let label = format!("sms:{}", subscriber.id);
            dispatches
                .push((label, async move { sms.send(&phone, alert, Severity::Info).await }.boxed()));
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::{
        models::{AlertKind, Subscriber, TrackedWallet},
        sinks::{MockNotificationSink, MockSmsGateway},
    };

    fn social_alert(priority: bool, on_topic: bool) -> AlertCandidate {
        AlertCandidate {
            kind: if on_topic { AlertKind::TokenMention } else { AlertKind::PriorityPost },
            source_id: "acct-1".into(),
            event_id: "1".into(),
            priority,
            on_topic,
            usd_value: None,
            text: Some("post".into()),
            addresses: vec![],
            signature: None,
            enrichment: None,
        }
    }

    fn transfer_alert(usd_value: f64) -> AlertCandidate {
        AlertCandidate {
            kind: AlertKind::OnChainTransfer,
            source_id: "wallet-1".into(),
            event_id: "sig".into(),
            priority: false,
            on_topic: false,
            usd_value: Some(usd_value),
            text: None,
            addresses: vec![],
            signature: Some("sig".into()),
            enrichment: None,
        }
    }

    /// A sink that expects to never be called.
    fn silent_sink(name: &str) -> Arc<MockNotificationSink> {
        let mut sink = MockNotificationSink::new();
        sink.expect_name().return_const(name.to_string());
        sink.expect_deliver().times(0);
        Arc::new(sink)
    }

    /// A sink that expects exactly one delivery at the given severity.
    fn expecting_sink(name: &str, severity: Severity) -> Arc<MockNotificationSink> {
        let mut sink = MockNotificationSink::new();
        sink.expect_name().return_const(name.to_string());
        sink.expect_deliver()
            .withf(move |_, s| *s == severity)
            .times(1)
            .returning(|_, _| Ok(()));
        Arc::new(sink)
    }

    fn registry_with_subscribers(subscribers: &[(&str, &str, bool)]) -> Arc<SourceRegistry> {
        let registry = SourceRegistry::new();
        for (id, phone, active) in subscribers {
            registry.add_subscriber(Subscriber {
                id: id.to_string(),
                phone: phone.to_string(),
                active: *active,
            });
        }
        Arc::new(registry)
    }

    fn router(
        channels: ChannelSinks,
        sms: MockSmsGateway,
        registry: Arc<SourceRegistry>,
    ) -> AlertRouter {
        AlertRouter::new(channels, Arc::new(sms), registry, 1_000.0)
    }

    #[tokio::test]
    async fn plain_social_alert_reaches_only_the_firehose() {
        let channels = ChannelSinks {
            priority: silent_sink("priority"),
            topic: silent_sink("topic"),
            firehose: expecting_sink("firehose", Severity::Info),
            wallet_activity: silent_sink("wallets"),
        };
        let mut sms = MockSmsGateway::new();
        sms.expect_send().times(0);

        let r = router(channels, sms, registry_with_subscribers(&[("s1", "+1555", true)]));
        r.route(&social_alert(false, false)).await;
    }

    #[tokio::test]
    async fn priority_alert_reaches_priority_channel_and_texts_subscribers() {
        let channels = ChannelSinks {
            priority: expecting_sink("priority", Severity::Info),
            topic: silent_sink("topic"),
            firehose: expecting_sink("firehose", Severity::Info),
            wallet_activity: silent_sink("wallets"),
        };
        let mut sms = MockSmsGateway::new();
        sms.expect_send().times(2).returning(|_, _, _| Ok(()));

        let registry = registry_with_subscribers(&[
            ("s1", "+15550001111", true),
            ("s2", "+15550002222", true),
            ("s3", "+15550003333", false),
        ]);
        let r = router(channels, sms, registry);
        r.route(&social_alert(true, false)).await;
    }

    #[tokio::test]
    async fn priority_and_on_topic_both_fire_with_deduped_sms() {
        let channels = ChannelSinks {
            priority: expecting_sink("priority", Severity::Info),
            topic: expecting_sink("topic", Severity::Info),
            firehose: expecting_sink("firehose", Severity::Info),
            wallet_activity: silent_sink("wallets"),
        };
        // One subscriber, two qualifying rules: exactly one text.
        let mut sms = MockSmsGateway::new();
        sms.expect_send()
            .with(eq("+15550001111"), mockall::predicate::always(), mockall::predicate::always())
            .times(1)
            .returning(|_, _, _| Ok(()));

        let r = router(channels, sms, registry_with_subscribers(&[("s1", "+15550001111", true)]));

        let mut alert = social_alert(true, true);
        alert.priority = true;
        r.route(&alert).await;
    }

    #[tokio::test]
    async fn high_value_transfer_escalates_and_texts_the_registrant() {
        let channels = ChannelSinks {
            priority: silent_sink("priority"),
            topic: silent_sink("topic"),
            firehose: silent_sink("firehose"),
            wallet_activity: expecting_sink("wallets", Severity::Critical),
        };
        let mut sms = MockSmsGateway::new();
        sms.expect_send()
            .with(eq("+15550009999"), mockall::predicate::always(), eq(Severity::Critical))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let registry = registry_with_subscribers(&[("owner", "+15550009999", true)]);
        registry.track_wallet(TrackedWallet {
            address: "wallet-1".into(),
            label: "fund".into(),
            subscriber: Some("owner".into()),
        });

        let r = router(channels, sms, registry);
        r.route(&transfer_alert(1_500.0)).await;
    }

    #[tokio::test]
    async fn threshold_is_inclusive() {
        let channels = ChannelSinks {
            priority: silent_sink("priority"),
            topic: silent_sink("topic"),
            firehose: silent_sink("firehose"),
            wallet_activity: expecting_sink("wallets", Severity::Critical),
        };
        let mut sms = MockSmsGateway::new();
        sms.expect_send().times(1).returning(|_, _, _| Ok(()));

        let registry = registry_with_subscribers(&[("owner", "+1555", true)]);
        registry.track_wallet(TrackedWallet {
            address: "wallet-1".into(),
            label: "fund".into(),
            subscriber: Some("owner".into()),
        });

        let r = router(channels, sms, registry);
        r.route(&transfer_alert(1_000.0)).await;
    }

    #[tokio::test]
    async fn low_value_transfer_is_not_texted() {
        let channels = ChannelSinks {
            priority: silent_sink("priority"),
            topic: silent_sink("topic"),
            firehose: silent_sink("firehose"),
            wallet_activity: expecting_sink("wallets", Severity::Info),
        };
        let mut sms = MockSmsGateway::new();
        sms.expect_send().times(0);

        let registry = registry_with_subscribers(&[("owner", "+1555", true)]);
        registry.track_wallet(TrackedWallet {
            address: "wallet-1".into(),
            label: "fund".into(),
            subscriber: Some("owner".into()),
        });

        let r = router(channels, sms, registry);
        r.route(&transfer_alert(500.0)).await;
    }

    #[tokio::test]
    async fn unregistered_wallet_gets_no_text() {
        let channels = ChannelSinks {
            priority: silent_sink("priority"),
            topic: silent_sink("topic"),
            firehose: silent_sink("firehose"),
            wallet_activity: expecting_sink("wallets", Severity::Critical),
        };
        let mut sms = MockSmsGateway::new();
        sms.expect_send().times(0);

        let registry = registry_with_subscribers(&[]);
        registry.track_wallet(TrackedWallet {
            address: "wallet-1".into(),
            label: "fund".into(),
            subscriber: None,
        });

        let r = router(channels, sms, registry);
        r.route(&transfer_alert(5_000.0)).await;
    }

    #[tokio::test]
    async fn one_failing_sink_does_not_block_the_others() {
        let mut priority = MockNotificationSink::new();
        priority.expect_name().return_const("priority".to_string());
        priority
            .expect_deliver()
            .times(1)
            .returning(|_, _| Err(SinkError::DeliveryFailed("hook gone".into())));

        let channels = ChannelSinks {
            priority: Arc::new(priority),
            topic: silent_sink("topic"),
            firehose: expecting_sink("firehose", Severity::Info),
            wallet_activity: silent_sink("wallets"),
        };
        let mut sms = MockSmsGateway::new();
        sms.expect_send().times(1).returning(|_, _, _| Ok(()));

        let r = router(channels, sms, registry_with_subscribers(&[("s1", "+1555", true)]));
        r.route(&social_alert(true, false)).await;
    }
}
