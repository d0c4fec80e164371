//! Construction and wiring of the supervisor's services.

use std::{collections::HashMap, sync::Arc};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::{Supervisor, SupervisorError};
use crate::{
    classifier::EventClassifier,
    config::{AppConfig, ChannelRole, ChannelsConfig, SourcesConfig},
    http_client::HttpClientPool,
    ingest::{FeedPoller, WebhookServerState},
    providers::{HttpSocialFeedProvider, HttpTokenDataProvider, SocialFeedProvider, TokenDataProvider},
    router::{AlertRouter, ChannelSinks},
    scheduler::{RequestScheduler, SchedulerEvents},
    sinks::{HttpSmsGateway, NotificationSink, SmsGateway, StdoutSink, TemplateService, WebhookSink},
    state::{ProcessedEvents, SourceRegistry},
};

/// The SupervisorBuilder constructs a Supervisor with all services wired.
pub struct SupervisorBuilder {
    config: Option<AppConfig>,
    channels: Option<ChannelsConfig>,
    sources: Option<SourcesConfig>,
}

impl Default for SupervisorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SupervisorBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self { config: None, channels: None, sources: None }
    }

    /// Sets the application configuration.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the channel sink configuration.
    pub fn channels(mut self, channels: ChannelsConfig) -> Self {
        self.channels = Some(channels);
        self
    }

    /// Sets the initial monitored sources.
    pub fn sources(mut self, sources: SourcesConfig) -> Self {
        self.sources = Some(sources);
        self
    }

    /// Assembles the supervisor, constructing every service.
    pub async fn build(self) -> Result<Supervisor, SupervisorError> {
        let config = self.config.ok_or(SupervisorError::MissingConfig)?;
        let channels_config = self.channels.ok_or(SupervisorError::MissingChannels)?;
        let sources_config = self.sources.unwrap_or_default();

        let client_pool = Arc::new(HttpClientPool::new());
        let templates = Arc::new(TemplateService::new());

        let registry = Arc::new(SourceRegistry::from_config(&sources_config));
        let processed = Arc::new(ProcessedEvents::new());

        let (events, events_rx) = SchedulerEvents::channel(config.event_channel_capacity);
        let scheduler = Arc::new(RequestScheduler::new(&config.scheduler, events));

        let provider_client = client_pool.get_or_create(&config.http_retry).await?;
        let feed: Arc<dyn SocialFeedProvider> = Arc::new(HttpSocialFeedProvider::new(
            config.providers.feed_base_url.clone(),
            config.providers.feed_token.clone(),
            provider_client.clone(),
        ));
        let tokens: Arc<dyn TokenDataProvider> = Arc::new(HttpTokenDataProvider::new(
            config.providers.token_data_base_url.clone(),
            config.providers.token_data_api_key.clone(),
            provider_client,
        ));

        let classifier = Arc::new(EventClassifier::new(tokens, processed));

        let mut sinks_by_role: HashMap<ChannelRole, Arc<dyn NotificationSink>> = HashMap::new();
        for channel in &channels_config.channels {
            let sink: Arc<dyn NotificationSink> = match &channel.url {
                Some(_) => {
                    let client = client_pool.get_or_create(&channel.retry_policy).await?;
                    Arc::new(WebhookSink::new(channel, client, templates.clone())?)
                }
                None => Arc::new(StdoutSink::new(
                    channel.name.clone(),
                    Some(channel.message.clone()),
                    templates.clone(),
                )),
            };
            sinks_by_role.insert(channel.role, sink);
        }
        let mut sink_for = |role: ChannelRole| {
            sinks_by_role.remove(&role).ok_or(SupervisorError::MissingChannel(role))
        };
        let channels = ChannelSinks {
            priority: sink_for(ChannelRole::Priority)?,
            topic: sink_for(ChannelRole::Topic)?,
            firehose: sink_for(ChannelRole::Firehose)?,
            wallet_activity: sink_for(ChannelRole::WalletActivity)?,
        };

        let sms_client = client_pool.get_or_create(&config.sms.retry_policy).await?;
        let sms: Arc<dyn SmsGateway> =
            Arc::new(HttpSmsGateway::new(config.sms.clone(), sms_client, templates.clone()));

        let router = Arc::new(AlertRouter::new(
            channels,
            sms,
            registry.clone(),
            config.sms_usd_threshold,
        ));

        let poller = FeedPoller::new(
            scheduler,
            feed,
            classifier.clone(),
            router.clone(),
            registry.clone(),
            config.poll_interval_ms,
        );

        let webhook_state = WebhookServerState {
            classifier,
            router,
            registry,
            webhook_token: config.server.webhook_token.clone(),
        };

        Ok(Supervisor {
            config,
            poller,
            webhook_state,
            events_rx,
            cancellation: CancellationToken::new(),
            join_set: JoinSet::new(),
        })
    }
}
