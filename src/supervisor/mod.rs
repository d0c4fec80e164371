//! The Supervisor module manages the lifecycle of the Vigil application.
//!
//! The supervisor owns every long-running service (the feed poller, the
//! webhook server and the scheduler-event consumer), starts them on a
//! `JoinSet`, and orchestrates a clean shutdown when a signal arrives or a
//! critical task dies.

mod builder;

pub use builder::SupervisorBuilder;

use thiserror::Error;
use tokio::{signal, sync::mpsc, task::JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{
    config::{AppConfig, ChannelRole},
    http_client::HttpClientPoolError,
    ingest::{FeedPoller, WebhookServerState, webhook_server},
    scheduler::SchedulerEvent,
};

/// Errors that can occur while assembling or running the supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A configuration was not provided to the `SupervisorBuilder`.
    #[error("missing configuration for Supervisor")]
    MissingConfig,

    /// A channel configuration was not provided to the
    /// `SupervisorBuilder`.
    #[error("missing channel configuration for Supervisor")]
    MissingChannels,

    /// A routing role has no configured channel.
    #[error("no channel configured for role {0:?}")]
    MissingChannel(ChannelRole),

    /// An error occurred while loading configuration.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// An HTTP client could not be constructed.
    #[error(transparent)]
    HttpClientPool(#[from] HttpClientPoolError),

    /// A sink could not be constructed from its configuration.
    #[error(transparent)]
    Sink(#[from] crate::sinks::SinkError),

    /// An I/O error occurred while starting a service.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The primary runtime manager for the application.
pub struct Supervisor {
    config: AppConfig,
    poller: FeedPoller,
    webhook_state: WebhookServerState,
    events_rx: mpsc::Receiver<SchedulerEvent>,
    cancellation: CancellationToken,
    join_set: JoinSet<()>,
}

impl Supervisor {
    /// Creates a new `SupervisorBuilder`.
    pub fn builder() -> SupervisorBuilder {
        SupervisorBuilder::new()
    }

    /// Starts every service and runs until a shutdown signal arrives or a
    /// critical task ends.
    pub async fn run(mut self) -> Result<(), SupervisorError> {
        let cancel = self.cancellation.clone();

        let poller = self.poller;
        let poller_cancel = cancel.child_token();
        self.join_set.spawn(async move {
            poller.run(poller_cancel).await;
        });

        let state = self.webhook_state.clone();
        let listen_address = self.config.server.listen_address.clone();
        let server_cancel = cancel.child_token();
        self.join_set.spawn(async move {
            if let Err(e) = webhook_server::serve(state, &listen_address, server_cancel).await {
                tracing::error!(error = %e, "webhook server terminated");
            }
        });

        let mut events_rx = self.events_rx;
        let events_cancel = cancel.child_token();
        self.join_set.spawn(async move {
            loop {
                tokio::select! {
                    _ = events_cancel.cancelled() => break,
                    event = events_rx.recv() => match event {
                        Some(event) => {
                            tracing::info!(endpoint = %event.endpoint(), ?event, "scheduler event");
                        }
                        None => break,
                    },
                }
            }
        });

        tokio::select! {
            _ = shutdown_signal() => {
                tracing::info!("shutdown signal received");
            }
            result = self.join_set.join_next() => {
                match result {
                    Some(Err(e)) => tracing::error!(error = %e, "critical task ended unexpectedly"),
                    _ => tracing::warn!("critical task ended unexpectedly"),
                }
            }
        }

        cancel.cancel();

        let mut join_set = self.join_set;
        let drain = async { while join_set.join_next().await.is_some() {} };
        if tokio::time::timeout(self.config.shutdown_timeout_secs, drain).await.is_err() {
            tracing::warn!("graceful shutdown timed out, aborting remaining tasks");
            join_set.abort_all();
        }

        tracing::info!("supervisor stopped");
        Ok(())
    }
}

/// Completes when Ctrl-C or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = term.recv() => {}
                }
            }
            Err(_) => ctrl_c.await,
        }
    }

    #[cfg(not(unix))]
    ctrl_c.await;
}
