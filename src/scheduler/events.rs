//! Scheduler observability events.
//!
//! Every state transition is published on a bounded channel so operators
//! can watch quota consumption. Publication is fire-and-forget: a full or
//! absent channel never affects scheduling.

use std::time::Duration;

use tokio::sync::mpsc;

/// A scheduler state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// A request slot was reserved and the operation is about to run.
    RequestScheduled {
        /// The endpoint the operation runs against.
        endpoint: String,
    },
    /// A scheduled operation finished successfully.
    RequestCompleted {
        /// The endpoint the operation ran against.
        endpoint: String,
    },
    /// A scheduled operation failed with a non-rate-limit error.
    RequestFailed {
        /// The endpoint the operation ran against.
        endpoint: String,
    },
    /// The window is full; the caller is waiting for it to turn over.
    RateLimitWarning {
        /// The exhausted endpoint.
        endpoint: String,
        /// Time until the window turns over.
        resume_in: Duration,
    },
    /// An expired window was replaced with a fresh one.
    RateLimitReset {
        /// The endpoint whose window was replaced.
        endpoint: String,
    },
    /// The provider reported the quota as spent (classified 429).
    RateLimitExceeded {
        /// The rate-limited endpoint.
        endpoint: String,
    },
}

impl SchedulerEvent {
    /// The endpoint this event concerns.
    pub fn endpoint(&self) -> &str {
        match self {
            SchedulerEvent::RequestScheduled { endpoint }
            | SchedulerEvent::RequestCompleted { endpoint }
            | SchedulerEvent::RequestFailed { endpoint }
            | SchedulerEvent::RateLimitWarning { endpoint, .. }
            | SchedulerEvent::RateLimitReset { endpoint }
            | SchedulerEvent::RateLimitExceeded { endpoint } => endpoint,
        }
    }
}

/// Handle for publishing scheduler events.
#[derive(Debug, Clone)]
pub struct SchedulerEvents {
    tx: Option<mpsc::Sender<SchedulerEvent>>,
}

impl SchedulerEvents {
    /// Creates an event channel with the given capacity and the publishing
    /// handle for it.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<SchedulerEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    /// Creates a handle that drops every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Publishes an event without blocking. Events are dropped when the
    /// channel is full or closed.
    pub(crate) fn emit(&self, event: SchedulerEvent) {
        if let Some(tx) = &self.tx {
            if let Err(e) = tx.try_send(event) {
                tracing::trace!("scheduler event dropped: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_delivers_events() {
        let (events, mut rx) = SchedulerEvents::channel(4);
        events.emit(SchedulerEvent::RequestScheduled { endpoint: "feed".into() });

        let received = rx.recv().await.unwrap();
        assert_eq!(received.endpoint(), "feed");
    }

    #[tokio::test]
    async fn full_channel_drops_instead_of_blocking() {
        let (events, mut rx) = SchedulerEvents::channel(1);
        events.emit(SchedulerEvent::RateLimitReset { endpoint: "a".into() });
        events.emit(SchedulerEvent::RateLimitReset { endpoint: "b".into() });

        assert_eq!(rx.recv().await.unwrap().endpoint(), "a");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn disabled_handle_is_a_no_op() {
        let events = SchedulerEvents::disabled();
        events.emit(SchedulerEvent::RequestCompleted { endpoint: "feed".into() });
    }
}
