//! Ingestion boundaries: the poll-based feed reader and the push-based
//! transaction webhook receiver.

pub mod poller;
pub mod webhook_server;

pub use poller::{FEED_TIMELINE_ENDPOINT, FeedPoller};
pub use webhook_server::WebhookServerState;
