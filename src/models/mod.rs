//! Data models shared across the pipeline.

pub mod alert;
pub mod notification;
pub mod post;
pub mod source;
pub mod token;
pub mod transaction;

pub use alert::{AlertCandidate, AlertKind};
pub use notification::{NotificationMessage, Severity};
pub use post::SocialPost;
pub use source::{SocialAccount, Subscriber, TrackedWallet};
pub use token::{TokenMarketSnapshot, TokenMetadata};
pub use transaction::{NativeTransfer, TokenTransfer, TransactionRecord};
