//! Monitored source records: social accounts, tracked wallets and SMS
//! subscribers.

use serde::{Deserialize, Serialize};

/// A social account under observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialAccount {
    /// Provider-assigned account id. Unique within the registry.
    pub id: String,

    /// Display handle of the account.
    pub handle: String,

    /// Whether posts from this account are flagged for elevated routing.
    #[serde(default)]
    pub priority: bool,

    /// Id of the most recent post already fetched, used as the polling
    /// cursor. Advanced after each successful fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen_post: Option<String>,
}

/// A wallet under observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedWallet {
    /// The wallet address. Unique within the registry.
    pub address: String,

    /// Human-readable label for notifications.
    pub label: String,

    /// Id of the subscriber who registered the wallet, if any. High-value
    /// activity on the wallet is texted to this subscriber.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber: Option<String>,
}

/// A phone-number subscriber for SMS dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Registry-unique subscriber id.
    pub id: String,

    /// Destination phone number in E.164 form.
    pub phone: String,

    /// Inactive subscribers are skipped by every SMS dispatch path.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
