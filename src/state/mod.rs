//! Explicitly owned in-memory stores.
//!
//! All pipeline state lives for the process lifetime only: there is no
//! durable storage and no crash recovery. The stores are constructed once
//! at startup, injected into the services that need them, and torn down
//! with the process. Tests construct fresh stores per case.

use dashmap::{DashMap, DashSet};

use crate::{
    config::SourcesConfig,
    models::{SocialAccount, Subscriber, TrackedWallet},
};

/// Dedup record of already-processed event ids.
///
/// Append-only: ids are retained for the process lifetime with no
/// eviction. Membership checks are idempotent.
#[derive(Debug, Default)]
pub struct ProcessedEvents {
    seen: DashSet<String>,
}

impl ProcessedEvents {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an event id as processed.
    ///
    /// Returns `true` if the id was not seen before. A `false` return means
    /// the event was already handled and must not be re-evaluated.
    pub fn mark(&self, id: &str) -> bool {
        self.seen.insert(id.to_string())
    }

    /// Returns whether an event id has already been processed.
    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Number of ids recorded so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns `true` when no ids have been recorded.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Registry of monitored sources and SMS subscribers.
///
/// Entries are created on subscribe, updated after successful fetches and
/// removed on unsubscribe. Lookup methods return clones so callers never
/// hold a map guard across an await point.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    accounts: DashMap<String, SocialAccount>,
    wallets: DashMap<String, TrackedWallet>,
    subscribers: DashMap<String, Subscriber>,
}

impl SourceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a registry from the sources configuration file.
    pub fn from_config(config: &SourcesConfig) -> Self {
        let registry = Self::new();
        for account in &config.accounts {
            registry.subscribe_account(account.clone());
        }
        for wallet in &config.wallets {
            registry.track_wallet(wallet.clone());
        }
        for subscriber in &config.subscribers {
            registry.add_subscriber(subscriber.clone());
        }
        registry
    }

    /// Adds or replaces a monitored social account.
    pub fn subscribe_account(&self, account: SocialAccount) {
        self.accounts.insert(account.id.clone(), account);
    }

    /// Removes a monitored social account. Returns `true` if it existed.
    pub fn unsubscribe_account(&self, id: &str) -> bool {
        self.accounts.remove(id).is_some()
    }

    /// Looks up a monitored account by id.
    pub fn account(&self, id: &str) -> Option<SocialAccount> {
        self.accounts.get(id).map(|entry| entry.value().clone())
    }

    /// Snapshot of all monitored accounts.
    pub fn accounts(&self) -> Vec<SocialAccount> {
        self.accounts.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Advances an account's polling cursor to the given post id.
    pub fn advance_cursor(&self, account_id: &str, post_id: &str) {
        if let Some(mut account) = self.accounts.get_mut(account_id) {
            account.last_seen_post = Some(post_id.to_string());
        }
    }

    /// Adds or replaces a tracked wallet.
    pub fn track_wallet(&self, wallet: TrackedWallet) {
        self.wallets.insert(wallet.address.clone(), wallet);
    }

    /// Removes a tracked wallet. Returns `true` if it existed.
    pub fn untrack_wallet(&self, address: &str) -> bool {
        self.wallets.remove(address).is_some()
    }

    /// Looks up a tracked wallet by address.
    pub fn wallet(&self, address: &str) -> Option<TrackedWallet> {
        self.wallets.get(address).map(|entry| entry.value().clone())
    }

    /// Adds or replaces an SMS subscriber.
    pub fn add_subscriber(&self, subscriber: Subscriber) {
        self.subscribers.insert(subscriber.id.clone(), subscriber);
    }

    /// Removes an SMS subscriber. Returns `true` if they existed.
    pub fn remove_subscriber(&self, id: &str) -> bool {
        self.subscribers.remove(id).is_some()
    }

    /// Looks up a subscriber by id.
    pub fn subscriber(&self, id: &str) -> Option<Subscriber> {
        self.subscribers.get(id).map(|entry| entry.value().clone())
    }

    /// Snapshot of all active subscribers.
    pub fn active_subscribers(&self) -> Vec<Subscriber> {
        self.subscribers
            .iter()
            .filter(|entry| entry.value().active)
            .map(|entry| entry.value().clone())
            .collect()
    }
}
