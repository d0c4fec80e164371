//! This module defines the `AlertCandidate` struct.

use serde::{Deserialize, Serialize};

use super::token::TokenMarketSnapshot;

/// The category of event an alert candidate was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertKind {
    /// A post from a monitored social account with no confirmed token
    /// reference.
    PriorityPost,
    /// A social post confirmed to reference a known token.
    TokenMention,
    /// A transaction observed on a tracked wallet.
    OnChainTransfer,
}

impl AlertKind {
    /// Returns `true` for alert kinds that originate from the social feed.
    pub fn is_social(&self) -> bool {
        matches!(self, AlertKind::PriorityPost | AlertKind::TokenMention)
    }
}

/// A normalized, not-yet-routed representation of a noteworthy event.
///
/// Produced by the classifier from a raw social post or a raw transaction
/// record, consumed exactly once by the router, then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCandidate {
    /// The category of the underlying event.
    pub kind: AlertKind,

    /// The monitored source that produced the event (account id or wallet
    /// address).
    pub source_id: String,

    /// The provider-assigned id of the underlying event (post id or
    /// transaction signature).
    pub event_id: String,

    /// Whether the originating source is flagged for elevated routing.
    #[serde(default)]
    pub priority: bool,

    /// Whether the event was confirmed to reference a known token.
    #[serde(default)]
    pub on_topic: bool,

    /// Estimated USD value of the event, when one could be computed.
    /// Always non-negative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usd_value: Option<f64>,

    /// The raw post text, for social events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Confirmed token addresses referenced by the event.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<String>,

    /// The on-chain transaction signature, for transaction events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Live market metrics for the primary token involved, when enrichment
    /// succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<TokenMarketSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_kebab_case() {
        let json = serde_json::to_string(&AlertKind::OnChainTransfer).unwrap();
        assert_eq!(json, r#""on-chain-transfer""#);
        let json = serde_json::to_string(&AlertKind::PriorityPost).unwrap();
        assert_eq!(json, r#""priority-post""#);
    }

    #[test]
    fn social_kinds_are_social() {
        assert!(AlertKind::PriorityPost.is_social());
        assert!(AlertKind::TokenMention.is_social());
        assert!(!AlertKind::OnChainTransfer.is_social());
    }
}
