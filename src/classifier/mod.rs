//! # Event Classifier
//!
//! Normalizes raw social posts and raw transaction records into
//! [`AlertCandidate`]s.
//!
//! - The social path deduplicates against the processed-event store,
//!   extracts candidate addresses with a permissive length heuristic, and
//!   confirms them through token-metadata lookups.
//! - The transaction path rejects stable-denominated transfers outright,
//!   accumulates a USD estimate, and enriches the primary token transfer
//!   with live market metrics.
//!
//! Enrichment and lookup failures never propagate out of the classifier:
//! they degrade the candidate instead of dropping it.

mod address;

pub use address::candidate_addresses;

use std::sync::Arc;

use crate::{
    models::{AlertCandidate, AlertKind, SocialAccount, SocialPost, TrackedWallet, TransactionRecord},
    providers::TokenDataProvider,
    state::ProcessedEvents,
};

/// Stable-value symbols whose transfers never produce an alert.
const STABLE_SYMBOLS: [&str; 3] = ["USDC", "USDT", "DAI"];

const LAMPORTS_PER_NATIVE: f64 = 1_000_000_000.0;

/// The event classifier. One instance serves both ingestion paths.
pub struct EventClassifier {
    tokens: Arc<dyn TokenDataProvider>,
    processed: Arc<ProcessedEvents>,
}

impl EventClassifier {
    /// Creates a classifier over the given token data provider and
    /// processed-event store.
    pub fn new(tokens: Arc<dyn TokenDataProvider>, processed: Arc<ProcessedEvents>) -> Self {
        Self { tokens, processed }
    }

    /// Classifies a raw social post into at most one alert candidate.
    ///
    /// The post id is marked processed up front, so a post is never
    /// re-evaluated, even when classification fails partway through.
    pub async fn classify_post(
        &self,
        post: &SocialPost,
        author: &SocialAccount,
    ) -> Option<AlertCandidate> {
        if !self.processed.mark(&post.id) {
            tracing::debug!(post_id = %post.id, "post already processed, skipping");
            return None;
        }

        let mut confirmed = Vec::new();
        for candidate in candidate_addresses(&post.text) {
            match self.tokens.token_metadata(&candidate).await {
                Ok(Some(metadata)) => {
                    tracing::debug!(
                        address = %candidate,
                        symbol = %metadata.symbol,
                        "confirmed token reference"
                    );
                    confirmed.push(candidate);
                }
                Ok(None) => {}
                Err(e) => {
                    // A failed lookup only costs the confirmation.
                    tracing::debug!(address = %candidate, error = %e, "token lookup unavailable");
                }
            }
        }

        let on_topic = !confirmed.is_empty();
        let kind = if on_topic { AlertKind::TokenMention } else { AlertKind::PriorityPost };

        Some(AlertCandidate {
            kind,
            source_id: author.id.clone(),
            event_id: post.id.clone(),
            priority: author.priority,
            on_topic,
            usd_value: None,
            text: Some(post.text.clone()),
            addresses: confirmed,
            signature: None,
            enrichment: None,
        })
    }

    /// Classifies a raw transaction record into at most one alert
    /// candidate.
    ///
    /// A record with no transfers and no native amount still produces a
    /// candidate with a zero USD value, so tracked-wallet activity stays
    /// observable even when it cannot be valued.
    pub async fn classify_transaction(
        &self,
        record: &TransactionRecord,
        wallet: &TrackedWallet,
    ) -> Option<AlertCandidate> {
        if record
            .token_transfers
            .iter()
            .any(|t| STABLE_SYMBOLS.contains(&t.token_symbol.as_str()))
        {
            tracing::debug!(wallet = %wallet.address, "stable-asset transfer, not alerting");
            return None;
        }

        let mut usd_value = 0.0;

        let native_lamports: u64 = if record.native_transfers.is_empty() {
            record.amount.unwrap_or(0)
        } else {
            record.native_transfers.iter().map(|t| t.amount).sum()
        };
        if native_lamports > 0 {
            match self.tokens.native_price_usd().await {
                Ok(price) => {
                    usd_value += native_lamports as f64 / LAMPORTS_PER_NATIVE * price;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "native price unavailable, omitting component");
                }
            }
        }

        for transfer in &record.token_transfers {
            if let Some(price) = transfer.token_price {
                usd_value += transfer.token_amount * price;
            }
        }

        let enrichment = match record.token_transfers.first() {
            Some(primary) => match self.tokens.market_snapshot(&primary.mint).await {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::debug!(mint = %primary.mint, error = %e, "enrichment unavailable");
                    None
                }
            },
            None => None,
        };

        let event_id = record
            .signature
            .clone()
            .unwrap_or_else(|| format!("{}:{}", record.account, record.kind));

        Some(AlertCandidate {
            kind: AlertKind::OnChainTransfer,
            source_id: wallet.address.clone(),
            event_id,
            priority: false,
            on_topic: false,
            usd_value: Some(usd_value),
            text: None,
            addresses: record.token_transfers.iter().map(|t| t.mint.clone()).collect(),
            signature: record.signature.clone(),
            enrichment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{NativeTransfer, TokenMarketSnapshot, TokenMetadata, TokenTransfer},
        providers::traits::MockTokenDataProvider,
    };

    const MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    fn author(priority: bool) -> SocialAccount {
        SocialAccount {
            id: "acct-1".into(),
            handle: "@watched".into(),
            priority,
            last_seen_post: None,
        }
    }

    fn post(id: &str, text: &str) -> SocialPost {
        SocialPost { id: id.into(), author_id: "acct-1".into(), text: text.into(), created_at: None }
    }

    fn wallet() -> TrackedWallet {
        TrackedWallet { address: "wallet-1".into(), label: "fund".into(), subscriber: None }
    }

    fn transfer(symbol: &str, amount: f64, price: Option<f64>) -> TokenTransfer {
        TokenTransfer {
            mint: MINT.into(),
            token_name: symbol.to_lowercase(),
            token_symbol: symbol.into(),
            token_amount: amount,
            token_price: price,
        }
    }

    fn classifier(tokens: MockTokenDataProvider) -> EventClassifier {
        EventClassifier::new(Arc::new(tokens), Arc::new(ProcessedEvents::new()))
    }

    #[tokio::test]
    async fn duplicate_post_yields_exactly_one_candidate() {
        let classifier = classifier(MockTokenDataProvider::new());
        let p = post("42", "nothing interesting here");

        assert!(classifier.classify_post(&p, &author(false)).await.is_some());
        assert!(classifier.classify_post(&p, &author(false)).await.is_none());
    }

    #[tokio::test]
    async fn confirmed_token_reference_marks_on_topic() {
        let mut tokens = MockTokenDataProvider::new();
        tokens.expect_token_metadata().returning(|address| {
            Ok(Some(TokenMetadata {
                mint: address.to_string(),
                name: "USD Coin".into(),
                symbol: "USDC".into(),
            }))
        });
        let classifier = classifier(tokens);

        let p = post("1", &format!("aping into {MINT} right now"));
        let candidate = classifier.classify_post(&p, &author(true)).await.unwrap();

        assert_eq!(candidate.kind, AlertKind::TokenMention);
        assert!(candidate.on_topic);
        assert!(candidate.priority);
        assert_eq!(candidate.addresses, vec![MINT.to_string()]);
    }

    #[tokio::test]
    async fn unconfirmed_candidates_stay_off_topic() {
        let mut tokens = MockTokenDataProvider::new();
        tokens.expect_token_metadata().returning(|_| Ok(None));
        let classifier = classifier(tokens);

        let p = post("1", &format!("is {MINT} a thing?"));
        let candidate = classifier.classify_post(&p, &author(false)).await.unwrap();

        assert_eq!(candidate.kind, AlertKind::PriorityPost);
        assert!(!candidate.on_topic);
        assert!(candidate.addresses.is_empty());
    }

    #[tokio::test]
    async fn lookup_failure_is_absorbed() {
        let mut tokens = MockTokenDataProvider::new();
        tokens
            .expect_token_metadata()
            .returning(|_| Err(crate::providers::ProviderError::new("service down")));
        let classifier = classifier(tokens);

        let p = post("1", &format!("look at {MINT}"));
        let candidate = classifier.classify_post(&p, &author(false)).await.unwrap();

        assert!(!candidate.on_topic);
    }

    #[tokio::test]
    async fn failed_classification_still_marks_processed() {
        let mut tokens = MockTokenDataProvider::new();
        tokens
            .expect_token_metadata()
            .times(1)
            .returning(|_| Err(crate::providers::ProviderError::new("service down")));
        let processed = Arc::new(ProcessedEvents::new());
        let classifier = EventClassifier::new(Arc::new(tokens), processed.clone());

        let p = post("7", &format!("{MINT}"));
        classifier.classify_post(&p, &author(false)).await;

        assert!(processed.contains("7"));
        // Resubmission is ignored without another lookup.
        assert!(classifier.classify_post(&p, &author(false)).await.is_none());
    }

    #[tokio::test]
    async fn stable_transfer_never_alerts() {
        let classifier = classifier(MockTokenDataProvider::new());

        let record = TransactionRecord {
            account: "wallet-1".into(),
            kind: "TRANSFER".into(),
            amount: None,
            native_transfers: vec![],
            token_transfers: vec![transfer("USDC", 500.0, Some(1.0))],
            signature: Some("sig".into()),
        };

        assert!(classifier.classify_transaction(&record, &wallet()).await.is_none());
    }

    #[tokio::test]
    async fn accumulates_native_and_token_value() {
        let mut tokens = MockTokenDataProvider::new();
        tokens.expect_native_price_usd().returning(|| Ok(100.0));
        tokens.expect_market_snapshot().returning(|_| {
            Ok(TokenMarketSnapshot { liquidity_usd: Some(5_000.0), ..Default::default() })
        });
        let classifier = classifier(tokens);

        let record = TransactionRecord {
            account: "wallet-1".into(),
            kind: "SWAP".into(),
            amount: None,
            native_transfers: vec![NativeTransfer {
                amount: 2_000_000_000,
                from_user_account: None,
                to_user_account: None,
            }],
            token_transfers: vec![transfer("WIF", 10.0, Some(2.0))],
            signature: Some("sig".into()),
        };

        let candidate = classifier.classify_transaction(&record, &wallet()).await.unwrap();

        // 2 native at $100 plus 10 tokens at $2.
        assert_eq!(candidate.usd_value, Some(220.0));
        assert_eq!(candidate.enrichment.unwrap().liquidity_usd, Some(5_000.0));
    }

    #[tokio::test]
    async fn transfer_without_price_contributes_nothing() {
        let mut tokens = MockTokenDataProvider::new();
        tokens.expect_market_snapshot().returning(|_| Ok(TokenMarketSnapshot::default()));
        let classifier = classifier(tokens);

        let record = TransactionRecord {
            account: "wallet-1".into(),
            kind: "TRANSFER".into(),
            amount: None,
            native_transfers: vec![],
            token_transfers: vec![transfer("WIF", 10.0, None)],
            signature: None,
        };

        let candidate = classifier.classify_transaction(&record, &wallet()).await.unwrap();
        assert_eq!(candidate.usd_value, Some(0.0));
    }

    #[tokio::test]
    async fn empty_transaction_still_alerts_with_zero_value() {
        let classifier = classifier(MockTokenDataProvider::new());

        let record = TransactionRecord {
            account: "wallet-1".into(),
            kind: "UNKNOWN".into(),
            amount: None,
            native_transfers: vec![],
            token_transfers: vec![],
            signature: None,
        };

        let candidate = classifier.classify_transaction(&record, &wallet()).await.unwrap();
        assert_eq!(candidate.kind, AlertKind::OnChainTransfer);
        assert_eq!(candidate.usd_value, Some(0.0));
        assert!(candidate.enrichment.is_none());
    }

    #[tokio::test]
    async fn enrichment_failure_degrades_gracefully() {
        let mut tokens = MockTokenDataProvider::new();
        tokens
            .expect_market_snapshot()
            .returning(|_| Err(crate::providers::ProviderError::new("metrics down")));
        let classifier = classifier(tokens);

        let record = TransactionRecord {
            account: "wallet-1".into(),
            kind: "SWAP".into(),
            amount: None,
            native_transfers: vec![],
            token_transfers: vec![transfer("WIF", 3.0, Some(4.0))],
            signature: Some("sig".into()),
        };

        let candidate = classifier.classify_transaction(&record, &wallet()).await.unwrap();
        assert_eq!(candidate.usd_value, Some(12.0));
        assert!(candidate.enrichment.is_none());
    }

    #[tokio::test]
    async fn record_level_amount_is_used_without_itemized_transfers() {
        let mut tokens = MockTokenDataProvider::new();
        tokens.expect_native_price_usd().returning(|| Ok(50.0));
        let classifier = classifier(tokens);

        let record = TransactionRecord {
            account: "wallet-1".into(),
            kind: "TRANSFER".into(),
            amount: Some(1_000_000_000),
            native_transfers: vec![],
            token_transfers: vec![],
            signature: None,
        };

        let candidate = classifier.classify_transaction(&record, &wallet()).await.unwrap();
        assert_eq!(candidate.usd_value, Some(50.0));
    }
}
