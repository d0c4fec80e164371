//! Provider trait seams.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::error::ProviderError;
use crate::models::{SocialPost, TokenMarketSnapshot, TokenMetadata};

/// A source of social posts for monitored accounts.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SocialFeedProvider: Send + Sync {
    /// Fetches posts for an account newer than the given cursor, oldest
    /// first. A `None` cursor fetches the most recent page.
    async fn fetch_timeline<'a>(
        &self,
        account_id: &str,
        since: Option<&'a str>,
    ) -> Result<Vec<SocialPost>, ProviderError>;
}

/// A source of token metadata, reference prices and market metrics.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenDataProvider: Send + Sync {
    /// Looks up metadata for a candidate token address. `Ok(None)` means
    /// the address is not a known token; the permissive extraction
    /// heuristic relies on this to filter its false positives.
    async fn token_metadata(&self, address: &str) -> Result<Option<TokenMetadata>, ProviderError>;

    /// Current USD reference price of the native asset.
    async fn native_price_usd(&self) -> Result<f64, ProviderError>;

    /// Live market metrics for a token.
    async fn market_snapshot(&self, mint: &str) -> Result<TokenMarketSnapshot, ProviderError>;
}
