//! Token metadata and market-metric types returned by the data provider.

use serde::{Deserialize, Serialize};

/// Core metadata for a known token. A successful lookup is what confirms a
/// candidate address as a real token reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Mint address of the token.
    pub mint: String,

    /// Human-readable token name.
    pub name: String,

    /// Token ticker symbol.
    pub symbol: String,
}

/// Live market metrics for a token, attached to transaction alerts as
/// enrichment. Every field is optional: a partial provider response
/// degrades the snapshot instead of dropping it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMarketSnapshot {
    /// Fully diluted market capitalization, USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap_usd: Option<f64>,

    /// Available liquidity, USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity_usd: Option<f64>,

    /// Number of holder accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder_count: Option<u64>,

    /// Price change over the short horizon (1h), percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change_short_pct: Option<f64>,

    /// Price change over the long horizon (24h), percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change_long_pct: Option<f64>,

    /// Buy-side trade count over the reporting window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_count: Option<u64>,

    /// Sell-side trade count over the reporting window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_count: Option<u64>,

    /// Ratio of buy to sell volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_sell_ratio: Option<f64>,

    /// Distinct wallets active over the reporting window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_wallets: Option<u64>,
}
