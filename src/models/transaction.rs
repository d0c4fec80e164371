//! Webhook payload types for the transaction ingestion path.
//!
//! The wire format follows the chain-indexing provider's enhanced webhook
//! contract: an ordered list of transaction records, each carrying optional
//! native and token transfer breakdowns.

use serde::{Deserialize, Serialize};

/// One transaction record from the webhook payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// The tracked account this record was emitted for.
    pub account: String,

    /// Provider-assigned transaction type label (e.g. "TRANSFER", "SWAP").
    #[serde(rename = "type")]
    pub kind: String,

    /// Record-level native amount in lamports, when the provider supplies
    /// one instead of an itemized transfer list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,

    /// Itemized native transfers within the transaction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub native_transfers: Vec<NativeTransfer>,

    /// Itemized token transfers within the transaction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub token_transfers: Vec<TokenTransfer>,

    /// The transaction signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// A native-asset movement within a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeTransfer {
    /// Amount moved, in lamports.
    pub amount: u64,

    /// Sending account, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_user_account: Option<String>,

    /// Receiving account, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_user_account: Option<String>,
}

/// A token movement within a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    /// Mint address of the transferred token.
    pub mint: String,

    /// Human-readable token name.
    pub token_name: String,

    /// Token ticker symbol. Matched exactly against the stable-asset set.
    pub token_symbol: String,

    /// Transferred amount in whole-token units.
    pub token_amount: f64,

    /// USD price of one token at transfer time, when the provider knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_price: Option<f64>,
}
