//! HTTP implementation of the token data provider.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use url::Url;

use super::{ensure_success, error::ProviderError, traits::TokenDataProvider};
use crate::models::{TokenMarketSnapshot, TokenMetadata};

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Deserialize)]
struct NativePriceResponse {
    usd: f64,
}

/// Token data client backed by the market-data provider's REST API.
pub struct HttpTokenDataProvider {
    base_url: Url,
    api_key: Option<String>,
    client: Arc<ClientWithMiddleware>,
}

impl HttpTokenDataProvider {
    /// Creates a provider against the given API base URL.
    pub fn new(base_url: Url, api_key: Option<String>, client: Arc<ClientWithMiddleware>) -> Self {
        Self { base_url, api_key, client }
    }

    fn get(&self, url: Url) -> reqwest_middleware::RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        request
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::new(format!("invalid token data url: {e}")))
    }
}

#[async_trait]
impl TokenDataProvider for HttpTokenDataProvider {
    async fn token_metadata(&self, address: &str) -> Result<Option<TokenMetadata>, ProviderError> {
        let url = self.endpoint(&format!("tokens/{address}"))?;
        let response = self.get(url).send().await.map_err(ProviderError::from)?;

        // An unknown address is an expected outcome, not a failure: the
        // permissive extraction heuristic produces plenty of these.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = ensure_success(&format!("token metadata for {address}"), response)?;
        let metadata: TokenMetadata = response.json().await.map_err(ProviderError::from)?;
        Ok(Some(metadata))
    }

    async fn native_price_usd(&self) -> Result<f64, ProviderError> {
        let url = self.endpoint("prices/native")?;
        let response = self.get(url).send().await.map_err(ProviderError::from)?;
        let response = ensure_success("native price lookup", response)?;

        let price: NativePriceResponse = response.json().await.map_err(ProviderError::from)?;
        Ok(price.usd)
    }

    async fn market_snapshot(&self, mint: &str) -> Result<TokenMarketSnapshot, ProviderError> {
        let url = self.endpoint(&format!("tokens/{mint}/market"))?;
        let response = self.get(url).send().await.map_err(ProviderError::from)?;
        let response = ensure_success(&format!("market snapshot for {mint}"), response)?;

        let snapshot: TokenMarketSnapshot = response.json().await.map_err(ProviderError::from)?;
        Ok(snapshot)
    }
}
