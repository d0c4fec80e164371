//! HTTP implementation of the social feed provider.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use url::Url;

use super::{ensure_success, error::ProviderError, traits::SocialFeedProvider};
use crate::models::SocialPost;

#[derive(Debug, Deserialize)]
struct TimelineResponse {
    #[serde(default)]
    data: Vec<SocialPost>,
}

/// Social feed client backed by the provider's REST API.
pub struct HttpSocialFeedProvider {
    base_url: Url,
    bearer_token: Option<String>,
    client: Arc<ClientWithMiddleware>,
}

impl HttpSocialFeedProvider {
    /// Creates a provider against the given API base URL.
    pub fn new(
        base_url: Url,
        bearer_token: Option<String>,
        client: Arc<ClientWithMiddleware>,
    ) -> Self {
        Self { base_url, bearer_token, client }
    }
}

#[async_trait]
impl SocialFeedProvider for HttpSocialFeedProvider {
    async fn fetch_timeline<'a>(
        &self,
        account_id: &str,
        since: Option<&'a str>,
    ) -> Result<Vec<SocialPost>, ProviderError> {
        let url = self
            .base_url
            .join(&format!("accounts/{account_id}/posts"))
            .map_err(|e| ProviderError::new(format!("invalid feed url: {e}")))?;

        let mut request = self.client.get(url);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        if let Some(since) = since {
            request = request.query(&[("since_id", since)]);
        }

        let response = request.send().await.map_err(ProviderError::from)?;
        let response = ensure_success(&format!("feed timeline for {account_id}"), response)?;

        let timeline: TimelineResponse = response.json().await.map_err(ProviderError::from)?;
        Ok(timeline.data)
    }
}
