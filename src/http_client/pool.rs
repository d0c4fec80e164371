//! A shared pool of HTTP clients, keyed by retry policy.

use std::{collections::HashMap, sync::Arc, time::Duration};

use reqwest::Client as ReqwestClient;
use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;
use tokio::sync::RwLock;

use super::create_retrying_client;
use crate::config::HttpRetryConfig;

/// Errors that can occur within the `HttpClientPool`.
#[derive(Debug, Error)]
pub enum HttpClientPoolError {
    /// The underlying `reqwest::Client` could not be built.
    #[error("failed to build HTTP client: {0}")]
    BuildError(String),
}

/// A pool of retrying HTTP clients shared across the application.
///
/// Clients are keyed by their retry policy so that every consumer with the
/// same policy shares one client, and therefore one connection pool.
pub struct HttpClientPool {
    clients: Arc<RwLock<HashMap<HttpRetryConfig, Arc<ClientWithMiddleware>>>>,
}

impl HttpClientPool {
    /// Creates a new, empty pool.
    pub fn new() -> Self {
        Self { clients: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Returns the client for the given retry policy, creating it on first
    /// use. Uses double-checked locking so the common path is a read lock.
    pub async fn get_or_create(
        &self,
        retry_policy: &HttpRetryConfig,
    ) -> Result<Arc<ClientWithMiddleware>, HttpClientPoolError> {
        if let Some(client) = self.clients.read().await.get(retry_policy) {
            return Ok(client.clone());
        }

        let mut clients = self.clients.write().await;
        // Another task may have created the client while we waited for the
        // write lock.
        if let Some(client) = clients.get(retry_policy) {
            return Ok(client.clone());
        }

        let base_client = ReqwestClient::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| HttpClientPoolError::BuildError(e.to_string()))?;

        let new_client = Arc::new(create_retrying_client(retry_policy, base_client));
        clients.insert(retry_policy.clone(), new_client.clone());

        Ok(new_client)
    }

    /// Returns the number of distinct clients created so far.
    #[cfg(test)]
    pub async fn active_client_count(&self) -> usize {
        self.clients.read().await.len()
    }
}

impl Default for HttpClientPool {
    fn default() -> Self {
        Self::new()
    }
}
