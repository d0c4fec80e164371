//! The transaction webhook receiver.
//!
//! A small axum server: `POST /webhooks/transactions` takes the
//! chain-indexing provider's payload (an ordered list of transaction
//! records), and `GET /health` reports liveness. Deliveries are guarded by
//! a shared token in the `Authorization` header.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::{
    classifier::EventClassifier, models::TransactionRecord, router::AlertRouter,
    state::SourceRegistry,
};

/// Shared state for the webhook server handlers.
#[derive(Clone)]
pub struct WebhookServerState {
    /// The event classifier fed by the transaction path.
    pub classifier: Arc<EventClassifier>,
    /// The alert router.
    pub router: Arc<AlertRouter>,
    /// The source registry, used to match records to tracked wallets.
    pub registry: Arc<SourceRegistry>,
    /// Expected `Authorization` header value, when deliveries are
    /// authenticated.
    pub webhook_token: Option<String>,
}

/// Builds the webhook router.
pub fn app(state: WebhookServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhooks/transactions", post(receive_transactions))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn receive_transactions(
    State(state): State<WebhookServerState>,
    headers: HeaderMap,
    Json(records): Json<Vec<TransactionRecord>>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    if let Some(expected) = &state.webhook_token {
        let provided = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    let mut alerts = 0usize;
    for record in &records {
        let Some(wallet) = state.registry.wallet(&record.account) else {
            tracing::debug!(account = %record.account, "webhook record for untracked account");
            continue;
        };
        if let Some(alert) = state.classifier.classify_transaction(record, &wallet).await {
            state.router.route(&alert).await;
            alerts += 1;
        }
    }

    tracing::debug!(received = records.len(), alerts, "webhook batch processed");
    Ok(Json(json!({ "received": records.len(), "alerts": alerts })))
}

/// Binds the listener and serves until cancelled.
pub async fn serve(
    state: WebhookServerState,
    listen_address: &str,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_address).await?;
    tracing::info!(address = %listen_address, "webhook server listening");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}
