//! Webhook channel sink.
//!
//! Delivers alerts as embed payloads to a channel webhook URL, with
//! optional HMAC-SHA256 payload signing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest_middleware::ClientWithMiddleware;
use serde_json::json;
use sha2::Sha256;
use url::Url;

use super::{
    error::SinkError, render_context, template::TemplateService, traits::NotificationSink,
};
use crate::{
    config::ChannelConfig,
    models::{AlertCandidate, NotificationMessage, Severity},
};

type HmacSha256 = Hmac<Sha256>;

/// A webhook-backed channel sink.
pub struct WebhookSink {
    name: String,
    url: Url,
    message: NotificationMessage,
    secret: Option<String>,
    client: Arc<ClientWithMiddleware>,
    templates: Arc<TemplateService>,
}

impl WebhookSink {
    /// Creates a sink from a channel configuration and a pooled client.
    /// Fails when the channel has no delivery URL.
    pub fn new(
        config: &ChannelConfig,
        client: Arc<ClientWithMiddleware>,
        templates: Arc<TemplateService>,
    ) -> Result<Self, SinkError> {
        let url = config.url.clone().ok_or_else(|| {
            SinkError::ConfigError(format!("channel '{}' has no webhook url", config.name))
        })?;
        Ok(Self {
            name: config.name.clone(),
            url,
            message: config.message.clone(),
            secret: config.secret.clone(),
            client,
            templates,
        })
    }

    /// Signs the payload with HMAC-SHA256 over `payload || timestamp`.
    /// Returns the hex signature and the timestamp used.
    fn sign_payload(
        secret: &str,
        payload: &serde_json::Value,
    ) -> Result<(String, String), SinkError> {
        // `new_from_slice` accepts an empty key, so reject it explicitly.
        if secret.is_empty() {
            return Err(SinkError::ConfigError("signing secret cannot be empty".to_string()));
        }

        let timestamp = Utc::now().timestamp_millis();

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| SinkError::ConfigError(format!("invalid signing secret: {e}")))?;

        let serialized = serde_json::to_string(payload)
            .map_err(|e| SinkError::Internal(format!("failed to serialize payload: {e}")))?;
        mac.update(format!("{serialized}{timestamp}").as_bytes());

        let signature = hex::encode(mac.finalize().into_bytes());
        Ok((signature, timestamp.to_string()))
    }

    fn build_payload(title: &str, body: &str, severity: Severity) -> serde_json::Value {
        json!({
            "embeds": [{
                "title": title,
                "description": body,
                "color": severity.embed_color(),
            }]
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn deliver(&self, alert: &AlertCandidate, severity: Severity) -> Result<(), SinkError> {
        let context = render_context(alert, severity);
        let title = self.templates.render(&self.message.title, context.clone())?;
        let body = self.templates.render(&self.message.body, context)?;
        let payload = Self::build_payload(&title, &body, severity);

        let mut request = self.client.post(self.url.clone());
        if let Some(secret) = &self.secret {
            let (signature, timestamp) = Self::sign_payload(secret, &payload)?;
            request = request.header("x-signature", signature).header("x-timestamp", timestamp);
        }

        let response = request
            .json(&payload)
            .send()
            .await
            .map_err(|e| SinkError::DeliveryFailed(e.to_string()))?;

        response.error_for_status().map_err(|e| SinkError::DeliveryFailed(e.to_string()))?;

        tracing::debug!(channel = %self.name, "webhook notification delivered");
        Ok(())
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_severity_color() {
        let info = WebhookSink::build_payload("t", "b", Severity::Info);
        let critical = WebhookSink::build_payload("t", "b", Severity::Critical);

        assert_eq!(info["embeds"][0]["color"], Severity::Info.embed_color());
        assert_eq!(critical["embeds"][0]["color"], Severity::Critical.embed_color());
        assert_eq!(info["embeds"][0]["title"], "t");
        assert_eq!(info["embeds"][0]["description"], "b");
    }

    #[test]
    fn signing_rejects_empty_secret() {
        let payload = json!({"a": 1});
        let result = WebhookSink::sign_payload("", &payload);
        assert!(matches!(result, Err(SinkError::ConfigError(_))));
    }

    #[test]
    fn signature_depends_on_payload() {
        let (sig_a, _) = WebhookSink::sign_payload("secret", &json!({"a": 1})).unwrap();
        let (sig_b, _) = WebhookSink::sign_payload("secret", &json!({"a": 2})).unwrap();

        assert_eq!(sig_a.len(), 64, "hex-encoded SHA-256 HMAC");
        assert_ne!(sig_a, sig_b);
    }
}
