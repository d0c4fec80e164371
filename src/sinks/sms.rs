//! HTTP SMS gateway.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;

use super::{error::SinkError, render_context, template::TemplateService, traits::SmsGateway};
use crate::{
    config::SmsGatewayConfig,
    models::{AlertCandidate, Severity},
};

/// SMS gateway backed by an HTTP messaging API (form POST, basic auth).
pub struct HttpSmsGateway {
    config: SmsGatewayConfig,
    client: Arc<ClientWithMiddleware>,
    templates: Arc<TemplateService>,
}

impl HttpSmsGateway {
    /// Creates a gateway from its configuration and a pooled client.
    pub fn new(
        config: SmsGatewayConfig,
        client: Arc<ClientWithMiddleware>,
        templates: Arc<TemplateService>,
    ) -> Self {
        Self { config, client, templates }
    }
}

#[async_trait]
impl SmsGateway for HttpSmsGateway {
    async fn send(
        &self,
        to: &str,
        alert: &AlertCandidate,
        severity: Severity,
    ) -> Result<(), SinkError> {
        let context = render_context(alert, severity);
        let body = self.templates.render(&self.config.message.body, context)?;

        let params =
            [("To", to), ("From", self.config.from.as_str()), ("Body", body.as_str())];

        let response = self
            .client
            .post(self.config.url.clone())
            .basic_auth(&self.config.username, Some(&self.config.password))
            .form(&params)
            .send()
            .await
            .map_err(|e| SinkError::DeliveryFailed(e.to_string()))?;

        response.error_for_status().map_err(|e| SinkError::DeliveryFailed(e.to_string()))?;

        tracing::debug!(recipient = %to, "sms dispatched");
        Ok(())
    }
}
