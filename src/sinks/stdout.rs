//! Standard output sink, for development and dry runs.

use std::sync::Arc;

use async_trait::async_trait;

use super::{
    error::SinkError, render_context, template::TemplateService, traits::NotificationSink,
};
use crate::models::{AlertCandidate, NotificationMessage, Severity};

/// A sink that prints alerts to standard output.
pub struct StdoutSink {
    name: String,
    message: Option<NotificationMessage>,
    templates: Arc<TemplateService>,
}

impl StdoutSink {
    /// Creates a stdout sink. With a message config the rendered title and
    /// body are printed; without one, the raw render context is.
    pub fn new(
        name: impl Into<String>,
        message: Option<NotificationMessage>,
        templates: Arc<TemplateService>,
    ) -> Self {
        Self { name: name.into(), message, templates }
    }
}

#[async_trait]
impl NotificationSink for StdoutSink {
    async fn deliver(&self, alert: &AlertCandidate, severity: Severity) -> Result<(), SinkError> {
        let context = render_context(alert, severity);
        match &self.message {
            Some(message) => {
                let title = self.templates.render(&message.title, context.clone())?;
                let body = self.templates.render(&message.body, context)?;
                println!("[{}] {title}\n{body}", self.name);
            }
            None => {
                let raw = serde_json::to_string_pretty(&context)
                    .map_err(|e| SinkError::Internal(e.to_string()))?;
                println!("[{}] {raw}", self.name);
            }
        }
        Ok(())
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
