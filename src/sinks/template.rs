//! Message template rendering with minijinja.

use minijinja::Environment;
use thiserror::Error;

/// A service for rendering notification templates.
pub struct TemplateService {
    env: Environment<'static>,
}

/// Error type for the TemplateService.
#[derive(Debug, Error)]
pub enum TemplateServiceError {
    /// An error occurred while rendering the template.
    #[error("failed to render template")]
    RenderError(#[from] minijinja::Error),
}

impl Default for TemplateService {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateService {
    /// Creates a new instance with strict undefined handling and the
    /// domain filters registered.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);

        env.add_filter("usd", filters::usd);
        env.add_filter("shortaddr", filters::shortaddr);

        Self { env }
    }

    /// Renders a template with the given context.
    pub fn render(
        &self,
        template_str: &str,
        context: serde_json::Value,
    ) -> Result<String, TemplateServiceError> {
        match self.env.render_str(template_str, context) {
            Ok(rendered) => Ok(rendered),
            Err(e) => {
                tracing::warn!("failed to render template '{}': {}", template_str, e);
                Err(TemplateServiceError::RenderError(e))
            }
        }
    }
}

mod filters {
    use minijinja::{Error, ErrorKind, value::Value};

    /// Formats a numeric value as a USD amount with two decimals.
    pub fn usd(value: Value) -> Result<String, Error> {
        let s = value.to_string();
        let amount: f64 = s.parse().map_err(|_| {
            Error::new(ErrorKind::InvalidOperation, format!("cannot format '{s}' as USD"))
        })?;
        Ok(format!("${amount:.2}"))
    }

    /// Abbreviates a chain address to its first and last four characters.
    pub fn shortaddr(value: Value) -> Result<String, Error> {
        let s = value.to_string();
        if s.len() <= 12 {
            return Ok(s);
        }
        match (s.get(..4), s.get(s.len() - 4..)) {
            (Some(head), Some(tail)) => Ok(format!("{head}…{tail}")),
            _ => Ok(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_template_with_context() {
        let service = TemplateService::new();
        let result = service
            .render(
                "{{ alert.kind }} from {{ source_id }}",
                json!({ "alert": { "kind": "token-mention" }, "source_id": "alice" }),
            )
            .unwrap();
        assert_eq!(result, "token-mention from alice");
    }

    #[test]
    fn usd_filter_formats_two_decimals() {
        let service = TemplateService::new();
        let result = service.render("{{ value | usd }}", json!({ "value": 1234.5 })).unwrap();
        assert_eq!(result, "$1234.50");
    }

    #[test]
    fn shortaddr_filter_abbreviates() {
        let service = TemplateService::new();
        let result = service
            .render(
                "{{ mint | shortaddr }}",
                json!({ "mint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v" }),
            )
            .unwrap();
        assert_eq!(result, "EPjF…Dt1v");
    }

    #[test]
    fn shortaddr_leaves_short_values_alone() {
        let service = TemplateService::new();
        let result = service.render("{{ v | shortaddr }}", json!({ "v": "abcdef" })).unwrap();
        assert_eq!(result, "abcdef");
    }

    #[test]
    fn strict_mode_rejects_unknown_variables() {
        let service = TemplateService::new();
        let result = service.render("{{ missing }}", json!({}));
        assert!(matches!(result, Err(TemplateServiceError::RenderError(_))));
    }

    #[test]
    fn invalid_template_fails() {
        let service = TemplateService::new();
        let result = service.render("hello {{ name", json!({ "name": "world" }));
        assert!(result.is_err());
    }
}
