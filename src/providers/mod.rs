//! External API boundaries: the social feed and the token data service.
//!
//! Each provider is a narrow async trait so the pipeline can be exercised
//! with mocks; the HTTP implementations are deliberately thin.

pub mod error;
pub mod feed;
pub mod market;
pub mod traits;

pub use error::ProviderError;
pub use feed::HttpSocialFeedProvider;
pub use market::HttpTokenDataProvider;
pub use traits::{SocialFeedProvider, TokenDataProvider};

use chrono::{DateTime, Utc};

/// Extracts a quota reset hint from provider response headers.
///
/// Checks `x-rate-limit-reset` (epoch seconds) first, then a numeric
/// `Retry-After` delta.
pub(crate) fn rate_limit_reset_hint(headers: &reqwest::header::HeaderMap) -> Option<DateTime<Utc>> {
    if let Some(epoch) = headers
        .get("x-rate-limit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
    {
        return DateTime::from_timestamp(epoch, 0);
    }

    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        .map(|secs| Utc::now() + chrono::Duration::seconds(secs))
}

/// Maps an unsuccessful provider response to a `ProviderError`, preserving
/// the status shapes the scheduler's failure classification inspects.
pub(crate) fn ensure_success(
    context: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.as_u16() == 429 {
        let mut error =
            ProviderError::new(format!("{context}: rate limit exceeded")).with_status(429);
        if let Some(reset) = rate_limit_reset_hint(response.headers()) {
            error = error.with_retry_after(reset);
        }
        return Err(error);
    }
    if !status.is_success() {
        return Err(
            ProviderError::new(format!("{context}: request failed with status {status}"))
                .with_status(status.as_u16()),
        );
    }
    Ok(response)
}
