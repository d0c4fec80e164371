//! This module defines the raw social post shape consumed by the classifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw post fetched from the social feed provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialPost {
    /// Provider-assigned post id. Used for deduplication.
    pub id: String,

    /// Id of the account that authored the post.
    pub author_id: String,

    /// The full post text.
    pub text: String,

    /// Post creation time, when the provider supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
