//! Clip model matching the remote clip API payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment attached to a clip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClipComment {
    #[serde(alias = "_id", default)]
    pub id: String,
    #[serde(alias = "username", default)]
    pub author: String,
    #[serde(alias = "comment", default)]
    pub text: String,
    #[serde(alias = "createdAt", default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A user-submitted video clip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub streamer: String,
    #[serde(default)]
    pub title: String,
    /// Link to the clip on its source platform.
    #[serde(default)]
    pub link: String,
    /// Playable media URL.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub submitter: String,
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub downvotes: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<ClipComment>,
}

impl Clip {
    /// Upvote-to-downvote ratio, counting zero downvotes as one.
    pub fn ratio(&self) -> f64 {
        self.upvotes as f64 / self.downvotes.max(1) as f64
    }
}
