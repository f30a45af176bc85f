//! Per-clip chat messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message on a clip's side channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(alias = "_id")]
    pub id: String,
    pub clip_id: String,
    #[serde(alias = "username")]
    pub user: String,
    #[serde(alias = "message")]
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for posting a chat message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    pub text: String,
}
