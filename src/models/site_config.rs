//! Site-wide configuration held by the remote API.

use serde::{Deserialize, Serialize};

/// Singleton configuration fetched from `/admin/config`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    /// Minimum number of distinct deny votes that disqualifies a clip.
    pub deny_threshold: i64,
    #[serde(default)]
    pub latest_video_link: String,
}

/// Request body for updating the site configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSiteConfigRequest {
    #[serde(default)]
    pub deny_threshold: Option<i64>,
    #[serde(default)]
    pub latest_video_link: Option<String>,
}
