//! Per-clip rating aggregation.

use serde::Serialize;

use super::denial::{is_denied, DenyThreshold};
use crate::errors::AppError;
use crate::models::{RatingBucket, RatingLabel};

/// The rating buckets collected for one clip.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClipRatings {
    pub clip_id: String,
    pub buckets: Vec<RatingBucket>,
}

impl ClipRatings {
    pub fn new(clip_id: impl Into<String>, buckets: Vec<RatingBucket>) -> Self {
        Self {
            clip_id: clip_id.into(),
            buckets,
        }
    }

    /// Whether the given user appears in any bucket of this clip.
    pub fn has_user_rated(&self, user_id: &str) -> bool {
        self.buckets
            .iter()
            .any(|b| b.users.iter().any(|u| u.user_id == user_id))
    }

    /// The bucket with the highest count. Ties keep the earliest bucket.
    pub fn majority_rating(&self) -> Result<&RatingBucket, AppError> {
        let mut buckets = self.buckets.iter();
        let first = buckets
            .next()
            .ok_or_else(|| AppError::EmptyRatingSet(self.clip_id.clone()))?;

        Ok(buckets.fold(first, |best, b| if b.count > best.count { b } else { best }))
    }

    pub fn is_denied(&self, threshold: DenyThreshold) -> bool {
        is_denied(&self.buckets, threshold)
    }

    /// Build the view of this clip's ratings for a privileged viewer.
    pub fn summarize(&self, viewer_id: &str, threshold: DenyThreshold) -> RatingSummary {
        RatingSummary {
            clip_id: self.clip_id.clone(),
            buckets: self.buckets.clone(),
            majority: self.majority_rating().ok().map(|b| b.rating),
            denied: self.is_denied(threshold),
            viewer_has_rated: self.has_user_rated(viewer_id),
        }
    }
}

/// Rating data as shown in the clip viewer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub clip_id: String,
    pub buckets: Vec<RatingBucket>,
    /// `None` when nobody has rated the clip yet.
    pub majority: Option<RatingLabel>,
    pub denied: bool,
    pub viewer_has_rated: bool,
}
