//! Concurrent per-clip rating fetches with a partial-success join.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use super::{RatingPayload, UpstreamClient};
use crate::curation::ClipRatings;
use crate::errors::AppError;
use crate::models::RatingBucket;

/// A clip whose rating record could not be fetched.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FailedRatingFetch {
    pub clip_id: String,
    pub reason: String,
}

/// Rating records for a clip collection, plus the clips that failed.
#[derive(Debug, Clone, Default)]
pub struct RatingSnapshot {
    pub records: HashMap<String, ClipRatings>,
    pub failed: Vec<FailedRatingFetch>,
}

impl RatingSnapshot {
    pub fn is_incomplete(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn failed_clip_ids(&self) -> Vec<String> {
        self.failed.iter().map(|f| f.clip_id.clone()).collect()
    }
}

/// Validate a raw rating payload. A `ratingCounts` that is not an array is rejected.
pub fn parse_rating_payload(
    clip_id: &str,
    payload: RatingPayload,
) -> Result<ClipRatings, AppError> {
    match payload.rating_counts {
        serde_json::Value::Array(_) => {
            let buckets: Vec<RatingBucket> = serde_json::from_value(payload.rating_counts)
                .map_err(|e| {
                    AppError::Upstream(format!("Malformed rating bucket for clip {}: {}", clip_id, e))
                })?;
            Ok(ClipRatings::new(clip_id, buckets))
        }
        other => Err(AppError::Upstream(format!(
            "ratingCounts for clip {} is not an array: {}",
            clip_id, other
        ))),
    }
}

impl UpstreamClient {
    /// Fetch and validate the rating record of one clip.
    pub async fn fetch_clip_ratings(
        &self,
        token: Option<&str>,
        clip_id: &str,
    ) -> Result<ClipRatings, AppError> {
        let payload = self.get_ratings(token, clip_id).await?;
        parse_rating_payload(clip_id, payload)
    }

    /// Fetch rating records for many clips, at most `concurrency` at a time.
    ///
    /// Failures do not abort the join; they are logged and reported in the
    /// snapshot so callers can aggregate over the clips that succeeded.
    pub async fn fetch_ratings(
        &self,
        token: Option<&str>,
        clip_ids: Vec<String>,
        concurrency: usize,
    ) -> RatingSnapshot {
        let results: Vec<(String, Result<ClipRatings, AppError>)> = stream::iter(clip_ids)
            .map(|clip_id| async move {
                let result = self.fetch_clip_ratings(token, &clip_id).await;
                (clip_id, result)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        let mut snapshot = RatingSnapshot::default();
        for (clip_id, result) in results {
            match result {
                Ok(record) => {
                    snapshot.records.insert(clip_id, record);
                }
                Err(e) => {
                    tracing::warn!("Skipping ratings for clip {}: {}", clip_id, e);
                    snapshot.failed.push(FailedRatingFetch {
                        clip_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        snapshot.failed.sort_by(|a, b| a.clip_id.cmp(&b.clip_id));
        tracing::debug!(
            "Fetched ratings for {} clips ({} failed)",
            snapshot.records.len(),
            snapshot.failed.len()
        );
        snapshot
    }
}
