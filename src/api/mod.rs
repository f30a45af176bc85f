//! REST API module.
//!
//! Each handler fetches the remote state it needs, runs it through the shared
//! curation pipeline, and returns the derived view.

mod admin;
mod clips;
mod messages;
mod preferences;
mod search;
mod session;
mod users;

pub use admin::*;
pub use clips::*;
pub use messages::*;
pub use preferences::*;
pub use search::*;
pub use session::*;
pub use users::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::curation::DenyThreshold;
use crate::errors::AppError;
use crate::models::Clip;
use crate::upstream::RatingSnapshot;
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// 1-based page query parameter.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

/// Which clips, if any, lack rating data in a response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completeness {
    pub incomplete: bool,
    pub failed_clip_ids: Vec<String>,
}

impl From<&RatingSnapshot> for Completeness {
    fn from(snapshot: &RatingSnapshot) -> Self {
        Self {
            incomplete: snapshot.is_incomplete(),
            failed_clip_ids: snapshot.failed_clip_ids(),
        }
    }
}

/// Fetch every clip and its rating record.
async fn load_snapshot(
    state: &AppState,
    token: Option<&str>,
) -> Result<(Vec<Clip>, RatingSnapshot), AppError> {
    let clips = state.upstream.list_clips().await?;
    let ids: Vec<String> = clips.iter().map(|c| c.id.clone()).collect();
    let snapshot = state
        .upstream
        .fetch_ratings(token, ids, state.config.rating_concurrency)
        .await;
    Ok((clips, snapshot))
}

/// Fetch the site configuration and validate its deny threshold.
async fn load_threshold(state: &AppState) -> Result<DenyThreshold, AppError> {
    let config = state.upstream.get_config().await?;
    DenyThreshold::new(config.deny_threshold).map_err(|e| {
        tracing::error!("Clip API sent an unusable configuration: {}", e);
        AppError::Upstream(format!("Malformed site configuration: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::handler::Handler;

    fn assert_handler<H, T>(_: H)
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
    }

    #[test]
    fn test_snapshot_views_are_handlers() {
        assert_handler(list_clips);
        assert_handler(list_denied);
        assert_handler(list_eligible);
        assert_handler(get_stats);
        assert_handler(export_archive);
    }
}
