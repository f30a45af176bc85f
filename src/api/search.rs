//! Search API endpoints.

use std::collections::HashMap;

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::auth::Session;
use crate::errors::AppError;
use crate::models::Clip;
use crate::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Search query string.
    pub q: String,
    /// Maximum number of results (default: 20).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

/// Search result with clips and metadata.
///
/// `total` counts every matching clip, not just this page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub recent_searches: Vec<String>,
}

/// Single search result item.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    pub clip: Clip,
    pub score: f32,
}

/// Maximum number of search results allowed.
const MAX_SEARCH_LIMIT: usize = 100;

/// Deepest result offset a client may page to.
const MAX_SEARCH_OFFSET: usize = 1000;

/// GET /api/search - Search the current clips.
pub async fn search_clips(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SearchQuery>,
) -> ApiResult<SearchResponse> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(AppError::Validation("Search query is required".to_string()));
    }

    if params.offset > MAX_SEARCH_OFFSET {
        return Err(AppError::Validation(format!(
            "offset must be at most {}",
            MAX_SEARCH_OFFSET
        )));
    }
    let limit = params.limit.min(MAX_SEARCH_LIMIT);

    let viewer = session.viewer(&state.upstream).await?;
    let clips = state.upstream.list_clips().await?;
    if state.search.refresh(&clips).await? {
        tracing::debug!("Search index refreshed with {} clips", clips.len());
    }

    let hits = state.search.search(query, limit, params.offset)?;

    let mut by_id: HashMap<String, Clip> = clips.into_iter().map(|c| (c.id.clone(), c)).collect();
    let results: Vec<SearchResultItem> = hits
        .results
        .into_iter()
        .filter_map(|hit| {
            by_id.remove(&hit.clip_id).map(|clip| SearchResultItem {
                clip,
                score: hit.score,
            })
        })
        .collect();

    let recent_searches = match session.owner(viewer.as_ref()) {
        Some(owner) => state.prefs.record_search(owner.as_str(), query).await?,
        None => Vec::new(),
    };

    success(SearchResponse {
        total: hits.total,
        results,
        limit,
        offset: params.offset,
        recent_searches,
    })
}
