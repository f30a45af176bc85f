//! Clip viewer API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{load_snapshot, load_threshold, success, ApiResult, Completeness};
use crate::auth::Session;
use crate::curation::{
    paginate, partition_by_viewer, sort_clips, Page, RatingSummary, SortOption,
    CLIP_VIEWER_PAGE_SIZE,
};
use crate::models::{Clip, Preferences, RateClipRequest, RatedFilter, RATING_ROLES};
use crate::upstream::RatingSnapshot;
use crate::AppState;

/// Clip list query parameters.
#[derive(Debug, Deserialize)]
pub struct ClipListQuery {
    #[serde(default)]
    pub sort: SortOption,
    #[serde(default = "super::default_page")]
    pub page: usize,
    /// Switches the stored rated-filter toggle when present.
    #[serde(default)]
    pub filter: Option<RatedFilter>,
}

/// One page of the viewer's rated or unrated clips.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipListView {
    pub filter: RatedFilter,
    pub sort: SortOption,
    pub clips: Page<Clip>,
    pub rated_count: usize,
    pub unrated_count: usize,
    #[serde(flatten)]
    pub completeness: Completeness,
}

/// A single clip, with rating data for viewers allowed to see it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipDetail {
    pub clip: Clip,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings: Option<RatingSummary>,
}

/// GET /api/clips - List the viewer's rated or unrated clips.
pub async fn list_clips(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ClipListQuery>,
) -> ApiResult<ClipListView> {
    let viewer = session.viewer(&state.upstream).await?;
    let owner = session.owner(viewer.as_ref());

    let filter = match (params.filter, &owner) {
        (Some(filter), Some(owner)) => {
            state.prefs.set_rated_filter(owner.as_str(), filter).await?;
            filter
        }
        (Some(filter), None) => filter,
        (None, Some(owner)) => state.prefs.get_preferences(owner.as_str()).await?.rated_filter,
        (None, None) => Preferences::default().rated_filter,
    };

    let can_rate = viewer.as_ref().is_some_and(|v| v.user.can_rate());
    let (clips, snapshot) = if can_rate {
        load_snapshot(&state, session.token()).await?
    } else {
        (state.upstream.list_clips().await?, RatingSnapshot::default())
    };

    let partition = partition_by_viewer(clips, &snapshot.records, viewer.as_ref().map(|v| &v.user));
    let rated_count = partition.rated.len();
    let unrated_count = partition.unrated.len();

    let mut selected = match filter {
        RatedFilter::Rated => partition.rated,
        RatedFilter::Unrated => partition.unrated,
    };
    sort_clips(&mut selected, params.sort);

    success(ClipListView {
        filter,
        sort: params.sort,
        clips: paginate(&selected, params.page, CLIP_VIEWER_PAGE_SIZE),
        rated_count,
        unrated_count,
        completeness: Completeness::from(&snapshot),
    })
}

/// GET /api/clips/:id - Get a single clip.
pub async fn get_clip(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<ClipDetail> {
    let viewer = session.viewer(&state.upstream).await?;
    let clip = state.upstream.get_clip(&id).await?;

    let ratings = match viewer.filter(|v| v.user.can_rate()) {
        Some(viewer) => {
            let threshold = load_threshold(&state).await?;
            let record = state
                .upstream
                .fetch_clip_ratings(Some(&viewer.token), &id)
                .await?;
            Some(record.summarize(&viewer.user.id, threshold))
        }
        None => None,
    };

    success(ClipDetail { clip, ratings })
}

/// POST /api/clips/:id/upvote - Upvote a clip.
pub async fn upvote_clip(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Clip> {
    success(state.upstream.upvote(&id).await?)
}

/// POST /api/clips/:id/downvote - Downvote a clip.
pub async fn downvote_clip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Clip> {
    success(state.upstream.downvote(&id).await?)
}

/// POST /api/clips/:id/rate - Rate or deny a clip.
pub async fn rate_clip(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(request): Json<RateClipRequest>,
) -> ApiResult<RatingSummary> {
    let viewer = session
        .require_any_role(&state.upstream, &RATING_ROLES)
        .await?;

    state
        .upstream
        .rate_clip(&viewer.token, &id, request.rating)
        .await?;
    tracing::info!("{} rated clip {} as {}", viewer.user.username, id, request.rating);

    let threshold = load_threshold(&state).await?;
    let record = state
        .upstream
        .fetch_clip_ratings(Some(&viewer.token), &id)
        .await?;

    success(record.summarize(&viewer.user.id, threshold))
}
