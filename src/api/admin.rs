//! Admin and curation dashboard API endpoints.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{load_snapshot, load_threshold, success, ApiResult, Completeness};
use crate::auth::Session;
use crate::curation::{
    aggregate_user_performance, denied_clips, eligible_clips, paginate, sort_clips,
    DenyThreshold, Page, SeasonInfo, SortOption, UserPerformance, DENIAL_LIST_PAGE_SIZE,
};
use crate::errors::AppError;
use crate::models::{Clip, Role, SiteConfig, UpdateSiteConfigRequest, RATING_ROLES};
use crate::AppState;

/// Largest archive accepted by the import endpoint.
pub const MAX_IMPORT_BYTES: usize = 512 * 1024 * 1024;

/// Denied list query parameters.
#[derive(Debug, Deserialize)]
pub struct DeniedQuery {
    #[serde(default)]
    pub sort: SortOption,
    #[serde(default = "super::default_page")]
    pub page: usize,
}

/// Eligible list query parameters.
#[derive(Debug, Deserialize)]
pub struct EligibleQuery {
    #[serde(default)]
    pub sort: SortOption,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeniedListView {
    pub deny_threshold: DenyThreshold,
    pub clips: Page<Clip>,
    #[serde(flatten)]
    pub completeness: Completeness,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibleListView {
    pub deny_threshold: DenyThreshold,
    pub clips: Vec<Clip>,
    #[serde(flatten)]
    pub completeness: Completeness,
}

/// Season progress and curator activity.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub season: SeasonInfo,
    pub deny_threshold: DenyThreshold,
    pub denied_count: usize,
    pub eligible_count: usize,
    pub performance: Vec<UserPerformance>,
    #[serde(flatten)]
    pub completeness: Completeness,
}

/// GET /api/config - Get the site configuration.
pub async fn get_config(State(state): State<AppState>) -> ApiResult<SiteConfig> {
    success(state.upstream.get_config().await?)
}

/// PUT /api/admin/config - Update the site configuration.
pub async fn update_config(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateSiteConfigRequest>,
) -> ApiResult<SiteConfig> {
    let viewer = session.require_any_role(&state.upstream, &[Role::Admin]).await?;

    let mut config = state.upstream.get_config().await?;
    if let Some(threshold) = request.deny_threshold {
        config.deny_threshold = i64::from(DenyThreshold::new(threshold)?.get());
    }
    if let Some(link) = request.latest_video_link {
        let link = link.trim().to_string();
        if !link.is_empty() && reqwest::Url::parse(&link).is_err() {
            return Err(AppError::Validation(format!(
                "latestVideoLink is not a valid URL: {}",
                link
            )));
        }
        config.latest_video_link = link;
    }

    let updated = state.upstream.update_config(&viewer.token, &config).await?;
    tracing::info!(
        "{} set deny threshold to {}",
        viewer.user.username,
        updated.deny_threshold
    );
    success(updated)
}

/// GET /api/admin/denied - List denied clips.
pub async fn list_denied(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<DeniedQuery>,
) -> ApiResult<DeniedListView> {
    let viewer = session.require_any_role(&state.upstream, &[Role::Admin]).await?;

    let threshold = load_threshold(&state).await?;
    let (clips, snapshot) = load_snapshot(&state, Some(&viewer.token)).await?;

    let mut denied = denied_clips(&clips, &snapshot.records, threshold);
    sort_clips(&mut denied, params.sort);

    success(DeniedListView {
        deny_threshold: threshold,
        clips: paginate(&denied, params.page, DENIAL_LIST_PAGE_SIZE),
        completeness: Completeness::from(&snapshot),
    })
}

/// GET /api/admin/eligible - List clips eligible for the highlight export.
pub async fn list_eligible(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<EligibleQuery>,
) -> ApiResult<EligibleListView> {
    let viewer = session.require_any_role(&state.upstream, &[Role::Admin]).await?;

    let threshold = load_threshold(&state).await?;
    let (clips, snapshot) = load_snapshot(&state, Some(&viewer.token)).await?;

    let mut eligible = eligible_clips(&clips, &snapshot.records, threshold);
    sort_clips(&mut eligible, params.sort);

    success(EligibleListView {
        deny_threshold: threshold,
        clips: eligible,
        completeness: Completeness::from(&snapshot),
    })
}

/// POST /api/admin/export - Download an archive of every eligible clip.
///
/// Refused while any rating record is missing, since a missing record could
/// hide a denial.
pub async fn export_archive(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let viewer = session.require_any_role(&state.upstream, &[Role::Admin]).await?;

    let threshold = load_threshold(&state).await?;
    let (clips, snapshot) = load_snapshot(&state, Some(&viewer.token)).await?;
    if snapshot.is_incomplete() {
        return Err(AppError::IncompleteData {
            message: format!(
                "Ratings unavailable for {} clips; export aborted",
                snapshot.failed.len()
            ),
            failed_clip_ids: snapshot.failed_clip_ids(),
        });
    }

    let clip_ids: Vec<String> = eligible_clips(&clips, &snapshot.records, threshold)
        .into_iter()
        .map(|c| c.id)
        .collect();
    if clip_ids.is_empty() {
        return Err(AppError::Validation("No clips are eligible for export".to_string()));
    }

    let archive = state.upstream.download_zip(&viewer.token, &clip_ids).await?;
    let season = SeasonInfo::current(clips.len());
    tracing::info!(
        "{} exported {} of {} clips for {}",
        viewer.user.username,
        clip_ids.len(),
        clips.len(),
        season.label
    );

    let filename = format!(
        "attachment; filename=\"highlights-{}.zip\"",
        season.label.to_lowercase().replace(' ', "-")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        archive,
    )
        .into_response())
}

/// POST /api/admin/import - Upload an archive of clips.
pub async fn import_archive(
    State(state): State<AppState>,
    session: Session,
    body: Bytes,
) -> ApiResult<()> {
    let viewer = session.require_any_role(&state.upstream, &[Role::Admin]).await?;
    if body.is_empty() {
        return Err(AppError::Validation("Archive body is empty".to_string()));
    }

    let size = body.len();
    state.upstream.upload_zip(&viewer.token, body).await?;
    tracing::info!("{} imported a {} byte archive", viewer.user.username, size);
    success(())
}

/// DELETE /api/admin/clips/:id - Delete a clip.
pub async fn delete_clip(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let viewer = session.require_any_role(&state.upstream, &[Role::Admin]).await?;
    state.upstream.delete_clip(&viewer.token, &id).await?;
    tracing::info!("{} deleted clip {}", viewer.user.username, id);
    success(())
}

/// DELETE /api/admin/clips - Delete every clip, starting a new season.
pub async fn reset_clips(State(state): State<AppState>, session: Session) -> ApiResult<()> {
    let viewer = session.require_any_role(&state.upstream, &[Role::Admin]).await?;
    state.upstream.reset_clips(&viewer.token).await?;
    tracing::warn!("{} reset all clips", viewer.user.username);
    success(())
}

/// GET /api/admin/stats - Season progress and curator performance.
pub async fn get_stats(State(state): State<AppState>, session: Session) -> ApiResult<StatsView> {
    let viewer = session.require_any_role(&state.upstream, &RATING_ROLES).await?;

    let threshold = load_threshold(&state).await?;
    let roster = state.upstream.list_users(&viewer.token).await?;
    let (clips, snapshot) = load_snapshot(&state, Some(&viewer.token)).await?;

    let denied_count = denied_clips(&clips, &snapshot.records, threshold).len();
    let performance = aggregate_user_performance(snapshot.records.values(), &roster, clips.len());

    success(StatsView {
        season: SeasonInfo::current(clips.len()),
        deny_threshold: threshold,
        denied_count,
        eligible_count: clips.len() - denied_count,
        performance,
        completeness: Completeness::from(&snapshot),
    })
}
