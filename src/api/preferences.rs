//! Preference API endpoints.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::auth::{Session, CLIENT_ID_HEADER};
use crate::errors::AppError;
use crate::models::{Preferences, UpdatePreferencesRequest};
use crate::AppState;

/// GET /api/preferences - Get the viewer's preferences.
pub async fn get_preferences(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Preferences> {
    let viewer = session.viewer(&state.upstream).await?;
    match session.owner(viewer.as_ref()) {
        Some(owner) => success(state.prefs.get_preferences(owner.as_str()).await?),
        None => success(Preferences::default()),
    }
}

/// PUT /api/preferences - Update the viewer's preferences.
pub async fn update_preferences(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdatePreferencesRequest>,
) -> ApiResult<Preferences> {
    let viewer = session.viewer(&state.upstream).await?;
    let owner = session.owner(viewer.as_ref()).ok_or_else(|| {
        AppError::Validation(format!(
            "Sign in or send an {} header to save preferences",
            CLIENT_ID_HEADER
        ))
    })?;

    success(
        state
            .prefs
            .update_preferences(owner.as_str(), &request)
            .await?,
    )
}
