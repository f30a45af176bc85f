//! Login, registration and session API endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use super::{success, ApiResult};
use crate::auth::Session;
use crate::errors::AppError;
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::AppState;

const MIN_PASSWORD_CHARS: usize = 6;

/// Token and profile returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginView {
    pub token: String,
    pub user: User,
}

/// The current viewer, if any, and the last username that logged in from
/// the caller's client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub user: Option<User>,
    pub last_username: Option<String>,
}

/// POST /api/session/login - Log in against the clip API.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginView> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let issued = state.upstream.login(&request).await?;
    let viewer = Session::with_token(issued.token.clone())
        .require_viewer(&state.upstream)
        .await?;

    if let Some(owner) = session.client_owner() {
        if let Err(e) = state
            .prefs
            .set_last_username(owner.as_str(), &viewer.user.username)
            .await
        {
            tracing::warn!("Failed to remember last username: {}", e);
        }
    }
    tracing::info!("{} logged in", viewer.user.username);

    success(LoginView {
        token: issued.token,
        user: viewer.user,
    })
}

/// POST /api/session/register - Register a new account.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<User> {
    if request.username.trim().is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    if request.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }

    success(state.upstream.register(&request).await?)
}

/// GET /api/session - Get the current viewer.
pub async fn get_session(State(state): State<AppState>, session: Session) -> ApiResult<SessionView> {
    let viewer = session.viewer(&state.upstream).await?;
    let last_username = match session.client_owner() {
        Some(owner) => state.prefs.last_username(owner.as_str()).await?,
        None => None,
    };

    success(SessionView {
        user: viewer.map(|v| v.user),
        last_username,
    })
}
