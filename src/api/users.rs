//! Account administration API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{success, ApiResult, PageQuery};
use crate::auth::Session;
use crate::curation::{paginate, Page, USER_LIST_PAGE_SIZE};
use crate::errors::AppError;
use crate::models::{CreateUserRequest, Role, UpdateUserRequest, User};
use crate::AppState;

/// GET /api/admin/users - List accounts, one page at a time.
pub async fn list_users(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<PageQuery>,
) -> ApiResult<Page<User>> {
    let viewer = session.require_any_role(&state.upstream, &[Role::Admin]).await?;

    let mut users = state.upstream.list_users(&viewer.token).await?;
    users.sort_by(|a, b| a.username.to_lowercase().cmp(&b.username.to_lowercase()));

    success(paginate(&users, params.page, USER_LIST_PAGE_SIZE))
}

/// POST /api/admin/users - Create an account.
pub async fn create_user(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<User> {
    if request.username.trim().is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    if request.password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    let viewer = session.require_any_role(&state.upstream, &[Role::Admin]).await?;
    let user = state.upstream.create_user(&viewer.token, &request).await?;
    tracing::info!("{} created account {}", viewer.user.username, user.username);
    success(user)
}

/// PUT /api/admin/users/:id - Update an account.
pub async fn update_user(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    if request.username.as_deref().is_some_and(|u| u.trim().is_empty()) {
        return Err(AppError::Validation("Username cannot be empty".to_string()));
    }

    let viewer = session.require_any_role(&state.upstream, &[Role::Admin]).await?;
    success(state.upstream.update_user(&viewer.token, &id, &request).await?)
}

/// DELETE /api/admin/users/:id - Delete an account.
pub async fn delete_user(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let viewer = session.require_any_role(&state.upstream, &[Role::Admin]).await?;
    if viewer.user.id == id {
        return Err(AppError::Validation(
            "You cannot delete your own account".to_string(),
        ));
    }

    state.upstream.delete_user(&viewer.token, &id).await?;
    tracing::info!("{} deleted account {}", viewer.user.username, id);
    success(())
}

/// POST /api/admin/users/:id/disable - Disable an account.
pub async fn disable_user(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let viewer = session.require_any_role(&state.upstream, &[Role::Admin]).await?;
    state.upstream.disable_user(&viewer.token, &id).await?;
    success(())
}

/// POST /api/admin/users/:id/approve - Re-enable an account.
pub async fn approve_user(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let viewer = session.require_any_role(&state.upstream, &[Role::Admin]).await?;
    state.upstream.approve_user(&viewer.token, &id).await?;
    success(())
}
