//! Clip chat API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::auth::Session;
use crate::errors::AppError;
use crate::models::{Message, PostMessageRequest};
use crate::AppState;

/// Longest accepted chat message, in characters.
const MAX_MESSAGE_CHARS: usize = 500;

/// GET /api/clips/:id/messages - List a clip's chat messages.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(clip_id): Path<String>,
) -> ApiResult<Vec<Message>> {
    let mut messages = state.upstream.list_messages(&clip_id).await?;
    messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    success(messages)
}

/// POST /api/clips/:id/messages - Post a chat message.
pub async fn post_message(
    State(state): State<AppState>,
    session: Session,
    Path(clip_id): Path<String>,
    Json(request): Json<PostMessageRequest>,
) -> ApiResult<Message> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Message text is required".to_string()));
    }
    if text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(format!(
            "Message text is limited to {} characters",
            MAX_MESSAGE_CHARS
        )));
    }

    let viewer = session.require_viewer(&state.upstream).await?;
    success(
        state
            .upstream
            .post_message(&viewer.token, &clip_id, text)
            .await?,
    )
}

/// DELETE /api/messages/:id - Delete a chat message.
pub async fn delete_message(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let token = session
        .token()
        .ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))?;
    state.upstream.delete_message(token, &id).await?;
    success(())
}
