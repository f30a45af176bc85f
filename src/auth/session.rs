//! Per-request viewer session.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::header, http::request::Parts};

use crate::errors::AppError;
use crate::models::{Role, User};
use crate::upstream::UpstreamClient;

/// Header carrying the caller's opaque client id.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

const MAX_CLIENT_ID_CHARS: usize = 64;

/// The viewer's bearer token from the `Authorization` header, plus the
/// optional client id anonymous preferences are keyed by.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
    client_id: Option<String>,
}

/// Namespaced key a preference row belongs to.
///
/// Usernames and client ids live in separate namespaces, so neither can
/// collide with the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(String);

impl Owner {
    pub fn user(username: &str) -> Self {
        Self(format!("user:{}", username))
    }

    pub fn client(client_id: &str) -> Self {
        Self(format!("client:{}", client_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A signed-in viewer whose profile has been fetched.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub token: String,
    pub user: User,
}

impl Viewer {
    /// Key under which this viewer's preferences are stored.
    pub fn owner(&self) -> Owner {
        Owner::user(&self.user.username)
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let client_id = parts
            .headers
            .get(CLIENT_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| is_valid_client_id(id))
            .map(str::to_string);

        Ok(Session { token, client_id })
    }
}

fn is_valid_client_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_CLIENT_ID_CHARS
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Session {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            client_id: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Owner keyed by the caller's client id, if one was sent.
    pub fn client_owner(&self) -> Option<Owner> {
        self.client_id.as_deref().map(Owner::client)
    }

    /// Preference owner: the signed-in viewer, else the caller's client.
    ///
    /// `None` means an anonymous caller without a client id; nothing is
    /// persisted for it.
    pub fn owner(&self, viewer: Option<&Viewer>) -> Option<Owner> {
        match viewer {
            Some(viewer) => Some(viewer.owner()),
            None => self.client_owner(),
        }
    }

    /// Resolve the viewer, `None` for anonymous requests.
    pub async fn viewer(&self, upstream: &UpstreamClient) -> Result<Option<Viewer>, AppError> {
        let Some(token) = &self.token else {
            return Ok(None);
        };
        let user = upstream.current_user(token).await?;
        Ok(Some(Viewer {
            token: token.clone(),
            user,
        }))
    }

    /// Resolve the viewer, failing for anonymous requests.
    pub async fn require_viewer(&self, upstream: &UpstreamClient) -> Result<Viewer, AppError> {
        self.viewer(upstream)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))
    }

    /// Resolve the viewer and check that they hold at least one of `roles`.
    pub async fn require_any_role(
        &self,
        upstream: &UpstreamClient,
        roles: &[Role],
    ) -> Result<Viewer, AppError> {
        let viewer = self.require_viewer(upstream).await?;
        if !viewer.user.has_any_role(roles) {
            tracing::info!(
                "Denied {} access requiring one of {:?}",
                viewer.user.username,
                roles
            );
            return Err(AppError::Forbidden(
                "You do not have permission for this action".to_string(),
            ));
        }
        Ok(viewer)
    }
}
