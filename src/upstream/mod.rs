//! HTTP client for the remote clip API.
//!
//! Every call takes the viewer's bearer token explicitly; nothing is read
//! from ambient state.

mod fanout;

pub use fanout::*;

use axum::body::Bytes;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{
    Clip, CreateUserRequest, LoginRequest, LoginResponse, Message, RatingLabel, RegisterRequest,
    SiteConfig, UpdateUserRequest, User,
};

/// Raw `/ratings/:clipId` payload. `ratingCounts` is validated by the fan-out.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingPayload {
    #[serde(default)]
    pub rating_counts: serde_json::Value,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RateBody {
    Score { rating: u8 },
    Deny { deny: bool },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserIdBody<'a> {
    user_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ZipDownloadBody<'a> {
    clip_ids: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageBody<'a> {
    clip_id: &'a str,
    text: &'a str,
}

/// Typed client for the remote clip API.
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: Url,
}

impl UpstreamClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = Url::parse(&config.api_base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Invalid CLIPS_API_BASE_URL '{}'",
                    config.api_base_url
                ))
            })?;

        Ok(Self { http, base_url })
    }

    /// Resolve an endpoint under the base URL, one path segment per element.
    ///
    /// Segments are percent-encoded, so an id can never reach another path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(AppError::NotFound(format!("No resource named '{}'", bad)));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Clip API URL cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authed(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and map non-success statuses onto application errors.
    async fn send(builder: RequestBuilder) -> Result<Response, AppError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = upstream_message(&body).unwrap_or_else(|| status.to_string());
        tracing::debug!("Clip API responded {}: {}", status, message);

        Err(match status {
            StatusCode::BAD_REQUEST => AppError::Validation(message),
            StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
            StatusCode::FORBIDDEN => AppError::Forbidden(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            _ => AppError::Upstream(format!("Clip API returned {}: {}", status, message)),
        })
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, AppError> {
        Ok(Self::send(builder).await?.json().await?)
    }

    // ==================== CLIPS ====================

    pub async fn list_clips(&self) -> Result<Vec<Clip>, AppError> {
        Self::send_json(self.http.get(self.endpoint(&["clips"])?)).await
    }

    pub async fn get_clip(&self, id: &str) -> Result<Clip, AppError> {
        Self::send_json(self.http.get(self.endpoint(&["clips", id])?)).await
    }

    pub async fn upvote(&self, id: &str) -> Result<Clip, AppError> {
        Self::send_json(self.http.post(self.endpoint(&["clips", id, "upvote"])?)).await
    }

    pub async fn downvote(&self, id: &str) -> Result<Clip, AppError> {
        Self::send_json(self.http.post(self.endpoint(&["clips", id, "downvote"])?)).await
    }

    pub async fn delete_clip(&self, token: &str, id: &str) -> Result<(), AppError> {
        let builder = self.http.delete(self.endpoint(&["clips", id])?);
        Self::send(Self::authed(builder, Some(token))).await?;
        Ok(())
    }

    /// Remove every clip, ending the current season.
    pub async fn reset_clips(&self, token: &str) -> Result<(), AppError> {
        let builder = self.http.delete(self.endpoint(&["clips"])?);
        Self::send(Self::authed(builder, Some(token))).await?;
        Ok(())
    }

    // ==================== RATINGS ====================

    pub async fn get_ratings(
        &self,
        token: Option<&str>,
        clip_id: &str,
    ) -> Result<RatingPayload, AppError> {
        let builder = self.http.get(self.endpoint(&["ratings", clip_id])?);
        Self::send_json(Self::authed(builder, token)).await
    }

    pub async fn rate_clip(
        &self,
        token: &str,
        clip_id: &str,
        rating: RatingLabel,
    ) -> Result<(), AppError> {
        let body = match rating.score() {
            Some(rating) => RateBody::Score { rating },
            None => RateBody::Deny { deny: true },
        };
        let builder = self
            .http
            .post(self.endpoint(&["rate", clip_id])?)
            .json(&body);
        Self::send(Self::authed(builder, Some(token))).await?;
        Ok(())
    }

    // ==================== CONFIG ====================

    pub async fn get_config(&self) -> Result<SiteConfig, AppError> {
        let configs: Vec<SiteConfig> =
            Self::send_json(self.http.get(self.endpoint(&["admin", "config"])?)).await?;
        configs
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Upstream("Clip API returned no configuration".to_string()))
    }

    pub async fn update_config(
        &self,
        token: &str,
        config: &SiteConfig,
    ) -> Result<SiteConfig, AppError> {
        let builder = self.http.put(self.endpoint(&["admin", "config"])?).json(config);
        Self::send(Self::authed(builder, Some(token))).await?;
        Ok(config.clone())
    }

    // ==================== USERS ====================

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AppError> {
        Self::send_json(self.http.post(self.endpoint(&["users", "login"])?).json(request)).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AppError> {
        Self::send_json(self.http.post(self.endpoint(&["users", "register"])?).json(request)).await
    }

    pub async fn current_user(&self, token: &str) -> Result<User, AppError> {
        let builder = self.http.get(self.endpoint(&["users", "me"])?);
        Self::send_json(Self::authed(builder, Some(token))).await
    }

    pub async fn list_users(&self, token: &str) -> Result<Vec<User>, AppError> {
        let builder = self.http.get(self.endpoint(&["users"])?);
        Self::send_json(Self::authed(builder, Some(token))).await
    }

    pub async fn create_user(
        &self,
        token: &str,
        request: &CreateUserRequest,
    ) -> Result<User, AppError> {
        let builder = self.http.post(self.endpoint(&["admin", "create-user"])?).json(request);
        Self::send_json(Self::authed(builder, Some(token))).await
    }

    pub async fn update_user(
        &self,
        token: &str,
        id: &str,
        request: &UpdateUserRequest,
    ) -> Result<User, AppError> {
        let builder = self
            .http
            .put(self.endpoint(&["users", id])?)
            .json(request);
        Self::send_json(Self::authed(builder, Some(token))).await
    }

    pub async fn delete_user(&self, token: &str, id: &str) -> Result<(), AppError> {
        let builder = self.http.delete(self.endpoint(&["users", id])?);
        Self::send(Self::authed(builder, Some(token))).await?;
        Ok(())
    }

    pub async fn disable_user(&self, token: &str, id: &str) -> Result<(), AppError> {
        let builder = self
            .http
            .post(self.endpoint(&["users", "disable"])?)
            .json(&UserIdBody { user_id: id });
        Self::send(Self::authed(builder, Some(token))).await?;
        Ok(())
    }

    pub async fn approve_user(&self, token: &str, id: &str) -> Result<(), AppError> {
        let builder = self
            .http
            .post(self.endpoint(&["users", "approve"])?)
            .json(&UserIdBody { user_id: id });
        Self::send(Self::authed(builder, Some(token))).await?;
        Ok(())
    }

    // ==================== MESSAGES ====================

    pub async fn list_messages(&self, clip_id: &str) -> Result<Vec<Message>, AppError> {
        let builder = self
            .http
            .get(self.endpoint(&["messages"])?)
            .query(&[("clipId", clip_id)]);
        Self::send_json(builder).await
    }

    pub async fn post_message(
        &self,
        token: &str,
        clip_id: &str,
        text: &str,
    ) -> Result<Message, AppError> {
        let builder = self
            .http
            .post(self.endpoint(&["messages"])?)
            .json(&MessageBody { clip_id, text });
        Self::send_json(Self::authed(builder, Some(token))).await
    }

    pub async fn delete_message(&self, token: &str, id: &str) -> Result<(), AppError> {
        let builder = self.http.delete(self.endpoint(&["messages", id])?);
        Self::send(Self::authed(builder, Some(token))).await?;
        Ok(())
    }

    // ==================== ARCHIVES ====================

    /// Download an archive of the given clips.
    pub async fn download_zip(&self, token: &str, clip_ids: &[String]) -> Result<Bytes, AppError> {
        let builder = self
            .http
            .post(self.endpoint(&["zips", "download"])?)
            .json(&ZipDownloadBody { clip_ids });
        Ok(Self::send(Self::authed(builder, Some(token)))
            .await?
            .bytes()
            .await?)
    }

    /// Upload an archive of clips for import.
    pub async fn upload_zip(&self, token: &str, archive: Bytes) -> Result<(), AppError> {
        let part = reqwest::multipart::Part::bytes(archive.to_vec())
            .file_name("clips.zip")
            .mime_str("application/zip")?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let builder = self.http.post(self.endpoint(&["zips", "upload"])?).multipart(form);
        Self::send(Self::authed(builder, Some(token))).await?;
        Ok(())
    }
}

/// Pull a human-readable message out of an upstream error body.
fn upstream_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(|m| m.as_str())
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_extraction() {
        assert_eq!(
            upstream_message(r#"{"message":"Username taken"}"#).as_deref(),
            Some("Username taken")
        );
        assert_eq!(
            upstream_message(r#"{"error":"Forbidden"}"#).as_deref(),
            Some("Forbidden")
        );
        assert_eq!(upstream_message("plain text").as_deref(), Some("plain text"));
        assert_eq!(upstream_message("  "), None);
    }

    fn client(base: &str) -> UpstreamClient {
        UpstreamClient {
            http: Client::new(),
            base_url: Url::parse(base).unwrap(),
        }
    }

    #[test]
    fn test_endpoint_keeps_ids_in_one_segment() {
        let api = client("https://clips.example.com/api");
        assert_eq!(
            api.endpoint(&["clips", "c1", "upvote"]).unwrap().as_str(),
            "https://clips.example.com/api/clips/c1/upvote"
        );
        assert_eq!(
            api.endpoint(&["clips", "a/../../users"]).unwrap().as_str(),
            "https://clips.example.com/api/clips/a%2F..%2F..%2Fusers"
        );
        assert_eq!(
            api.endpoint(&["ratings", "x?y#z"]).unwrap().path(),
            "/api/ratings/x%3Fy%23z"
        );

        for bad in ["..", ".", ""] {
            let err = api.endpoint(&["clips", bad]).unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)), "{:?}", bad);
        }

        let root = client("http://127.0.0.1:3000");
        assert_eq!(
            root.endpoint(&["users", "me"]).unwrap().as_str(),
            "http://127.0.0.1:3000/users/me"
        );
    }

    #[test]
    fn test_rate_body_shapes() {
        assert_eq!(
            serde_json::to_value(RateBody::Score { rating: 3 }).unwrap(),
            serde_json::json!({ "rating": 3 })
        );
        assert_eq!(
            serde_json::to_value(RateBody::Deny { deny: true }).unwrap(),
            serde_json::json!({ "deny": true })
        );
    }
}
