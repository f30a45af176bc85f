//! User account model matching the remote user API.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Synthetic account the upload pipeline rates with; never counted as a curator.
pub const UPLOAD_BOT_USERNAME: &str = "UploadBot";

/// Role tags a user account may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Clipteam,
    Editor,
    Uploader,
    Admin,
}

/// Roles allowed to rate clips and see rating data.
pub const RATING_ROLES: [Role; 2] = [Role::Clipteam, Role::Admin];

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Disabled,
}

/// A user account.
///
/// Older payloads carry a scalar `role`; it is folded into `roles` on
/// deserialization so every check is a set-membership test.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub roles: BTreeSet<Role>,
    pub status: AccountStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    #[serde(alias = "_id")]
    id: String,
    username: String,
    #[serde(default)]
    roles: Vec<Role>,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    status: AccountStatus,
    #[serde(default)]
    profile_picture: Option<String>,
    #[serde(default)]
    discord_id: Option<String>,
}

impl<'de> Deserialize<'de> for User {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawUser::deserialize(deserializer)?;
        let mut roles: BTreeSet<Role> = raw.roles.into_iter().collect();
        roles.extend(raw.role);

        Ok(User {
            id: raw.id,
            username: raw.username,
            roles,
            status: raw.status,
            profile_picture: raw.profile_picture,
            discord_id: raw.discord_id,
        })
    }
}

impl User {
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.roles.contains(r))
    }

    /// Whether this account may rate clips and see rating data.
    pub fn can_rate(&self) -> bool {
        self.has_any_role(&RATING_ROLES)
    }

    /// Whether this account belongs in the curator performance roster.
    pub fn is_rating_eligible(&self) -> bool {
        self.can_rate()
            && !self.has_any_role(&[Role::Editor, Role::Uploader])
            && self.username != UPLOAD_BOT_USERNAME
    }
}

/// Credentials for logging in against the remote API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token issued by the remote API on login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Request body for self-registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Request body for an admin creating an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Request body for updating an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(value: serde_json::Value) -> User {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_legacy_scalar_role_is_merged() {
        let u = user(serde_json::json!({ "_id": "1", "username": "old", "role": "admin" }));
        assert!(u.has_any_role(&[Role::Admin]));
        assert!(u.can_rate());
    }

    #[test]
    fn test_role_set_checks() {
        let u = user(serde_json::json!({
            "id": "2", "username": "cutter", "roles": ["user", "clipteam"]
        }));
        assert!(u.can_rate());
        assert!(!u.has_any_role(&[Role::Admin]));
        assert!(u.is_rating_eligible());
        assert_eq!(u.status, AccountStatus::Active);
    }

    #[test]
    fn test_editor_and_bot_are_not_rating_eligible() {
        let editor = user(serde_json::json!({
            "id": "3", "username": "ed", "roles": ["clipteam", "editor"]
        }));
        assert!(editor.can_rate());
        assert!(!editor.is_rating_eligible());

        let bot = user(serde_json::json!({
            "id": "4", "username": "UploadBot", "roles": ["admin"]
        }));
        assert!(!bot.is_rating_eligible());
    }

    #[test]
    fn test_password_is_never_serialized() {
        let u = user(serde_json::json!({
            "id": "5", "username": "x", "password": "hunter2", "roles": []
        }));
        let json = serde_json::to_value(&u).unwrap();
        assert!(json.get("password").is_none());
    }
}
