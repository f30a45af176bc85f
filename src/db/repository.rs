//! Preference repository.
//!
//! Values are stored as JSON text, one row per owner and key.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Row, Sqlite, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    Preferences, RatedFilter, UpdatePreferencesRequest, MAX_RECENT_SEARCHES,
};

mod keys {
    pub const THEME: &str = "theme";
    pub const SNOW_EFFECT: &str = "snowEffect";
    pub const RECENT_SEARCHES: &str = "recentSearches";
    pub const RATED_FILTER: &str = "ratedFilter";
    pub const LAST_USERNAME: &str = "lastUsername";
}

/// Database repository for preference operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the preferences of an owner, with defaults for unset keys.
    pub async fn get_preferences(&self, owner: &str) -> Result<Preferences, AppError> {
        load_preferences(&self.pool, owner).await
    }

    /// Apply a partial update and return the resulting preferences.
    pub async fn update_preferences(
        &self,
        owner: &str,
        request: &UpdatePreferencesRequest,
    ) -> Result<Preferences, AppError> {
        let mut tx = self.pool.begin().await?;

        if let Some(theme) = &request.theme {
            put_value(&mut *tx, owner, keys::THEME, theme).await?;
        }
        if let Some(snow) = &request.snow_effect {
            put_value(&mut *tx, owner, keys::SNOW_EFFECT, snow).await?;
        }
        if let Some(searches) = &request.recent_searches {
            let normalized = normalize_searches(searches.iter().map(String::as_str));
            put_value(&mut *tx, owner, keys::RECENT_SEARCHES, &normalized).await?;
        }
        if let Some(filter) = &request.rated_filter {
            put_value(&mut *tx, owner, keys::RATED_FILTER, filter).await?;
        }

        tx.commit().await?;

        self.get_preferences(owner).await
    }

    /// Push a search string to the front of the owner's recent searches.
    ///
    /// The write lock is taken up front so concurrent searches by the same
    /// owner apply one after the other.
    pub async fn record_search(&self, owner: &str, query: &str) -> Result<Vec<String>, AppError> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let current = load_preferences(&mut *tx, owner).await?.recent_searches;
        let updated = normalize_searches(
            std::iter::once(query).chain(current.iter().map(String::as_str)),
        );
        put_value(&mut *tx, owner, keys::RECENT_SEARCHES, &updated).await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn set_rated_filter(&self, owner: &str, filter: RatedFilter) -> Result<(), AppError> {
        put_value(&self.pool, owner, keys::RATED_FILTER, &filter).await
    }

    /// The username of the most recent successful login by this owner.
    pub async fn last_username(&self, owner: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM preferences WHERE owner = ? AND key = ?")
            .bind(owner)
            .bind(keys::LAST_USERNAME)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.and_then(|r| serde_json::from_str(&r.get::<String, _>("value")).ok()))
    }

    pub async fn set_last_username(&self, owner: &str, username: &str) -> Result<(), AppError> {
        put_value(&self.pool, owner, keys::LAST_USERNAME, &username).await
    }
}

async fn load_preferences<'e, E>(executor: E, owner: &str) -> Result<Preferences, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT key, value FROM preferences WHERE owner = ?")
        .bind(owner)
        .fetch_all(executor)
        .await?;

    let mut prefs = Preferences::default();
    for row in rows {
        let key: String = row.get("key");
        let value: String = row.get("value");
        match key.as_str() {
            keys::THEME => apply(&mut prefs.theme, &key, &value),
            keys::SNOW_EFFECT => apply(&mut prefs.snow_effect, &key, &value),
            keys::RECENT_SEARCHES => apply(&mut prefs.recent_searches, &key, &value),
            keys::RATED_FILTER => apply(&mut prefs.rated_filter, &key, &value),
            _ => {}
        }
    }

    Ok(prefs)
}

async fn put_value<'e, E, T>(executor: E, owner: &str, key: &str, value: &T) -> Result<(), AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
    T: Serialize + ?Sized,
{
    let encoded = serde_json::to_string(value)?;
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO preferences (owner, key, value, updated_at) VALUES (?, ?, ?, ?)
         ON CONFLICT(owner, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(owner)
    .bind(key)
    .bind(encoded)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(())
}

/// Decode a stored value, keeping the default when the stored text is unreadable.
fn apply<T: DeserializeOwned>(target: &mut T, key: &str, value: &str) {
    match serde_json::from_str(value) {
        Ok(decoded) => *target = decoded,
        Err(e) => tracing::warn!("Ignoring unreadable preference {}: {}", key, e),
    }
}

/// Trim, drop empties and duplicates (first occurrence wins), cap the length.
fn normalize_searches<'a>(searches: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for s in searches.map(str::trim).filter(|s| !s.is_empty()) {
        if !out.iter().any(|existing| existing == s) {
            out.push(s.to_string());
        }
        if out.len() == MAX_RECENT_SEARCHES {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::Theme;
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("prefs.sqlite"))
            .await
            .unwrap();
        (Repository::new(pool), temp_dir)
    }

    #[tokio::test]
    async fn test_defaults_for_new_owner() {
        let (repo, _dir) = repo().await;
        let prefs = repo.get_preferences("nobody").await.unwrap();
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.rated_filter, RatedFilter::Unrated);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_keys() {
        let (repo, _dir) = repo().await;

        let prefs = repo
            .update_preferences(
                "ana",
                &UpdatePreferencesRequest {
                    theme: Some(Theme::Light),
                    snow_effect: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(prefs.theme, Theme::Light);
        assert!(prefs.snow_effect);

        let prefs = repo
            .update_preferences(
                "ana",
                &UpdatePreferencesRequest {
                    snow_effect: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(prefs.theme, Theme::Light);
        assert!(!prefs.snow_effect);

        // Other owners are unaffected
        assert_eq!(
            repo.get_preferences("bo").await.unwrap(),
            Preferences::default()
        );
    }

    #[tokio::test]
    async fn test_recent_searches_dedupe_and_cap() {
        let (repo, _dir) = repo().await;

        for q in ["one", "two", "three", "two", "four", "five", "six"] {
            repo.record_search("ana", q).await.unwrap();
        }
        let searches = repo.record_search("ana", "  ").await.unwrap();

        assert_eq!(searches, ["six", "five", "four", "two", "three"]);
        assert_eq!(searches.len(), MAX_RECENT_SEARCHES);
    }

    #[tokio::test]
    async fn test_rated_filter_and_last_username() {
        let (repo, _dir) = repo().await;

        repo.set_rated_filter("ana", RatedFilter::Rated).await.unwrap();
        assert_eq!(
            repo.get_preferences("ana").await.unwrap().rated_filter,
            RatedFilter::Rated
        );

        assert_eq!(repo.last_username("client:tab1").await.unwrap(), None);
        repo.set_last_username("client:tab1", "ana").await.unwrap();
        repo.set_last_username("client:tab1", "bo").await.unwrap();
        assert_eq!(
            repo.last_username("client:tab1").await.unwrap().as_deref(),
            Some("bo")
        );
        assert_eq!(repo.last_username("client:tab2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_searches_keep_every_entry() {
        let (repo, _dir) = repo().await;

        let queries: Vec<String> = (0..5).map(|i| format!("query{}", i)).collect();
        let handles: Vec<_> = queries
            .iter()
            .cloned()
            .map(|q| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.record_search("ana", &q).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut searches = repo.get_preferences("ana").await.unwrap().recent_searches;
        searches.sort();
        assert_eq!(searches, queries);
    }

    #[test]
    fn test_normalize_searches() {
        let out = normalize_searches([" a ", "", "b", "a", "c"].into_iter());
        assert_eq!(out, ["a", "b", "c"]);
    }
}
