//! Configuration module for the clip curation backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote clip API
    pub api_base_url: String,
    /// Pre-shared key for this service's API (optional in development)
    pub api_psk: Option<String>,
    /// Path to the SQLite preference store
    pub db_path: PathBuf,
    /// Path to the Tantivy clip index directory
    pub index_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,
    /// Timeout applied to every remote call
    pub upstream_timeout: Duration,
    /// Maximum number of rating fetches in flight per request
    pub rating_concurrency: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("CLIPS_API_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let api_psk = env::var("CLIPS_API_PSK").ok().filter(|k| !k.is_empty());

        let db_path = env::var("CLIPS_DB_PATH")
            .unwrap_or_else(|_| "./data/prefs.sqlite".to_string())
            .into();

        let index_path = env::var("CLIPS_INDEX_PATH")
            .unwrap_or_else(|_| "./data/index".to_string())
            .into();

        let bind_addr = parse_var("CLIPS_BIND_ADDR", "127.0.0.1:8080")?;

        let log_level = env::var("CLIPS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = parse_var("CLIPS_LOG_JSON", "false")?;

        let timeout_secs: u64 = parse_var("CLIPS_UPSTREAM_TIMEOUT_SECS", "15")?;

        let rating_concurrency: usize = parse_var("CLIPS_RATING_CONCURRENCY", "16")?;
        if rating_concurrency == 0 {
            return Err(AppError::Validation(
                "CLIPS_RATING_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api_base_url,
            api_psk,
            db_path,
            index_path,
            bind_addr,
            log_level,
            log_json,
            upstream_timeout: Duration::from_secs(timeout_secs),
            rating_concurrency,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T, AppError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|_| AppError::Validation(format!("Invalid {} value '{}'", name, raw)))
}
