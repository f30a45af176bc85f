//! Clip Curation Backend
//!
//! Serves the clip rating, curation and denial views on top of the remote clip
//! API, with a SQLite preference store and Tantivy clip search.

mod api;
mod auth;
mod config;
mod curation;
mod db;
mod errors;
mod models;
mod search;
mod upstream;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use search::SearchIndex;
use upstream::UpstreamClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub prefs: Arc<Repository>,
    pub search: Arc<SearchIndex>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Clip Curation Backend");
    tracing::info!("Clip API: {}", config.api_base_url);
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Index path: {:?}", config.index_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (CLIPS_API_PSK). Authentication is disabled!");
    }

    // Initialize preference store
    let pool = db::init_database(&config.db_path).await?;
    let prefs = Arc::new(Repository::new(pool));

    // Initialize search index
    let search = Arc::new(SearchIndex::open(&config.index_path)?);

    // Warm the index; the clip API being down here is not fatal
    let upstream = Arc::new(UpstreamClient::new(&config)?);
    match upstream.list_clips().await {
        Ok(clips) => {
            search.rebuild(&clips).await?;
            tracing::info!("Search index built with {} clips", clips.len());
        }
        Err(e) => tracing::warn!("Skipping initial index build: {}", e),
    }

    let state = AppState {
        upstream,
        prefs,
        search,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();

    let api_routes = Router::new()
        // Session
        .route("/session", get(api::get_session))
        .route("/session/login", post(api::login))
        .route("/session/register", post(api::register))
        // Clips
        .route("/clips", get(api::list_clips))
        .route("/clips/{id}", get(api::get_clip))
        .route("/clips/{id}/upvote", post(api::upvote_clip))
        .route("/clips/{id}/downvote", post(api::downvote_clip))
        .route("/clips/{id}/rate", post(api::rate_clip))
        // Chat
        .route("/clips/{id}/messages", get(api::list_messages))
        .route("/clips/{id}/messages", post(api::post_message))
        .route("/messages/{id}", delete(api::delete_message))
        // Search
        .route("/search", get(api::search_clips))
        // Preferences
        .route("/preferences", get(api::get_preferences))
        .route("/preferences", put(api::update_preferences))
        // Site configuration
        .route("/config", get(api::get_config))
        .route("/admin/config", put(api::update_config))
        // Curation
        .route("/admin/denied", get(api::list_denied))
        .route("/admin/eligible", get(api::list_eligible))
        .route("/admin/stats", get(api::get_stats))
        .route("/admin/export", post(api::export_archive))
        .route(
            "/admin/import",
            post(api::import_archive).layer(DefaultBodyLimit::max(api::MAX_IMPORT_BYTES)),
        )
        .route("/admin/clips", delete(api::reset_clips))
        .route("/admin/clips/{id}", delete(api::delete_clip))
        // Accounts
        .route("/admin/users", get(api::list_users))
        .route("/admin/users", post(api::create_user))
        .route("/admin/users/{id}", put(api::update_user))
        .route("/admin/users/{id}", delete(api::delete_user))
        .route("/admin/users/{id}/disable", post(api::disable_user))
        .route("/admin/users/{id}/approve", post(api::approve_user))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
