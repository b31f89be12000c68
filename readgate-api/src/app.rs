/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use readgate_api::{app::AppState, config::Config};
/// use readgate_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let state = AppState::new(pool, config);
/// let app = readgate_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::session::session_layer};
use axum::{
    routing::{delete, get, post},
    Router,
};
use readgate_shared::session::SessionCodec;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Signs and verifies session cookies
    pub sessions: Arc<SessionCodec>,
}

impl AppState {
    /// Creates new application state
    ///
    /// The session codec is keyed from `config.session.secret`.
    pub fn new(db: SqlitePool, config: Config) -> Self {
        let sessions = SessionCodec::new(
            config.session.secret.as_bytes(),
            config.session.max_age(),
        );

        Self {
            db,
            config: Arc::new(config),
            sessions: Arc::new(sessions),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /
/// ├── GET    /health          # Health check
/// ├── DELETE /clear           # Drop page views and identity
/// ├── GET    /articles        # List every article
/// ├── GET    /articles/:id    # Show one article (3 per session)
/// ├── POST   /login           # Claim a username
/// ├── DELETE /logout          # Drop identity
/// └── GET    /check_session   # Current user
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Session cookie (verify on request, re-sign on response)
/// 2. Logging (tower-http TraceLayer)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/clear", delete(routes::session::clear_session))
        .route("/articles", get(routes::articles::index_articles))
        .route("/articles/:id", get(routes::articles::show_article))
        .route("/login", post(routes::auth::login))
        .route("/logout", delete(routes::auth::logout))
        .route("/check_session", get(routes::auth::check_session))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_layer,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
