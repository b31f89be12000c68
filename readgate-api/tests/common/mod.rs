/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - In-memory SQLite database with the workspace migrations applied
/// - Seeded users and articles
/// - A client that carries the session cookie between requests

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use cookie::{time::Duration as CookieDuration, Cookie};
use readgate_api::app::{build_router, AppState};
use readgate_api::config::{
    ApiConfig, Config, DatabaseConfig, SessionConfig, DEFAULT_SESSION_MAX_AGE_SECONDS,
};
use readgate_api::middleware::session::SESSION_COOKIE_NAME;
use readgate_shared::db::pool::{create_pool, DatabaseConfig as PoolConfig};
use readgate_shared::models::article::{Article, CreateArticle};
use readgate_shared::models::user::{CreateUser, User};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const TEST_SESSION_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: Router,
    pub config: Config,
    pub user: User,
    pub articles: Vec<Article>,
}

impl TestContext {
    /// Creates a new test context with a fresh database
    pub async fn new() -> anyhow::Result<Self> {
        let config = test_config();

        let db = create_pool(PoolConfig::in_memory()).await?;

        // Path relative to Cargo.toml, not this file
        sqlx::migrate!("../migrations").run(&db).await?;

        let user = User::create(
            &db,
            CreateUser {
                username: "ada".to_string(),
            },
        )
        .await?;

        let mut articles = Vec::new();
        for (i, title) in ["Engines", "Notes", "Bernoulli", "Looms"].iter().enumerate() {
            let article = Article::create(
                &db,
                CreateArticle {
                    author: "Ada Lovelace".to_string(),
                    title: title.to_string(),
                    content: format!("The full text of {}.", title),
                    preview: format!("{}...", title),
                    minutes_to_read: i as i64 + 1,
                    date: NaiveDate::from_ymd_opt(1843, 9, i as u32 + 1)
                        .unwrap()
                        .and_hms_opt(10, 0, 0)
                        .unwrap(),
                    user_id: Some(user.id),
                },
            )
            .await?;
            articles.push(article);
        }

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            articles,
        })
    }

    /// Returns a client with an empty cookie jar
    pub fn client(&self) -> TestClient {
        TestClient {
            app: self.app.clone(),
            session_cookie: None,
        }
    }
}

/// Configuration for tests, built directly instead of from the environment
pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            debug: true,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        session: SessionConfig {
            secret: TEST_SESSION_SECRET.to_string(),
            max_age_seconds: DEFAULT_SESSION_MAX_AGE_SECONDS,
            secure: false,
        },
    }
}

/// Response captured by [`TestClient`]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub set_cookie: Option<String>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "Response body is not JSON ({}): {}",
                e,
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Minimal browser stand-in: remembers the `session` cookie
pub struct TestClient {
    app: Router,
    pub session_cookie: Option<String>,
}

impl TestClient {
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send("GET", uri, None).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send("DELETE", uri, None).await
    }

    pub async fn post_json(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send("POST", uri, Some(body.to_string())).await
    }

    pub async fn post_raw(&mut self, uri: &str, body: &str) -> TestResponse {
        self.send("POST", uri, Some(body.to_string())).await
    }

    async fn send(&mut self, method: &str, uri: &str, body: Option<String>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(cookie) = &self.session_cookie {
            builder = builder.header(
                header::COOKIE,
                Cookie::new(SESSION_COOKIE_NAME, cookie.as_str()).to_string(),
            );
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());

        if let Some(cookie) = &set_cookie {
            self.session_cookie = parse_session_cookie(cookie);
        }

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            body,
            set_cookie,
        }
    }
}

/// Extracts the session value from a `Set-Cookie` header; None if it expires the cookie
fn parse_session_cookie(set_cookie: &str) -> Option<String> {
    let cookie = Cookie::parse(set_cookie).ok()?;

    if cookie.name() != SESSION_COOKIE_NAME {
        return None;
    }

    let expired = cookie.max_age() == Some(CookieDuration::ZERO);
    if cookie.value().is_empty() || expired {
        None
    } else {
        Some(cookie.value().to_string())
    }
}
