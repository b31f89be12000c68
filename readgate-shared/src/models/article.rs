/// Article model and database operations
///
/// Articles are authored and managed outside the server; this crate only
/// reads them. Every column is exposed verbatim in the wire mapping.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE articles (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     author TEXT NOT NULL,
///     title TEXT NOT NULL,
///     content TEXT NOT NULL,
///     preview TEXT NOT NULL,
///     minutes_to_read INTEGER NOT NULL,
///     date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
///     user_id INTEGER REFERENCES users(id) ON DELETE SET NULL
/// );
/// ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Article model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    /// Server-assigned article ID
    pub id: i64,

    /// Display name of the author
    pub author: String,

    pub title: String,

    /// Full article body
    pub content: String,

    /// Short teaser shown in listings
    pub preview: String,

    /// Estimated reading time
    pub minutes_to_read: i64,

    /// Publication timestamp (UTC, no offset stored)
    pub date: NaiveDateTime,

    /// Authoring user, if linked to an account
    pub user_id: Option<i64>,
}

/// Input for creating a new article
///
/// Only used by seeding tooling and tests; the HTTP surface is read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArticle {
    pub author: String,
    pub title: String,
    pub content: String,
    pub preview: String,
    pub minutes_to_read: i64,
    pub date: NaiveDateTime,
    pub user_id: Option<i64>,
}

impl Article {
    /// Inserts a new article
    pub async fn create(pool: &SqlitePool, data: CreateArticle) -> Result<Self, sqlx::Error> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (author, title, content, preview, minutes_to_read, date, user_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, author, title, content, preview, minutes_to_read, date, user_id
            "#,
        )
        .bind(data.author)
        .bind(data.title)
        .bind(data.content)
        .bind(data.preview)
        .bind(data.minutes_to_read)
        .bind(data.date)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        Ok(article)
    }

    /// Finds an article by ID
    ///
    /// # Returns
    ///
    /// The article if found, None otherwise
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, author, title, content, preview, minutes_to_read, date, user_id
            FROM articles
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(article)
    }

    /// Lists every article, ordered by ID
    ///
    /// No pagination: the full table is returned.
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, author, title, content, preview, minutes_to_read, date, user_id
            FROM articles
            ORDER BY id ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(articles)
    }

    /// Counts total number of articles
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
