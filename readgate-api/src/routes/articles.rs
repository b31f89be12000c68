/// Article endpoints
///
/// Articles are read-only. Individual article views are metered per
/// session: the first [`MAX_PAGE_VIEWS`] views succeed, later ones are
/// refused until the session is cleared. The counter is shared across all
/// articles.
///
/// # Endpoints
///
/// - `GET /articles` - List every article
/// - `GET /articles/:id` - Show one article (metered)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    json::PrettyJson,
    middleware::session::Session,
};
use axum::extract::{rejection::PathRejection, Path, State};
use readgate_shared::models::article::Article;

/// Views allowed per session before articles are refused
pub const MAX_PAGE_VIEWS: u64 = 3;

/// Message returned once the view quota is used up
pub const PAGEVIEW_LIMIT_MESSAGE: &str = "Maximum pageview limit reached";

/// Lists all articles
///
/// Independent of session state; never touches the view counter.
///
/// # Endpoint
///
/// ```text
/// GET /articles
/// ```
///
/// # Response
///
/// ```json
/// [
///   {
///     "id": 1,
///     "author": "...",
///     "title": "...",
///     "content": "...",
///     "preview": "...",
///     "minutes_to_read": 4,
///     "date": "2024-05-17T09:30:00",
///     "user_id": 1
///   }
/// ]
/// ```
pub async fn index_articles(State(state): State<AppState>) -> ApiResult<PrettyJson<Vec<Article>>> {
    let articles = Article::find_all(&state.db).await?;

    tracing::debug!(count = articles.len(), "Listed articles");

    Ok(PrettyJson(articles))
}

/// Shows one article, counting the view against the session quota
///
/// The view is counted before the lookup, so requests for unknown ids
/// consume quota as well.
///
/// # Endpoint
///
/// ```text
/// GET /articles/:id
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: `id` is not an integer
/// - `401 Unauthorized`: `{"message": "Maximum pageview limit reached"}`
/// - `404 Not Found`: No article with this id
pub async fn show_article(
    State(state): State<AppState>,
    session: Session,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<PrettyJson<Article>> {
    let Path(id) = id?;

    let views = session.record_page_view();

    if views > MAX_PAGE_VIEWS {
        tracing::info!(article_id = id, page_views = views, "Pageview limit reached");
        return Err(ApiError::Unauthorized(PAGEVIEW_LIMIT_MESSAGE.to_string()));
    }

    let article = Article::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;

    tracing::debug!(article_id = id, page_views = views, "Served article");

    Ok(PrettyJson(article))
}
