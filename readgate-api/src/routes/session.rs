/// Session reset endpoint
///
/// # Endpoints
///
/// - `DELETE /clear` - Forget page views and identity

use crate::middleware::session::Session;
use axum::http::StatusCode;
use readgate_shared::session::{PAGE_VIEWS_KEY, USER_ID_KEY};

/// Clears the session
///
/// Removes both the view counter and the logged-in user. Keys that are
/// already absent are ignored, so the call is idempotent.
///
/// # Endpoint
///
/// ```text
/// DELETE /clear
/// ```
///
/// # Response
///
/// `204 No Content`, empty body.
pub async fn clear_session(session: Session) -> StatusCode {
    let views = session.remove(PAGE_VIEWS_KEY);
    let user = session.remove(USER_ID_KEY);

    tracing::debug!(
        had_views = views.is_some(),
        had_user = user.is_some(),
        "Session cleared"
    );

    StatusCode::NO_CONTENT
}
