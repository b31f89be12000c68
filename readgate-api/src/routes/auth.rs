/// Session identity endpoints
///
/// Identity is claim-only: knowing a username is enough to log in as that
/// user. There are no passwords and no roles.
///
/// # Endpoints
///
/// - `POST /login` - Bind a user to the session
/// - `DELETE /logout` - Unbind the user
/// - `GET /check_session` - Return the bound user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    json::PrettyJson,
    middleware::session::Session,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use readgate_shared::{models::user::User, session::USER_ID_KEY};
use serde::Deserialize;
use validator::Validate;

/// Message returned when the login body has no usable username
pub const MISSING_USERNAME_MESSAGE: &str = "Username not provided";

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username to log in as; absence is reported by the handler
    #[validate(length(min = 1, message = "Username not provided"))]
    pub username: Option<String>,
}

/// Login endpoint
///
/// Looks up the user by exact username and stores their id in the session.
///
/// # Endpoint
///
/// ```text
/// POST /login
/// Content-Type: application/json
///
/// {
///   "username": "ada"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "id": 1,
///   "username": "ada"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Username missing or empty, or body is not JSON
/// - `404 Not Found`: No such user (session left unchanged)
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    req: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<PrettyJson<User>> {
    let Json(req) = req?;

    req.validate().map_err(|e| {
        let message = e
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .find_map(|error| error.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| MISSING_USERNAME_MESSAGE.to_string());
        ApiError::BadRequest(message)
    })?;

    let username = req
        .username
        .ok_or_else(|| ApiError::BadRequest(MISSING_USERNAME_MESSAGE.to_string()))?;

    let user = User::find_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    session.set_user_id(user.id);

    tracing::info!(user_id = user.id, "User logged in");

    Ok(PrettyJson(user))
}

/// Logout endpoint
///
/// Removes the user from the session. Logging out without being logged in
/// is not an error. The view counter is kept.
///
/// # Endpoint
///
/// ```text
/// DELETE /logout
/// ```
///
/// # Response
///
/// `204 No Content`, empty body.
pub async fn logout(session: Session) -> StatusCode {
    if let Some(user_id) = session.remove(USER_ID_KEY) {
        tracing::info!(user_id = %user_id, "User logged out");
    }

    StatusCode::NO_CONTENT
}

/// Session check endpoint
///
/// Returns the user bound to the session.
///
/// # Endpoint
///
/// ```text
/// GET /check_session
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: No user in the session, body `{}`
/// - `404 Not Found`: The session names a user that no longer exists; the
///   stale id is dropped from the session
pub async fn check_session(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<PrettyJson<User>> {
    let user_id = session.user_id().ok_or(ApiError::Unauthenticated)?;

    match User::find_by_id(&state.db, user_id).await? {
        Some(user) => Ok(PrettyJson(user)),
        None => {
            tracing::warn!(user_id, "Session references a missing user");
            session.remove(USER_ID_KEY);
            Err(ApiError::NotFound("User not found".to_string()))
        }
    }
}
