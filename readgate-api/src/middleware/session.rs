/// Cookie-backed session middleware
///
/// Verifies the signed `session` cookie on the way in, exposes its contents
/// to handlers through the [`Session`] extractor, and re-signs the session
/// into `Set-Cookie` on the way out if a handler changed it.
///
/// # Lifecycle
///
/// 1. Missing, tampered or expired cookies yield an empty session
/// 2. Handlers read and write the session through a shared handle; reads
///    within one request observe that request's writes
/// 3. A modified, non-empty session is signed into a fresh cookie
/// 4. A modified session that ended up empty expires the cookie
/// 5. An unmodified session leaves the cookie untouched
///
/// # Example
///
/// ```no_run
/// use readgate_api::middleware::session::Session;
///
/// async fn handler(session: Session) -> String {
///     format!("views so far: {}", session.page_views())
/// }
/// ```

use crate::{app::AppState, error::ApiError};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use readgate_shared::session::{SessionCodec, SessionData};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

/// Name of the cookie carrying the signed session
pub const SESSION_COOKIE_NAME: &str = "session";

#[derive(Debug, Default)]
struct SessionState {
    data: SessionData,
    modified: bool,
}

/// Per-request session handle
///
/// Cheap to clone; all clones share the same state for the current request.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

impl Session {
    /// Wraps session data loaded from the request
    pub fn new(data: SessionData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                data,
                modified: false,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.state().data.get(key).cloned()
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let mut state = self.state();
        state.data.set(key, value);
        state.modified = true;
    }

    /// Removes a key; only marks the session modified if the key existed
    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut state = self.state();
        let removed = state.data.remove(key);
        if removed.is_some() {
            state.modified = true;
        }
        removed
    }

    pub fn page_views(&self) -> u64 {
        self.state().data.page_views()
    }

    /// Increments the view counter and returns the new value
    pub fn record_page_view(&self) -> u64 {
        let mut state = self.state();
        let views = state.data.page_views().saturating_add(1);
        state.data.set_page_views(views);
        state.modified = true;
        views
    }

    pub fn user_id(&self) -> Option<i64> {
        self.state().data.user_id()
    }

    pub fn set_user_id(&self, user_id: i64) {
        let mut state = self.state();
        state.data.set_user_id(user_id);
        state.modified = true;
    }

    /// Returns the session contents if a handler changed them
    fn take_changes(&self) -> Option<SessionData> {
        let mut state = self.state();
        if !state.modified {
            return None;
        }
        state.modified = false;
        Some(state.data.clone())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| ApiError::InternalError("Session layer not installed".to_string()))
    }
}

/// Session middleware layer
///
/// Install with `axum::middleware::from_fn_with_state`.
pub async fn session_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let data = load_session(req.headers(), &state.sessions);
    let session = Session::new(data);
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    if let Some(changes) = session.take_changes() {
        match build_set_cookie(&changes, &state.sessions, state.config.session.secure) {
            Ok(cookie) => {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            Err(err) => {
                tracing::error!("Failed to write session cookie: {}", err);
            }
        }
    }

    response
}

/// Reads and verifies the session cookie, falling back to an empty session
fn load_session(headers: &HeaderMap, codec: &SessionCodec) -> SessionData {
    let Some(token) = find_cookie(headers, SESSION_COOKIE_NAME) else {
        return SessionData::default();
    };

    match codec.decode(&token) {
        Ok(data) => data,
        Err(err) => {
            tracing::debug!(error = %err, "Discarding invalid session cookie");
            SessionData::default()
        }
    }
}

/// Finds a cookie value by name across all `Cookie` headers
fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value_trimmed().to_string())
}

/// Builds the `Set-Cookie` header for the session's new contents
///
/// An emptied session gets a removal cookie instead of a signed one.
fn build_set_cookie(
    data: &SessionData,
    codec: &SessionCodec,
    secure: bool,
) -> anyhow::Result<HeaderValue> {
    let value = if data.is_empty() {
        String::new()
    } else {
        codec.encode(data)?
    };

    let mut cookie = Cookie::build((SESSION_COOKIE_NAME, value))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(codec.max_age().num_seconds()))
        .secure(secure)
        .build();

    if data.is_empty() {
        cookie.make_removal();
    }

    Ok(HeaderValue::from_str(&cookie.to_string())?)
}
