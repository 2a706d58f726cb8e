//! HTTP routes and shared request helpers

pub mod bookings;
pub mod hotels;

use axum::http::{header, HeaderMap};
use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::session::SessionState;
use crate::AppState;

/// Build the application router. Unmatched paths fall back to the entry
/// (listing) document so client-side links never 404.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(hotels::list))
        .route("/hotel/:id", get(hotels::detail))
        .route("/hotel/:id/book", post(bookings::submit))
        .route("/hotel/:id/favorite", post(hotels::toggle_favorite))
        .route("/theme", post(hotels::toggle_theme))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(get(hotels::spa_fallback))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}

/// One request's view of its browsing session
pub(crate) struct Session {
    pub sid: String,
    pub state: SessionState,
}

impl Session {
    /// Load the session named by the `sid` cookie, creating a fresh one
    /// when the cookie is absent or unreadable.
    pub fn from_headers(app: &AppState, headers: &HeaderMap) -> Self {
        let sid = cookie_value(headers, "sid").unwrap_or_else(|| Uuid::new_v4().to_string());
        let state = SessionState::load(app.sessions.as_ref(), &sid);
        Self { sid, state }
    }

    /// Persist the session after a mutation
    pub fn save(&self, app: &AppState) {
        self.state.save(app.sessions.as_ref(), &self.sid);
    }

    /// `Set-Cookie` header pinning this session id. Sent on every page
    /// response; re-setting an existing cookie is harmless.
    pub fn cookie(&self) -> [(header::HeaderName, String); 1] {
        [(
            header::SET_COOKIE,
            format!("sid={}; Path=/; HttpOnly; SameSite=Lax", self.sid),
        )]
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|part| {
        part.trim()
            .strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('='))
            .map(str::to_string)
    })
}

/// Redirect target for "go back" style actions
pub(crate) fn back_url(headers: &HeaderMap) -> String {
    headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| "/".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_value_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; sid=abc-123; other=x"),
        );
        assert_eq!(cookie_value(&headers, "sid").as_deref(), Some("abc-123"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_cookie_name_is_not_prefix_matched() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sidecar=zzz"));
        assert_eq!(cookie_value(&headers, "sid"), None);
    }

    #[test]
    fn test_back_url_defaults_to_root() {
        let headers = HeaderMap::new();
        assert_eq!(back_url(&headers), "/");
    }
}
