//! Request middleware: API keys, request IDs and the admin session cookie.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::Instrument;

use kuuhaku_auth::SessionId;
use kuuhaku_observability::{RequestId, REQUEST_ID_HEADER};

use crate::error::ErrorResponse;

/// Cookie carrying the admin session id.
pub const SESSION_COOKIE: &str = "kuuhaku_session";

/// Shared state for API key checks.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// Valid API keys (empty means no auth required)
    keys: Arc<Vec<String>>,
}

impl ApiKeys {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }

    /// Check if authentication is required
    pub fn required(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Validate an API key
    pub fn validate(&self, key: &str) -> bool {
        if self.keys.is_empty() {
            return true;
        }
        self.keys.iter().any(|k| k == key)
    }
}

/// Require a valid API key when any are configured.
///
/// Accepts `Authorization: Bearer <key>` or a bare key.
pub async fn api_key_middleware(
    State(keys): State<ApiKeys>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !keys.required() {
        return next.run(request).await;
    }

    let api_key = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|h| h.strip_prefix("Bearer ").unwrap_or(h).trim());

    match api_key {
        Some(key) if keys.validate(key) => next.run(request).await,
        _ => (StatusCode::UNAUTHORIZED, Json(ErrorResponse::unauthorized())).into_response(),
    }
}

/// Attach a request ID to the request, its tracing span and the response.
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let id = RequestId::from_header(
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
    );
    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    request.extensions_mut().insert(id.clone());

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Session id from the `Cookie` header, if present.
pub fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| SessionId::new(value))
}

/// `Set-Cookie` value starting a session.
pub fn session_cookie(id: &SessionId, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, id, max_age_secs
    )
}

/// `Set-Cookie` value ending a session.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_keys_empty_allows_all() {
        let keys = ApiKeys::new(vec![]);
        assert!(!keys.required());
        assert!(keys.validate("anything"));
    }

    #[test]
    fn test_api_keys_with_keys() {
        let keys = ApiKeys::new(vec!["secret123".to_string(), "key456".to_string()]);
        assert!(keys.required());
        assert!(keys.validate("secret123"));
        assert!(!keys.validate("wrong"));
    }

    #[test]
    fn test_session_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; kuuhaku_session=sess_abc; other=1"),
        );
        assert_eq!(
            session_from_headers(&headers),
            Some(SessionId::new("sess_abc"))
        );

        let mut empty = HeaderMap::new();
        empty.insert(header::COOKIE, HeaderValue::from_static("kuuhaku_session="));
        assert_eq!(session_from_headers(&empty), None);
        assert_eq!(session_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_cookie_strings() {
        let cookie = session_cookie(&SessionId::new("sess_abc"), 60);
        assert!(cookie.starts_with("kuuhaku_session=sess_abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(clear_session_cookie().ends_with("Max-Age=0"));
    }
}
