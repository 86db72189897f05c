//! Admin handlers: login and the affiliate-link editor.
//!
//! The editor page loads the persisted rules together with a save nonce,
//! previews and tests the unsaved working set, and saves the whole list
//! through the ajax endpoint.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use kuuhaku_auth::{AuthError, AuthSession, Capability, Role};
use kuuhaku_links::{
    preview, stats, test_convert, AffiliateRule, RuleStats, TestConversion, SAVE_ACTION,
};

use crate::error::ApiError;
use crate::extract::JsonOrForm;
use crate::middleware::{clear_session_cookie, session_cookie, session_from_headers};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub username: String,
    pub role: Role,
    pub expires_at: i64,
}

/// What the editor page needs to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorView {
    pub links: Vec<AffiliateRule>,
    /// Nonce for the save action.
    pub nonce: String,
    pub stats: RuleStats,
    pub previews: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub links: Vec<AffiliateRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub links: Vec<AffiliateRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub previews: Vec<String>,
    pub stats: RuleStats,
}

/// Form body of `POST /admin/ajax`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AjaxRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub nonce: Option<String>,
    /// JSON-encoded rule list.
    #[serde(default)]
    pub links: Option<String>,
}

/// Live session with the option-management capability.
async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<AuthSession, ApiError> {
    let id = session_from_headers(headers).ok_or(ApiError::LoginRequired)?;
    let session = state.authorizer.session(&id).await?;
    if !session.role.can(Capability::ManageOptions) {
        return Err(AuthError::InsufficientPermissions.into());
    }
    Ok(session)
}

/// `POST /admin/login`
pub async fn login(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<LoginRequest>,
) -> Result<Response, ApiError> {
    let session = state
        .authorizer
        .login(&request.username, &request.password)
        .await?;
    tracing::info!(username = %session.username, "admin logged in");

    let cookie = session_cookie(&session.id, state.session_ttl_secs);
    let body = LoginResponse {
        username: session.username,
        role: session.role,
        expires_at: session.expires_at,
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// `POST /admin/logout`
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    if let Some(id) = session_from_headers(&headers) {
        state.authorizer.logout(&id).await?;
    }
    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(json!({ "success": true })),
    )
        .into_response())
}

/// `GET /admin/affiliate-links`
pub async fn editor(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<EditorView>, ApiError> {
    let session = require_admin(&state, &headers).await?;
    let nonce = state.authorizer.issue_nonce(SAVE_ACTION, &session.id).await?;
    let links = state.rules.load().await?;
    Ok(Json(EditorView {
        stats: stats(&links),
        previews: links.iter().map(preview).collect(),
        links,
        nonce: nonce.value,
    }))
}

/// `POST /admin/affiliate-links/test`
///
/// Runs the unsaved working set against one URL.
pub async fn test_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonOrForm(request): JsonOrForm<TestRequest>,
) -> Result<Json<TestConversion>, ApiError> {
    require_admin(&state, &headers).await?;
    Ok(Json(test_convert(&request.links, &request.url)?))
}

/// `POST /admin/affiliate-links/preview`
pub async fn preview_links(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonOrForm(request): JsonOrForm<PreviewRequest>,
) -> Result<Json<PreviewResponse>, ApiError> {
    require_admin(&state, &headers).await?;
    Ok(Json(PreviewResponse {
        previews: request.links.iter().map(preview).collect(),
        stats: stats(&request.links),
    }))
}

/// `POST /admin/ajax`
///
/// Replies `{"success":true}` or `{"success":false,"data":<message>}`.
pub async fn ajax(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(request): Form<AjaxRequest>,
) -> Response {
    if request.action != SAVE_ACTION {
        return ajax_error(StatusCode::BAD_REQUEST, "Unknown action");
    }

    let session = session_from_headers(&headers);
    let grant = match state
        .authorizer
        .authorize(
            session.as_ref(),
            &request.action,
            request.nonce.as_deref(),
            Capability::ManageOptions,
        )
        .await
    {
        Ok(grant) => grant,
        Err(e) if e.is_permission_error() => {
            return ajax_error(StatusCode::FORBIDDEN, &e.to_string())
        }
        Err(e) => {
            tracing::error!(error = %e, "authorization failed");
            return ajax_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    let rules: Vec<AffiliateRule> = match request.links.as_deref().map(str::trim) {
        None | Some("") => Vec::new(),
        Some(raw) => match serde_json::from_str(raw) {
            Ok(rules) => rules,
            Err(e) => {
                tracing::warn!(error = %e, "unreadable links payload");
                return ajax_error(StatusCode::BAD_REQUEST, "Invalid links payload");
            }
        },
    };

    match state.rules.replace_all(&grant, &rules).await {
        Ok(_) => Json(json!({ "success": true })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "saving affiliate links failed");
            ajax_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn ajax_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "data": message }))).into_response()
}
