//! HTTP request handlers.

pub mod admin;
pub mod posts;
pub mod products;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use kuuhaku_links::settings_script;

use crate::error::ApiError;
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Enabled affiliate rules as a page bootstrap script.
pub async fn affiliate_settings_js(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = state.rules.settings().await?;
    let script = settings_script(&settings)?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        script,
    ))
}
