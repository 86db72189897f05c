//! HTTP error mapping.

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use kuuhaku_auth::AuthError;
use kuuhaku_catalog::CatalogError;
use kuuhaku_links::LinkError;

/// Error body for the JSON API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }

    pub fn unauthorized() -> Self {
        Self::new("unauthorized", "Invalid or missing API key")
    }
}

/// Errors surfaced by request handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Links(#[from] LinkError),

    /// The request body or query could not be read.
    #[error("{0}")]
    BadRequest(String),

    /// No admin session on a route that needs one.
    #[error("login required")]
    LoginRequired,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Catalog(e) => match e {
                CatalogError::InvalidParams(_) => StatusCode::BAD_REQUEST,
                CatalogError::PriceTooHigh(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CatalogError::ProductNotFound(_) | CatalogError::PostNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                CatalogError::StorageError(_) | CatalogError::SerializationError(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Auth(e) if e.is_auth_failure() => StatusCode::UNAUTHORIZED,
            ApiError::Auth(e) if e.is_permission_error() => StatusCode::FORBIDDEN,
            ApiError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Links(e) => match e {
                LinkError::RowOutOfRange(_) | LinkError::EmptyTestUrl => StatusCode::BAD_REQUEST,
                LinkError::WrongGrant(_) => StatusCode::FORBIDDEN,
                LinkError::Options(_) | LinkError::Serialization(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::LoginRequired => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Catalog(e) => e.code(),
            ApiError::Auth(AuthError::InvalidCredentials) => "invalid_credentials",
            ApiError::Auth(AuthError::InvalidNonce) => "invalid_nonce",
            ApiError::Auth(AuthError::InsufficientPermissions) => "forbidden",
            ApiError::Auth(e) if e.is_auth_failure() => "login_required",
            ApiError::Auth(_) => "internal_error",
            ApiError::Links(LinkError::EmptyTestUrl) => "empty_test_url",
            ApiError::Links(LinkError::RowOutOfRange(_)) => "invalid_params",
            ApiError::Links(LinkError::WrongGrant(_)) => "forbidden",
            ApiError::Links(_) => "internal_error",
            ApiError::BadRequest(_) => "invalid_params",
            ApiError::LoginRequired => "login_required",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            ErrorResponse::internal_error("Internal server error")
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
            ErrorResponse::new(self.code(), self.to_string())
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let missing = ApiError::from(CatalogError::InvalidParams("x".into()));
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.code(), "invalid_params");

        let pricey = ApiError::from(CatalogError::PriceTooHigh(1_200_000));
        assert_eq!(pricey.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(pricey.code(), "price_too_high");

        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidNonce).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(LinkError::EmptyTestUrl).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CatalogError::StorageError("disk".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
