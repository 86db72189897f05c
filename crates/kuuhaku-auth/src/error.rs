//! Authentication errors.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid credentials provided.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Session not found or expired.
    #[error("session not found or expired")]
    SessionNotFound,

    /// Session expired.
    #[error("session expired")]
    SessionExpired,

    /// Anti-forgery nonce missing, unknown, expired, or bound elsewhere.
    #[error("Invalid nonce")]
    InvalidNonce,

    /// Insufficient permissions.
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// Stored password hash could not be parsed.
    #[error("invalid password hash: {0}")]
    InvalidHash(String),

    /// Option store error.
    #[error("option store error: {0}")]
    Options(#[from] kuuhaku_options::OptionsError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::SessionNotFound | AuthError::SessionExpired
        )
    }

    /// Check if this is a permission error.
    pub fn is_permission_error(&self) -> bool {
        matches!(
            self,
            AuthError::InsufficientPermissions | AuthError::InvalidNonce
        )
    }
}
