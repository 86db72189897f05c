//! Admin login sessions stored as options.

use kuuhaku_options::{option_key, OptionStore};
use serde::{Deserialize, Serialize};

use crate::{current_timestamp, random_token, AdminAccount, AuthError, Role};

/// A unique session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new cryptographically secure session ID.
    pub fn generate() -> Self {
        Self(format!("sess_{}", random_token(18)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A logged-in admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub id: SessionId,
    pub username: String,
    pub role: Role,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp when session expires.
    pub expires_at: i64,
}

impl AuthSession {
    /// Default session duration: 2 days.
    pub const DEFAULT_DURATION_SECS: i64 = 2 * 24 * 60 * 60;

    /// Create a session for an account.
    pub fn for_account(account: &AdminAccount) -> Self {
        let now = current_timestamp();
        Self {
            id: SessionId::generate(),
            username: account.username.clone(),
            role: account.role,
            created_at: now,
            expires_at: now + Self::DEFAULT_DURATION_SECS,
        }
    }

    /// Create session with custom duration.
    pub fn with_duration(mut self, duration_secs: i64) -> Self {
        self.expires_at = self.created_at + duration_secs;
        self
    }

    /// Check if session is expired.
    pub fn is_expired(&self) -> bool {
        current_timestamp() > self.expires_at
    }

    /// Validate the session, returning error if invalid.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.is_expired() {
            Err(AuthError::SessionExpired)
        } else {
            Ok(())
        }
    }

    /// Get option key for this session.
    pub fn option_key(&self) -> String {
        Self::option_key_for(&self.id)
    }

    pub fn option_key_for(id: &SessionId) -> String {
        option_key!("session", id)
    }
}

/// Creates, loads and ends sessions.
#[derive(Debug, Clone)]
pub struct SessionManager {
    store: OptionStore,
    ttl_secs: i64,
}

impl SessionManager {
    pub fn new(store: OptionStore) -> Self {
        Self {
            store,
            ttl_secs: AuthSession::DEFAULT_DURATION_SECS,
        }
    }

    /// Set session lifetime.
    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Start a session for an authenticated account.
    pub async fn create(&self, account: &AdminAccount) -> Result<AuthSession, AuthError> {
        let session = AuthSession::for_account(account).with_duration(self.ttl_secs);
        self.store.set(&session.option_key(), &session).await?;
        tracing::info!(username = %session.username, "admin session started");
        Ok(session)
    }

    /// Load a live session. Expired sessions are removed.
    pub async fn get(&self, id: &SessionId) -> Result<AuthSession, AuthError> {
        let key = AuthSession::option_key_for(id);
        let session: AuthSession = self
            .store
            .get(&key)
            .await?
            .ok_or(AuthError::SessionNotFound)?;
        if let Err(e) = session.validate() {
            self.store.delete(&key).await?;
            return Err(e);
        }
        Ok(session)
    }

    /// End a session.
    pub async fn destroy(&self, id: &SessionId) -> Result<(), AuthError> {
        self.store.delete(&AuthSession::option_key_for(id)).await?;
        Ok(())
    }

    /// Remove all expired sessions, returning how many were removed.
    pub async fn purge_expired(&self) -> Result<usize, AuthError> {
        let mut removed = 0;
        for key in self.store.keys("session:").await? {
            let expired = match self.store.get::<AuthSession>(&key).await {
                Ok(Some(session)) => session.is_expired(),
                Ok(None) => false,
                Err(_) => true,
            };
            if expired {
                self.store.delete(&key).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
