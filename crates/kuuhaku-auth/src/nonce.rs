//! Anti-forgery nonces.
//!
//! A nonce is bound to one action name and one session. It stays valid until
//! it expires and may be used more than once, so an open editor page can save
//! repeatedly.

use kuuhaku_options::{option_key, OptionStore};
use serde::{Deserialize, Serialize};

use crate::{current_timestamp, random_token, AuthError, SessionId};

/// An issued nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceToken {
    /// The nonce value handed to the client.
    pub value: String,
    /// Action the nonce authorizes, e.g. `save_affiliate_links`.
    pub action: String,
    pub session_id: SessionId,
    pub created_at: i64,
    pub expires_at: i64,
}

impl NonceToken {
    /// Default lifetime: one day.
    pub const DEFAULT_DURATION_SECS: i64 = 24 * 60 * 60;

    pub fn generate(action: impl Into<String>, session_id: SessionId, ttl_secs: i64) -> Self {
        let now = current_timestamp();
        Self {
            value: random_token(24),
            action: action.into(),
            session_id,
            created_at: now,
            expires_at: now + ttl_secs,
        }
    }

    pub fn is_expired(&self) -> bool {
        current_timestamp() > self.expires_at
    }

    /// Get option key for this nonce.
    pub fn option_key(&self) -> String {
        Self::option_key_for(&self.action, &self.value)
    }

    pub fn option_key_for(action: &str, value: &str) -> String {
        option_key!("nonce", action, value)
    }
}

/// Issues and verifies nonces.
#[derive(Debug, Clone)]
pub struct NonceManager {
    store: OptionStore,
    ttl_secs: i64,
}

impl NonceManager {
    pub fn new(store: OptionStore) -> Self {
        Self {
            store,
            ttl_secs: NonceToken::DEFAULT_DURATION_SECS,
        }
    }

    /// Set nonce lifetime.
    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Issue a nonce for an action within a session.
    pub async fn issue(&self, action: &str, session_id: &SessionId) -> Result<NonceToken, AuthError> {
        let nonce = NonceToken::generate(action, session_id.clone(), self.ttl_secs);
        self.store.set(&nonce.option_key(), &nonce).await?;
        Ok(nonce)
    }

    /// Check a submitted nonce.
    ///
    /// Fails with `InvalidNonce` when the value is empty, unknown, expired, or
    /// was issued to a different session.
    pub async fn verify(
        &self,
        action: &str,
        value: &str,
        session_id: &SessionId,
    ) -> Result<(), AuthError> {
        if value.is_empty() {
            return Err(AuthError::InvalidNonce);
        }
        let key = NonceToken::option_key_for(action, value);
        let nonce: NonceToken = self
            .store
            .get(&key)
            .await?
            .ok_or(AuthError::InvalidNonce)?;
        if nonce.is_expired() {
            self.store.delete(&key).await?;
            return Err(AuthError::InvalidNonce);
        }
        if &nonce.session_id != session_id || nonce.action != action {
            return Err(AuthError::InvalidNonce);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuuhaku_options::MemoryOptionBackend;

    fn manager() -> NonceManager {
        NonceManager::new(OptionStore::new(MemoryOptionBackend::new()))
    }

    #[test]
    fn test_nonce_entropy() {
        let nonce = NonceToken::generate("save_affiliate_links", SessionId::new("s"), 60);
        assert_eq!(nonce.value.len(), 32);
        assert!(nonce
            .value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[tokio::test]
    async fn test_issue_and_verify_reusable() {
        let nonces = manager();
        let session = SessionId::new("sess_a");
        let nonce = nonces.issue("save_affiliate_links", &session).await.unwrap();

        nonces
            .verify("save_affiliate_links", &nonce.value, &session)
            .await
            .unwrap();
        nonces
            .verify("save_affiliate_links", &nonce.value, &session)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wrong_action_session_or_value() {
        let nonces = manager();
        let session = SessionId::new("sess_a");
        let nonce = nonces.issue("save_affiliate_links", &session).await.unwrap();

        let other_session = SessionId::new("sess_b");
        assert!(matches!(
            nonces
                .verify("save_affiliate_links", &nonce.value, &other_session)
                .await,
            Err(AuthError::InvalidNonce)
        ));
        assert!(nonces.verify("delete_everything", &nonce.value, &session).await.is_err());
        assert!(nonces.verify("save_affiliate_links", "", &session).await.is_err());
        assert!(nonces.verify("save_affiliate_links", "forged", &session).await.is_err());
    }

    #[tokio::test]
    async fn test_expired_nonce() {
        let nonces = manager().with_ttl(-1);
        let session = SessionId::new("sess_a");
        let nonce = nonces.issue("save_affiliate_links", &session).await.unwrap();
        assert!(matches!(
            nonces
                .verify("save_affiliate_links", &nonce.value, &session)
                .await,
            Err(AuthError::InvalidNonce)
        ));
    }
}
