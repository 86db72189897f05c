//! Authorization of privileged writes.

use kuuhaku_options::OptionStore;

use crate::{
    AccountDirectory, AuthError, AuthSession, Capability, NonceManager, NonceToken, SessionId,
    SessionManager,
};

/// Proof that a caller passed the nonce and capability checks.
///
/// Only [`Authorizer::authorize`] can produce one, so functions that take an
/// `AdminGrant` cannot be reached without authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminGrant {
    username: String,
    action: String,
    capability: Capability,
}

impl AdminGrant {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }
}

/// Ties accounts, sessions and nonces together.
#[derive(Debug, Clone)]
pub struct Authorizer {
    accounts: AccountDirectory,
    sessions: SessionManager,
    nonces: NonceManager,
}

impl Authorizer {
    pub fn new(accounts: AccountDirectory, store: OptionStore) -> Self {
        Self {
            accounts,
            sessions: SessionManager::new(store.clone()),
            nonces: NonceManager::new(store),
        }
    }

    /// Set session and nonce lifetimes.
    pub fn with_ttls(mut self, session_ttl_secs: i64, nonce_ttl_secs: i64) -> Self {
        self.sessions = self.sessions.with_ttl(session_ttl_secs);
        self.nonces = self.nonces.with_ttl(nonce_ttl_secs);
        self
    }

    pub fn accounts(&self) -> &AccountDirectory {
        &self.accounts
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Check credentials and start a session.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        let account = self.accounts.authenticate(username, password)?;
        self.sessions.create(account).await
    }

    /// End a session.
    pub async fn logout(&self, session_id: &SessionId) -> Result<(), AuthError> {
        self.sessions.destroy(session_id).await
    }

    /// Load the live session behind an id.
    pub async fn session(&self, session_id: &SessionId) -> Result<AuthSession, AuthError> {
        self.sessions.get(session_id).await
    }

    /// Issue a nonce for an action in a live session.
    pub async fn issue_nonce(
        &self,
        action: &str,
        session_id: &SessionId,
    ) -> Result<NonceToken, AuthError> {
        let session = self.sessions.get(session_id).await?;
        self.nonces.issue(action, &session.id).await
    }

    /// Authorize a privileged action.
    ///
    /// The nonce is checked first, then the session's role against the
    /// capability. Without a live session the nonce cannot match, so a
    /// missing session also reports `InvalidNonce`.
    pub async fn authorize(
        &self,
        session_id: Option<&SessionId>,
        action: &str,
        nonce: Option<&str>,
        capability: Capability,
    ) -> Result<AdminGrant, AuthError> {
        let session = match session_id {
            Some(id) => match self.sessions.get(id).await {
                Ok(session) => Some(session),
                Err(AuthError::Options(e)) => return Err(AuthError::Options(e)),
                Err(_) => None,
            },
            None => None,
        };
        let Some(session) = session else {
            tracing::warn!(action = %action, "privileged action without a session");
            return Err(AuthError::InvalidNonce);
        };

        self.nonces
            .verify(action, nonce.unwrap_or_default(), &session.id)
            .await?;

        if !session.role.can(capability) {
            tracing::warn!(
                username = %session.username,
                capability = capability.as_str(),
                "capability check failed"
            );
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminGrant {
            username: session.username,
            action: action.to_string(),
            capability,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hash_password, AdminAccount, Role};
    use kuuhaku_options::MemoryOptionBackend;

    fn authorizer() -> Authorizer {
        let hash = hash_password("pass1234").unwrap();
        let accounts = AccountDirectory::new(vec![
            AdminAccount::new("kuma", hash.clone(), Role::Administrator),
            AdminAccount::new("writer", hash, Role::Editor),
        ]);
        Authorizer::new(accounts, OptionStore::new(MemoryOptionBackend::new()))
    }

    #[tokio::test]
    async fn test_authorize_admin() {
        let auth = authorizer();
        let session = auth.login("kuma", "pass1234").await.unwrap();
        let nonce = auth
            .issue_nonce("save_affiliate_links", &session.id)
            .await
            .unwrap();

        let grant = auth
            .authorize(
                Some(&session.id),
                "save_affiliate_links",
                Some(&nonce.value),
                Capability::ManageOptions,
            )
            .await
            .unwrap();
        assert_eq!(grant.username(), "kuma");
        assert_eq!(grant.capability(), Capability::ManageOptions);
    }

    #[tokio::test]
    async fn test_editor_lacks_manage_options() {
        let auth = authorizer();
        let session = auth.login("writer", "pass1234").await.unwrap();
        let nonce = auth
            .issue_nonce("save_affiliate_links", &session.id)
            .await
            .unwrap();

        let result = auth
            .authorize(
                Some(&session.id),
                "save_affiliate_links",
                Some(&nonce.value),
                Capability::ManageOptions,
            )
            .await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn test_nonce_checked_before_capability() {
        let auth = authorizer();
        let session = auth.login("writer", "pass1234").await.unwrap();

        let result = auth
            .authorize(
                Some(&session.id),
                "save_affiliate_links",
                Some("forged"),
                Capability::ManageOptions,
            )
            .await;
        assert!(matches!(result, Err(AuthError::InvalidNonce)));
    }

    #[tokio::test]
    async fn test_missing_session() {
        let auth = authorizer();
        let result = auth
            .authorize(None, "save_affiliate_links", Some("x"), Capability::ManageOptions)
            .await;
        assert!(matches!(result, Err(AuthError::InvalidNonce)));

        let after_logout = auth.login("kuma", "pass1234").await.unwrap();
        auth.logout(&after_logout.id).await.unwrap();
        assert!(auth.issue_nonce("save_affiliate_links", &after_logout.id).await.is_err());
    }
}
