//! Persisted rule list.

use kuuhaku_auth::{AdminGrant, Capability};
use kuuhaku_options::OptionStore;

use crate::error::LinkError;
use crate::rule::{sanitize_rules, AffiliateRule, AffiliateSettings};

/// Option name holding the rule list.
pub const RULES_OPTION: &str = "lovedoll_affiliate_links";

/// Nonce action guarding saves.
pub const SAVE_ACTION: &str = "save_affiliate_links";

/// The rule list in option storage.
#[derive(Debug, Clone)]
pub struct RuleStore {
    options: OptionStore,
}

impl RuleStore {
    pub fn new(options: OptionStore) -> Self {
        Self { options }
    }

    /// All persisted rules, in order. Unset means empty.
    pub async fn load(&self) -> Result<Vec<AffiliateRule>, LinkError> {
        Ok(self.options.get_or_default(RULES_OPTION).await?)
    }

    /// Persisted rules wrapped as settings.
    pub async fn settings(&self) -> Result<AffiliateSettings, LinkError> {
        Ok(AffiliateSettings::new(self.load().await?))
    }

    /// Replace the whole list.
    ///
    /// Rules are trimmed and rows without a domain or param are dropped
    /// before the single write. Returns what was stored.
    pub async fn replace_all(
        &self,
        grant: &AdminGrant,
        rules: &[AffiliateRule],
    ) -> Result<Vec<AffiliateRule>, LinkError> {
        if grant.action() != SAVE_ACTION || grant.capability() != Capability::ManageOptions {
            return Err(LinkError::WrongGrant(grant.action().to_string()));
        }
        let cleaned = sanitize_rules(rules);
        self.options.set(RULES_OPTION, &cleaned).await?;
        tracing::info!(
            username = grant.username(),
            submitted = rules.len(),
            saved = cleaned.len(),
            "affiliate links saved"
        );
        Ok(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuuhaku_auth::{hash_password, AccountDirectory, AdminAccount, Authorizer, Role};
    use kuuhaku_options::MemoryOptionBackend;

    async fn grant(store: &OptionStore, action: &str) -> AdminGrant {
        let accounts = AccountDirectory::new(vec![AdminAccount::new(
            "kuma",
            hash_password("pass1234").unwrap(),
            Role::Administrator,
        )]);
        let auth = Authorizer::new(accounts, store.clone());
        let session = auth.login("kuma", "pass1234").await.unwrap();
        let nonce = auth.issue_nonce(action, &session.id).await.unwrap();
        auth.authorize(
            Some(&session.id),
            action,
            Some(&nonce.value),
            Capability::ManageOptions,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_load_unset_is_empty() {
        let store = RuleStore::new(OptionStore::new(MemoryOptionBackend::new()));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_all_sanitizes() {
        let options = OptionStore::new(MemoryOptionBackend::new());
        let store = RuleStore::new(options.clone());
        let grant = grant(&options, SAVE_ACTION).await;

        let saved = store
            .replace_all(
                &grant,
                &[
                    AffiliateRule::new("YourDoll", " yourdoll.jp", "?ref=kuuhaku-lovedoll "),
                    AffiliateRule::new("half", "example.com", ""),
                ],
            )
            .await
            .unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(store.load().await.unwrap(), saved);
        assert_eq!(store.load().await.unwrap()[0].domain, "yourdoll.jp");
    }

    #[tokio::test]
    async fn test_grant_for_other_action_rejected() {
        let options = OptionStore::new(MemoryOptionBackend::new());
        let store = RuleStore::new(options.clone());
        let grant = grant(&options, "something_else").await;

        let result = store
            .replace_all(&grant, &[AffiliateRule::new("a", "a.jp", "x=1")])
            .await;
        assert!(matches!(result, Err(LinkError::WrongGrant(_))));
        assert!(store.load().await.unwrap().is_empty());
    }
}
