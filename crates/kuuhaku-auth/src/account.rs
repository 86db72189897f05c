//! Admin accounts.

use serde::{Deserialize, Serialize};

use crate::password::verify_password;
use crate::{AuthError, Role};

/// An admin account as declared in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
}

impl AdminAccount {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            role,
        }
    }
}

/// The set of accounts allowed to log in.
#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    accounts: Vec<AdminAccount>,
}

impl AccountDirectory {
    pub fn new(accounts: Vec<AdminAccount>) -> Self {
        Self { accounts }
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn find(&self, username: &str) -> Option<&AdminAccount> {
        self.accounts.iter().find(|a| a.username == username)
    }

    /// Check a username and password.
    ///
    /// Unknown users and wrong passwords both yield `InvalidCredentials`.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<&AdminAccount, AuthError> {
        let account = self.find(username).ok_or(AuthError::InvalidCredentials)?;
        if verify_password(password, &account.password_hash)? {
            Ok(account)
        } else {
            tracing::warn!(username = %username, "failed admin login");
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_password;

    #[test]
    fn test_authenticate() {
        let hash = hash_password("pass1234").unwrap();
        let dir = AccountDirectory::new(vec![AdminAccount::new("kuma", hash, Role::Administrator)]);

        assert_eq!(dir.authenticate("kuma", "pass1234").unwrap().username, "kuma");
        assert!(matches!(
            dir.authenticate("kuma", "nope"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            dir.authenticate("ghost", "pass1234"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_role_defaults_to_administrator() {
        let account: AdminAccount = serde_json::from_value(serde_json::json!({
            "username": "kuma",
            "password_hash": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA",
        }))
        .unwrap();
        assert_eq!(account.role, Role::Administrator);
    }
}
