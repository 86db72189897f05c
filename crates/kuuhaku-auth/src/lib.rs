//! Admin authentication for the Kuuhaku affiliate site.
//!
//! Provides admin accounts with argon2 password hashes, login sessions,
//! action-bound nonces, and the [`Authorizer`] that turns a session plus a
//! nonce into an [`AdminGrant`] for privileged writes.

mod account;
mod authorizer;
mod error;
mod nonce;
mod password;
mod role;
mod session;

pub use account::{AccountDirectory, AdminAccount};
pub use authorizer::{AdminGrant, Authorizer};
pub use error::AuthError;
pub use nonce::{NonceManager, NonceToken};
pub use password::{hash_password, verify_password};
pub use role::{Capability, Role};
pub use session::{AuthSession, SessionId, SessionManager};

/// Get current Unix timestamp.
pub(crate) fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Generate a URL-safe random string from `len` random bytes.
pub(crate) fn random_token(len: usize) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use rand::RngCore;

    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
