//! Typed option storage for the Kuuhaku affiliate site.
//!
//! Options are named JSON values: the affiliate rule list, admin sessions and
//! anti-forgery nonces all live here. Backends only move raw JSON text around;
//! [`OptionStore`] adds typed access on top.
//!
//! # Example
//!
//! ```rust,ignore
//! use kuuhaku_options::{MemoryOptionBackend, OptionStore};
//!
//! let store = OptionStore::new(MemoryOptionBackend::new());
//!
//! store.set("lovedoll_affiliate_links", &rules).await?;
//! let rules: Option<Vec<AffiliateRule>> = store.get("lovedoll_affiliate_links").await?;
//! ```

mod error;
mod memory;
mod store;

pub use error::OptionsError;
pub use memory::MemoryOptionBackend;
pub use store::{OptionBackend, OptionStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{MemoryOptionBackend, OptionBackend, OptionStore, OptionsError};
}

/// Helper to build option keys with namespacing.
///
/// # Example
///
/// ```rust,ignore
/// let key = option_key!("nonce", action, value);
/// // Returns "nonce:save_affiliate_links:abc"
/// ```
#[macro_export]
macro_rules! option_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_option_key() {
        let key = option_key!("nonce", "save_affiliate_links", "abc");
        assert_eq!(key, "nonce:save_affiliate_links:abc");

        let key = option_key!("session", 42);
        assert_eq!(key, "session:42");
    }
}
