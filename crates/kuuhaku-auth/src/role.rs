//! Roles and capabilities.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Admin role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Can log in, nothing else.
    Subscriber,
    /// Can write posts.
    Editor,
    /// Full site administration.
    #[default]
    Administrator,
}

impl Role {
    /// Get role as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Subscriber => "subscriber",
            Role::Editor => "editor",
            Role::Administrator => "administrator",
        }
    }

    /// Check if this role has at least the given permission level.
    pub fn has_permission(&self, required: Role) -> bool {
        self.level() >= required.level()
    }

    /// Get permission level (higher = more permissions).
    pub fn level(&self) -> u8 {
        match self {
            Role::Subscriber => 0,
            Role::Editor => 1,
            Role::Administrator => 2,
        }
    }

    /// Check whether the role grants a capability.
    pub fn can(&self, capability: Capability) -> bool {
        self.has_permission(capability.required_role())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscriber" => Ok(Role::Subscriber),
            "editor" => Ok(Role::Editor),
            "administrator" => Ok(Role::Administrator),
            _ => Err(()),
        }
    }
}

/// A named privilege checked before privileged writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Change site options, including the affiliate rule list.
    ManageOptions,
    /// Create and edit posts.
    EditPosts,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageOptions => "manage_options",
            Capability::EditPosts => "edit_posts",
        }
    }

    /// Lowest role holding this capability.
    pub fn required_role(&self) -> Role {
        match self {
            Capability::ManageOptions => Role::Administrator,
            Capability::EditPosts => Role::Editor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(Role::Administrator.has_permission(Role::Editor));
        assert!(Role::Editor.has_permission(Role::Subscriber));
        assert!(!Role::Editor.has_permission(Role::Administrator));
    }

    #[test]
    fn test_capabilities() {
        assert!(Role::Administrator.can(Capability::ManageOptions));
        assert!(!Role::Editor.can(Capability::ManageOptions));
        assert!(Role::Editor.can(Capability::EditPosts));
        assert!(!Role::Subscriber.can(Capability::EditPosts));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("editor".parse::<Role>(), Ok(Role::Editor));
        assert!("root".parse::<Role>().is_err());
        let role: Role = serde_json::from_str("\"subscriber\"").unwrap();
        assert_eq!(role, Role::Subscriber);
    }
}
