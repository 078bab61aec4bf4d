//! Caller identity used for per-caller quotas.

use std::fmt;

use sha2::{Digest, Sha256};

/// Who is asking.
///
/// Guests are identified by a salted hash of their address so that raw
/// IPs never reach a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// An authenticated user.
    User(String),
    /// An anonymous caller, keyed by hashed address.
    Guest(String),
}

impl Identity {
    /// Identity for an authenticated user id.
    pub fn user(id: impl fmt::Display) -> Self {
        Identity::User(id.to_string())
    }

    /// Identity for an anonymous caller at `ip`.
    pub fn guest(ip: &str, salt: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(ip.as_bytes());
        hasher.update(salt.as_bytes());
        Identity::Guest(format!("{:x}", hasher.finalize()))
    }

    /// Store key fragment for this identity.
    pub fn key(&self) -> String {
        match self {
            Identity::User(id) => format!("user_{id}"),
            Identity::Guest(hash) => format!("guest_{hash}"),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_key() {
        assert_eq!(Identity::user(42).key(), "user_42");
    }

    #[test]
    fn test_guest_key_hides_address() {
        let identity = Identity::guest("203.0.113.9", "salt");
        let key = identity.key();
        assert!(key.starts_with("guest_"));
        assert!(!key.contains("203.0.113.9"));
        assert_eq!(key.len(), "guest_".len() + 64);
    }

    #[test]
    fn test_guest_hash_depends_on_salt() {
        assert_eq!(
            Identity::guest("10.0.0.1", "a"),
            Identity::guest("10.0.0.1", "a")
        );
        assert_ne!(
            Identity::guest("10.0.0.1", "a"),
            Identity::guest("10.0.0.1", "b")
        );
        assert_ne!(
            Identity::guest("10.0.0.1", "a"),
            Identity::guest("10.0.0.2", "a")
        );
    }
}
