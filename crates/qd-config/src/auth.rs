//! Auth provider configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Provider API key.
    #[serde(default)]
    pub api_key: String,

    /// Provider auth domain (e.g. `quickdesk.example.com`).
    #[serde(default)]
    pub auth_domain: String,

    /// Persist the signed-in user to a local file (`quickdesk_user`).
    ///
    /// Only meaningful for the demo variant that runs without a remote
    /// provider; a real provider restores its own sessions.
    #[serde(default)]
    pub credential_cache: bool,

    /// Directory for the credential cache. Empty means `~/.quickdesk`.
    #[serde(default)]
    pub cache_dir: String,
}

impl AuthConfig {
    /// Check if the remote provider has the minimum required fields.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.auth_domain.is_empty()
    }

    /// Resolved credential cache directory, if one can be determined.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        if self.cache_dir.is_empty() {
            dirs::home_dir().map(|h| h.join(".quickdesk"))
        } else {
            Some(PathBuf::from(&self.cache_dir))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = AuthConfig::default();
        assert!(!config.is_configured());
        assert!(!config.credential_cache);
    }

    #[test]
    fn configured_when_key_and_domain_set() {
        let config = AuthConfig {
            api_key: "key-123".into(),
            auth_domain: "quickdesk.example.com".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }

    #[test]
    fn explicit_cache_dir_wins() {
        let config = AuthConfig {
            cache_dir: "/tmp/qd-cache".into(),
            ..Default::default()
        };
        assert_eq!(config.cache_dir(), Some(PathBuf::from("/tmp/qd-cache")));
    }
}
