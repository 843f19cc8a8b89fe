//! Cached signed-in user for the backend-less variant.
//!
//! The session user is kept as JSON in a file named `quickdesk_user` under
//! the cache directory, readable only by the owner on unix.

use std::fs;
use std::path::{Path, PathBuf};

use qd_core::identity::SessionUser;

use crate::error::AuthError;

pub const CACHE_KEY: &str = "quickdesk_user";

#[derive(Debug, Clone)]
pub struct CredentialCache {
    path: PathBuf,
}

impl CredentialCache {
    /// Cache stored in `dir`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CACHE_KEY),
        }
    }

    /// Cache stored under `~/.quickdesk`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CredentialCache` if the home directory is unknown.
    pub fn in_home() -> Result<Self, AuthError> {
        dirs::home_dir()
            .map(|h| Self::in_dir(h.join(".quickdesk")))
            .ok_or_else(|| {
                AuthError::CredentialCache("home directory not found, cannot cache user".into())
            })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// # Errors
    ///
    /// Returns `AuthError::CredentialCache` if the file cannot be written.
    pub fn store(&self, user: &SessionUser) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AuthError::CredentialCache(format!("mkdir {}: {e}", parent.display()))
            })?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                    tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
                }
            }
        }

        let json = serde_json::to_string(user)
            .map_err(|e| AuthError::CredentialCache(format!("serialize user: {e}")))?;
        fs::write(&self.path, json).map_err(|e| {
            AuthError::CredentialCache(format!("write {}: {e}", self.path.display()))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(|e| {
                AuthError::CredentialCache(format!("chmod {}: {e}", self.path.display()))
            })?;
        }

        Ok(())
    }

    /// The cached user, if a readable one exists. A corrupt file is ignored.
    #[must_use]
    pub fn load(&self) -> Option<SessionUser> {
        let content = fs::read_to_string(&self.path).ok()?;
        if content.trim().is_empty() {
            return None;
        }
        match serde_json::from_str(&content) {
            Ok(user) => Some(user),
            Err(error) => {
                tracing::warn!(%error, path = %self.path.display(), "ignoring unreadable cached user");
                None
            }
        }
    }

    /// # Errors
    ///
    /// Returns `AuthError::CredentialCache` if the file exists but cannot be removed.
    pub fn delete(&self) -> Result<(), AuthError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                AuthError::CredentialCache(format!("delete {}: {e}", self.path.display()))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qd_core::enums::Role;

    fn user() -> SessionUser {
        SessionUser {
            uid: "2".into(),
            name: "Agent Smith".into(),
            email: "agent@example.com".into(),
            role: Role::SupportAgent,
            category_interest: None,
            language: None,
            profile_image: None,
        }
    }

    #[test]
    fn store_load_delete_cycle() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let cache = CredentialCache::in_dir(tmp.path().join("nested"));

        assert!(cache.load().is_none());
        cache.store(&user()).expect("store");
        assert_eq!(cache.load(), Some(user()));
        assert!(cache.path().ends_with(CACHE_KEY));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(cache.path())
                .expect("metadata")
                .permissions()
                .mode()
                & 0o777;
            assert_eq!(mode, 0o600, "cache file should be 0600");
        }

        cache.delete().expect("delete");
        assert!(cache.load().is_none());
        cache.delete().expect("second delete is a no-op");
    }

    #[test]
    fn corrupt_cache_is_ignored() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let cache = CredentialCache::in_dir(tmp.path());
        fs::write(cache.path(), "{not json").expect("write");
        assert!(cache.load().is_none());
    }

    #[test]
    fn whitespace_only_cache_is_empty() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let cache = CredentialCache::in_dir(tmp.path());
        fs::write(cache.path(), "  \n ").expect("write");
        assert!(cache.load().is_none());
    }
}
