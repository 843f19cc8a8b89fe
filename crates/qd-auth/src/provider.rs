//! Auth provider boundary and the in-process provider.

use std::collections::HashMap;

use async_trait::async_trait;
use qd_core::enums::Role;
use qd_core::identity::AuthIdentity;
use sha2::{Digest, Sha256};
use tokio::sync::{RwLock, watch};
use tracing::debug;

use crate::error::AuthError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Email/password identity service.
///
/// The provider owns "who is signed in"; every change is published on
/// [`AuthProvider::identity_changes`].
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthIdentity, AuthError>;

    /// Register a new account and sign it in.
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthIdentity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    fn current_identity(&self) -> Option<AuthIdentity>;

    /// Stream of "current identity or none". The receiver starts at the
    /// current value.
    fn identity_changes(&self) -> watch::Receiver<Option<AuthIdentity>>;
}

/// A built-in account of the backend-less demo variant.
#[derive(Debug, Clone, Copy)]
pub struct DemoAccount {
    pub uid: &'static str,
    pub email: &'static str,
    pub name: &'static str,
    pub role: Role,
}

pub const DEMO_PASSWORD: &str = "password";

pub const DEMO_ACCOUNTS: [DemoAccount; 3] = [
    DemoAccount {
        uid: "1",
        email: "user@example.com",
        name: "John Doe",
        role: Role::EndUser,
    },
    DemoAccount {
        uid: "2",
        email: "agent@example.com",
        name: "Agent Smith",
        role: Role::SupportAgent,
    },
    DemoAccount {
        uid: "3",
        email: "admin@example.com",
        name: "Admin User",
        role: Role::Admin,
    },
];

struct Account {
    identity: AuthIdentity,
    salt: String,
    digest: String,
}

impl Account {
    fn new(identity: AuthIdentity, password: &str) -> Result<Self, AuthError> {
        let mut salt = [0u8; 16];
        getrandom::fill(&mut salt).map_err(|e| AuthError::Provider(e.to_string()))?;
        let salt = hex::encode(salt);
        let digest = password_digest(&salt, password);
        Ok(Self {
            identity,
            salt,
            digest,
        })
    }

    fn verify(&self, password: &str) -> bool {
        password_digest(&self.salt, password) == self.digest
    }
}

fn password_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Auth provider keeping accounts in memory, with salted SHA-256 password
/// digests.
pub struct MemoryAuthProvider {
    accounts: RwLock<HashMap<String, Account>>,
    identity: watch::Sender<Option<AuthIdentity>>,
}

impl MemoryAuthProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::from_accounts(HashMap::new())
    }

    /// Provider preloaded with [`DEMO_ACCOUNTS`], all using [`DEMO_PASSWORD`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Provider` if no salt can be generated.
    pub fn with_demo_accounts() -> Result<Self, AuthError> {
        let mut accounts = HashMap::new();
        for demo in DEMO_ACCOUNTS {
            let identity = AuthIdentity {
                uid: demo.uid.to_string(),
                email: demo.email.to_string(),
                display_name: Some(demo.name.to_string()),
            };
            accounts.insert(
                normalize_email(demo.email),
                Account::new(identity, DEMO_PASSWORD)?,
            );
        }
        Ok(Self::from_accounts(accounts))
    }

    fn from_accounts(accounts: HashMap<String, Account>) -> Self {
        Self {
            accounts: RwLock::new(accounts),
            identity: watch::Sender::new(None),
        }
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    fn publish(&self, identity: Option<AuthIdentity>) {
        debug!(uid = ?identity.as_ref().map(|i| i.uid.as_str()), "identity changed");
        self.identity.send_replace(identity);
    }
}

impl Default for MemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthIdentity, AuthError> {
        let identity = {
            let accounts = self.accounts.read().await;
            let account = accounts
                .get(&normalize_email(email))
                .filter(|a| a.verify(password))
                .ok_or(AuthError::InvalidCredentials)?;
            account.identity.clone()
        };
        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthIdentity, AuthError> {
        let key = normalize_email(email);
        if !key.contains('@') {
            return Err(AuthError::InvalidEmail(email.to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }

        let identity = {
            let mut accounts = self.accounts.write().await;
            if accounts.contains_key(&key) {
                return Err(AuthError::EmailAlreadyInUse(key));
            }
            let uid = qd_store::ids::generate_id().map_err(|e| AuthError::Provider(e.to_string()))?;
            let identity = AuthIdentity {
                uid,
                email: key.clone(),
                display_name: display_name.map(String::from),
            };
            accounts.insert(key, Account::new(identity.clone(), password)?);
            identity
        };
        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.publish(None);
        Ok(())
    }

    fn current_identity(&self) -> Option<AuthIdentity> {
        self.identity.borrow().clone()
    }

    fn identity_changes(&self) -> watch::Receiver<Option<AuthIdentity>> {
        self.identity.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_accounts_sign_in_with_shared_password() {
        let provider = MemoryAuthProvider::with_demo_accounts().unwrap();
        let identity = provider
            .sign_in("admin@example.com", DEMO_PASSWORD)
            .await
            .unwrap();
        assert_eq!(identity.uid, "3");
        assert_eq!(provider.current_identity(), Some(identity));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let provider = MemoryAuthProvider::with_demo_accounts().unwrap();
        let err = provider
            .sign_in("user@example.com", "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(provider.current_identity().is_none());
    }

    #[tokio::test]
    async fn unknown_email_is_invalid_credentials() {
        let provider = MemoryAuthProvider::new();
        let err = provider
            .sign_in("ghost@example.com", "password")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn duplicate_email_rejected_case_insensitively() {
        let provider = MemoryAuthProvider::new();
        provider
            .create_user("Jane@Example.com", "secret123", Some("Jane"))
            .await
            .unwrap();
        let err = provider
            .create_user("jane@example.com", "secret456", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailAlreadyInUse(_)));
        assert_eq!(provider.account_count().await, 1);
    }

    #[tokio::test]
    async fn short_password_rejected() {
        let provider = MemoryAuthProvider::new();
        let err = provider
            .create_user("a@b.com", "123", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword { .. }));
    }

    #[tokio::test]
    async fn identity_stream_follows_sign_in_and_out() {
        let provider = MemoryAuthProvider::with_demo_accounts().unwrap();
        let mut rx = provider.identity_changes();
        assert!(rx.borrow_and_update().is_none());

        provider
            .sign_in("agent@example.com", DEMO_PASSWORD)
            .await
            .unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().uid, "2");

        provider.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }

    #[test]
    fn digests_are_salted() {
        assert_ne!(
            password_digest("aa", "password"),
            password_digest("bb", "password")
        );
    }
}
