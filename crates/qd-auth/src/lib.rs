//! # qd-auth
//!
//! Authentication for QuickDesk.
//!
//! Provides the [`AuthProvider`] boundary (email/password sign-in plus an
//! identity change stream), an in-process [`MemoryAuthProvider`], the
//! [`SessionStore`] that turns identities into role-carrying session users
//! via a profile lookup, and the optional on-disk cache of the signed-in user
//! used by the backend-less variant.

pub mod credential_cache;
pub mod error;
pub mod profile;
pub mod provider;
pub mod session;

pub use credential_cache::CredentialCache;
pub use error::AuthError;
pub use provider::{AuthProvider, DEMO_ACCOUNTS, DEMO_PASSWORD, DemoAccount, MemoryAuthProvider};
pub use session::{SessionState, SessionStore};
