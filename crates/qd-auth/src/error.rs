use qd_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already in use: {0}")]
    EmailAlreadyInUse(String),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("not authenticated")]
    NotAuthenticated,

    /// The profile document could not be read or decoded. Never returned from
    /// `login`; the session falls back to the default role instead.
    #[error("profile lookup failed for {uid}: {reason}")]
    ProfileLookup { uid: String, reason: String },

    #[error("credential cache error: {0}")]
    CredentialCache(String),

    #[error("auth provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
