//! Synchronizer and mutation error types.

use std::time::Duration;

use qd_auth::AuthError;
use qd_core::enums::{Collection, Role};
use qd_core::errors::CoreError;
use qd_store::StoreError;
use thiserror::Error;

/// Errors raised while mirroring collections.
///
/// Subscription failures are logged and empty the affected list; they never
/// reach a caller of the mutation facade.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("subscription to {collection} failed: {reason}")]
    Subscription { collection: Collection, reason: String },

    #[error("timed out after {0:?} waiting for synchronized state")]
    Timeout(Duration),

    #[error("synchronizer has shut down")]
    Closed,
}

/// A rejected mutation. No local state was changed.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("{action} requires {required}, current role is {role}")]
    PermissionDenied {
        action: &'static str,
        required: &'static str,
        role: Role,
    },

    #[error("{collection}/{id} not found")]
    NotFound { collection: Collection, id: String },

    #[error("ticket {0} is closed")]
    TicketClosed(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<StoreError> for MutationError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { collection, id } => Self::NotFound { collection, id },
            other => Self::Store(other),
        }
    }
}

impl From<CoreError> for MutationError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::NotFound { entity_type, id } => Self::Validation(format!(
                "{entity_type} {id} not found"
            )),
            CoreError::Other(e) => Self::Store(StoreError::Other(e)),
        }
    }
}
