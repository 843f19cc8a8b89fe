//! Document store error types.

use qd_core::enums::Collection;
use thiserror::Error;

/// Errors from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed document does not exist.
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: Collection, id: String },

    /// The store refused the operation for the current credentials.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The store could not be reached or rejected the write.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A live subscription was terminated by the store.
    #[error("Subscription to {collection} failed: {reason}")]
    Subscription { collection: Collection, reason: String },

    /// A document could not be mapped into its entity type.
    #[error("Cannot decode {collection}/{id}: {reason}")]
    Decode {
        collection: Collection,
        id: String,
        reason: String,
    },

    /// Random id generation failed.
    #[error("Id generation failed: {0}")]
    IdGeneration(String),

    /// JSON (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
