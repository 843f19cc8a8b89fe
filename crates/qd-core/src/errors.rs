//! Cross-cutting error types for QuickDesk.
//!
//! Crate-specific errors (`StoreError`, `AuthError`, `MutationError`) live in
//! their own crates and wrap this one where a core check fails.

use thiserror::Error;

/// Errors that can be raised by any QuickDesk crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A payload failed field validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
