//! # qd-store
//!
//! Boundary to the remote document store.
//!
//! QuickDesk keeps all of its data in five collections of schemaless
//! documents. This crate defines what the rest of the workspace needs from
//! such a store ([`DocumentStore`]), the wire representation of server
//! timestamps, and [`MemoryStore`], an in-process implementation used for
//! local runs and tests.

pub mod document;
pub mod error;
pub mod ids;
pub mod memory;
pub mod subscription;
pub mod timestamp;

pub use document::{Document, Fields, to_fields};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use subscription::{Snapshot, SnapshotEvent, Subscription};
pub use timestamp::{Timestamp, TimestampFields};

use async_trait::async_trait;
use qd_core::enums::Collection;

/// Operations the application performs against the document store.
///
/// Subscriptions are collection-wide; there are no query parameters. Writes
/// may contain [`timestamp::server_timestamp`] sentinels outside arrays.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Open a live subscription to every document of `collection`.
    async fn subscribe(&self, collection: Collection) -> Result<Subscription, StoreError>;

    /// One-shot read of the whole collection.
    async fn list_documents(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    /// Read one document, `None` if it does not exist.
    async fn get_document(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, StoreError>;

    /// Create a document under a store-assigned id and return the id.
    async fn add_document(&self, collection: Collection, fields: Fields)
    -> Result<String, StoreError>;

    /// Create or fully replace the document `id`.
    async fn set_document(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError>;

    /// Merge `fields` into the existing document `id`, top-level keys only.
    ///
    /// Fails with `StoreError::NotFound` if the document does not exist.
    async fn update_document(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError>;

    /// Delete the document `id`. Deleting a missing document succeeds.
    async fn delete_document(&self, collection: Collection, id: &str) -> Result<(), StoreError>;
}
