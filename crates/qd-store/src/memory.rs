//! In-process document store.
//!
//! `MemoryStore` keeps every collection in a `BTreeMap` keyed by document id
//! behind one `RwLock`, and publishes a full snapshot on a per-collection
//! `broadcast` channel after each write that changes the collection. Snapshots
//! are published while the write lock is held, so a subscriber that captured
//! its initial snapshot under the read lock never misses or reorders a change.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use qd_core::enums::Collection;
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

use crate::DocumentStore;
use crate::document::{Document, Fields};
use crate::error::StoreError;
use crate::ids::generate_id;
use crate::subscription::{Snapshot, SnapshotEvent, Subscription};
use crate::timestamp::{Timestamp, resolve_sentinels};

pub const DEFAULT_SNAPSHOT_BUFFER: usize = 64;

#[derive(Default)]
struct State {
    collections: HashMap<Collection, BTreeMap<String, Fields>>,
    failing: HashMap<Collection, String>,
    rejecting_writes: Option<String>,
}

impl State {
    fn snapshot(&self, collection: Collection) -> Snapshot {
        Arc::new(
            self.collections
                .get(&collection)
                .map(|docs| {
                    docs.iter()
                        .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                        .collect()
                })
                .unwrap_or_default(),
        )
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        match &self.rejecting_writes {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

/// Document store held entirely in memory.
pub struct MemoryStore {
    state: RwLock<State>,
    channels: HashMap<Collection, broadcast::Sender<SnapshotEvent>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_buffer(DEFAULT_SNAPSHOT_BUFFER)
    }

    /// `buffer` is the number of snapshots a slow subscriber may fall behind
    /// before older ones are dropped. Clamped to at least 1.
    #[must_use]
    pub fn with_buffer(buffer: usize) -> Self {
        let channels = Collection::ALL
            .into_iter()
            .map(|c| (c, broadcast::channel(buffer.max(1)).0))
            .collect();
        Self {
            state: RwLock::new(State::default()),
            channels,
        }
    }

    /// Terminate every open subscription to `collection` with `reason`, and
    /// make new subscriptions to it fail until [`Self::restore_subscriptions`].
    pub async fn fail_subscriptions(&self, collection: Collection, reason: impl Into<String>) {
        let reason = reason.into();
        let mut state = self.state.write().await;
        state.failing.insert(collection, reason.clone());
        self.publish(collection, SnapshotEvent::Failed(reason));
    }

    pub async fn restore_subscriptions(&self, collection: Collection) {
        self.state.write().await.failing.remove(&collection);
    }

    /// Reject every write with `StoreError::Unavailable(reason)`; `None`
    /// accepts writes again.
    pub async fn reject_writes(&self, reason: Option<String>) {
        self.state.write().await.rejecting_writes = reason;
    }

    /// Number of documents currently in `collection`.
    pub async fn len(&self, collection: Collection) -> usize {
        self.state
            .read()
            .await
            .collections
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }

    fn publish(&self, collection: Collection, event: SnapshotEvent) {
        if let Some(tx) = self.channels.get(&collection) {
            // No receivers is not an error.
            let _ = tx.send(event);
        }
    }

    fn publish_snapshot(&self, state: &State, collection: Collection) {
        let snapshot = state.snapshot(collection);
        debug!(%collection, documents = snapshot.len(), "publishing snapshot");
        self.publish(collection, SnapshotEvent::Snapshot(snapshot));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn subscribe(&self, collection: Collection) -> Result<Subscription, StoreError> {
        let state = self.state.read().await;
        if let Some(reason) = state.failing.get(&collection) {
            return Ok(Subscription::failed(collection, reason.clone()));
        }
        let tx = self
            .channels
            .get(&collection)
            .ok_or_else(|| StoreError::Unavailable(format!("no channel for {collection}")))?;
        Ok(Subscription::new(
            collection,
            state.snapshot(collection),
            tx.subscribe(),
        ))
    }

    async fn list_documents(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let snapshot = self.state.read().await.snapshot(collection);
        Ok(snapshot.as_ref().clone())
    }

    async fn get_document(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .collections
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn add_document(
        &self,
        collection: Collection,
        mut fields: Fields,
    ) -> Result<String, StoreError> {
        let mut state = self.state.write().await;
        state.check_writable()?;
        resolve_sentinels(&mut fields, Timestamp::now());

        let docs = state.collections.entry(collection).or_default();
        let mut id = generate_id()?;
        while docs.contains_key(&id) {
            id = generate_id()?;
        }
        docs.insert(id.clone(), fields);

        self.publish_snapshot(&state, collection);
        Ok(id)
    }

    async fn set_document(
        &self,
        collection: Collection,
        id: &str,
        mut fields: Fields,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.check_writable()?;
        resolve_sentinels(&mut fields, Timestamp::now());

        let previous = state
            .collections
            .entry(collection)
            .or_default()
            .insert(id.to_string(), fields.clone());
        if previous.as_ref() != Some(&fields) {
            self.publish_snapshot(&state, collection);
        }
        Ok(())
    }

    async fn update_document(
        &self,
        collection: Collection,
        id: &str,
        mut fields: Fields,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.check_writable()?;
        resolve_sentinels(&mut fields, Timestamp::now());

        let existing = state
            .collections
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        let mut changed = false;
        for (key, value) in fields {
            if existing.get(&key) != Some(&value) {
                existing.insert(key, value);
                changed = true;
            }
        }
        if changed {
            self.publish_snapshot(&state, collection);
        }
        Ok(())
    }

    async fn delete_document(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.check_writable()?;

        let removed = state
            .collections
            .get_mut(&collection)
            .and_then(|docs| docs.remove(id));
        if removed.is_some() {
            self.publish_snapshot(&state, collection);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::{convert, server_timestamp};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn add_assigns_id_and_resolves_sentinels() {
        let store = MemoryStore::new();
        let id = store
            .add_document(
                Collection::Tickets,
                fields(json!({ "title": "Printer", "createdAt": server_timestamp() })),
            )
            .await
            .unwrap();
        assert_eq!(id.len(), crate::ids::ID_LEN);

        let doc = store
            .get_document(Collection::Tickets, &id)
            .await
            .unwrap()
            .unwrap();
        assert!(convert(doc.get("createdAt").unwrap()).is_some());
    }

    #[tokio::test]
    async fn update_merges_top_level_fields() {
        let store = MemoryStore::new();
        store
            .set_document(
                Collection::Users,
                "u1",
                fields(json!({ "name": "Jane", "role": "end_user" })),
            )
            .await
            .unwrap();
        store
            .update_document(Collection::Users, "u1", fields(json!({ "role": "admin" })))
            .await
            .unwrap();

        let doc = store
            .get_document(Collection::Users, "u1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.get_str("name"), Some("Jane"));
        assert_eq!(doc.get_str("role"), Some("admin"));
    }

    #[tokio::test]
    async fn update_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_document(Collection::Tickets, "nope", Fields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        store
            .set_document(Collection::Categories, "c1", fields(json!({ "name": "A" })))
            .await
            .unwrap();
        store
            .delete_document(Collection::Categories, "c1")
            .await
            .unwrap();
        store
            .delete_document(Collection::Categories, "c1")
            .await
            .unwrap();
        assert_eq!(store.len(Collection::Categories).await, 0);
    }

    #[tokio::test]
    async fn subscribers_see_every_change_as_full_snapshot() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe(Collection::Categories).await.unwrap();
        assert!(sub.next().await.unwrap().unwrap().is_empty());

        store
            .add_document(Collection::Categories, fields(json!({ "name": "A" })))
            .await
            .unwrap();
        store
            .add_document(Collection::Categories, fields(json!({ "name": "B" })))
            .await
            .unwrap();

        assert_eq!(sub.next().await.unwrap().unwrap().len(), 1);
        assert_eq!(sub.next().await.unwrap().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unchanged_update_does_not_publish() {
        let store = MemoryStore::new();
        store
            .set_document(Collection::Categories, "c1", fields(json!({ "name": "A" })))
            .await
            .unwrap();
        let mut sub = store.subscribe(Collection::Categories).await.unwrap();
        sub.next().await.unwrap().unwrap();

        store
            .update_document(Collection::Categories, "c1", fields(json!({ "name": "A" })))
            .await
            .unwrap();
        store
            .update_document(Collection::Categories, "c1", fields(json!({ "name": "B" })))
            .await
            .unwrap();

        let snap = sub.next().await.unwrap().unwrap();
        assert_eq!(snap[0].get_str("name"), Some("B"));
    }

    #[tokio::test]
    async fn injected_failure_reaches_open_and_new_subscribers() {
        let store = MemoryStore::new();
        let mut open = store.subscribe(Collection::Users).await.unwrap();
        open.next().await.unwrap().unwrap();

        store.fail_subscriptions(Collection::Users, "denied").await;
        assert!(open.next().await.unwrap().is_err());

        let mut fresh = store.subscribe(Collection::Users).await.unwrap();
        assert!(fresh.next().await.unwrap().is_err());

        store.restore_subscriptions(Collection::Users).await;
        let mut again = store.subscribe(Collection::Users).await.unwrap();
        assert!(again.next().await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn rejected_writes_leave_data_untouched() {
        let store = MemoryStore::new();
        store.reject_writes(Some("offline".into())).await;
        let err = store
            .add_document(Collection::Tickets, fields(json!({ "title": "x" })))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.len(Collection::Tickets).await, 0);
    }
}
