//! Voting reads the ticket and writes the toggled fields back without a
//! transaction. Two voters whose reads overlap both start from the same copy,
//! and the later write wins.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use qd_core::enums::{Collection, Priority, Role};
use qd_core::inputs::NewTicket;
use qd_store::{Document, DocumentStore, Fields, MemoryStore, StoreError, Subscription};
use qd_sync::HelpdeskService;
use serde_json::{Value, json};
use tokio::sync::Barrier;

use common::signed_in;

/// Holds each ticket read until every racing reader has read, so their
/// read-modify-write cycles overlap.
struct OverlappingReads {
    inner: Arc<MemoryStore>,
    readers: Barrier,
}

#[async_trait]
impl DocumentStore for OverlappingReads {
    async fn subscribe(&self, collection: Collection) -> Result<Subscription, StoreError> {
        self.inner.subscribe(collection).await
    }

    async fn list_documents(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        self.inner.list_documents(collection).await
    }

    async fn get_document(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let doc = self.inner.get_document(collection, id).await?;
        if collection == Collection::Tickets {
            self.readers.wait().await;
        }
        Ok(doc)
    }

    async fn add_document(
        &self,
        collection: Collection,
        fields: Fields,
    ) -> Result<String, StoreError> {
        self.inner.add_document(collection, fields).await
    }

    async fn set_document(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.inner.set_document(collection, id, fields).await
    }

    async fn update_document(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.inner.update_document(collection, id, fields).await
    }

    async fn delete_document(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.inner.delete_document(collection, id).await
    }
}

#[tokio::test]
async fn overlapping_votes_lose_one_update() {
    let t = signed_in(Role::EndUser).await.unwrap();
    let id = t
        .app
        .service
        .create_ticket(NewTicket::open(
            "Slow dashboard",
            "The dashboard takes a minute to load every morning.",
            "Technical Support",
            Priority::Medium,
            "1",
        ))
        .await
        .unwrap();

    let racing = HelpdeskService::new(
        Arc::new(OverlappingReads {
            inner: Arc::clone(&t.store),
            readers: Barrier::new(2),
        }),
        Arc::clone(&t.app.session),
        Arc::clone(&t.app.sync),
    );
    let (first, second) = tokio::join!(
        racing.vote_ticket(&id, "u1"),
        racing.vote_ticket(&id, "u2")
    );

    // Both voters saw an unvoted ticket and both report their vote as added.
    let (first, second) = (first.unwrap(), second.unwrap());
    assert!(first.added && second.added);
    assert_eq!(first.votes, 1);
    assert_eq!(second.votes, 1);

    let stored = t
        .store
        .get_document(Collection::Tickets, &id)
        .await
        .unwrap()
        .unwrap();
    let voted_by = stored.get("votedBy").and_then(Value::as_array).unwrap();
    assert_eq!(stored.get("votes"), Some(&json!(1)));
    assert_eq!(voted_by.len(), 1);
    assert!(voted_by[0] == json!("u1") || voted_by[0] == json!("u2"));
}

#[tokio::test]
async fn serialized_votes_keep_both_voters() {
    let t = signed_in(Role::EndUser).await.unwrap();
    let id = t
        .app
        .service
        .create_ticket(NewTicket::open(
            "Slow dashboard",
            "The dashboard takes a minute to load every morning.",
            "Technical Support",
            Priority::Medium,
            "1",
        ))
        .await
        .unwrap();

    t.app.service.vote_ticket(&id, "u1").await.unwrap();
    let second = t.app.service.vote_ticket(&id, "u2").await.unwrap();
    assert_eq!(second.votes, 2);
    assert_eq!(second.voted_by, vec!["u1".to_string(), "u2".to_string()]);
}
