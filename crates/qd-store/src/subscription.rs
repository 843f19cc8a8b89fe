//! Live collection subscriptions.

use std::sync::Arc;

use qd_core::enums::Collection;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::document::Document;
use crate::error::StoreError;

/// A full collection snapshot, shared between subscribers.
pub type Snapshot = Arc<Vec<Document>>;

/// What a store publishes to a collection's subscribers.
#[derive(Debug, Clone)]
pub enum SnapshotEvent {
    Snapshot(Snapshot),
    /// The store terminated the subscription.
    Failed(String),
}

/// Receiving end of a collection subscription.
///
/// The first delivery is the collection as it was when the subscription was
/// opened; every later delivery is the complete collection after a change.
/// After an error the subscription is finished and yields `None`.
#[derive(Debug)]
pub struct Subscription {
    collection: Collection,
    pending: Option<SnapshotEvent>,
    rx: Option<broadcast::Receiver<SnapshotEvent>>,
}

impl Subscription {
    #[must_use]
    pub const fn new(
        collection: Collection,
        initial: Snapshot,
        rx: broadcast::Receiver<SnapshotEvent>,
    ) -> Self {
        Self {
            collection,
            pending: Some(SnapshotEvent::Snapshot(initial)),
            rx: Some(rx),
        }
    }

    /// A subscription that fails on its first delivery.
    #[must_use]
    pub fn failed(collection: Collection, reason: impl Into<String>) -> Self {
        Self {
            collection,
            pending: Some(SnapshotEvent::Failed(reason.into())),
            rx: None,
        }
    }

    #[must_use]
    pub const fn collection(&self) -> Collection {
        self.collection
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the subscription has ended, either after an error
    /// was delivered or because the store went away.
    pub async fn next(&mut self) -> Option<Result<Snapshot, StoreError>> {
        if let Some(event) = self.pending.take() {
            return Some(self.deliver(event));
        }
        loop {
            let rx = self.rx.as_mut()?;
            match rx.recv().await {
                Ok(event) => return Some(self.deliver(event)),
                Err(RecvError::Lagged(skipped)) => {
                    // Every event is a full snapshot; the next one supersedes
                    // whatever was skipped.
                    debug!(collection = %self.collection, skipped, "subscription lagged");
                }
                Err(RecvError::Closed) => {
                    self.rx = None;
                    return None;
                }
            }
        }
    }

    fn deliver(&mut self, event: SnapshotEvent) -> Result<Snapshot, StoreError> {
        match event {
            SnapshotEvent::Snapshot(docs) => Ok(docs),
            SnapshotEvent::Failed(reason) => {
                self.rx = None;
                Err(StoreError::Subscription {
                    collection: self.collection,
                    reason,
                })
            }
        }
    }
}
