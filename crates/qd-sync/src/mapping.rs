//! Snapshot to entity-list mapping.

use chrono::{DateTime, Utc};
use qd_core::entities::{Category, Notification, RoleUpgradeRequest, Ticket, UserProfile};
use qd_core::enums::Collection;
use qd_store::{Document, TimestampFields};
use serde::de::DeserializeOwned;
use tracing::warn;

/// In-memory mirrors of the five collections.
///
/// Each list is replaced wholesale by its collection's subscription; nothing
/// else writes to it.
#[derive(Debug, Clone, Default)]
pub struct SyncedState {
    pub tickets: Vec<Ticket>,
    pub categories: Vec<Category>,
    pub users: Vec<UserProfile>,
    /// Only the signed-in user's notifications.
    pub notifications: Vec<Notification>,
    pub role_upgrade_requests: Vec<RoleUpgradeRequest>,
    // Feed generation per collection. A snapshot from a disposed feed carries
    // a stale generation and is dropped.
    generations: [u64; 5],
}

const fn slot(collection: Collection) -> usize {
    match collection {
        Collection::Tickets => 0,
        Collection::Categories => 1,
        Collection::Users => 2,
        Collection::Notifications => 3,
        Collection::RoleUpgradeRequests => 4,
    }
}

impl SyncedState {
    #[must_use]
    pub fn len_of(&self, collection: Collection) -> usize {
        match collection {
            Collection::Tickets => self.tickets.len(),
            Collection::Categories => self.categories.len(),
            Collection::Users => self.users.len(),
            Collection::Notifications => self.notifications.len(),
            Collection::RoleUpgradeRequests => self.role_upgrade_requests.len(),
        }
    }

    #[must_use]
    pub fn ticket(&self, id: &str) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    pub(crate) const fn generation(&self, collection: Collection) -> u64 {
        self.generations[slot(collection)]
    }

    /// Start a new feed generation for `collection` and empty its list.
    pub(crate) fn reset(&mut self, collection: Collection) -> u64 {
        let generation = self.generations[slot(collection)].wrapping_add(1);
        self.generations[slot(collection)] = generation;
        self.clear(collection);
        generation
    }

    pub(crate) fn clear(&mut self, collection: Collection) {
        match collection {
            Collection::Tickets => self.tickets.clear(),
            Collection::Categories => self.categories.clear(),
            Collection::Users => self.users.clear(),
            Collection::Notifications => self.notifications.clear(),
            Collection::RoleUpgradeRequests => self.role_upgrade_requests.clear(),
        }
    }

    /// Replace `collection`'s list with the decoded `docs`.
    ///
    /// `recipient` restricts notifications to one user.
    pub(crate) fn replace(
        &mut self,
        collection: Collection,
        docs: &[Document],
        recipient: Option<&str>,
        now: DateTime<Utc>,
    ) {
        match collection {
            Collection::Tickets => self.tickets = decode_all(collection, docs, now),
            Collection::Categories => self.categories = decode_all(collection, docs, now),
            Collection::Users => self.users = decode_all(collection, docs, now),
            Collection::Notifications => {
                let mut notifications: Vec<Notification> = decode_all(collection, docs, now);
                if let Some(uid) = recipient {
                    notifications.retain(|n| n.user_id == uid);
                }
                self.notifications = notifications;
            }
            Collection::RoleUpgradeRequests => {
                self.role_upgrade_requests = decode_all(collection, docs, now);
            }
        }
    }
}

/// Decode every document of a snapshot, skipping the ones that do not map.
pub fn decode_all<T: DeserializeOwned>(
    collection: Collection,
    docs: &[Document],
    now: DateTime<Utc>,
) -> Vec<T> {
    let timestamps = TimestampFields::for_collection(collection);
    docs.iter()
        .filter_map(|doc| match doc.decode(collection, &timestamps, now) {
            Ok(entity) => Some(entity),
            Err(error) => {
                warn!(%error, "skipping undecodable document");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qd_store::Fields;
    use serde_json::json;

    fn doc(id: &str, value: serde_json::Value) -> Document {
        Document::new(id, value.as_object().cloned().unwrap_or_else(Fields::new))
    }

    fn notification(id: &str, user_id: &str) -> Document {
        doc(
            id,
            json!({
                "userId": user_id,
                "title": "New reply",
                "message": "Someone replied",
                "type": "ticket_reply",
                "read": false
            }),
        )
    }

    #[test]
    fn notifications_filtered_to_recipient() {
        let mut state = SyncedState::default();
        let docs = vec![
            notification("n1", "u1"),
            notification("n2", "u2"),
            notification("n3", "u1"),
        ];
        state.replace(Collection::Notifications, &docs, Some("u1"), Utc::now());
        let ids: Vec<&str> = state.notifications.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "n3"]);
    }

    #[test]
    fn undecodable_documents_are_skipped() {
        let mut state = SyncedState::default();
        let docs = vec![
            doc("c1", json!({ "name": "Billing" })),
            doc("c2", json!({ "description": "no name" })),
        ];
        state.replace(Collection::Categories, &docs, None, Utc::now());
        assert_eq!(state.categories.len(), 1);
        assert_eq!(state.categories[0].id, "c1");
    }

    #[test]
    fn reset_bumps_generation_and_clears() {
        let mut state = SyncedState::default();
        state.replace(
            Collection::Categories,
            &[doc("c1", json!({ "name": "A" }))],
            None,
            Utc::now(),
        );
        let before = state.generation(Collection::Categories);
        let after = state.reset(Collection::Categories);
        assert_eq!(after, before + 1);
        assert_eq!(state.len_of(Collection::Categories), 0);
        assert_eq!(state.generation(Collection::Tickets), 0);
    }

    #[test]
    fn missing_created_at_uses_sync_moment() {
        let now = Utc::now();
        let mut state = SyncedState::default();
        state.replace(Collection::Notifications, &[notification("n1", "u1")], None, now);
        assert_eq!(state.notifications[0].created_at, now);
    }
}
