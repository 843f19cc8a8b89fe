//! The Entity Synchronizer.
//!
//! Keeps live mirrors of the five collections. Tickets and categories are
//! followed for the synchronizer's whole lifetime. Users and role-upgrade
//! requests are followed only while the session role is admin, and are
//! closed and reopened whenever the role changes. Notifications are followed
//! while anyone is signed in, reopened when the signed-in uid changes, and
//! filtered client-side to that uid.
//!
//! Each feed replaces its list with a fully decoded snapshot on every
//! delivery. A feed error empties its list and ends the feed; it is not
//! retried.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use qd_auth::{SessionState, SessionStore};
use qd_core::entities::{Category, Notification, RoleUpgradeRequest, Ticket, UserProfile};
use qd_core::enums::{Collection, Role};
use qd_core::identity::SessionUser;
use qd_store::DocumentStore;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info};

use crate::error::SyncError;
use crate::mapping::SyncedState;
use crate::subscription::Disposer;

pub const DEFAULT_WAIT: Duration = Duration::from_millis(5000);

const ADMIN_FEEDS: [Collection; 2] = [Collection::Users, Collection::RoleUpgradeRequests];

pub struct EntitySynchronizer {
    store: Arc<dyn DocumentStore>,
    state: Arc<watch::Sender<SyncedState>>,
    feeds: Mutex<HashMap<Collection, Disposer>>,
    supervisor: Mutex<Option<Disposer>>,
    default_wait: Duration,
}

/// What the currently open gated feeds were opened for.
#[derive(Debug, Default)]
struct Gates {
    role: Option<Role>,
    uid: Option<String>,
}

impl EntitySynchronizer {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, default_wait: Duration) -> Arc<Self> {
        Arc::new(Self {
            store,
            state: Arc::new(watch::Sender::new(SyncedState::default())),
            feeds: Mutex::new(HashMap::new()),
            supervisor: Mutex::new(None),
            default_wait,
        })
    }

    /// Open the ungated feeds and start following `session` for the gated
    /// ones.
    pub async fn start(self: &Arc<Self>, session: &SessionStore) {
        self.open(Collection::Tickets, None).await;
        self.open(Collection::Categories, None).await;

        let handle = tokio::spawn(supervise(Arc::downgrade(self), session.subscribe()));
        let previous = self
            .supervisor
            .lock()
            .await
            .replace(Disposer::new("session-gates", handle));
        drop(previous);
        info!("entity synchronizer started");
    }

    /// Dispose every feed. Lists keep their last contents.
    pub async fn shutdown(&self) {
        if let Some(supervisor) = self.supervisor.lock().await.take() {
            supervisor.dispose();
        }
        for (_, feed) in self.feeds.lock().await.drain() {
            feed.dispose();
        }
        info!("entity synchronizer stopped");
    }

    /// Collections with a live feed, in [`Collection::ALL`] order.
    pub async fn active_feeds(&self) -> Vec<Collection> {
        let feeds = self.feeds.lock().await;
        Collection::ALL
            .into_iter()
            .filter(|c| feeds.get(c).is_some_and(Disposer::is_active))
            .collect()
    }

    #[must_use]
    pub fn state(&self) -> SyncedState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncedState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn tickets(&self) -> Vec<Ticket> {
        self.state.borrow().tickets.clone()
    }

    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.state.borrow().categories.clone()
    }

    #[must_use]
    pub fn users(&self) -> Vec<UserProfile> {
        self.state.borrow().users.clone()
    }

    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.state.borrow().notifications.clone()
    }

    #[must_use]
    pub fn role_upgrade_requests(&self) -> Vec<RoleUpgradeRequest> {
        self.state.borrow().role_upgrade_requests.clone()
    }

    /// Look a ticket up in the local mirror.
    #[must_use]
    pub fn ticket_by_id(&self, id: &str) -> Option<Ticket> {
        self.state.borrow().ticket(id).cloned()
    }

    /// Wait until the mirrored state satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Timeout` if it does not within `timeout`.
    pub async fn wait_for<F>(&self, timeout: Duration, predicate: F) -> Result<SyncedState, SyncError>
    where
        F: FnMut(&SyncedState) -> bool,
    {
        let mut rx = self.state.subscribe();
        let outcome = tokio::time::timeout(timeout, rx.wait_for(predicate)).await;
        match outcome {
            Ok(Ok(state)) => Ok(state.clone()),
            Ok(Err(_)) => Err(SyncError::Closed),
            Err(_) => Err(SyncError::Timeout(timeout)),
        }
    }

    /// [`Self::wait_for`] with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Timeout` if the predicate does not hold in time.
    pub async fn settle<F>(&self, predicate: F) -> Result<SyncedState, SyncError>
    where
        F: FnMut(&SyncedState) -> bool,
    {
        self.wait_for(self.default_wait, predicate).await
    }

    async fn open(&self, collection: Collection, recipient: Option<String>) {
        let mut generation = 0;
        self.state.send_modify(|s| generation = s.reset(collection));

        let handle = tokio::spawn(run_feed(
            Arc::clone(&self.store),
            Arc::clone(&self.state),
            collection,
            generation,
            recipient,
        ));
        let previous = self
            .feeds
            .lock()
            .await
            .insert(collection, Disposer::new(collection.as_str(), handle));
        drop(previous);
    }

    async fn close(&self, collection: Collection) {
        if let Some(feed) = self.feeds.lock().await.remove(&collection) {
            feed.dispose();
        }
        self.state.send_modify(|s| {
            s.reset(collection);
        });
    }

    async fn reconcile(&self, gates: &mut Gates, user: Option<&SessionUser>) {
        let role = user.map(|u| u.role);
        if role != gates.role {
            for collection in ADMIN_FEEDS {
                self.close(collection).await;
            }
            if role == Some(Role::Admin) {
                for collection in ADMIN_FEEDS {
                    self.open(collection, None).await;
                }
            }
            debug!(from = ?gates.role, to = ?role, "role gate reconciled");
            gates.role = role;
        }

        let uid = user.map(|u| u.uid.clone());
        if uid != gates.uid {
            self.close(Collection::Notifications).await;
            if let Some(uid) = &uid {
                self.open(Collection::Notifications, Some(uid.clone()))
                    .await;
            }
            debug!(uid = ?uid, "notification gate reconciled");
            gates.uid = uid;
        }
    }
}

async fn supervise(sync: Weak<EntitySynchronizer>, mut session: watch::Receiver<SessionState>) {
    let mut gates = Gates::default();
    loop {
        let state = session.borrow_and_update().clone();
        if !state.loading {
            let Some(sync) = sync.upgrade() else {
                return;
            };
            sync.reconcile(&mut gates, state.user.as_ref()).await;
        }
        if session.changed().await.is_err() {
            return;
        }
    }
}

async fn run_feed(
    store: Arc<dyn DocumentStore>,
    state: Arc<watch::Sender<SyncedState>>,
    collection: Collection,
    generation: u64,
    recipient: Option<String>,
) {
    let mut subscription = match store.subscribe(collection).await {
        Ok(subscription) => subscription,
        Err(e) => {
            fail(&state, collection, generation, e.to_string());
            return;
        }
    };
    debug!(%collection, "subscription opened");

    while let Some(delivery) = subscription.next().await {
        match delivery {
            Ok(docs) => {
                let now = Utc::now();
                let applied = state.send_if_modified(|s| {
                    if s.generation(collection) != generation {
                        return false;
                    }
                    s.replace(collection, &docs, recipient.as_deref(), now);
                    true
                });
                debug!(%collection, documents = docs.len(), applied, "snapshot");
            }
            Err(e) => {
                fail(&state, collection, generation, e.to_string());
                return;
            }
        }
    }
    debug!(%collection, "subscription closed");
}

fn fail(state: &watch::Sender<SyncedState>, collection: Collection, generation: u64, reason: String) {
    let error = SyncError::Subscription { collection, reason };
    error!(%error, "emptying mirrored collection");
    state.send_if_modified(|s| {
        if s.generation(collection) != generation {
            return false;
        }
        s.clear(collection);
        true
    });
}
