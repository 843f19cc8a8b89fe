//! The Mutation Facade.
//!
//! `HelpdeskService` performs remote writes against the document store. It
//! never touches the synchronizer's lists: a successful mutation becomes
//! visible locally only once the affected collection's subscription delivers
//! the next snapshot. Repo methods are implemented as `impl HelpdeskService`
//! blocks under `repos/`.

use std::sync::Arc;

use chrono::Utc;
use qd_auth::SessionStore;
use qd_core::entities::UserProfile;
use qd_core::enums::{Collection, Role};
use qd_core::identity::SessionUser;
use qd_core::inputs::NewNotification;
use qd_store::{Document, DocumentStore, TimestampFields};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::MutationError;
use crate::mapping::decode_all;
use crate::synchronizer::EntitySynchronizer;

pub struct HelpdeskService {
    store: Arc<dyn DocumentStore>,
    session: Arc<SessionStore>,
    sync: Arc<EntitySynchronizer>,
}

impl HelpdeskService {
    #[must_use]
    pub const fn new(
        store: Arc<dyn DocumentStore>,
        session: Arc<SessionStore>,
        sync: Arc<EntitySynchronizer>,
    ) -> Self {
        Self {
            store,
            session,
            sync,
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    #[must_use]
    pub const fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub const fn synchronizer(&self) -> &Arc<EntitySynchronizer> {
        &self.sync
    }

    pub(crate) fn require_user(&self) -> Result<SessionUser, MutationError> {
        self.session
            .current_user()
            .ok_or(MutationError::NotAuthenticated)
    }

    pub(crate) fn require_admin(&self, action: &'static str) -> Result<SessionUser, MutationError> {
        let user = self.require_user()?;
        if user.role.is_admin() {
            Ok(user)
        } else {
            Err(MutationError::PermissionDenied {
                action,
                required: "admin",
                role: user.role,
            })
        }
    }

    pub(crate) fn require_ticket_manager(
        &self,
        action: &'static str,
    ) -> Result<SessionUser, MutationError> {
        let user = self.require_user()?;
        if user.role.can_manage_tickets() {
            Ok(user)
        } else {
            Err(MutationError::PermissionDenied {
                action,
                required: "support_agent or admin",
                role: user.role,
            })
        }
    }

    /// Read the latest server copy of a document and decode it.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<(Document, T), MutationError> {
        let doc = self
            .store
            .get_document(collection, id)
            .await?
            .ok_or_else(|| MutationError::NotFound {
                collection,
                id: id.to_string(),
            })?;
        let entity = doc.decode(
            collection,
            &TimestampFields::for_collection(collection),
            Utc::now(),
        )?;
        Ok((doc, entity))
    }

    /// One-shot read of every profile with one of `roles`.
    pub(crate) async fn profiles_with_roles(
        &self,
        roles: &[Role],
    ) -> Result<Vec<UserProfile>, MutationError> {
        let docs = self.store.list_documents(Collection::Users).await?;
        let profiles: Vec<UserProfile> = decode_all(Collection::Users, &docs, Utc::now());
        Ok(profiles
            .into_iter()
            .filter(|p| roles.contains(&p.role))
            .collect())
    }

    /// Create a notification as a side effect of another mutation. Failures
    /// are logged and swallowed.
    pub(crate) async fn notify(&self, notification: NewNotification) {
        let recipient = notification.user_id.clone();
        let kind = notification.kind;
        if let Err(error) = self.create_notification(notification).await {
            warn!(%error, %recipient, %kind, "failed to deliver notification");
        }
    }

    /// Notify every profile holding one of `roles`, except `skip`.
    pub(crate) async fn notify_roles(
        &self,
        roles: &[Role],
        skip: Option<&str>,
        build: impl Fn(&UserProfile) -> NewNotification,
    ) {
        let recipients = match self.profiles_with_roles(roles).await {
            Ok(profiles) => profiles,
            Err(error) => {
                warn!(%error, "failed to list notification recipients");
                return;
            }
        };
        for profile in recipients.iter().filter(|p| Some(p.id.as_str()) != skip) {
            self.notify(build(profile)).await;
        }
    }
}
