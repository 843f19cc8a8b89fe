//! The Session Store: who is signed in, and with which role.
//!
//! The store follows the provider's identity stream. Each new identity is
//! resolved into a [`SessionUser`] through a profile lookup; while that
//! lookup runs the state reports `loading`. Explicit `login`/`logout` go
//! through the same resolution path, so an identity change observed on the
//! stream and one made through this store produce the same state.

use std::sync::{Arc, OnceLock, Weak};

use qd_core::identity::{AuthIdentity, SessionUser};
use qd_store::DocumentStore;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::credential_cache::CredentialCache;
use crate::error::AuthError;
use crate::profile::resolve_session_user;
use crate::provider::AuthProvider;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<SessionUser>,
    /// `true` while an identity is being resolved into a session user.
    pub loading: bool,
}

impl SessionState {
    const fn initial() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

pub struct SessionStore {
    provider: Arc<dyn AuthProvider>,
    store: Arc<dyn DocumentStore>,
    cache: Option<CredentialCache>,
    state: watch::Sender<SessionState>,
    // Serializes identity resolution so concurrent transitions apply in order.
    resolving: Mutex<()>,
    listener: OnceLock<JoinHandle<()>>,
}

impl SessionStore {
    /// Create the store and start following the provider's identity stream.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        provider: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
        cache: Option<CredentialCache>,
    ) -> Arc<Self> {
        let session = Arc::new(Self {
            provider,
            store,
            cache,
            state: watch::Sender::new(SessionState::initial()),
            resolving: Mutex::new(()),
            listener: OnceLock::new(),
        });
        let handle = tokio::spawn(follow_identity(Arc::downgrade(&session)));
        let _ = session.listener.set(handle);
        session
    }

    /// Sign in and resolve the session user.
    ///
    /// # Errors
    ///
    /// Returns the provider's error (`AuthError::InvalidCredentials` for a bad
    /// email/password pair). A failed profile lookup is not an error.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, AuthError> {
        let previous = self.state.borrow().user.clone();
        self.state.send_modify(|s| s.loading = true);

        let identity = match self.provider.sign_in(email, password).await {
            Ok(identity) => identity,
            Err(error) => {
                self.state.send_replace(SessionState {
                    user: previous,
                    loading: false,
                });
                return Err(error);
            }
        };

        self.apply_identity(Some(identity)).await;
        self.current_user().ok_or(AuthError::NotAuthenticated)
    }

    /// Sign out and clear the session.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if sign-out fails; the session is left
    /// as it was.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await?;
        self.apply_identity(None).await;
        Ok(())
    }

    #[must_use]
    pub fn current_user(&self) -> Option<SessionUser> {
        self.state.borrow().user.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Wait until no identity resolution is in flight.
    pub async fn ready(&self) -> SessionState {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|s| !s.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// Re-read the current user's profile, e.g. after an admin changed the
    /// role. Returns the refreshed user, `None` if signed out.
    pub async fn refresh_profile(&self) -> Option<SessionUser> {
        let _guard = self.resolving.lock().await;
        let current = self.current_user()?;
        let identity = AuthIdentity {
            uid: current.uid.clone(),
            email: current.email.clone(),
            display_name: Some(current.name.clone()),
        };
        let user = resolve_session_user(self.store.as_ref(), &identity).await;
        if user.role != current.role {
            info!(uid = %user.uid, from = %current.role, to = %user.role, "session role changed");
        }
        self.remember(&user);
        self.state.send_replace(SessionState {
            user: Some(user.clone()),
            loading: false,
        });
        Some(user)
    }

    async fn apply_identity(&self, identity: Option<AuthIdentity>) {
        let _guard = self.resolving.lock().await;
        match identity {
            None => {
                if self.state.borrow().user.is_some() {
                    debug!("session cleared");
                }
                self.state.send_replace(SessionState {
                    user: None,
                    loading: false,
                });
                if let Some(cache) = &self.cache
                    && let Err(error) = cache.delete()
                {
                    warn!(%error, "failed to clear cached user");
                }
            }
            Some(identity) => {
                let unchanged = {
                    let state = self.state.borrow();
                    !state.loading
                        && state.user.as_ref().is_some_and(|u| u.uid == identity.uid)
                };
                if unchanged {
                    return;
                }
                self.state.send_modify(|s| s.loading = true);
                let user = resolve_session_user(self.store.as_ref(), &identity).await;
                debug!(uid = %user.uid, role = %user.role, "session resolved");
                self.remember(&user);
                self.state.send_replace(SessionState {
                    user: Some(user),
                    loading: false,
                });
            }
        }
    }

    /// Restore the cached user when the provider has no identity at start.
    async fn restore_cached(&self) {
        let _guard = self.resolving.lock().await;
        let cached = self.cache.as_ref().and_then(CredentialCache::load);
        if cached.is_some() {
            debug!("restored cached session user");
        }
        self.state.send_replace(SessionState {
            user: cached,
            loading: false,
        });
    }

    fn remember(&self, user: &SessionUser) {
        if let Some(cache) = &self.cache
            && let Err(error) = cache.store(user)
        {
            warn!(%error, "failed to cache session user");
        }
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.get() {
            handle.abort();
        }
    }
}

async fn follow_identity(session: Weak<SessionStore>) {
    let Some(mut changes) = session.upgrade().map(|s| s.provider.identity_changes()) else {
        return;
    };

    let initial = changes.borrow_and_update().clone();
    {
        let Some(session) = session.upgrade() else {
            return;
        };
        match initial {
            Some(identity) => session.apply_identity(Some(identity)).await,
            None => session.restore_cached().await,
        }
    }

    while changes.changed().await.is_ok() {
        let identity = changes.borrow_and_update().clone();
        let Some(session) = session.upgrade() else {
            return;
        };
        session.apply_identity(identity).await;
    }
}
