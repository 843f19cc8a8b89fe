//! Shared helpers for the qd-sync integration suites: an in-process
//! application signed in as one of the demo accounts.

// Each suite compiles this module separately and uses a different subset.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use qd_auth::{AuthProvider, DEMO_ACCOUNTS, DEMO_PASSWORD, MemoryAuthProvider};
use qd_config::QuickdeskConfig;
use qd_core::enums::{Collection, Role};
use qd_core::identity::SessionUser;
use qd_store::{DocumentStore, MemoryStore};

use qd_sync::app::AppState;
use qd_sync::mapping::SyncedState;
use qd_sync::seed;

pub const SETTLE: Duration = Duration::from_secs(2);

/// In-process application with typed handles on its backends.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub provider: Arc<MemoryAuthProvider>,
    pub app: AppState,
}

/// Signed-out application over an empty store holding only the demo
/// profiles.
///
/// # Errors
///
/// Fails if the demo accounts or profiles cannot be set up.
pub async fn test_app() -> anyhow::Result<TestApp> {
    let store = Arc::new(MemoryStore::new());
    let provider = Arc::new(MemoryAuthProvider::with_demo_accounts()?);
    seed::seed_demo_profiles(store.as_ref(), None).await?;

    let app = AppState::init(
        QuickdeskConfig::default(),
        Arc::clone(&provider) as Arc<dyn AuthProvider>,
        Arc::clone(&store) as Arc<dyn DocumentStore>,
    )
    .await?;
    app.session.ready().await;

    Ok(TestApp {
        store,
        provider,
        app,
    })
}

/// [`test_app`] signed in as the demo account holding `role`, with the
/// synchronizer's gates settled for it.
///
/// # Errors
///
/// Fails if sign-in fails or the gates do not settle in time.
pub async fn signed_in(role: Role) -> anyhow::Result<TestApp> {
    let app = test_app().await?;
    app.login_as(role).await?;
    Ok(app)
}

impl TestApp {
    /// Sign in as the demo account holding `role` and wait for the gated
    /// feeds to match it.
    ///
    /// # Errors
    ///
    /// Fails if sign-in fails or the gates do not settle in time.
    pub async fn login_as(&self, role: Role) -> anyhow::Result<SessionUser> {
        let account = DEMO_ACCOUNTS
            .iter()
            .find(|a| a.role == role)
            .context("no demo account for role")?;
        let user = self
            .app
            .session
            .login(account.email, DEMO_PASSWORD)
            .await?;

        let mut expected = vec![Collection::Tickets, Collection::Categories];
        if role.is_admin() {
            expected.extend([Collection::Users, Collection::RoleUpgradeRequests]);
        }
        expected.push(Collection::Notifications);
        self.wait_for_feeds(&expected).await?;
        Ok(user)
    }

    /// Wait until exactly `expected` feeds are live.
    ///
    /// # Errors
    ///
    /// Fails if that does not happen within [`SETTLE`].
    pub async fn wait_for_feeds(&self, expected: &[Collection]) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + SETTLE;
        loop {
            let active = self.app.sync.active_feeds().await;
            if active.len() == expected.len() && expected.iter().all(|c| active.contains(c)) {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                bail!("feeds did not settle: expected {expected:?}, active {active:?}");
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Wait until the mirrored state satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// Fails if it does not within [`SETTLE`].
    pub async fn settle<F>(&self, predicate: F) -> anyhow::Result<SyncedState>
    where
        F: FnMut(&SyncedState) -> bool,
    {
        Ok(self.app.sync.wait_for(SETTLE, predicate).await?)
    }
}
