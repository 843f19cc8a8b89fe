//! Application state container.
//!
//! Built once at startup and handed to every consumer by reference. Owns the
//! Session Store, the Entity Synchronizer and the Mutation Facade over one
//! document store and one auth provider.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use qd_auth::{AuthProvider, CredentialCache, MemoryAuthProvider, SessionStore};
use qd_config::{GeneralConfig, QuickdeskConfig};
use qd_store::{DocumentStore, MemoryStore};
use tracing::{info, warn};

use crate::seed;
use crate::service::HelpdeskService;
use crate::synchronizer::EntitySynchronizer;

pub struct AppState {
    pub config: QuickdeskConfig,
    pub store: Arc<dyn DocumentStore>,
    pub provider: Arc<dyn AuthProvider>,
    pub session: Arc<SessionStore>,
    pub sync: Arc<EntitySynchronizer>,
    pub service: HelpdeskService,
}

impl AppState {
    /// Wire the components together and start synchronizing.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails if sample data is requested and cannot be written.
    pub async fn init(
        config: QuickdeskConfig,
        provider: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
    ) -> anyhow::Result<Self> {
        let cache = if config.auth.credential_cache {
            match config.auth.cache_dir() {
                Some(dir) => Some(CredentialCache::in_dir(dir)),
                None => {
                    warn!("credential cache enabled but no cache directory could be resolved");
                    None
                }
            }
        } else {
            None
        };

        if config.general.seed_sample_data {
            let report = seed::initialize_sample_data(store.as_ref())
                .await
                .context("failed to initialize sample data")?;
            info!(categories = report.categories, tickets = report.tickets, "sample data ready");
        }

        let session = SessionStore::start(Arc::clone(&provider), Arc::clone(&store), cache);
        let sync = EntitySynchronizer::new(
            Arc::clone(&store),
            Duration::from_millis(config.general.sync_timeout_ms),
        );
        sync.start(&session).await;

        let service = HelpdeskService::new(Arc::clone(&store), Arc::clone(&session), Arc::clone(&sync));
        info!(
            store_configured = config.store.is_configured(),
            auth_configured = config.auth.is_configured(),
            "application state initialized"
        );

        Ok(Self {
            config,
            store,
            provider,
            session,
            sync,
            service,
        })
    }

    /// Backend-less variant: in-process store and the demo accounts, with
    /// their profiles written so roles resolve.
    ///
    /// # Errors
    ///
    /// Fails if the demo accounts or their profiles cannot be set up.
    pub async fn in_memory(config: QuickdeskConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> =
            Arc::new(MemoryStore::with_buffer(config.store.snapshot_buffer));
        let provider: Arc<dyn AuthProvider> =
            Arc::new(MemoryAuthProvider::with_demo_accounts().context("failed to set up demo accounts")?);
        seed::seed_demo_profiles(store.as_ref(), Some(config.general.default_language.as_str()))
            .await
            .context("failed to write demo profiles")?;
        Self::init(config, provider, store).await
    }

    /// Dispose every subscription.
    pub async fn shutdown(&self) {
        self.sync.shutdown().await;
    }
}

/// Install the global tracing subscriber.
///
/// `QUICKDESK_LOG` wins over the configured `general.log_level`.
///
/// # Errors
///
/// Fails if the level is not a valid filter or a subscriber is already set.
pub fn init_tracing(general: &GeneralConfig) -> anyhow::Result<()> {
    let filter = match tracing_subscriber::EnvFilter::try_from_env("QUICKDESK_LOG") {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(&general.log_level)
            .with_context(|| format!("invalid log level {:?}", general.log_level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
