//! # qd-config
//!
//! Layered configuration loading for QuickDesk using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`QUICKDESK_*` prefix, `__` as separator)
//! 2. Project-level `.quickdesk/config.toml`
//! 3. User-level `~/.config/quickdesk/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `QUICKDESK_AUTH__API_KEY` -> `auth.api_key`,
//! `QUICKDESK_GENERAL__LOG_LEVEL` -> `general.log_level`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use qd_config::QuickdeskConfig;
//!
//! let config = QuickdeskConfig::load_with_dotenv().expect("config");
//! if config.store.is_configured() {
//!     println!("project: {}", config.store.project_id);
//! }
//! ```

mod auth;
mod error;
mod general;
mod store;

pub use auth::AuthConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use store::StoreConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QuickdeskConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl QuickdeskConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed, or
    /// `ConfigError::InvalidValue` if a loaded value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer extra providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".quickdesk/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("QUICKDESK_").split("__"))
    }

    /// Reject values that parse but cannot work.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.snapshot_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                field: "store.snapshot_buffer".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.general.sync_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.sync_timeout_ms".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("quickdesk").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available), then falls back to
    /// the current directory. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = QuickdeskConfig::default();
        assert!(!config.store.is_configured());
        assert!(!config.auth.is_configured());
        assert!(!config.general.seed_sample_data);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn figment_builds_without_files() {
        let figment = QuickdeskConfig::figment();
        let config: QuickdeskConfig = figment.extract().expect("should extract defaults");
        assert_eq!(config.store.snapshot_buffer, 64);
        assert_eq!(config.general.default_language, "English");
    }

    #[test]
    fn zero_buffer_is_rejected() {
        let mut config = QuickdeskConfig::default();
        config.store.snapshot_buffer = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
