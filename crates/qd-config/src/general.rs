//! General application configuration.

use serde::{Deserialize, Serialize};

fn default_log_level() -> String {
    "warn".into()
}

fn default_language() -> String {
    "English".into()
}

/// Default wait for a subscription to reflect a write, in milliseconds.
const fn default_sync_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Tracing filter used when `QUICKDESK_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Language assigned to profiles that do not pick one.
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Populate empty `categories`/`tickets` collections with sample data at startup.
    #[serde(default)]
    pub seed_sample_data: bool,

    /// How long callers wait for a write to show up in the synchronized lists.
    #[serde(default = "default_sync_timeout_ms")]
    pub sync_timeout_ms: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            default_language: default_language(),
            seed_sample_data: false,
            sync_timeout_ms: default_sync_timeout_ms(),
        }
    }
}
