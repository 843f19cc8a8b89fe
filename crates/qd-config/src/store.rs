//! Remote document store configuration.

use serde::{Deserialize, Serialize};

/// Default capacity of each collection's snapshot channel.
const fn default_snapshot_buffer() -> usize {
    64
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Remote project identifier.
    #[serde(default)]
    pub project_id: String,

    /// Storage bucket for uploaded images. Uploads are handled outside QuickDesk.
    #[serde(default)]
    pub storage_bucket: String,

    /// Snapshots buffered per subscriber before older ones are skipped.
    /// Every snapshot is a full replacement, so skipping only loses
    /// intermediate states.
    #[serde(default = "default_snapshot_buffer")]
    pub snapshot_buffer: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            storage_bucket: String::new(),
            snapshot_buffer: default_snapshot_buffer(),
        }
    }
}

impl StoreConfig {
    /// Check if a remote project is configured.
    pub fn is_configured(&self) -> bool {
        !self.project_id.is_empty()
    }
}
