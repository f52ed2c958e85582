//! Sync tuning knobs.

use opsgraph_core::catalog::DEFAULT_UNMAPPED_CONTROLS;
use serde::{Deserialize, Serialize};

/// What a full sync does with an edge whose endpoint cannot be placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Abort the rebuild; the previous graph stays live.
    #[default]
    Strict,
    /// Skip the edge with a warning.
    Lenient,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Most recent events loaded by a full sync.
    #[serde(default = "default_full_event_limit")]
    pub full_event_limit: usize,
    /// Most recent events merged per incremental project sync.
    #[serde(default = "default_project_event_limit")]
    pub project_event_limit: usize,
    /// Cap on projects loaded by a full sync. `None` loads all.
    #[serde(default)]
    pub project_limit: Option<usize>,
    #[serde(default)]
    pub edge_policy: EdgePolicy,
    /// Control ids that get no `PART_OF` edge to the framework.
    #[serde(default = "default_unmapped_controls")]
    pub unmapped_controls: Vec<String>,
    #[serde(default = "default_source_timeout_secs")]
    pub source_timeout_secs: u64,
}

fn default_full_event_limit() -> usize {
    200
}

fn default_project_event_limit() -> usize {
    50
}

fn default_unmapped_controls() -> Vec<String> {
    DEFAULT_UNMAPPED_CONTROLS
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn default_source_timeout_secs() -> u64 {
    30
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            full_event_limit: default_full_event_limit(),
            project_event_limit: default_project_event_limit(),
            project_limit: None,
            edge_policy: EdgePolicy::default(),
            unmapped_controls: default_unmapped_controls(),
            source_timeout_secs: default_source_timeout_secs(),
        }
    }
}

impl SyncConfig {
    pub fn is_unmapped(&self, control_id: &str) -> bool {
        self.unmapped_controls.iter().any(|c| c == control_id)
    }
}
