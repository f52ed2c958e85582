//! Sync lifecycle events.
//!
//! Every full or incremental sync produces one [`SyncEvent`]. The service
//! keeps the latest one so operators can see when the graph was last
//! rebuilt and whether that succeeded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one sync run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SyncRunId(pub Uuid);

impl SyncRunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SyncRunId {
    fn default() -> Self {
        Self::new()
    }
}

/// An event emitted at the end of a sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEvent {
    pub id: SyncRunId,
    pub timestamp: DateTime<Utc>,
    pub payload: SyncPayload,
}

impl SyncEvent {
    pub fn new(id: SyncRunId, payload: SyncPayload) -> Self {
        Self {
            id,
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.payload, SyncPayload::FullSyncFailed { .. })
    }
}

/// The event payload, tagged by type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event_type")]
pub enum SyncPayload {
    /// A full rebuild finished and the new graph is live.
    FullSyncCompleted {
        nodes_created: usize,
        edges_created: usize,
        edges_skipped: usize,
        duration_ms: u64,
    },
    /// A full rebuild aborted; the previous graph (if any) stays live.
    FullSyncFailed { error: String },
    /// One project was refreshed and its recent events merged.
    ProjectSynced {
        project_id: i64,
        events_merged: usize,
        edges_merged: usize,
        edges_skipped: usize,
    },
    /// Incremental sync had nothing to do.
    ProjectSkipped { project_id: i64, reason: String },
}
