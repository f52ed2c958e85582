//! Incremental sync: refresh one project and merge its recent events.
//!
//! Split in two so the source read happens without holding any lock on the
//! live graph; only [`apply_project_delta`] needs exclusive access.

use opsgraph_core::{
    AimsEvent, EdgeKind, EventRecord, GraphId, Node, ProjectRecord, ProjectUpdate, SyncPayload,
};
use opsgraph_graph::GraphStore;
use tracing::{debug, warn};

use crate::config::SyncConfig;
use crate::error::Result;
use crate::source::{bounded, SourceAdapter};

/// The current source state of one project.
#[derive(Debug, Clone)]
pub struct ProjectDelta {
    pub project: ProjectRecord,
    /// Newest first, at most `project_event_limit`.
    pub events: Vec<EventRecord>,
}

/// Read one project and its most recent events. `None` when the project no
/// longer exists in the source.
pub async fn fetch_project_delta(
    source: &dyn SourceAdapter,
    project_id: i64,
    config: &SyncConfig,
) -> Result<Option<ProjectDelta>> {
    let secs = config.source_timeout_secs;
    let Some(project) = bounded(secs, "project", source.project(project_id)).await? else {
        return Ok(None);
    };
    let events = bounded(
        secs,
        "project_events",
        source.project_events(project_id, config.project_event_limit),
    )
    .await?;
    Ok(Some(ProjectDelta { project, events }))
}

/// Apply a fetched delta to the graph.
///
/// Overwrites the project's lifecycle fields, merges event nodes by
/// identity, and merges one `HAS_EVENT` edge per event. Edges that cannot
/// be placed are skipped with a warning. A project absent from the graph
/// leaves it untouched.
pub fn apply_project_delta(store: &mut GraphStore, delta: &ProjectDelta) -> SyncPayload {
    let project_id = delta.project.id;
    if !store.update_project(project_id, &ProjectUpdate::from(&delta.project)) {
        debug!(project_id, "Project not in graph, skipping incremental sync");
        return SyncPayload::ProjectSkipped {
            project_id,
            reason: "not in graph".to_string(),
        };
    }

    let project_gid = GraphId::project(project_id);
    let mut events_merged = 0;
    let mut edges_merged = 0;
    let mut edges_skipped = 0;

    for event in &delta.events {
        if store.merge_node(Node::AimsEvent(AimsEvent::from(event))) {
            events_merged += 1;
        }
        match store.create_edge(&project_gid, &GraphId::event(event.id), EdgeKind::HasEvent) {
            Ok(true) => edges_merged += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(project_id, event_id = event.id, error = %e, "Skipping event edge");
                edges_skipped += 1;
            }
        }
    }

    debug!(project_id, events_merged, edges_merged, "Incremental project sync complete");
    SyncPayload::ProjectSynced {
        project_id,
        events_merged,
        edges_merged,
        edges_skipped,
    }
}
