//! Full rebuild: derive a complete graph from the current source snapshot.
//!
//! The rebuild runs against a fresh staging store. Callers swap it in only
//! once [`full_sync`] returns, so a failed rebuild never leaves a partial
//! graph behind.

use std::collections::{BTreeSet, HashSet};
use std::time::Instant;

use opsgraph_core::{
    AiProject, AimsEvent, Control, ControlFramework, Department, EdgeKind, FrameworkRecord,
    GraphId, Node, NodeLabel, Principle, PrincipleRecord, SyncPayload, Tool, Workflow,
    WorkflowScore,
};
use opsgraph_graph::GraphStore;
use tracing::{debug, info, warn};

use crate::config::{EdgePolicy, SyncConfig};
use crate::error::{Result, SyncError};
use crate::source::{bounded, SourceAdapter, SourceSnapshot};

/// Everything a rebuild reads from the source, fetched up front.
#[derive(Debug, Clone)]
pub struct FullSnapshot {
    pub records: SourceSnapshot,
    pub principles: Vec<PrincipleRecord>,
    pub framework: FrameworkRecord,
}

/// Counts from one rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullSyncReport {
    pub nodes_created: usize,
    pub edges_created: usize,
    pub edges_skipped: usize,
    pub duration_ms: u64,
}

impl FullSyncReport {
    pub fn to_payload(&self) -> SyncPayload {
        SyncPayload::FullSyncCompleted {
            nodes_created: self.nodes_created,
            edges_created: self.edges_created,
            edges_skipped: self.edges_skipped,
            duration_ms: self.duration_ms,
        }
    }
}

/// Read the source and build a complete replacement graph. The build runs
/// on the blocking pool.
pub async fn full_sync(
    source: &dyn SourceAdapter,
    config: &SyncConfig,
) -> Result<(GraphStore, FullSyncReport)> {
    let start = Instant::now();
    let snapshot = fetch_snapshot(source, config).await?;

    let build_config = config.clone();
    let (store, mut report) =
        tokio::task::spawn_blocking(move || build_graph(&snapshot, &build_config))
            .await
            .map_err(|e| SyncError::Build(e.to_string()))??;
    report.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        nodes = report.nodes_created,
        edges = report.edges_created,
        skipped = report.edges_skipped,
        duration_ms = report.duration_ms,
        "Full graph sync complete"
    );
    Ok((store, report))
}

/// Fetch every collection a rebuild needs, each call bounded in time.
pub async fn fetch_snapshot(
    source: &dyn SourceAdapter,
    config: &SyncConfig,
) -> Result<FullSnapshot> {
    let secs = config.source_timeout_secs;
    let records = SourceSnapshot {
        departments: bounded(secs, "departments", source.departments()).await?,
        workflows: bounded(secs, "workflows", source.workflows()).await?,
        controls: bounded(secs, "controls", source.controls()).await?,
        projects: bounded(secs, "projects", source.projects(config.project_limit)).await?,
        events: bounded(
            secs,
            "recent_events",
            source.recent_events(config.full_event_limit),
        )
        .await?,
        scores: bounded(secs, "workflow_scores", source.workflow_scores()).await?,
    };
    Ok(FullSnapshot {
        records,
        principles: source.principles(),
        framework: source.framework(),
    })
}

/// Build the graph from an already-fetched snapshot.
///
/// Duplicate identities and label mismatches always fail. Dangling and
/// cardinality-breaking edges fail under [`EdgePolicy::Strict`] and are
/// skipped with a warning under [`EdgePolicy::Lenient`]. Events of projects
/// outside the loaded set are dropped, like the other unresolved joins.
pub fn build_graph(
    snapshot: &FullSnapshot,
    config: &SyncConfig,
) -> Result<(GraphStore, FullSyncReport)> {
    let r = &snapshot.records;
    let mut store = GraphStore::new();
    for label in NodeLabel::ALL {
        store.declare_unique(label);
    }

    // ── Nodes ────────────────────────────────────────────────────

    for dept in &r.departments {
        store.create_node(Node::Department(Department::from(dept)))?;
    }

    let tools: BTreeSet<&str> = r
        .departments
        .iter()
        .flat_map(|d| d.key_tools.iter())
        .chain(r.workflows.iter().flat_map(|w| w.current_tools.iter()))
        .map(String::as_str)
        .collect();
    for name in &tools {
        store.create_node(Node::Tool(Tool {
            name: name.to_string(),
        }))?;
    }

    for wf in &r.workflows {
        store.create_node(Node::Workflow(Workflow::from(wf)))?;
    }
    let workflow_ids: HashSet<&str> = r.workflows.iter().map(|w| w.id.as_str()).collect();

    let mut scored = Vec::new();
    for score in &r.scores {
        if !workflow_ids.contains(score.id.as_str()) {
            warn!(workflow = %score.id, "Skipping score for unknown workflow");
            continue;
        }
        store.create_node(Node::WorkflowScore(WorkflowScore::from(score)))?;
        scored.push(score.id.as_str());
    }

    for project in &r.projects {
        store.create_node(Node::AiProject(AiProject::from(project)))?;
    }
    let project_ids: HashSet<i64> = r.projects.iter().map(|p| p.id).collect();
    let events: Vec<_> = r
        .events
        .iter()
        .filter(|e| project_ids.contains(&e.project_id))
        .collect();
    if events.len() < r.events.len() {
        debug!(
            dropped = r.events.len() - events.len(),
            "Dropping events of projects outside the loaded set"
        );
    }

    for control in &r.controls {
        store.create_node(Node::Control(Control::from(control)))?;
    }
    let control_ids: HashSet<&str> = r.controls.iter().map(|c| c.id.as_str()).collect();

    for principle in &snapshot.principles {
        store.create_node(Node::Principle(Principle::from(principle)))?;
    }

    store.create_node(Node::ControlFramework(ControlFramework::from(
        &snapshot.framework,
    )))?;

    for event in events.iter().copied() {
        store.create_node(Node::AimsEvent(AimsEvent::from(event)))?;
    }

    let nodes_created = store.node_count();

    // ── Edges ────────────────────────────────────────────────────

    let dept_ids: HashSet<&str> = r.departments.iter().map(|d| d.id.as_str()).collect();
    let mut edges = EdgeBatch::new(config.edge_policy);

    for wf in &r.workflows {
        edges.link(
            &mut store,
            GraphId::department(&wf.department),
            GraphId::workflow(&wf.id),
            EdgeKind::HasWorkflow,
        )?;
    }

    for dept in &r.departments {
        for tool in &dept.key_tools {
            edges.link(
                &mut store,
                GraphId::department(&dept.id),
                GraphId::tool(tool),
                EdgeKind::UsesTool,
            )?;
        }
    }
    for wf in &r.workflows {
        for tool in &wf.current_tools {
            edges.link(
                &mut store,
                GraphId::workflow(&wf.id),
                GraphId::tool(tool),
                EdgeKind::UsesTool,
            )?;
        }
    }

    for wf in &r.workflows {
        for principle in &wf.jim_principles {
            edges.link(
                &mut store,
                GraphId::workflow(&wf.id),
                GraphId::principle(principle),
                EdgeKind::FollowsPrinciple,
            )?;
        }
    }

    for wf_id in &scored {
        edges.link(
            &mut store,
            GraphId::workflow(wf_id),
            GraphId::workflow_score(wf_id),
            EdgeKind::HasScore,
        )?;
    }

    for project in r
        .projects
        .iter()
        .filter(|p| workflow_ids.contains(p.workflow_id.as_str()))
    {
        edges.link(
            &mut store,
            GraphId::workflow(&project.workflow_id),
            GraphId::project(project.id),
            EdgeKind::BecameProject,
        )?;
    }

    for project in r
        .projects
        .iter()
        .filter(|p| dept_ids.contains(p.department.as_str()))
    {
        edges.link(
            &mut store,
            GraphId::project(project.id),
            GraphId::department(&project.department),
            EdgeKind::BelongsTo,
        )?;
    }

    for project in &r.projects {
        for control in project
            .controls
            .iter()
            .filter(|c| control_ids.contains(c.as_str()))
        {
            edges.link(
                &mut store,
                GraphId::project(project.id),
                GraphId::control(control),
                EdgeKind::GovernedBy,
            )?;
        }
    }

    let framework = GraphId::framework(&snapshot.framework.id);
    for control in r.controls.iter().filter(|c| !config.is_unmapped(&c.id)) {
        edges.link(
            &mut store,
            GraphId::control(&control.id),
            framework.clone(),
            EdgeKind::PartOf,
        )?;
    }

    for event in events.iter().copied() {
        edges.link(
            &mut store,
            GraphId::project(event.project_id),
            GraphId::event(event.id),
            EdgeKind::HasEvent,
        )?;
    }

    Ok((
        store,
        FullSyncReport {
            nodes_created,
            edges_created: edges.created,
            edges_skipped: edges.skipped,
            duration_ms: 0,
        },
    ))
}

/// Applies the edge policy to each edge of a rebuild and tallies outcomes.
struct EdgeBatch {
    policy: EdgePolicy,
    created: usize,
    skipped: usize,
}

impl EdgeBatch {
    fn new(policy: EdgePolicy) -> Self {
        Self {
            policy,
            created: 0,
            skipped: 0,
        }
    }

    fn link(
        &mut self,
        store: &mut GraphStore,
        from: GraphId,
        to: GraphId,
        kind: EdgeKind,
    ) -> Result<()> {
        match store.create_edge(&from, &to, kind) {
            Ok(true) => self.created += 1,
            Ok(false) => {}
            Err(e) if e.is_referential() && self.policy == EdgePolicy::Lenient => {
                warn!(error = %e, "Skipping edge");
                self.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}
