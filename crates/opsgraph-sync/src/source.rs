//! Source adapters: the read-only boundary to the source-of-truth store.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use opsgraph_core::catalog;
use opsgraph_core::{
    ControlRecord, DepartmentRecord, EventRecord, FrameworkRecord, PrincipleRecord, ProjectRecord,
    ScoreRecord, WorkflowRecord,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Result, SyncError};

/// Supplies the records the graph is derived from.
///
/// Principles and the framework are fixed catalogs; adapters only override
/// them when embedding a different catalog.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn departments(&self) -> Result<Vec<DepartmentRecord>>;

    async fn workflows(&self) -> Result<Vec<WorkflowRecord>>;

    async fn controls(&self) -> Result<Vec<ControlRecord>>;

    /// Projects ordered by id, at most `limit` of them.
    async fn projects(&self, limit: Option<usize>) -> Result<Vec<ProjectRecord>>;

    async fn project(&self, project_id: i64) -> Result<Option<ProjectRecord>>;

    /// The `limit` most recent events across all projects, newest first.
    async fn recent_events(&self, limit: usize) -> Result<Vec<EventRecord>>;

    /// The `limit` most recent events of one project, newest first.
    async fn project_events(&self, project_id: i64, limit: usize) -> Result<Vec<EventRecord>>;

    async fn workflow_scores(&self) -> Result<Vec<ScoreRecord>>;

    fn principles(&self) -> Vec<PrincipleRecord> {
        catalog::principles()
    }

    fn framework(&self) -> FrameworkRecord {
        catalog::framework()
    }
}

/// Run one source call, failing with [`SyncError::Timeout`] if it outlives
/// `seconds`.
pub(crate) async fn bounded<T>(
    seconds: u64,
    operation: &'static str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(Duration::from_secs(seconds), call)
        .await
        .map_err(|_| SyncError::Timeout { operation, seconds })?
}

/// Newest first; undated events sort last, ties broken by id descending.
fn most_recent<'a>(
    events: impl Iterator<Item = &'a EventRecord>,
    limit: usize,
) -> Vec<EventRecord> {
    let mut events: Vec<EventRecord> = events.cloned().collect();
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
    events.truncate(limit);
    events
}

fn first_projects(projects: &[ProjectRecord], limit: Option<usize>) -> Vec<ProjectRecord> {
    let mut projects = projects.to_vec();
    projects.sort_by_key(|p| p.id);
    if let Some(limit) = limit {
        projects.truncate(limit);
    }
    projects
}

// ── JSON Directory ───────────────────────────────────────────────

/// Reads the source snapshot from a directory of JSON arrays, re-reading
/// the files on every call.
///
/// `departments.json`, `workflows.json` and `controls.json` are required;
/// `projects.json`, `events.json` and `workflow_scores.json` read as empty
/// when absent.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_required<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.dir.join(file);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| SyncError::Io {
                path: path.clone(),
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|source| SyncError::Parse { path, source })
    }

    async fn read_optional<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        if !tokio::fs::try_exists(self.dir.join(file))
            .await
            .unwrap_or(false)
        {
            tracing::debug!(file, dir = %self.dir.display(), "Optional source file absent");
            return Ok(Vec::new());
        }
        self.read_required(file).await
    }
}

#[async_trait]
impl SourceAdapter for JsonDirSource {
    async fn departments(&self) -> Result<Vec<DepartmentRecord>> {
        self.read_required("departments.json").await
    }

    async fn workflows(&self) -> Result<Vec<WorkflowRecord>> {
        self.read_required("workflows.json").await
    }

    async fn controls(&self) -> Result<Vec<ControlRecord>> {
        self.read_required("controls.json").await
    }

    async fn projects(&self, limit: Option<usize>) -> Result<Vec<ProjectRecord>> {
        let projects: Vec<ProjectRecord> = self.read_optional("projects.json").await?;
        Ok(first_projects(&projects, limit))
    }

    async fn project(&self, project_id: i64) -> Result<Option<ProjectRecord>> {
        let projects: Vec<ProjectRecord> = self.read_optional("projects.json").await?;
        Ok(projects.into_iter().find(|p| p.id == project_id))
    }

    async fn recent_events(&self, limit: usize) -> Result<Vec<EventRecord>> {
        let events: Vec<EventRecord> = self.read_optional("events.json").await?;
        Ok(most_recent(events.iter(), limit))
    }

    async fn project_events(&self, project_id: i64, limit: usize) -> Result<Vec<EventRecord>> {
        let events: Vec<EventRecord> = self.read_optional("events.json").await?;
        Ok(most_recent(
            events.iter().filter(|e| e.project_id == project_id),
            limit,
        ))
    }

    async fn workflow_scores(&self) -> Result<Vec<ScoreRecord>> {
        self.read_optional("workflow_scores.json").await
    }
}

// ── In-Memory ────────────────────────────────────────────────────

/// A complete source snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSnapshot {
    #[serde(default)]
    pub departments: Vec<DepartmentRecord>,
    #[serde(default)]
    pub workflows: Vec<WorkflowRecord>,
    #[serde(default)]
    pub controls: Vec<ControlRecord>,
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub scores: Vec<ScoreRecord>,
}

/// An in-process source whose snapshot can be edited between syncs.
#[derive(Debug, Default)]
pub struct MemorySource {
    snapshot: RwLock<SourceSnapshot>,
}

impl MemorySource {
    pub fn new(snapshot: SourceSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }

    /// Apply an edit to the snapshot.
    pub async fn update(&self, edit: impl FnOnce(&mut SourceSnapshot)) {
        let mut snapshot = self.snapshot.write().await;
        edit(&mut snapshot);
    }

    pub async fn snapshot(&self) -> SourceSnapshot {
        self.snapshot.read().await.clone()
    }
}

#[async_trait]
impl SourceAdapter for MemorySource {
    async fn departments(&self) -> Result<Vec<DepartmentRecord>> {
        Ok(self.snapshot.read().await.departments.clone())
    }

    async fn workflows(&self) -> Result<Vec<WorkflowRecord>> {
        Ok(self.snapshot.read().await.workflows.clone())
    }

    async fn controls(&self) -> Result<Vec<ControlRecord>> {
        Ok(self.snapshot.read().await.controls.clone())
    }

    async fn projects(&self, limit: Option<usize>) -> Result<Vec<ProjectRecord>> {
        Ok(first_projects(&self.snapshot.read().await.projects, limit))
    }

    async fn project(&self, project_id: i64) -> Result<Option<ProjectRecord>> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot.projects.iter().find(|p| p.id == project_id).cloned())
    }

    async fn recent_events(&self, limit: usize) -> Result<Vec<EventRecord>> {
        Ok(most_recent(self.snapshot.read().await.events.iter(), limit))
    }

    async fn project_events(&self, project_id: i64, limit: usize) -> Result<Vec<EventRecord>> {
        let snapshot = self.snapshot.read().await;
        Ok(most_recent(
            snapshot.events.iter().filter(|e| e.project_id == project_id),
            limit,
        ))
    }

    async fn workflow_scores(&self) -> Result<Vec<ScoreRecord>> {
        Ok(self.snapshot.read().await.scores.clone())
    }
}
