//! The graph service handle.
//!
//! Owns the live graph behind a single-writer/many-reader lock. The graph
//! is `None` until the first successful full sync; every query is total
//! over that state and answers empty or zero results instead of failing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use opsgraph_core::{SyncEvent, SyncPayload, SyncRunId};
use opsgraph_graph::{GraphClient, GraphError, GraphStats, GraphStore, GraphView};
use opsgraph_insights::GraphInsights;
use opsgraph_sync::{
    apply_project_delta, fetch_project_delta, full_sync, FullSyncReport, SourceAdapter,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};

pub struct GraphService {
    source: Arc<dyn SourceAdapter>,
    config: ServiceConfig,
    /// Publications and queries share the store through the `Arc`; syncs
    /// replace or copy-on-write it under the write lock.
    graph: RwLock<Option<Arc<GraphStore>>>,
    /// Serializes full rebuilds.
    rebuild: Mutex<()>,
    mirror: RwLock<Option<GraphClient>>,
    last_sync: RwLock<Option<SyncEvent>>,
    closed: AtomicBool,
}

impl GraphService {
    pub fn new(source: Arc<dyn SourceAdapter>, config: ServiceConfig) -> Self {
        Self {
            source,
            config,
            graph: RwLock::new(None),
            rebuild: Mutex::new(()),
            mirror: RwLock::new(None),
            last_sync: RwLock::new(None),
            closed: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Connect the mirror (if configured) and run the startup rebuild.
    /// Failures are logged and leave the service running without a graph.
    pub async fn start(&self) {
        if let Err(e) = self.connect_mirror().await {
            warn!(error = %e, "Neo4j mirror unavailable, publication disabled");
        }
        if let Err(e) = self.full_sync().await {
            error!(error = %e, "Startup graph sync failed, continuing without a graph");
        }
    }

    /// Connect to the configured Neo4j mirror. A no-op when none is set.
    pub async fn connect_mirror(&self) -> Result<()> {
        let Some(neo4j) = &self.config.neo4j else {
            return Ok(());
        };
        let client = tokio::time::timeout(
            Duration::from_secs(neo4j.timeout_secs),
            GraphClient::connect(neo4j),
        )
        .await
        .map_err(|_| GraphError::Timeout {
            seconds: neo4j.timeout_secs,
        })??;
        *self.mirror.write().await = Some(client);
        Ok(())
    }

    /// Drop the graph and the mirror connection. Later syncs fail with
    /// [`ServiceError::Unavailable`]; queries answer empty.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let _rebuild = self.rebuild.lock().await;
        *self.graph.write().await = None;
        *self.mirror.write().await = None;
        info!("Graph service shut down");
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("service is shut down".to_string()));
        }
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────

    async fn read<T: Default>(&self, query: impl FnOnce(&GraphStore) -> T) -> T {
        self.graph
            .read()
            .await
            .as_deref()
            .map(query)
            .unwrap_or_default()
    }

    pub async fn is_ready(&self) -> bool {
        self.graph.read().await.is_some()
    }

    /// True when the graph is populated and, if a mirror is configured,
    /// the mirror answers within its timeout.
    pub async fn health(&self) -> bool {
        if !self.is_ready().await {
            return false;
        }
        if self.config.neo4j.is_none() {
            return true;
        }
        let client = self.mirror.read().await.clone();
        match client {
            Some(client) => match client.health().await {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Neo4j health probe failed");
                    false
                }
            },
            None => false,
        }
    }

    pub async fn full_graph(&self) -> GraphView {
        self.read(GraphStore::full_graph).await
    }

    pub async fn department_subgraph(&self, dept_id: &str) -> GraphView {
        self.read(|g| g.department_subgraph(dept_id)).await
    }

    pub async fn project_lineage(&self, project_id: i64) -> GraphView {
        self.read(|g| g.project_lineage(project_id)).await
    }

    pub async fn insights(&self) -> GraphInsights {
        self.read(opsgraph_insights::all_insights).await
    }

    pub async fn stats(&self) -> GraphStats {
        self.read(GraphStore::stats).await
    }

    /// The live graph, detached from the lock. Later syncs do not change the
    /// returned store.
    pub async fn snapshot(&self) -> Option<Arc<GraphStore>> {
        self.graph.read().await.clone()
    }

    /// The outcome of the most recent sync, if any ran.
    pub async fn last_sync(&self) -> Option<SyncEvent> {
        self.last_sync.read().await.clone()
    }

    // ── Sync ─────────────────────────────────────────────────────

    /// Rebuild the graph from the source and swap it in. On failure the
    /// previous graph, if any, stays live.
    pub async fn full_sync(&self) -> Result<FullSyncReport> {
        self.ensure_open()?;
        let rebuild = self.rebuild.lock().await;
        let run = SyncRunId::new();

        let (store, report) = match full_sync(self.source.as_ref(), &self.config.sync).await {
            Ok(built) => built,
            Err(e) => {
                let payload = SyncPayload::FullSyncFailed {
                    error: e.to_string(),
                };
                self.record(SyncEvent::new(run, payload)).await;
                return Err(e.into());
            }
        };

        let store = Arc::new(store);
        *self.graph.write().await = Some(Arc::clone(&store));
        self.record(SyncEvent::new(run, report.to_payload())).await;
        drop(rebuild);

        self.publish_snapshot(&store).await;
        Ok(report)
    }

    /// Refresh one project and merge its recent events.
    ///
    /// A project gone from the source, or not yet in the graph, is a no-op
    /// reported as [`SyncPayload::ProjectSkipped`].
    pub async fn sync_project(&self, project_id: i64) -> Result<SyncPayload> {
        self.ensure_open()?;
        let run = SyncRunId::new();

        let delta =
            fetch_project_delta(self.source.as_ref(), project_id, &self.config.sync).await?;
        let payload = match delta {
            None => {
                debug!(project_id, "Project no longer in source, skipping");
                SyncPayload::ProjectSkipped {
                    project_id,
                    reason: "not in source".to_string(),
                }
            }
            // Copies the store first if a publication still holds it.
            Some(delta) => match self.graph.write().await.as_mut() {
                Some(store) => apply_project_delta(Arc::make_mut(store), &delta),
                None => SyncPayload::ProjectSkipped {
                    project_id,
                    reason: "graph not initialized".to_string(),
                },
            },
        };

        if matches!(payload, SyncPayload::ProjectSynced { .. }) {
            if let Some(store) = self.snapshot().await {
                self.publish_project(&store, project_id).await;
            }
        }
        self.record(SyncEvent::new(run, payload.clone())).await;
        Ok(payload)
    }

    async fn record(&self, event: SyncEvent) {
        *self.last_sync.write().await = Some(event);
    }

    // ── Mirror ───────────────────────────────────────────────────

    /// Publish `store` to the mirror. Runs without any service lock held.
    async fn publish_snapshot(&self, store: &GraphStore) {
        let Some(client) = self.mirror.read().await.clone() else {
            return;
        };
        let limit = client.publish_timeout();
        match tokio::time::timeout(limit, client.publish_snapshot(store)).await {
            Ok(Ok(report)) => debug!(
                nodes = report.nodes_written,
                edges = report.edges_written,
                "Published graph snapshot to Neo4j"
            ),
            Ok(Err(e)) => warn!(error = %e, "Failed to publish graph snapshot to Neo4j"),
            Err(_) => warn!(
                seconds = limit.as_secs(),
                "Neo4j snapshot publication timed out"
            ),
        }
    }

    async fn publish_project(&self, store: &GraphStore, project_id: i64) {
        let Some(client) = self.mirror.read().await.clone() else {
            return;
        };
        let limit = client.timeout();
        match tokio::time::timeout(limit, client.publish_project(store, project_id)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(project_id, error = %e, "Failed to publish project to Neo4j"),
            Err(_) => warn!(
                project_id,
                seconds = limit.as_secs(),
                "Neo4j project publication timed out"
            ),
        }
    }
}
