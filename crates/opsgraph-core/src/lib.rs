//! opsgraph-core: Shared data model for the opsgraph knowledge graph.
//!
//! This crate provides the foundational types used across all opsgraph crates:
//! - Source records delivered by the source-of-truth store
//! - Node kinds (Department, Workflow, AIProject, etc.) and their identity scheme
//! - Edge kinds (HAS_WORKFLOW, GOVERNED_BY, etc.) with their endpoint rules
//! - Fixed principle and framework catalogs
//! - Sync lifecycle events

pub mod catalog;
pub mod events;
pub mod types;

pub use events::{SyncEvent, SyncPayload, SyncRunId};
pub use types::{
    AiProject, AimsEvent, Control, ControlFramework, ControlRecord, Department, DepartmentRecord,
    EdgeKind, EventRecord, FrameworkRecord, GraphId, Node, NodeLabel, Principle, PrincipleRecord,
    ProjectRecord, ProjectUpdate, ScoreRecord, Tool, Workflow, WorkflowRecord, WorkflowScore,
};
