//! opsgraph-sync: keeping the graph in step with the source of truth.
//!
//! Two protocols:
//! - [`full_sync`] rebuilds the whole graph into a fresh store.
//! - [`fetch_project_delta`] + [`apply_project_delta`] refresh one project
//!   and merge its recent events into the live store.

pub mod config;
pub mod error;
pub mod full;
pub mod incremental;
pub mod source;

#[cfg(test)]
mod testdata;

pub use config::{EdgePolicy, SyncConfig};
pub use error::{Result, SyncError};
pub use full::{build_graph, fetch_snapshot, full_sync, FullSnapshot, FullSyncReport};
pub use incremental::{apply_project_delta, fetch_project_delta, ProjectDelta};
pub use source::{JsonDirSource, MemorySource, SourceAdapter, SourceSnapshot};
