//! Error types for the opsgraph-sync crate.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Source error: {0}")]
    Source(String),

    #[error("Source did not answer {operation} within {seconds}s")]
    Timeout {
        operation: &'static str,
        seconds: u64,
    },

    #[error("Graph build task failed: {0}")]
    Build(String),

    #[error("Graph error: {0}")]
    Graph(#[from] opsgraph_graph::GraphError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
