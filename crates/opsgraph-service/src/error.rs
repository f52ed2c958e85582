//! Error types for the opsgraph-service crate.

use opsgraph_graph::GraphError;
use opsgraph_sync::SyncError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Graph unavailable: {0}")]
    Unavailable(String),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ServiceError {
    /// Whether the failure is a connectivity problem rather than bad data.
    pub fn is_unavailable(&self) -> bool {
        match self {
            ServiceError::Unavailable(_) => true,
            ServiceError::Graph(e) => {
                matches!(e, GraphError::Connection(_) | GraphError::Timeout { .. })
            }
            ServiceError::Sync(e) => matches!(
                e,
                SyncError::Io { .. } | SyncError::Source(_) | SyncError::Timeout { .. }
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
