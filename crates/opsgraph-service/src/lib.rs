//! opsgraph-service: the long-lived handle over the knowledge graph.
//!
//! [`GraphService`] owns the live graph, runs full and per-project syncs
//! against a [`SourceAdapter`](opsgraph_sync::SourceAdapter), answers graph
//! and insight queries, and mirrors results into Neo4j when configured.

pub mod config;
pub mod error;
pub mod service;

pub use config::{ServiceConfig, SourceConfig};
pub use error::{Result, ServiceError};
pub use service::GraphService;
