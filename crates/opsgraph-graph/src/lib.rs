//! opsgraph-graph: the canonical property graph and its read paths.
//!
//! The in-memory [`GraphStore`] is the graph every query runs against. It
//! enforces identity uniqueness, edge endpoint kinds, and single-outgoing
//! cardinality. The optional [`GraphClient`] mirrors a finished graph into
//! Neo4j for external tooling; it is never read back.

pub mod client;
pub mod error;
pub mod mirror;
pub mod queries;
pub mod store;

pub use client::{GraphClient, Neo4jConfig};
pub use error::{GraphError, Result};
pub use mirror::MirrorReport;
pub use queries::{GraphStats, GraphView, LinkRecord, NodeRecord, DEPARTMENT_SUBGRAPH_HOPS};
pub use store::{EdgeRef, GraphStore, NodeRef};
