//! Error types for the opsgraph-graph crate.

use opsgraph_core::{EdgeKind, GraphId, NodeLabel};
use thiserror::Error;

/// Errors from graph store and Neo4j operations.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Neo4j did not answer within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Uniqueness constraint violated: {label} node {graph_id} already exists")]
    ConstraintViolation { label: NodeLabel, graph_id: GraphId },

    #[error("Dangling {kind} edge {from} -> {to}: node {missing} does not exist")]
    DanglingEdge {
        kind: EdgeKind,
        from: GraphId,
        to: GraphId,
        missing: GraphId,
    },

    #[error("{kind} cannot connect {from_label} to {to_label}")]
    LabelMismatch {
        kind: EdgeKind,
        from_label: NodeLabel,
        to_label: NodeLabel,
    },

    #[error("{from} already has an outgoing {kind} edge")]
    Cardinality { kind: EdgeKind, from: GraphId },
}

impl GraphError {
    /// Referential errors: an edge that cannot be placed in the current graph.
    pub fn is_referential(&self) -> bool {
        matches!(
            self,
            GraphError::DanglingEdge { .. } | GraphError::Cardinality { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
