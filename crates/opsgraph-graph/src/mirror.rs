//! Publication of the in-memory graph to the Neo4j mirror.
//!
//! A snapshot replaces every opsgraph-labelled node in Neo4j inside one
//! transaction; a project publish upserts one project and its events.
//! Uniqueness constraints are schema operations and run before the data
//! transaction opens.

use neo4rs::{query, Query};
use opsgraph_core::{EdgeKind, GraphId, Node, NodeLabel};
use serde::Serialize;

use crate::client::GraphClient;
use crate::error::Result;
use crate::store::GraphStore;

/// Counts of what one publication wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MirrorReport {
    pub nodes_written: usize,
    pub edges_written: usize,
}

/// A node property Neo4j can store directly.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PropValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    List(Vec<String>),
}

impl GraphClient {
    /// Declare a `graph_id` uniqueness constraint for every node label.
    pub async fn ensure_constraints(&self) -> Result<()> {
        for label in NodeLabel::ALL {
            self.run(query(&constraint_statement(label))).await?;
        }
        Ok(())
    }

    /// Replace the mirror's contents with `store`.
    pub async fn publish_snapshot(&self, store: &GraphStore) -> Result<MirrorReport> {
        self.ensure_constraints().await?;

        let mut report = MirrorReport::default();
        let mut txn = self.start_txn().await?;

        txn.run(query(&wipe_statement())).await?;

        for node_ref in store.iter_nodes() {
            txn.run(merge_node_query(node_ref.id, node_ref.node)).await?;
            report.nodes_written += 1;
        }

        for edge in store.iter_edges() {
            let (Some(from), Some(to)) = (store.node(edge.from), store.node(edge.to)) else {
                continue;
            };
            txn.run(merge_edge_query(
                edge.from,
                from.label(),
                edge.to,
                to.label(),
                edge.kind,
            ))
            .await?;
            report.edges_written += 1;
        }

        txn.commit().await?;
        tracing::info!(
            nodes = report.nodes_written,
            edges = report.edges_written,
            "Published graph snapshot to Neo4j"
        );
        Ok(report)
    }

    /// Upsert one project node, its events, and its `HAS_EVENT` edges.
    /// A project absent from `store` writes nothing.
    pub async fn publish_project(
        &self,
        store: &GraphStore,
        project_id: i64,
    ) -> Result<MirrorReport> {
        let project_gid = GraphId::project(project_id);
        let Some(project) = store.node(&project_gid) else {
            return Ok(MirrorReport::default());
        };

        let mut report = MirrorReport::default();
        let mut txn = self.start_txn().await?;

        txn.run(merge_node_query(&project_gid, project)).await?;
        report.nodes_written += 1;

        for event in store.outgoing(&project_gid, EdgeKind::HasEvent) {
            txn.run(merge_node_query(event.id, event.node)).await?;
            txn.run(merge_edge_query(
                &project_gid,
                NodeLabel::AiProject,
                event.id,
                NodeLabel::AimsEvent,
                EdgeKind::HasEvent,
            ))
            .await?;
            report.nodes_written += 1;
            report.edges_written += 1;
        }

        txn.commit().await?;
        tracing::debug!(project_id, events = report.edges_written, "Published project to Neo4j");
        Ok(report)
    }
}

// ── Statement Builders ───────────────────────────────────────────

fn constraint_statement(label: NodeLabel) -> String {
    format!(
        "CREATE CONSTRAINT {}_graph_id IF NOT EXISTS \
         FOR (n:{}) REQUIRE n.graph_id IS UNIQUE",
        label.as_str().to_ascii_lowercase(),
        label.as_str()
    )
}

fn wipe_statement() -> String {
    let predicate = NodeLabel::ALL
        .iter()
        .map(|l| format!("n:{}", l.as_str()))
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("MATCH (n) WHERE {predicate} DETACH DELETE n")
}

fn merge_node_query(id: &GraphId, node: &Node) -> Query {
    let props = storable_props(&node.properties());
    let keys: Vec<&str> = props.iter().map(|(k, _)| k.as_str()).collect();
    let cypher = format!(
        "MERGE (n:{} {{graph_id: $graph_id}}) {}",
        node.label().as_str(),
        set_clause(&keys)
    );

    let mut q = query(&cypher).param("graph_id", id.to_string());
    for (key, value) in props {
        q = match value {
            PropValue::Str(s) => q.param(&key, s),
            PropValue::Bool(b) => q.param(&key, b),
            PropValue::Int(i) => q.param(&key, i),
            PropValue::Float(f) => q.param(&key, f),
            PropValue::List(l) => q.param(&key, l),
        };
    }
    q
}

fn merge_edge_query(
    from: &GraphId,
    from_label: NodeLabel,
    to: &GraphId,
    to_label: NodeLabel,
    kind: EdgeKind,
) -> Query {
    let cypher = format!(
        "MATCH (a:{from_label} {{graph_id: $from}}) \
         MATCH (b:{to_label} {{graph_id: $to}}) \
         MERGE (a)-[:{kind}]->(b)"
    );
    query(&cypher)
        .param("from", from.to_string())
        .param("to", to.to_string())
}

/// `SET n.k = $k, ...` for each key, or an empty string for no keys.
pub(crate) fn set_clause(keys: &[&str]) -> String {
    if keys.is_empty() {
        return String::new();
    }
    let assignments = keys
        .iter()
        .map(|k| format!("n.{k} = ${k}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("SET {assignments}")
}

/// Properties Neo4j can hold, excluding `graph_id` (bound separately).
/// Nulls, nested objects, and non-string arrays are dropped, as are keys
/// that are not plain identifiers.
pub(crate) fn storable_props(
    props: &serde_json::Map<String, serde_json::Value>,
) -> Vec<(String, PropValue)> {
    use serde_json::Value;

    props
        .iter()
        .filter(|(key, _)| key.as_str() != "graph_id" && is_identifier(key))
        .filter_map(|(key, value)| {
            let prop = match value {
                Value::String(s) => PropValue::Str(s.clone()),
                Value::Bool(b) => PropValue::Bool(*b),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => PropValue::Int(i),
                    None => PropValue::Float(n.as_f64()?),
                },
                Value::Array(items) => PropValue::List(
                    items
                        .iter()
                        .map(|v| v.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()?,
                ),
                Value::Null | Value::Object(_) => return None,
            };
            Some((key.clone(), prop))
        })
        .collect()
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
