//! In-memory property graph.
//!
//! Nodes live in a dense vector with a `graph_id` → index map; edges are
//! stored once and referenced from per-node outgoing and incoming adjacency
//! lists, so both directions are O(degree) to walk.

use std::collections::{HashMap, HashSet};

use opsgraph_core::{AiProject, EdgeKind, GraphId, Node, NodeLabel, ProjectUpdate};

use crate::error::{GraphError, Result};

/// A borrowed view of one node and its identity.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub id: &'a GraphId,
    pub node: &'a Node,
}

/// A borrowed view of one directed edge.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRef<'a> {
    pub from: &'a GraphId,
    pub to: &'a GraphId,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredEdge {
    pub(crate) from: usize,
    pub(crate) to: usize,
    pub(crate) kind: EdgeKind,
}

/// The canonical graph store.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    pub(crate) ids: Vec<GraphId>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) index: HashMap<GraphId, usize>,
    by_label: HashMap<NodeLabel, Vec<usize>>,
    pub(crate) edges: Vec<StoredEdge>,
    edge_keys: HashSet<(usize, usize, EdgeKind)>,
    /// `outgoing[i]` = indices into `edges` leaving node `i`.
    pub(crate) outgoing: Vec<Vec<usize>>,
    /// `incoming[i]` = indices into `edges` entering node `i`.
    pub(crate) incoming: Vec<Vec<usize>>,
    constraints: Vec<NodeLabel>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Schema ───────────────────────────────────────────────────

    /// Declare a `graph_id` uniqueness constraint for a label.
    /// Declaring an existing constraint is a no-op.
    pub fn declare_unique(&mut self, label: NodeLabel) {
        if !self.constraints.contains(&label) {
            self.constraints.push(label);
        }
    }

    /// Declared constraints, in declaration order.
    pub fn constraints(&self) -> &[NodeLabel] {
        &self.constraints
    }

    // ── Node Mutations ───────────────────────────────────────────

    /// Create a node. Fails if its `graph_id` is already taken.
    pub fn create_node(&mut self, node: Node) -> Result<&GraphId> {
        let id = node.graph_id();
        if self.index.contains_key(&id) {
            return Err(GraphError::ConstraintViolation {
                label: node.label(),
                graph_id: id,
            });
        }
        let idx = self.insert(id, node);
        Ok(&self.ids[idx])
    }

    /// Create the node if absent, otherwise leave the existing one untouched.
    /// Returns whether a node was created.
    pub fn merge_node(&mut self, node: Node) -> bool {
        let id = node.graph_id();
        if self.index.contains_key(&id) {
            return false;
        }
        self.insert(id, node);
        true
    }

    fn insert(&mut self, id: GraphId, node: Node) -> usize {
        let idx = self.nodes.len();
        self.by_label.entry(node.label()).or_default().push(idx);
        self.index.insert(id.clone(), idx);
        self.ids.push(id);
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        idx
    }

    /// Overwrite the lifecycle fields of a project node.
    /// Returns `false` when the project is not in the graph.
    pub fn update_project(&mut self, project_id: i64, update: &ProjectUpdate) -> bool {
        let Some(&idx) = self.index.get(&GraphId::project(project_id)) else {
            return false;
        };
        match &mut self.nodes[idx] {
            Node::AiProject(project) => {
                update.apply_to(project);
                true
            }
            _ => false,
        }
    }

    // ── Edge Mutations ───────────────────────────────────────────

    /// Create a directed edge between two existing nodes.
    ///
    /// Returns `Ok(false)` when the same `(from, to, kind)` edge already
    /// exists. Fails on a missing endpoint, an endpoint of the wrong kind,
    /// or a second outgoing edge of a single-outgoing kind.
    pub fn create_edge(&mut self, from: &GraphId, to: &GraphId, kind: EdgeKind) -> Result<bool> {
        let from_idx = self.require(from, from, to, kind)?;
        let to_idx = self.require(to, from, to, kind)?;

        let from_label = self.nodes[from_idx].label();
        let to_label = self.nodes[to_idx].label();
        if !kind.allows(from_label, to_label) {
            return Err(GraphError::LabelMismatch {
                kind,
                from_label,
                to_label,
            });
        }

        if self.edge_keys.contains(&(from_idx, to_idx, kind)) {
            return Ok(false);
        }
        if kind.is_single_outgoing() && self.has_outgoing_idx(from_idx, kind) {
            return Err(GraphError::Cardinality {
                kind,
                from: from.clone(),
            });
        }

        let edge_idx = self.edges.len();
        self.edges.push(StoredEdge {
            from: from_idx,
            to: to_idx,
            kind,
        });
        self.edge_keys.insert((from_idx, to_idx, kind));
        self.outgoing[from_idx].push(edge_idx);
        self.incoming[to_idx].push(edge_idx);
        Ok(true)
    }

    fn require(
        &self,
        id: &GraphId,
        from: &GraphId,
        to: &GraphId,
        kind: EdgeKind,
    ) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::DanglingEdge {
                kind,
                from: from.clone(),
                to: to.clone(),
                missing: id.clone(),
            })
    }

    // ── Lookups ──────────────────────────────────────────────────

    pub fn contains(&self, id: &GraphId) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &GraphId) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn project(&self, project_id: i64) -> Option<&AiProject> {
        self.node(&GraphId::project(project_id))
            .and_then(Node::as_project)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.nodes.len()).map(move |i| self.node_ref(i))
    }

    pub fn iter_edges(&self) -> impl Iterator<Item = EdgeRef<'_>> {
        self.edges.iter().map(move |e| self.edge_ref(e))
    }

    /// All nodes carrying `label`, in creation order.
    pub fn nodes_with_label(&self, label: NodeLabel) -> impl Iterator<Item = NodeRef<'_>> {
        let indices: &[usize] = self
            .by_label
            .get(&label)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        indices.iter().map(move |&i| self.node_ref(i))
    }

    pub fn count_label(&self, label: NodeLabel) -> usize {
        self.by_label.get(&label).map_or(0, Vec::len)
    }

    /// Targets of `id`'s outgoing edges of `kind`.
    pub fn outgoing<'a>(
        &'a self,
        id: &GraphId,
        kind: EdgeKind,
    ) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let edges: &'a [usize] = self.edge_list(&self.outgoing, id);
        edges
            .iter()
            .map(move |&e| &self.edges[e])
            .filter(move |e| e.kind == kind)
            .map(move |e| self.node_ref(e.to))
    }

    /// Sources of `id`'s incoming edges of `kind`.
    pub fn incoming<'a>(
        &'a self,
        id: &GraphId,
        kind: EdgeKind,
    ) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let edges: &'a [usize] = self.edge_list(&self.incoming, id);
        edges
            .iter()
            .map(move |&e| &self.edges[e])
            .filter(move |e| e.kind == kind)
            .map(move |e| self.node_ref(e.from))
    }

    pub fn has_outgoing(&self, id: &GraphId, kind: EdgeKind) -> bool {
        self.index
            .get(id)
            .is_some_and(|&i| self.has_outgoing_idx(i, kind))
    }

    pub fn has_edge(&self, from: &GraphId, to: &GraphId, kind: EdgeKind) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&f), Some(&t)) => self.edge_keys.contains(&(f, t, kind)),
            _ => false,
        }
    }

    // ── Index-level helpers for traversals ───────────────────────

    pub(crate) fn neighbor_indices(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let out = self.outgoing[idx].iter().map(move |&e| self.edges[e].to);
        let inc = self.incoming[idx].iter().map(move |&e| self.edges[e].from);
        out.chain(inc)
    }

    pub(crate) fn node_ref(&self, idx: usize) -> NodeRef<'_> {
        NodeRef {
            id: &self.ids[idx],
            node: &self.nodes[idx],
        }
    }

    pub(crate) fn edge_ref(&self, edge: &StoredEdge) -> EdgeRef<'_> {
        EdgeRef {
            from: &self.ids[edge.from],
            to: &self.ids[edge.to],
            kind: edge.kind,
        }
    }

    fn edge_list<'a>(&'a self, lists: &'a [Vec<usize>], id: &GraphId) -> &'a [usize] {
        self.index
            .get(id)
            .map(|&i| lists[i].as_slice())
            .unwrap_or(&[])
    }

    fn has_outgoing_idx(&self, idx: usize, kind: EdgeKind) -> bool {
        self.outgoing[idx]
            .iter()
            .any(|&e| self.edges[e].kind == kind)
    }
}
