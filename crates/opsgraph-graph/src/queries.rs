//! Structural read operations: whole-graph export, bounded-hop subgraphs,
//! project lineage, and summary counts.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use opsgraph_core::{EdgeKind, GraphId, NodeLabel};
use serde::{Deserialize, Serialize};

use crate::store::GraphStore;

/// Hop limit for department neighborhoods.
pub const DEPARTMENT_SUBGRAPH_HOPS: usize = 3;

/// A node as handed to visualization clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub label: NodeLabel,
    pub name: String,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// A directed link between two returned nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkRecord {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

/// Result of a structural query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<LinkRecord>,
}

impl GraphView {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

/// Node and relationship counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: BTreeMap<NodeLabel, usize>,
    pub relationships: BTreeMap<EdgeKind, usize>,
    pub total_nodes: usize,
    pub total_relationships: usize,
}

impl GraphStore {
    // ── Export ───────────────────────────────────────────────────

    /// Every node and every directed edge.
    pub fn full_graph(&self) -> GraphView {
        GraphView {
            nodes: (0..self.nodes.len()).map(|i| self.node_record(i)).collect(),
            links: self.edges.iter().map(|e| self.link_record(e.from, e.to, e.kind)).collect(),
        }
    }

    // ── Neighborhoods ────────────────────────────────────────────

    /// The neighborhood of a department, at most three undirected hops out.
    pub fn department_subgraph(&self, dept_id: &str) -> GraphView {
        self.subgraph_within(&GraphId::department(dept_id), DEPARTMENT_SUBGRAPH_HOPS)
    }

    /// Every node within `max_hops` undirected hops of `anchor` (the anchor
    /// included), plus the edges whose endpoints are both in that set.
    /// An unknown anchor yields an empty view.
    pub fn subgraph_within(&self, anchor: &GraphId, max_hops: usize) -> GraphView {
        let Some(&start) = self.index.get(anchor) else {
            return GraphView::default();
        };

        let mut visited = HashSet::new();
        visited.insert(start);
        let mut order = vec![start];

        // BFS queue: (node_index, hops)
        let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
        queue.push_back((start, 0));

        while let Some((node, hops)) = queue.pop_front() {
            if hops >= max_hops {
                continue;
            }
            for next in self.neighbor_indices(node) {
                if visited.insert(next) {
                    order.push(next);
                    queue.push_back((next, hops + 1));
                }
            }
        }

        let links = order
            .iter()
            .flat_map(|&i| self.outgoing[i].iter().map(|&e| &self.edges[e]))
            .filter(|e| visited.contains(&e.to))
            .map(|e| self.link_record(e.from, e.to, e.kind))
            .collect();

        GraphView {
            nodes: order.into_iter().map(|i| self.node_record(i)).collect(),
            links,
        }
    }

    // ── Lineage ──────────────────────────────────────────────────

    /// The compliance lineage of one project: its department, originating
    /// workflow, controls and their framework, plus the workflow's score and
    /// principles. Absent relations drop their branch.
    pub fn project_lineage(&self, project_id: i64) -> GraphView {
        let Some(&p) = self.index.get(&GraphId::project(project_id)) else {
            return GraphView::default();
        };

        let depts = self.targets(p, EdgeKind::BelongsTo);
        let workflows = self.sources(p, EdgeKind::BecameProject);
        let controls = self.targets(p, EdgeKind::GovernedBy);

        let mut lineage = Lineage::default();
        lineage.node(p);
        for &d in &depts {
            lineage.node(d);
            lineage.link(p, d, EdgeKind::BelongsTo);
        }
        for &w in &workflows {
            lineage.node(w);
            lineage.link(w, p, EdgeKind::BecameProject);
            for &d in &depts {
                if self.has_edge_idx(d, w, EdgeKind::HasWorkflow) {
                    lineage.link(d, w, EdgeKind::HasWorkflow);
                }
            }
        }
        for &c in &controls {
            lineage.node(c);
            lineage.link(p, c, EdgeKind::GovernedBy);
        }
        for &c in &controls {
            for f in self.targets(c, EdgeKind::PartOf) {
                lineage.node(f);
                lineage.link(c, f, EdgeKind::PartOf);
            }
        }
        for &w in &workflows {
            for s in self.targets(w, EdgeKind::HasScore) {
                lineage.node(s);
                lineage.link(w, s, EdgeKind::HasScore);
            }
        }
        for &w in &workflows {
            for pr in self.targets(w, EdgeKind::FollowsPrinciple) {
                lineage.node(pr);
                lineage.link(w, pr, EdgeKind::FollowsPrinciple);
            }
        }

        GraphView {
            nodes: lineage.nodes.into_iter().map(|i| self.node_record(i)).collect(),
            links: lineage
                .links
                .into_iter()
                .map(|(from, to, kind)| self.link_record(from, to, kind))
                .collect(),
        }
    }

    // ── Stats ────────────────────────────────────────────────────

    /// Node counts by label and edge counts by type, with grand totals.
    pub fn stats(&self) -> GraphStats {
        let mut nodes = BTreeMap::new();
        for node in &self.nodes {
            *nodes.entry(node.label()).or_insert(0) += 1;
        }
        let mut relationships: HashMap<EdgeKind, usize> = HashMap::new();
        for edge in &self.edges {
            *relationships.entry(edge.kind).or_insert(0) += 1;
        }

        GraphStats {
            total_nodes: nodes.values().sum(),
            total_relationships: relationships.values().sum(),
            nodes,
            relationships: relationships.into_iter().collect(),
        }
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn targets(&self, idx: usize, kind: EdgeKind) -> Vec<usize> {
        self.outgoing[idx]
            .iter()
            .map(|&e| &self.edges[e])
            .filter(|e| e.kind == kind)
            .map(|e| e.to)
            .collect()
    }

    fn sources(&self, idx: usize, kind: EdgeKind) -> Vec<usize> {
        self.incoming[idx]
            .iter()
            .map(|&e| &self.edges[e])
            .filter(|e| e.kind == kind)
            .map(|e| e.from)
            .collect()
    }

    fn has_edge_idx(&self, from: usize, to: usize, kind: EdgeKind) -> bool {
        self.outgoing[from]
            .iter()
            .any(|&e| self.edges[e].to == to && self.edges[e].kind == kind)
    }

    fn node_record(&self, idx: usize) -> NodeRecord {
        let node = &self.nodes[idx];
        let id = self.ids[idx].to_string();
        NodeRecord {
            name: node.name().map(str::to_string).unwrap_or_else(|| id.clone()),
            label: node.label(),
            properties: node.properties(),
            id,
        }
    }

    fn link_record(&self, from: usize, to: usize, kind: EdgeKind) -> LinkRecord {
        LinkRecord {
            source: self.ids[from].to_string(),
            target: self.ids[to].to_string(),
            kind,
        }
    }
}

/// Accumulates lineage nodes and links, deduplicated, in discovery order.
#[derive(Default)]
struct Lineage {
    seen_nodes: HashSet<usize>,
    nodes: Vec<usize>,
    seen_links: HashSet<(usize, usize, EdgeKind)>,
    links: Vec<(usize, usize, EdgeKind)>,
}

impl Lineage {
    fn node(&mut self, idx: usize) {
        if self.seen_nodes.insert(idx) {
            self.nodes.push(idx);
        }
    }

    fn link(&mut self, from: usize, to: usize, kind: EdgeKind) {
        if self.seen_links.insert((from, to, kind)) {
            self.links.push((from, to, kind));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::*;

    /// sales: wf-1 (Salesforce, scored) → proj 1, governed by A.6.2.2 (mapped)
    /// and A.10.4 (unmapped). ops: wf-2 → proj 2, ungoverned.
    fn build_graph() -> GraphStore {
        let mut g = GraphStore::new();
        for node in [
            department("sales", "Sales"),
            department("ops", "Operations"),
            tool("Salesforce"),
            workflow("wf-1", "sales"),
            workflow("wf-2", "ops"),
            score("wf-1"),
            project(1, "wf-1", "sales", "high"),
            project(2, "wf-2", "ops", "low"),
            control("A.6.2.2"),
            control("A.10.4"),
            framework(),
        ] {
            g.create_node(node).unwrap();
        }

        let edges = [
            (GraphId::department("sales"), GraphId::workflow("wf-1"), EdgeKind::HasWorkflow),
            (GraphId::department("ops"), GraphId::workflow("wf-2"), EdgeKind::HasWorkflow),
            (GraphId::department("sales"), GraphId::tool("Salesforce"), EdgeKind::UsesTool),
            (GraphId::workflow("wf-1"), GraphId::tool("Salesforce"), EdgeKind::UsesTool),
            (GraphId::workflow("wf-1"), GraphId::workflow_score("wf-1"), EdgeKind::HasScore),
            (GraphId::workflow("wf-1"), GraphId::project(1), EdgeKind::BecameProject),
            (GraphId::workflow("wf-2"), GraphId::project(2), EdgeKind::BecameProject),
            (GraphId::project(1), GraphId::department("sales"), EdgeKind::BelongsTo),
            (GraphId::project(2), GraphId::department("ops"), EdgeKind::BelongsTo),
            (GraphId::project(1), GraphId::control("A.6.2.2"), EdgeKind::GovernedBy),
            (GraphId::project(1), GraphId::control("A.10.4"), EdgeKind::GovernedBy),
            (GraphId::control("A.6.2.2"), GraphId::framework("iso-42001"), EdgeKind::PartOf),
        ];
        for (from, to, kind) in &edges {
            g.create_edge(from, to, *kind).unwrap();
        }
        g
    }

    fn ids(view: &GraphView) -> HashSet<String> {
        view.nodes.iter().map(|n| n.id.clone()).collect()
    }

    fn assert_links_unique(view: &GraphView) {
        let unique: HashSet<_> = view.links.iter().collect();
        assert_eq!(unique.len(), view.links.len());
    }

    #[test]
    fn test_full_graph_exports_everything() {
        let g = build_graph();
        let view = g.full_graph();
        assert_eq!(view.nodes.len(), 11);
        assert_eq!(view.links.len(), 12);
        assert_links_unique(&view);

        let node_ids = ids(&view);
        for link in &view.links {
            assert!(node_ids.contains(&link.source));
            assert!(node_ids.contains(&link.target));
        }
    }

    #[test]
    fn test_nameless_node_falls_back_to_graph_id() {
        let g = build_graph();
        let view = g.full_graph();
        let score = view
            .nodes
            .iter()
            .find(|n| n.label == NodeLabel::WorkflowScore)
            .unwrap();
        assert_eq!(score.name, "WorkflowScore-wf-1");
        assert_eq!(score.properties["composite"], 8.2);
    }

    #[test]
    fn test_link_serializes_type_field() {
        let link = LinkRecord {
            source: "a".to_string(),
            target: "b".to_string(),
            kind: EdgeKind::PartOf,
        };
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["type"], "PART_OF");
    }

    #[test]
    fn test_department_subgraph_is_bounded() {
        let g = build_graph();
        let view = g.department_subgraph("sales");
        let found = ids(&view);

        // Three hops from sales: wf-1/Salesforce/proj-1 (1), score/controls (2),
        // framework (3). Ops shares no node with sales.
        assert!(found.contains("Department-sales"));
        assert!(found.contains("WorkflowScore-wf-1"));
        assert!(found.contains("Control-A.10.4"));
        assert!(found.contains("ControlFramework-iso-42001"));
        assert!(!found.contains("Department-ops"));
        assert!(!found.contains("AIProject-2"));

        for link in &view.links {
            assert!(found.contains(&link.source) && found.contains(&link.target));
        }
        assert_links_unique(&view);
    }

    #[test]
    fn test_subgraph_hop_limit() {
        let g = build_graph();
        let one_hop = g.subgraph_within(&GraphId::department("sales"), 1);
        let found = ids(&one_hop);
        assert_eq!(found.len(), 4); // sales, wf-1, Salesforce, proj-1
        assert!(!found.contains("WorkflowScore-wf-1"));
    }

    #[test]
    fn test_unknown_anchors_return_empty() {
        let g = build_graph();
        assert!(g.department_subgraph("does-not-exist").is_empty());
        assert!(g.project_lineage(999_999).is_empty());
    }

    #[test]
    fn test_project_lineage_shape() {
        let g = build_graph();
        let view = g.project_lineage(1);
        let found = ids(&view);
        assert_eq!(found.len(), 7);
        assert!(found.contains("Control-A.10.4"));
        assert!(!found.contains("Tool-Salesforce"));

        let kinds: Vec<_> = view.links.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds.iter().filter(|k| **k == EdgeKind::GovernedBy).count(),
            2
        );
        assert_eq!(kinds.iter().filter(|k| **k == EdgeKind::PartOf).count(), 1);
        assert!(kinds.contains(&EdgeKind::HasWorkflow));
        assert_links_unique(&view);
    }

    #[test]
    fn test_lineage_without_workflow_omits_branch() {
        let mut g = build_graph();
        g.create_node(project(3, "wf-unknown", "ops", "medium")).unwrap();
        g.create_edge(
            &GraphId::project(3),
            &GraphId::department("ops"),
            EdgeKind::BelongsTo,
        )
        .unwrap();

        let view = g.project_lineage(3);
        assert_eq!(view.nodes.len(), 2);
        assert_eq!(view.links.len(), 1);
        assert_eq!(view.links[0].kind, EdgeKind::BelongsTo);
    }

    #[test]
    fn test_stats_totals_match() {
        let g = build_graph();
        let stats = g.stats();
        assert_eq!(stats.total_nodes, stats.nodes.values().sum::<usize>());
        assert_eq!(
            stats.total_relationships,
            stats.relationships.values().sum::<usize>()
        );
        assert_eq!(stats.nodes[&NodeLabel::Department], 2);
        assert_eq!(stats.relationships[&EdgeKind::GovernedBy], 2);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["nodes"]["AIProject"], 2);
        assert_eq!(json["relationships"]["USES_TOOL"], 2);
    }

    #[test]
    fn test_empty_store_stats() {
        let stats = GraphStore::new().stats();
        assert_eq!(stats.total_nodes, 0);
        assert!(stats.relationships.is_empty());
    }
}
