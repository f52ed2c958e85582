//! Core domain types for the opsgraph knowledge graph.
//!
//! Two families live here: the *source records* handed over by the
//! source-of-truth store at sync time, and the *graph nodes* derived from
//! them. Every node carries a deterministic [`GraphId`] built from its label
//! and natural key.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Source Records ────────────────────────────────────────────────

/// An organizational unit as delivered by the source adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRecord {
    pub id: String,
    pub name: String,
    pub headcount: u32,
    pub open_roles: u32,
    #[serde(default)]
    pub key_tools: Vec<String>,
}

/// A business workflow that is a candidate for automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub id: String,
    pub name: String,
    pub department: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub estimated_build_hours: u32,
    #[serde(default)]
    pub annual_cost_savings_usd: i64,
    #[serde(default)]
    pub current_tools: Vec<String>,
    #[serde(default)]
    pub jim_principles: Vec<String>,
}

/// A compliance control from the control catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
}

/// A guiding principle workflows can follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrincipleRecord {
    pub id: String,
    pub name: String,
}

/// The external control framework controls are mapped into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkRecord {
    pub id: String,
    pub name: String,
    pub scope: String,
}

/// An AI automation project tracked through its governance lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: i64,
    pub workflow_id: String,
    pub name: String,
    pub department: String,
    pub status: String,
    pub risk_level: String,
    #[serde(default)]
    pub risk_score: f64,
    #[serde(default)]
    pub benefit_score: f64,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub controls: Vec<String>,
}

/// One entry of a project's governance audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub project_id: i64,
    pub event_type: String,
    #[serde(default)]
    pub from_status: Option<String>,
    #[serde(default)]
    pub to_status: Option<String>,
    pub actor: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A pre-computed workflow score, keyed by workflow id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: String,
    pub composite: f64,
    pub revenue_impact: f64,
    pub headcount_pressure: f64,
    pub implementation_complexity: f64,
    pub self_service_potential: f64,
    pub rank: u32,
}

// ── Identity ──────────────────────────────────────────────────────

/// Node kind tag. Serializes to the graph label, e.g. `"AIProject"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeLabel {
    Department,
    Tool,
    Workflow,
    WorkflowScore,
    #[serde(rename = "AIProject")]
    AiProject,
    Control,
    Principle,
    ControlFramework,
    #[serde(rename = "AIMSEvent")]
    AimsEvent,
}

impl NodeLabel {
    /// Every label, in full-sync creation order.
    pub const ALL: [NodeLabel; 9] = [
        NodeLabel::Department,
        NodeLabel::Tool,
        NodeLabel::Workflow,
        NodeLabel::WorkflowScore,
        NodeLabel::AiProject,
        NodeLabel::Control,
        NodeLabel::Principle,
        NodeLabel::ControlFramework,
        NodeLabel::AimsEvent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::Department => "Department",
            NodeLabel::Tool => "Tool",
            NodeLabel::Workflow => "Workflow",
            NodeLabel::WorkflowScore => "WorkflowScore",
            NodeLabel::AiProject => "AIProject",
            NodeLabel::Control => "Control",
            NodeLabel::Principle => "Principle",
            NodeLabel::ControlFramework => "ControlFramework",
            NodeLabel::AimsEvent => "AIMSEvent",
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Globally unique node identity: `"{Label}-{natural_key}"`.
///
/// Deterministic, so re-syncing the same source record always lands on the
/// same node and no ID-translation table is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphId(String);

impl GraphId {
    pub fn new(label: NodeLabel, key: impl fmt::Display) -> Self {
        Self(format!("{}-{}", label.as_str(), key))
    }

    pub fn department(dept_id: &str) -> Self {
        Self::new(NodeLabel::Department, dept_id)
    }

    pub fn tool(name: &str) -> Self {
        Self::new(NodeLabel::Tool, name)
    }

    pub fn workflow(wf_id: &str) -> Self {
        Self::new(NodeLabel::Workflow, wf_id)
    }

    pub fn workflow_score(wf_id: &str) -> Self {
        Self::new(NodeLabel::WorkflowScore, wf_id)
    }

    pub fn project(project_id: i64) -> Self {
        Self::new(NodeLabel::AiProject, project_id)
    }

    pub fn control(control_id: &str) -> Self {
        Self::new(NodeLabel::Control, control_id)
    }

    pub fn principle(principle_id: &str) -> Self {
        Self::new(NodeLabel::Principle, principle_id)
    }

    pub fn framework(framework_id: &str) -> Self {
        Self::new(NodeLabel::ControlFramework, framework_id)
    }

    pub fn event(event_id: i64) -> Self {
        Self::new(NodeLabel::AimsEvent, event_id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Node Types ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub dept_id: String,
    pub name: String,
    pub headcount: u32,
    pub open_roles: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub wf_id: String,
    pub name: String,
    pub department: String,
    pub description: String,
    pub frequency: String,
    pub estimated_build_hours: u32,
    pub annual_cost_savings_usd: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowScore {
    pub wf_id: String,
    pub composite: f64,
    pub revenue_impact: f64,
    pub headcount_pressure: f64,
    pub implementation_complexity: f64,
    pub self_service_potential: f64,
    pub rank: u32,
}

/// An AI project node. The lifecycle fields are the only mutable state in
/// the graph between rebuilds (see [`ProjectUpdate`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiProject {
    pub project_id: i64,
    pub workflow_id: String,
    pub name: String,
    pub department: String,
    pub status: String,
    pub risk_level: String,
    pub risk_score: f64,
    pub benefit_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub control_id: String,
    pub name: String,
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principle {
    pub principle_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlFramework {
    pub framework_id: String,
    pub name: String,
    pub scope: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AimsEvent {
    pub event_id: i64,
    pub project_id: i64,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_status: Option<String>,
    pub actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Enum wrapper for all node kinds in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "label")]
pub enum Node {
    Department(Department),
    Tool(Tool),
    Workflow(Workflow),
    WorkflowScore(WorkflowScore),
    #[serde(rename = "AIProject")]
    AiProject(AiProject),
    Control(Control),
    Principle(Principle),
    ControlFramework(ControlFramework),
    #[serde(rename = "AIMSEvent")]
    AimsEvent(AimsEvent),
}

impl Node {
    pub fn label(&self) -> NodeLabel {
        match self {
            Node::Department(_) => NodeLabel::Department,
            Node::Tool(_) => NodeLabel::Tool,
            Node::Workflow(_) => NodeLabel::Workflow,
            Node::WorkflowScore(_) => NodeLabel::WorkflowScore,
            Node::AiProject(_) => NodeLabel::AiProject,
            Node::Control(_) => NodeLabel::Control,
            Node::Principle(_) => NodeLabel::Principle,
            Node::ControlFramework(_) => NodeLabel::ControlFramework,
            Node::AimsEvent(_) => NodeLabel::AimsEvent,
        }
    }

    /// Derive the node's identity from its label and natural key.
    pub fn graph_id(&self) -> GraphId {
        match self {
            Node::Department(n) => GraphId::department(&n.dept_id),
            Node::Tool(n) => GraphId::tool(&n.name),
            Node::Workflow(n) => GraphId::workflow(&n.wf_id),
            Node::WorkflowScore(n) => GraphId::workflow_score(&n.wf_id),
            Node::AiProject(n) => GraphId::project(n.project_id),
            Node::Control(n) => GraphId::control(&n.control_id),
            Node::Principle(n) => GraphId::principle(&n.principle_id),
            Node::ControlFramework(n) => GraphId::framework(&n.framework_id),
            Node::AimsEvent(n) => GraphId::event(n.event_id),
        }
    }

    /// Display name, if the kind has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Department(n) => Some(&n.name),
            Node::Tool(n) => Some(&n.name),
            Node::Workflow(n) => Some(&n.name),
            Node::AiProject(n) => Some(&n.name),
            Node::Control(n) => Some(&n.name),
            Node::Principle(n) => Some(&n.name),
            Node::ControlFramework(n) => Some(&n.name),
            Node::WorkflowScore(_) | Node::AimsEvent(_) => None,
        }
    }

    /// Flat property map of the node, including its `graph_id`.
    pub fn properties(&self) -> serde_json::Map<String, serde_json::Value> {
        let value = match self {
            Node::Department(n) => serde_json::to_value(n),
            Node::Tool(n) => serde_json::to_value(n),
            Node::Workflow(n) => serde_json::to_value(n),
            Node::WorkflowScore(n) => serde_json::to_value(n),
            Node::AiProject(n) => serde_json::to_value(n),
            Node::Control(n) => serde_json::to_value(n),
            Node::Principle(n) => serde_json::to_value(n),
            Node::ControlFramework(n) => serde_json::to_value(n),
            Node::AimsEvent(n) => serde_json::to_value(n),
        };
        let mut props = match value {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        props.insert(
            "graph_id".to_string(),
            serde_json::Value::String(self.graph_id().to_string()),
        );
        props
    }

    pub fn as_project(&self) -> Option<&AiProject> {
        match self {
            Node::AiProject(p) => Some(p),
            _ => None,
        }
    }
}

/// The mutable lifecycle fields of an [`AiProject`], refreshed by
/// incremental sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    pub status: String,
    pub risk_level: String,
    pub risk_score: f64,
    pub benefit_score: f64,
    pub owner: Option<String>,
}

impl ProjectUpdate {
    pub fn apply_to(&self, project: &mut AiProject) {
        project.status = self.status.clone();
        project.risk_level = self.risk_level.clone();
        project.risk_score = self.risk_score;
        project.benefit_score = self.benefit_score;
        project.owner = self.owner.clone();
    }
}

// ── Record → Node ─────────────────────────────────────────────────

impl From<&DepartmentRecord> for Department {
    fn from(r: &DepartmentRecord) -> Self {
        Self {
            dept_id: r.id.clone(),
            name: r.name.clone(),
            headcount: r.headcount,
            open_roles: r.open_roles,
        }
    }
}

impl From<&WorkflowRecord> for Workflow {
    fn from(r: &WorkflowRecord) -> Self {
        Self {
            wf_id: r.id.clone(),
            name: r.name.clone(),
            department: r.department.clone(),
            description: r.description.clone(),
            frequency: r.frequency.clone(),
            estimated_build_hours: r.estimated_build_hours,
            annual_cost_savings_usd: r.annual_cost_savings_usd,
        }
    }
}

impl From<&ScoreRecord> for WorkflowScore {
    fn from(r: &ScoreRecord) -> Self {
        Self {
            wf_id: r.id.clone(),
            composite: r.composite,
            revenue_impact: r.revenue_impact,
            headcount_pressure: r.headcount_pressure,
            implementation_complexity: r.implementation_complexity,
            self_service_potential: r.self_service_potential,
            rank: r.rank,
        }
    }
}

impl From<&ProjectRecord> for AiProject {
    fn from(r: &ProjectRecord) -> Self {
        Self {
            project_id: r.id,
            workflow_id: r.workflow_id.clone(),
            name: r.name.clone(),
            department: r.department.clone(),
            status: r.status.clone(),
            risk_level: r.risk_level.clone(),
            risk_score: r.risk_score,
            benefit_score: r.benefit_score,
            owner: r.owner.clone(),
        }
    }
}

impl From<&ProjectRecord> for ProjectUpdate {
    fn from(r: &ProjectRecord) -> Self {
        Self {
            status: r.status.clone(),
            risk_level: r.risk_level.clone(),
            risk_score: r.risk_score,
            benefit_score: r.benefit_score,
            owner: r.owner.clone(),
        }
    }
}

impl From<&ControlRecord> for Control {
    fn from(r: &ControlRecord) -> Self {
        Self {
            control_id: r.id.clone(),
            name: r.name.clone(),
            category: r.category.clone(),
            description: r.description.clone(),
        }
    }
}

impl From<&PrincipleRecord> for Principle {
    fn from(r: &PrincipleRecord) -> Self {
        Self {
            principle_id: r.id.clone(),
            name: r.name.clone(),
        }
    }
}

impl From<&FrameworkRecord> for ControlFramework {
    fn from(r: &FrameworkRecord) -> Self {
        Self {
            framework_id: r.id.clone(),
            name: r.name.clone(),
            scope: r.scope.clone(),
        }
    }
}

impl From<&EventRecord> for AimsEvent {
    fn from(r: &EventRecord) -> Self {
        Self {
            event_id: r.id,
            project_id: r.project_id,
            event_type: r.event_type.clone(),
            from_status: r.from_status.clone(),
            to_status: r.to_status.clone(),
            actor: r.actor.clone(),
            detail: r.detail.clone(),
            timestamp: r.timestamp,
        }
    }
}

// ── Edge Types ────────────────────────────────────────────────────

/// The type of a directed relationship between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    HasWorkflow,
    UsesTool,
    FollowsPrinciple,
    HasScore,
    BecameProject,
    BelongsTo,
    GovernedBy,
    PartOf,
    HasEvent,
}

impl EdgeKind {
    /// Every edge kind, in full-sync creation order.
    pub const ALL: [EdgeKind; 9] = [
        EdgeKind::HasWorkflow,
        EdgeKind::UsesTool,
        EdgeKind::FollowsPrinciple,
        EdgeKind::HasScore,
        EdgeKind::BecameProject,
        EdgeKind::BelongsTo,
        EdgeKind::GovernedBy,
        EdgeKind::PartOf,
        EdgeKind::HasEvent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::HasWorkflow => "HAS_WORKFLOW",
            EdgeKind::UsesTool => "USES_TOOL",
            EdgeKind::FollowsPrinciple => "FOLLOWS_PRINCIPLE",
            EdgeKind::HasScore => "HAS_SCORE",
            EdgeKind::BecameProject => "BECAME_PROJECT",
            EdgeKind::BelongsTo => "BELONGS_TO",
            EdgeKind::GovernedBy => "GOVERNED_BY",
            EdgeKind::PartOf => "PART_OF",
            EdgeKind::HasEvent => "HAS_EVENT",
        }
    }

    /// Allowed `(source, target)` label pairs.
    pub fn endpoints(&self) -> &'static [(NodeLabel, NodeLabel)] {
        use NodeLabel::*;
        match self {
            EdgeKind::HasWorkflow => &[(Department, Workflow)],
            EdgeKind::UsesTool => &[(Department, Tool), (Workflow, Tool)],
            EdgeKind::FollowsPrinciple => &[(Workflow, Principle)],
            EdgeKind::HasScore => &[(Workflow, WorkflowScore)],
            EdgeKind::BecameProject => &[(Workflow, AiProject)],
            EdgeKind::BelongsTo => &[(AiProject, Department)],
            EdgeKind::GovernedBy => &[(AiProject, Control)],
            EdgeKind::PartOf => &[(Control, ControlFramework)],
            EdgeKind::HasEvent => &[(AiProject, AimsEvent)],
        }
    }

    pub fn allows(&self, source: NodeLabel, target: NodeLabel) -> bool {
        self.endpoints().contains(&(source, target))
    }

    /// Kinds limited to one outgoing edge per source node.
    pub fn is_single_outgoing(&self) -> bool {
        matches!(self, EdgeKind::HasScore | EdgeKind::BecameProject)
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> AiProject {
        AiProject {
            project_id: 7,
            workflow_id: "wf-001".to_string(),
            name: "Deal desk copilot".to_string(),
            department: "sales".to_string(),
            status: "proposed".to_string(),
            risk_level: "medium".to_string(),
            risk_score: 4.5,
            benefit_score: 7.25,
            owner: None,
        }
    }

    #[test]
    fn graph_id_concatenates_label_and_key() {
        assert_eq!(GraphId::department("sales").as_str(), "Department-sales");
        assert_eq!(GraphId::project(42).as_str(), "AIProject-42");
        assert_eq!(GraphId::event(3).as_str(), "AIMSEvent-3");
        assert_eq!(
            GraphId::framework("iso-42001").as_str(),
            "ControlFramework-iso-42001"
        );
    }

    #[test]
    fn node_graph_id_matches_helpers() {
        let node = Node::AiProject(project());
        assert_eq!(node.graph_id(), GraphId::project(7));
        assert_eq!(node.label(), NodeLabel::AiProject);
    }

    #[test]
    fn label_serializes_as_graph_label() {
        let json = serde_json::to_string(&NodeLabel::AiProject).unwrap();
        assert_eq!(json, "\"AIProject\"");
        let json = serde_json::to_string(&NodeLabel::AimsEvent).unwrap();
        assert_eq!(json, "\"AIMSEvent\"");
    }

    #[test]
    fn edge_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&EdgeKind::BecameProject).unwrap();
        assert_eq!(json, "\"BECAME_PROJECT\"");
        assert_eq!(EdgeKind::FollowsPrinciple.to_string(), "FOLLOWS_PRINCIPLE");
    }

    #[test]
    fn properties_include_graph_id_and_skip_missing_owner() {
        let props = Node::AiProject(project()).properties();
        assert_eq!(props["graph_id"], "AIProject-7");
        assert_eq!(props["risk_score"], 4.5);
        assert!(!props.contains_key("owner"));
    }

    #[test]
    fn nameless_kinds_have_no_name() {
        let score = Node::WorkflowScore(WorkflowScore {
            wf_id: "wf-001".to_string(),
            composite: 8.2,
            revenue_impact: 9.0,
            headcount_pressure: 6.0,
            implementation_complexity: 7.0,
            self_service_potential: 8.0,
            rank: 1,
        });
        assert_eq!(score.name(), None);
        assert_eq!(Node::AiProject(project()).name(), Some("Deal desk copilot"));
    }

    #[test]
    fn edge_endpoints_are_enforced_by_kind() {
        assert!(EdgeKind::UsesTool.allows(NodeLabel::Department, NodeLabel::Tool));
        assert!(EdgeKind::UsesTool.allows(NodeLabel::Workflow, NodeLabel::Tool));
        assert!(!EdgeKind::UsesTool.allows(NodeLabel::AiProject, NodeLabel::Tool));
        assert!(EdgeKind::HasScore.is_single_outgoing());
        assert!(!EdgeKind::GovernedBy.is_single_outgoing());
    }

    #[test]
    fn project_update_overwrites_lifecycle_fields() {
        let mut p = project();
        let update = ProjectUpdate {
            status: "approved".to_string(),
            risk_level: "high".to_string(),
            risk_score: 8.0,
            benefit_score: 6.0,
            owner: Some("jdoe".to_string()),
        };
        update.apply_to(&mut p);
        assert_eq!(p.status, "approved");
        assert_eq!(p.owner.as_deref(), Some("jdoe"));
        assert_eq!(p.name, "Deal desk copilot");
    }

    #[test]
    fn event_record_deserializes_with_optional_fields() {
        let json = r#"{"id": 1, "project_id": 2, "event_type": "status_change",
                       "actor": "system", "timestamp": "2025-03-01T10:00:00Z"}"#;
        let rec: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.from_status, None);
        assert!(rec.timestamp.is_some());
    }
}
