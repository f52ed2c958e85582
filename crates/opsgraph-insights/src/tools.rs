//! Tool-centric insights: sprawl, cascade risk, and ungoverned exposure.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use opsgraph_core::{EdgeKind, GraphId, NodeLabel};
use opsgraph_graph::{GraphStore, NodeRef};
use serde::{Deserialize, Serialize};

use crate::display_name;

/// Risk levels counted as high for cascade risk.
const HIGH_RISK_LEVELS: &[&str] = &["high", "critical"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSprawl {
    pub tool: String,
    pub workflow_count: usize,
    pub department_count: usize,
    pub departments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCascadeRisk {
    pub tool: String,
    pub project_count: usize,
    pub department_count: usize,
    pub high_risk_count: usize,
    pub departments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRisk {
    pub name: String,
    pub risk_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnprotectedTool {
    pub tool: String,
    pub ungoverned_count: usize,
    pub projects: Vec<ProjectRisk>,
}

/// Workflows using `tool`. Departments also hold `USES_TOOL` edges; those
/// are not workflows and are excluded.
fn workflows_using<'a>(store: &'a GraphStore, tool: &GraphId) -> Vec<NodeRef<'a>> {
    store
        .incoming(tool, EdgeKind::UsesTool)
        .filter(|n| n.node.label() == NodeLabel::Workflow)
        .collect()
}

/// Projects converted from workflows that use `tool`, deduplicated.
fn projects_using<'a>(store: &'a GraphStore, tool: &GraphId) -> Vec<NodeRef<'a>> {
    let mut seen = HashSet::new();
    workflows_using(store, tool)
        .into_iter()
        .flat_map(|wf| store.outgoing(wf.id, EdgeKind::BecameProject))
        .filter(|p| seen.insert(p.id))
        .collect()
}

/// Tools shared across the most departments and workflows.
pub fn tool_sprawl(store: &GraphStore) -> Vec<ToolSprawl> {
    let mut sprawl = Vec::new();
    for tool in store.nodes_with_label(NodeLabel::Tool) {
        let workflows = workflows_using(store, tool.id);
        if workflows.is_empty() {
            continue;
        }
        let departments: BTreeMap<&GraphId, String> = workflows
            .iter()
            .flat_map(|wf| store.incoming(wf.id, EdgeKind::HasWorkflow))
            .map(|d| (d.id, display_name(d)))
            .collect();

        sprawl.push(ToolSprawl {
            tool: display_name(tool),
            workflow_count: workflows.len(),
            department_count: departments.len(),
            departments: sorted(departments.into_values()),
        });
    }

    sprawl.sort_by(|a, b| {
        b.department_count
            .cmp(&a.department_count)
            .then(b.workflow_count.cmp(&a.workflow_count))
            .then_with(|| a.tool.cmp(&b.tool))
    });
    sprawl
}

/// Tools whose failure would reach the most risky projects across
/// departments.
pub fn tool_cascade_risk(store: &GraphStore) -> Vec<ToolCascadeRisk> {
    let mut cascade = Vec::new();
    for tool in store.nodes_with_label(NodeLabel::Tool) {
        let mut projects = 0;
        let mut high_risk = 0;
        let mut departments: BTreeMap<&GraphId, String> = BTreeMap::new();

        for project in projects_using(store, tool.id) {
            let depts: Vec<_> = store.outgoing(project.id, EdgeKind::BelongsTo).collect();
            if depts.is_empty() {
                continue;
            }
            projects += 1;
            if project
                .node
                .as_project()
                .is_some_and(|p| HIGH_RISK_LEVELS.contains(&p.risk_level.as_str()))
            {
                high_risk += 1;
            }
            for d in depts {
                departments.insert(d.id, display_name(d));
            }
        }
        if projects == 0 {
            continue;
        }

        cascade.push(ToolCascadeRisk {
            tool: display_name(tool),
            project_count: projects,
            department_count: departments.len(),
            high_risk_count: high_risk,
            departments: sorted(departments.into_values()),
        });
    }

    cascade.sort_by(|a, b| {
        b.high_risk_count
            .cmp(&a.high_risk_count)
            .then(b.department_count.cmp(&a.department_count))
            .then_with(|| a.tool.cmp(&b.tool))
    });
    cascade
}

/// Tools feeding projects that have no governing control at all.
pub fn unprotected_tools(store: &GraphStore) -> Vec<UnprotectedTool> {
    let mut unprotected = Vec::new();
    for tool in store.nodes_with_label(NodeLabel::Tool) {
        let mut projects: Vec<ProjectRisk> = projects_using(store, tool.id)
            .into_iter()
            .filter(|p| !store.has_outgoing(p.id, EdgeKind::GovernedBy))
            .filter_map(|p| {
                p.node.as_project().map(|proj| ProjectRisk {
                    name: proj.name.clone(),
                    risk_level: proj.risk_level.clone(),
                })
            })
            .collect();
        if projects.is_empty() {
            continue;
        }
        projects.sort_by(|a, b| a.name.cmp(&b.name));

        unprotected.push(UnprotectedTool {
            tool: display_name(tool),
            ungoverned_count: projects.len(),
            projects,
        });
    }

    unprotected.sort_by(|a, b| {
        b.ungoverned_count
            .cmp(&a.ungoverned_count)
            .then_with(|| a.tool.cmp(&b.tool))
    });
    unprotected
}

fn sorted(names: impl Iterator<Item = String>) -> Vec<String> {
    names.collect::<BTreeSet<_>>().into_iter().collect()
}
