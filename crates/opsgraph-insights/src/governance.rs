//! Governance and compliance insights.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use opsgraph_core::{EdgeKind, GraphId, NodeLabel};
use opsgraph_graph::{GraphStore, NodeRef};
use serde::{Deserialize, Serialize};

use crate::{display_name, percent};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GovernanceCoverage {
    pub total_projects: usize,
    pub governed_count: usize,
    pub coverage_pct: f64,
    pub ungoverned_projects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceChain {
    pub total_projects: usize,
    pub fully_linked: usize,
    pub completeness_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlHotspot {
    pub control_id: String,
    pub control: String,
    pub department_count: usize,
    pub project_count: usize,
    pub departments: Vec<String>,
}

/// Two departments coupled through shared controls. `department_a` is the
/// one with the lower graph id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoupledDepartments {
    pub department_a: String,
    pub department_b: String,
    pub shared_control_count: usize,
    pub shared_controls: Vec<String>,
}

/// Share of projects with at least one governing control.
pub fn governance_coverage(store: &GraphStore) -> GovernanceCoverage {
    let mut total = 0;
    let mut ungoverned = Vec::new();
    for project in store.nodes_with_label(NodeLabel::AiProject) {
        total += 1;
        if !store.has_outgoing(project.id, EdgeKind::GovernedBy) {
            ungoverned.push(display_name(project));
        }
    }
    ungoverned.sort();

    let governed = total - ungoverned.len();
    GovernanceCoverage {
        total_projects: total,
        governed_count: governed,
        coverage_pct: percent(governed, total),
        ungoverned_projects: ungoverned,
    }
}

/// Projects whose every control (at least one) maps into the framework.
pub fn compliance_chain(store: &GraphStore) -> ComplianceChain {
    let mut total = 0;
    let mut fully_linked = 0;
    for project in store.nodes_with_label(NodeLabel::AiProject) {
        total += 1;
        let mut controls = store.outgoing(project.id, EdgeKind::GovernedBy).peekable();
        let has_control = controls.peek().is_some();
        if has_control && controls.all(|c| store.has_outgoing(c.id, EdgeKind::PartOf)) {
            fully_linked += 1;
        }
    }

    ComplianceChain {
        total_projects: total,
        fully_linked,
        completeness_pct: percent(fully_linked, total),
    }
}

/// Controls spread across the most departments.
pub fn control_hotspots(store: &GraphStore) -> Vec<ControlHotspot> {
    let mut hotspots = Vec::new();
    for control in store.nodes_with_label(NodeLabel::Control) {
        let mut projects = HashSet::new();
        let mut departments = BTreeSet::new();
        for (project, dept) in governed_departments(store, control.id) {
            projects.insert(project);
            departments.insert(dept);
        }
        if departments.is_empty() {
            continue;
        }

        let department_count = departments.len();
        let departments: BTreeSet<String> = departments.into_iter().map(|(_, name)| name).collect();
        hotspots.push(ControlHotspot {
            control_id: control_key(control),
            control: display_name(control),
            department_count,
            project_count: projects.len(),
            departments: departments.into_iter().collect(),
        });
    }

    hotspots.sort_by(|a, b| {
        b.department_count
            .cmp(&a.department_count)
            .then(b.project_count.cmp(&a.project_count))
            .then_with(|| a.control.cmp(&b.control))
    });
    hotspots
}

/// Department pairs that share at least one control through two different
/// projects.
pub fn compliance_coupled(store: &GraphStore) -> Vec<CoupledDepartments> {
    // (lower dept, higher dept) → shared control names
    let mut pairs: BTreeMap<(DeptKey, DeptKey), BTreeSet<String>> = BTreeMap::new();

    for control in store.nodes_with_label(NodeLabel::Control) {
        let members = governed_departments(store, control.id);
        for (i, (p1, d1)) in members.iter().enumerate() {
            for (p2, d2) in &members[i + 1..] {
                if p1 == p2 || d1.0 == d2.0 {
                    continue;
                }
                let key = if d1.0 < d2.0 {
                    (d1.clone(), d2.clone())
                } else {
                    (d2.clone(), d1.clone())
                };
                pairs.entry(key).or_default().insert(display_name(control));
            }
        }
    }

    let mut coupled: Vec<CoupledDepartments> = pairs
        .into_iter()
        .map(|((a, b), controls)| CoupledDepartments {
            department_a: a.1,
            department_b: b.1,
            shared_control_count: controls.len(),
            shared_controls: controls.into_iter().collect(),
        })
        .collect();

    coupled.sort_by(|x, y| {
        y.shared_control_count
            .cmp(&x.shared_control_count)
            .then_with(|| x.department_a.cmp(&y.department_a))
            .then_with(|| x.department_b.cmp(&y.department_b))
    });
    coupled
}

/// A department's graph id and display name.
type DeptKey = (GraphId, String);

/// `(project, department)` pairs along `Control<-GOVERNED_BY-AIProject-BELONGS_TO->Department`.
fn governed_departments<'a>(
    store: &'a GraphStore,
    control: &GraphId,
) -> Vec<(&'a GraphId, DeptKey)> {
    let mut members = Vec::new();
    for project in store.incoming(control, EdgeKind::GovernedBy) {
        for dept in store.outgoing(project.id, EdgeKind::BelongsTo) {
            members.push((project.id, (dept.id.clone(), display_name(dept))));
        }
    }
    members
}

fn control_key(control: NodeRef<'_>) -> String {
    match control.node {
        opsgraph_core::Node::Control(c) => c.control_id.clone(),
        _ => control.id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::{build, control, department, portfolio, project};
    use opsgraph_sync::SourceSnapshot;

    #[test]
    fn test_governance_coverage() {
        let coverage = governance_coverage(&portfolio());
        assert_eq!(coverage.total_projects, 4);
        assert_eq!(coverage.governed_count, 3);
        assert_eq!(coverage.coverage_pct, 75.0);
        assert_eq!(coverage.ungoverned_projects, vec!["Invoice match".to_string()]);
    }

    #[test]
    fn test_coverage_six_of_ten() {
        let projects = (1..=10)
            .map(|i| {
                let controls: &[&str] = if i <= 6 { &["A.6.2.2"] } else { &[] };
                project(i, &format!("p{i:02}"), "", "sales", "low", 1.0, 1.0, "proposed", controls)
            })
            .collect();
        let store = build(SourceSnapshot {
            departments: vec![department("sales", "Sales", &[])],
            controls: vec![control("A.6.2.2", "AI risk assessment")],
            projects,
            ..Default::default()
        });

        let coverage = governance_coverage(&store);
        assert_eq!(coverage.coverage_pct, 60.0);
        assert_eq!(
            coverage.ungoverned_projects,
            vec!["p07", "p08", "p09", "p10"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_compliance_chain_excludes_unmapped_controls() {
        // Only project 1 has all of its controls mapped.
        let chain = compliance_chain(&portfolio());
        assert_eq!(chain.total_projects, 4);
        assert_eq!(chain.fully_linked, 1);
        assert_eq!(chain.completeness_pct, 25.0);
    }

    #[test]
    fn test_control_hotspots() {
        let hotspots = control_hotspots(&portfolio());
        assert_eq!(hotspots.len(), 2);
        assert_eq!(hotspots[0].control, "AI risk assessment");
        assert_eq!(hotspots[0].control_id, "A.6.2.2");
        assert_eq!(hotspots[0].department_count, 2);
        assert_eq!(hotspots[0].departments, vec!["Operations", "Sales"]);
        assert_eq!(hotspots[1].control, "Operational monitoring");
    }

    #[test]
    fn test_compliance_coupled_reports_each_pair_once() {
        let coupled = compliance_coupled(&portfolio());
        assert_eq!(coupled.len(), 1);
        let pair = &coupled[0];
        // Department-ops sorts before Department-sales.
        assert_eq!(pair.department_a, "Operations");
        assert_eq!(pair.department_b, "Sales");
        assert_eq!(pair.shared_control_count, 2);
        assert_eq!(
            pair.shared_controls,
            vec!["AI risk assessment", "Operational monitoring"]
        );
    }
}
