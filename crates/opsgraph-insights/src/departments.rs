//! Per-department insights: risk concentration and lifecycle pipeline.

use std::collections::BTreeMap;

use opsgraph_core::{EdgeKind, NodeLabel};
use opsgraph_graph::GraphStore;
use serde::{Deserialize, Serialize};

use crate::display_name;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskBucket {
    pub risk_level: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentRisk {
    pub department: String,
    pub total_projects: usize,
    pub high_risk_count: usize,
    pub breakdown: Vec<RiskBucket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCount {
    pub status: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentPipeline {
    pub department: String,
    pub stages: Vec<StageCount>,
}

/// Department name → (project field value → count), over `BELONGS_TO`.
fn group_projects_by_department(
    store: &GraphStore,
    field: impl Fn(&opsgraph_core::AiProject) -> &str,
) -> BTreeMap<String, BTreeMap<String, usize>> {
    let mut groups: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for project in store.nodes_with_label(NodeLabel::AiProject) {
        let Some(p) = project.node.as_project() else {
            continue;
        };
        for dept in store.outgoing(project.id, EdgeKind::BelongsTo) {
            *groups
                .entry(display_name(dept))
                .or_default()
                .entry(field(p).to_string())
                .or_insert(0) += 1;
        }
    }
    groups
}

/// Project counts per department, broken down by risk level, most
/// high-risk projects first.
pub fn department_risk(store: &GraphStore) -> Vec<DepartmentRisk> {
    let by_level = group_projects_by_department(store, |p| p.risk_level.as_str());
    let mut risks: Vec<DepartmentRisk> = by_level
        .into_iter()
        .map(|(department, levels)| DepartmentRisk {
            department,
            total_projects: levels.values().sum(),
            high_risk_count: levels.get("high").copied().unwrap_or(0),
            breakdown: levels
                .into_iter()
                .map(|(risk_level, count)| RiskBucket { risk_level, count })
                .collect(),
        })
        .collect();

    // Stable sort keeps name order among ties.
    risks.sort_by(|a, b| b.high_risk_count.cmp(&a.high_risk_count));
    risks
}

/// Project counts per department and status.
pub fn lifecycle_pipeline(store: &GraphStore) -> Vec<DepartmentPipeline> {
    group_projects_by_department(store, |p| p.status.as_str())
        .into_iter()
        .map(|(department, statuses)| DepartmentPipeline {
            department,
            stages: statuses
                .into_iter()
                .map(|(status, count)| StageCount { status, count })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::portfolio;

    #[test]
    fn test_department_risk_ordering() {
        let risks = department_risk(&portfolio());
        let names: Vec<_> = risks.iter().map(|r| r.department.as_str()).collect();
        assert_eq!(names, vec!["Sales", "Finance", "Operations"]);

        let sales = &risks[0];
        assert_eq!(sales.total_projects, 2);
        assert_eq!(sales.high_risk_count, 1);
        assert_eq!(
            sales.breakdown,
            vec![
                RiskBucket {
                    risk_level: "high".to_string(),
                    count: 1
                },
                RiskBucket {
                    risk_level: "medium".to_string(),
                    count: 1
                },
            ]
        );
        // "critical" is not "high" for this insight.
        assert_eq!(risks[2].high_risk_count, 0);
    }

    #[test]
    fn test_lifecycle_pipeline() {
        let pipeline = lifecycle_pipeline(&portfolio());
        assert_eq!(pipeline.len(), 3);
        assert_eq!(pipeline[2].department, "Sales");
        let stages: Vec<_> = pipeline[2]
            .stages
            .iter()
            .map(|s| (s.status.as_str(), s.count))
            .collect();
        assert_eq!(stages, vec![("approved", 1), ("pilot", 1)]);
    }
}
