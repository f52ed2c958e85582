//! Risk and benefit of the projects following each principle.

use std::collections::HashSet;

use opsgraph_core::{EdgeKind, NodeLabel};
use opsgraph_graph::GraphStore;
use serde::{Deserialize, Serialize};

use crate::{display_name, round2};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrincipleRisk {
    pub principle: String,
    pub project_count: usize,
    pub avg_risk_score: f64,
    pub avg_benefit_score: f64,
}

/// Average project risk and benefit per principle, least risky first.
/// Principles no project follows are omitted.
pub fn principle_risk(store: &GraphStore) -> Vec<PrincipleRisk> {
    let mut rows = Vec::new();
    for principle in store.nodes_with_label(NodeLabel::Principle) {
        let mut seen = HashSet::new();
        let projects: Vec<_> = store
            .incoming(principle.id, EdgeKind::FollowsPrinciple)
            .flat_map(|wf| store.outgoing(wf.id, EdgeKind::BecameProject))
            .filter(|p| seen.insert(p.id))
            .filter_map(|p| p.node.as_project())
            .collect();
        if projects.is_empty() {
            continue;
        }

        let n = projects.len() as f64;
        rows.push(PrincipleRisk {
            principle: display_name(principle),
            project_count: projects.len(),
            avg_risk_score: round2(projects.iter().map(|p| p.risk_score).sum::<f64>() / n),
            avg_benefit_score: round2(projects.iter().map(|p| p.benefit_score).sum::<f64>() / n),
        });
    }

    rows.sort_by(|a, b| {
        a.avg_risk_score
            .total_cmp(&b.avg_risk_score)
            .then_with(|| a.principle.cmp(&b.principle))
    });
    rows
}
