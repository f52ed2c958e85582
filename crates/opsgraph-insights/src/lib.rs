//! opsgraph-insights: cross-entity analytics over the knowledge graph.
//!
//! Each insight is an independent, read-only aggregation pass over a
//! [`GraphStore`]. Results are deterministic: every ordering falls back to
//! name ascending on ties, and every name list is sorted.

pub mod departments;
pub mod governance;
pub mod principles;
pub mod tools;

#[cfg(test)]
mod testdata;

use std::time::Instant;

use opsgraph_graph::{GraphStore, NodeRef};
use serde::{Deserialize, Serialize};

pub use departments::{
    department_risk, lifecycle_pipeline, DepartmentPipeline, DepartmentRisk, RiskBucket,
    StageCount,
};
pub use governance::{
    compliance_chain, compliance_coupled, control_hotspots, governance_coverage, ComplianceChain,
    ControlHotspot, CoupledDepartments, GovernanceCoverage,
};
pub use principles::{principle_risk, PrincipleRisk};
pub use tools::{
    tool_cascade_risk, tool_sprawl, unprotected_tools, ProjectRisk, ToolCascadeRisk, ToolSprawl,
    UnprotectedTool,
};

/// The ten insights, keyed by name when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphInsights {
    pub governance_coverage: GovernanceCoverage,
    pub compliance_chain: ComplianceChain,
    pub department_risk: Vec<DepartmentRisk>,
    pub tool_sprawl: Vec<ToolSprawl>,
    pub lifecycle_pipeline: Vec<DepartmentPipeline>,
    pub tool_cascade_risk: Vec<ToolCascadeRisk>,
    pub compliance_coupled: Vec<CoupledDepartments>,
    pub principle_risk: Vec<PrincipleRisk>,
    pub control_hotspots: Vec<ControlHotspot>,
    pub unprotected_tools: Vec<UnprotectedTool>,
}

/// Run every insight against `store`.
pub fn all_insights(store: &GraphStore) -> GraphInsights {
    let start = Instant::now();
    let insights = GraphInsights {
        governance_coverage: governance_coverage(store),
        compliance_chain: compliance_chain(store),
        department_risk: department_risk(store),
        tool_sprawl: tool_sprawl(store),
        lifecycle_pipeline: lifecycle_pipeline(store),
        tool_cascade_risk: tool_cascade_risk(store),
        compliance_coupled: compliance_coupled(store),
        principle_risk: principle_risk(store),
        control_hotspots: control_hotspots(store),
        unprotected_tools: unprotected_tools(store),
    };
    tracing::debug!(
        elapsed_us = start.elapsed().as_micros() as u64,
        "Computed graph insights"
    );
    insights
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / total * 100`, rounded; 0 when `total` is 0.
pub(crate) fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0)
}

/// Display name of a node, falling back to its identity.
pub(crate) fn display_name(node: NodeRef<'_>) -> String {
    node.node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| node.id.to_string())
}
