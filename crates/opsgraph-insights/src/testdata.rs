//! A small portfolio graph for the insight tests.
//!
//! | project | workflow | dept    | risk     | status   | controls          |
//! |---------|----------|---------|----------|----------|-------------------|
//! | 1       | wf-1     | sales   | high     | pilot    | A.6.2.2           |
//! | 2       | wf-2     | ops     | critical | proposed | A.6.2.2, A.10.4   |
//! | 3       | wf-3     | finance | low      | proposed | (none)            |
//! | 4       | (none)   | sales   | medium   | approved | A.10.4 (unmapped) |
//!
//! Tools: wf-1 {Salesforce, Slack}, wf-2 {Slack, Jira}, wf-3 {Slack},
//! wf-4 {Salesforce}. Principles: wf-1 {self_service},
//! wf-2 {self_service, unified_data}.

use opsgraph_core::catalog;
use opsgraph_core::{ControlRecord, DepartmentRecord, ProjectRecord, WorkflowRecord};
use opsgraph_graph::GraphStore;
use opsgraph_sync::{build_graph, FullSnapshot, SourceSnapshot, SyncConfig};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn department(id: &str, name: &str, tools: &[&str]) -> DepartmentRecord {
    DepartmentRecord {
        id: id.to_string(),
        name: name.to_string(),
        headcount: 20,
        open_roles: 2,
        key_tools: strings(tools),
    }
}

pub fn workflow(id: &str, dept: &str, tools: &[&str], principles: &[&str]) -> WorkflowRecord {
    WorkflowRecord {
        id: id.to_string(),
        name: format!("Workflow {id}"),
        department: dept.to_string(),
        description: String::new(),
        frequency: "weekly".to_string(),
        estimated_build_hours: 40,
        annual_cost_savings_usd: 25_000,
        current_tools: strings(tools),
        jim_principles: strings(principles),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn project(
    id: i64,
    name: &str,
    workflow_id: &str,
    dept: &str,
    risk_level: &str,
    risk_score: f64,
    benefit_score: f64,
    status: &str,
    controls: &[&str],
) -> ProjectRecord {
    ProjectRecord {
        id,
        workflow_id: workflow_id.to_string(),
        name: name.to_string(),
        department: dept.to_string(),
        status: status.to_string(),
        risk_level: risk_level.to_string(),
        risk_score,
        benefit_score,
        owner: None,
        controls: strings(controls),
    }
}

pub fn control(id: &str, name: &str) -> ControlRecord {
    ControlRecord {
        id: id.to_string(),
        name: name.to_string(),
        category: "governance".to_string(),
        description: String::new(),
    }
}

pub fn build(records: SourceSnapshot) -> GraphStore {
    let snapshot = FullSnapshot {
        records,
        principles: catalog::principles(),
        framework: catalog::framework(),
    };
    let (store, _) = build_graph(&snapshot, &SyncConfig::default()).unwrap();
    store
}

pub fn portfolio() -> GraphStore {
    build(SourceSnapshot {
        departments: vec![
            department("sales", "Sales", &["Salesforce"]),
            department("ops", "Operations", &["Jira"]),
            department("finance", "Finance", &[]),
        ],
        workflows: vec![
            workflow("wf-1", "sales", &["Salesforce", "Slack"], &["self_service"]),
            workflow("wf-2", "ops", &["Slack", "Jira"], &["self_service", "unified_data"]),
            workflow("wf-3", "finance", &["Slack"], &[]),
            workflow("wf-4", "sales", &["Salesforce"], &[]),
        ],
        controls: vec![
            control("A.6.2.2", "AI risk assessment"),
            control("A.10.4", "Operational monitoring"),
            control("A.8.2", "Impact disclosure"),
        ],
        projects: vec![
            project(1, "Quote copilot", "wf-1", "sales", "high", 8.0, 7.0, "pilot", &["A.6.2.2"]),
            project(
                2,
                "Ticket triage",
                "wf-2",
                "ops",
                "critical",
                9.0,
                5.0,
                "proposed",
                &["A.6.2.2", "A.10.4"],
            ),
            project(3, "Invoice match", "wf-3", "finance", "low", 2.0, 4.0, "proposed", &[]),
            project(4, "Forecast bot", "", "sales", "medium", 4.0, 6.0, "approved", &["A.10.4"]),
        ],
        ..Default::default()
    })
}
