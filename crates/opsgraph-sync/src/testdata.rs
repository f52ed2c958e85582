//! Shared source fixtures for this crate's unit tests.

use chrono::{TimeZone, Utc};
use opsgraph_core::{
    ControlRecord, DepartmentRecord, EventRecord, ProjectRecord, ScoreRecord, WorkflowRecord,
};

use crate::source::SourceSnapshot;

pub fn project(id: i64, workflow_id: &str, department: &str) -> ProjectRecord {
    ProjectRecord {
        id,
        workflow_id: workflow_id.to_string(),
        name: format!("proj-{id}"),
        department: department.to_string(),
        status: "proposed".to_string(),
        risk_level: "medium".to_string(),
        risk_score: 5.0,
        benefit_score: 6.0,
        owner: None,
        controls: Vec::new(),
    }
}

pub fn event(id: i64, project_id: i64, hour: u32) -> EventRecord {
    EventRecord {
        id,
        project_id,
        event_type: "status_change".to_string(),
        from_status: Some("proposed".to_string()),
        to_status: Some("approved".to_string()),
        actor: "reviewer".to_string(),
        detail: None,
        timestamp: Some(Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()),
    }
}

fn control(id: &str) -> ControlRecord {
    ControlRecord {
        id: id.to_string(),
        name: format!("Control {id}"),
        category: "risk".to_string(),
        description: String::new(),
    }
}

/// Sales with one scored workflow, one project governed by a mapped and an
/// unmapped control, and one event.
pub fn sales_snapshot() -> SourceSnapshot {
    let mut proj = project(1, "wf-1", "sales");
    proj.controls = vec!["A.6.2.2".to_string(), "A.10.4".to_string()];

    SourceSnapshot {
        departments: vec![DepartmentRecord {
            id: "sales".to_string(),
            name: "Sales".to_string(),
            headcount: 40,
            open_roles: 3,
            key_tools: vec!["Salesforce".to_string()],
        }],
        workflows: vec![WorkflowRecord {
            id: "wf-1".to_string(),
            name: "Quote generation".to_string(),
            department: "sales".to_string(),
            description: String::new(),
            frequency: "daily".to_string(),
            estimated_build_hours: 80,
            annual_cost_savings_usd: 120_000,
            current_tools: vec!["Salesforce".to_string()],
            jim_principles: Vec::new(),
        }],
        controls: vec![control("A.6.2.2"), control("A.10.4")],
        projects: vec![proj],
        events: vec![event(1, 1, 9)],
        scores: vec![ScoreRecord {
            id: "wf-1".to_string(),
            composite: 8.2,
            revenue_impact: 9.0,
            headcount_pressure: 7.5,
            implementation_complexity: 6.0,
            self_service_potential: 8.0,
            rank: 1,
        }],
    }
}
