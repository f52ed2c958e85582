//! Fixed catalogs that are not owned by the source-of-truth store.

use crate::types::{FrameworkRecord, PrincipleRecord};

/// Controls kept internal and not yet mapped to the external framework.
///
/// Projects governed only by these never complete the compliance chain.
pub const DEFAULT_UNMAPPED_CONTROLS: &[&str] = &[
    "A.6.2.4", // risk treatment
    "A.7.3", "A.7.4", // impact
    "A.10.2", "A.10.3", "A.10.4", "A.10.5", "A.10.6", // operations
];

/// The principle enumeration workflows can reference by id.
pub fn principles() -> Vec<PrincipleRecord> {
    [
        ("self_service", "Self-Service Enablement"),
        ("deal_standardization", "Deal Standardization"),
        ("unified_data", "Unified Data Platform"),
    ]
    .into_iter()
    .map(|(id, name)| PrincipleRecord {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

/// The single control framework.
pub fn framework() -> FrameworkRecord {
    FrameworkRecord {
        id: "iso-42001".to_string(),
        name: "ISO/IEC 42001:2023".to_string(),
        scope: "AI Management System".to_string(),
    }
}
