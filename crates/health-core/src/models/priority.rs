use serde::{Deserialize, Serialize};

use crate::constants::{
    ACTIVATION_PROPERTY, CM_SOURCE, FMM_SOURCE, FM_SOURCE, HOSTING_SOURCE, RA_SOURCE,
    STATE_PROPERTY, SYSTEM_SOURCE_PREFIX,
};

use super::EntityKind;

/// Report priority, derived from who reported and about what.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// User report.
    Normal,
    /// System report from a non-authority source.
    High,
    /// Report from the entity's authority source.
    Higher,
    /// Authority report on the authority property, or a delete.
    Critical,
}

impl Priority {
    /// Whether this priority satisfies the authority-report requirement.
    pub fn is_authority(self) -> bool {
        self >= Priority::Higher
    }

    /// Compute the priority of a report on `kind` from `source_id` about `property`.
    pub fn of(kind: EntityKind, source_id: &str, property: &str) -> Priority {
        if !is_system_source(source_id) {
            return Priority::Normal;
        }
        if !authority_sources(kind).contains(&source_id) {
            return Priority::High;
        }
        if property == authority_property(kind) {
            Priority::Critical
        } else {
            Priority::Higher
        }
    }
}

/// Whether a source id belongs to a system component.
pub fn is_system_source(source_id: &str) -> bool {
    source_id.starts_with(SYSTEM_SOURCE_PREFIX)
}

/// Sources whose reports make an entity's state meaningful.
pub fn authority_sources(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Node | EntityKind::Service | EntityKind::Partition => &[FM_SOURCE, FMM_SOURCE],
        EntityKind::Application => &[CM_SOURCE],
        EntityKind::Replica => &[RA_SOURCE],
        EntityKind::DeployedApplication | EntityKind::DeployedServicePackage => &[HOSTING_SOURCE],
        EntityKind::Cluster => &[],
    }
}

/// Property the authority source reports on.
pub fn authority_property(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::DeployedApplication | EntityKind::DeployedServicePackage => ACTIVATION_PROPERTY,
        _ => STATE_PROPERTY,
    }
}
