//! Payloads of the [`HealthEvaluation`](super::HealthEvaluation) variants.

use serde::{Deserialize, Serialize};

use crate::config::Percent;
use crate::models::{EntityId, HealthEvent, HealthState};

use super::HealthEvaluation;

/// Leaf: the single event that made an entity unhealthy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventHealthEvaluation {
    pub aggregated_health_state: HealthState,
    pub description: String,
    pub unhealthy_event: HealthEvent,
    pub consider_warning_as_error: bool,
}

/// Wrapper explaining how one entity became unhealthy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityHealthEvaluation {
    pub entity: EntityId,
    pub aggregated_health_state: HealthState,
    pub description: String,
    pub unhealthy_evaluations: Vec<HealthEvaluation>,
}

/// A collection of children that exceeded its unhealthy threshold.
///
/// An empty `unhealthy_evaluations` list means the children were trimmed;
/// `total_count` always reflects every child that was evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildrenHealthEvaluation {
    pub aggregated_health_state: HealthState,
    pub description: String,
    pub total_count: u64,
    pub max_percent_unhealthy: Percent,
    pub unhealthy_evaluations: Vec<HealthEvaluation>,
}

/// Services of an application, grouped by service type when one is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicesHealthEvaluation {
    /// Set, and non-empty, when the services were grouped by type.
    pub service_type_name: Option<String>,
    pub aggregated_health_state: HealthState,
    pub description: String,
    pub total_count: u64,
    pub max_percent_unhealthy: Percent,
    pub unhealthy_evaluations: Vec<HealthEvaluation>,
}

/// Applications of one application type named in the cluster policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationTypeApplicationsHealthEvaluation {
    pub application_type_name: String,
    pub aggregated_health_state: HealthState,
    pub description: String,
    pub total_count: u64,
    pub max_percent_unhealthy: Percent,
    pub unhealthy_evaluations: Vec<HealthEvaluation>,
}

/// Nodes or deployed applications inside one upgrade domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDomainHealthEvaluation {
    pub upgrade_domain_name: String,
    pub aggregated_health_state: HealthState,
    pub description: String,
    pub total_count: u64,
    pub max_percent_unhealthy: Percent,
    pub unhealthy_evaluations: Vec<HealthEvaluation>,
}

/// The system application is unhealthy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemApplicationHealthEvaluation {
    pub aggregated_health_state: HealthState,
    pub description: String,
    pub unhealthy_evaluations: Vec<HealthEvaluation>,
}

/// Node health regressed beyond the allowed delta since the upgrade baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaNodesCheckHealthEvaluation {
    pub aggregated_health_state: HealthState,
    pub description: String,
    pub baseline_error_count: u32,
    pub baseline_total_count: u32,
    pub total_count: u64,
    pub max_percent_delta_unhealthy_nodes: Percent,
    pub unhealthy_evaluations: Vec<HealthEvaluation>,
}

/// Same as [`DeltaNodesCheckHealthEvaluation`], scoped to one upgrade domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDomainDeltaNodesCheckHealthEvaluation {
    pub upgrade_domain_name: String,
    pub aggregated_health_state: HealthState,
    pub description: String,
    pub baseline_error_count: u32,
    pub baseline_total_count: u32,
    pub total_count: u64,
    pub max_percent_upgrade_domain_delta_unhealthy_nodes: Percent,
    pub unhealthy_evaluations: Vec<HealthEvaluation>,
}
