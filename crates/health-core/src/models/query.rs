//! Query descriptions and result shapes.

use serde::{Deserialize, Serialize};

use crate::config::{ApplicationHealthPolicy, ApplicationHealthPolicyMap, ClusterHealthPolicy};

use super::{EntityId, HealthEvaluation, HealthEvent, HealthState, HealthStateFilter, HealthStatistics};

/// Per-entity health query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetHealthQuery {
    pub entity: EntityId,
    #[serde(default)]
    pub events_filter: HealthStateFilter,
    #[serde(default)]
    pub children_filter: HealthStateFilter,
    #[serde(default)]
    pub include_health_statistics: bool,
    /// Overrides the policy resolved for the entity's application.
    #[serde(default)]
    pub application_policy: Option<ApplicationHealthPolicy>,
}

impl GetHealthQuery {
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            events_filter: HealthStateFilter::DEFAULT,
            children_filter: HealthStateFilter::DEFAULT,
            include_health_statistics: false,
            application_policy: None,
        }
    }

    pub fn with_events_filter(mut self, filter: HealthStateFilter) -> Self {
        self.events_filter = filter;
        self
    }

    pub fn with_children_filter(mut self, filter: HealthStateFilter) -> Self {
        self.children_filter = filter;
        self
    }

    pub fn with_health_statistics(mut self) -> Self {
        self.include_health_statistics = true;
        self
    }

    pub fn with_application_policy(mut self, policy: ApplicationHealthPolicy) -> Self {
        self.application_policy = Some(policy);
        self
    }
}

/// Cluster-wide health query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterHealthQuery {
    pub events_filter: HealthStateFilter,
    pub nodes_filter: HealthStateFilter,
    pub applications_filter: HealthStateFilter,
    pub include_health_statistics: bool,
    pub cluster_policy: Option<ClusterHealthPolicy>,
    pub application_policies: Option<ApplicationHealthPolicyMap>,
}

/// Aggregated state of one child, as listed under its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildHealthState {
    pub entity: EntityId,
    pub aggregated_health_state: HealthState,
}

/// Result of [`GetHealthQuery`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityHealth {
    pub entity: EntityId,
    pub aggregated_health_state: HealthState,
    pub events: Vec<HealthEvent>,
    pub unhealthy_evaluations: Vec<HealthEvaluation>,
    pub children: Vec<ChildHealthState>,
    pub health_statistics: Option<HealthStatistics>,
}

/// Result of [`ClusterHealthQuery`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterHealth {
    pub aggregated_health_state: HealthState,
    pub events: Vec<HealthEvent>,
    pub unhealthy_evaluations: Vec<HealthEvaluation>,
    pub node_health_states: Vec<ChildHealthState>,
    pub application_health_states: Vec<ChildHealthState>,
    pub health_statistics: Option<HealthStatistics>,
}

/// Outcome of an upgrade health check.
///
/// `unhealthy_evaluations` is empty whenever `is_healthy` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterUpgradeHealthCheck {
    pub is_healthy: bool,
    pub aggregated_health_state: HealthState,
    pub unhealthy_evaluations: Vec<HealthEvaluation>,
}

/// Continuation-token paging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingQuery {
    /// Resume strictly after this key.
    pub continuation_token: Option<String>,
    /// `None` returns everything that is left.
    pub max_results: Option<usize>,
}

impl PagingQuery {
    pub fn first(max_results: usize) -> Self {
        Self {
            continuation_token: None,
            max_results: Some(max_results),
        }
    }

    pub fn after(token: impl Into<String>, max_results: usize) -> Self {
        Self {
            continuation_token: Some(token.into()),
            max_results: Some(max_results),
        }
    }
}

/// One page of results. `continuation_token` is set when more items remain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub continuation_token: Option<String>,
}
