//! Health state chunks: aggregated-state-only views of the cluster tree.
//!
//! A chunk query walks nested filters. An entity is returned when at least
//! one filter at its level matches it; its children are then selected by the
//! union of the nested filters of every matching filter. Every list records
//! how many entities were considered, so `items.len() <= total_count`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{ApplicationHealthPolicyMap, ClusterHealthPolicy};

use super::{HealthState, HealthStateFilter};

/// Items returned at one level, plus the number considered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStateChunkList<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

impl<T> HealthStateChunkList<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }
}

// --- Filters ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterHealthChunkQuery {
    pub cluster_policy: Option<ClusterHealthPolicy>,
    pub application_policies: Option<ApplicationHealthPolicyMap>,
    pub node_filters: Vec<NodeHealthStateFilter>,
    pub application_filters: Vec<ApplicationHealthStateFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeHealthStateFilter {
    pub node_name_filter: Option<String>,
    pub health_state_filter: HealthStateFilter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationHealthStateFilter {
    pub application_name_filter: Option<String>,
    pub application_type_name_filter: Option<String>,
    pub health_state_filter: HealthStateFilter,
    pub service_filters: Vec<ServiceHealthStateFilter>,
    pub deployed_application_filters: Vec<DeployedApplicationHealthStateFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceHealthStateFilter {
    pub service_name_filter: Option<String>,
    pub health_state_filter: HealthStateFilter,
    pub partition_filters: Vec<PartitionHealthStateFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionHealthStateFilter {
    pub partition_id_filter: Option<Uuid>,
    pub health_state_filter: HealthStateFilter,
    pub replica_filters: Vec<ReplicaHealthStateFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicaHealthStateFilter {
    pub replica_id_filter: Option<i64>,
    pub health_state_filter: HealthStateFilter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployedApplicationHealthStateFilter {
    pub node_name_filter: Option<String>,
    pub health_state_filter: HealthStateFilter,
    pub deployed_service_package_filters: Vec<DeployedServicePackageHealthStateFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployedServicePackageHealthStateFilter {
    pub service_manifest_name_filter: Option<String>,
    pub service_package_activation_id_filter: Option<String>,
    pub health_state_filter: HealthStateFilter,
}

/// Whether an optional exact-match key filter accepts `value`.
pub fn key_matches<T: PartialEq + ?Sized>(filter: Option<&T>, value: &T) -> bool {
    filter.map_or(true, |expected| expected == value)
}

// --- Chunks ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterHealthChunk {
    pub health_state: HealthState,
    pub node_health_state_chunks: HealthStateChunkList<NodeHealthStateChunk>,
    pub application_health_state_chunks: HealthStateChunkList<ApplicationHealthStateChunk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeHealthStateChunk {
    pub node_name: String,
    pub health_state: HealthState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationHealthStateChunk {
    pub application_name: String,
    pub application_type_name: Option<String>,
    pub health_state: HealthState,
    pub service_health_state_chunks: HealthStateChunkList<ServiceHealthStateChunk>,
    pub deployed_application_health_state_chunks:
        HealthStateChunkList<DeployedApplicationHealthStateChunk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealthStateChunk {
    pub service_name: String,
    pub health_state: HealthState,
    pub partition_health_state_chunks: HealthStateChunkList<PartitionHealthStateChunk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionHealthStateChunk {
    pub partition_id: Uuid,
    pub health_state: HealthState,
    pub replica_health_state_chunks: HealthStateChunkList<ReplicaHealthStateChunk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaHealthStateChunk {
    pub replica_id: i64,
    pub health_state: HealthState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedApplicationHealthStateChunk {
    pub node_name: String,
    pub health_state: HealthState,
    pub deployed_service_package_health_state_chunks:
        HealthStateChunkList<DeployedServicePackageHealthStateChunk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedServicePackageHealthStateChunk {
    pub service_manifest_name: String,
    pub service_package_activation_id: String,
    pub health_state: HealthState,
}
