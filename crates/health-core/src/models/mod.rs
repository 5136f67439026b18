//! Data model of the health engine.

pub mod chunk;
mod entity_attributes;
mod entity_id;
pub mod evaluation;
mod filters;
mod health_event;
mod health_report;
mod health_state;
mod health_state_count;
mod priority;
pub mod query;
mod sequence;
mod upgrade_snapshot;

pub use chunk::{
    ApplicationHealthStateChunk, ApplicationHealthStateFilter, ClusterHealthChunk,
    ClusterHealthChunkQuery, DeployedApplicationHealthStateChunk,
    DeployedApplicationHealthStateFilter, DeployedServicePackageHealthStateChunk,
    DeployedServicePackageHealthStateFilter, HealthStateChunkList, NodeHealthStateChunk,
    NodeHealthStateFilter, PartitionHealthStateChunk, PartitionHealthStateFilter,
    ReplicaHealthStateChunk, ReplicaHealthStateFilter, ServiceHealthStateChunk,
    ServiceHealthStateFilter,
};
pub use entity_attributes::EntityAttributes;
pub use entity_id::{EntityId, EntityKind};
pub use evaluation::{check_state_matches_evaluations, EvaluationKind, HealthEvaluation};
pub use filters::HealthStateFilter;
pub use health_event::HealthEvent;
pub use health_report::HealthReport;
pub use health_state::HealthState;
pub use health_state_count::{HealthStateCount, HealthStateCountMap, HealthStatistics};
pub use priority::{authority_property, authority_sources, is_system_source, Priority};
pub use query::{
    ChildHealthState, ClusterHealth, ClusterHealthQuery, ClusterUpgradeHealthCheck, EntityHealth,
    GetHealthQuery, PagedList, PagingQuery,
};
pub use sequence::SequenceNumber;
pub use upgrade_snapshot::{ClusterUpgradeStateSnapshot, UnhealthyState};
