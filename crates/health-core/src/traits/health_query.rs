use crate::config::{ApplicationHealthPolicyMap, ClusterHealthPolicy, ClusterUpgradeHealthPolicy};
use crate::errors::HealthResult;
use crate::models::{
    ChildHealthState, ClusterHealth, ClusterHealthChunk, ClusterHealthChunkQuery, ClusterHealthQuery,
    ClusterUpgradeHealthCheck, ClusterUpgradeStateSnapshot, EntityHealth, GetHealthQuery, PagedList,
    PagingQuery,
};

/// Read side: evaluated health views.
pub trait IHealthQuery: Send + Sync {
    fn get_health(&self, query: &GetHealthQuery) -> HealthResult<EntityHealth>;
    fn get_cluster_health(&self, query: &ClusterHealthQuery) -> HealthResult<ClusterHealth>;
    fn get_cluster_health_chunk(
        &self,
        query: &ClusterHealthChunkQuery,
    ) -> HealthResult<ClusterHealthChunk>;
    fn get_nodes_aggregated_health_states(
        &self,
        paging: &PagingQuery,
    ) -> HealthResult<PagedList<ChildHealthState>>;
    fn get_applications_aggregated_health_states(
        &self,
        paging: &PagingQuery,
    ) -> HealthResult<PagedList<ChildHealthState>>;

    // --- Upgrade ---
    fn check_cluster_upgrade_health(
        &self,
        upgrade_domains: &[String],
        cluster_policy: Option<&ClusterHealthPolicy>,
        upgrade_policy: Option<&ClusterUpgradeHealthPolicy>,
        application_policies: Option<&ApplicationHealthPolicyMap>,
        baseline: Option<&ClusterUpgradeStateSnapshot>,
    ) -> HealthResult<ClusterUpgradeHealthCheck>;
    fn capture_upgrade_snapshot(
        &self,
        upgrade_domains: &[String],
    ) -> HealthResult<ClusterUpgradeStateSnapshot>;
}
