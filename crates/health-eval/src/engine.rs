//! HealthEngine: the store and the evaluator behind one facade.
//!
//! Every query takes a fresh snapshot and evaluates it; writers are never
//! blocked by readers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use health_core::config::{
    ApplicationHealthPolicyMap, ClusterHealthPolicy, ClusterUpgradeHealthPolicy, HealthConfig,
};
use health_core::errors::HealthResult;
use health_core::models::{
    ChildHealthState, ClusterHealth, ClusterHealthChunk, ClusterHealthChunkQuery, ClusterHealthQuery,
    ClusterUpgradeHealthCheck, ClusterUpgradeStateSnapshot, EntityHealth, EntityId, GetHealthQuery,
    HealthEvent, HealthReport, PagedList, PagingQuery,
};
use health_core::traits::{IHealthQuery, IHealthStore, ReportOutcome};
use health_entities::{EntityStore, HealthSnapshot};

use crate::evaluator::HealthEvaluator;
use crate::{queries, upgrade};

/// Health store plus evaluation under the configured policies.
pub struct HealthEngine {
    store: Arc<EntityStore>,
    config: HealthConfig,
}

impl HealthEngine {
    /// Create an engine over an empty store.
    pub fn new(config: HealthConfig) -> HealthResult<Self> {
        Self::with_store(Arc::new(EntityStore::new()), config)
    }

    /// Create an engine over an existing store.
    pub fn with_store(store: Arc<EntityStore>, config: HealthConfig) -> HealthResult<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Snapshot the store with expiry evaluated at `now`.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> HealthSnapshot {
        self.store.snapshot(now)
    }

    /// Evaluator over `snapshot` with the configured default policies.
    pub fn evaluator<'a>(&'a self, snapshot: &'a HealthSnapshot) -> HealthEvaluator<'a> {
        HealthEvaluator::new(
            snapshot,
            &self.config.evaluation,
            &self.config.cluster_policy,
            &self.config.application_policy,
        )
    }

    fn evaluator_with<'a>(
        &'a self,
        snapshot: &'a HealthSnapshot,
        cluster_policy: Option<&'a ClusterHealthPolicy>,
        application_policies: Option<&'a ApplicationHealthPolicyMap>,
    ) -> HealthResult<HealthEvaluator<'a>> {
        if let Some(policy) = cluster_policy {
            policy.validate()?;
        }
        Ok(HealthEvaluator::new(
            snapshot,
            &self.config.evaluation,
            cluster_policy.unwrap_or(&self.config.cluster_policy),
            &self.config.application_policy,
        )
        .with_application_policies(application_policies))
    }
}

impl IHealthStore for HealthEngine {
    fn report(&self, report: &HealthReport) -> HealthResult<ReportOutcome> {
        self.store.report(report)
    }

    fn report_batch(&self, reports: &[HealthReport]) -> Vec<HealthResult<ReportOutcome>> {
        self.store.report_batch(reports)
    }

    fn delete_entity(&self, entity: &EntityId, source_id: &str, sequence_number: i64) -> HealthResult<ReportOutcome> {
        self.store.delete_entity(entity, source_id, sequence_number)
    }

    fn get_events(&self, entity: &EntityId) -> HealthResult<Vec<HealthEvent>> {
        self.store.get_events(entity)
    }

    fn entity_count(&self) -> usize {
        self.store.entity_count()
    }

    fn cleanup_expired(&self, now: DateTime<Utc>) -> usize {
        self.store.cleanup_expired(now)
    }
}

impl IHealthQuery for HealthEngine {
    fn get_health(&self, query: &GetHealthQuery) -> HealthResult<EntityHealth> {
        if let Some(policy) = &query.application_policy {
            policy.validate()?;
        }
        let snapshot = self.snapshot_at(Utc::now());
        let evaluator = self
            .evaluator(&snapshot)
            .with_application_policy_override(query.application_policy.as_ref());
        queries::get_health(&evaluator, query)
    }

    fn get_cluster_health(&self, query: &ClusterHealthQuery) -> HealthResult<ClusterHealth> {
        let snapshot = self.snapshot_at(Utc::now());
        let evaluator = self.evaluator_with(
            &snapshot,
            query.cluster_policy.as_ref(),
            query.application_policies.as_ref(),
        )?;
        queries::get_cluster_health(&evaluator, query)
    }

    fn get_cluster_health_chunk(&self, query: &ClusterHealthChunkQuery) -> HealthResult<ClusterHealthChunk> {
        let snapshot = self.snapshot_at(Utc::now());
        let evaluator = self.evaluator_with(
            &snapshot,
            query.cluster_policy.as_ref(),
            query.application_policies.as_ref(),
        )?;
        queries::get_cluster_health_chunk(&evaluator, query)
    }

    fn get_nodes_aggregated_health_states(&self, paging: &PagingQuery) -> HealthResult<PagedList<ChildHealthState>> {
        let snapshot = self.snapshot_at(Utc::now());
        queries::get_nodes_aggregated_health_states(&self.evaluator(&snapshot), paging)
    }

    fn get_applications_aggregated_health_states(
        &self,
        paging: &PagingQuery,
    ) -> HealthResult<PagedList<ChildHealthState>> {
        let snapshot = self.snapshot_at(Utc::now());
        queries::get_applications_aggregated_health_states(&self.evaluator(&snapshot), paging)
    }

    fn check_cluster_upgrade_health(
        &self,
        upgrade_domains: &[String],
        cluster_policy: Option<&ClusterHealthPolicy>,
        upgrade_policy: Option<&ClusterUpgradeHealthPolicy>,
        application_policies: Option<&ApplicationHealthPolicyMap>,
        baseline: Option<&ClusterUpgradeStateSnapshot>,
    ) -> HealthResult<ClusterUpgradeHealthCheck> {
        let snapshot = self.snapshot_at(Utc::now());
        let evaluator = self
            .evaluator_with(&snapshot, cluster_policy, application_policies)?
            .with_upgrade_domains(upgrade_domains);
        upgrade::check_cluster_upgrade_health(
            &evaluator,
            upgrade_policy.unwrap_or(&self.config.upgrade_policy),
            baseline,
        )
    }

    fn capture_upgrade_snapshot(&self, upgrade_domains: &[String]) -> HealthResult<ClusterUpgradeStateSnapshot> {
        let snapshot = self.snapshot_at(Utc::now());
        let evaluator = self.evaluator(&snapshot).with_upgrade_domains(upgrade_domains);
        upgrade::capture_upgrade_snapshot(&evaluator)
    }
}
