//! Topology builders and scenario loaders shared by the workspace's tests
//! and benches.
//!
//! [`ClusterBuilder`] issues the reports a real cluster's system components
//! would send, so tests describe topologies instead of report streams.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use health_core::constants::{
    ACTIVATION_PROPERTY, CM_SOURCE, FM_SOURCE, HOSTING_SOURCE, RA_SOURCE, STATE_PROPERTY,
};
use health_core::models::{EntityAttributes, EntityId, HealthReport, HealthState};
use health_entities::{EntityStore, HealthSnapshot};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Deterministic partition id for tests.
pub fn pid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

/// Builds a store by sending authority reports for each entity.
pub struct ClusterBuilder {
    store: EntityStore,
    now: DateTime<Utc>,
}

impl ClusterBuilder {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Stamp every report as received at `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            store: EntityStore::new(),
            now,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Apply any report.
    ///
    /// # Panics
    /// Panics if the store rejects the report.
    pub fn report(self, report: HealthReport) -> Self {
        if let Err(e) = self.store.report_at(&report, self.now) {
            panic!("fixture report for {} rejected: {e}", report.entity);
        }
        self
    }

    fn system_report(
        self,
        entity: EntityId,
        source: &str,
        property: &str,
        state: HealthState,
        attributes: EntityAttributes,
    ) -> Self {
        let report = HealthReport::new(entity, source, property, state)
            .with_attributes(attributes)
            .with_description(format!("{source} reports {state}"));
        self.report(report)
    }

    pub fn node(self, name: &str, upgrade_domain: &str, state: HealthState) -> Self {
        self.system_report(
            EntityId::node(name),
            FM_SOURCE,
            STATE_PROPERTY,
            state,
            EntityAttributes::new()
                .with_node_name(name)
                .with_upgrade_domain(upgrade_domain),
        )
    }

    pub fn application(self, name: &str, application_type: &str, state: HealthState) -> Self {
        self.system_report(
            EntityId::application(name),
            CM_SOURCE,
            STATE_PROPERTY,
            state,
            EntityAttributes::new()
                .with_application_name(name)
                .with_application_type_name(application_type),
        )
    }

    /// Application known to the cluster manager but without a type.
    pub fn untyped_application(self, name: &str, state: HealthState) -> Self {
        self.system_report(
            EntityId::application(name),
            CM_SOURCE,
            STATE_PROPERTY,
            state,
            EntityAttributes::new().with_application_name(name),
        )
    }

    pub fn service(self, application: &str, name: &str, service_type: &str, state: HealthState) -> Self {
        self.system_report(
            EntityId::service(name),
            FM_SOURCE,
            STATE_PROPERTY,
            state,
            EntityAttributes::new()
                .with_application_name(application)
                .with_service_type_name(service_type),
        )
    }

    pub fn partition(self, service: &str, partition_id: Uuid, state: HealthState) -> Self {
        self.system_report(
            EntityId::partition(partition_id),
            FM_SOURCE,
            STATE_PROPERTY,
            state,
            EntityAttributes::new().with_service_name(service),
        )
    }

    pub fn replica(self, partition_id: Uuid, replica_id: i64, node: &str, state: HealthState) -> Self {
        self.system_report(
            EntityId::replica(partition_id, replica_id),
            RA_SOURCE,
            STATE_PROPERTY,
            state,
            EntityAttributes::new().with_node_name(node),
        )
    }

    pub fn deployed_application(self, application: &str, node: &str, state: HealthState) -> Self {
        self.system_report(
            EntityId::deployed_application(application, node),
            HOSTING_SOURCE,
            ACTIVATION_PROPERTY,
            state,
            EntityAttributes::new().with_node_name(node),
        )
    }

    pub fn deployed_service_package(
        self,
        application: &str,
        service_manifest: &str,
        node: &str,
        state: HealthState,
    ) -> Self {
        self.system_report(
            EntityId::deployed_service_package(application, service_manifest, "", node),
            HOSTING_SOURCE,
            ACTIVATION_PROPERTY,
            state,
            EntityAttributes::new().with_node_name(node),
        )
    }

    /// Report from a non-system watchdog.
    pub fn user_report(self, entity: EntityId, source: &str, property: &str, state: HealthState) -> Self {
        self.report(HealthReport::new(entity, source, property, state))
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        self.store.snapshot(self.now)
    }

    pub fn build(self) -> EntityStore {
        self.store
    }
}

impl Default for ClusterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shape of a generated cluster.
#[derive(Debug, Clone, Copy)]
pub struct TopologySpec {
    pub nodes: usize,
    pub upgrade_domains: usize,
    pub applications: usize,
    pub services_per_application: usize,
    pub partitions_per_service: usize,
    pub replicas_per_partition: usize,
    /// Every n-th replica reports Error; 0 disables.
    pub error_replica_every: usize,
}

impl Default for TopologySpec {
    fn default() -> Self {
        Self {
            nodes: 10,
            upgrade_domains: 5,
            applications: 4,
            services_per_application: 3,
            partitions_per_service: 4,
            replicas_per_partition: 3,
            error_replica_every: 0,
        }
    }
}

/// Node `i` of a generated cluster.
pub fn node_name(i: usize) -> String {
    format!("N{i:03}")
}

/// Upgrade domain `i` of a generated cluster.
pub fn upgrade_domain(i: usize) -> String {
    format!("UD{i}")
}

/// Build a cluster of the given shape with every entity Ok unless
/// `error_replica_every` says otherwise.
pub fn generated_cluster(spec: TopologySpec) -> ClusterBuilder {
    let mut builder = ClusterBuilder::new();
    let ud_count = spec.upgrade_domains.max(1);
    for i in 0..spec.nodes {
        builder = builder.node(&node_name(i), &upgrade_domain(i % ud_count), HealthState::Ok);
    }
    let mut replica_seq = 0usize;
    let mut partition_seq = 0u128;
    for a in 0..spec.applications {
        let app = format!("fabric:/App{a}");
        builder = builder.application(&app, "AppType", HealthState::Ok);
        for s in 0..spec.services_per_application {
            let service = format!("{app}/Svc{s}");
            builder = builder.service(&app, &service, "SvcType", HealthState::Ok);
            for _ in 0..spec.partitions_per_service {
                partition_seq += 1;
                let partition = pid(partition_seq);
                builder = builder.partition(&service, partition, HealthState::Ok);
                for r in 0..spec.replicas_per_partition {
                    replica_seq += 1;
                    let state = if spec.error_replica_every > 0 && replica_seq % spec.error_replica_every == 0 {
                        HealthState::Error
                    } else {
                        HealthState::Ok
                    };
                    let node = node_name(r % spec.nodes.max(1));
                    builder = builder.replica(partition, r as i64 + 1, &node, state);
                }
            }
        }
        for n in 0..spec.nodes {
            builder = builder.deployed_application(&app, &node_name(n), HealthState::Ok);
        }
    }
    builder
}

// --- Scenario files ---

/// Root directory of the scenario files.
fn scenarios_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios")
}

/// Load and deserialize a JSON scenario file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_scenario<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = scenarios_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read scenario {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse scenario {}: {}", path.display(), e))
}

/// Load a scenario file holding a list of reports and apply them in order.
pub fn store_from_scenario(relative_path: &str, now: DateTime<Utc>) -> EntityStore {
    let reports: Vec<HealthReport> = load_scenario(relative_path);
    let builder = reports
        .into_iter()
        .fold(ClusterBuilder::at(now), ClusterBuilder::report);
    builder.build()
}
