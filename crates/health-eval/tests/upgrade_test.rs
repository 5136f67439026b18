use std::collections::BTreeMap;
use std::sync::Arc;

use health_core::config::{ClusterHealthPolicy, ClusterUpgradeHealthPolicy, HealthConfig, Percent};
use health_core::constants::AD_HOC_APPLICATION_NAME;
use health_core::errors::HealthError;
use health_core::models::{
    ClusterHealthQuery, ClusterUpgradeStateSnapshot, EntityId, EvaluationKind, HealthEvaluation, HealthState,
    UnhealthyState,
};
use health_core::traits::IHealthQuery;
use health_eval::HealthEngine;
use test_fixtures::ClusterBuilder;

fn p(value: u8) -> Percent {
    Percent::new(value).unwrap()
}

fn uds(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn all_uds() -> Vec<String> {
    uds(&["UD0", "UD1", "UD2", "UD3", "UD4"])
}

/// Ten nodes, two per upgrade domain (`N0i` and `N0{i+5}` share `UDi`).
fn ten_nodes(errors: &[usize]) -> ClusterBuilder {
    (0..10).fold(ClusterBuilder::new(), |builder, i| {
        let state = if errors.contains(&i) { HealthState::Error } else { HealthState::Ok };
        builder.node(&format!("N{i:02}"), &format!("UD{}", i % 5), state)
    })
}

fn engine(builder: ClusterBuilder, config: HealthConfig) -> HealthEngine {
    HealthEngine::with_store(Arc::new(builder.build()), config).unwrap()
}

fn state(errors: u32, total: u32) -> UnhealthyState {
    UnhealthyState::new(errors, total).unwrap()
}

/// Valid baseline from global and per-domain counts.
fn baseline(global: UnhealthyState, per_domain: &[(&str, UnhealthyState)]) -> ClusterUpgradeStateSnapshot {
    let map: BTreeMap<String, UnhealthyState> = per_domain
        .iter()
        .map(|(ud, state)| (ud.to_string(), *state))
        .collect();
    ClusterUpgradeStateSnapshot::new(global, map)
}

fn lenient_nodes() -> ClusterHealthPolicy {
    ClusterHealthPolicy::new(p(100), p(0))
}

// --- Basic verdicts ---

#[test]
fn healthy_cluster_passes_with_no_evaluations() {
    let engine = engine(ten_nodes(&[]), HealthConfig::default());
    let check = engine
        .check_cluster_upgrade_health(&all_uds(), None, None, None, None)
        .unwrap();
    assert!(check.is_healthy);
    assert_eq!(check.aggregated_health_state, HealthState::Ok);
    assert!(check.unhealthy_evaluations.is_empty());
}

#[test]
fn warning_cluster_is_still_healthy_for_upgrade() {
    let builder = ten_nodes(&[]).user_report(EntityId::Cluster, "Watchdog", "Capacity", HealthState::Warning);
    let engine = engine(builder, HealthConfig::default());
    let check = engine
        .check_cluster_upgrade_health(&all_uds(), None, None, None, None)
        .unwrap();
    assert!(check.is_healthy);
    assert_eq!(check.aggregated_health_state, HealthState::Warning);
    assert!(check.unhealthy_evaluations.is_empty());
}

#[test]
fn unhealthy_check_returns_evaluations() {
    let engine = engine(ten_nodes(&[3]), HealthConfig::default());
    let check = engine
        .check_cluster_upgrade_health(&all_uds(), None, None, None, None)
        .unwrap();
    assert!(!check.is_healthy);
    assert_eq!(check.aggregated_health_state, HealthState::Error);
    assert_eq!(check.unhealthy_evaluations[0].kind(), EvaluationKind::Nodes);
}

// --- Global delta ---

#[test]
fn global_delta_is_checked_against_baseline() {
    let engine = engine(ten_nodes(&[0, 1, 2]), HealthConfig::default());
    let per_domain: Vec<(&str, UnhealthyState)> = vec![
        ("UD0", state(1, 2)),
        ("UD1", state(1, 2)),
        ("UD2", state(0, 2)),
        ("UD3", state(0, 2)),
        ("UD4", state(0, 2)),
    ];
    let baseline = baseline(state(2, 10), &per_domain);
    let cluster_policy = lenient_nodes();

    // 30% now against 20% before: a delta of 10.
    let strict = ClusterUpgradeHealthPolicy::new(p(5), p(100));
    let check = engine
        .check_cluster_upgrade_health(&all_uds(), Some(&cluster_policy), Some(&strict), None, Some(&baseline))
        .unwrap();
    assert!(!check.is_healthy);
    assert_eq!(check.unhealthy_evaluations.len(), 1);
    let delta = &check.unhealthy_evaluations[0];
    assert_eq!(delta.kind(), EvaluationKind::DeltaNodesCheck);
    assert_eq!(delta.total_count(), Some(10));
    assert_eq!(delta.unhealthy_evaluations().len(), 3);
    assert!(delta
        .description()
        .contains("Baseline error count: 2, Baseline total count: 10 (20%)"));
    assert!(delta
        .description()
        .contains("Current error count: 3, Current total count: 10 (30%)"));
    assert!(delta.description().contains("MaxPercentDeltaUnhealthyNodes=5%"));

    for max in [10, 15] {
        let lenient = ClusterUpgradeHealthPolicy::new(p(max), p(100));
        let check = engine
            .check_cluster_upgrade_health(&all_uds(), Some(&cluster_policy), Some(&lenient), None, Some(&baseline))
            .unwrap();
        assert!(check.is_healthy, "delta 10 must pass at {max}%");
    }
}

#[test]
fn invalid_baseline_disables_delta_checks() {
    let engine = engine(ten_nodes(&[0, 1, 2]), HealthConfig::default());
    let cluster_policy = lenient_nodes();
    let strict = ClusterUpgradeHealthPolicy::new(p(0), p(0));
    let empty = ClusterUpgradeStateSnapshot::default();
    let check = engine
        .check_cluster_upgrade_health(&all_uds(), Some(&cluster_policy), Some(&strict), None, Some(&empty))
        .unwrap();
    assert!(check.is_healthy);
}

// --- Upgrade domains ---

#[test]
fn upgrade_domain_delta_is_checked_per_domain() {
    // Both UD0 nodes fail; globally that is 20%.
    let engine = engine(ten_nodes(&[0, 5]), HealthConfig::default());
    let per_domain: Vec<(&str, UnhealthyState)> = ["UD0", "UD1", "UD2", "UD3", "UD4"]
        .into_iter()
        .map(|ud| (ud, state(0, 2)))
        .collect();
    let baseline = baseline(state(0, 10), &per_domain);
    let policy = ClusterUpgradeHealthPolicy::new(p(100), p(40));

    let check = engine
        .check_cluster_upgrade_health(&all_uds(), Some(&lenient_nodes()), Some(&policy), None, Some(&baseline))
        .unwrap();
    assert!(!check.is_healthy);
    assert_eq!(check.unhealthy_evaluations.len(), 1);
    let evaluation = &check.unhealthy_evaluations[0];
    assert_eq!(evaluation.kind(), EvaluationKind::UpgradeDomainDeltaNodesCheck);
    assert!(evaluation.description().contains("in upgrade domain 'UD0'"));
    assert!(evaluation
        .description()
        .contains("MaxPercentUpgradeDomainDeltaUnhealthyNodes=40%"));
    match evaluation {
        HealthEvaluation::UpgradeDomainDeltaNodesCheck(payload) => {
            assert_eq!(payload.upgrade_domain_name, "UD0");
            assert_eq!(payload.baseline_error_count, 0);
            assert_eq!(payload.baseline_total_count, 2);
            assert_eq!(payload.total_count, 2);
        }
        other => panic!("unexpected evaluation {other:?}"),
    }
}

#[test]
fn upgrade_domain_missing_from_baseline_fails() {
    let engine = engine(ten_nodes(&[]), HealthConfig::default());
    let baseline = baseline(state(0, 10), &[("UD0", state(0, 2)), ("UD1", state(0, 2))]);
    let err = engine
        .check_cluster_upgrade_health(&uds(&["UD0", "UD1", "UD2"]), None, None, None, Some(&baseline))
        .unwrap_err();
    match err {
        HealthError::UpgradeDomainNotInBaseline { upgrade_domain } => assert_eq!(upgrade_domain, "UD2"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn upgrade_domains_are_skipped_once_nodes_are_in_error() {
    let engine = engine(ten_nodes(&[0, 1, 2]), HealthConfig::default());
    let baseline = baseline(state(3, 10), &[("UD0", state(1, 2))]);
    let check = engine
        .check_cluster_upgrade_health(&uds(&["UD0", "UD1"]), None, None, None, Some(&baseline))
        .unwrap();
    assert!(!check.is_healthy);
    assert_eq!(check.aggregated_health_state, HealthState::Error);
    assert_eq!(check.unhealthy_evaluations.len(), 1);
    assert_eq!(check.unhealthy_evaluations[0].kind(), EvaluationKind::Nodes);
}

#[test]
fn warning_nodes_do_not_fail_their_upgrade_domain() {
    let builder = ClusterBuilder::new()
        .node("N1", "UD0", HealthState::Warning)
        .node("N2", "UD0", HealthState::Ok);
    let engine = engine(builder, HealthConfig::default());
    let check = engine
        .check_cluster_upgrade_health(&uds(&["UD0"]), None, None, None, None)
        .unwrap();
    assert!(check.is_healthy);
    assert_eq!(check.aggregated_health_state, HealthState::Warning);
    assert!(check.unhealthy_evaluations.is_empty());
}

#[test]
fn upgrade_domains_use_node_percent_without_baseline() {
    let mut config = HealthConfig::default();
    config.cluster_policy.max_percent_unhealthy_nodes = p(20);
    let engine = engine(ten_nodes(&[0, 5]), config);

    // Outside an upgrade only the global 20% is checked.
    let health = engine.get_cluster_health(&ClusterHealthQuery::default()).unwrap();
    assert_eq!(health.aggregated_health_state, HealthState::Ok);

    let check = engine
        .check_cluster_upgrade_health(&uds(&["UD0", "UD1"]), None, None, None, None)
        .unwrap();
    assert!(!check.is_healthy);
    assert_eq!(check.unhealthy_evaluations.len(), 1);
    let evaluation = &check.unhealthy_evaluations[0];
    assert_eq!(evaluation.kind(), EvaluationKind::UpgradeDomainNodes);
    assert_eq!(evaluation.total_count(), Some(2));
    assert!(evaluation.description().contains("UpgradeDomain='UD0'"));
    assert!(evaluation.description().contains("(2/2)"));

    // Domains that are not listed are not checked on their own.
    let check = engine
        .check_cluster_upgrade_health(&uds(&["UD1", "UD2"]), None, None, None, None)
        .unwrap();
    assert!(check.is_healthy);
}

#[test]
fn deployed_applications_are_checked_per_upgrade_domain() {
    let mut config = HealthConfig::default();
    config.application_policy.max_percent_unhealthy_deployed_applications = p(40);
    let builder = ClusterBuilder::new()
        .node("N1", "UD0", HealthState::Ok)
        .node("N2", "UD0", HealthState::Ok)
        .node("N3", "UD1", HealthState::Ok)
        .node("N4", "UD1", HealthState::Ok)
        .application("fabric:/App", "AppType", HealthState::Ok)
        .deployed_application("fabric:/App", "N1", HealthState::Error)
        .deployed_application("fabric:/App", "N2", HealthState::Ok)
        .deployed_application("fabric:/App", "N3", HealthState::Ok)
        .deployed_application("fabric:/App", "N4", HealthState::Ok);
    let engine = engine(builder, config);

    // 1 of 4 overall is within 40%.
    let health = engine.get_cluster_health(&ClusterHealthQuery::default()).unwrap();
    assert_eq!(health.aggregated_health_state, HealthState::Ok);

    let check = engine
        .check_cluster_upgrade_health(&uds(&["UD0", "UD1"]), None, None, None, None)
        .unwrap();
    assert!(!check.is_healthy);
    let applications = &check.unhealthy_evaluations[0];
    assert_eq!(applications.kind(), EvaluationKind::Applications);
    let application = &applications.unhealthy_evaluations()[0];
    assert_eq!(application.kind(), EvaluationKind::Application);
    let per_domain = &application.unhealthy_evaluations()[0];
    assert_eq!(per_domain.kind(), EvaluationKind::UpgradeDomainDeployedApplications);
    assert!(per_domain.description().contains("UpgradeDomain='UD0'"));
    assert!(per_domain.description().contains("(1/2)"));
}

// --- Application types ---

#[test]
fn applications_without_type_fail_the_check() {
    let builder = ten_nodes(&[])
        .application("fabric:/Typed", "AppType", HealthState::Ok)
        .untyped_application("fabric:/NoTypeB", HealthState::Ok)
        .untyped_application("fabric:/NoTypeA", HealthState::Ok)
        .user_report(
            EntityId::application(AD_HOC_APPLICATION_NAME),
            "Watchdog",
            "Load",
            HealthState::Ok,
        );
    let engine = engine(builder, HealthConfig::default());

    let err = engine
        .check_cluster_upgrade_health(&all_uds(), None, None, None, None)
        .unwrap_err();
    match err {
        HealthError::ApplicationTypeNotFound { applications } => {
            assert_eq!(applications, vec!["fabric:/NoTypeA".to_string(), "fabric:/NoTypeB".to_string()]);
        }
        other => panic!("unexpected error {other:?}"),
    }

    // Regular health queries still evaluate them.
    let health = engine.get_cluster_health(&ClusterHealthQuery::default()).unwrap();
    assert_eq!(health.aggregated_health_state, HealthState::Ok);
}

// --- Baseline capture ---

#[test]
fn captured_snapshot_counts_error_nodes() {
    let engine = engine(ten_nodes(&[0, 5, 1]), HealthConfig::default());
    let snapshot = engine
        .capture_upgrade_snapshot(&uds(&["UD0", "UD1", "UD2", "UD9"]))
        .unwrap();

    assert!(snapshot.is_valid());
    assert_eq!(snapshot.global_unhealthy_state(), state(3, 10));
    assert_eq!(snapshot.try_get_upgrade_domain_entry("UD0"), Some(state(2, 2)));
    assert_eq!(snapshot.try_get_upgrade_domain_entry("UD1"), Some(state(1, 2)));
    assert_eq!(snapshot.try_get_upgrade_domain_entry("UD2"), Some(state(0, 2)));
    assert_eq!(snapshot.try_get_upgrade_domain_entry("UD9"), Some(state(0, 0)));
    assert_eq!(snapshot.try_get_upgrade_domain_entry("UD3"), None);
}

#[test]
fn unchanged_cluster_passes_against_its_own_baseline() {
    let engine = engine(ten_nodes(&[0, 5, 1]), HealthConfig::default());
    let baseline = engine.capture_upgrade_snapshot(&all_uds()).unwrap();
    let strict = ClusterUpgradeHealthPolicy::new(p(0), p(0));
    let cluster_policy = lenient_nodes();

    let check = engine
        .check_cluster_upgrade_health(&all_uds(), Some(&cluster_policy), Some(&strict), None, Some(&baseline))
        .unwrap();
    assert!(check.is_healthy);
}
