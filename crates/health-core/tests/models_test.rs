use chrono::Utc;
use health_core::models::*;
use health_core::Percent;
use uuid::Uuid;

fn event(source: &str, property: &str, state: HealthState) -> HealthEvent {
    let now = Utc::now();
    HealthEvent {
        source_id: source.into(),
        property: property.into(),
        state,
        description: String::new(),
        sequence_number: 1,
        time_to_live: None,
        remove_when_expired: false,
        source_utc_timestamp: now,
        last_modified_utc_timestamp: now,
        last_ok_transition_at: None,
        last_warning_transition_at: None,
        last_error_transition_at: None,
        is_expired: false,
    }
}

// --- Entity identities ---

#[test]
fn entity_id_serde_is_tagged_by_kind() {
    let id = EntityId::deployed_service_package("fabric:/App", "Pkg", "", "N1");
    let json = serde_json::to_value(&id).unwrap();
    assert_eq!(json["kind"], "deployed_service_package");
    let back: EntityId = serde_json::from_value(json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn hierarchy_parents_are_structural_where_the_id_allows() {
    let pid = Uuid::new_v4();
    assert_eq!(
        EntityId::replica(pid, 1).structural_parent(),
        Some(EntityId::partition(pid))
    );
    assert_eq!(
        EntityId::deployed_application("fabric:/App", "N1").structural_parent(),
        Some(EntityId::application("fabric:/App"))
    );
    assert_eq!(EntityId::node("N1").structural_parent(), Some(EntityId::Cluster));
    assert_eq!(EntityKind::Replica.parent_kind(), Some(EntityKind::Partition));
    assert_eq!(EntityKind::Cluster.parent_kind(), None);
}

// --- Priority ---

#[test]
fn authority_sources_per_kind() {
    assert_eq!(
        Priority::of(EntityKind::Node, "System.FM", "State"),
        Priority::Critical
    );
    assert_eq!(
        Priority::of(EntityKind::Node, "System.FM", "Other"),
        Priority::Higher
    );
    assert_eq!(
        Priority::of(EntityKind::Node, "System.RA", "State"),
        Priority::High
    );
    assert_eq!(
        Priority::of(EntityKind::Replica, "System.RA", "State"),
        Priority::Critical
    );
    assert_eq!(
        Priority::of(EntityKind::DeployedApplication, "System.Hosting", "Activation"),
        Priority::Critical
    );
    assert_eq!(
        Priority::of(EntityKind::Application, "Watchdog", "State"),
        Priority::Normal
    );
}

// --- Evaluations ---

#[test]
fn evaluation_tree_survives_serde() {
    let leaf = HealthEvaluation::event(
        HealthState::Error,
        event("System.FM", "State", HealthState::Error),
        false,
    );
    let node = HealthEvaluation::entity(EntityId::node("N1"), HealthState::Error, vec![leaf]).unwrap();
    let nodes = HealthEvaluation::children(
        EntityKind::Node,
        HealthState::Error,
        vec![node],
        1,
        4,
        Percent::ZERO,
    )
    .unwrap();
    nodes.validate().unwrap();

    let json = serde_json::to_value(&nodes).unwrap();
    assert_eq!(json["kind"], "Nodes");
    let back: HealthEvaluation = serde_json::from_value(json).unwrap();
    assert_eq!(back, nodes);
    assert_eq!(back.kind(), EvaluationKind::Nodes);
    assert_eq!(back.total_count(), Some(4));
    assert_eq!(back.unhealthy_evaluations()[0].kind(), EvaluationKind::Node);
}

#[test]
fn application_type_filter_description() {
    let app = HealthEvaluation::entity(
        EntityId::application("fabric:/App1"),
        HealthState::Error,
        vec![HealthEvaluation::event(
            HealthState::Error,
            event("System.CM", "State", HealthState::Error),
            false,
        )],
    )
    .unwrap();
    let eval = HealthEvaluation::application_type_applications(
        "MyAppType",
        HealthState::Error,
        vec![app],
        1,
        5,
        Percent::new(10).unwrap(),
    )
    .unwrap();
    eval.validate().unwrap();
    let d = eval.description();
    assert!(d.contains("MyAppType"));
    assert!(d.contains("10"));
    assert!(d.contains('5'));
}

#[test]
fn singular_wrapper_rejects_cluster() {
    assert!(HealthEvaluation::entity(EntityId::Cluster, HealthState::Error, vec![]).is_err());
}

#[test]
fn services_key_is_optional_but_never_empty() {
    assert!(HealthEvaluation::services(
        None,
        HealthState::Error,
        vec![],
        1,
        2,
        Percent::ZERO
    )
    .is_ok());
    assert!(HealthEvaluation::services(
        Some(String::new()),
        HealthState::Error,
        vec![],
        1,
        2,
        Percent::ZERO
    )
    .is_err());
}

// --- Upgrade snapshot ---

#[test]
fn delta_boundary() {
    let baseline = ClusterUpgradeStateSnapshot::new(UnhealthyState::new(2, 10).unwrap(), Default::default());
    assert!(!baseline.is_global_delta_respected(3, 10, Percent::new(5).unwrap()));
    assert!(baseline.is_global_delta_respected(3, 10, Percent::new(10).unwrap()));
    assert!(baseline.is_global_delta_respected(3, 10, Percent::new(15).unwrap()));
}

#[test]
fn inconsistent_baseline_is_rejected() {
    assert!(UnhealthyState::new(3, 2).is_err());
    let raw = r#"{"error_count":5,"total_count":1}"#;
    assert!(serde_json::from_str::<UnhealthyState>(raw).is_err());
}

// --- Filters ---

#[test]
fn health_state_filter_serializes_as_bits() {
    let f = HealthStateFilter::WARNING | HealthStateFilter::ERROR;
    assert_eq!(serde_json::to_string(&f).unwrap(), "12");
    assert_eq!(f.bits(), 12);
}
