use health_core::config::ObservabilityConfig;
use health_core::models::{EntityId, EntityKind, HealthState};
use health_observability::tracing_setup::{events, spans::names};
use health_observability::{evaluation_span, query_span, report_span, upgrade_check_span};

#[test]
fn init_is_idempotent() {
    let config = ObservabilityConfig::default();
    health_observability::init_tracing(&config);
    health_observability::init_tracing(&config);
    health_observability::init_tracing_with_filter("debug");
}

#[test]
fn span_macros_expand() {
    let node = EntityId::node("N1");
    let _a = report_span!(node, "System.FM").entered();
    let _b = evaluation_span!(node);
    let _c = upgrade_check_span!(3usize, true);
    let _d = query_span!("get_cluster_health");
}

#[test]
fn span_names_are_namespaced() {
    for name in [names::REPORT, names::EVALUATION, names::UPGRADE_CHECK, names::QUERY] {
        assert!(name.starts_with("health."), "{name}");
    }
}

#[test]
fn events_emit_without_subscriber() {
    let node = EntityId::node("N1");
    events::report_accepted(&node, "System.FM", "State", HealthState::Ok);
    events::stale_report_rejected(&node, "System.FM", 1, 2);
    events::entity_deleted(&node, 3);
    events::expired_events_removed(2);
    events::tombstones_purged(1);
    events::children_state(&EntityId::Cluster, EntityKind::Node, 1, 4, 0, HealthState::Error);
    events::delta_respected(None, 1, 10);
    events::delta_not_respected(Some("UD1"), 0, 3, 1, 3);
    events::upgrade_domain_unhealthy("UD1", 1, 3);
    events::system_application_unhealthy(HealthState::Warning);
    events::applications_missing_type(&["fabric:/A".to_string()]);
    events::upgrade_check_completed(HealthState::Ok, true);
}
