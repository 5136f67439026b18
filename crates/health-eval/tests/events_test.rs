use chrono::{DateTime, Duration, Utc};
use health_core::config::EvaluationConfig;
use health_core::constants::{AUTHORITY_REPORT_PROPERTY, HEALTH_REPORT_COUNT_PROPERTY, HM_SOURCE};
use health_core::models::{EntityAttributes, EntityId, EvaluationKind, HealthEvent, HealthState};
use health_entities::EntityNode;
use health_eval::events::{effective_state, evaluate_events};

fn event(source: &str, property: &str, state: HealthState, at: DateTime<Utc>) -> HealthEvent {
    HealthEvent {
        source_id: source.into(),
        property: property.into(),
        state,
        description: String::new(),
        sequence_number: 1,
        time_to_live: None,
        remove_when_expired: false,
        source_utc_timestamp: at,
        last_modified_utc_timestamp: at,
        last_ok_transition_at: (state == HealthState::Ok).then_some(at),
        last_warning_transition_at: (state == HealthState::Warning).then_some(at),
        last_error_transition_at: (state == HealthState::Error).then_some(at),
        is_expired: false,
    }
}

fn node_with(events: Vec<HealthEvent>) -> EntityNode {
    EntityNode::new(EntityId::node("N1"), EntityAttributes::new(), events)
}

fn authority(now: DateTime<Utc>) -> HealthEvent {
    event("System.FM", "State", HealthState::Ok, now)
}

#[test]
fn single_ok_authority_event_is_ok() {
    let now = Utc::now();
    let result = evaluate_events(&node_with(vec![authority(now)]), false, &EvaluationConfig::default(), now);
    assert_eq!(result.state, HealthState::Ok);
    assert!(result.reason.is_none());
}

#[test]
fn no_events_is_unknown() {
    let result = evaluate_events(&node_with(Vec::new()), false, &EvaluationConfig::default(), Utc::now());
    assert_eq!(result.state, HealthState::Unknown);
    assert!(result.reason.is_none());
}

#[test]
fn worst_event_is_blamed() {
    let now = Utc::now();
    let node = node_with(vec![
        authority(now),
        event("Watchdog", "Memory", HealthState::Warning, now),
        event("Watchdog", "Disk", HealthState::Error, now),
    ]);
    let result = evaluate_events(&node, false, &EvaluationConfig::default(), now);
    assert_eq!(result.state, HealthState::Error);
    let reason = result.reason.unwrap();
    assert_eq!(reason.kind(), EvaluationKind::Event);
    assert_eq!(reason.unhealthy_event().unwrap().property, "Disk");
}

#[test]
fn warning_is_promoted_under_consider_warning_as_error() {
    let now = Utc::now();
    let node = node_with(vec![authority(now), event("Watchdog", "Memory", HealthState::Warning, now)]);

    let relaxed = evaluate_events(&node, false, &EvaluationConfig::default(), now);
    assert_eq!(relaxed.state, HealthState::Warning);

    let strict = evaluate_events(&node, true, &EvaluationConfig::default(), now);
    assert_eq!(strict.state, HealthState::Error);
    let reason = strict.reason.unwrap();
    assert_eq!(reason.unhealthy_event().unwrap().state, HealthState::Warning);
    assert!(reason.description().contains("ConsiderWarningAsError=true"));
}

#[test]
fn expired_event_counts_as_error() {
    let now = Utc::now();
    let mut stale = event("Watchdog", "Heartbeat", HealthState::Ok, now - Duration::minutes(10));
    stale.is_expired = true;
    assert_eq!(effective_state(&stale, false), HealthState::Error);

    let result = evaluate_events(&node_with(vec![authority(now), stale]), false, &EvaluationConfig::default(), now);
    assert_eq!(result.state, HealthState::Error);
    assert!(result.reason.unwrap().description().contains("IsExpired=true"));
}

#[test]
fn reported_error_is_blamed_ahead_of_expired_event() {
    let now = Utc::now();
    let mut expired = event("Watchdog", "Heartbeat", HealthState::Ok, now);
    expired.is_expired = true;
    let error = event("Watchdog", "Disk", HealthState::Error, now - Duration::hours(1));
    let result = evaluate_events(&node_with(vec![authority(now), expired, error]), false, &EvaluationConfig::default(), now);
    assert_eq!(result.reason.unwrap().unhealthy_event().unwrap().property, "Disk");
}

#[test]
fn most_recent_transition_breaks_ties() {
    let now = Utc::now();
    let older = event("Watchdog", "Disk", HealthState::Error, now - Duration::minutes(5));
    let newer = event("Watchdog", "Network", HealthState::Error, now - Duration::minutes(1));
    let result = evaluate_events(&node_with(vec![authority(now), older, newer]), false, &EvaluationConfig::default(), now);
    assert_eq!(result.reason.unwrap().unhealthy_event().unwrap().property, "Network");
}

#[test]
fn missing_authority_report_generates_error() {
    let now = Utc::now();
    let node = node_with(vec![event("Watchdog", "Disk", HealthState::Ok, now)]);
    let result = evaluate_events(&node, false, &EvaluationConfig::default(), now);
    assert_eq!(result.state, HealthState::Error);
    let blamed = result.reason.unwrap().unhealthy_event().cloned().unwrap();
    assert_eq!(blamed.source_id, HM_SOURCE);
    assert_eq!(blamed.property, AUTHORITY_REPORT_PROPERTY);
}

#[test]
fn entities_without_authority_need_no_system_report() {
    let now = Utc::now();
    let system_app = EntityNode::new(
        EntityId::application("fabric:/System"),
        EntityAttributes::new(),
        vec![event("Watchdog", "Load", HealthState::Ok, now)],
    );
    let result = evaluate_events(&system_app, false, &EvaluationConfig::default(), now);
    assert_eq!(result.state, HealthState::Ok);
}

#[test]
fn too_many_reports_generates_warning() {
    let now = Utc::now();
    let config = EvaluationConfig {
        max_suggested_reports_per_entity: 2,
        ..EvaluationConfig::default()
    };
    let node = node_with(vec![
        authority(now),
        event("Watchdog", "A", HealthState::Ok, now),
        event("Watchdog", "B", HealthState::Ok, now),
    ]);

    let result = evaluate_events(&node, false, &config, now);
    assert_eq!(result.state, HealthState::Warning);
    let blamed = result.reason.unwrap().unhealthy_event().cloned().unwrap();
    assert_eq!(blamed.property, HEALTH_REPORT_COUNT_PROPERTY);

    assert_eq!(evaluate_events(&node, true, &config, now).state, HealthState::Error);
}

#[test]
fn generated_event_does_not_replace_equal_reason() {
    let now = Utc::now();
    let config = EvaluationConfig {
        max_suggested_reports_per_entity: 1,
        ..EvaluationConfig::default()
    };
    let node = node_with(vec![authority(now), event("Watchdog", "Memory", HealthState::Warning, now)]);
    let result = evaluate_events(&node, false, &config, now);
    assert_eq!(result.state, HealthState::Warning);
    assert_eq!(result.reason.unwrap().unhealthy_event().unwrap().property, "Memory");
}
