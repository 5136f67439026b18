//! Event evaluation: an entity's own contribution to its health.

use chrono::{DateTime, Utc};
use health_core::config::EvaluationConfig;
use health_core::constants::{AUTHORITY_REPORT_PROPERTY, HEALTH_REPORT_COUNT_PROPERTY, HM_SOURCE};
use health_core::models::{authority_sources, HealthEvaluation, HealthEvent, HealthState};
use health_entities::EntityNode;

/// State derived from an entity's events and the event to blame for it.
#[derive(Debug, Clone)]
pub struct EventsEvaluation {
    pub state: HealthState,
    /// Set whenever `state` is Warning or Error.
    pub reason: Option<HealthEvaluation>,
}

/// State an event contributes: expired events count as Error.
pub fn effective_state(event: &HealthEvent, consider_warning_as_error: bool) -> HealthState {
    if event.is_expired {
        HealthState::Error
    } else {
        event.state.promote(consider_warning_as_error)
    }
}

/// Evaluate `node`'s current events.
///
/// No events means Unknown. Otherwise the worst effective state wins and
/// the blamed event is the one whose own state drove it, most recent
/// transition first. Events generated on the entity's behalf (missing
/// authority report, too many reports) only take over when strictly worse.
pub fn evaluate_events(
    node: &EntityNode,
    consider_warning_as_error: bool,
    config: &EvaluationConfig,
    now: DateTime<Utc>,
) -> EventsEvaluation {
    if node.events.is_empty() {
        return EventsEvaluation {
            state: HealthState::Unknown,
            reason: None,
        };
    }

    let mut state = HealthState::Ok;
    let mut blamed: Option<&HealthEvent> = None;
    for event in &node.events {
        let effective = effective_state(event, consider_warning_as_error);
        if !effective.is_unhealthy() {
            continue;
        }
        let replace = match blamed {
            None => true,
            Some(current) => {
                effective.is_worse_than(state)
                    || (effective == state && blame_rank(event, effective) > blame_rank(current, state))
            }
        };
        if replace {
            state = effective;
            blamed = Some(event);
        }
    }
    let mut reason =
        blamed.map(|e| HealthEvaluation::event(state, e.clone(), consider_warning_as_error));

    for generated in generated_events(node, config, now) {
        let effective = generated.state.promote(consider_warning_as_error);
        if effective.is_worse_than(state) {
            state = effective;
            reason = Some(HealthEvaluation::event(effective, generated, consider_warning_as_error));
        }
    }

    EventsEvaluation { state, reason }
}

/// Prefer events reported in the blamed state over expired or promoted
/// ones, then the most recent transition.
fn blame_rank(event: &HealthEvent, effective: HealthState) -> (bool, bool, DateTime<Utc>) {
    (
        event.state == effective,
        !event.is_expired,
        event.last_transition_at(),
    )
}

fn generated_events(node: &EntityNode, config: &EvaluationConfig, now: DateTime<Utc>) -> Vec<HealthEvent> {
    let kind = node.kind();
    let mut generated = Vec::new();
    if node.expects_system_report()
        && !node.events.iter().any(|e| e.priority(kind).is_authority())
    {
        generated.push(generated_event(
            AUTHORITY_REPORT_PROPERTY,
            HealthState::Error,
            format!(
                "No report from {} has been received for this entity.",
                authority_sources(kind).join(" or ")
            ),
            now,
        ));
    }
    let count = node.events.len();
    if count > config.max_suggested_reports_per_entity {
        generated.push(generated_event(
            HEALTH_REPORT_COUNT_PROPERTY,
            HealthState::Warning,
            format!(
                "The entity has {count} health reports, more than the suggested maximum of {}.",
                config.max_suggested_reports_per_entity
            ),
            now,
        ));
    }
    generated
}

fn generated_event(property: &str, state: HealthState, description: String, now: DateTime<Utc>) -> HealthEvent {
    HealthEvent {
        source_id: HM_SOURCE.to_string(),
        property: property.to_string(),
        state,
        description,
        sequence_number: 0,
        time_to_live: None,
        remove_when_expired: false,
        source_utc_timestamp: now,
        last_modified_utc_timestamp: now,
        last_ok_transition_at: None,
        last_warning_transition_at: (state == HealthState::Warning).then_some(now),
        last_error_transition_at: (state == HealthState::Error).then_some(now),
        is_expired: false,
    }
}
