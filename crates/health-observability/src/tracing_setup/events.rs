//! Structured log events for the health engine.
//!
//! Each function emits a `tracing` event with structured fields.

use health_core::models::{EntityId, EntityKind, HealthState};

/// Log an accepted report.
pub fn report_accepted(entity: &EntityId, source_id: &str, property: &str, state: HealthState) {
    tracing::debug!(
        event = "report_accepted",
        entity = %entity,
        source_id = %source_id,
        property = %property,
        state = %state,
        "health report accepted"
    );
}

/// Log a report rejected for carrying an old sequence number.
pub fn stale_report_rejected(entity: &EntityId, source_id: &str, received: i64, current: i64) {
    tracing::debug!(
        event = "stale_report_rejected",
        entity = %entity,
        source_id = %source_id,
        received = received,
        current = current,
        "stale health report rejected"
    );
}

/// Log an entity tombstone and its cascade.
pub fn entity_deleted(entity: &EntityId, cascaded: usize) {
    tracing::info!(
        event = "entity_deleted",
        entity = %entity,
        cascaded = cascaded,
        "health entity deleted"
    );
}

/// Log expired events removed by cleanup.
pub fn expired_events_removed(count: usize) {
    tracing::debug!(
        event = "expired_events_removed",
        count = count,
        "expired health events removed"
    );
}

/// Log deleted entities dropped by cleanup.
pub fn tombstones_purged(count: usize) {
    tracing::debug!(
        event = "tombstones_purged",
        count = count,
        "deleted health entities dropped"
    );
}

/// Log the outcome of a children threshold check.
pub fn children_state(
    parent: &EntityId,
    kind: EntityKind,
    unhealthy: u64,
    total: u64,
    max_percent: u8,
    state: HealthState,
) {
    tracing::debug!(
        event = "children_state",
        parent = %parent,
        kind = %kind,
        unhealthy = unhealthy,
        total = total,
        max_percent = max_percent,
        state = %state,
        "children health evaluated"
    );
}

/// Log a delta check that passed.
pub fn delta_respected(upgrade_domain: Option<&str>, error_count: u64, total_count: u64) {
    tracing::debug!(
        event = "delta_respected",
        upgrade_domain = upgrade_domain.unwrap_or("*"),
        error_count = error_count,
        total_count = total_count,
        "unhealthy node delta within tolerance"
    );
}

/// Log a delta check that failed.
pub fn delta_not_respected(
    upgrade_domain: Option<&str>,
    baseline_error_count: u32,
    baseline_total_count: u32,
    error_count: u64,
    total_count: u64,
) {
    tracing::warn!(
        event = "delta_not_respected",
        upgrade_domain = upgrade_domain.unwrap_or("*"),
        baseline_error_count = baseline_error_count,
        baseline_total_count = baseline_total_count,
        error_count = error_count,
        total_count = total_count,
        "unhealthy node delta exceeded"
    );
}

/// Log an upgrade domain whose nodes are over the unhealthy threshold.
pub fn upgrade_domain_unhealthy(upgrade_domain: &str, unhealthy: u64, total: u64) {
    tracing::warn!(
        event = "upgrade_domain_unhealthy",
        upgrade_domain = %upgrade_domain,
        unhealthy = unhealthy,
        total = total,
        "upgrade domain unhealthy"
    );
}

/// Log an unhealthy system application.
pub fn system_application_unhealthy(state: HealthState) {
    tracing::warn!(
        event = "system_application_unhealthy",
        state = %state,
        "system application unhealthy"
    );
}

/// Log applications that could not be grouped by type.
pub fn applications_missing_type(applications: &[String]) {
    tracing::warn!(
        event = "applications_missing_type",
        applications = ?applications,
        "application type not found"
    );
}

/// Log the final result of an upgrade health check.
pub fn upgrade_check_completed(state: HealthState, is_healthy: bool) {
    tracing::info!(
        event = "upgrade_check_completed",
        state = %state,
        is_healthy = is_healthy,
        "cluster upgrade health check completed"
    );
}
