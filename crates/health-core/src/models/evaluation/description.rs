//! Human-readable evaluation descriptions.
//!
//! Operators and tests match on these strings, so every description embeds
//! the numbers that drove the decision: counts, totals, thresholds, and the
//! grouping key when there is one.

use crate::config::{percent_of, Percent};
use crate::models::{EntityId, EntityKind, HealthEvent, HealthState};

pub(crate) fn event(state: HealthState, event: &HealthEvent, consider_warning_as_error: bool) -> String {
    let mut s = format!(
        "{} event: SourceId='{}', Property='{}', HealthState={}",
        state, event.source_id, event.property, event.state
    );
    if event.is_expired {
        s.push_str(", IsExpired=true");
    }
    if consider_warning_as_error && event.state == HealthState::Warning {
        s.push_str(", ConsiderWarningAsError=true");
    }
    s.push('.');
    s
}

pub(crate) fn entity(entity: &EntityId, state: HealthState) -> String {
    let mut name = entity.to_string();
    if let Some(first) = name.get(..1) {
        let upper = first.to_uppercase();
        name.replace_range(..1, &upper);
    }
    format!("{name} is in {state}.")
}

fn policy_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Node => "MaxPercentUnhealthyNodes",
        EntityKind::Replica => "MaxPercentUnhealthyReplicasPerPartition",
        EntityKind::Partition => "MaxPercentUnhealthyPartitionsPerService",
        EntityKind::Service => "MaxPercentUnhealthyServices",
        EntityKind::Application => "MaxPercentUnhealthyApplications",
        EntityKind::DeployedApplication => "MaxPercentUnhealthyDeployedApplications",
        EntityKind::DeployedServicePackage => "MaxPercentUnhealthyDeployedServicePackages",
        EntityKind::Cluster => "MaxPercentUnhealthyClusters",
    }
}

pub(crate) fn children(
    kind: EntityKind,
    scope: Option<(&str, &str)>,
    unhealthy_count: u64,
    total_count: u64,
    max_percent_unhealthy: Percent,
) -> String {
    let scope = scope
        .map(|(field, value)| format!(" {field}='{value}',"))
        .unwrap_or_default();
    format!(
        "Unhealthy {}:{} {}% ({}/{}), {}={}.",
        kind.plural_name(),
        scope,
        percent_of(unhealthy_count, total_count),
        unhealthy_count,
        total_count,
        policy_name(kind),
        max_percent_unhealthy,
    )
}

pub(crate) fn system_application(state: HealthState) -> String {
    format!("The system application is in {state}.")
}

pub(crate) fn delta_nodes(
    upgrade_domain_name: Option<&str>,
    baseline_error_count: u32,
    baseline_total_count: u32,
    error_count: u64,
    total_count: u64,
    max_percent_delta_unhealthy_nodes: Percent,
) -> String {
    let (scope, policy) = match upgrade_domain_name {
        Some(ud) => (
            format!(" in upgrade domain '{ud}'"),
            "MaxPercentUpgradeDomainDeltaUnhealthyNodes",
        ),
        None => (String::new(), "MaxPercentDeltaUnhealthyNodes"),
    };
    format!(
        "Unhealthy nodes{}: Baseline error count: {}, Baseline total count: {} ({}%), \
         Current error count: {}, Current total count: {} ({}%), {}={}.",
        scope,
        baseline_error_count,
        baseline_total_count,
        percent_of(u64::from(baseline_error_count), u64::from(baseline_total_count)),
        error_count,
        total_count,
        percent_of(error_count, total_count),
        policy,
        max_percent_delta_unhealthy_nodes,
    )
}
