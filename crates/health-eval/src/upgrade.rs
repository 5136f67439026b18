//! Cluster upgrade health check and baseline capture.

use std::collections::BTreeMap;

use health_core::config::ClusterUpgradeHealthPolicy;
use health_core::errors::{EvaluationError, HealthError, HealthResult};
use health_core::models::{
    ClusterUpgradeHealthCheck, ClusterUpgradeStateSnapshot, EntityKind, HealthState, UnhealthyState,
};
use health_entities::EntityNode;
use health_observability::tracing_setup::events as trace;
use health_observability::upgrade_check_span;

use crate::evaluator::{trim_evaluations, HealthEvaluator, UpgradeContext};

/// Decide whether the cluster may continue upgrading.
///
/// The evaluator's upgrade domains drive the per-domain checks. Fails with
/// [`HealthError::ApplicationTypeNotFound`] when any application other than
/// the system and ad-hoc ones has no type, listing all of them.
pub fn check_cluster_upgrade_health(
    evaluator: &HealthEvaluator<'_>,
    upgrade_policy: &ClusterUpgradeHealthPolicy,
    baseline: Option<&ClusterUpgradeStateSnapshot>,
) -> HealthResult<ClusterUpgradeHealthCheck> {
    let _span = upgrade_check_span!(evaluator.upgrade_domains().len(), baseline.is_some()).entered();
    let context = UpgradeContext {
        upgrade_policy,
        baseline,
    };
    let cluster = evaluator.evaluate_cluster(Some(&context))?;

    if !cluster.applications_without_type.is_empty() {
        trace::applications_missing_type(&cluster.applications_without_type);
        return Err(HealthError::ApplicationTypeNotFound {
            applications: cluster.applications_without_type,
        });
    }

    let is_healthy = cluster.state != HealthState::Error;
    let mut unhealthy_evaluations = if is_healthy {
        Vec::new()
    } else {
        cluster.unhealthy_evaluations
    };
    if !is_healthy && unhealthy_evaluations.is_empty() {
        return Err(EvaluationError::MissingEvaluations { state: cluster.state }.into());
    }
    trim_evaluations(&mut unhealthy_evaluations, evaluator.config());
    trace::upgrade_check_completed(cluster.state, is_healthy);

    Ok(ClusterUpgradeHealthCheck {
        is_healthy,
        aggregated_health_state: cluster.state,
        unhealthy_evaluations,
    })
}

/// Record current node error counts, globally and for each listed
/// upgrade domain.
pub fn capture_upgrade_snapshot(evaluator: &HealthEvaluator<'_>) -> HealthResult<ClusterUpgradeStateSnapshot> {
    let nodes: Vec<&EntityNode> = evaluator
        .snapshot()
        .entities_of_kind(EntityKind::Node)
        .filter(|n| n.is_visible_to_parent())
        .collect();

    let mut global = UnhealthyState::default();
    let mut per_domain: BTreeMap<String, UnhealthyState> = evaluator
        .upgrade_domains()
        .iter()
        .map(|ud| (ud.clone(), UnhealthyState::default()))
        .collect();
    for (node, result) in evaluator.evaluate_all(nodes)? {
        let is_error = result.state == HealthState::Error;
        global.record(is_error);
        if let Some(state) = node.upgrade_domain().and_then(|ud| per_domain.get_mut(ud)) {
            state.record(is_error);
        }
    }
    Ok(ClusterUpgradeStateSnapshot::new(global, per_domain))
}
