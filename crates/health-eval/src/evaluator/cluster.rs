//! Cluster evaluation: nodes, upgrade-domain and delta checks, applications.

use std::collections::BTreeMap;

use health_core::config::{ClusterUpgradeHealthPolicy, Percent};
use health_core::errors::{HealthError, HealthResult};
use health_core::models::{
    ChildHealthState, ClusterUpgradeStateSnapshot, EntityId, EntityKind, HealthEvaluation, HealthState,
    HealthStateCountMap,
};
use health_entities::EntityNode;
use health_observability::tracing_setup::events as trace;

use super::entities::{log_group, Tally};
use super::{ensure_contract, EntityHealthResult, HealthEvaluator, Verdict};
use crate::events::evaluate_events;
use crate::group::GroupHealthStateCount;

/// Extra inputs of an upgrade health check.
#[derive(Debug, Clone, Copy)]
pub struct UpgradeContext<'u> {
    pub upgrade_policy: &'u ClusterUpgradeHealthPolicy,
    /// Delta checks run only against a valid baseline.
    pub baseline: Option<&'u ClusterUpgradeStateSnapshot>,
}

impl<'u> UpgradeContext<'u> {
    fn valid_baseline(&self) -> Option<&'u ClusterUpgradeStateSnapshot> {
        self.baseline.filter(|b| b.is_valid())
    }
}

/// Cluster verdict together with the per-child views queries need.
#[derive(Debug, Clone)]
pub struct ClusterEvaluation {
    pub state: HealthState,
    pub unhealthy_evaluations: Vec<HealthEvaluation>,
    pub node_states: Vec<ChildHealthState>,
    pub application_states: Vec<ChildHealthState>,
    pub statistics: HealthStateCountMap,
    /// Applications that are neither system nor ad-hoc and carry no type.
    pub applications_without_type: Vec<String>,
}

impl ClusterEvaluation {
    pub fn into_entity_result(self) -> EntityHealthResult {
        let mut children = self.node_states;
        children.extend(self.application_states);
        EntityHealthResult {
            entity: EntityId::Cluster,
            state: self.state,
            unhealthy_evaluations: self.unhealthy_evaluations,
            children,
            statistics: self.statistics,
        }
    }
}

/// Nodes split by upgrade domain, counted alongside the global group.
struct UpgradeDomainGroups<'d> {
    groups: BTreeMap<&'d str, GroupHealthStateCount>,
}

impl<'d> UpgradeDomainGroups<'d> {
    fn new(upgrade_domains: &'d [String], max: Percent) -> Self {
        Self {
            groups: upgrade_domains
                .iter()
                .map(|ud| (ud.as_str(), GroupHealthStateCount::new(max)))
                .collect(),
        }
    }

    fn add(&mut self, node: &EntityNode, result: &EntityHealthResult) {
        if let Some(group) = node.upgrade_domain().and_then(|ud| self.groups.get_mut(ud)) {
            group.add(result.entity.clone(), result.state, result.unhealthy_evaluations.clone());
        }
    }
}

impl<'a> HealthEvaluator<'a> {
    /// Evaluate the whole cluster.
    ///
    /// With an upgrade context, configured upgrade domains are checked
    /// individually and, given a valid baseline, node-health deltas are
    /// checked globally and per upgrade domain.
    pub fn evaluate_cluster(&self, upgrade: Option<&UpgradeContext<'_>>) -> HealthResult<ClusterEvaluation> {
        let _span = health_observability::evaluation_span!(EntityId::Cluster).entered();
        let policy = self.cluster_policy;
        let cwae = policy.consider_warning_as_error;

        let (state, reason) = match self.snapshot.cluster() {
            Some(cluster) => {
                let events = evaluate_events(cluster, cwae, self.config, self.snapshot.taken_at());
                (events.state, events.reason)
            }
            None => (HealthState::Ok, None),
        };
        // A cluster without events of its own is still evaluated.
        let state = if state == HealthState::Unknown { HealthState::Ok } else { state };
        let mut verdict = Verdict::new(state, reason);

        // --- Nodes ---
        let nodes: Vec<&EntityNode> = self
            .snapshot
            .entities_of_kind(EntityKind::Node)
            .filter(|n| n.is_visible_to_parent())
            .collect();
        let mut node_tally = Tally::default();
        let mut node_group = GroupHealthStateCount::new(policy.max_percent_unhealthy_nodes);
        let domains: &[String] = if upgrade.is_some() { self.upgrade_domains } else { &[] };
        let mut per_domain = UpgradeDomainGroups::new(domains, policy.max_percent_unhealthy_nodes);
        for (node, result) in self.evaluate_all(nodes)? {
            node_tally.record(&result);
            per_domain.add(node, &result);
            node_group.add(result.entity, result.state, result.unhealthy_evaluations);
        }
        log_group(&EntityId::Cluster, EntityKind::Node, &node_group);

        let delta = match upgrade {
            Some(context) => self.global_delta(context, &node_group)?,
            None => None,
        };
        verdict.consider(node_group.into_evaluation(|state, evaluations, unhealthy, total, max| {
            HealthEvaluation::children(EntityKind::Node, state, evaluations, unhealthy, total, max)
        })?);
        verdict.consider(delta);

        // Upgrade domains are only looked at while the cluster is not already in Error.
        if let Some(context) = upgrade.filter(|_| verdict.state != HealthState::Error) {
            for evaluation in self.upgrade_domain_checks(context, per_domain)? {
                verdict.consider(Some(evaluation));
            }
        }

        // --- Applications ---
        let applications: Vec<&EntityNode> = self
            .snapshot
            .entities_of_kind(EntityKind::Application)
            .filter(|n| n.is_visible_to_parent())
            .collect();
        let mut app_tally = Tally::default();
        let mut system_application = None;
        let mut applications_without_type = Vec::new();
        let mut by_type: BTreeMap<String, GroupHealthStateCount> = BTreeMap::new();
        let mut app_group = GroupHealthStateCount::new(policy.max_percent_unhealthy_applications);

        for (application, result) in self.evaluate_all(applications)? {
            app_tally.record(&result);
            if application.id.is_system_application() {
                if result.state.is_unhealthy() {
                    trace::system_application_unhealthy(result.state);
                    system_application = Some(HealthEvaluation::system_application(
                        result.state,
                        result.unhealthy_evaluations,
                    ));
                }
                continue;
            }

            let application_type = application.application_type_name();
            if application_type.is_none() && !application.id.is_ad_hoc_application() {
                if let Some(name) = application.id.application_name() {
                    applications_without_type.push(name.to_string());
                }
            }
            let type_limit = application_type
                .filter(|_| self.config.enable_application_type_health_evaluation)
                .and_then(|name| policy.application_type_health_policy_map.get(name).map(|max| (name, *max)));
            match type_limit {
                Some((name, max)) => by_type
                    .entry(name.to_string())
                    .or_insert_with(|| GroupHealthStateCount::new(max))
                    .add(result.entity, result.state, result.unhealthy_evaluations),
                None => app_group.add(result.entity, result.state, result.unhealthy_evaluations),
            }
        }

        verdict.consider(system_application);
        for (application_type, group) in by_type {
            log_group(&EntityId::Cluster, EntityKind::Application, &group);
            verdict.consider(group.into_evaluation(|state, evaluations, unhealthy, total, max| {
                HealthEvaluation::application_type_applications(
                    application_type,
                    state,
                    evaluations,
                    unhealthy,
                    total,
                    max,
                )
            })?);
        }
        log_group(&EntityId::Cluster, EntityKind::Application, &app_group);
        verdict.consider(app_group.into_evaluation(|state, evaluations, unhealthy, total, max| {
            HealthEvaluation::children(EntityKind::Application, state, evaluations, unhealthy, total, max)
        })?);

        let (state, unhealthy_evaluations) = verdict.into_parts();
        ensure_contract(state, &unhealthy_evaluations)?;

        let (node_states, mut statistics) = node_tally.into_parts();
        let (application_states, application_statistics) = app_tally.into_parts();
        statistics.append_map(&application_statistics);

        Ok(ClusterEvaluation {
            state,
            unhealthy_evaluations,
            node_states,
            application_states,
            statistics,
            applications_without_type,
        })
    }

    /// Global node-health regression against the baseline.
    fn global_delta(
        &self,
        context: &UpgradeContext<'_>,
        nodes: &GroupHealthStateCount,
    ) -> HealthResult<Option<HealthEvaluation>> {
        let Some(baseline) = context.valid_baseline() else {
            return Ok(None);
        };
        let (errors, total) = (nodes.unhealthy_count(), nodes.total_count());
        let max = context.upgrade_policy.max_percent_delta_unhealthy_nodes;
        if total == 0 || baseline.is_global_delta_respected(errors, total, max) {
            trace::delta_respected(None, errors, total);
            return Ok(None);
        }
        let base = baseline.global_unhealthy_state();
        trace::delta_not_respected(None, base.error_count(), base.total_count(), errors, total);
        let evaluation = HealthEvaluation::delta_nodes_check(
            HealthState::Error,
            base,
            errors,
            total,
            max,
            nodes.unhealthy_evaluations()?,
        )?;
        Ok(Some(evaluation))
    }

    /// Per upgrade domain: the delta against the baseline when there is one,
    /// the plain node percentage otherwise.
    fn upgrade_domain_checks(
        &self,
        context: &UpgradeContext<'_>,
        per_domain: UpgradeDomainGroups<'_>,
    ) -> HealthResult<Vec<HealthEvaluation>> {
        let baseline = context.valid_baseline();
        let max_delta = context.upgrade_policy.max_percent_upgrade_domain_delta_unhealthy_nodes;
        let mut evaluations = Vec::new();

        for (upgrade_domain, group) in per_domain.groups {
            let (errors, total) = (group.unhealthy_count(), group.total_count());
            match baseline {
                Some(baseline) => {
                    let base = baseline.try_get_upgrade_domain_entry(upgrade_domain).ok_or_else(|| {
                        HealthError::UpgradeDomainNotInBaseline {
                            upgrade_domain: upgrade_domain.to_string(),
                        }
                    })?;
                    let respected = ClusterUpgradeStateSnapshot::is_delta_respected(
                        u64::from(base.error_count()),
                        u64::from(base.total_count()),
                        errors,
                        total,
                        max_delta,
                    );
                    if total == 0 || respected {
                        trace::delta_respected(Some(upgrade_domain), errors, total);
                        continue;
                    }
                    trace::delta_not_respected(
                        Some(upgrade_domain),
                        base.error_count(),
                        base.total_count(),
                        errors,
                        total,
                    );
                    evaluations.push(HealthEvaluation::upgrade_domain_delta_nodes_check(
                        upgrade_domain,
                        HealthState::Error,
                        base,
                        errors,
                        total,
                        max_delta,
                        group.unhealthy_evaluations()?,
                    )?);
                }
                None => {
                    let evaluation = group.into_error_evaluation(|state, children, unhealthy, total, max| {
                        HealthEvaluation::upgrade_domain_nodes(upgrade_domain, state, children, unhealthy, total, max)
                    })?;
                    if evaluation.is_some() {
                        trace::upgrade_domain_unhealthy(upgrade_domain, errors, total);
                    }
                    evaluations.extend(evaluation);
                }
            }
        }
        Ok(evaluations)
    }
}
