//! Per-kind evaluation below the cluster.

use std::collections::BTreeMap;

use health_core::config::Percent;
use health_core::errors::{EvaluationError, HealthResult};
use health_core::models::{
    ChildHealthState, EntityId, EntityKind, HealthEvaluation, HealthState, HealthStateCountMap,
};
use health_entities::EntityNode;
use health_observability::tracing_setup::events as trace;

use super::{EntityHealthResult, HealthEvaluator, Verdict};
use crate::events::evaluate_events;
use crate::group::GroupHealthStateCount;

/// Direct children seen by a parent plus the counts of their subtrees.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    children: Vec<ChildHealthState>,
    statistics: HealthStateCountMap,
}

impl Tally {
    pub(crate) fn record(&mut self, result: &EntityHealthResult) {
        self.statistics.add(result.entity.kind(), result.state);
        self.statistics.append_map(&result.statistics);
        self.children.push(ChildHealthState {
            entity: result.entity.clone(),
            aggregated_health_state: result.state,
        });
    }

    pub(crate) fn finish(self, entity: &EntityId, verdict: Verdict) -> EntityHealthResult {
        let (state, unhealthy_evaluations) = verdict.into_parts();
        EntityHealthResult {
            entity: entity.clone(),
            state,
            unhealthy_evaluations,
            children: self.children,
            statistics: self.statistics,
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<ChildHealthState>, HealthStateCountMap) {
        (self.children, self.statistics)
    }
}

/// Threshold check over the children of one kind.
pub(crate) fn children_evaluation(
    parent: &EntityId,
    kind: EntityKind,
    max_percent_unhealthy: Percent,
    results: Vec<(&EntityNode, EntityHealthResult)>,
    tally: &mut Tally,
) -> Result<Option<HealthEvaluation>, EvaluationError> {
    let mut group = GroupHealthStateCount::new(max_percent_unhealthy);
    for (_, result) in results {
        tally.record(&result);
        group.add(result.entity, result.state, result.unhealthy_evaluations);
    }
    log_group(parent, kind, &group);
    group.into_evaluation(|state, evaluations, unhealthy, total, max| {
        HealthEvaluation::children(kind, state, evaluations, unhealthy, total, max)
    })
}

pub(crate) fn log_group(parent: &EntityId, kind: EntityKind, group: &GroupHealthStateCount) {
    trace::children_state(
        parent,
        kind,
        group.unhealthy_count(),
        group.total_count(),
        group.max_percent_unhealthy().value(),
        group.health_state(),
    );
}

impl<'a> HealthEvaluator<'a> {
    /// Events only: nodes, replicas and deployed service packages.
    pub(crate) fn evaluate_leaf(&self, node: &'a EntityNode, consider_warning_as_error: bool) -> EntityHealthResult {
        let events = evaluate_events(node, consider_warning_as_error, self.config, self.snapshot.taken_at());
        Tally::default().finish(&node.id, Verdict::new(events.state, events.reason))
    }

    /// Events, then replicas against the service type's per-partition limit.
    pub(crate) fn evaluate_partition(&self, node: &'a EntityNode) -> HealthResult<EntityHealthResult> {
        let policy = self.application_policy_for(node);
        let events = evaluate_events(node, policy.consider_warning_as_error, self.config, self.snapshot.taken_at());
        if events.state == HealthState::Unknown {
            return Ok(EntityHealthResult::unknown(node.id.clone()));
        }
        let max = policy
            .service_type_policy(self.service_type_of(node))
            .max_percent_unhealthy_replicas_per_partition;

        let mut tally = Tally::default();
        let mut verdict = Verdict::new(events.state, events.reason);
        let replicas = self.evaluate_children(node, EntityKind::Replica)?;
        verdict.consider(children_evaluation(&node.id, EntityKind::Replica, max, replicas, &mut tally)?);
        Ok(tally.finish(&node.id, verdict))
    }

    /// Events, then partitions against the service type's limit.
    pub(crate) fn evaluate_service(&self, node: &'a EntityNode) -> HealthResult<EntityHealthResult> {
        let policy = self.application_policy_for(node);
        let events = evaluate_events(node, policy.consider_warning_as_error, self.config, self.snapshot.taken_at());
        if events.state == HealthState::Unknown {
            return Ok(EntityHealthResult::unknown(node.id.clone()));
        }
        let max = policy
            .service_type_policy(node.service_type_name())
            .max_percent_unhealthy_partitions_per_service;

        let mut tally = Tally::default();
        let mut verdict = Verdict::new(events.state, events.reason);
        let partitions = self.evaluate_children(node, EntityKind::Partition)?;
        verdict.consider(children_evaluation(&node.id, EntityKind::Partition, max, partitions, &mut tally)?);
        Ok(tally.finish(&node.id, verdict))
    }

    /// Events, then deployed service packages, none of which may be unhealthy.
    pub(crate) fn evaluate_deployed_application(&self, node: &'a EntityNode) -> HealthResult<EntityHealthResult> {
        let policy = self.application_policy_for(node);
        let events = evaluate_events(node, policy.consider_warning_as_error, self.config, self.snapshot.taken_at());
        if events.state == HealthState::Unknown {
            return Ok(EntityHealthResult::unknown(node.id.clone()));
        }

        let mut tally = Tally::default();
        let mut verdict = Verdict::new(events.state, events.reason);
        let packages = self.evaluate_children(node, EntityKind::DeployedServicePackage)?;
        verdict.consider(children_evaluation(
            &node.id,
            EntityKind::DeployedServicePackage,
            Percent::ZERO,
            packages,
            &mut tally,
        )?);
        Ok(tally.finish(&node.id, verdict))
    }

    /// Events, services per service type, deployed applications, then
    /// deployed applications per upgrade domain when upgrade domains are set.
    pub(crate) fn evaluate_application(&self, node: &'a EntityNode) -> HealthResult<EntityHealthResult> {
        let policy = self.application_policy_for(node);
        let events = evaluate_events(node, policy.consider_warning_as_error, self.config, self.snapshot.taken_at());
        if events.state == HealthState::Unknown {
            return Ok(EntityHealthResult::unknown(node.id.clone()));
        }

        let mut tally = Tally::default();
        let mut verdict = Verdict::new(events.state, events.reason);

        // Services with their own type policy are checked per type; the rest together.
        let mut by_type: BTreeMap<Option<String>, Vec<(&EntityNode, EntityHealthResult)>> = BTreeMap::new();
        for (service, result) in self.evaluate_children(node, EntityKind::Service)? {
            let key = service
                .service_type_name()
                .filter(|name| policy.service_type_health_policies.contains_key(*name))
                .map(str::to_string);
            by_type.entry(key).or_default().push((service, result));
        }
        for (service_type, results) in by_type {
            let max = policy
                .service_type_policy(service_type.as_deref())
                .max_percent_unhealthy_services;
            let mut group = GroupHealthStateCount::new(max);
            for (_, result) in results {
                tally.record(&result);
                group.add(result.entity, result.state, result.unhealthy_evaluations);
            }
            log_group(&node.id, EntityKind::Service, &group);
            verdict.consider(group.into_evaluation(|state, evaluations, unhealthy, total, max| {
                HealthEvaluation::services(service_type, state, evaluations, unhealthy, total, max)
            })?);
        }

        let deployed = self.evaluate_children(node, EntityKind::DeployedApplication)?;
        let max = policy.max_percent_unhealthy_deployed_applications;
        let per_domain = self.deployed_applications_per_upgrade_domain(&node.id, max, &deployed)?;
        verdict.consider(children_evaluation(
            &node.id,
            EntityKind::DeployedApplication,
            max,
            deployed,
            &mut tally,
        )?);
        for evaluation in per_domain {
            verdict.consider(Some(evaluation));
        }
        Ok(tally.finish(&node.id, verdict))
    }

    /// One threshold check per configured upgrade domain, over the deployed
    /// applications whose node sits in that domain.
    fn deployed_applications_per_upgrade_domain(
        &self,
        application: &EntityId,
        max: Percent,
        deployed: &[(&EntityNode, EntityHealthResult)],
    ) -> Result<Vec<HealthEvaluation>, EvaluationError> {
        let mut evaluations = Vec::new();
        for upgrade_domain in self.upgrade_domains {
            let mut group = GroupHealthStateCount::new(max);
            for (node, result) in deployed {
                if self.upgrade_domain_of_deployment(node) == Some(upgrade_domain.as_str()) {
                    group.add(result.entity.clone(), result.state, result.unhealthy_evaluations.clone());
                }
            }
            log_group(application, EntityKind::DeployedApplication, &group);
            let evaluation = group.into_error_evaluation(|state, children, unhealthy, total, max| {
                HealthEvaluation::upgrade_domain_deployed_applications(
                    upgrade_domain.as_str(),
                    state,
                    children,
                    unhealthy,
                    total,
                    max,
                )
            })?;
            evaluations.extend(evaluation);
        }
        Ok(evaluations)
    }

    /// Upgrade domain of the node a deployed application runs on.
    fn upgrade_domain_of_deployment(&self, deployed: &EntityNode) -> Option<&'a str> {
        let EntityId::DeployedApplication { node_name, .. } = &deployed.id else {
            return None;
        };
        self.snapshot
            .get(&EntityId::node(node_name.as_str()))
            .and_then(EntityNode::upgrade_domain)
    }
}
