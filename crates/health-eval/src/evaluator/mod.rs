//! Recursive evaluation over a [`HealthSnapshot`].
//!
//! Every entity combines its own events with one threshold check per child
//! collection. A later reason replaces the current one only when it is
//! strictly worse, so an entity carries at most one unhealthy evaluation.
//! Siblings are evaluated on the rayon pool and joined before combining.

mod cluster;
mod entities;

pub use cluster::{ClusterEvaluation, UpgradeContext};

use health_core::config::{
    ApplicationHealthPolicy, ApplicationHealthPolicyMap, ClusterHealthPolicy, EvaluationConfig,
};
use health_core::errors::{EvaluationError, HealthResult};
use health_core::models::{
    check_state_matches_evaluations, ChildHealthState, EntityId, EntityKind, HealthEvaluation,
    HealthState, HealthStateCountMap,
};
use health_entities::{EntityNode, HealthSnapshot};
use rayon::prelude::*;

/// Outcome of evaluating one entity and its subtree.
#[derive(Debug, Clone)]
pub struct EntityHealthResult {
    pub entity: EntityId,
    pub state: HealthState,
    /// At most one evaluation; empty iff `state` is Ok or Unknown.
    pub unhealthy_evaluations: Vec<HealthEvaluation>,
    /// Aggregated states of the visible direct children.
    pub children: Vec<ChildHealthState>,
    /// Counts of every visible descendant, by kind.
    pub statistics: HealthStateCountMap,
}

impl EntityHealthResult {
    fn unknown(entity: EntityId) -> Self {
        Self {
            entity,
            state: HealthState::Unknown,
            unhealthy_evaluations: Vec::new(),
            children: Vec::new(),
            statistics: HealthStateCountMap::new(),
        }
    }
}

/// Running state and reason while an entity's checks are combined.
#[derive(Debug, Clone)]
pub(crate) struct Verdict {
    pub(crate) state: HealthState,
    pub(crate) reason: Option<HealthEvaluation>,
}

impl Verdict {
    pub(crate) fn new(state: HealthState, reason: Option<HealthEvaluation>) -> Self {
        Self { state, reason }
    }

    /// Take `candidate` only if it is strictly worse than what we have.
    pub(crate) fn consider(&mut self, candidate: Option<HealthEvaluation>) {
        if let Some(candidate) = candidate {
            let state = candidate.aggregated_health_state();
            if state.is_worse_than(self.state) {
                self.state = state;
                self.reason = Some(candidate);
            }
        }
    }

    pub(crate) fn into_parts(self) -> (HealthState, Vec<HealthEvaluation>) {
        (self.state, self.reason.into_iter().collect())
    }
}

/// Read-only evaluator bound to one snapshot and one set of policies.
#[derive(Debug, Clone, Copy)]
pub struct HealthEvaluator<'a> {
    snapshot: &'a HealthSnapshot,
    config: &'a EvaluationConfig,
    cluster_policy: &'a ClusterHealthPolicy,
    default_application_policy: &'a ApplicationHealthPolicy,
    application_policies: Option<&'a ApplicationHealthPolicyMap>,
    application_policy_override: Option<&'a ApplicationHealthPolicy>,
    upgrade_domains: &'a [String],
}

impl<'a> HealthEvaluator<'a> {
    pub fn new(
        snapshot: &'a HealthSnapshot,
        config: &'a EvaluationConfig,
        cluster_policy: &'a ClusterHealthPolicy,
        default_application_policy: &'a ApplicationHealthPolicy,
    ) -> Self {
        Self {
            snapshot,
            config,
            cluster_policy,
            default_application_policy,
            application_policies: None,
            application_policy_override: None,
            upgrade_domains: &[],
        }
    }

    /// Per-application policies; applications without an entry use the default.
    pub fn with_application_policies(mut self, policies: Option<&'a ApplicationHealthPolicyMap>) -> Self {
        self.application_policies = policies;
        self
    }

    /// One policy for every application, ahead of the per-application map.
    pub fn with_application_policy_override(mut self, policy: Option<&'a ApplicationHealthPolicy>) -> Self {
        self.application_policy_override = policy;
        self
    }

    /// Upgrade domains whose deployed applications are checked separately.
    pub fn with_upgrade_domains(mut self, upgrade_domains: &'a [String]) -> Self {
        self.upgrade_domains = upgrade_domains;
        self
    }

    pub fn snapshot(&self) -> &'a HealthSnapshot {
        self.snapshot
    }

    pub fn config(&self) -> &'a EvaluationConfig {
        self.config
    }

    pub fn cluster_policy(&self) -> &'a ClusterHealthPolicy {
        self.cluster_policy
    }

    pub fn upgrade_domains(&self) -> &'a [String] {
        self.upgrade_domains
    }

    // --- Entry points ---

    /// Evaluate the entity with identity `entity`, if the snapshot has it.
    pub fn evaluate(&self, entity: &EntityId) -> HealthResult<Option<EntityHealthResult>> {
        if *entity == EntityId::Cluster {
            let cluster = self.evaluate_cluster(None)?;
            return Ok(Some(cluster.into_entity_result()));
        }
        self.snapshot
            .get(entity)
            .map(|node| self.evaluate_entity(node))
            .transpose()
    }

    /// Evaluate one non-cluster entity and its subtree.
    pub fn evaluate_entity(&self, node: &'a EntityNode) -> HealthResult<EntityHealthResult> {
        let _span = health_observability::evaluation_span!(node.id).entered();
        let result = match node.kind() {
            EntityKind::Node => self.evaluate_leaf(node, self.cluster_policy.consider_warning_as_error),
            EntityKind::Replica | EntityKind::DeployedServicePackage => {
                let cwae = self.application_policy_for(node).consider_warning_as_error;
                self.evaluate_leaf(node, cwae)
            }
            EntityKind::Partition => self.evaluate_partition(node)?,
            EntityKind::Service => self.evaluate_service(node)?,
            EntityKind::Application => self.evaluate_application(node)?,
            EntityKind::DeployedApplication => self.evaluate_deployed_application(node)?,
            EntityKind::Cluster => self.evaluate_cluster(None)?.into_entity_result(),
        };
        ensure_contract(result.state, &result.unhealthy_evaluations)?;
        Ok(result)
    }

    /// Evaluate siblings in parallel, keeping their identity order.
    pub(crate) fn evaluate_all(
        &self,
        nodes: Vec<&'a EntityNode>,
    ) -> HealthResult<Vec<(&'a EntityNode, EntityHealthResult)>> {
        nodes
            .into_par_iter()
            .map(|node| self.evaluate_entity(node).map(|result| (node, result)))
            .collect()
    }

    /// Evaluate the visible children of `parent` with the given kind.
    pub(crate) fn evaluate_children(
        &self,
        parent: &'a EntityNode,
        kind: EntityKind,
    ) -> HealthResult<Vec<(&'a EntityNode, EntityHealthResult)>> {
        let children: Vec<&'a EntityNode> = self
            .snapshot
            .children_of_kind(parent, kind)
            .filter(|child| child.is_visible_to_parent())
            .collect();
        self.evaluate_all(children)
    }

    // --- Policy resolution ---

    /// Name of the application that owns `node`, walking up the hierarchy.
    pub(crate) fn application_name_of(&self, node: &'a EntityNode) -> Option<&'a str> {
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(name) = n.id.application_name() {
                return Some(name);
            }
            if let Some(name) = n.attributes.application_name.as_deref() {
                return Some(name);
            }
            current = self.snapshot.parent(n);
        }
        None
    }

    /// Policy for the application named `application_name`.
    pub(crate) fn application_policy(&self, application_name: Option<&str>) -> &'a ApplicationHealthPolicy {
        self.application_policy_override
            .or_else(|| {
                let name = application_name?;
                self.application_policies?.get(name)
            })
            .unwrap_or(self.default_application_policy)
    }

    pub(crate) fn application_policy_for(&self, node: &'a EntityNode) -> &'a ApplicationHealthPolicy {
        self.application_policy(self.application_name_of(node))
    }

    /// Service type of the service that owns `node`.
    pub(crate) fn service_type_of(&self, node: &'a EntityNode) -> Option<&'a str> {
        self.snapshot
            .ancestor_of_kind(node, EntityKind::Service)
            .and_then(EntityNode::service_type_name)
            .or_else(|| node.service_type_name())
    }
}

/// Fail when a non-Ok state carries no reason or an Ok state carries one,
/// and validate every evaluation tree.
pub fn ensure_contract(
    state: HealthState,
    unhealthy_evaluations: &[HealthEvaluation],
) -> Result<(), EvaluationError> {
    check_state_matches_evaluations(state, unhealthy_evaluations)?;
    unhealthy_evaluations.iter().try_for_each(HealthEvaluation::validate)
}

/// Apply the configured child cap and depth to each top-level evaluation.
pub fn trim_evaluations(evaluations: &mut [HealthEvaluation], config: &EvaluationConfig) {
    for evaluation in evaluations {
        evaluation.trim(config.max_child_evaluations, config.max_evaluation_depth);
    }
}
