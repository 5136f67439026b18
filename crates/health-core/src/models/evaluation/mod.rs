//! Evaluation trees explaining why an entity is not healthy.
//!
//! [`HealthEvaluation`] is a closed sum type; every consumer matches on it
//! exhaustively so a new kind cannot be silently ignored. Constructors build
//! the description from the numbers that drove the decision and reject
//! evaluations that would break the tree's invariants.

mod description;
pub mod payloads;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use payloads::{
    ApplicationTypeApplicationsHealthEvaluation, ChildrenHealthEvaluation,
    DeltaNodesCheckHealthEvaluation, EntityHealthEvaluation, EventHealthEvaluation,
    ServicesHealthEvaluation, SystemApplicationHealthEvaluation,
    UpgradeDomainDeltaNodesCheckHealthEvaluation, UpgradeDomainHealthEvaluation,
};

use crate::config::Percent;
use crate::errors::EvaluationError;
use crate::models::{EntityId, EntityKind, HealthEvent, HealthState, UnhealthyState};

/// Discriminant of [`HealthEvaluation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluationKind {
    Event,
    Node,
    Nodes,
    Replica,
    Replicas,
    Partition,
    Partitions,
    Service,
    Services,
    Application,
    Applications,
    ApplicationTypeApplications,
    DeployedApplication,
    DeployedApplications,
    DeployedServicePackage,
    DeployedServicePackages,
    SystemApplication,
    DeltaNodesCheck,
    UpgradeDomainDeltaNodesCheck,
    UpgradeDomainNodes,
    UpgradeDomainDeployedApplications,
}

impl fmt::Display for EvaluationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One node of an evaluation tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum HealthEvaluation {
    Event(EventHealthEvaluation),
    Node(EntityHealthEvaluation),
    Nodes(ChildrenHealthEvaluation),
    Replica(EntityHealthEvaluation),
    Replicas(ChildrenHealthEvaluation),
    Partition(EntityHealthEvaluation),
    Partitions(ChildrenHealthEvaluation),
    Service(EntityHealthEvaluation),
    Services(ServicesHealthEvaluation),
    Application(EntityHealthEvaluation),
    Applications(ChildrenHealthEvaluation),
    ApplicationTypeApplications(ApplicationTypeApplicationsHealthEvaluation),
    DeployedApplication(EntityHealthEvaluation),
    DeployedApplications(ChildrenHealthEvaluation),
    DeployedServicePackage(EntityHealthEvaluation),
    DeployedServicePackages(ChildrenHealthEvaluation),
    SystemApplication(SystemApplicationHealthEvaluation),
    DeltaNodesCheck(DeltaNodesCheckHealthEvaluation),
    UpgradeDomainDeltaNodesCheck(UpgradeDomainDeltaNodesCheckHealthEvaluation),
    UpgradeDomainNodes(UpgradeDomainHealthEvaluation),
    UpgradeDomainDeployedApplications(UpgradeDomainHealthEvaluation),
}

fn require_key(kind: EvaluationKind, field: &'static str, value: &str) -> Result<(), EvaluationError> {
    if value.is_empty() {
        Err(EvaluationError::EmptyKey { kind, field })
    } else {
        Ok(())
    }
}

fn require_total(kind: EvaluationKind, total_count: u64) -> Result<(), EvaluationError> {
    if total_count == 0 {
        Err(EvaluationError::EmptyTotalCount { kind })
    } else {
        Ok(())
    }
}

impl HealthEvaluation {
    // --- Constructors ---

    /// Leaf wrapping the event that drove `state`.
    pub fn event(state: HealthState, event: HealthEvent, consider_warning_as_error: bool) -> Self {
        Self::Event(EventHealthEvaluation {
            aggregated_health_state: state,
            description: description::event(state, &event, consider_warning_as_error),
            unhealthy_event: event,
            consider_warning_as_error,
        })
    }

    /// Singular wrapper for one unhealthy entity.
    pub fn entity(
        entity: EntityId,
        state: HealthState,
        unhealthy_evaluations: Vec<HealthEvaluation>,
    ) -> Result<Self, EvaluationError> {
        let kind = entity.kind();
        let payload = EntityHealthEvaluation {
            description: description::entity(&entity, state),
            entity,
            aggregated_health_state: state,
            unhealthy_evaluations,
        };
        Ok(match kind {
            EntityKind::Node => Self::Node(payload),
            EntityKind::Replica => Self::Replica(payload),
            EntityKind::Partition => Self::Partition(payload),
            EntityKind::Service => Self::Service(payload),
            EntityKind::Application => Self::Application(payload),
            EntityKind::DeployedApplication => Self::DeployedApplication(payload),
            EntityKind::DeployedServicePackage => Self::DeployedServicePackage(payload),
            EntityKind::Cluster => return Err(EvaluationError::UnsupportedEntityKind { kind }),
        })
    }

    /// Plural evaluation over children of `child_kind`.
    ///
    /// `unhealthy_count` and `total_count` are the true cardinalities; the
    /// child list may already be shorter.
    pub fn children(
        child_kind: EntityKind,
        state: HealthState,
        unhealthy_evaluations: Vec<HealthEvaluation>,
        unhealthy_count: u64,
        total_count: u64,
        max_percent_unhealthy: Percent,
    ) -> Result<Self, EvaluationError> {
        if child_kind == EntityKind::Service {
            return Self::services(
                None,
                state,
                unhealthy_evaluations,
                unhealthy_count,
                total_count,
                max_percent_unhealthy,
            );
        }
        let wrap: fn(ChildrenHealthEvaluation) -> Self = match child_kind {
            EntityKind::Node => Self::Nodes,
            EntityKind::Replica => Self::Replicas,
            EntityKind::Partition => Self::Partitions,
            EntityKind::Application => Self::Applications,
            EntityKind::DeployedApplication => Self::DeployedApplications,
            EntityKind::DeployedServicePackage => Self::DeployedServicePackages,
            EntityKind::Service | EntityKind::Cluster => {
                return Err(EvaluationError::UnsupportedEntityKind { kind: child_kind })
            }
        };
        let payload = ChildrenHealthEvaluation {
            aggregated_health_state: state,
            description: description::children(
                child_kind,
                None,
                unhealthy_count,
                total_count,
                max_percent_unhealthy,
            ),
            total_count,
            max_percent_unhealthy,
            unhealthy_evaluations,
        };
        let evaluation = wrap(payload);
        require_total(evaluation.kind(), total_count)?;
        Ok(evaluation)
    }

    /// Services of an application, optionally scoped to one service type.
    pub fn services(
        service_type_name: Option<String>,
        state: HealthState,
        unhealthy_evaluations: Vec<HealthEvaluation>,
        unhealthy_count: u64,
        total_count: u64,
        max_percent_unhealthy: Percent,
    ) -> Result<Self, EvaluationError> {
        if let Some(name) = &service_type_name {
            require_key(EvaluationKind::Services, "service_type_name", name)?;
        }
        require_total(EvaluationKind::Services, total_count)?;
        Ok(Self::Services(ServicesHealthEvaluation {
            description: description::children(
                EntityKind::Service,
                service_type_name
                    .as_deref()
                    .map(|name| ("ServiceTypeName", name)),
                unhealthy_count,
                total_count,
                max_percent_unhealthy,
            ),
            service_type_name,
            aggregated_health_state: state,
            total_count,
            max_percent_unhealthy,
            unhealthy_evaluations,
        }))
    }

    /// Applications of a type that has its own entry in the cluster policy.
    pub fn application_type_applications(
        application_type_name: impl Into<String>,
        state: HealthState,
        unhealthy_evaluations: Vec<HealthEvaluation>,
        unhealthy_count: u64,
        total_count: u64,
        max_percent_unhealthy: Percent,
    ) -> Result<Self, EvaluationError> {
        let application_type_name = application_type_name.into();
        let kind = EvaluationKind::ApplicationTypeApplications;
        require_key(kind, "application_type_name", &application_type_name)?;
        require_total(kind, total_count)?;
        Ok(Self::ApplicationTypeApplications(
            ApplicationTypeApplicationsHealthEvaluation {
                description: description::children(
                    EntityKind::Application,
                    Some(("ApplicationTypeName", &application_type_name)),
                    unhealthy_count,
                    total_count,
                    max_percent_unhealthy,
                ),
                application_type_name,
                aggregated_health_state: state,
                total_count,
                max_percent_unhealthy,
                unhealthy_evaluations,
            },
        ))
    }

    /// Nodes of one upgrade domain.
    pub fn upgrade_domain_nodes(
        upgrade_domain_name: impl Into<String>,
        state: HealthState,
        unhealthy_evaluations: Vec<HealthEvaluation>,
        unhealthy_count: u64,
        total_count: u64,
        max_percent_unhealthy: Percent,
    ) -> Result<Self, EvaluationError> {
        Self::upgrade_domain_group(
            EntityKind::Node,
            upgrade_domain_name.into(),
            state,
            unhealthy_evaluations,
            unhealthy_count,
            total_count,
            max_percent_unhealthy,
        )
        .map(Self::UpgradeDomainNodes)
    }

    /// Deployed applications of one upgrade domain.
    pub fn upgrade_domain_deployed_applications(
        upgrade_domain_name: impl Into<String>,
        state: HealthState,
        unhealthy_evaluations: Vec<HealthEvaluation>,
        unhealthy_count: u64,
        total_count: u64,
        max_percent_unhealthy: Percent,
    ) -> Result<Self, EvaluationError> {
        Self::upgrade_domain_group(
            EntityKind::DeployedApplication,
            upgrade_domain_name.into(),
            state,
            unhealthy_evaluations,
            unhealthy_count,
            total_count,
            max_percent_unhealthy,
        )
        .map(Self::UpgradeDomainDeployedApplications)
    }

    fn upgrade_domain_group(
        child_kind: EntityKind,
        upgrade_domain_name: String,
        state: HealthState,
        unhealthy_evaluations: Vec<HealthEvaluation>,
        unhealthy_count: u64,
        total_count: u64,
        max_percent_unhealthy: Percent,
    ) -> Result<UpgradeDomainHealthEvaluation, EvaluationError> {
        let kind = match child_kind {
            EntityKind::Node => EvaluationKind::UpgradeDomainNodes,
            _ => EvaluationKind::UpgradeDomainDeployedApplications,
        };
        require_key(kind, "upgrade_domain_name", &upgrade_domain_name)?;
        require_total(kind, total_count)?;
        Ok(UpgradeDomainHealthEvaluation {
            description: description::children(
                child_kind,
                Some(("UpgradeDomain", &upgrade_domain_name)),
                unhealthy_count,
                total_count,
                max_percent_unhealthy,
            ),
            upgrade_domain_name,
            aggregated_health_state: state,
            total_count,
            max_percent_unhealthy,
            unhealthy_evaluations,
        })
    }

    /// The system application's own evaluations, lifted to cluster level.
    pub fn system_application(state: HealthState, unhealthy_evaluations: Vec<HealthEvaluation>) -> Self {
        Self::SystemApplication(SystemApplicationHealthEvaluation {
            aggregated_health_state: state,
            description: description::system_application(state),
            unhealthy_evaluations,
        })
    }

    /// Global node-health regression since the upgrade baseline.
    pub fn delta_nodes_check(
        state: HealthState,
        baseline: UnhealthyState,
        error_count: u64,
        total_count: u64,
        max_percent_delta_unhealthy_nodes: Percent,
        unhealthy_evaluations: Vec<HealthEvaluation>,
    ) -> Result<Self, EvaluationError> {
        require_total(EvaluationKind::DeltaNodesCheck, total_count)?;
        Ok(Self::DeltaNodesCheck(DeltaNodesCheckHealthEvaluation {
            aggregated_health_state: state,
            description: description::delta_nodes(
                None,
                baseline.error_count(),
                baseline.total_count(),
                error_count,
                total_count,
                max_percent_delta_unhealthy_nodes,
            ),
            baseline_error_count: baseline.error_count(),
            baseline_total_count: baseline.total_count(),
            total_count,
            max_percent_delta_unhealthy_nodes,
            unhealthy_evaluations,
        }))
    }

    /// Node-health regression inside one upgrade domain.
    pub fn upgrade_domain_delta_nodes_check(
        upgrade_domain_name: impl Into<String>,
        state: HealthState,
        baseline: UnhealthyState,
        error_count: u64,
        total_count: u64,
        max_percent_upgrade_domain_delta_unhealthy_nodes: Percent,
        unhealthy_evaluations: Vec<HealthEvaluation>,
    ) -> Result<Self, EvaluationError> {
        let upgrade_domain_name = upgrade_domain_name.into();
        let kind = EvaluationKind::UpgradeDomainDeltaNodesCheck;
        require_key(kind, "upgrade_domain_name", &upgrade_domain_name)?;
        require_total(kind, total_count)?;
        Ok(Self::UpgradeDomainDeltaNodesCheck(
            UpgradeDomainDeltaNodesCheckHealthEvaluation {
                description: description::delta_nodes(
                    Some(&upgrade_domain_name),
                    baseline.error_count(),
                    baseline.total_count(),
                    error_count,
                    total_count,
                    max_percent_upgrade_domain_delta_unhealthy_nodes,
                ),
                upgrade_domain_name,
                aggregated_health_state: state,
                baseline_error_count: baseline.error_count(),
                baseline_total_count: baseline.total_count(),
                total_count,
                max_percent_upgrade_domain_delta_unhealthy_nodes,
                unhealthy_evaluations,
            },
        ))
    }

    // --- Accessors ---

    pub fn kind(&self) -> EvaluationKind {
        match self {
            Self::Event(_) => EvaluationKind::Event,
            Self::Node(_) => EvaluationKind::Node,
            Self::Nodes(_) => EvaluationKind::Nodes,
            Self::Replica(_) => EvaluationKind::Replica,
            Self::Replicas(_) => EvaluationKind::Replicas,
            Self::Partition(_) => EvaluationKind::Partition,
            Self::Partitions(_) => EvaluationKind::Partitions,
            Self::Service(_) => EvaluationKind::Service,
            Self::Services(_) => EvaluationKind::Services,
            Self::Application(_) => EvaluationKind::Application,
            Self::Applications(_) => EvaluationKind::Applications,
            Self::ApplicationTypeApplications(_) => EvaluationKind::ApplicationTypeApplications,
            Self::DeployedApplication(_) => EvaluationKind::DeployedApplication,
            Self::DeployedApplications(_) => EvaluationKind::DeployedApplications,
            Self::DeployedServicePackage(_) => EvaluationKind::DeployedServicePackage,
            Self::DeployedServicePackages(_) => EvaluationKind::DeployedServicePackages,
            Self::SystemApplication(_) => EvaluationKind::SystemApplication,
            Self::DeltaNodesCheck(_) => EvaluationKind::DeltaNodesCheck,
            Self::UpgradeDomainDeltaNodesCheck(_) => EvaluationKind::UpgradeDomainDeltaNodesCheck,
            Self::UpgradeDomainNodes(_) => EvaluationKind::UpgradeDomainNodes,
            Self::UpgradeDomainDeployedApplications(_) => {
                EvaluationKind::UpgradeDomainDeployedApplications
            }
        }
    }

    pub fn aggregated_health_state(&self) -> HealthState {
        match self {
            Self::Event(e) => e.aggregated_health_state,
            Self::Node(e)
            | Self::Replica(e)
            | Self::Partition(e)
            | Self::Service(e)
            | Self::Application(e)
            | Self::DeployedApplication(e)
            | Self::DeployedServicePackage(e) => e.aggregated_health_state,
            Self::Nodes(e)
            | Self::Replicas(e)
            | Self::Partitions(e)
            | Self::Applications(e)
            | Self::DeployedApplications(e)
            | Self::DeployedServicePackages(e) => e.aggregated_health_state,
            Self::Services(e) => e.aggregated_health_state,
            Self::ApplicationTypeApplications(e) => e.aggregated_health_state,
            Self::SystemApplication(e) => e.aggregated_health_state,
            Self::DeltaNodesCheck(e) => e.aggregated_health_state,
            Self::UpgradeDomainDeltaNodesCheck(e) => e.aggregated_health_state,
            Self::UpgradeDomainNodes(e) | Self::UpgradeDomainDeployedApplications(e) => {
                e.aggregated_health_state
            }
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Event(e) => &e.description,
            Self::Node(e)
            | Self::Replica(e)
            | Self::Partition(e)
            | Self::Service(e)
            | Self::Application(e)
            | Self::DeployedApplication(e)
            | Self::DeployedServicePackage(e) => &e.description,
            Self::Nodes(e)
            | Self::Replicas(e)
            | Self::Partitions(e)
            | Self::Applications(e)
            | Self::DeployedApplications(e)
            | Self::DeployedServicePackages(e) => &e.description,
            Self::Services(e) => &e.description,
            Self::ApplicationTypeApplications(e) => &e.description,
            Self::SystemApplication(e) => &e.description,
            Self::DeltaNodesCheck(e) => &e.description,
            Self::UpgradeDomainDeltaNodesCheck(e) => &e.description,
            Self::UpgradeDomainNodes(e) | Self::UpgradeDomainDeployedApplications(e) => {
                &e.description
            }
        }
    }

    /// Child evaluations. Always empty for events.
    pub fn unhealthy_evaluations(&self) -> &[HealthEvaluation] {
        match self {
            Self::Event(_) => &[],
            Self::Node(e)
            | Self::Replica(e)
            | Self::Partition(e)
            | Self::Service(e)
            | Self::Application(e)
            | Self::DeployedApplication(e)
            | Self::DeployedServicePackage(e) => &e.unhealthy_evaluations,
            Self::Nodes(e)
            | Self::Replicas(e)
            | Self::Partitions(e)
            | Self::Applications(e)
            | Self::DeployedApplications(e)
            | Self::DeployedServicePackages(e) => &e.unhealthy_evaluations,
            Self::Services(e) => &e.unhealthy_evaluations,
            Self::ApplicationTypeApplications(e) => &e.unhealthy_evaluations,
            Self::SystemApplication(e) => &e.unhealthy_evaluations,
            Self::DeltaNodesCheck(e) => &e.unhealthy_evaluations,
            Self::UpgradeDomainDeltaNodesCheck(e) => &e.unhealthy_evaluations,
            Self::UpgradeDomainNodes(e) | Self::UpgradeDomainDeployedApplications(e) => {
                &e.unhealthy_evaluations
            }
        }
    }

    fn unhealthy_evaluations_mut(&mut self) -> Option<&mut Vec<HealthEvaluation>> {
        match self {
            Self::Event(_) => None,
            Self::Node(e)
            | Self::Replica(e)
            | Self::Partition(e)
            | Self::Service(e)
            | Self::Application(e)
            | Self::DeployedApplication(e)
            | Self::DeployedServicePackage(e) => Some(&mut e.unhealthy_evaluations),
            Self::Nodes(e)
            | Self::Replicas(e)
            | Self::Partitions(e)
            | Self::Applications(e)
            | Self::DeployedApplications(e)
            | Self::DeployedServicePackages(e) => Some(&mut e.unhealthy_evaluations),
            Self::Services(e) => Some(&mut e.unhealthy_evaluations),
            Self::ApplicationTypeApplications(e) => Some(&mut e.unhealthy_evaluations),
            Self::SystemApplication(e) => Some(&mut e.unhealthy_evaluations),
            Self::DeltaNodesCheck(e) => Some(&mut e.unhealthy_evaluations),
            Self::UpgradeDomainDeltaNodesCheck(e) => Some(&mut e.unhealthy_evaluations),
            Self::UpgradeDomainNodes(e) | Self::UpgradeDomainDeployedApplications(e) => {
                Some(&mut e.unhealthy_evaluations)
            }
        }
    }

    /// Number of children considered, for collection evaluations.
    pub fn total_count(&self) -> Option<u64> {
        match self {
            Self::Nodes(e)
            | Self::Replicas(e)
            | Self::Partitions(e)
            | Self::Applications(e)
            | Self::DeployedApplications(e)
            | Self::DeployedServicePackages(e) => Some(e.total_count),
            Self::Services(e) => Some(e.total_count),
            Self::ApplicationTypeApplications(e) => Some(e.total_count),
            Self::DeltaNodesCheck(e) => Some(e.total_count),
            Self::UpgradeDomainDeltaNodesCheck(e) => Some(e.total_count),
            Self::UpgradeDomainNodes(e) | Self::UpgradeDomainDeployedApplications(e) => {
                Some(e.total_count)
            }
            Self::Event(_)
            | Self::Node(_)
            | Self::Replica(_)
            | Self::Partition(_)
            | Self::Service(_)
            | Self::Application(_)
            | Self::DeployedApplication(_)
            | Self::DeployedServicePackage(_)
            | Self::SystemApplication(_) => None,
        }
    }

    /// Whether this node stands for a collection of children.
    pub fn is_collection(&self) -> bool {
        self.total_count().is_some()
    }

    /// Wrapped event, for leaves.
    pub fn unhealthy_event(&self) -> Option<&HealthEvent> {
        match self {
            Self::Event(e) => Some(&e.unhealthy_event),
            _ => None,
        }
    }

    // --- Invariants ---

    /// Check every invariant of the tree rooted here.
    pub fn validate(&self) -> Result<(), EvaluationError> {
        let kind = self.kind();
        let state = self.aggregated_health_state();
        if !state.is_unhealthy() {
            return Err(EvaluationError::HealthyChild { kind, state });
        }
        if self.description().is_empty() {
            return Err(EvaluationError::EmptyDescription { kind });
        }
        if let Some(total) = self.total_count() {
            require_total(kind, total)?;
        }
        match self {
            Self::Services(e) => {
                if let Some(name) = &e.service_type_name {
                    require_key(kind, "service_type_name", name)?;
                }
            }
            Self::ApplicationTypeApplications(e) => {
                require_key(kind, "application_type_name", &e.application_type_name)?;
            }
            Self::UpgradeDomainNodes(e) | Self::UpgradeDomainDeployedApplications(e) => {
                require_key(kind, "upgrade_domain_name", &e.upgrade_domain_name)?;
            }
            Self::UpgradeDomainDeltaNodesCheck(e) => {
                require_key(kind, "upgrade_domain_name", &e.upgrade_domain_name)?;
            }
            Self::Node(e)
            | Self::Replica(e)
            | Self::Partition(e)
            | Self::Service(e)
            | Self::Application(e)
            | Self::DeployedApplication(e)
            | Self::DeployedServicePackage(e) => {
                if e.unhealthy_evaluations.len() > 1 {
                    return Err(EvaluationError::TooManyChildren {
                        kind,
                        count: e.unhealthy_evaluations.len(),
                    });
                }
            }
            Self::Event(_)
            | Self::Nodes(_)
            | Self::Replicas(_)
            | Self::Partitions(_)
            | Self::Applications(_)
            | Self::DeployedApplications(_)
            | Self::DeployedServicePackages(_)
            | Self::SystemApplication(_)
            | Self::DeltaNodesCheck(_) => {}
        }
        self.unhealthy_evaluations()
            .iter()
            .try_for_each(HealthEvaluation::validate)
    }

    // --- Trimming ---

    /// Bound the size of the tree rooted here.
    ///
    /// Collections keep at most `max_children` children; collections at
    /// `max_depth` or deeper keep none. Counts are never touched.
    pub fn trim(&mut self, max_children: usize, max_depth: usize) {
        self.trim_at(0, max_children, max_depth);
    }

    fn trim_at(&mut self, depth: usize, max_children: usize, max_depth: usize) {
        let is_collection = self.is_collection();
        let Some(children) = self.unhealthy_evaluations_mut() else {
            return;
        };
        if is_collection {
            if depth + 1 >= max_depth {
                children.clear();
            } else {
                children.truncate(max_children);
            }
        }
        for child in children.iter_mut() {
            child.trim_at(depth + 1, max_children, max_depth);
        }
    }
}

/// Check the Ok-iff-empty contract for an entity-level result.
pub fn check_state_matches_evaluations(
    state: HealthState,
    unhealthy_evaluations: &[HealthEvaluation],
) -> Result<(), EvaluationError> {
    match (state.is_unhealthy(), unhealthy_evaluations.is_empty()) {
        (true, true) => Err(EvaluationError::MissingEvaluations { state }),
        (false, false) => Err(EvaluationError::UnexpectedEvaluations {
            count: unhealthy_evaluations.len(),
        }),
        _ => Ok(()),
    }
}
