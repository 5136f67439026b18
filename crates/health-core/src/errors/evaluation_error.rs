use crate::models::{EntityKind, EvaluationKind, HealthState};

/// Violations of the evaluation-tree contract.
///
/// These are programming errors in an evaluator; they are surfaced instead
/// of being swallowed so a non-Ok state can never ship without a reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("aggregated state {state} has no unhealthy evaluations")]
    MissingEvaluations { state: HealthState },

    #[error("aggregated state is ok but {count} unhealthy evaluation(s) were produced")]
    UnexpectedEvaluations { count: usize },

    #[error("{kind} evaluation requires a total count greater than zero")]
    EmptyTotalCount { kind: EvaluationKind },

    #[error("{kind} evaluation contains a child in state {state}")]
    HealthyChild {
        kind: EvaluationKind,
        state: HealthState,
    },

    #[error("{kind} evaluation has an empty {field}")]
    EmptyKey {
        kind: EvaluationKind,
        field: &'static str,
    },

    #[error("{kind} evaluation wraps {count} children, expected at most one")]
    TooManyChildren { kind: EvaluationKind, count: usize },

    #[error("{kind} evaluation has an empty description")]
    EmptyDescription { kind: EvaluationKind },

    #[error("no evaluation exists for {kind} at this level")]
    UnsupportedEntityKind { kind: EntityKind },
}
