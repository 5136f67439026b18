use crate::models::EntityId;

use super::{EvaluationError, PolicyError, ReportError};

/// Convenience alias used throughout the workspace.
pub type HealthResult<T> = Result<T, HealthError>;

/// Top-level error for every health operation.
#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("health entity not found: {entity}")]
    EntityNotFound { entity: EntityId },

    /// Carries every application whose type could not be resolved so the
    /// caller can request the missing types in one round trip.
    #[error("application type not found for {} application(s): {}", applications.len(), applications.join(", "))]
    ApplicationTypeNotFound { applications: Vec<String> },

    #[error("upgrade domain '{upgrade_domain}' is not present in the upgrade baseline")]
    UpgradeDomainNotInBaseline { upgrade_domain: String },

    #[error("invalid continuation token: {token}")]
    InvalidContinuationToken { token: String },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("policy error: {0}")]
    PolicyError(#[from] PolicyError),

    #[error("report error: {0}")]
    ReportError(#[from] ReportError),

    #[error("evaluation error: {0}")]
    EvaluationError(#[from] EvaluationError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
