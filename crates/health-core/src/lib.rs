//! # health-core
//!
//! Foundation crate for the health aggregation engine.
//! Defines entity identities, health events, evaluation trees, policies,
//! errors, config, and constants. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::{
    ApplicationHealthPolicy, ApplicationHealthPolicyMap, ClusterHealthPolicy,
    ClusterUpgradeHealthPolicy, HealthConfig, Percent, ServiceTypeHealthPolicy,
};
pub use errors::{HealthError, HealthResult};
pub use models::{
    EntityAttributes, EntityId, EntityKind, EvaluationKind, HealthEvaluation, HealthEvent,
    HealthReport, HealthState, HealthStateCount, HealthStateFilter,
};
pub use traits::{IHealthQuery, IHealthStore, ReportOutcome};
