//! # health-eval
//!
//! Turns an immutable [`HealthSnapshot`](health_entities::HealthSnapshot)
//! into aggregated health states and evaluation trees.
//!
//! Evaluation is read-only: siblings are evaluated in parallel and the
//! parent combines their results. [`HealthEngine`] ties the store and the
//! evaluator together behind the `IHealthStore` and `IHealthQuery` traits.

pub mod engine;
pub mod evaluator;
pub mod events;
pub mod group;
pub mod queries;
pub mod upgrade;

pub use engine::HealthEngine;
pub use evaluator::{ClusterEvaluation, EntityHealthResult, HealthEvaluator, UpgradeContext};
pub use group::GroupHealthStateCount;
