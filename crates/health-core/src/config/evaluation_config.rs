use serde::{Deserialize, Serialize};

use super::defaults;

/// Knobs of the evaluator that are not health policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Maximum child evaluations kept per plural evaluation. Default: 10.
    pub max_child_evaluations: usize,
    /// Plural evaluations at or below this depth are emitted without children. Default: 8.
    pub max_evaluation_depth: usize,
    /// An entity with more current reports than this is flagged. Default: 100.
    pub max_suggested_reports_per_entity: usize,
    /// Group applications by type when the cluster policy names the type. Default: true.
    pub enable_application_type_health_evaluation: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_child_evaluations: defaults::DEFAULT_MAX_CHILD_EVALUATIONS,
            max_evaluation_depth: defaults::DEFAULT_MAX_EVALUATION_DEPTH,
            max_suggested_reports_per_entity: defaults::DEFAULT_MAX_SUGGESTED_REPORTS_PER_ENTITY,
            enable_application_type_health_evaluation: true,
        }
    }
}
