//! Configuration for the health engine.
//!
//! Every section defaults sensibly, so an empty TOML document is a valid
//! configuration. Policies are plain values handed to the evaluator; there
//! is no process-wide settings object.
//!
//! # Examples
//!
//! ```
//! use health_core::config::HealthConfig;
//!
//! let config = HealthConfig::from_toml("").unwrap();
//! assert_eq!(config.evaluation.max_child_evaluations, 10);
//! assert_eq!(config.upgrade_policy.max_percent_delta_unhealthy_nodes.value(), 10);
//! ```

pub mod application_policy;
pub mod cluster_policy;
pub mod defaults;
pub mod evaluation_config;
pub mod observability_config;
pub mod percent;
pub mod upgrade_policy;

pub use application_policy::{
    ApplicationHealthPolicy, ApplicationHealthPolicyMap, ServiceTypeHealthPolicy,
};
pub use cluster_policy::ClusterHealthPolicy;
pub use evaluation_config::EvaluationConfig;
pub use observability_config::ObservabilityConfig;
pub use percent::{percent_of, Percent};
pub use upgrade_policy::ClusterUpgradeHealthPolicy;

use serde::{Deserialize, Serialize};

use crate::errors::{HealthError, HealthResult};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub evaluation: EvaluationConfig,
    pub cluster_policy: ClusterHealthPolicy,
    pub application_policy: ApplicationHealthPolicy,
    pub upgrade_policy: ClusterUpgradeHealthPolicy,
    pub observability: ObservabilityConfig,
}

impl HealthConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(s: &str) -> HealthResult<Self> {
        let config: HealthConfig =
            toml::from_str(s).map_err(|e| HealthError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> HealthResult<String> {
        toml::to_string(self).map_err(|e| HealthError::ConfigError(e.to_string()))
    }

    /// Reject policies that cannot be evaluated.
    pub fn validate(&self) -> HealthResult<()> {
        self.cluster_policy.validate()?;
        self.application_policy.validate()?;
        Ok(())
    }
}
