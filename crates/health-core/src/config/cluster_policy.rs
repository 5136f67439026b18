use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Percent;
use crate::errors::PolicyError;

/// Thresholds applied when evaluating the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterHealthPolicy {
    pub consider_warning_as_error: bool,
    /// Default: 0.
    pub max_percent_unhealthy_nodes: Percent,
    /// Applies to applications whose type has no entry in the map below. Default: 0.
    pub max_percent_unhealthy_applications: Percent,
    /// Application type name → max percent unhealthy applications of that type.
    pub application_type_health_policy_map: BTreeMap<String, Percent>,
}

impl ClusterHealthPolicy {
    pub fn new(max_percent_unhealthy_nodes: Percent, max_percent_unhealthy_applications: Percent) -> Self {
        Self {
            max_percent_unhealthy_nodes,
            max_percent_unhealthy_applications,
            ..Self::default()
        }
    }

    pub fn with_consider_warning_as_error(mut self, value: bool) -> Self {
        self.consider_warning_as_error = value;
        self
    }

    pub fn with_application_type_policy(
        mut self,
        application_type_name: impl Into<String>,
        max_percent_unhealthy_applications: Percent,
    ) -> Result<Self, PolicyError> {
        let name = application_type_name.into();
        if name.is_empty() {
            return Err(PolicyError::EmptyFilterKey {
                field: "application_type_name",
            });
        }
        self.application_type_health_policy_map
            .insert(name, max_percent_unhealthy_applications);
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.application_type_health_policy_map.contains_key("") {
            return Err(PolicyError::EmptyFilterKey {
                field: "application_type_name",
            });
        }
        Ok(())
    }
}
