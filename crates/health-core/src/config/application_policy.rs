use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Percent;
use crate::errors::PolicyError;

/// Thresholds for the services of one service type and their descendants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceTypeHealthPolicy {
    /// Default: 0.
    pub max_percent_unhealthy_services: Percent,
    /// Default: 0.
    pub max_percent_unhealthy_partitions_per_service: Percent,
    /// Default: 0.
    pub max_percent_unhealthy_replicas_per_partition: Percent,
}

impl ServiceTypeHealthPolicy {
    pub fn new(services: Percent, partitions_per_service: Percent, replicas_per_partition: Percent) -> Self {
        Self {
            max_percent_unhealthy_services: services,
            max_percent_unhealthy_partitions_per_service: partitions_per_service,
            max_percent_unhealthy_replicas_per_partition: replicas_per_partition,
        }
    }
}

/// Thresholds applied when evaluating an application and everything under it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationHealthPolicy {
    pub consider_warning_as_error: bool,
    /// Default: 0.
    pub max_percent_unhealthy_deployed_applications: Percent,
    pub default_service_type_health_policy: ServiceTypeHealthPolicy,
    /// Service type name → policy overriding the default one.
    pub service_type_health_policies: BTreeMap<String, ServiceTypeHealthPolicy>,
}

impl ApplicationHealthPolicy {
    pub fn with_consider_warning_as_error(mut self, value: bool) -> Self {
        self.consider_warning_as_error = value;
        self
    }

    pub fn with_max_percent_unhealthy_deployed_applications(mut self, value: Percent) -> Self {
        self.max_percent_unhealthy_deployed_applications = value;
        self
    }

    pub fn with_default_service_type_policy(mut self, policy: ServiceTypeHealthPolicy) -> Self {
        self.default_service_type_health_policy = policy;
        self
    }

    pub fn with_service_type_policy(
        mut self,
        service_type_name: impl Into<String>,
        policy: ServiceTypeHealthPolicy,
    ) -> Result<Self, PolicyError> {
        let name = service_type_name.into();
        if name.is_empty() {
            return Err(PolicyError::EmptyFilterKey {
                field: "service_type_name",
            });
        }
        self.service_type_health_policies.insert(name, policy);
        Ok(self)
    }

    /// Policy for `service_type_name`, falling back to the default one.
    pub fn service_type_policy(&self, service_type_name: Option<&str>) -> &ServiceTypeHealthPolicy {
        service_type_name
            .and_then(|name| self.service_type_health_policies.get(name))
            .unwrap_or(&self.default_service_type_health_policy)
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.service_type_health_policies.contains_key("") {
            return Err(PolicyError::EmptyFilterKey {
                field: "service_type_name",
            });
        }
        Ok(())
    }
}

/// Per-application policy overrides, keyed by application name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationHealthPolicyMap {
    policies: BTreeMap<String, ApplicationHealthPolicy>,
}

impl ApplicationHealthPolicyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        application_name: impl Into<String>,
        policy: ApplicationHealthPolicy,
    ) -> Result<(), PolicyError> {
        let name = application_name.into();
        if name.is_empty() {
            return Err(PolicyError::EmptyFilterKey {
                field: "application_name",
            });
        }
        policy.validate()?;
        self.policies.insert(name, policy);
        Ok(())
    }

    pub fn get(&self, application_name: &str) -> Option<&ApplicationHealthPolicy> {
        self.policies.get(application_name)
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_type_policy_falls_back_to_default() {
        let special = ServiceTypeHealthPolicy::new(
            Percent::new(50).unwrap(),
            Percent::ZERO,
            Percent::ZERO,
        );
        let policy = ApplicationHealthPolicy::default()
            .with_service_type_policy("Stateful", special)
            .unwrap();
        assert_eq!(
            policy.service_type_policy(Some("Stateful")).max_percent_unhealthy_services.value(),
            50
        );
        assert_eq!(
            policy.service_type_policy(Some("Other")).max_percent_unhealthy_services.value(),
            0
        );
        assert_eq!(policy.service_type_policy(None).max_percent_unhealthy_services.value(), 0);
    }

    #[test]
    fn empty_service_type_name_is_rejected() {
        let err = ApplicationHealthPolicy::default()
            .with_service_type_policy("", ServiceTypeHealthPolicy::default())
            .unwrap_err();
        assert!(matches!(err, PolicyError::EmptyFilterKey { .. }));
    }
}
