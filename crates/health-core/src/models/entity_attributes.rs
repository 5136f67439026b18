use serde::{Deserialize, Serialize};

/// Attributes carried by reports and kept per entity.
///
/// Fields are merged one by one: a report that leaves a field unset does not
/// clear a value set by an earlier report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityAttributes {
    /// Upgrade domain of a node.
    pub upgrade_domain: Option<String>,
    pub node_name: Option<String>,
    /// Owning service of a partition.
    pub service_name: Option<String>,
    pub service_type_name: Option<String>,
    /// Owning application of a service.
    pub application_name: Option<String>,
    pub application_type_name: Option<String>,
}

impl EntityAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upgrade_domain(mut self, upgrade_domain: impl Into<String>) -> Self {
        self.upgrade_domain = Some(upgrade_domain.into());
        self
    }

    pub fn with_node_name(mut self, node_name: impl Into<String>) -> Self {
        self.node_name = Some(node_name.into());
        self
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    pub fn with_service_type_name(mut self, service_type_name: impl Into<String>) -> Self {
        self.service_type_name = Some(service_type_name.into());
        self
    }

    pub fn with_application_name(mut self, application_name: impl Into<String>) -> Self {
        self.application_name = Some(application_name.into());
        self
    }

    pub fn with_application_type_name(mut self, application_type_name: impl Into<String>) -> Self {
        self.application_type_name = Some(application_type_name.into());
        self
    }

    /// Overwrite every field that `other` sets.
    pub fn merge(&mut self, other: &EntityAttributes) {
        fn take(dst: &mut Option<String>, src: &Option<String>) {
            if let Some(v) = src {
                *dst = Some(v.clone());
            }
        }
        take(&mut self.upgrade_domain, &other.upgrade_domain);
        take(&mut self.node_name, &other.node_name);
        take(&mut self.service_name, &other.service_name);
        take(&mut self.service_type_name, &other.service_type_name);
        take(&mut self.application_name, &other.application_name);
        take(&mut self.application_type_name, &other.application_type_name);
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
