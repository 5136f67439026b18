use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{AD_HOC_APPLICATION_NAME, SYSTEM_APPLICATION_NAME};

/// Kind of a health entity in the cluster hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Node,
    Replica,
    Partition,
    Service,
    Application,
    DeployedApplication,
    DeployedServicePackage,
    Cluster,
}

impl EntityKind {
    /// Plural noun used in evaluation descriptions.
    pub fn plural_name(self) -> &'static str {
        match self {
            Self::Node => "nodes",
            Self::Replica => "replicas",
            Self::Partition => "partitions",
            Self::Service => "services",
            Self::Application => "applications",
            Self::DeployedApplication => "deployed applications",
            Self::DeployedServicePackage => "deployed service packages",
            Self::Cluster => "clusters",
        }
    }

    /// Kind of the parent entity; `None` for the cluster root.
    pub fn parent_kind(self) -> Option<EntityKind> {
        match self {
            Self::Node | Self::Application => Some(Self::Cluster),
            Self::Replica => Some(Self::Partition),
            Self::Partition => Some(Self::Service),
            Self::Service | Self::DeployedApplication => Some(Self::Application),
            Self::DeployedServicePackage => Some(Self::DeployedApplication),
            Self::Cluster => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Node => "Node",
            Self::Replica => "Replica",
            Self::Partition => "Partition",
            Self::Service => "Service",
            Self::Application => "Application",
            Self::DeployedApplication => "DeployedApplication",
            Self::DeployedServicePackage => "DeployedServicePackage",
            Self::Cluster => "Cluster",
        };
        f.write_str(s)
    }
}

/// Stable identity of a health entity.
///
/// Ordering is total so children can be listed deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityId {
    Cluster,
    Node {
        node_name: String,
    },
    Partition {
        partition_id: Uuid,
    },
    Replica {
        partition_id: Uuid,
        replica_id: i64,
    },
    Service {
        service_name: String,
    },
    Application {
        application_name: String,
    },
    DeployedApplication {
        application_name: String,
        node_name: String,
    },
    DeployedServicePackage {
        application_name: String,
        service_manifest_name: String,
        service_package_activation_id: String,
        node_name: String,
    },
}

impl EntityId {
    pub fn node(node_name: impl Into<String>) -> Self {
        Self::Node {
            node_name: node_name.into(),
        }
    }

    pub fn partition(partition_id: Uuid) -> Self {
        Self::Partition { partition_id }
    }

    pub fn replica(partition_id: Uuid, replica_id: i64) -> Self {
        Self::Replica {
            partition_id,
            replica_id,
        }
    }

    pub fn service(service_name: impl Into<String>) -> Self {
        Self::Service {
            service_name: service_name.into(),
        }
    }

    pub fn application(application_name: impl Into<String>) -> Self {
        Self::Application {
            application_name: application_name.into(),
        }
    }

    pub fn deployed_application(
        application_name: impl Into<String>,
        node_name: impl Into<String>,
    ) -> Self {
        Self::DeployedApplication {
            application_name: application_name.into(),
            node_name: node_name.into(),
        }
    }

    pub fn deployed_service_package(
        application_name: impl Into<String>,
        service_manifest_name: impl Into<String>,
        service_package_activation_id: impl Into<String>,
        node_name: impl Into<String>,
    ) -> Self {
        Self::DeployedServicePackage {
            application_name: application_name.into(),
            service_manifest_name: service_manifest_name.into(),
            service_package_activation_id: service_package_activation_id.into(),
            node_name: node_name.into(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Cluster => EntityKind::Cluster,
            Self::Node { .. } => EntityKind::Node,
            Self::Partition { .. } => EntityKind::Partition,
            Self::Replica { .. } => EntityKind::Replica,
            Self::Service { .. } => EntityKind::Service,
            Self::Application { .. } => EntityKind::Application,
            Self::DeployedApplication { .. } => EntityKind::DeployedApplication,
            Self::DeployedServicePackage { .. } => EntityKind::DeployedServicePackage,
        }
    }

    /// Parent identity when it is encoded in the id itself.
    ///
    /// Partitions and services find their parents through attributes.
    pub fn structural_parent(&self) -> Option<EntityId> {
        match self {
            Self::Cluster => None,
            Self::Node { .. } | Self::Application { .. } => Some(Self::Cluster),
            Self::Replica { partition_id, .. } => Some(Self::partition(*partition_id)),
            Self::DeployedApplication {
                application_name, ..
            } => Some(Self::application(application_name.clone())),
            Self::DeployedServicePackage {
                application_name,
                node_name,
                ..
            } => Some(Self::deployed_application(
                application_name.clone(),
                node_name.clone(),
            )),
            Self::Partition { .. } | Self::Service { .. } => None,
        }
    }

    /// Name of the application this entity belongs to, when it is part of the id.
    pub fn application_name(&self) -> Option<&str> {
        match self {
            Self::Application { application_name }
            | Self::DeployedApplication {
                application_name, ..
            }
            | Self::DeployedServicePackage {
                application_name, ..
            } => Some(application_name),
            _ => None,
        }
    }

    pub fn is_system_application(&self) -> bool {
        matches!(self, Self::Application { application_name } if application_name == SYSTEM_APPLICATION_NAME)
    }

    pub fn is_ad_hoc_application(&self) -> bool {
        matches!(self, Self::Application { application_name } if application_name == AD_HOC_APPLICATION_NAME)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cluster => write!(f, "cluster"),
            Self::Node { node_name } => write!(f, "node {node_name}"),
            Self::Partition { partition_id } => write!(f, "partition {partition_id}"),
            Self::Replica {
                partition_id,
                replica_id,
            } => write!(f, "replica {partition_id}/{replica_id}"),
            Self::Service { service_name } => write!(f, "service {service_name}"),
            Self::Application { application_name } => {
                write!(f, "application {application_name}")
            }
            Self::DeployedApplication {
                application_name,
                node_name,
            } => write!(f, "deployed application {application_name} on {node_name}"),
            Self::DeployedServicePackage {
                application_name,
                service_manifest_name,
                service_package_activation_id,
                node_name,
            } => {
                write!(
                    f,
                    "deployed service package {application_name}/{service_manifest_name}"
                )?;
                if !service_package_activation_id.is_empty() {
                    write!(f, " ({service_package_activation_id})")?;
                }
                write!(f, " on {node_name}")
            }
        }
    }
}
