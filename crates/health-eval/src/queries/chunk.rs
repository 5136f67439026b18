//! Health state chunks: aggregated states selected through nested filters.

use health_core::errors::HealthResult;
use health_core::models::chunk::{
    key_matches, ApplicationHealthStateChunk, ApplicationHealthStateFilter, ClusterHealthChunk,
    DeployedApplicationHealthStateChunk, DeployedApplicationHealthStateFilter,
    DeployedServicePackageHealthStateChunk, DeployedServicePackageHealthStateFilter, HealthStateChunkList,
    NodeHealthStateChunk, PartitionHealthStateChunk, PartitionHealthStateFilter, ReplicaHealthStateChunk,
    ReplicaHealthStateFilter, ServiceHealthStateChunk, ServiceHealthStateFilter,
};
use health_core::models::{ClusterHealthChunkQuery, EntityId, EntityKind, HealthState};
use health_entities::EntityNode;
use health_observability::query_span;

use crate::evaluator::{EntityHealthResult, HealthEvaluator};

/// Build the chunk tree selected by `query`'s filters.
///
/// Policies carried by the query must already be applied to `evaluator`.
pub fn get_cluster_health_chunk(
    evaluator: &HealthEvaluator<'_>,
    query: &ClusterHealthChunkQuery,
) -> HealthResult<ClusterHealthChunk> {
    let _span = query_span!("cluster_health_chunk").entered();
    let cluster = evaluator.evaluate_cluster(None)?;

    let node_chunks: Vec<NodeHealthStateChunk> = cluster
        .node_states
        .iter()
        .filter_map(|child| {
            let EntityId::Node { node_name } = &child.entity else {
                return None;
            };
            let state = child.aggregated_health_state;
            query
                .node_filters
                .iter()
                .any(|f| key_matches(f.node_name_filter.as_deref(), node_name.as_str()) && f.health_state_filter.matches(state))
                .then(|| NodeHealthStateChunk {
                    node_name: node_name.clone(),
                    health_state: state,
                })
        })
        .collect();

    // Application states come from the cluster pass; only selected
    // applications are descended into.
    let mut application_chunks = Vec::new();
    for child in &cluster.application_states {
        let Some(node) = evaluator.snapshot().get(&child.entity) else {
            continue;
        };
        if let Some(chunk) = application_chunk(evaluator, node, child.aggregated_health_state, &query.application_filters)? {
            application_chunks.push(chunk);
        }
    }

    Ok(ClusterHealthChunk {
        health_state: cluster.state,
        node_health_state_chunks: HealthStateChunkList {
            items: node_chunks,
            total_count: cluster.node_states.len() as u64,
        },
        application_health_state_chunks: HealthStateChunkList {
            items: application_chunks,
            total_count: cluster.application_states.len() as u64,
        },
    })
}

fn visible<'a>(nodes: impl Iterator<Item = &'a EntityNode>) -> Vec<&'a EntityNode> {
    nodes.filter(|n| n.is_visible_to_parent()).collect()
}

/// Evaluate the visible children of `parent` of one kind.
fn evaluated_children<'a>(
    evaluator: &HealthEvaluator<'a>,
    parent: &'a EntityNode,
    kind: EntityKind,
) -> HealthResult<Vec<(&'a EntityNode, EntityHealthResult)>> {
    let children = visible(evaluator.snapshot().children_of_kind(parent, kind));
    evaluator.evaluate_all(children)
}

/// Nested filters of every filter that selected the parent.
fn union<'f, F, N: 'f>(matched: &[&'f F], nested: impl Fn(&'f F) -> &'f [N]) -> Vec<&'f N> {
    matched.iter().flat_map(|f| nested(*f)).collect()
}

fn application_chunk<'a>(
    evaluator: &HealthEvaluator<'a>,
    node: &'a EntityNode,
    state: HealthState,
    filters: &[ApplicationHealthStateFilter],
) -> HealthResult<Option<ApplicationHealthStateChunk>> {
    let Some(application_name) = node.id.application_name() else {
        return Ok(None);
    };
    let application_type_name = node.application_type_name();
    let matched: Vec<&ApplicationHealthStateFilter> = filters
        .iter()
        .filter(|f| {
            key_matches(f.application_name_filter.as_deref(), application_name)
                && f.application_type_name_filter
                    .as_deref()
                    .map_or(true, |t| application_type_name == Some(t))
                && f.health_state_filter.matches(state)
        })
        .collect();
    if matched.is_empty() {
        return Ok(None);
    }

    let service_filters = union(&matched, |f| f.service_filters.as_slice());
    let services = evaluated_children(evaluator, node, EntityKind::Service)?;
    let mut service_chunks = HealthStateChunkList {
        items: Vec::new(),
        total_count: services.len() as u64,
    };
    if !service_filters.is_empty() {
        for (service, service_result) in services {
            if let Some(chunk) = service_chunk(evaluator, service, service_result.state, &service_filters)? {
                service_chunks.items.push(chunk);
            }
        }
    }

    let deployed_filters = union(&matched, |f| f.deployed_application_filters.as_slice());
    let deployed = evaluated_children(evaluator, node, EntityKind::DeployedApplication)?;
    let mut deployed_chunks = HealthStateChunkList {
        items: Vec::new(),
        total_count: deployed.len() as u64,
    };
    if !deployed_filters.is_empty() {
        for (deployed_application, deployed_result) in deployed {
            if let Some(chunk) =
                deployed_application_chunk(evaluator, deployed_application, deployed_result.state, &deployed_filters)?
            {
                deployed_chunks.items.push(chunk);
            }
        }
    }

    Ok(Some(ApplicationHealthStateChunk {
        application_name: application_name.to_string(),
        application_type_name: application_type_name.map(str::to_string),
        health_state: state,
        service_health_state_chunks: service_chunks,
        deployed_application_health_state_chunks: deployed_chunks,
    }))
}

fn service_chunk<'a>(
    evaluator: &HealthEvaluator<'a>,
    node: &'a EntityNode,
    state: HealthState,
    filters: &[&ServiceHealthStateFilter],
) -> HealthResult<Option<ServiceHealthStateChunk>> {
    let EntityId::Service { service_name } = &node.id else {
        return Ok(None);
    };
    let matched: Vec<&ServiceHealthStateFilter> = filters
        .iter()
        .copied()
        .filter(|f| key_matches(f.service_name_filter.as_deref(), service_name.as_str()) && f.health_state_filter.matches(state))
        .collect();
    if matched.is_empty() {
        return Ok(None);
    }

    let partition_filters = union(&matched, |f| f.partition_filters.as_slice());
    let partitions = evaluated_children(evaluator, node, EntityKind::Partition)?;
    let mut partition_chunks = HealthStateChunkList {
        items: Vec::new(),
        total_count: partitions.len() as u64,
    };
    if !partition_filters.is_empty() {
        for (partition, partition_result) in partitions {
            if let Some(chunk) = partition_chunk(evaluator, partition, partition_result.state, &partition_filters)? {
                partition_chunks.items.push(chunk);
            }
        }
    }

    Ok(Some(ServiceHealthStateChunk {
        service_name: service_name.clone(),
        health_state: state,
        partition_health_state_chunks: partition_chunks,
    }))
}

fn partition_chunk<'a>(
    evaluator: &HealthEvaluator<'a>,
    node: &'a EntityNode,
    state: HealthState,
    filters: &[&PartitionHealthStateFilter],
) -> HealthResult<Option<PartitionHealthStateChunk>> {
    let EntityId::Partition { partition_id } = &node.id else {
        return Ok(None);
    };
    let matched: Vec<&PartitionHealthStateFilter> = filters
        .iter()
        .copied()
        .filter(|f| key_matches(f.partition_id_filter.as_ref(), partition_id) && f.health_state_filter.matches(state))
        .collect();
    if matched.is_empty() {
        return Ok(None);
    }

    let replica_filters: Vec<&ReplicaHealthStateFilter> = union(&matched, |f| f.replica_filters.as_slice());
    let replicas = evaluated_children(evaluator, node, EntityKind::Replica)?;
    let total_count = replicas.len() as u64;
    let items = replicas
        .into_iter()
        .filter_map(|(replica, replica_result)| {
            let EntityId::Replica { replica_id, .. } = &replica.id else {
                return None;
            };
            replica_filters
                .iter()
                .any(|f| key_matches(f.replica_id_filter.as_ref(), replica_id) && f.health_state_filter.matches(replica_result.state))
                .then(|| ReplicaHealthStateChunk {
                    replica_id: *replica_id,
                    health_state: replica_result.state,
                })
        })
        .collect();

    Ok(Some(PartitionHealthStateChunk {
        partition_id: *partition_id,
        health_state: state,
        replica_health_state_chunks: HealthStateChunkList { items, total_count },
    }))
}

fn deployed_application_chunk<'a>(
    evaluator: &HealthEvaluator<'a>,
    node: &'a EntityNode,
    state: HealthState,
    filters: &[&DeployedApplicationHealthStateFilter],
) -> HealthResult<Option<DeployedApplicationHealthStateChunk>> {
    let EntityId::DeployedApplication { node_name, .. } = &node.id else {
        return Ok(None);
    };
    let matched: Vec<&DeployedApplicationHealthStateFilter> = filters
        .iter()
        .copied()
        .filter(|f| key_matches(f.node_name_filter.as_deref(), node_name.as_str()) && f.health_state_filter.matches(state))
        .collect();
    if matched.is_empty() {
        return Ok(None);
    }

    let package_filters: Vec<&DeployedServicePackageHealthStateFilter> =
        union(&matched, |f| f.deployed_service_package_filters.as_slice());
    let packages = evaluated_children(evaluator, node, EntityKind::DeployedServicePackage)?;
    let total_count = packages.len() as u64;
    let items = packages
        .into_iter()
        .filter_map(|(package, package_result)| {
            let EntityId::DeployedServicePackage {
                service_manifest_name,
                service_package_activation_id,
                ..
            } = &package.id
            else {
                return None;
            };
            package_filters
                .iter()
                .any(|f| {
                    key_matches(f.service_manifest_name_filter.as_deref(), service_manifest_name.as_str())
                        && key_matches(
                            f.service_package_activation_id_filter.as_deref(),
                            service_package_activation_id.as_str(),
                        )
                        && f.health_state_filter.matches(package_result.state)
                })
                .then(|| DeployedServicePackageHealthStateChunk {
                    service_manifest_name: service_manifest_name.clone(),
                    service_package_activation_id: service_package_activation_id.clone(),
                    health_state: package_result.state,
                })
        })
        .collect();

    Ok(Some(DeployedApplicationHealthStateChunk {
        node_name: node_name.clone(),
        health_state: state,
        deployed_service_package_health_state_chunks: HealthStateChunkList { items, total_count },
    }))
}
