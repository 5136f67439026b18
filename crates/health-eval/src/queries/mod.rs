//! Health queries over an evaluator: entity and cluster health, paged
//! aggregated states and health state chunks.

mod chunk;

pub use chunk::get_cluster_health_chunk;

use health_core::errors::{HealthError, HealthResult};
use health_core::models::{
    ChildHealthState, ClusterHealth, ClusterHealthQuery, EntityHealth, EntityId, EntityKind, GetHealthQuery,
    HealthEvent, HealthStateFilter, HealthStatistics, PagedList, PagingQuery,
};
use health_entities::EntityNode;
use health_observability::query_span;

use crate::evaluator::{ensure_contract, trim_evaluations, HealthEvaluator};
use crate::events::effective_state;

/// Health of one entity with its events and direct children.
pub fn get_health(evaluator: &HealthEvaluator<'_>, query: &GetHealthQuery) -> HealthResult<EntityHealth> {
    let _span = query_span!(query.entity).entered();
    let result = evaluator
        .evaluate(&query.entity)?
        .ok_or_else(|| HealthError::EntityNotFound {
            entity: query.entity.clone(),
        })?;

    let events = evaluator
        .snapshot()
        .get(&query.entity)
        .map(|node| filter_events(node, query.events_filter))
        .unwrap_or_default();
    let children = filter_children(result.children, query.children_filter);
    let mut unhealthy_evaluations = result.unhealthy_evaluations;
    ensure_contract(result.state, &unhealthy_evaluations)?;
    trim_evaluations(&mut unhealthy_evaluations, evaluator.config());

    Ok(EntityHealth {
        entity: result.entity,
        aggregated_health_state: result.state,
        events,
        unhealthy_evaluations,
        children,
        health_statistics: query
            .include_health_statistics
            .then(|| HealthStatistics::new(result.statistics)),
    })
}

/// Health of the whole cluster with node and application states.
pub fn get_cluster_health(evaluator: &HealthEvaluator<'_>, query: &ClusterHealthQuery) -> HealthResult<ClusterHealth> {
    let _span = query_span!(EntityId::Cluster).entered();
    let cluster = evaluator.evaluate_cluster(None)?;

    let events = evaluator
        .snapshot()
        .cluster()
        .map(|node| filter_events(node, query.events_filter))
        .unwrap_or_default();
    let mut unhealthy_evaluations = cluster.unhealthy_evaluations;
    ensure_contract(cluster.state, &unhealthy_evaluations)?;
    trim_evaluations(&mut unhealthy_evaluations, evaluator.config());

    Ok(ClusterHealth {
        aggregated_health_state: cluster.state,
        events,
        unhealthy_evaluations,
        node_health_states: filter_children(cluster.node_states, query.nodes_filter),
        application_health_states: filter_children(cluster.application_states, query.applications_filter),
        health_statistics: query
            .include_health_statistics
            .then(|| HealthStatistics::new(cluster.statistics)),
    })
}

/// Aggregated states of nodes, ordered by name, one page at a time.
pub fn get_nodes_aggregated_health_states(
    evaluator: &HealthEvaluator<'_>,
    paging: &PagingQuery,
) -> HealthResult<PagedList<ChildHealthState>> {
    paged_states(evaluator, EntityKind::Node, paging)
}

/// Aggregated states of applications, ordered by name, one page at a time.
pub fn get_applications_aggregated_health_states(
    evaluator: &HealthEvaluator<'_>,
    paging: &PagingQuery,
) -> HealthResult<PagedList<ChildHealthState>> {
    paged_states(evaluator, EntityKind::Application, paging)
}

/// The continuation token is the name of the last returned entity; the
/// next page starts strictly after it.
fn paged_states(
    evaluator: &HealthEvaluator<'_>,
    kind: EntityKind,
    paging: &PagingQuery,
) -> HealthResult<PagedList<ChildHealthState>> {
    if let Some(token) = paging.continuation_token.as_deref().filter(|t| t.is_empty()) {
        return Err(HealthError::InvalidContinuationToken {
            token: token.to_string(),
        });
    }
    let limit = paging.max_results.filter(|&n| n > 0).unwrap_or(usize::MAX);

    let mut remaining = evaluator
        .snapshot()
        .entities_of_kind(kind)
        .filter(|n| n.is_visible_to_parent())
        .filter(|n| match (paging.continuation_token.as_deref(), paging_key(n)) {
            (Some(token), Some(key)) => key > token,
            _ => true,
        })
        .peekable();
    let mut page = Vec::new();
    while page.len() < limit {
        match remaining.next() {
            Some(node) => page.push(node),
            None => break,
        }
    }
    let has_more = remaining.peek().is_some();

    let continuation_token = if has_more {
        page.last().and_then(|n| paging_key(n)).map(str::to_string)
    } else {
        None
    };
    let items = evaluator
        .evaluate_all(page)?
        .into_iter()
        .map(|(_, result)| ChildHealthState {
            entity: result.entity,
            aggregated_health_state: result.state,
        })
        .collect();
    Ok(PagedList {
        items,
        continuation_token,
    })
}

fn paging_key(node: &EntityNode) -> Option<&str> {
    match &node.id {
        EntityId::Node { node_name } => Some(node_name),
        other => other.application_name(),
    }
}

fn filter_events(node: &EntityNode, filter: HealthStateFilter) -> Vec<HealthEvent> {
    node.events
        .iter()
        .filter(|e| filter.matches(effective_state(e, false)))
        .cloned()
        .collect()
}

fn filter_children(children: Vec<ChildHealthState>, filter: HealthStateFilter) -> Vec<ChildHealthState> {
    children
        .into_iter()
        .filter(|c| filter.matches(c.aggregated_health_state))
        .collect()
}
