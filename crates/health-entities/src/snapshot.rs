//! Immutable arena of entities taken at one instant.
//!
//! Entities live in a `Vec`; identities map to indices and parent/child
//! links are index lists, so evaluation walks the hierarchy without
//! touching the live store or holding any lock.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use health_core::models::{
    authority_sources, is_system_source, EntityAttributes, EntityId, EntityKind, HealthEvent,
};

use crate::hierarchy::parent_of;

/// One entity as seen by the evaluator.
#[derive(Debug, Clone)]
pub struct EntityNode {
    pub id: EntityId,
    pub attributes: EntityAttributes,
    /// Current events. Expired events that asked to be removed are gone;
    /// other expired events carry `is_expired = true`.
    pub events: Vec<HealthEvent>,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl EntityNode {
    pub fn new(id: EntityId, attributes: EntityAttributes, events: Vec<HealthEvent>) -> Self {
        Self {
            id,
            attributes,
            events,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.id.kind()
    }

    pub fn has_data(&self) -> bool {
        !self.events.is_empty()
    }

    /// Whether some system component reported on this entity.
    pub fn has_system_report(&self) -> bool {
        self.events.iter().any(|e| is_system_source(&e.source_id))
    }

    /// Entities whose existence is owned by a system component.
    ///
    /// The cluster and the system and ad-hoc applications have no authority.
    pub fn expects_system_report(&self) -> bool {
        !authority_sources(self.kind()).is_empty()
            && !self.id.is_system_application()
            && !self.id.is_ad_hoc_application()
    }

    /// A parent evaluates this child only when it has data and, where a
    /// system report is expected, that report has arrived.
    pub fn is_visible_to_parent(&self) -> bool {
        self.has_data() && (!self.expects_system_report() || self.has_system_report())
    }

    pub fn upgrade_domain(&self) -> Option<&str> {
        self.attributes.upgrade_domain.as_deref()
    }

    pub fn application_type_name(&self) -> Option<&str> {
        self.attributes.application_type_name.as_deref()
    }

    pub fn service_type_name(&self) -> Option<&str> {
        self.attributes.service_type_name.as_deref()
    }
}

/// Immutable view of the store.
#[derive(Debug, Clone)]
pub struct HealthSnapshot {
    taken_at: DateTime<Utc>,
    nodes: Vec<EntityNode>,
    index: HashMap<EntityId, usize>,
    by_kind: BTreeMap<EntityKind, Vec<usize>>,
}

impl HealthSnapshot {
    /// Build the arena, materializing expiry at `now` and linking parents.
    pub fn build(entities: impl IntoIterator<Item = EntityNode>, now: DateTime<Utc>) -> Self {
        let mut nodes: Vec<EntityNode> = entities
            .into_iter()
            .map(|mut node| {
                node.events
                    .retain(|e| !(e.remove_when_expired && e.is_expired_at(now)));
                for event in &mut node.events {
                    event.is_expired = event.is_expired_at(now);
                }
                node.parent = None;
                node.children.clear();
                node
            })
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let index: HashMap<EntityId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let mut by_kind: BTreeMap<EntityKind, Vec<usize>> = BTreeMap::new();
        let mut links = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            by_kind.entry(node.kind()).or_default().push(i);
            // Cluster-level children are listed by kind instead.
            if let Some(parent) = parent_of(&node.id, &node.attributes)
                .filter(|p| *p != EntityId::Cluster)
                .and_then(|p| index.get(&p).copied())
            {
                links.push((parent, i));
            }
        }
        for (parent, child) in links {
            nodes[child].parent = Some(parent);
            nodes[parent].children.push(child);
        }

        Self {
            taken_at: now,
            nodes,
            index,
            by_kind,
        }
    }

    pub fn empty(now: DateTime<Utc>) -> Self {
        Self::build(Vec::new(), now)
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &EntityId) -> Option<&EntityNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn cluster(&self) -> Option<&EntityNode> {
        self.get(&EntityId::Cluster)
    }

    /// Every entity of `kind`, ordered by identity.
    pub fn entities_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &EntityNode> {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flatten()
            .map(move |&i| &self.nodes[i])
    }

    pub fn parent(&self, node: &EntityNode) -> Option<&EntityNode> {
        node.parent.map(|i| &self.nodes[i])
    }

    /// Children of `node` of the given kind, ordered by identity.
    pub fn children_of_kind<'a>(
        &'a self,
        node: &'a EntityNode,
        kind: EntityKind,
    ) -> impl Iterator<Item = &'a EntityNode> + 'a {
        node.children
            .iter()
            .map(move |&i| &self.nodes[i])
            .filter(move |child| child.kind() == kind)
    }

    /// Walk up until an entity of `kind` is found.
    pub fn ancestor_of_kind<'a>(&'a self, node: &'a EntityNode, kind: EntityKind) -> Option<&'a EntityNode> {
        let mut current = Some(node);
        while let Some(n) = current {
            if n.kind() == kind {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }
}
