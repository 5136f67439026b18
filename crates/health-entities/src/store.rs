//! EntityStore: concurrent per-entity event sets via DashMap.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use health_core::config::defaults::DEFAULT_TOMBSTONE_RETENTION_SECS;
use health_core::errors::{HealthError, HealthResult, ReportError};
use health_core::models::{EntityId, HealthEvent, HealthReport};
use health_core::traits::{IHealthStore, ReportOutcome};
use health_observability::report_span;
use health_observability::tracing_setup::events;

use crate::record::EntityRecord;
use crate::snapshot::{EntityNode, HealthSnapshot};

/// Thread-safe store of entity records.
///
/// Writes to one entity serialize on its map entry; writes to different
/// entities proceed in parallel. Deleted entities stay as tombstones for
/// `tombstone_retention` so late reports from the deleting source are
/// still rejected; [`cleanup_expired`](IHealthStore::cleanup_expired)
/// drops them afterwards.
pub struct EntityStore {
    entities: DashMap<EntityId, EntityRecord>,
    tombstone_retention: Duration,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: DashMap::new(),
            tombstone_retention: Duration::seconds(DEFAULT_TOMBSTONE_RETENTION_SECS),
        }
    }

    pub fn with_tombstone_retention(mut self, retention: Duration) -> Self {
        self.tombstone_retention = retention;
        self
    }

    /// Apply a report as of `now`.
    pub fn report_at(&self, report: &HealthReport, now: DateTime<Utc>) -> HealthResult<ReportOutcome> {
        let _span = report_span!(report.entity, report.source_id).entered();
        report.validate()?;
        if report.is_for_delete {
            return self.delete(report, now);
        }

        let result = match self.entities.entry(report.entity.clone()) {
            Entry::Occupied(mut entry) => entry.get_mut().apply(report, now).map(|revived| {
                if revived {
                    ReportOutcome::Created
                } else {
                    ReportOutcome::Updated
                }
            }),
            Entry::Vacant(entry) => {
                let mut record = EntityRecord::new(report.entity.clone());
                record.apply(report, now).map(|_| {
                    entry.insert(record);
                    ReportOutcome::Created
                })
            }
        };

        match &result {
            Ok(_) => events::report_accepted(&report.entity, &report.source_id, &report.property, report.state),
            Err(ReportError::StaleSequenceNumber { received, current }) => {
                events::stale_report_rejected(&report.entity, &report.source_id, *received, *current)
            }
            Err(_) => {}
        }
        result.map_err(HealthError::from)
    }

    fn delete(&self, report: &HealthReport, now: DateTime<Utc>) -> HealthResult<ReportOutcome> {
        let not_found = || HealthError::EntityNotFound {
            entity: report.entity.clone(),
        };
        {
            let mut record = self.entities.get_mut(&report.entity).ok_or_else(not_found)?;
            if record.is_deleted() {
                return Err(not_found());
            }
            if let Err(e) = record.check_delete(report) {
                if let ReportError::StaleSequenceNumber { received, current } = &e {
                    events::stale_report_rejected(&report.entity, &report.source_id, *received, *current);
                }
                return Err(e.into());
            }
            record.tombstone(&report.source_id, report.sequence_number, now);
        }

        let descendants = self.descendants_of(&report.entity);
        for id in &descendants {
            if let Some(mut record) = self.entities.get_mut(id) {
                record.tombstone(&report.source_id, report.sequence_number, now);
            }
        }
        events::entity_deleted(&report.entity, descendants.len());
        Ok(ReportOutcome::Deleted {
            entities: descendants.len() + 1,
        })
    }

    /// Live entities below `target`, ordered by identity.
    fn descendants_of(&self, target: &EntityId) -> Vec<EntityId> {
        // Copy the parent map out first so no shard lock is held while walking.
        let parents: HashMap<EntityId, EntityId> = self
            .entities
            .iter()
            .filter(|r| !r.is_deleted())
            .filter_map(|r| r.parent().map(|p| (r.key().clone(), p)))
            .collect();
        let mut found: Vec<EntityId> = parents
            .keys()
            .filter(|id| {
                let mut current = parents.get(*id);
                while let Some(parent) = current {
                    if parent == target {
                        return true;
                    }
                    current = parents.get(parent);
                }
                false
            })
            .cloned()
            .collect();
        found.sort();
        found
    }

    /// Records held, tombstones included.
    pub fn record_count(&self) -> usize {
        self.entities.len()
    }

    /// Drop tombstones older than the retention that no live entity sits
    /// below. Returns how many went.
    fn purge_tombstones(&self, now: DateTime<Utc>) -> usize {
        let parents: HashMap<EntityId, EntityId> = self
            .entities
            .iter()
            .filter_map(|r| r.parent().map(|p| (r.key().clone(), p)))
            .collect();
        let mut ancestors_of_live: HashSet<EntityId> = HashSet::new();
        for record in self.entities.iter().filter(|r| !r.is_deleted()) {
            let mut current = parents.get(record.key());
            while let Some(parent) = current {
                if !ancestors_of_live.insert(parent.clone()) {
                    break;
                }
                current = parents.get(parent);
            }
        }

        let mut purged = 0;
        self.entities.retain(|id, record| {
            let keep = match record.deleted_at() {
                Some(at) => at + self.tombstone_retention > now || ancestors_of_live.contains(id),
                None => true,
            };
            if !keep {
                purged += 1;
            }
            keep
        });
        purged
    }

    /// Events of `entity` with expiry materialized at `now`.
    pub fn get_events_at(&self, entity: &EntityId, now: DateTime<Utc>) -> HealthResult<Vec<HealthEvent>> {
        let record = self
            .entities
            .get(entity)
            .filter(|r| !r.is_deleted())
            .ok_or_else(|| HealthError::EntityNotFound {
                entity: entity.clone(),
            })?;
        Ok(record
            .events()
            .map(|e| {
                let mut e = e.clone();
                e.is_expired = e.is_expired_at(now);
                e
            })
            .collect())
    }

    /// Immutable snapshot of every live entity as of `now`.
    pub fn snapshot(&self, now: DateTime<Utc>) -> HealthSnapshot {
        let nodes: Vec<EntityNode> = self
            .entities
            .iter()
            .filter(|r| !r.is_deleted())
            .map(|r| EntityNode::new(r.id().clone(), r.attributes().clone(), r.events().cloned().collect()))
            .collect();
        HealthSnapshot::build(nodes, now)
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IHealthStore for EntityStore {
    fn report(&self, report: &HealthReport) -> HealthResult<ReportOutcome> {
        self.report_at(report, Utc::now())
    }

    fn report_batch(&self, reports: &[HealthReport]) -> Vec<HealthResult<ReportOutcome>> {
        let now = Utc::now();
        reports.iter().map(|r| self.report_at(r, now)).collect()
    }

    fn delete_entity(
        &self,
        entity: &EntityId,
        source_id: &str,
        sequence_number: i64,
    ) -> HealthResult<ReportOutcome> {
        self.report(&HealthReport::delete(entity.clone(), source_id, sequence_number))
    }

    fn get_events(&self, entity: &EntityId) -> HealthResult<Vec<HealthEvent>> {
        self.get_events_at(entity, Utc::now())
    }

    fn entity_count(&self) -> usize {
        self.entities.iter().filter(|r| !r.is_deleted()).count()
    }

    fn cleanup_expired(&self, now: DateTime<Utc>) -> usize {
        let removed: usize = self
            .entities
            .iter_mut()
            .map(|mut r| r.remove_expired(now))
            .sum();
        if removed > 0 {
            events::expired_events_removed(removed);
        }
        let purged = self.purge_tombstones(now);
        if purged > 0 {
            events::tombstones_purged(purged);
        }
        removed
    }
}
