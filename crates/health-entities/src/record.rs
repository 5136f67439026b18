//! Per-entity event set.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use health_core::errors::ReportError;
use health_core::models::{EntityAttributes, EntityId, HealthEvent, HealthReport, HealthState};

use crate::hierarchy::parent_of;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Tombstone {
    source_id: String,
    sequence_number: i64,
    deleted_at: DateTime<Utc>,
}

/// Live state of one entity: its attributes and one event per
/// `(source_id, property)`.
#[derive(Debug, Clone)]
pub struct EntityRecord {
    id: EntityId,
    attributes: EntityAttributes,
    events: BTreeMap<(String, String), HealthEvent>,
    /// Highest sequence number accepted per source.
    source_sequences: HashMap<String, i64>,
    tombstone: Option<Tombstone>,
}

impl EntityRecord {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            attributes: EntityAttributes::default(),
            events: BTreeMap::new(),
            source_sequences: HashMap::new(),
            tombstone: None,
        }
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn attributes(&self) -> &EntityAttributes {
        &self.attributes
    }

    /// Current events, ordered by `(source_id, property)`.
    pub fn events(&self) -> impl Iterator<Item = &HealthEvent> {
        self.events.values()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn is_deleted(&self) -> bool {
        self.tombstone.is_some()
    }

    /// When the entity was deleted, if it is.
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.tombstone.as_ref().map(|t| t.deleted_at)
    }

    pub fn parent(&self) -> Option<EntityId> {
        parent_of(&self.id, &self.attributes)
    }

    /// Merge a report. Returns `true` when it revived a deleted entity.
    pub(crate) fn apply(&mut self, report: &HealthReport, now: DateTime<Utc>) -> Result<bool, ReportError> {
        let revived = match &self.tombstone {
            Some(t) if t.source_id == report.source_id && report.sequence_number <= t.sequence_number => {
                return Err(ReportError::StaleSequenceNumber {
                    received: report.sequence_number,
                    current: t.sequence_number,
                });
            }
            Some(_) => true,
            None => false,
        };

        let key = (report.source_id.clone(), report.property.clone());
        let previous = self.events.get(&key);
        if let Some(current) = previous {
            let newer = report.sequence_number > current.sequence_number
                || (report.sequence_number == current.sequence_number
                    && report.source_utc_timestamp > current.source_utc_timestamp);
            if !newer {
                return Err(ReportError::StaleSequenceNumber {
                    received: report.sequence_number,
                    current: current.sequence_number,
                });
            }
        }
        let event = build_event(report, previous, now);

        if revived {
            self.tombstone = None;
            self.events.clear();
        }
        self.events.insert(key, event);
        self.attributes.merge(&report.attributes);
        let highest = self
            .source_sequences
            .entry(report.source_id.clone())
            .or_insert(report.sequence_number);
        *highest = (*highest).max(report.sequence_number);
        Ok(revived)
    }

    /// A delete must be newer than anything its source already reported.
    pub(crate) fn check_delete(&self, report: &HealthReport) -> Result<(), ReportError> {
        let current = match &self.tombstone {
            Some(t) if t.source_id == report.source_id => Some(t.sequence_number),
            _ => self.source_sequences.get(&report.source_id).copied(),
        };
        match current {
            Some(current) if report.sequence_number <= current => Err(ReportError::StaleSequenceNumber {
                received: report.sequence_number,
                current,
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn tombstone(&mut self, source_id: &str, sequence_number: i64, now: DateTime<Utc>) {
        self.events.clear();
        self.tombstone = Some(Tombstone {
            source_id: source_id.to_string(),
            sequence_number,
            deleted_at: now,
        });
    }

    /// Drop expired events that asked to be removed. Returns how many went.
    pub(crate) fn remove_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.events.len();
        self.events
            .retain(|_, e| !(e.remove_when_expired && e.is_expired_at(now)));
        before - self.events.len()
    }
}

fn build_event(report: &HealthReport, previous: Option<&HealthEvent>, now: DateTime<Utc>) -> HealthEvent {
    let (mut ok_at, mut warning_at, mut error_at) = previous
        .map(|p| {
            (
                p.last_ok_transition_at,
                p.last_warning_transition_at,
                p.last_error_transition_at,
            )
        })
        .unwrap_or_default();
    if previous.map_or(true, |p| p.state != report.state) {
        match report.state {
            HealthState::Ok => ok_at = Some(now),
            HealthState::Warning => warning_at = Some(now),
            HealthState::Error => error_at = Some(now),
            HealthState::Invalid | HealthState::Unknown => {}
        }
    }
    HealthEvent {
        source_id: report.source_id.clone(),
        property: report.property.clone(),
        state: report.state,
        description: report.description.clone(),
        sequence_number: report.sequence_number,
        time_to_live: report.time_to_live,
        remove_when_expired: report.remove_when_expired,
        source_utc_timestamp: report.source_utc_timestamp,
        last_modified_utc_timestamp: now,
        last_ok_transition_at: ok_at,
        last_warning_transition_at: warning_at,
        last_error_transition_at: error_at,
        is_expired: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn report(seq: i64, state: HealthState) -> HealthReport {
        HealthReport::new(EntityId::node("N1"), "Watchdog", "Disk", state).with_sequence_number(seq)
    }

    #[test]
    fn newer_sequence_replaces() {
        let mut record = EntityRecord::new(EntityId::node("N1"));
        let now = Utc::now();
        record.apply(&report(1, HealthState::Ok), now).unwrap();
        record.apply(&report(2, HealthState::Error), now).unwrap();
        assert_eq!(record.event_count(), 1);
        assert_eq!(record.events().next().unwrap().state, HealthState::Error);
    }

    #[test]
    fn equal_sequence_needs_newer_source_timestamp() {
        let mut record = EntityRecord::new(EntityId::node("N1"));
        let now = Utc::now();
        let first = report(5, HealthState::Ok).with_source_utc_timestamp(now);
        record.apply(&first, now).unwrap();

        let same = report(5, HealthState::Error).with_source_utc_timestamp(now);
        assert!(record.apply(&same, now).is_err());

        let later = report(5, HealthState::Error).with_source_utc_timestamp(now + Duration::seconds(1));
        record.apply(&later, now).unwrap();
        assert_eq!(record.events().next().unwrap().state, HealthState::Error);
    }

    #[test]
    fn transitions_carry_over_when_state_is_unchanged() {
        let mut record = EntityRecord::new(EntityId::node("N1"));
        let t0 = Utc::now();
        let t1 = t0 + Duration::seconds(30);
        let t2 = t0 + Duration::seconds(60);
        record.apply(&report(1, HealthState::Warning), t0).unwrap();
        record.apply(&report(2, HealthState::Warning), t1).unwrap();
        let e = record.events().next().unwrap();
        assert_eq!(e.last_warning_transition_at, Some(t0));
        assert_eq!(e.last_modified_utc_timestamp, t1);

        record.apply(&report(3, HealthState::Error), t2).unwrap();
        let e = record.events().next().unwrap();
        assert_eq!(e.last_warning_transition_at, Some(t0));
        assert_eq!(e.last_error_transition_at, Some(t2));
    }

    #[test]
    fn tombstone_rejects_older_reports_from_the_deleting_source() {
        let mut record = EntityRecord::new(EntityId::node("N1"));
        let now = Utc::now();
        record.apply(&report(1, HealthState::Ok), now).unwrap();
        record.tombstone("Watchdog", 10, now);
        assert_eq!(record.deleted_at(), Some(now));
        assert!(record.apply(&report(9, HealthState::Ok), now).is_err());
        assert!(record.apply(&report(11, HealthState::Ok), now).unwrap());
        assert!(!record.is_deleted());
        assert_eq!(record.deleted_at(), None);
    }
}
