use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_DESCRIPTION_LENGTH;
use crate::errors::ReportError;

use super::{EntityAttributes, EntityId, HealthState, Priority, SequenceNumber};

/// Input unit of the write path.
///
/// A report either upserts the event keyed by `(source_id, property)` on
/// `entity`, or, when `is_for_delete` is set, tombstones the entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub entity: EntityId,
    #[serde(default)]
    pub attributes: EntityAttributes,
    pub source_id: String,
    pub property: String,
    pub state: HealthState,
    #[serde(default)]
    pub description: String,
    pub sequence_number: i64,
    pub time_to_live: Option<Duration>,
    #[serde(default)]
    pub remove_when_expired: bool,
    pub source_utc_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_for_delete: bool,
}

impl HealthReport {
    /// Report with a freshly generated sequence number and no expiry.
    pub fn new(
        entity: EntityId,
        source_id: impl Into<String>,
        property: impl Into<String>,
        state: HealthState,
    ) -> Self {
        Self {
            entity,
            attributes: EntityAttributes::default(),
            source_id: source_id.into(),
            property: property.into(),
            state,
            description: String::new(),
            sequence_number: SequenceNumber::next(),
            time_to_live: None,
            remove_when_expired: false,
            source_utc_timestamp: Utc::now(),
            is_for_delete: false,
        }
    }

    /// Tombstone for `entity`, stale-checked against `sequence_number`.
    pub fn delete(entity: EntityId, source_id: impl Into<String>, sequence_number: i64) -> Self {
        Self {
            entity,
            attributes: EntityAttributes::default(),
            source_id: source_id.into(),
            property: String::new(),
            state: HealthState::Ok,
            description: String::new(),
            sequence_number,
            time_to_live: None,
            remove_when_expired: false,
            source_utc_timestamp: Utc::now(),
            is_for_delete: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_sequence_number(mut self, sequence_number: i64) -> Self {
        self.sequence_number = sequence_number;
        self
    }

    pub fn with_time_to_live(mut self, time_to_live: Duration, remove_when_expired: bool) -> Self {
        self.time_to_live = Some(time_to_live);
        self.remove_when_expired = remove_when_expired;
        self
    }

    pub fn with_attributes(mut self, attributes: EntityAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_source_utc_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.source_utc_timestamp = timestamp;
        self
    }

    /// Deletes always run at the highest priority.
    pub fn priority(&self) -> Priority {
        if self.is_for_delete {
            Priority::Critical
        } else {
            Priority::of(self.entity.kind(), &self.source_id, &self.property)
        }
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        if self.source_id.is_empty() {
            return Err(ReportError::EmptySourceId);
        }
        if self.is_for_delete {
            return Ok(());
        }
        if self.property.is_empty() {
            return Err(ReportError::EmptyProperty);
        }
        let length = self.description.chars().count();
        if length > MAX_DESCRIPTION_LENGTH {
            return Err(ReportError::DescriptionTooLong {
                length,
                max: MAX_DESCRIPTION_LENGTH,
            });
        }
        if !self.state.is_reportable() {
            return Err(ReportError::InvalidState { state: self.state });
        }
        Ok(())
    }
}
