use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityKind, HealthState, Priority};

/// A single timestamped health assertion from one source about one property.
///
/// Events are replaced, never mutated in place. `is_expired` is materialized
/// when a snapshot is taken so evaluation never consults the clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthEvent {
    pub source_id: String,
    pub property: String,
    pub state: HealthState,
    pub description: String,
    pub sequence_number: i64,
    /// `None` means the event never expires.
    pub time_to_live: Option<Duration>,
    pub remove_when_expired: bool,
    pub source_utc_timestamp: DateTime<Utc>,
    pub last_modified_utc_timestamp: DateTime<Utc>,
    pub last_ok_transition_at: Option<DateTime<Utc>>,
    pub last_warning_transition_at: Option<DateTime<Utc>>,
    pub last_error_transition_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_expired: bool,
}

impl HealthEvent {
    /// Time at which the event expires, or `None` for an infinite TTL.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let ttl = chrono::Duration::from_std(self.time_to_live?).ok()?;
        self.last_modified_utc_timestamp.checked_add_signed(ttl)
    }

    /// Whether the event has outlived its TTL at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| now > at)
    }

    /// When the event entered its current state.
    pub fn last_transition_at(&self) -> DateTime<Utc> {
        let transition = match self.state {
            HealthState::Ok => self.last_ok_transition_at,
            HealthState::Warning => self.last_warning_transition_at,
            HealthState::Error => self.last_error_transition_at,
            HealthState::Invalid | HealthState::Unknown => None,
        };
        transition.unwrap_or(self.last_modified_utc_timestamp)
    }

    /// Priority of this event when reported on an entity of `kind`.
    pub fn priority(&self, kind: EntityKind) -> Priority {
        Priority::of(kind, &self.source_id, &self.property)
    }

    /// The `(source_id, property)` key under which the event is stored.
    pub fn key(&self) -> (&str, &str) {
        (&self.source_id, &self.property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(ttl: Option<Duration>) -> HealthEvent {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        HealthEvent {
            source_id: "System.FM".into(),
            property: "State".into(),
            state: HealthState::Error,
            description: String::new(),
            sequence_number: 1,
            time_to_live: ttl,
            remove_when_expired: false,
            source_utc_timestamp: at,
            last_modified_utc_timestamp: at,
            last_ok_transition_at: None,
            last_warning_transition_at: None,
            last_error_transition_at: Some(at - chrono::Duration::seconds(30)),
            is_expired: false,
        }
    }

    #[test]
    fn infinite_ttl_never_expires() {
        let e = event(None);
        let far = e.last_modified_utc_timestamp + chrono::Duration::days(3650);
        assert!(!e.is_expired_at(far));
    }

    #[test]
    fn finite_ttl_expires_strictly_after_deadline() {
        let e = event(Some(Duration::from_secs(60)));
        let deadline = e.last_modified_utc_timestamp + chrono::Duration::seconds(60);
        assert!(!e.is_expired_at(deadline));
        assert!(e.is_expired_at(deadline + chrono::Duration::seconds(1)));
    }

    #[test]
    fn transition_time_tracks_current_state() {
        let e = event(None);
        assert_eq!(e.last_transition_at(), e.last_error_transition_at.unwrap());
    }
}
