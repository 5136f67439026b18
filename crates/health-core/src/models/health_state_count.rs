//! Health state counters used for statistics and child rollups.
//!
//! # Examples
//!
//! ```
//! use health_core::models::{HealthState, HealthStateCount};
//!
//! let mut a = HealthStateCount::new();
//! a.add(HealthState::Ok);
//! a.add(HealthState::Error);
//!
//! let mut b = HealthStateCount::new();
//! b.add(HealthState::Warning);
//!
//! a.append_count(&b);
//! assert_eq!(a.total(), 3);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{EntityKind, HealthState};

/// Counts of Ok, Warning and Error entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HealthStateCount {
    pub ok_count: u64,
    pub warning_count: u64,
    pub error_count: u64,
}

impl HealthStateCount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter matching `state`. Unknown and Invalid are not counted.
    pub fn add(&mut self, state: HealthState) {
        match state {
            HealthState::Ok => self.ok_count += 1,
            HealthState::Warning => self.warning_count += 1,
            HealthState::Error => self.error_count += 1,
            HealthState::Invalid | HealthState::Unknown => {}
        }
    }

    /// Merge another counter into this one.
    pub fn append_count(&mut self, other: &HealthStateCount) {
        self.ok_count += other.ok_count;
        self.warning_count += other.warning_count;
        self.error_count += other.error_count;
    }

    pub fn total(&self) -> u64 {
        self.ok_count + self.warning_count + self.error_count
    }

    /// Children counted against an unhealthy threshold.
    pub fn unhealthy_count(&self, consider_warning_as_error: bool) -> u64 {
        if consider_warning_as_error {
            self.error_count + self.warning_count
        } else {
            self.error_count
        }
    }
}

impl fmt::Display for HealthStateCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ok:{}/warning:{}/error:{}",
            self.ok_count, self.warning_count, self.error_count
        )
    }
}

/// Per-kind counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStateCountMap {
    counts: BTreeMap<EntityKind, HealthStateCount>,
}

impl HealthStateCountMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: EntityKind, state: HealthState) {
        self.counts.entry(kind).or_default().add(state);
    }

    /// Merge one counter for `kind`.
    pub fn append_count(&mut self, kind: EntityKind, count: &HealthStateCount) {
        self.counts.entry(kind).or_default().append_count(count);
    }

    /// Merge every counter of another map.
    pub fn append_map(&mut self, other: &HealthStateCountMap) {
        for (kind, count) in &other.counts {
            self.append_count(*kind, count);
        }
    }

    pub fn get(&self, kind: EntityKind) -> HealthStateCount {
        self.counts.get(&kind).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &HealthStateCount)> {
        self.counts.iter().map(|(k, v)| (*k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Descendant counts returned with an entity's health when requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatistics {
    pub health_state_counts: HealthStateCountMap,
}

impl HealthStatistics {
    pub fn new(health_state_counts: HealthStateCountMap) -> Self {
        Self {
            health_state_counts,
        }
    }

    pub fn count(&self, kind: EntityKind) -> HealthStateCount {
        self.health_state_counts.get(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_is_not_counted() {
        let mut c = HealthStateCount::new();
        c.add(HealthState::Unknown);
        c.add(HealthState::Invalid);
        assert_eq!(c.total(), 0);
    }

    #[test]
    fn unhealthy_count_respects_warning_policy() {
        let c = HealthStateCount {
            ok_count: 4,
            warning_count: 2,
            error_count: 1,
        };
        assert_eq!(c.unhealthy_count(false), 1);
        assert_eq!(c.unhealthy_count(true), 3);
    }

    #[test]
    fn map_merge_adds_per_kind() {
        let mut a = HealthStateCountMap::new();
        a.add(EntityKind::Node, HealthState::Ok);
        let mut b = HealthStateCountMap::new();
        b.add(EntityKind::Node, HealthState::Error);
        b.add(EntityKind::Replica, HealthState::Warning);
        a.append_map(&b);
        assert_eq!(a.get(EntityKind::Node).total(), 2);
        assert_eq!(a.get(EntityKind::Replica).warning_count, 1);
        assert_eq!(a.get(EntityKind::Service).total(), 0);
    }
}
