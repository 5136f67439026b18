use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::HealthResult;
use crate::models::{EntityId, HealthEvent, HealthReport};

/// What an accepted report did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportOutcome {
    /// The entity did not exist before this report.
    Created,
    Updated,
    /// Tombstone applied to this many entities, the target included.
    Deleted { entities: usize },
}

/// Write side of the health store.
///
/// Stale reports fail with `ReportError::StaleSequenceNumber`; writes to
/// one entity are serialized, writes to different entities are not.
pub trait IHealthStore: Send + Sync {
    // --- Ingestion ---
    fn report(&self, report: &HealthReport) -> HealthResult<ReportOutcome>;
    fn report_batch(&self, reports: &[HealthReport]) -> Vec<HealthResult<ReportOutcome>>;
    fn delete_entity(
        &self,
        entity: &EntityId,
        source_id: &str,
        sequence_number: i64,
    ) -> HealthResult<ReportOutcome>;

    // --- Reads ---
    fn get_events(&self, entity: &EntityId) -> HealthResult<Vec<HealthEvent>>;
    fn entity_count(&self) -> usize;

    // --- Maintenance ---
    /// Drop expired events marked `remove_when_expired`. Returns how many went.
    ///
    /// Implementations may also forget deleted entities here.
    fn cleanup_expired(&self, now: DateTime<Utc>) -> usize;
}
