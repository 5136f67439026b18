use crate::models::HealthState;

/// Errors raised while validating or applying a health report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("source id must not be empty")]
    EmptySourceId,

    #[error("property must not be empty")]
    EmptyProperty,

    #[error("description length {length} exceeds the maximum of {max}")]
    DescriptionTooLong { length: usize, max: usize },

    #[error("health state {state} cannot be reported")]
    InvalidState { state: HealthState },

    #[error("stale report: sequence number {received} is not newer than {current}")]
    StaleSequenceNumber { received: i64, current: i64 },
}
