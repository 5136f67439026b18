/// Policy construction and validation errors.
///
/// Thresholds are never clamped: a bad value is rejected where it enters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("percent value {value} is out of range 0-100")]
    PercentOutOfRange { value: u32 },

    #[error("invalid percent token '{token}'")]
    InvalidPercentToken { token: String },

    #[error("{field} must not be empty")]
    EmptyFilterKey { field: &'static str },

    #[error("baseline error count {error_count} exceeds total count {total_count}")]
    InconsistentBaseline { error_count: u32, total_count: u32 },
}
