//! Default values for every configuration section.

/// Maximum child evaluations kept per plural evaluation.
pub const DEFAULT_MAX_CHILD_EVALUATIONS: usize = 10;
/// Depth at which plural evaluations stop carrying children.
pub const DEFAULT_MAX_EVALUATION_DEPTH: usize = 8;
/// Report count above which an entity is flagged.
pub const DEFAULT_MAX_SUGGESTED_REPORTS_PER_ENTITY: usize = 100;
/// Seconds a deleted entity is remembered before cleanup may drop it.
pub const DEFAULT_TOMBSTONE_RETENTION_SECS: i64 = 3600;

pub const DEFAULT_MAX_PERCENT_DELTA_UNHEALTHY_NODES: u8 = 10;
pub const DEFAULT_MAX_PERCENT_UPGRADE_DOMAIN_DELTA_UNHEALTHY_NODES: u8 = 15;

pub const DEFAULT_LOG_LEVEL: &str = "info";
