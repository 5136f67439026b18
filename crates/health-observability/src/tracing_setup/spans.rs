//! Span definitions per operation: report, evaluation, upgrade check, query.

/// Create a report ingestion span.
#[macro_export]
macro_rules! report_span {
    ($entity:expr, $source_id:expr) => {
        $crate::tracing::debug_span!("health.report", entity = %$entity, source_id = %$source_id)
    };
}

/// Create an entity evaluation span.
#[macro_export]
macro_rules! evaluation_span {
    ($entity:expr) => {
        $crate::tracing::debug_span!("health.evaluation", entity = %$entity)
    };
}

/// Create a cluster upgrade check span.
#[macro_export]
macro_rules! upgrade_check_span {
    ($upgrade_domain_count:expr, $has_baseline:expr) => {
        $crate::tracing::info_span!(
            "health.upgrade_check",
            upgrade_domains = $upgrade_domain_count,
            has_baseline = $has_baseline
        )
    };
}

/// Create a query span.
#[macro_export]
macro_rules! query_span {
    ($query:expr) => {
        $crate::tracing::info_span!("health.query", query = %$query)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const REPORT: &str = "health.report";
    pub const EVALUATION: &str = "health.evaluation";
    pub const UPGRADE_CHECK: &str = "health.upgrade_check";
    pub const QUERY: &str = "health.query";
}
