mod health_query;
mod health_store;

pub use health_query::IHealthQuery;
pub use health_store::{IHealthStore, ReportOutcome};
