//! Error types for the health engine.
//!
//! [`HealthError`] is the crate-wide error. Each subsystem has its own error
//! enum that converts into it via `#[from]`.

pub mod evaluation_error;
pub mod health_error;
pub mod policy_error;
pub mod report_error;

pub use evaluation_error::EvaluationError;
pub use health_error::{HealthError, HealthResult};
pub use policy_error::PolicyError;
pub use report_error::ReportError;
