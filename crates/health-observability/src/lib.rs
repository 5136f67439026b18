//! # health-observability
//!
//! Structured tracing for the health engine: subscriber setup driven by
//! [`ObservabilityConfig`](health_core::config::ObservabilityConfig), span
//! macros for the report, evaluation, upgrade-check and query paths, and
//! one function per structured trace event.

pub mod tracing_setup;

#[doc(hidden)]
pub use tracing;

pub use tracing_setup::{init_tracing, init_tracing_with_filter};
