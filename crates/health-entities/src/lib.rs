//! # health-entities
//!
//! The write path of the health engine. Reports are validated and merged
//! into per-entity event sets held in a concurrent map; readers take an
//! immutable [`HealthSnapshot`] and never touch live state.

pub mod hierarchy;
pub mod record;
pub mod snapshot;
pub mod store;

pub use record::EntityRecord;
pub use snapshot::{EntityNode, HealthSnapshot};
pub use store::EntityStore;
