//! Parent derivation.
//!
//! Some parents are encoded in the child's identity (a replica names its
//! partition), others only arrive as report attributes (a partition learns
//! its service from the authority report).

use health_core::constants::AD_HOC_APPLICATION_NAME;
use health_core::models::{EntityAttributes, EntityId};

/// Parent of `id`, or `None` when it is not known yet.
pub fn parent_of(id: &EntityId, attributes: &EntityAttributes) -> Option<EntityId> {
    match id {
        EntityId::Partition { .. } => attributes.service_name.as_deref().map(EntityId::service),
        EntityId::Service { .. } => Some(EntityId::application(
            attributes
                .application_name
                .as_deref()
                .unwrap_or(AD_HOC_APPLICATION_NAME),
        )),
        _ => id.structural_parent(),
    }
}
