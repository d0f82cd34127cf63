//! Debug toggle resource.
//!
//! The mere presence of this resource enables the playback overlay (time,
//! rate, active sprite counts, load warnings). Remove it to hide the overlay.

use bevy_ecs::prelude::Resource;

/// Marker resource: when present, the render system draws the overlay.
#[derive(Resource, Clone, Copy)]
pub struct DebugMode {}
