//! Per-frame draw list resource.
//!
//! Filled by [`storyboard_playback_system`](crate::systems::playback::storyboard_playback_system)
//! and consumed by the render pass. Empty while no storyboard is loaded.
use bevy_ecs::prelude::Resource;

use crate::storyboard::compositor::DrawCommand;

#[derive(Resource, Debug, Default, Clone)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
    /// Playback time the list was composed for.
    pub time_ms: f64,
}
