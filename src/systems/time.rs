//! Time update system.
//!
//! Advances the shared [`PlaybackClock`](crate::resources::playbackclock::PlaybackClock)
//! resource once per frame, applying the playback rate to the provided delta.
use bevy_ecs::prelude::*;

use crate::resources::playbackclock::PlaybackClock;

/// Advance the `PlaybackClock` resource.
///
/// `dt` is expected to be the unscaled frame delta in seconds. A paused clock
/// keeps its time but still counts the frame.
pub fn update_playback_clock(world: &mut World, dt: f32) {
    world.resource_mut::<PlaybackClock>().tick(dt);
}
