//! Event and observer to seek playback.
//!
//! Emitting a [`SeekEvent`] moves the [`PlaybackClock`] to the requested time
//! and resets the storyboard's schedulers, so the next playback tick rebuilds
//! the active sets for the new time in one jump.
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::info;

use crate::resources::playbackclock::PlaybackClock;
use crate::storyboard::Storyboard;

/// Seek to an absolute playback time in milliseconds.
#[derive(Event, Debug, Clone, Copy)]
pub struct SeekEvent {
    pub time_ms: f64,
}

pub fn seek_observer(
    trigger: On<SeekEvent>,
    mut clock: ResMut<PlaybackClock>,
    storyboard: Option<ResMut<Storyboard>>,
) {
    let target = trigger.event().time_ms;
    clock.seek(target);
    info!("Seek to {:.0} ms", clock.time_ms);
    if let Some(mut storyboard) = storyboard {
        storyboard.reset();
    }
}
