//! Storyboard playback system.
//!
//! Brings the [`Storyboard`] resource up to the [`PlaybackClock`] time and
//! stores the composed [`DrawList`] for the render pass. Without a loaded
//! storyboard the draw list stays empty.
use bevy_ecs::prelude::*;

use crate::resources::drawlist::DrawList;
use crate::resources::playbackclock::PlaybackClock;
use crate::storyboard::Storyboard;

pub fn storyboard_playback_system(
    clock: Res<PlaybackClock>,
    storyboard: Option<ResMut<Storyboard>>,
    mut draw_list: ResMut<DrawList>,
) {
    let Some(mut storyboard) = storyboard else {
        draw_list.commands.clear();
        return;
    };
    storyboard.update(clock.time_ms);
    draw_list.commands = storyboard.draw_list();
    draw_list.time_ms = clock.time_ms;
}
