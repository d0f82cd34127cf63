//! Input systems.
//!
//! - [`update_input_state`] reads hardware input from Raylib each frame and
//!   writes the results into [`crate::resources::input::InputState`].
//! - [`playback_controls`] turns the keys pressed this frame into clock
//!   changes and events: seeking goes through
//!   [`SeekEvent`](crate::events::seek::SeekEvent), the overlay through
//!   [`SwitchDebugEvent`](crate::events::switchdebug::SwitchDebugEvent).
use bevy_ecs::prelude::*;
use log::info;
use raylib::ffi::KeyboardKey;

use crate::events::seek::SeekEvent;
use crate::events::switchdebug::SwitchDebugEvent;
use crate::resources::input::InputState;
use crate::resources::playbackclock::PlaybackClock;

/// Milliseconds skipped by one seek key press.
pub const SEEK_STEP_MS: f64 = 5000.0;
/// Rate change of one rate key press.
pub const RATE_STEP: f64 = 0.25;

/// Poll Raylib for keyboard input and update the `InputState` resource.
pub fn update_input_state(mut input: ResMut<InputState>, rl: NonSendMut<raylib::RaylibHandle>) {
    let is_key_down = |key: KeyboardKey| rl.is_key_down(key);
    let is_key_pressed = |key: KeyboardKey| rl.is_key_pressed(key);
    let is_key_released = |key: KeyboardKey| rl.is_key_released(key);

    for control in input.controls_mut() {
        control.active = is_key_down(control.key_binding);
        control.just_pressed = is_key_pressed(control.key_binding);
        control.just_released = is_key_released(control.key_binding);
    }
}

/// Apply the player controls pressed this frame.
pub fn playback_controls(
    input: Res<InputState>,
    mut clock: ResMut<PlaybackClock>,
    mut commands: Commands,
) {
    if input.mode_debug.just_pressed {
        commands.trigger(SwitchDebugEvent {});
    }

    if input.toggle_pause.just_pressed {
        clock.paused = !clock.paused;
        info!(
            "Playback {} at {:.0} ms",
            if clock.paused { "paused" } else { "resumed" },
            clock.time_ms
        );
    }

    if input.rate_up.just_pressed || input.rate_down.just_pressed {
        let step = if input.rate_up.just_pressed {
            RATE_STEP
        } else {
            -RATE_STEP
        };
        let rate = clock.rate + step;
        clock.set_rate(rate);
        info!("Playback rate {:.2}x", clock.rate);
    }

    let seek_to = if input.seek_start.just_pressed {
        Some(0.0)
    } else if input.seek_back.just_pressed {
        Some(clock.time_ms - SEEK_STEP_MS)
    } else if input.seek_forward.just_pressed {
        Some(clock.time_ms + SEEK_STEP_MS)
    } else {
        None
    };
    if let Some(time_ms) = seek_to {
        commands.trigger(SeekEvent { time_ms });
    }
}
