//! Per-frame keyboard input resource.
//!
//! Captures the player controls and exposes them to systems via the
//! [`InputState`] resource.
use bevy_ecs::prelude::*;
use raylib::prelude::*;

#[derive(Debug, Clone, Copy)]
/// Boolean key state with an associated keyboard binding.
pub struct BoolState {
    /// Whether the key is currently active/pressed this frame.
    pub active: bool,
    /// Whether the key was just pressed this frame.
    pub just_pressed: bool,
    /// Whether the key was just released this frame.
    pub just_released: bool,

    /// The key bound to this action.
    pub key_binding: KeyboardKey,
}

impl BoolState {
    pub const fn bound(key_binding: KeyboardKey) -> Self {
        Self {
            active: false,
            just_pressed: false,
            just_released: false,
            key_binding,
        }
    }
}

impl Default for BoolState {
    fn default() -> Self {
        Self::bound(KeyboardKey::KEY_NULL)
    }
}

/// Resource capturing the per-frame state of the player controls.
#[derive(Resource, Debug, Clone)]
pub struct InputState {
    pub toggle_pause: BoolState,
    pub seek_back: BoolState,
    pub seek_forward: BoolState,
    pub rate_up: BoolState,
    pub rate_down: BoolState,
    pub seek_start: BoolState,
    pub mode_debug: BoolState,
    pub quit: BoolState,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            toggle_pause: BoolState::bound(KeyboardKey::KEY_SPACE),
            seek_back: BoolState::bound(KeyboardKey::KEY_LEFT),
            seek_forward: BoolState::bound(KeyboardKey::KEY_RIGHT),
            rate_up: BoolState::bound(KeyboardKey::KEY_UP),
            rate_down: BoolState::bound(KeyboardKey::KEY_DOWN),
            seek_start: BoolState::bound(KeyboardKey::KEY_HOME),
            mode_debug: BoolState::bound(KeyboardKey::KEY_F11),
            quit: BoolState::bound(KeyboardKey::KEY_ESCAPE),
        }
    }
}

impl InputState {
    /// All controls, for polling.
    pub fn controls_mut(&mut self) -> [&mut BoolState; 8] {
        [
            &mut self.toggle_pause,
            &mut self.seek_back,
            &mut self.seek_forward,
            &mut self.rate_up,
            &mut self.rate_down,
            &mut self.seek_start,
            &mut self.mode_debug,
            &mut self.quit,
        ]
    }
}
