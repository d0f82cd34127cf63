//! Player systems.
//!
//! Submodules overview
//! - [`input`] – read hardware input into [`crate::resources::input::InputState`]
//!   and turn it into playback control changes and events
//! - [`playback`] – advance the storyboard and compose the frame's draw list
//! - [`render`] – draw the draw list and the debug overlay using Raylib
//! - [`time`] – advance the playback clock

pub mod input;
pub mod playback;
pub mod render;
pub mod time;
