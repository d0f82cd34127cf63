//! Event types and observers used by the player.
//!
//! Submodules:
//! - [`seek`] – jump the playback clock and restart scheduling
//! - [`switchdebug`] – toggle the debug overlay on/off
pub mod seek;
pub mod switchdebug;
