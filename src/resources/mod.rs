//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution. The loaded
//! [`Storyboard`](crate::storyboard::Storyboard) itself is also a resource;
//! it lives with the core in [`crate::storyboard`].
//!
//! Overview
//! - `debugmode` – presence toggles the playback overlay
//! - `drawlist` – draw commands composed for the current frame
//! - `input` – per-frame keyboard state of the player controls
//! - `playbackclock` – playback time, rate and pause state
//! - `playerconfig` – INI-backed player settings
//! - `rendertarget` – fixed-resolution storyboard canvas (non-send)
//! - `texturestore` – raylib textures of the loaded storyboard (non-send)
//! - `windowsize` – current window dimensions and letterboxing
pub mod debugmode;
pub mod drawlist;
pub mod input;
pub mod playbackclock;
pub mod playerconfig;
pub mod rendertarget;
pub mod texturestore;
pub mod windowsize;
