//! Aberred Storyboard library.
//!
//! The storyboard core lives in [`storyboard`] and never opens a window or
//! touches the GPU; it shares only raylib's `Vector2` type with the player.
//! The ECS shell around it (resources, systems and events) is exposed as
//! well, for the player binary and for integration tests.

pub mod events;
pub mod resources;
pub mod storyboard;
pub mod systems;
