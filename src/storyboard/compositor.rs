//! Layer compositor.
//!
//! Turns the scheduler's active sets into an ordered list of [`DrawCommand`]s:
//! background sprites first, then foreground, each in z-order. Sprites whose
//! current frame has no texture, or that would be invisible, emit nothing.

use serde::Serialize;

use super::Layer;
use super::scheduler::ActiveSprite;
use super::sprite::{Origin, Sprite, ZIndex};
use super::texturecache::TextureId;

/// One textured quad for the renderer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DrawCommand {
    pub layer: Layer,
    pub z_index: ZIndex,
    pub texture: TextureId,
    /// Position of the pivot in storyboard space.
    pub x: f32,
    pub y: f32,
    pub origin: Origin,
    /// Pivot as a fraction of the texture size.
    pub pivot: (f32, f32),
    pub scale_x: f32,
    pub scale_y: f32,
    /// Radians, clockwise.
    pub rotation: f32,
    /// RGBA, alpha from the sprite's opacity.
    pub color: [u8; 4],
    pub flip_h: bool,
    pub flip_v: bool,
    pub additive: bool,
}

/// Sprites of one layer together with its current active set.
#[derive(Clone, Copy, Debug)]
pub struct LayerView<'a> {
    pub layer: Layer,
    pub sprites: &'a [Sprite],
    pub active: &'a [ActiveSprite],
}

/// Draw list for one frame: `background` first, then `foreground`.
pub fn compose(background: LayerView<'_>, foreground: LayerView<'_>) -> Vec<DrawCommand> {
    let mut out = Vec::with_capacity(background.active.len() + foreground.active.len());
    compose_layer(background, &mut out);
    compose_layer(foreground, &mut out);
    out
}

fn compose_layer(view: LayerView<'_>, out: &mut Vec<DrawCommand>) {
    for active in view.active {
        let sprite = &view.sprites[active.sprite];
        if let Some(cmd) = draw_command(view.layer, sprite, active) {
            out.push(cmd);
        }
    }
}

fn draw_command(layer: Layer, sprite: &Sprite, active: &ActiveSprite) -> Option<DrawCommand> {
    let state = &active.state;
    let texture = sprite.frames.get(state.frame).copied().flatten()?;
    let alpha = (state.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    if alpha == 0 || state.scale.x == 0.0 || state.scale.y == 0.0 {
        return None;
    }
    Some(DrawCommand {
        layer,
        z_index: sprite.z_index,
        texture,
        x: state.position.x,
        y: state.position.y,
        origin: sprite.origin,
        pivot: sprite.origin.pivot(),
        scale_x: state.scale.x,
        scale_y: state.scale.y,
        rotation: state.rotation,
        color: [
            state.color.r.round() as u8,
            state.color.g.round() as u8,
            state.color.b.round() as u8,
            alpha,
        ],
        flip_h: state.flip_h,
        flip_v: state.flip_v,
        additive: state.additive,
    })
}
