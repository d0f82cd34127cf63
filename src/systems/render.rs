//! Render system.
//!
//! Draws the frame's [`DrawList`] into the fixed-resolution [`RenderTarget`],
//! then scales that canvas into the window with letterboxing. Each draw
//! command becomes one `draw_texture_pro` call; additive commands are drawn
//! inside an additive blend scope.
use bevy_ecs::prelude::*;
use log::error;
use raylib::prelude::*;

use crate::resources::debugmode::DebugMode;
use crate::resources::drawlist::DrawList;
use crate::resources::playbackclock::PlaybackClock;
use crate::resources::rendertarget::{CanvasTransform, RenderTarget};
use crate::resources::texturestore::TextureStore;
use crate::resources::windowsize::WindowSize;
use crate::storyboard::compositor::DrawCommand;
use crate::storyboard::{Layer, Storyboard};

/// Source rectangle, destination rectangle and rotation origin of one quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub source: Rectangle,
    pub dest: Rectangle,
    pub origin: Vector2,
}

/// Place a `texture_w` x `texture_h` texture on the canvas for `cmd`.
///
/// Flips are negative source extents; a negative scale flips as well. The
/// rotation origin is the command's pivot scaled to the drawn size.
pub fn quad(cmd: &DrawCommand, texture_w: f32, texture_h: f32, canvas: CanvasTransform) -> Quad {
    let flip_h = cmd.flip_h ^ (cmd.scale_x < 0.0);
    let flip_v = cmd.flip_v ^ (cmd.scale_y < 0.0);
    let width = texture_w * cmd.scale_x.abs() * canvas.scale;
    let height = texture_h * cmd.scale_y.abs() * canvas.scale;
    let at = canvas.apply(cmd.x, cmd.y);
    Quad {
        source: Rectangle {
            x: 0.0,
            y: 0.0,
            width: if flip_h { -texture_w } else { texture_w },
            height: if flip_v { -texture_h } else { texture_h },
        },
        dest: Rectangle {
            x: at.x,
            y: at.y,
            width,
            height,
        },
        origin: Vector2 {
            x: cmd.pivot.0 * width,
            y: cmd.pivot.1 * height,
        },
    }
}

fn draw_storyboard(
    d: &mut RaylibTextureMode<'_, RaylibDrawHandle<'_>>,
    commands: &[DrawCommand],
    textures: &TextureStore,
    canvas: CanvasTransform,
) {
    for cmd in commands {
        let Some(texture) = textures.get(cmd.texture) else {
            continue;
        };
        let q = quad(cmd, texture.width as f32, texture.height as f32, canvas);
        let [r, g, b, a] = cmd.color;
        let tint = Color::new(r, g, b, a);
        let degrees = cmd.rotation.to_degrees();
        if cmd.additive {
            let mut blend = d.begin_blend_mode(BlendMode::BLEND_ADDITIVE);
            blend.draw_texture_pro(texture, q.source, q.dest, q.origin, degrees, tint);
        } else {
            d.draw_texture_pro(texture, q.source, q.dest, q.origin, degrees, tint);
        }
    }
}

/// Exclusive system drawing one frame.
///
/// The raylib handle, render target and texture store are taken out of the
/// world for the duration of the frame and put back afterwards.
pub fn render_system(world: &mut World) {
    let Some(mut rl) = world.remove_non_send_resource::<RaylibHandle>() else {
        error!("render_system: RaylibHandle missing");
        return;
    };
    let Some(mut target) = world.remove_non_send_resource::<RenderTarget>() else {
        error!("render_system: RenderTarget missing");
        world.insert_non_send_resource(rl);
        return;
    };

    {
        let thread = world.non_send_resource::<RaylibThread>();
        let draw_list = world.resource::<DrawList>();
        let window = *world.resource::<WindowSize>();
        let textures = world.get_non_send_resource::<TextureStore>();
        let canvas = target.canvas_transform();

        let mut d = rl.begin_drawing(thread);
        {
            let mut t = d.begin_texture_mode(thread, &mut target.texture);
            t.clear_background(Color::BLACK);
            if let Some(textures) = textures {
                draw_storyboard(&mut t, &draw_list.commands, textures, canvas);
            }
        }

        d.clear_background(Color::BLACK);
        let letterbox = window.calculate_letterbox(target.game_width, target.game_height);
        d.draw_texture_pro(
            &target.texture,
            target.source_rect(),
            letterbox,
            Vector2 { x: 0.0, y: 0.0 },
            0.0,
            Color::WHITE,
        );
        render_debug_ui(world, &mut d);
    }

    world.insert_non_send_resource(target);
    world.insert_non_send_resource(rl);
}

/// Overlay with playback and scheduling statistics, drawn in window space.
pub fn render_debug_ui(world: &World, d: &mut RaylibDrawHandle) {
    if !world.contains_resource::<DebugMode>() {
        return;
    }
    let clock = world.resource::<PlaybackClock>();
    let draw_list = world.resource::<DrawList>();

    let text = format!(
        "DEBUG MODE (press F11 to toggle) | FPS: {} | {:.0} ms x{:.2}{}",
        d.get_fps(),
        clock.time_ms,
        clock.rate,
        if clock.paused { " (paused)" } else { "" }
    );
    d.draw_text(&text, 10, 10, 10, Color::WHITE);

    let Some(storyboard) = world.get_resource::<Storyboard>() else {
        d.draw_text("No storyboard loaded", 10, 30, 10, Color::WHITE);
        return;
    };
    for (row, layer) in Layer::ALL.into_iter().enumerate() {
        let l = storyboard.layer(layer);
        let text = format!(
            "{:?}: {} sprites, {} active, {} pending",
            layer,
            l.sprites().len(),
            l.active().len(),
            l.scheduler().pending_len()
        );
        d.draw_text(&text, 10, 30 + row as i32 * 20, 10, Color::WHITE);
    }
    let text = format!(
        "Draw calls: {} | Textures: {} | Warnings: {}",
        draw_list.commands.len(),
        storyboard.textures().len(),
        storyboard.warnings().len()
    );
    d.draw_text(&text, 10, 70, 10, Color::WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storyboard::sprite::{Origin, ZIndex};
    use crate::storyboard::texturecache::TextureId;

    fn command(scale_x: f32, scale_y: f32, flip_h: bool) -> DrawCommand {
        DrawCommand {
            layer: Layer::Foreground,
            z_index: ZIndex(0),
            texture: TextureId(0),
            x: 320.0,
            y: 240.0,
            origin: Origin::Centre,
            pivot: Origin::Centre.pivot(),
            scale_x,
            scale_y,
            rotation: 0.0,
            color: [255, 255, 255, 255],
            flip_h,
            flip_v: false,
            additive: false,
        }
    }

    #[test]
    fn quad_scales_and_pivots() {
        let q = quad(&command(2.0, 1.0, false), 100.0, 50.0, CanvasTransform::new(640, 480));
        assert_eq!((q.dest.x, q.dest.y), (320.0, 240.0));
        assert_eq!((q.dest.width, q.dest.height), (200.0, 50.0));
        assert_eq!(q.origin, Vector2 { x: 100.0, y: 25.0 });
        assert_eq!(q.source.width, 100.0);
    }

    #[test]
    fn quad_follows_canvas_transform() {
        let q = quad(&command(1.0, 1.0, false), 100.0, 50.0, CanvasTransform::new(854, 480));
        assert_eq!(q.dest.x, 427.0);
    }

    #[test]
    fn flip_and_negative_scale_cancel() {
        let flipped = quad(&command(1.0, 1.0, true), 100.0, 50.0, CanvasTransform::new(640, 480));
        assert_eq!(flipped.source.width, -100.0);
        let both = quad(&command(-1.0, 1.0, true), 100.0, 50.0, CanvasTransform::new(640, 480));
        assert_eq!(both.source.width, 100.0);
        assert_eq!(both.dest.width, 100.0);
    }
}
