//! Render target resource for the storyboard canvas.
//!
//! The storyboard is drawn into a fixed-resolution framebuffer texture, which
//! is then scaled to fit the actual window size with its aspect ratio kept.

use raylib::ffi::{self, TextureFilter};
use raylib::prelude::*;

use crate::resources::playerconfig::{STORYBOARD_HEIGHT, STORYBOARD_WIDTH};

/// Texture filtering mode for scaling the render target.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum RenderFilter {
    /// Point/nearest-neighbor filtering - sharp pixels, no blur.
    Nearest,
    /// Bilinear filtering - smooth scaling with interpolation.
    #[default]
    Bilinear,
}

/// Render target for fixed-resolution rendering with scaling.
///
/// # Note
/// This is a NonSend resource because `RenderTexture2D` contains GPU resources
/// that must be accessed from the main thread.
pub struct RenderTarget {
    /// The underlying raylib render texture.
    pub texture: RenderTexture2D,
    /// Canvas width in pixels.
    pub game_width: u32,
    /// Canvas height in pixels.
    pub game_height: u32,
    /// Current texture filtering mode.
    pub filter: RenderFilter,
}

impl RenderTarget {
    /// Create a new render target at the specified canvas resolution.
    pub fn new(
        rl: &mut RaylibHandle,
        th: &RaylibThread,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        let texture = rl
            .load_render_texture(th, width, height)
            .map_err(|e| format!("Failed to create render texture: {}", e))?;

        let mut target = Self {
            texture,
            game_width: width,
            game_height: height,
            filter: RenderFilter::default(),
        };
        target.apply_filter();

        Ok(target)
    }

    /// Apply the current filter setting to the texture via FFI.
    fn apply_filter(&mut self) {
        let filter_value = match self.filter {
            RenderFilter::Nearest => TextureFilter::TEXTURE_FILTER_POINT as i32,
            RenderFilter::Bilinear => TextureFilter::TEXTURE_FILTER_BILINEAR as i32,
        };
        unsafe {
            ffi::SetTextureFilter(self.texture.texture, filter_value);
        }
    }

    /// Mapping from storyboard coordinates to canvas pixels.
    pub fn canvas_transform(&self) -> CanvasTransform {
        CanvasTransform::new(self.game_width, self.game_height)
    }

    /// Get the source rectangle for drawing this texture.
    ///
    /// Returns a rectangle with negative height to flip the Y axis,
    /// compensating for OpenGL's inverted texture coordinates.
    pub fn source_rect(&self) -> Rectangle {
        Rectangle {
            x: 0.0,
            y: 0.0,
            width: self.game_width as f32,
            height: -(self.game_height as f32), // Negative to flip Y
        }
    }
}

/// Uniform scale plus horizontal offset from the 640x480 storyboard space
/// into a canvas of any size. The 4:3 area is centred; wider canvases show
/// the margins on both sides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasTransform {
    pub scale: f32,
    pub offset_x: f32,
}

impl CanvasTransform {
    pub fn new(canvas_width: u32, canvas_height: u32) -> Self {
        let scale = canvas_height as f32 / STORYBOARD_HEIGHT;
        CanvasTransform {
            scale,
            offset_x: (canvas_width as f32 - STORYBOARD_WIDTH * scale) / 2.0,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> Vector2 {
        Vector2 {
            x: x * self.scale + self.offset_x,
            y: y * self.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_by_three_canvas_is_identity() {
        let t = CanvasTransform::new(640, 480);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.apply(320.0, 240.0), Vector2 { x: 320.0, y: 240.0 });
    }

    #[test]
    fn widescreen_canvas_centres_storyboard_area() {
        let t = CanvasTransform::new(854, 480);
        assert_eq!(t.offset_x, 107.0);
        assert_eq!(t.apply(-107.0, 0.0), Vector2 { x: 0.0, y: 0.0 });
    }

    #[test]
    fn larger_canvas_scales_uniformly() {
        let t = CanvasTransform::new(1280, 960);
        assert_eq!(t.scale, 2.0);
        assert_eq!(t.apply(640.0, 480.0), Vector2 { x: 1280.0, y: 960.0 });
    }
}
