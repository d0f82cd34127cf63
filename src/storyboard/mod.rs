//! Storyboard model and playback.
//!
//! A [`Storyboard`] is loaded once from a beatmap directory and then played
//! back by advancing it to monotonically increasing times. Each of the two
//! rendered layers keeps its own [`LayerScheduler`]; after every advance the
//! [`compositor`] turns the active sets into an ordered draw list.
//!
//! Submodules:
//! - `command`, `easing`, `timeline`: keyframes and their evaluation
//! - `sprite`: sprites and their per-property command sets
//! - `parser`: the script reader
//! - `scheduler`: pending/active working sets per layer
//! - `compositor`: draw list construction
//! - `texturecache`: path to texture handle cache in front of a loader

pub mod command;
pub mod compositor;
pub mod easing;
pub mod error;
pub mod parser;
pub mod scheduler;
pub mod sprite;
pub mod texturecache;
pub mod timeline;

use std::fs;
use std::path::{Path, PathBuf};

use bevy_ecs::prelude::Resource;
use log::{debug, info};
use serde::Serialize;

use compositor::{DrawCommand, LayerView, compose};
use error::StoryboardError;
use scheduler::{ActiveSprite, LayerScheduler};
use sprite::Sprite;
use texturecache::{TextureCache, TextureLoader};

/// Script file extension looked up in the beatmap directory.
pub const SCRIPT_EXTENSION: &str = "osb";

/// Rendered storyboard layers, in draw order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Layer {
    Background,
    Foreground,
}

impl Layer {
    pub const ALL: [Layer; 2] = [Layer::Background, Layer::Foreground];

    /// `None` for layers that are parsed but not rendered (Fail, Pass, Overlay).
    pub fn from_token(token: &str) -> Option<Layer> {
        match token {
            "Background" | "0" => Some(Layer::Background),
            "Foreground" | "3" => Some(Layer::Foreground),
            _ => None,
        }
    }
}

/// Sprites of one layer and their playback state.
#[derive(Debug, Default)]
pub struct StoryboardLayer {
    sprites: Vec<Sprite>,
    scheduler: LayerScheduler,
}

impl StoryboardLayer {
    pub fn new(sprites: Vec<Sprite>) -> Self {
        let scheduler = LayerScheduler::new(&sprites);
        StoryboardLayer { sprites, scheduler }
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn active(&self) -> &[ActiveSprite] {
        self.scheduler.active()
    }

    pub fn scheduler(&self) -> &LayerScheduler {
        &self.scheduler
    }

    /// Advance to `time`; `time` must not precede the previous advance.
    pub fn advance(&mut self, time: f64) -> &[ActiveSprite] {
        self.scheduler.advance(&self.sprites, time)
    }

    /// Advance to `time`, resetting first if the clock went backwards.
    pub fn update(&mut self, time: f64) -> &[ActiveSprite] {
        if self.scheduler.last_time().is_some_and(|last| time < last) {
            debug!("Clock moved back to {:.1} ms, resetting layer", time);
            self.scheduler.reset(&self.sprites);
        }
        self.scheduler.advance(&self.sprites, time)
    }

    pub fn reset(&mut self) {
        self.scheduler.reset(&self.sprites);
    }

    fn view(&self, layer: Layer) -> LayerView<'_> {
        LayerView {
            layer,
            sprites: &self.sprites,
            active: self.scheduler.active(),
        }
    }
}

/// A loaded storyboard.
#[derive(Resource, Debug, Default)]
pub struct Storyboard {
    background: StoryboardLayer,
    foreground: StoryboardLayer,
    textures: TextureCache,
    warnings: Vec<StoryboardError>,
    source: Option<PathBuf>,
}

impl Storyboard {
    /// Load the storyboard script of the beatmap in `beatmap_dir`.
    ///
    /// Returns `Ok(None)` when the directory holds no script. Errors inside
    /// the script are collected in [`warnings`](Self::warnings) instead of
    /// failing the load; only I/O on the directory or the script fails it.
    pub fn load(
        beatmap_dir: &Path,
        loader: &mut dyn TextureLoader,
    ) -> Result<Option<Storyboard>, StoryboardError> {
        let Some(script) = Self::find_script(beatmap_dir)? else {
            info!("{}", StoryboardError::MissingResource(beatmap_dir.to_path_buf()));
            return Ok(None);
        };
        info!("Loading storyboard {}", script.display());
        let text = fs::read_to_string(&script)?;
        let mut storyboard = Self::parse(&text, beatmap_dir, loader);
        storyboard.source = Some(script);
        Ok(Some(storyboard))
    }

    /// First `.osb` file in `beatmap_dir`, by file name.
    pub fn find_script(beatmap_dir: &Path) -> Result<Option<PathBuf>, StoryboardError> {
        let mut scripts = Vec::new();
        for entry in fs::read_dir(beatmap_dir)? {
            let path = entry?.path();
            let is_script = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(SCRIPT_EXTENSION));
            if is_script && path.is_file() {
                scripts.push(path);
            }
        }
        scripts.sort();
        Ok(scripts.into_iter().next())
    }

    /// Parse script text; image paths resolve against `base_dir`.
    pub fn parse(text: &str, base_dir: &Path, loader: &mut dyn TextureLoader) -> Storyboard {
        parser::parse_script(text, base_dir, loader)
    }

    pub(crate) fn from_parts(
        background: Vec<Sprite>,
        foreground: Vec<Sprite>,
        textures: TextureCache,
        warnings: Vec<StoryboardError>,
    ) -> Self {
        Storyboard {
            background: StoryboardLayer::new(background),
            foreground: StoryboardLayer::new(foreground),
            textures,
            warnings,
            source: None,
        }
    }

    pub fn layer(&self, layer: Layer) -> &StoryboardLayer {
        match layer {
            Layer::Background => &self.background,
            Layer::Foreground => &self.foreground,
        }
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut StoryboardLayer {
        match layer {
            Layer::Background => &mut self.background,
            Layer::Foreground => &mut self.foreground,
        }
    }

    /// Advance one layer to `time` and return its active set in z-order.
    ///
    /// `time` must not precede the layer's previous advance; use
    /// [`reset_layer`](Self::reset_layer) or [`update`](Self::update) for seeks.
    pub fn advance(&mut self, layer: Layer, time: f64) -> &[ActiveSprite] {
        self.layer_mut(layer).advance(time)
    }

    /// Advance both layers to `time`, resetting any layer the clock moved back past.
    pub fn update(&mut self, time: f64) {
        self.background.update(time);
        self.foreground.update(time);
    }

    pub fn reset_layer(&mut self, layer: Layer) {
        self.layer_mut(layer).reset();
    }

    /// Reset both layers to their just-loaded state.
    pub fn reset(&mut self) {
        self.background.reset();
        self.foreground.reset();
    }

    /// Draw list for the last advanced time: background first, then foreground.
    pub fn draw_list(&self) -> Vec<DrawCommand> {
        compose(
            self.background.view(Layer::Background),
            self.foreground.view(Layer::Foreground),
        )
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    /// Errors collected while loading; none of them stopped the load.
    pub fn warnings(&self) -> &[StoryboardError] {
        &self.warnings
    }

    /// Script the storyboard was loaded from, if loaded from disk.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Number of sprites attached to rendered layers.
    pub fn sprite_count(&self) -> usize {
        self.background.sprites.len() + self.foreground.sprites.len()
    }

    /// Latest end time over all sprites; infinite if any sprite loops forever.
    pub fn end_time(&self) -> Option<f64> {
        self.background
            .sprites
            .iter()
            .chain(&self.foreground.sprites)
            .filter_map(Sprite::end_time)
            .reduce(f64::max)
    }
}
