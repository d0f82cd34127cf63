//! Player configuration resource.
//!
//! Settings loaded from an INI configuration file. Defaults are safe to start
//! with; command-line flags override whatever the file sets.
//!
//! # Configuration File Format
//!
//! ```ini
//! [render]
//! width = 854
//! height = 480
//! widescreen = true
//!
//! [window]
//! width = 1280
//! height = 720
//! fullscreen = false
//! vsync = true
//! target_fps = 120
//!
//! [playback]
//! rate = 1.0
//! start_time = 0
//!
//! [paths]
//! songs_dir = .
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::{Path, PathBuf};

/// Default safe values for startup
const DEFAULT_RENDER_WIDTH: u32 = 854;
const DEFAULT_RENDER_HEIGHT: u32 = 480;
const DEFAULT_WIDESCREEN: bool = true;
const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 720;
const DEFAULT_TARGET_FPS: u32 = 120;
const DEFAULT_VSYNC: bool = true;
const DEFAULT_FULLSCREEN: bool = false;
const DEFAULT_RATE: f64 = 1.0;
const DEFAULT_START_TIME: f64 = 0.0;
const DEFAULT_SONGS_DIR: &str = ".";
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Storyboard coordinate space: 640x480, widened to 854x480 on 16:9.
pub const STORYBOARD_WIDTH: f32 = 640.0;
pub const STORYBOARD_HEIGHT: f32 = 480.0;

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    /// Storyboard canvas width in pixels.
    pub render_width: u32,
    /// Storyboard canvas height in pixels.
    pub render_height: u32,
    /// Show the 16:9 margins around the 4:3 storyboard area.
    pub widescreen: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub target_fps: u32,
    pub vsync: bool,
    pub fullscreen: bool,
    /// Initial playback rate.
    pub rate: f64,
    /// Initial playback time in milliseconds.
    pub start_time: f64,
    /// Base directory for relative beatmap paths.
    pub songs_dir: PathBuf,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            render_width: DEFAULT_RENDER_WIDTH,
            render_height: DEFAULT_RENDER_HEIGHT,
            widescreen: DEFAULT_WIDESCREEN,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            vsync: DEFAULT_VSYNC,
            fullscreen: DEFAULT_FULLSCREEN,
            rate: DEFAULT_RATE,
            start_time: DEFAULT_START_TIME,
            songs_dir: PathBuf::from(DEFAULT_SONGS_DIR),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [render] section
        if let Some(width) = config.getuint("render", "width").ok().flatten() {
            self.render_width = width as u32;
        }
        if let Some(height) = config.getuint("render", "height").ok().flatten() {
            self.render_height = height as u32;
        }
        if let Some(widescreen) = config.getbool("render", "widescreen").ok().flatten() {
            self.widescreen = widescreen;
        }

        // [window] section
        if let Some(width) = config.getuint("window", "width").ok().flatten() {
            self.window_width = width as u32;
        }
        if let Some(height) = config.getuint("window", "height").ok().flatten() {
            self.window_height = height as u32;
        }
        if let Some(fps) = config.getuint("window", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }
        if let Some(vsync) = config.getbool("window", "vsync").ok().flatten() {
            self.vsync = vsync;
        }
        if let Some(fullscreen) = config.getbool("window", "fullscreen").ok().flatten() {
            self.fullscreen = fullscreen;
        }

        // [playback] section
        if let Some(rate) = config.getfloat("playback", "rate").ok().flatten() {
            self.rate = rate;
        }
        if let Some(start) = config.getfloat("playback", "start_time").ok().flatten() {
            self.start_time = start;
        }

        // [paths] section
        if let Some(dir) = config.get("paths", "songs_dir") {
            self.songs_dir = PathBuf::from(dir);
        }

        info!(
            "Loaded config: {}x{} render (widescreen={}), {}x{} window, fps={}, vsync={}, rate={}",
            self.render_width,
            self.render_height,
            self.widescreen,
            self.window_width,
            self.window_height,
            self.target_fps,
            self.vsync,
            self.rate
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("render", "width", Some(self.render_width.to_string()));
        config.set("render", "height", Some(self.render_height.to_string()));
        config.set("render", "widescreen", Some(self.widescreen.to_string()));

        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));
        config.set("window", "vsync", Some(self.vsync.to_string()));
        config.set("window", "fullscreen", Some(self.fullscreen.to_string()));

        config.set("playback", "rate", Some(self.rate.to_string()));
        config.set("playback", "start_time", Some(self.start_time.to_string()));

        config.set(
            "paths",
            "songs_dir",
            Some(self.songs_dir.to_string_lossy().into_owned()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Width of the canvas actually used: the full render width in
    /// widescreen mode, the 4:3 part of it otherwise.
    pub fn canvas_width(&self) -> u32 {
        if self.widescreen {
            self.render_width
        } else {
            (self.render_height as f32 * STORYBOARD_WIDTH / STORYBOARD_HEIGHT).round() as u32
        }
    }

    /// Resolve a beatmap directory against `songs_dir` unless it is absolute.
    pub fn beatmap_dir(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.songs_dir.join(dir)
        }
    }
}
