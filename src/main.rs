//! Aberred Storyboard main entry point.
//!
//! Plays the storyboard of a beatmap directory using:
//! - **raylib** for windowing and graphics
//! - **bevy_ecs** for resources, systems and events around the storyboard core
//!
//! # Project Structure
//!
//! - [`storyboard`] – script parser, timelines, scheduler and compositor
//! - [`events`] – seek and debug toggle events with their observers
//! - [`resources`] – playback clock, config, textures, render target, input
//! - [`systems`] – input, playback and rendering
//!
//! # Main Loop
//!
//! 1. Load `config.ini` (or `--config`) and apply command-line overrides
//! 2. Open the window and create the fixed-resolution canvas
//! 3. Load the storyboard, uploading its textures
//! 4. Each frame: advance the clock, poll input, advance the storyboard,
//!    draw the frame
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- "songs/123 Artist - Title"
//! cargo run --release -- "songs/123 Artist - Title" --dump 15000
//! ```

// Do not create console on Windows
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

mod events;
mod resources;
mod storyboard;
mod systems;

use crate::events::seek::seek_observer;
use crate::events::switchdebug::switch_debug_observer;
use crate::resources::drawlist::DrawList;
use crate::resources::input::InputState;
use crate::resources::playbackclock::PlaybackClock;
use crate::resources::playerconfig::PlayerConfig;
use crate::resources::rendertarget::RenderTarget;
use crate::resources::texturestore::TextureStore;
use crate::resources::windowsize::WindowSize;
use crate::storyboard::Storyboard;
use crate::storyboard::texturecache::{ProbeLoader, TextureLoader};
use crate::systems::input::{playback_controls, update_input_state};
use crate::systems::playback::storyboard_playback_system;
use crate::systems::render::render_system;
use crate::systems::time::update_playback_clock;
use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use clap::Parser;
use log::{error, info, warn};
use std::path::{Path, PathBuf};

/// Aberred Storyboard player
#[derive(Parser)]
#[command(version, about = "Plays the storyboard of a beatmap directory.")]
struct Cli {
    /// Beatmap directory holding the .osb script and its images.
    /// Relative paths resolve against the configured songs directory.
    beatmap_dir: PathBuf,

    /// Configuration file (default: ./config.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Start playback at this time, in milliseconds.
    #[arg(long, value_name = "MS")]
    start: Option<f64>,

    /// Playback rate multiplier.
    #[arg(long, value_name = "F")]
    rate: Option<f64>,

    /// Print the draw list at this time as JSON and exit, without a window.
    #[arg(long, value_name = "MS")]
    dump: Option<f64>,
}

/// Load the storyboard, logging instead of failing: the player runs without
/// one when the directory has no script or cannot be read.
fn load_storyboard(dir: &Path, loader: &mut dyn TextureLoader) -> Option<Storyboard> {
    match Storyboard::load(dir, loader) {
        Ok(Some(storyboard)) => {
            if !storyboard.warnings().is_empty() {
                warn!(
                    "Storyboard loaded with {} warnings",
                    storyboard.warnings().len()
                );
            }
            Some(storyboard)
        }
        Ok(None) => {
            info!("No storyboard in {}", dir.display());
            None
        }
        Err(e) => {
            error!("Failed to load storyboard from {}: {}", dir.display(), e);
            None
        }
    }
}

/// Headless mode: print the draw list at `time_ms` as JSON.
fn dump(dir: &Path, time_ms: f64) -> Result<(), String> {
    let mut loader = ProbeLoader::new();
    let commands = match load_storyboard(dir, &mut loader) {
        Some(mut storyboard) => {
            storyboard.update(time_ms);
            storyboard.draw_list()
        }
        None => Vec::new(),
    };
    let json = serde_json::to_string_pretty(&commands)
        .map_err(|e| format!("Failed to serialize draw list: {}", e))?;
    println!("{}", json);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PlayerConfig::with_path(path),
        None => PlayerConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        info!("{}; using defaults", e);
    }
    if let Some(rate) = cli.rate {
        config.rate = rate;
    }
    if let Some(start) = cli.start {
        config.start_time = start;
    }
    let beatmap_dir = config.beatmap_dir(&cli.beatmap_dir);

    // Early-exit: headless dump (no window needed)
    if let Some(time_ms) = cli.dump {
        if let Err(e) = dump(&beatmap_dir, time_ms) {
            error!("{}", e);
            std::process::exit(1);
        }
        return;
    }

    // --------------- Raylib window & canvas ---------------
    let mut builder = raylib::init();
    builder
        .size(config.window_width as i32, config.window_height as i32)
        .resizable()
        .title("Aberred Storyboard");
    if config.vsync {
        builder.vsync();
    }
    let (mut rl, thread) = builder.build();
    rl.set_target_fps(config.target_fps);
    // Escape is a player control, not raylib's exit key
    rl.set_exit_key(None);
    if config.fullscreen {
        rl.toggle_fullscreen();
    }

    let render_target =
        match RenderTarget::new(&mut rl, &thread, config.canvas_width(), config.render_height) {
            Ok(target) => target,
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        };

    // --------------- Storyboard ---------------
    let mut texture_store = TextureStore::new();
    let storyboard = {
        let mut loader = texture_store.loader(&mut rl, &thread);
        load_storyboard(&beatmap_dir, &mut loader)
    };
    info!("Uploaded {} textures", texture_store.len());

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    world.insert_resource(
        PlaybackClock::default()
            .with_rate(config.rate)
            .with_start(config.start_time),
    );
    world.insert_resource(DrawList::default());
    world.insert_resource(InputState::default());
    // WindowSize is the actual window dimensions (updated each frame)
    world.insert_resource(WindowSize {
        w: rl.get_screen_width(),
        h: rl.get_screen_height(),
    });
    if let Some(storyboard) = storyboard {
        world.insert_resource(storyboard);
    }
    world.insert_resource(config);
    world.insert_non_send_resource(texture_store);
    world.insert_non_send_resource(render_target);
    world.insert_non_send_resource(rl);
    world.insert_non_send_resource(thread);

    world.spawn(Observer::new(seek_observer));
    world.spawn(Observer::new(switch_debug_observer));
    // Ensure the observers are registered before we run any systems that may trigger events.
    world.flush();

    let mut update = Schedule::default();
    update.add_systems(update_input_state);
    update.add_systems(playback_controls.after(update_input_state));
    update.add_systems(storyboard_playback_system.after(playback_controls));
    update.add_systems(render_system.after(storyboard_playback_system));

    if let Err(e) = update.initialize(&mut world) {
        error!("Failed to initialize schedule: {}", e);
        std::process::exit(1);
    }

    // --------------- Main loop ---------------
    while !world
        .non_send_resource::<raylib::RaylibHandle>()
        .window_should_close()
        && !world.resource::<InputState>().quit.just_pressed
    {
        let dt = world
            .non_send_resource::<raylib::RaylibHandle>()
            .get_frame_time();
        update_playback_clock(&mut world, dt);

        update.run(&mut world);

        // Update window size each frame (may change due to resize)
        let (new_w, new_h) = {
            let rl = world.non_send_resource::<raylib::RaylibHandle>();
            (rl.get_screen_width(), rl.get_screen_height())
        };
        {
            let mut window_size = world.resource_mut::<WindowSize>();
            window_size.w = new_w;
            window_size.h = new_h;
        }
    }
    info!("Bye");
}
