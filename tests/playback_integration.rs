//! Playback tick integration tests for the clock, controls, seek and
//! storyboard playback systems.

use bevy_ecs::prelude::*;

use aberred_storyboard::events::seek::{SeekEvent, seek_observer};
use aberred_storyboard::events::switchdebug::switch_debug_observer;
use aberred_storyboard::resources::debugmode::DebugMode;
use aberred_storyboard::resources::drawlist::DrawList;
use aberred_storyboard::resources::input::InputState;
use aberred_storyboard::resources::playbackclock::{MAX_RATE, PlaybackClock};
use aberred_storyboard::storyboard::error::StoryboardError;
use aberred_storyboard::storyboard::texturecache::{TextureId, TextureLoader};
use aberred_storyboard::storyboard::{Layer, Storyboard};
use aberred_storyboard::systems::input::{SEEK_STEP_MS, playback_controls};
use aberred_storyboard::systems::playback::storyboard_playback_system;
use aberred_storyboard::systems::time::update_playback_clock;

const EPSILON: f64 = 1e-6;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Every image "loads"; ids are handed out in request order.
#[derive(Default)]
struct NullLoader {
    next: u32,
}

impl TextureLoader for NullLoader {
    fn load(&mut self, _path: &std::path::Path) -> Result<TextureId, StoryboardError> {
        self.next += 1;
        Ok(TextureId(self.next - 1))
    }
}

const SCRIPT: &str = "[Events]\n\
    Sprite,Background,TopLeft,\"bg.png\",0,0\n\
    \x20F,0,0,20000,1\n\
    Sprite,Foreground,Centre,\"intro.png\",320,240\n\
    \x20F,0,0,2000,1,0\n\
    Sprite,Foreground,Centre,\"late.png\",320,240\n\
    \x20M,0,6500,7000,0,0,640,480\n";

fn make_world(with_storyboard: bool) -> World {
    let mut world = World::new();
    world.insert_resource(PlaybackClock::default());
    world.insert_resource(DrawList::default());
    world.insert_resource(InputState::default());
    if with_storyboard {
        let mut loader = NullLoader::default();
        let storyboard = Storyboard::parse(SCRIPT, std::path::Path::new("."), &mut loader);
        world.insert_resource(storyboard);
    }
    world.add_observer(seek_observer);
    world.add_observer(switch_debug_observer);
    world.flush();
    world
}

fn make_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(playback_controls);
    schedule.add_systems(storyboard_playback_system.after(playback_controls));
    schedule
}

/// Advance the clock by `dt` seconds and run one frame.
fn tick(world: &mut World, schedule: &mut Schedule, dt: f32) {
    update_playback_clock(world, dt);
    schedule.run(world);
}

fn press(world: &mut World, pick: impl Fn(&mut InputState) -> &mut bool) {
    let mut input = world.resource_mut::<InputState>();
    *pick(&mut *input) = true;
}

fn release_all(world: &mut World) {
    let mut input = world.resource_mut::<InputState>();
    for control in input.controls_mut() {
        control.just_pressed = false;
    }
}

#[test]
fn clock_drives_draw_list() {
    let mut world = make_world(true);
    let mut schedule = make_schedule();

    tick(&mut world, &mut schedule, 1.0);
    let list = world.resource::<DrawList>();
    assert!(approx_eq(list.time_ms, 1000.0));
    assert_eq!(list.commands.len(), 2);
    assert_eq!(list.commands[0].layer, Layer::Background);
    assert_eq!(list.commands[1].color[3], 128);

    for _ in 0..5 {
        tick(&mut world, &mut schedule, 1.0);
    }
    let list = world.resource::<DrawList>();
    assert!(approx_eq(list.time_ms, 6000.0));
    assert_eq!(list.commands.len(), 1);

    tick(&mut world, &mut schedule, 0.5);
    let list = world.resource::<DrawList>();
    assert_eq!(list.commands.len(), 2);
    assert_eq!((list.commands[1].x, list.commands[1].y), (0.0, 0.0));
}

#[test]
fn no_storyboard_yields_empty_draw_list() {
    let mut world = make_world(false);
    let mut schedule = make_schedule();
    tick(&mut world, &mut schedule, 0.5);
    assert!(world.resource::<DrawList>().commands.is_empty());
}

#[test]
fn seek_event_moves_clock_and_resets_storyboard() {
    let mut world = make_world(true);
    let mut schedule = make_schedule();
    for _ in 0..8 {
        tick(&mut world, &mut schedule, 1.0);
    }
    assert_eq!(
        world
            .resource::<Storyboard>()
            .layer(Layer::Foreground)
            .active()
            .len(),
        0
    );

    world.trigger(SeekEvent { time_ms: 500.0 });
    assert!(approx_eq(world.resource::<PlaybackClock>().time_ms, 500.0));
    assert!(
        world
            .resource::<Storyboard>()
            .layer(Layer::Foreground)
            .scheduler()
            .last_time()
            .is_none()
    );

    tick(&mut world, &mut schedule, 0.0);
    let list = world.resource::<DrawList>();
    assert_eq!(list.commands.len(), 2);
    assert_eq!(list.commands[1].color[3], 191);
}

#[test]
fn seek_keys_trigger_seeks() {
    let mut world = make_world(true);
    let mut schedule = make_schedule();
    tick(&mut world, &mut schedule, 1.0);

    press(&mut world, |i| &mut i.seek_forward.just_pressed);
    tick(&mut world, &mut schedule, 0.0);
    assert!(approx_eq(
        world.resource::<PlaybackClock>().time_ms,
        1000.0 + SEEK_STEP_MS
    ));
    assert_eq!(world.resource::<DrawList>().commands.len(), 1);
    release_all(&mut world);

    press(&mut world, |i| &mut i.seek_back.just_pressed);
    tick(&mut world, &mut schedule, 0.0);
    assert!(approx_eq(world.resource::<PlaybackClock>().time_ms, 1000.0));
    assert_eq!(world.resource::<DrawList>().commands.len(), 2);
    release_all(&mut world);

    press(&mut world, |i| &mut i.seek_back.just_pressed);
    tick(&mut world, &mut schedule, 0.0);
    assert!(approx_eq(world.resource::<PlaybackClock>().time_ms, 0.0));
    release_all(&mut world);

    tick(&mut world, &mut schedule, 3.0);
    press(&mut world, |i| &mut i.seek_start.just_pressed);
    tick(&mut world, &mut schedule, 0.0);
    assert!(approx_eq(world.resource::<PlaybackClock>().time_ms, 0.0));
}

#[test]
fn pause_and_rate_controls() {
    let mut world = make_world(true);
    let mut schedule = make_schedule();

    press(&mut world, |i| &mut i.toggle_pause.just_pressed);
    tick(&mut world, &mut schedule, 0.0);
    release_all(&mut world);
    assert!(world.resource::<PlaybackClock>().paused);
    tick(&mut world, &mut schedule, 1.0);
    assert!(approx_eq(world.resource::<PlaybackClock>().time_ms, 0.0));

    press(&mut world, |i| &mut i.toggle_pause.just_pressed);
    tick(&mut world, &mut schedule, 0.0);
    release_all(&mut world);

    for _ in 0..20 {
        press(&mut world, |i| &mut i.rate_up.just_pressed);
        tick(&mut world, &mut schedule, 0.0);
    }
    release_all(&mut world);
    assert!(approx_eq(world.resource::<PlaybackClock>().rate, MAX_RATE));

    tick(&mut world, &mut schedule, 0.5);
    assert!(approx_eq(world.resource::<PlaybackClock>().time_ms, 2000.0));

    press(&mut world, |i| &mut i.rate_down.just_pressed);
    tick(&mut world, &mut schedule, 0.0);
    assert!(approx_eq(world.resource::<PlaybackClock>().rate, MAX_RATE - 0.25));
}

#[test]
fn debug_key_toggles_debug_mode() {
    let mut world = make_world(true);
    let mut schedule = make_schedule();
    assert!(!world.contains_resource::<DebugMode>());

    press(&mut world, |i| &mut i.mode_debug.just_pressed);
    tick(&mut world, &mut schedule, 0.0);
    release_all(&mut world);
    assert!(world.contains_resource::<DebugMode>());

    tick(&mut world, &mut schedule, 0.0);
    assert!(world.contains_resource::<DebugMode>());

    press(&mut world, |i| &mut i.mode_debug.just_pressed);
    tick(&mut world, &mut schedule, 0.0);
    assert!(!world.contains_resource::<DebugMode>());
}
