//! Storyboard load-and-play integration tests.
//!
//! Each test writes a beatmap directory (script plus image files) into a
//! temporary directory, loads it through [`Storyboard::load`] with the
//! headless [`ProbeLoader`], and checks playback results.

use std::path::Path;

use raylib::prelude::Vector2;
use tempfile::TempDir;

use aberred_storyboard::storyboard::compositor::DrawCommand;
use aberred_storyboard::storyboard::error::StoryboardError;
use aberred_storyboard::storyboard::texturecache::ProbeLoader;
use aberred_storyboard::storyboard::{Layer, Storyboard};

const EPSILON: f32 = 1e-3;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn beatmap(script: &str, images: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for image in images {
        let path = dir.path().join(image);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"image").unwrap();
    }
    std::fs::write(dir.path().join("Artist - Title (Mapper).osb"), script).unwrap();
    dir
}

fn load(dir: &Path) -> (Storyboard, ProbeLoader) {
    let mut loader = ProbeLoader::new();
    let storyboard = Storyboard::load(dir, &mut loader).unwrap().unwrap();
    (storyboard, loader)
}

fn textures_at(storyboard: &mut Storyboard, time: f64) -> Vec<DrawCommand> {
    storyboard.update(time);
    storyboard.draw_list()
}

#[test]
fn linear_fade_reaches_half_way() {
    let dir = beatmap(
        "[Events]\nSprite,Foreground,Centre,\"sb/a.png\",320,240\n F,0,0,1000,0,255\n",
        &["sb/a.png"],
    );
    let (sb, _) = load(dir.path());
    let sprite = &sb.layer(Layer::Foreground).sprites()[0];
    let opacity = sprite.state_at(500.0).opacity;
    assert!((127.0..=128.0).contains(&opacity));
}

#[test]
fn consecutive_moves_and_post_roll() {
    let dir = beatmap(
        "[Events]\n\
         Sprite,Foreground,TopLeft,\"a.png\",0,0\n\
         \x20M,0,0,1000,0,0,100,100\n\
         \x20M,0,1000,2000,100,100,200,0\n",
        &["a.png"],
    );
    let (sb, _) = load(dir.path());
    let sprite = &sb.layer(Layer::Foreground).sprites()[0];
    let mid = sprite.state_at(1500.0).position;
    assert!(approx_eq(mid.x, 150.0) && approx_eq(mid.y, 50.0));
    assert_eq!(sprite.state_at(2500.0).position, Vector2 { x: 200.0, y: 0.0 });
    assert_eq!(sprite.state_at(-100.0).position, Vector2 { x: 0.0, y: 0.0 });
}

#[test]
fn running_fade_outlasts_a_shorter_later_fade() {
    let dir = beatmap(
        "[Events]\n\
         Sprite,Foreground,Centre,\"a.png\",320,240\n\
         \x20F,0,0,1000,0,1\n\
         \x20F,0,100,200,0.2\n",
        &["a.png"],
    );
    let (sb, _) = load(dir.path());
    let sprite = &sb.layer(Layer::Foreground).sprites()[0];
    assert!(approx_eq(sprite.state_at(150.0).opacity, 0.2));
    assert!(approx_eq(sprite.state_at(500.0).opacity, 0.5));
    assert!(approx_eq(sprite.state_at(1500.0).opacity, 1.0));
}

#[test]
fn looping_animation_shows_expected_frame() {
    let dir = beatmap(
        "[Events]\n\
         Animation,Foreground,Centre,\"sb/fire.png\",320,240,4,100,LoopForever\n\
         \x20F,0,0,10000,1\n",
        &["sb/fire0.png", "sb/fire1.png", "sb/fire2.png", "sb/fire3.png"],
    );
    let (mut sb, loader) = load(dir.path());
    let list = textures_at(&mut sb, 250.0);
    assert_eq!(list.len(), 1);
    let shown = loader.path(list[0].texture).unwrap();
    assert_eq!(shown, dir.path().join("sb/fire2.png"));
}

#[test]
fn missing_image_is_scheduled_but_not_drawn() {
    let dir = beatmap(
        "[Events]\n\
         Sprite,Background,Centre,\"gone.png\",320,240\n\
         \x20F,0,0,1000,1\n\
         Sprite,Background,Centre,\"here.png\",320,240\n\
         \x20F,0,0,1000,1\n",
        &["here.png"],
    );
    let (mut sb, _) = load(dir.path());
    assert_eq!(sb.layer(Layer::Background).sprites().len(), 2);
    assert!(
        sb.warnings()
            .iter()
            .any(|w| matches!(w, StoryboardError::MissingAsset { .. }))
    );

    let list = textures_at(&mut sb, 500.0);
    assert_eq!(sb.layer(Layer::Background).active().len(), 2);
    assert_eq!(list.len(), 1);
}

#[test]
fn forward_playback_matches_seek() {
    let script = "[Events]\n\
        Sprite,Background,TopLeft,\"bg.png\",0,0\n\
        \x20F,0,0,60000,1\n\
        Sprite,Foreground,Centre,\"a.png\",100,100\n\
        \x20L,1000,5\n\
        \x20\x20S,0,0,500,1,2\n\
        \x20\x20S,0,500,1000,2,1\n\
        Sprite,Foreground,Centre,\"a.png\",200,200\n\
        \x20R,2,3000,8000,0,3.14\n\
        Sprite,Foreground,Centre,\"a.png\",300,300\n\
        \x20F,0,500,1500,1,0\n";
    let dir = beatmap(script, &["bg.png", "a.png"]);

    let (mut played, _) = load(dir.path());
    let mut t = 0.0;
    while t < 4250.0 {
        played.update(t);
        t += 16.6;
    }
    let played_list = textures_at(&mut played, 4250.0);

    let (mut seeked, _) = load(dir.path());
    seeked.update(9000.0);
    let seeked_list = textures_at(&mut seeked, 4250.0);

    assert_eq!(played_list, seeked_list);
    assert_eq!(played_list.len(), 3);
}

#[test]
fn layers_draw_background_first_then_z_order() {
    let dir = beatmap(
        "[Events]\n\
         Sprite,Foreground,Centre,\"a.png\",0,0\n\
         \x20F,0,0,1000,1\n\
         Sprite,Background,Centre,\"b.png\",0,0\n\
         \x20F,0,0,1000,1\n\
         Sprite,Foreground,Centre,\"c.png\",0,0\n\
         \x20F,0,0,1000,1\n\
         Sprite,Pass,Centre,\"d.png\",0,0\n\
         \x20F,0,0,1000,1\n",
        &["a.png", "b.png", "c.png", "d.png"],
    );
    let (mut sb, loader) = load(dir.path());
    let list = textures_at(&mut sb, 10.0);
    let names: Vec<String> = list
        .iter()
        .map(|c| {
            loader
                .path(c.texture)
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap()
        })
        .collect();
    assert_eq!(names, vec!["b.png", "a.png", "c.png"]);
}

#[test]
fn forever_loop_keeps_sprite_alive() {
    let dir = beatmap(
        "[Events]\n\
         Sprite,Foreground,Centre,\"a.png\",0,0\n\
         \x20L,0,0\n\
         \x20\x20F,0,0,500,1,0.5\n",
        &["a.png"],
    );
    let (mut sb, _) = load(dir.path());
    assert_eq!(sb.end_time(), Some(f64::INFINITY));
    let list = textures_at(&mut sb, 3_600_000.0);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].color[3], 255);
}

#[test]
fn draw_list_serializes_to_json() {
    let dir = beatmap(
        "[Events]\n\
         Sprite,Foreground,BottomCentre,\"a.png\",320,480\n\
         \x20P,0,0,1000,A\n\
         \x20C,0,0,1000,255,128,0\n",
        &["a.png"],
    );
    let (mut sb, _) = load(dir.path());
    let list = textures_at(&mut sb, 100.0);
    let json = serde_json::to_value(&list).unwrap();
    let first = &json[0];
    assert_eq!(first["layer"], "Foreground");
    assert_eq!(first["origin"], "BottomCentre");
    assert_eq!(first["texture"], 0);
    assert_eq!(first["additive"], true);
    assert_eq!(first["color"], serde_json::json!([255, 128, 0, 255]));
}
