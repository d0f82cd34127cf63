//! Storyboard sprites.
//!
//! A [`Sprite`] is one animatable object: 1..N texture frames, an origin, a
//! z-index and a [`CommandSet`] of per-property timelines. Sprites are built
//! once by the parser and never change afterwards; per-frame values are
//! computed into a [`SpriteState`] by [`Sprite::state_at`].

use raylib::prelude::Vector2;
use serde::Serialize;
use smallvec::SmallVec;

use super::command::{Command, Parameter, PropertyCommands, Rgb};
use super::texturecache::TextureId;
use super::timeline::{Repeat, Timeline};

/// Anchor point of a sprite, relative to its texture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Origin {
    #[default]
    TopLeft,
    Centre,
    CentreLeft,
    TopRight,
    BottomCentre,
    TopCentre,
    /// Behaves as `TopLeft`.
    Custom,
    CentreRight,
    BottomLeft,
    BottomRight,
}

impl Origin {
    /// Accepts the named form or the numeric id.
    pub fn from_token(token: &str) -> Option<Origin> {
        match token {
            "TopLeft" | "0" => Some(Origin::TopLeft),
            "Centre" | "1" => Some(Origin::Centre),
            "CentreLeft" | "2" => Some(Origin::CentreLeft),
            "TopRight" | "3" => Some(Origin::TopRight),
            "BottomCentre" | "4" => Some(Origin::BottomCentre),
            "TopCentre" | "5" => Some(Origin::TopCentre),
            "Custom" | "6" => Some(Origin::Custom),
            "CentreRight" | "7" => Some(Origin::CentreRight),
            "BottomLeft" | "8" => Some(Origin::BottomLeft),
            "BottomRight" | "9" => Some(Origin::BottomRight),
            _ => None,
        }
    }

    /// Pivot as a fraction of the texture size.
    pub fn pivot(self) -> (f32, f32) {
        match self {
            Origin::TopLeft | Origin::Custom => (0.0, 0.0),
            Origin::Centre => (0.5, 0.5),
            Origin::CentreLeft => (0.0, 0.5),
            Origin::TopRight => (1.0, 0.0),
            Origin::BottomCentre => (0.5, 1.0),
            Origin::TopCentre => (0.5, 0.0),
            Origin::CentreRight => (1.0, 0.5),
            Origin::BottomLeft => (0.0, 1.0),
            Origin::BottomRight => (1.0, 1.0),
        }
    }
}

/// Playback mode of multi-frame sprites.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopType {
    #[default]
    LoopForever,
    /// Play once and hold the last frame.
    LoopOnce,
}

impl LoopType {
    pub fn from_token(token: &str) -> Option<LoopType> {
        match token {
            "LoopForever" | "0" => Some(LoopType::LoopForever),
            "LoopOnce" | "1" => Some(LoopType::LoopOnce),
            _ => None,
        }
    }
}

/// Draw order within a layer. Higher values are drawn later (on top).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ZIndex(pub u32);

/// Texture frames of a sprite; `None` marks a frame whose texture failed to load.
pub type Frames = SmallVec<[Option<TextureId>; 1]>;

/// Timelines for every animatable property of a sprite.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandSet {
    pub x: Timeline<f32>,
    pub y: Timeline<f32>,
    pub scale: Timeline<f32>,
    pub vector_scale: Timeline<Vector2>,
    pub rotation: Timeline<f32>,
    pub opacity: Timeline<f32>,
    pub color: Timeline<Rgb>,
    pub flip_h: Timeline<bool>,
    pub flip_v: Timeline<bool>,
    pub additive: Timeline<bool>,
}

macro_rules! fold_timelines {
    ($set:expr, $method:ident, $combine:expr) => {
        [
            $set.x.$method(),
            $set.y.$method(),
            $set.scale.$method(),
            $set.vector_scale.$method(),
            $set.rotation.$method(),
            $set.opacity.$method(),
            $set.color.$method(),
            $set.flip_h.$method(),
            $set.flip_v.$method(),
            $set.additive.$method(),
        ]
        .into_iter()
        .flatten()
        .reduce($combine)
    };
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the commands of one script line with the given occurrence pattern.
    pub fn insert(&mut self, commands: PropertyCommands, repeat: Repeat) {
        match commands {
            PropertyCommands::Fade(cmds) => push_all(&mut self.opacity, cmds, repeat),
            PropertyCommands::Move(cmds) => {
                for c in cmds {
                    self.x.push(map_command(&c, |v| v.x), repeat);
                    self.y.push(map_command(&c, |v| v.y), repeat);
                }
            }
            PropertyCommands::MoveX(cmds) => push_all(&mut self.x, cmds, repeat),
            PropertyCommands::MoveY(cmds) => push_all(&mut self.y, cmds, repeat),
            PropertyCommands::Scale(cmds) => push_all(&mut self.scale, cmds, repeat),
            PropertyCommands::VectorScale(cmds) => push_all(&mut self.vector_scale, cmds, repeat),
            PropertyCommands::Rotate(cmds) => push_all(&mut self.rotation, cmds, repeat),
            PropertyCommands::Color(cmds) => push_all(&mut self.color, cmds, repeat),
            PropertyCommands::Parameter(param, c) => match param {
                Parameter::FlipHorizontal => self.flip_h.push(c, repeat),
                Parameter::FlipVertical => self.flip_v.push(c, repeat),
                Parameter::Additive => self.additive.push(c, repeat),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of stored commands (loop bodies count once).
    pub fn len(&self) -> usize {
        self.x.len()
            + self.y.len()
            + self.scale.len()
            + self.vector_scale.len()
            + self.rotation.len()
            + self.opacity.len()
            + self.color.len()
            + self.flip_h.len()
            + self.flip_v.len()
            + self.additive.len()
    }

    pub fn start_time(&self) -> Option<f64> {
        fold_timelines!(self, start_time, f64::min)
    }

    pub fn end_time(&self) -> Option<f64> {
        fold_timelines!(self, end_time, f64::max)
    }
}

fn push_all<T>(timeline: &mut Timeline<T>, commands: Vec<Command<T>>, repeat: Repeat) {
    for c in commands {
        timeline.push(c, repeat);
    }
}

fn map_command<T>(c: &Command<Vector2>, f: impl Fn(Vector2) -> T) -> Command<T> {
    Command {
        easing: c.easing,
        start: c.start,
        end: c.end,
        from: f(c.from),
        to: f(c.to),
    }
}

/// Event-conditional command group.
///
/// Kept as parsed state only; nothing raises trigger events during playback,
/// so triggers never affect a sprite's lifetime or values.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerGroup {
    pub trigger: String,
    pub start: f64,
    pub end: f64,
    pub group: i32,
    pub commands: CommandSet,
}

/// Values of a sprite at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteState {
    pub position: Vector2,
    pub scale: Vector2,
    /// Radians, clockwise.
    pub rotation: f32,
    pub opacity: f32,
    pub color: Rgb,
    pub flip_h: bool,
    pub flip_v: bool,
    pub additive: bool,
    /// Index into the sprite's frames.
    pub frame: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub origin: Origin,
    /// Initial position from the object header.
    pub position: Vector2,
    pub z_index: ZIndex,
    pub frames: Frames,
    /// Milliseconds per frame for multi-frame sprites.
    pub frame_delay: f64,
    pub loop_type: LoopType,
    pub triggers: Vec<TriggerGroup>,
    commands: CommandSet,
    start_time: Option<f64>,
    end_time: Option<f64>,
}

impl Sprite {
    pub fn new(origin: Origin, position: Vector2, frames: Frames, commands: CommandSet) -> Self {
        let start_time = commands.start_time();
        let end_time = commands.end_time();
        Sprite {
            origin,
            position,
            z_index: ZIndex::default(),
            frames,
            frame_delay: 0.0,
            loop_type: LoopType::default(),
            triggers: Vec::new(),
            commands,
            start_time,
            end_time,
        }
    }

    pub fn with_animation(mut self, frame_delay: f64, loop_type: LoopType) -> Self {
        self.frame_delay = frame_delay;
        self.loop_type = loop_type;
        self
    }

    pub fn with_z_index(mut self, z_index: ZIndex) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_triggers(mut self, triggers: Vec<TriggerGroup>) -> Self {
        self.triggers = triggers;
        self
    }

    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    /// Earliest command start; `None` for a sprite without commands.
    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    /// Latest command end; infinite when a forever loop is present.
    pub fn end_time(&self) -> Option<f64> {
        self.end_time
    }

    /// Whether the sprite is drawable at `time`.
    pub fn is_active_at(&self, time: f64) -> bool {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => start <= time && time < end,
            _ => false,
        }
    }

    /// Frame displayed at `time`.
    pub fn frame_index(&self, time: f64) -> usize {
        let count = self.frames.len();
        if count <= 1 || self.frame_delay <= 0.0 {
            return 0;
        }
        let Some(start) = self.start_time else {
            return 0;
        };
        if time < start {
            return 0;
        }
        let frame = ((time - start) / self.frame_delay).floor() as usize;
        match self.loop_type {
            LoopType::LoopForever => frame % count,
            LoopType::LoopOnce => frame.min(count - 1),
        }
    }

    /// Texture shown at `time`; `None` if that frame's texture is missing.
    pub fn texture_at(&self, time: f64) -> Option<TextureId> {
        self.frames.get(self.frame_index(time)).copied().flatten()
    }

    pub fn state_at(&self, time: f64) -> SpriteState {
        let c = &self.commands;
        let scale = c.scale.value_at(time).unwrap_or(1.0);
        let vector_scale = c
            .vector_scale
            .value_at(time)
            .unwrap_or(Vector2 { x: 1.0, y: 1.0 });
        SpriteState {
            position: Vector2 {
                x: c.x.value_at(time).unwrap_or(self.position.x),
                y: c.y.value_at(time).unwrap_or(self.position.y),
            },
            scale: Vector2 {
                x: scale * vector_scale.x,
                y: scale * vector_scale.y,
            },
            rotation: c.rotation.value_at(time).unwrap_or(0.0),
            opacity: c.opacity.value_at(time).unwrap_or(1.0),
            color: c.color.value_at(time).unwrap_or(Rgb::WHITE),
            flip_h: c.flip_h.is_set(time),
            flip_v: c.flip_v.is_set(time),
            additive: c.additive.is_set(time),
            frame: self.frame_index(time),
        }
    }
}
