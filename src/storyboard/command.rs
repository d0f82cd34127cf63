//! Keyframe commands.
//!
//! A [`Command`] moves one property from a start value to an end value over
//! `[start, end]` (milliseconds) along an [`Easing`] curve. One script line
//! may produce several consecutive commands; [`PropertyCommands`] carries
//! them, typed by the property they drive.

use raylib::prelude::Vector2;

use super::easing::{Easing, ease};

/// Values a command can interpolate between.
pub trait Interpolate: Copy {
    fn interpolate(from: Self, to: Self, t: f64) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(from: Self, to: Self, t: f64) -> Self {
        from + (to - from) * t as f32
    }
}

impl Interpolate for Vector2 {
    fn interpolate(from: Self, to: Self, t: f64) -> Self {
        Vector2 {
            x: f32::interpolate(from.x, to.x, t),
            y: f32::interpolate(from.y, to.y, t),
        }
    }
}

/// Flags switch at the end of the interval.
impl Interpolate for bool {
    fn interpolate(from: Self, to: Self, t: f64) -> Self {
        if t >= 1.0 { to } else { from }
    }
}

/// Color in the script's 0-255 per-channel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 255.0,
        g: 255.0,
        b: 255.0,
    };

    /// Channels are clamped to 0-255.
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Rgb {
            r: r.clamp(0.0, 255.0),
            g: g.clamp(0.0, 255.0),
            b: b.clamp(0.0, 255.0),
        }
    }
}

impl Interpolate for Rgb {
    fn interpolate(from: Self, to: Self, t: f64) -> Self {
        Rgb::new(
            f32::interpolate(from.r, to.r, t),
            f32::interpolate(from.g, to.g, t),
            f32::interpolate(from.b, to.b, t),
        )
    }
}

/// A single eased keyframe directive on one property.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Command<T> {
    pub easing: Easing,
    pub start: f64,
    pub end: f64,
    pub from: T,
    pub to: T,
}

impl<T: Interpolate> Command<T> {
    /// An end time before `start` is clamped to `start`.
    pub fn new(easing: Easing, start: f64, end: f64, from: T, to: T) -> Self {
        Command {
            easing,
            start,
            end: end.max(start),
            from,
            to,
        }
    }

    /// Value at `time`, holding `from` before the interval and `to` after it.
    ///
    /// A zero-length command yields `to` from its start time on.
    pub fn value_at(&self, time: f64) -> T {
        if time >= self.end {
            return self.to;
        }
        if time <= self.start {
            return self.from;
        }
        let progress = (time - self.start) / (self.end - self.start);
        T::interpolate(self.from, self.to, ease(self.easing, progress))
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Render flags toggled by `P` commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parameter {
    FlipHorizontal,
    FlipVertical,
    Additive,
}

impl Parameter {
    pub fn from_token(token: &str) -> Option<Parameter> {
        match token {
            "H" => Some(Parameter::FlipHorizontal),
            "V" => Some(Parameter::FlipVertical),
            "A" => Some(Parameter::Additive),
            _ => None,
        }
    }
}

/// Commands produced by one script line, typed by the property they drive.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyCommands {
    Fade(Vec<Command<f32>>),
    Move(Vec<Command<Vector2>>),
    MoveX(Vec<Command<f32>>),
    MoveY(Vec<Command<f32>>),
    Scale(Vec<Command<f32>>),
    VectorScale(Vec<Command<Vector2>>),
    Rotate(Vec<Command<f32>>),
    Color(Vec<Command<Rgb>>),
    Parameter(Parameter, Command<bool>),
}

impl PropertyCommands {
    /// `(earliest start, latest end)` over the contained commands.
    pub fn span(&self) -> Option<(f64, f64)> {
        fn fold<T>(commands: &[Command<T>]) -> Option<(f64, f64)> {
            commands.iter().fold(None, |acc, c| match acc {
                None => Some((c.start, c.end)),
                Some((s, e)) => Some((s.min(c.start), e.max(c.end))),
            })
        }
        match self {
            PropertyCommands::Fade(c)
            | PropertyCommands::MoveX(c)
            | PropertyCommands::MoveY(c)
            | PropertyCommands::Scale(c)
            | PropertyCommands::Rotate(c) => fold(c),
            PropertyCommands::Move(c) | PropertyCommands::VectorScale(c) => fold(c),
            PropertyCommands::Color(c) => fold(c),
            PropertyCommands::Parameter(_, c) => Some((c.start, c.end)),
        }
    }
}
