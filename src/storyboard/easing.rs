//! Easing curves for storyboard commands.
//!
//! Scripts refer to easings by numeric id (`0..=34`). [`Easing::from_id`]
//! resolves the id and [`ease`] maps linear progress to eased progress.

use std::f64::consts::PI;

/// Easing functions for command interpolation.
///
/// Variant order matches the numeric ids used by the script format.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed (no easing).
    #[default]
    Linear,
    /// Decelerate; same curve as `QuadOut`.
    Out,
    /// Accelerate; same curve as `QuadIn`.
    In,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    QuintIn,
    QuintOut,
    QuintInOut,
    SineIn,
    SineOut,
    SineInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    CircIn,
    CircOut,
    CircInOut,
    ElasticIn,
    ElasticOut,
    ElasticHalfOut,
    ElasticQuarterOut,
    ElasticInOut,
    BackIn,
    BackOut,
    BackInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
}

impl Easing {
    pub const ALL: [Easing; 35] = [
        Easing::Linear,
        Easing::Out,
        Easing::In,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::QuartIn,
        Easing::QuartOut,
        Easing::QuartInOut,
        Easing::QuintIn,
        Easing::QuintOut,
        Easing::QuintInOut,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
        Easing::ExpoIn,
        Easing::ExpoOut,
        Easing::ExpoInOut,
        Easing::CircIn,
        Easing::CircOut,
        Easing::CircInOut,
        Easing::ElasticIn,
        Easing::ElasticOut,
        Easing::ElasticHalfOut,
        Easing::ElasticQuarterOut,
        Easing::ElasticInOut,
        Easing::BackIn,
        Easing::BackOut,
        Easing::BackInOut,
        Easing::BounceIn,
        Easing::BounceOut,
        Easing::BounceInOut,
    ];

    /// Resolve a script easing id.
    pub fn from_id(id: u32) -> Option<Easing> {
        Self::ALL.get(id as usize).copied()
    }
}

const ELASTIC_PERIOD: f64 = 2.0 * PI / 0.3;
const ELASTIC_SHIFT: f64 = 0.3 / 4.0;
const BACK_OVERSHOOT: f64 = 1.70158;
const BACK_OVERSHOOT_INOUT: f64 = BACK_OVERSHOOT * 1.525;

fn bounce_out(t: f64) -> f64 {
    if t < 1.0 / 2.75 {
        7.5625 * t * t
    } else if t < 2.0 / 2.75 {
        let t = t - 1.5 / 2.75;
        7.5625 * t * t + 0.75
    } else if t < 2.5 / 2.75 {
        let t = t - 2.25 / 2.75;
        7.5625 * t * t + 0.9375
    } else {
        let t = t - 2.625 / 2.75;
        7.5625 * t * t + 0.984375
    }
}

/// Apply an easing function to a normalized progress value.
///
/// The input is clamped to [0.0, 1.0]. The bounds map exactly onto
/// themselves for every curve, overshooting curves included.
pub fn ease(e: Easing, t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    match e {
        Easing::Linear => t,
        Easing::In | Easing::QuadIn => t * t,
        Easing::Out | Easing::QuadOut => t * (2.0 - t),
        Easing::QuadInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                -1.0 + (4.0 - 2.0 * t) * t
            }
        }
        Easing::CubicIn => t * t * t,
        Easing::CubicOut => {
            let p = t - 1.0;
            p * p * p + 1.0
        }
        Easing::CubicInOut => {
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                let p = 2.0 * t - 2.0;
                0.5 * p * p * p + 1.0
            }
        }
        Easing::QuartIn => t.powi(4),
        Easing::QuartOut => 1.0 - (t - 1.0).powi(4),
        Easing::QuartInOut => {
            if t < 0.5 {
                8.0 * t.powi(4)
            } else {
                1.0 - 8.0 * (t - 1.0).powi(4)
            }
        }
        Easing::QuintIn => t.powi(5),
        Easing::QuintOut => (t - 1.0).powi(5) + 1.0,
        Easing::QuintInOut => {
            if t < 0.5 {
                16.0 * t.powi(5)
            } else {
                16.0 * (t - 1.0).powi(5) + 1.0
            }
        }
        Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
        Easing::SineOut => (t * PI / 2.0).sin(),
        Easing::SineInOut => 0.5 - 0.5 * (PI * t).cos(),
        Easing::ExpoIn => 2f64.powf(10.0 * (t - 1.0)),
        Easing::ExpoOut => 1.0 - 2f64.powf(-10.0 * t),
        Easing::ExpoInOut => {
            if t < 0.5 {
                0.5 * 2f64.powf(20.0 * t - 10.0)
            } else {
                1.0 - 0.5 * 2f64.powf(-20.0 * t + 10.0)
            }
        }
        Easing::CircIn => 1.0 - (1.0 - t * t).sqrt(),
        Easing::CircOut => (1.0 - (t - 1.0) * (t - 1.0)).sqrt(),
        Easing::CircInOut => {
            if t < 0.5 {
                0.5 - 0.5 * (1.0 - 4.0 * t * t).sqrt()
            } else {
                let p = 2.0 * t - 2.0;
                0.5 + 0.5 * (1.0 - p * p).sqrt()
            }
        }
        Easing::ElasticIn => {
            -(2f64.powf(-10.0 + 10.0 * t)) * ((1.0 - ELASTIC_SHIFT - t) * ELASTIC_PERIOD).sin()
        }
        Easing::ElasticOut => {
            2f64.powf(-10.0 * t) * ((t - ELASTIC_SHIFT) * ELASTIC_PERIOD).sin() + 1.0
        }
        Easing::ElasticHalfOut => {
            2f64.powf(-10.0 * t) * ((0.5 * t - ELASTIC_SHIFT) * ELASTIC_PERIOD).sin() + 1.0
        }
        Easing::ElasticQuarterOut => {
            2f64.powf(-10.0 * t) * ((0.25 * t - ELASTIC_SHIFT) * ELASTIC_PERIOD).sin() + 1.0
        }
        Easing::ElasticInOut => {
            let t2 = t * 2.0;
            if t2 < 1.0 {
                -0.5 * 2f64.powf(-10.0 + 10.0 * t2)
                    * ((1.0 - ELASTIC_SHIFT * 1.5 - t2) * ELASTIC_PERIOD / 1.5).sin()
            } else {
                let p = t2 - 1.0;
                0.5 * 2f64.powf(-10.0 * p) * ((p - ELASTIC_SHIFT * 1.5) * ELASTIC_PERIOD / 1.5).sin()
                    + 1.0
            }
        }
        Easing::BackIn => t * t * ((BACK_OVERSHOOT + 1.0) * t - BACK_OVERSHOOT),
        Easing::BackOut => {
            let p = t - 1.0;
            p * p * ((BACK_OVERSHOOT + 1.0) * p + BACK_OVERSHOOT) + 1.0
        }
        Easing::BackInOut => {
            let t2 = t * 2.0;
            if t2 < 1.0 {
                0.5 * t2 * t2 * ((BACK_OVERSHOOT_INOUT + 1.0) * t2 - BACK_OVERSHOOT_INOUT)
            } else {
                let p = t2 - 2.0;
                0.5 * (p * p * ((BACK_OVERSHOOT_INOUT + 1.0) * p + BACK_OVERSHOOT_INOUT) + 2.0)
            }
        }
        Easing::BounceIn => 1.0 - bounce_out(1.0 - t),
        Easing::BounceOut => bounce_out(t),
        Easing::BounceInOut => {
            if t < 0.5 {
                0.5 - 0.5 * bounce_out(1.0 - 2.0 * t)
            } else {
                bounce_out((t - 0.5) * 2.0) * 0.5 + 0.5
            }
        }
    }
}
