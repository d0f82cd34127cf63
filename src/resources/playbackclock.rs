//! Playback clock resource.
//!
//! Storyboard time in milliseconds, advanced once per frame from the wall
//! clock by [`update_playback_clock`](crate::systems::time::update_playback_clock).
use bevy_ecs::prelude::Resource;

pub const MIN_RATE: f64 = 0.25;
pub const MAX_RATE: f64 = 4.0;

#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct PlaybackClock {
    /// Current playback time in milliseconds.
    pub time_ms: f64,
    /// Playback time of the previous frame.
    pub previous_ms: f64,
    /// Playback speed multiplier, within [`MIN_RATE`, `MAX_RATE`].
    pub rate: f64,
    pub paused: bool,
    pub frame_count: u64,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        PlaybackClock {
            time_ms: 0.0,
            previous_ms: 0.0,
            rate: 1.0,
            paused: false,
            frame_count: 0,
        }
    }
}

impl PlaybackClock {
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.set_rate(rate);
        self
    }

    pub fn with_start(mut self, time_ms: f64) -> Self {
        self.seek(time_ms);
        self
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate.clamp(MIN_RATE, MAX_RATE);
    }

    /// Jump to `time_ms`; negative times clamp to 0.
    pub fn seek(&mut self, time_ms: f64) {
        let time_ms = time_ms.max(0.0);
        self.previous_ms = time_ms;
        self.time_ms = time_ms;
    }

    /// Advance by `dt` seconds of wall time, scaled by `rate`.
    pub fn tick(&mut self, dt: f32) {
        self.previous_ms = self.time_ms;
        self.frame_count += 1;
        if !self.paused {
            self.time_ms += dt as f64 * 1000.0 * self.rate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_scales_by_rate() {
        let mut clock = PlaybackClock::default().with_rate(2.0);
        clock.tick(0.5);
        assert_eq!(clock.time_ms, 1000.0);
        assert_eq!(clock.previous_ms, 0.0);
        assert_eq!(clock.frame_count, 1);
    }

    #[test]
    fn paused_clock_holds() {
        let mut clock = PlaybackClock::default().with_start(300.0);
        clock.paused = true;
        clock.tick(1.0);
        assert_eq!(clock.time_ms, 300.0);
    }

    #[test]
    fn rate_and_seek_are_clamped() {
        let mut clock = PlaybackClock::default();
        clock.set_rate(10.0);
        assert_eq!(clock.rate, MAX_RATE);
        clock.set_rate(0.0);
        assert_eq!(clock.rate, MIN_RATE);
        clock.seek(-50.0);
        assert_eq!(clock.time_ms, 0.0);
    }
}
