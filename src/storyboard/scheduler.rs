//! Incremental playback scheduler.
//!
//! Each layer keeps two working sets over its sprite list:
//! - `pending`: sprites that have not started yet, sorted by start time
//! - `active`: sprites drawable at the last advanced time, sorted by z-index
//!
//! Expired sprites are dropped from `active` and never revisited, so under
//! forward playback every sprite is touched once by promotion and then only
//! while it is active. Moving the clock backwards requires [`LayerScheduler::reset`].

use std::collections::VecDeque;

use super::sprite::{Sprite, SpriteState};

/// A sprite in the active set together with its state at the last advance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveSprite {
    /// Index into the layer's sprite list.
    pub sprite: usize,
    pub state: SpriteState,
}

#[derive(Clone, Debug, Default)]
pub struct LayerScheduler {
    pending: VecDeque<usize>,
    active: Vec<ActiveSprite>,
    last_time: Option<f64>,
}

impl LayerScheduler {
    pub fn new(sprites: &[Sprite]) -> Self {
        let mut scheduler = Self::default();
        scheduler.reset(sprites);
        scheduler
    }

    /// Rebuild `pending` from the full sprite list and clear `active`.
    ///
    /// Sprites without commands are left out; they can never become active.
    pub fn reset(&mut self, sprites: &[Sprite]) {
        let mut order: Vec<(usize, f64)> = sprites
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.start_time().map(|start| (i, start)))
            .collect();
        order.sort_by(|a, b| a.1.total_cmp(&b.1));
        self.pending = order.into_iter().map(|(i, _)| i).collect();
        self.active.clear();
        self.last_time = None;
    }

    /// Advance to `time` and return the active sprites in draw order.
    ///
    /// `time` must not be earlier than the previous call; call
    /// [`reset`](Self::reset) first after a backward seek.
    pub fn advance(&mut self, sprites: &[Sprite], time: f64) -> &[ActiveSprite] {
        self.active.retain_mut(|a| {
            let sprite = &sprites[a.sprite];
            let alive = sprite.end_time().is_some_and(|end| time < end);
            if alive {
                a.state = sprite.state_at(time);
            }
            alive
        });

        let mut promoted = false;
        while let Some(&next) = self.pending.front() {
            let sprite = &sprites[next];
            if !sprite.start_time().is_some_and(|start| start <= time) {
                break;
            }
            self.pending.pop_front();
            // started and ended within this step
            if !sprite.end_time().is_some_and(|end| time < end) {
                continue;
            }
            self.active.push(ActiveSprite {
                sprite: next,
                state: sprite.state_at(time),
            });
            promoted = true;
        }

        if promoted {
            self.active.sort_by_key(|a| sprites[a.sprite].z_index);
        }

        self.last_time = Some(time);
        &self.active
    }

    pub fn active(&self) -> &[ActiveSprite] {
        &self.active
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Time of the last [`advance`](Self::advance), `None` after a reset.
    pub fn last_time(&self) -> Option<f64> {
        self.last_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storyboard::command::{Command, PropertyCommands};
    use crate::storyboard::easing::Easing;
    use crate::storyboard::sprite::{CommandSet, Origin, ZIndex};
    use crate::storyboard::timeline::Repeat;
    use raylib::prelude::Vector2;
    use smallvec::smallvec;

    fn sprite(z: u32, start: f64, end: f64) -> Sprite {
        let mut cmds = CommandSet::new();
        cmds.insert(
            PropertyCommands::Fade(vec![Command::new(Easing::Linear, start, end, 0.0, 1.0)]),
            Repeat::ONCE,
        );
        Sprite::new(Origin::Centre, Vector2 { x: 0.0, y: 0.0 }, smallvec![None], cmds)
            .with_z_index(ZIndex(z))
    }

    fn ids(active: &[ActiveSprite]) -> Vec<usize> {
        active.iter().map(|a| a.sprite).collect()
    }

    /// Sprites declared out of start order, with overlapping lifetimes.
    fn population() -> Vec<Sprite> {
        vec![
            sprite(0, 500.0, 1500.0),
            sprite(1, 0.0, 1000.0),
            sprite(2, 200.0, 300.0),
            sprite(3, 0.0, 5000.0),
            sprite(4, 1200.0, 1300.0),
        ]
    }

    #[test]
    fn promotes_and_expires() {
        let sprites = population();
        let mut s = LayerScheduler::new(&sprites);
        assert_eq!(s.pending_len(), 5);
        assert_eq!(ids(s.advance(&sprites, 0.0)), vec![1, 3]);
        assert_eq!(ids(s.advance(&sprites, 250.0)), vec![1, 2, 3]);
        assert_eq!(ids(s.advance(&sprites, 600.0)), vec![0, 1, 3]);
        assert_eq!(ids(s.advance(&sprites, 1000.0)), vec![0, 3]);
        assert_eq!(ids(s.advance(&sprites, 6000.0)), Vec::<usize>::new());
        assert_eq!(s.pending_len(), 0);
    }

    #[test]
    fn active_is_sorted_by_z_index() {
        let sprites = vec![sprite(9, 100.0, 900.0), sprite(3, 0.0, 900.0), sprite(5, 50.0, 900.0)];
        let mut s = LayerScheduler::new(&sprites);
        s.advance(&sprites, 0.0);
        let active = s.advance(&sprites, 500.0);
        let z: Vec<u32> = active.iter().map(|a| sprites[a.sprite].z_index.0).collect();
        assert_eq!(z, vec![3, 5, 9]);
    }

    #[test]
    fn advance_is_idempotent_for_a_stationary_clock() {
        let sprites = population();
        let mut s = LayerScheduler::new(&sprites);
        let once = s.advance(&sprites, 700.0).to_vec();
        let twice = s.advance(&sprites, 700.0).to_vec();
        assert_eq!(once, twice);
    }

    #[test]
    fn small_steps_equal_one_jump() {
        let sprites = population();
        let mut stepped = LayerScheduler::new(&sprites);
        let mut t = 0.0;
        while t < 1250.0 {
            stepped.advance(&sprites, t);
            t += 16.0;
        }
        stepped.advance(&sprites, 1250.0);

        let mut jumped = LayerScheduler::new(&sprites);
        jumped.advance(&sprites, 0.0);
        jumped.advance(&sprites, 1250.0);

        assert_eq!(stepped.active(), jumped.active());
    }

    #[test]
    fn reset_then_advance_matches_fresh_scheduler() {
        let sprites = population();
        let mut s = LayerScheduler::new(&sprites);
        s.advance(&sprites, 4000.0);
        s.reset(&sprites);
        assert_eq!(s.last_time(), None);
        s.advance(&sprites, 250.0);

        let mut fresh = LayerScheduler::new(&sprites);
        for t in [0.0, 100.0, 250.0] {
            fresh.advance(&sprites, t);
        }
        assert_eq!(s.active(), fresh.active());
    }

    #[test]
    fn sprites_without_commands_are_never_scheduled() {
        let sprites = vec![
            Sprite::new(
                Origin::Centre,
                Vector2 { x: 0.0, y: 0.0 },
                smallvec![None],
                CommandSet::new(),
            ),
            sprite(1, 0.0, 100.0),
        ];
        let mut s = LayerScheduler::new(&sprites);
        assert_eq!(s.pending_len(), 1);
        assert_eq!(ids(s.advance(&sprites, 50.0)), vec![1]);
    }

    #[test]
    fn sprite_fully_inside_a_jump_is_skipped() {
        let sprites = vec![sprite(0, 100.0, 200.0)];
        let mut s = LayerScheduler::new(&sprites);
        assert!(s.advance(&sprites, 500.0).is_empty());
        assert_eq!(s.pending_len(), 0);
    }

    #[test]
    fn promoted_and_kept_sprites_share_one_state_pass() {
        let sprites = vec![sprite(2, 0.0, 1000.0), sprite(1, 400.0, 800.0)];
        let mut s = LayerScheduler::new(&sprites);
        s.advance(&sprites, 0.0);
        let active = s.advance(&sprites, 600.0);
        assert_eq!(ids(active), vec![1, 0]);
        assert_eq!(active[0].state, sprites[1].state_at(600.0));
        assert_eq!(active[1].state, sprites[0].state_at(600.0));
        assert!((active[0].state.opacity - 0.5).abs() < 1e-4);
    }

    #[test]
    fn states_are_evaluated_at_advance_time() {
        let sprites = vec![sprite(0, 0.0, 1000.0)];
        let mut s = LayerScheduler::new(&sprites);
        let active = s.advance(&sprites, 500.0);
        assert!((active[0].state.opacity - 0.5).abs() < 1e-4);
    }
}
