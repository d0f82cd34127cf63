//! Per-property command timelines.
//!
//! A [`Timeline`] holds every command that drives one property. Commands
//! declared inside loop groups are stored once together with a [`Repeat`]
//! describing their occurrences, so forever-loops cost the same as a single
//! command.
//!
//! Evaluation rule: among the command occurrences whose interval contains
//! the query time, the one with the latest start wins (later declaration wins
//! ties). When none contains it, the occurrence that ended last holds its
//! end value. Before any command has started, the earliest command's start value
//! holds.

use super::command::{Command, Interpolate};

/// Occurrence pattern of a command.
///
/// Occurrence `i` of a command with local start `s` begins at
/// `offset + i * period + s`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Repeat {
    pub offset: f64,
    pub period: f64,
    /// `None` repeats forever.
    pub iterations: Option<u32>,
}

impl Repeat {
    pub const ONCE: Repeat = Repeat {
        offset: 0.0,
        period: 0.0,
        iterations: Some(1),
    };

    pub fn times(offset: f64, period: f64, iterations: u32) -> Self {
        Repeat {
            offset,
            period: period.max(0.0),
            iterations: Some(iterations.max(1)),
        }
    }

    pub fn forever(offset: f64, period: f64) -> Self {
        Repeat {
            offset,
            period: period.max(0.0),
            iterations: None,
        }
    }

    pub fn is_forever(&self) -> bool {
        self.iterations.is_none()
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Entry<T> {
    command: Command<T>,
    repeat: Repeat,
}

impl<T> Entry<T> {
    fn first_start(&self) -> f64 {
        self.repeat.offset + self.command.start
    }

    fn last_end(&self) -> f64 {
        match self.repeat.iterations {
            None => f64::INFINITY,
            Some(n) => {
                self.repeat.offset
                    + self.command.end
                    + n.saturating_sub(1) as f64 * self.repeat.period
            }
        }
    }

    /// `(start, shift)` of the latest occurrence beginning at or before
    /// `time`, where `shift` maps absolute time into command-local time.
    fn latest_occurrence(&self, time: f64) -> Option<(f64, f64)> {
        let first = self.first_start();
        if time < first {
            return None;
        }
        let period = self.repeat.period;
        let mut k = if period > 0.0 {
            ((time - first) / period).floor()
        } else {
            0.0
        };
        if let Some(n) = self.repeat.iterations {
            k = k.min(n.saturating_sub(1) as f64);
        }
        let shift = self.repeat.offset + k * period;
        Some((first + k * period, shift))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Timeline<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Timeline {
            entries: Vec::new(),
        }
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command<T>, repeat: Repeat) {
        self.entries.push(Entry { command, repeat });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Start of the earliest occurrence of any command.
    pub fn start_time(&self) -> Option<f64> {
        self.entries.iter().map(Entry::first_start).reduce(f64::min)
    }

    /// End of the latest occurrence of any command; infinite with a forever loop.
    pub fn end_time(&self) -> Option<f64> {
        self.entries.iter().map(Entry::last_end).reduce(f64::max)
    }

    /// Entry winning at `time` and its local-time shift.
    ///
    /// A running occurrence beats every ended one. Among ended occurrences the
    /// one that ended last holds, so gaps and post-roll keep the final value.
    fn active_entry(&self, time: f64) -> Option<(&Entry<T>, f64)>
    where
        T: Interpolate,
    {
        let mut running: Option<(f64, &Entry<T>, f64)> = None;
        let mut ended: Option<((f64, f64), &Entry<T>, f64)> = None;
        for entry in &self.entries {
            let Some((start, shift)) = entry.latest_occurrence(time) else {
                continue;
            };
            let end = start + entry.command.duration();
            if time <= end {
                if running.is_none_or(|(best, _, _)| start >= best) {
                    running = Some((start, entry, shift));
                }
            } else if ended.is_none_or(|(best, _, _)| (end, start) >= best) {
                ended = Some(((end, start), entry, shift));
            }
        }
        running
            .map(|(_, entry, shift)| (entry, shift))
            .or(ended.map(|(_, entry, shift)| (entry, shift)))
    }

    fn earliest_entry(&self) -> Option<&Entry<T>> {
        self.entries
            .iter()
            .min_by(|a, b| a.first_start().total_cmp(&b.first_start()))
    }
}

impl<T: Interpolate> Timeline<T> {
    /// Property value at `time`, or `None` when no command drives it.
    pub fn value_at(&self, time: f64) -> Option<T> {
        match self.active_entry(time) {
            Some((entry, shift)) => Some(entry.command.value_at(time - shift)),
            None => self.earliest_entry().map(|e| e.command.from),
        }
    }
}

impl Timeline<bool> {
    /// Whether a flag is raised at `time`.
    ///
    /// A flag is on while an occurrence's interval contains `time`; a
    /// zero-length occurrence keeps it on from its start onwards.
    pub fn is_set(&self, time: f64) -> bool {
        self.entries.iter().any(|entry| {
            entry
                .latest_occurrence(time)
                .is_some_and(|(start, _)| {
                    let duration = entry.command.duration();
                    duration == 0.0 || time <= start + duration
                })
        })
    }
}
