//! Click feedback sounds: a pitch ramp across one sort and a rate limiter.

use crate::options::SortOptions;
use clientsort_core::ItemStack;
use std::time::{Duration, Instant};

/// Rough number of replay clicks a sort of `stacks` will take, so the pitch
/// ramp tops out around the last click.
pub fn estimate_clicks(stacks: &[ItemStack]) -> usize {
    let stack_count = stacks.iter().filter(|stack| !stack.is_empty()).count();
    let compaction = stacks[..stack_count]
        .iter()
        .filter(|stack| stack.is_empty())
        .count();
    let size = stack_count + compaction;
    // Chained swaps take extra clicks
    size + size / 15
}

/// Pitch rising linearly from the minimum toward the maximum, one step per click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchRamp {
    pitch: f32,
    increment: f32,
    max: f32,
}

impl PitchRamp {
    /// Ramp spanning `clicks` steps.
    pub fn new(min: f32, max: f32, clicks: usize) -> Self {
        let steps = clicks.max(1) as f32;
        Self {
            pitch: min,
            increment: (max - min) / steps,
            max,
        }
    }

    /// Ramp per the sound settings, or `None` when sounds are off.
    pub fn for_options(options: &SortOptions, clicks: usize) -> Option<Self> {
        (options.sound_enabled && options.sound_volume > 0.0)
            .then(|| Self::new(options.sound_min_pitch, options.sound_max_pitch, clicks))
    }

    /// Pitch for the next click.
    pub fn next_pitch(&mut self) -> f32 {
        let pitch = self.pitch;
        self.pitch = (self.pitch + self.increment).min(self.max);
        pitch
    }
}

/// What the host should do with a click's sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundAction {
    /// Too soon after the last sound.
    Skip,
    /// Play the sound.
    Play {
        /// Stop the previously started sound first.
        stop_previous: bool,
    },
}

/// Enforces the minimum delay between feedback sounds.
#[derive(Debug, Clone)]
pub struct SoundThrottle {
    interval: Duration,
    overlap: bool,
    next_allowed: Option<Instant>,
}

impl SoundThrottle {
    /// Throttle per the sound settings.
    pub fn new(options: &SortOptions) -> Self {
        Self {
            interval: options.sound_interval(),
            overlap: options.sound_overlap,
            next_allowed: None,
        }
    }

    /// Decide for a click happening at `now`.
    pub fn on_click(&mut self, now: Instant) -> SoundAction {
        if self.next_allowed.is_some_and(|next| now < next) {
            return SoundAction::Skip;
        }
        let stop_previous = !self.overlap && self.next_allowed.is_some();
        self.next_allowed = Some(now + self.interval);
        SoundAction::Play { stop_previous }
    }
}
