//! # Difficulty Tracking
//!
//! Maps cumulative traveler distance to a difficulty value in
//! `[initial, max]` and a one-based level, throttled so the curve is not
//! re-evaluated every tick.
//!
//! The tracker's state only moves forward: difficulty never decreases
//! and the level never drops, except through an explicit [`reset`].
//!
//! [`reset`]: DifficultyTracker::reset

use crate::config::{DifficultyCurve, LevelConfig};

/// Result of a throttled difficulty re-evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyUpdate {
    /// Difficulty after the update, in `[initial, max]`.
    pub difficulty: f32,
    /// One-based level after the update.
    pub level: u32,
    /// Whether this update crossed a level boundary.
    pub leveled_up: bool,
}

/// Throttled distance → difficulty evaluator.
#[derive(Clone, Debug)]
pub struct DifficultyTracker {
    initial: f32,
    max: f32,
    curve: DifficultyCurve,
    reference_span: f32,
    update_interval: f32,
    level_span: f32,
    current_difficulty: f32,
    current_level: u32,
    current_distance: f32,
    last_evaluated: Option<f32>,
}

impl DifficultyTracker {
    /// Creates a tracker from validated configuration.
    #[must_use]
    pub fn new(config: &LevelConfig) -> Self {
        Self {
            initial: config.initial_difficulty,
            max: config.max_difficulty,
            curve: config.difficulty_curve,
            reference_span: config.difficulty_reference_span,
            update_interval: config.difficulty_update_interval,
            level_span: config.level_distance_span,
            current_difficulty: config.initial_difficulty,
            current_level: 1,
            current_distance: 0.0,
            last_evaluated: None,
        }
    }

    /// Re-evaluates difficulty if the traveler has advanced at least
    /// one update interval since the last evaluation.
    ///
    /// Returns `None` when throttled; the cached state is unchanged.
    pub fn update(&mut self, distance: f32) -> Option<DifficultyUpdate> {
        if let Some(last) = self.last_evaluated {
            if distance - last < self.update_interval {
                return None;
            }
        }
        self.last_evaluated = Some(distance);
        self.current_distance = distance;

        // Clamped to the current value so a throttle-skipped regression
        // in input can never walk difficulty backwards.
        let evaluated = self.evaluate_at(distance);
        self.current_difficulty = evaluated.max(self.current_difficulty);

        let level = Self::level_for(distance, self.level_span);
        let leveled_up = level > self.current_level;
        if leveled_up {
            self.current_level = level;
        }

        Some(DifficultyUpdate {
            difficulty: self.current_difficulty,
            level: self.current_level,
            leveled_up,
        })
    }

    /// Pure curve evaluation at an arbitrary distance.
    ///
    /// Used by the spawn procedure to probe the difficulty at the spawn
    /// cursor; bypasses the throttle and mutates nothing.
    #[must_use]
    pub fn evaluate_at(&self, distance: f32) -> f32 {
        let normalized = (distance / self.reference_span).clamp(0.0, 1.0);
        let shaped = self.curve.sample(normalized);
        let value = self.initial + (self.max - self.initial) * shaped;
        value.clamp(self.initial, self.max)
    }

    /// Restores the initial difficulty and zero distance.
    pub fn reset(&mut self) {
        self.current_difficulty = self.initial;
        self.current_level = 1;
        self.current_distance = 0.0;
        self.last_evaluated = None;
    }

    /// Current difficulty.
    #[inline]
    #[must_use]
    pub const fn difficulty(&self) -> f32 {
        self.current_difficulty
    }

    /// Current one-based level.
    #[inline]
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.current_level
    }

    /// Distance at the last accepted evaluation.
    #[inline]
    #[must_use]
    pub const fn distance(&self) -> f32 {
        self.current_distance
    }

    fn level_for(distance: f32, level_span: f32) -> u32 {
        let index = (distance / level_span).floor();
        if index < 0.0 {
            return 1;
        }
        // Saturate rather than wrap on absurd distances.
        let index = if index >= u32::MAX as f32 {
            u32::MAX - 1
        } else {
            index as u32
        };
        index + 1
    }
}
