//! # Level Configuration
//!
//! Global tunables plus the chunk library, authored as declarative data
//! (TOML on disk), loaded once at startup, validated as a whole, and
//! immutable thereafter.
//!
//! Two presets ship with the crate: [`LevelConfig::production`] for real
//! runs and [`LevelConfig::test`] for deterministic unit and integration
//! tests.

use std::path::Path;

use serde::{Deserialize, Serialize};
use slipstream_shared::Vec3;

use crate::descriptor::{
    ArrangementPattern, ChunkCategory, ChunkDescriptor, ObstacleKind, PlacementPoint, RewardKind,
    RewardPlacementPoint,
};
use crate::error::ConfigError;

/// Monotonic curve mapping normalized distance to normalized difficulty.
///
/// Every variant is non-decreasing over `[0, 1]`; the evaluator clamps
/// both input and output regardless.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyCurve {
    /// Straight interpolation.
    #[default]
    Linear,
    /// Slow start, slow finish (`3t² − 2t³`).
    Smoothstep,
    /// Fast start, flattening toward the ceiling (`1 − (1−t)²`).
    EaseOutQuad,
}

impl DifficultyCurve {
    /// Samples the curve at normalized distance `t`, clamped to `[0, 1]`.
    #[must_use]
    pub fn sample(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Smoothstep => t * t * (3.0 - 2.0 * t),
            Self::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }

    /// Verifies the curve is non-decreasing by dense sampling.
    ///
    /// A violation is a configuration warning, not a fatal error: the
    /// evaluator clamps output either way.
    #[must_use]
    pub fn is_monotonic(self) -> bool {
        const STEPS: usize = 64;
        let mut previous = self.sample(0.0);
        for step in 1..=STEPS {
            let value = self.sample(step as f32 / STEPS as f32);
            if value < previous {
                return false;
            }
            previous = value;
        }
        true
    }
}

/// Per-descriptor instance-recycling limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Handles created up-front per descriptor on prewarm.
    pub initial_size: usize,
    /// Handle cap per descriptor while the pool is non-expandable.
    pub max_size: usize,
    /// Allows creation beyond `max_size` instead of failing `acquire`.
    pub expandable: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_size: 2,
            max_size: 8,
            expandable: false,
        }
    }
}

/// Global streaming tunables plus the chunk library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Chunks spawned unconditionally before the first tick.
    pub initial_active_chunks: usize,
    /// Hard cap on the live window.
    pub max_active_chunks: usize,
    /// Leading window edge: spawn while coverage trails
    /// `traveler + spawn_ahead_distance`.
    pub spawn_ahead_distance: f32,
    /// Trailing window edge: reclaim once a chunk's end falls behind
    /// `traveler − destroy_behind_distance`.
    pub destroy_behind_distance: f32,
    /// Difficulty at distance zero.
    pub initial_difficulty: f32,
    /// Difficulty ceiling.
    pub max_difficulty: f32,
    /// Shape of the distance → difficulty ramp.
    pub difficulty_curve: DifficultyCurve,
    /// Distance over which the ramp reaches the ceiling.
    pub difficulty_reference_span: f32,
    /// Minimum distance between difficulty re-evaluations.
    pub difficulty_update_interval: f32,
    /// Distance per traveler level.
    pub level_distance_span: f32,
    /// Cap on same-category runs even when repeats are allowed.
    pub max_consecutive_same_category: u32,
    /// Lateral extent of one lane, in world units.
    pub lane_width: f32,
    /// Global multiplier on authored obstacle probabilities.
    pub obstacle_probability_scale: f32,
    /// Probability that an authored reward point is populated at all.
    pub reward_probability_scale: f32,
    /// Instance-recycling limits.
    pub pool: PoolConfig,
    /// The chunk library.
    pub chunks: Vec<ChunkDescriptor>,
}

impl LevelConfig {
    /// Loads and validates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML, or any
    /// validation error the parsed configuration violates.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, plus
    /// everything [`LevelConfig::from_toml_str`] returns.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks every whole-configuration invariant.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunks.is_empty() {
            return Err(ConfigError::EmptyLibrary);
        }
        for descriptor in &self.chunks {
            descriptor.validate()?;
        }
        if self.spawn_ahead_distance <= 0.0 {
            return Err(ConfigError::NonPositiveSpawnAhead(self.spawn_ahead_distance));
        }
        if self.destroy_behind_distance < 0.0 {
            return Err(ConfigError::NegativeDestroyBehind(
                self.destroy_behind_distance,
            ));
        }
        if self.initial_difficulty > self.max_difficulty {
            return Err(ConfigError::InvertedDifficultyRange {
                initial: self.initial_difficulty,
                max: self.max_difficulty,
            });
        }
        if self.difficulty_reference_span <= 0.0 {
            return Err(ConfigError::NonPositiveReferenceSpan(
                self.difficulty_reference_span,
            ));
        }
        if self.level_distance_span <= 0.0 {
            return Err(ConfigError::NonPositiveLevelSpan(self.level_distance_span));
        }
        if self.lane_width <= 0.0 {
            return Err(ConfigError::NonPositiveLaneWidth(self.lane_width));
        }
        if self.max_consecutive_same_category == 0 {
            return Err(ConfigError::ZeroCategoryRun);
        }
        if self.pool.max_size < self.pool.initial_size {
            return Err(ConfigError::PoolSizeInverted {
                initial: self.pool.initial_size,
                max: self.pool.max_size,
            });
        }
        if self.max_active_chunks < self.initial_active_chunks {
            return Err(ConfigError::ActiveWindowInverted {
                initial: self.initial_active_chunks,
                max: self.max_active_chunks,
            });
        }
        self.check_band_coverage()?;

        if !self.difficulty_curve.is_monotonic() {
            tracing::warn!(
                curve = ?self.difficulty_curve,
                "difficulty curve is not monotonic; output will still be clamped"
            );
        }
        Ok(())
    }

    /// Verifies every reachable cursor distance has an eligible
    /// descriptor.
    ///
    /// Spawn-distance bounds partition the forward axis into bands;
    /// probing one point inside each band (and one past the last finite
    /// bound) covers all of them.
    fn check_band_coverage(&self) -> Result<(), ConfigError> {
        let mut bounds: Vec<f32> = vec![0.0];
        for descriptor in &self.chunks {
            bounds.push(descriptor.min_spawn_distance);
            if descriptor.max_spawn_distance.is_finite() {
                bounds.push(descriptor.max_spawn_distance);
            }
        }
        bounds.sort_by(f32::total_cmp);
        bounds.dedup();

        let mut probes: Vec<f32> = Vec::with_capacity(bounds.len() * 2);
        for window in bounds.windows(2) {
            probes.push(window[0]);
            probes.push((window[0] + window[1]) * 0.5);
        }
        let last = *bounds.last().unwrap_or(&0.0);
        probes.push(last);
        probes.push(last + 1.0);

        for probe in probes {
            if !self.chunks.iter().any(|descriptor| descriptor.admits(probe)) {
                return Err(ConfigError::UnreachableBand { distance: probe });
            }
        }
        Ok(())
    }

    /// The tuning used by real runs.
    #[must_use]
    pub fn production() -> Self {
        Self {
            initial_active_chunks: 4,
            max_active_chunks: 12,
            spawn_ahead_distance: 120.0,
            destroy_behind_distance: 60.0,
            initial_difficulty: 0.1,
            max_difficulty: 1.0,
            difficulty_curve: DifficultyCurve::Smoothstep,
            difficulty_reference_span: 2_000.0,
            difficulty_update_interval: 10.0,
            level_distance_span: 500.0,
            max_consecutive_same_category: 3,
            lane_width: 2.0,
            obstacle_probability_scale: 1.0,
            reward_probability_scale: 1.0,
            pool: PoolConfig::default(),
            chunks: production_library(),
        }
    }

    /// Small deterministic tuning for tests: three open descriptors,
    /// tight window, fixed pool.
    #[must_use]
    pub fn test() -> Self {
        Self {
            initial_active_chunks: 3,
            max_active_chunks: 8,
            spawn_ahead_distance: 100.0,
            destroy_behind_distance: 50.0,
            initial_difficulty: 0.0,
            max_difficulty: 1.0,
            difficulty_curve: DifficultyCurve::Linear,
            difficulty_reference_span: 1_000.0,
            difficulty_update_interval: 10.0,
            level_distance_span: 200.0,
            max_consecutive_same_category: 2,
            lane_width: 2.0,
            obstacle_probability_scale: 1.0,
            reward_probability_scale: 1.0,
            pool: PoolConfig {
                initial_size: 2,
                max_size: 5,
                expandable: false,
            },
            chunks: test_library(),
        }
    }
}

fn obstacle(kind: ObstacleKind, z: f32, lane: i8, probability: f32) -> PlacementPoint {
    PlacementPoint {
        offset: Vec3::forward(z),
        rotation: slipstream_shared::Quaternion::IDENTITY,
        kind,
        spawn_probability: probability,
        lane,
        mandatory: false,
    }
}

fn mandatory_obstacle(kind: ObstacleKind, z: f32, lane: i8) -> PlacementPoint {
    PlacementPoint {
        mandatory: true,
        ..obstacle(kind, z, lane, 1.0)
    }
}

fn rewards(
    kind: RewardKind,
    z: f32,
    count: u32,
    pattern: ArrangementPattern,
    spacing: f32,
) -> RewardPlacementPoint {
    RewardPlacementPoint {
        offset: Vec3::new(0.0, 1.0, z),
        kind,
        count,
        pattern,
        spacing,
    }
}

fn production_library() -> Vec<ChunkDescriptor> {
    vec![
        ChunkDescriptor {
            id: "straightaway".to_owned(),
            length: 40.0,
            difficulty_rating: 0.1,
            category: ChunkCategory::Normal,
            allow_consecutive_repeat: true,
            min_spawn_distance: 0.0,
            max_spawn_distance: f32::INFINITY,
            spawn_weight: 5,
            obstacle_points: vec![
                obstacle(ObstacleKind::Barrier, 15.0, -1, 0.35),
                obstacle(ObstacleKind::Hurdle, 28.0, 1, 0.35),
            ],
            reward_points: vec![rewards(RewardKind::Coin, 10.0, 5, ArrangementPattern::Line, 3.0)],
        },
        ChunkDescriptor {
            id: "breather".to_owned(),
            length: 30.0,
            difficulty_rating: 0.2,
            category: ChunkCategory::Transition,
            allow_consecutive_repeat: false,
            min_spawn_distance: 0.0,
            max_spawn_distance: f32::INFINITY,
            spawn_weight: 2,
            obstacle_points: Vec::new(),
            reward_points: vec![rewards(
                RewardKind::MagnetPickup,
                15.0,
                1,
                ArrangementPattern::Single,
                1.0,
            )],
        },
        ChunkDescriptor {
            id: "bounty-run".to_owned(),
            length: 45.0,
            difficulty_rating: 0.3,
            category: ChunkCategory::RewardDense,
            allow_consecutive_repeat: false,
            min_spawn_distance: 0.0,
            max_spawn_distance: f32::INFINITY,
            spawn_weight: 3,
            obstacle_points: vec![obstacle(ObstacleKind::Hurdle, 22.0, 0, 0.25)],
            reward_points: vec![
                rewards(RewardKind::Coin, 8.0, 6, ArrangementPattern::Arc, 2.5),
                rewards(RewardKind::Coin, 30.0, 8, ArrangementPattern::Circle, 3.0),
                rewards(RewardKind::ShieldPickup, 40.0, 1, ArrangementPattern::Single, 1.0),
            ],
        },
        ChunkDescriptor {
            id: "gauntlet".to_owned(),
            length: 50.0,
            difficulty_rating: 0.55,
            category: ChunkCategory::ObstacleDense,
            allow_consecutive_repeat: false,
            min_spawn_distance: 150.0,
            max_spawn_distance: f32::INFINITY,
            spawn_weight: 3,
            obstacle_points: vec![
                mandatory_obstacle(ObstacleKind::Barrier, 10.0, 0),
                obstacle(ObstacleKind::Barrier, 20.0, -1, 0.6),
                obstacle(ObstacleKind::Wall, 32.0, 0, 0.5),
                obstacle(ObstacleKind::Hurdle, 44.0, 1, 0.6),
            ],
            reward_points: vec![rewards(RewardKind::Gem, 46.0, 1, ArrangementPattern::Single, 1.0)],
        },
        ChunkDescriptor {
            id: "vault-line".to_owned(),
            length: 60.0,
            difficulty_rating: 0.75,
            category: ChunkCategory::ParkourChallenge,
            allow_consecutive_repeat: false,
            min_spawn_distance: 400.0,
            max_spawn_distance: f32::INFINITY,
            spawn_weight: 2,
            obstacle_points: vec![
                mandatory_obstacle(ObstacleKind::Pit, 14.0, 0),
                mandatory_obstacle(ObstacleKind::Hurdle, 30.0, 0),
                obstacle(ObstacleKind::Pit, 46.0, 0, 0.7),
            ],
            reward_points: vec![rewards(RewardKind::Gem, 20.0, 4, ArrangementPattern::Zigzag, 2.0)],
        },
        ChunkDescriptor {
            id: "spinner-alley".to_owned(),
            length: 55.0,
            difficulty_rating: 0.9,
            category: ChunkCategory::ObstacleDense,
            allow_consecutive_repeat: false,
            min_spawn_distance: 800.0,
            max_spawn_distance: f32::INFINITY,
            spawn_weight: 2,
            obstacle_points: vec![
                mandatory_obstacle(ObstacleKind::Spinner, 12.0, 0),
                mandatory_obstacle(ObstacleKind::Spinner, 30.0, 0),
                obstacle(ObstacleKind::Barrier, 44.0, -1, 0.8),
                obstacle(ObstacleKind::Barrier, 44.0, 1, 0.8),
            ],
            reward_points: vec![rewards(
                RewardKind::Multiplier,
                50.0,
                1,
                ArrangementPattern::Single,
                1.0,
            )],
        },
    ]
}

fn test_library() -> Vec<ChunkDescriptor> {
    vec![
        ChunkDescriptor {
            id: "alpha".to_owned(),
            length: 50.0,
            difficulty_rating: 0.2,
            category: ChunkCategory::Normal,
            allow_consecutive_repeat: true,
            min_spawn_distance: 0.0,
            max_spawn_distance: f32::INFINITY,
            spawn_weight: 1,
            obstacle_points: vec![obstacle(ObstacleKind::Barrier, 25.0, 0, 0.5)],
            reward_points: vec![rewards(RewardKind::Coin, 10.0, 3, ArrangementPattern::Line, 2.0)],
        },
        ChunkDescriptor {
            id: "bravo".to_owned(),
            length: 50.0,
            difficulty_rating: 0.5,
            category: ChunkCategory::ObstacleDense,
            allow_consecutive_repeat: false,
            min_spawn_distance: 0.0,
            max_spawn_distance: f32::INFINITY,
            spawn_weight: 1,
            obstacle_points: vec![mandatory_obstacle(ObstacleKind::Hurdle, 25.0, 0)],
            reward_points: Vec::new(),
        },
        ChunkDescriptor {
            id: "charlie".to_owned(),
            length: 50.0,
            difficulty_rating: 0.8,
            category: ChunkCategory::RewardDense,
            allow_consecutive_repeat: false,
            min_spawn_distance: 0.0,
            max_spawn_distance: f32::INFINITY,
            spawn_weight: 1,
            obstacle_points: Vec::new(),
            reward_points: vec![rewards(
                RewardKind::ShieldPickup,
                25.0,
                1,
                ArrangementPattern::Single,
                1.0,
            )],
        },
    ]
}
