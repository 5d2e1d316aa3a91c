//! # Chunk Descriptors
//!
//! Authored, immutable definitions of the segments the corridor is built
//! from. Descriptors are loaded once at startup (usually from TOML via
//! [`crate::config::LevelConfig`]), validated, and never mutated at
//! runtime.

use serde::{Deserialize, Serialize};
use slipstream_shared::{Quaternion, Vec3};

use crate::error::ConfigError;

/// Gameplay category of a chunk.
///
/// The chaining rule operates on categories: a descriptor with
/// `allow_consecutive_repeat = false` is excluded from selection while
/// the previous chunk shares its category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkCategory {
    /// Baseline corridor segment.
    Normal,
    /// Segment dominated by obstacle placements.
    ObstacleDense,
    /// Segment dominated by reward placements.
    RewardDense,
    /// Segment demanding traversal skill (jumps, narrow paths).
    ParkourChallenge,
    /// Low-intensity connective segment.
    Transition,
    /// Reserved for boss encounters; ships in no preset.
    Boss,
    /// Reserved for tutorial corridors; ships in no preset.
    Tutorial,
}

/// Obstacle archetypes the world backend knows how to materialize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Full-lane block that must be dodged.
    Barrier,
    /// Low obstacle that must be jumped.
    Hurdle,
    /// Rotating hazard sweeping across lanes.
    Spinner,
    /// Full-width wall with a gap.
    Wall,
    /// Floor gap that must be cleared.
    Pit,
}

/// Reward archetypes the world backend knows how to materialize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardKind {
    /// Common currency pickup.
    Coin,
    /// Rare currency pickup.
    Gem,
    /// Grants a shield effect while active.
    ShieldPickup,
    /// Grants a pickup-magnet effect while active.
    MagnetPickup,
    /// Grants a score-multiplier effect while active.
    Multiplier,
}

impl RewardKind {
    /// The transient world effect this reward grants on collection, if any.
    #[inline]
    #[must_use]
    pub const fn effect(self) -> Option<EffectKind> {
        match self {
            Self::Coin | Self::Gem => None,
            Self::ShieldPickup => Some(EffectKind::Shield),
            Self::MagnetPickup => Some(EffectKind::Magnet),
            Self::Multiplier => Some(EffectKind::ScoreMultiplier),
        }
    }
}

/// Transient world effects granted by effect-carrying rewards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Traveler ignores one obstacle collision.
    Shield,
    /// Nearby rewards are pulled toward the traveler.
    Magnet,
    /// Score accrues at a multiplied rate.
    ScoreMultiplier,
}

impl EffectKind {
    /// Distance (in forward units) the effect stays active after pickup.
    #[inline]
    #[must_use]
    pub const fn span(self) -> f32 {
        match self {
            Self::Shield => 150.0,
            Self::Magnet => 120.0,
            Self::ScoreMultiplier => 200.0,
        }
    }
}

/// Geometric arrangement of a multi-instance reward placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrangementPattern {
    /// One instance at the placement offset.
    Single,
    /// Instances spaced along the forward axis.
    Line,
    /// Half-turn sweep rising laterally while advancing forward.
    Arc,
    /// Instances alternating left/right while advancing forward.
    Zigzag,
    /// Instances on a full circle around the placement offset.
    Circle,
}

/// An authored position within a chunk where an obstacle may appear.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementPoint {
    /// Offset from the chunk origin.
    pub offset: Vec3,
    /// Local rotation applied to the spawned instance.
    #[serde(default)]
    pub rotation: Quaternion,
    /// Obstacle archetype to materialize.
    pub kind: ObstacleKind,
    /// Probability in `[0, 1]` that the point is populated.
    pub spawn_probability: f32,
    /// Lane index relative to the corridor center (`…, -1, 0, 1, …`).
    #[serde(default)]
    pub lane: i8,
    /// Bypasses the probability draw when set.
    #[serde(default)]
    pub mandatory: bool,
}

/// An authored position within a chunk where rewards may appear.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardPlacementPoint {
    /// Offset from the chunk origin.
    pub offset: Vec3,
    /// Reward archetype to materialize.
    pub kind: RewardKind,
    /// Number of instances arranged by `pattern`.
    pub count: u32,
    /// Geometric arrangement of the instances.
    pub pattern: ArrangementPattern,
    /// Spacing between instances; doubles as the radius for `Arc` and
    /// `Circle` and the lateral amplitude for `Zigzag`.
    pub spacing: f32,
}

fn unbounded_distance() -> f32 {
    f32::INFINITY
}

/// Immutable definition of one placeable corridor segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkDescriptor {
    /// Unique name used in logs, events, and backend spawn requests.
    pub id: String,
    /// Extent along the forward axis, in world units.
    pub length: f32,
    /// Difficulty this chunk is authored for, in `[0, 1]`.
    pub difficulty_rating: f32,
    /// Gameplay category, consumed by the chaining rule.
    pub category: ChunkCategory,
    /// Permits this category to follow itself in the corridor.
    #[serde(default)]
    pub allow_consecutive_repeat: bool,
    /// Cursor distance at which this descriptor becomes selectable.
    #[serde(default)]
    pub min_spawn_distance: f32,
    /// Cursor distance beyond which this descriptor is never selected.
    #[serde(default = "unbounded_distance")]
    pub max_spawn_distance: f32,
    /// Relative selection weight (≥ 1) before difficulty adjustment.
    pub spawn_weight: u32,
    /// Authored obstacle placements, ordered along the chunk.
    #[serde(default)]
    pub obstacle_points: Vec<PlacementPoint>,
    /// Authored reward placements, ordered along the chunk.
    #[serde(default)]
    pub reward_points: Vec<RewardPlacementPoint>,
}

impl ChunkDescriptor {
    /// Reports whether the descriptor may be selected at `position`.
    #[inline]
    #[must_use]
    pub fn admits(&self, position: f32) -> bool {
        position >= self.min_spawn_distance && position <= self.max_spawn_distance
    }

    /// Checks the descriptor's own invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.length <= 0.0 {
            return Err(ConfigError::NonPositiveLength {
                id: self.id.clone(),
                length: self.length,
            });
        }
        if !(0.0..=1.0).contains(&self.difficulty_rating) {
            return Err(ConfigError::RatingOutOfRange {
                id: self.id.clone(),
                rating: self.difficulty_rating,
            });
        }
        if self.min_spawn_distance > self.max_spawn_distance {
            return Err(ConfigError::InvertedSpawnBounds {
                id: self.id.clone(),
                min: self.min_spawn_distance,
                max: self.max_spawn_distance,
            });
        }
        if self.spawn_weight == 0 {
            return Err(ConfigError::ZeroSpawnWeight {
                id: self.id.clone(),
            });
        }
        for point in &self.obstacle_points {
            if !(0.0..=1.0).contains(&point.spawn_probability) {
                return Err(ConfigError::ProbabilityOutOfRange {
                    id: self.id.clone(),
                    probability: point.spawn_probability,
                });
            }
        }
        for point in &self.reward_points {
            if point.count == 0 {
                return Err(ConfigError::ZeroRewardCount {
                    id: self.id.clone(),
                });
            }
            if point.spacing <= 0.0 {
                return Err(ConfigError::NonPositiveSpacing {
                    id: self.id.clone(),
                    spacing: point.spacing,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn barebones(id: &str) -> ChunkDescriptor {
        ChunkDescriptor {
            id: id.to_owned(),
            length: 50.0,
            difficulty_rating: 0.5,
            category: ChunkCategory::Normal,
            allow_consecutive_repeat: true,
            min_spawn_distance: 0.0,
            max_spawn_distance: f32::INFINITY,
            spawn_weight: 1,
            obstacle_points: Vec::new(),
            reward_points: Vec::new(),
        }
    }

    #[test]
    fn admits_respects_bounds() {
        let mut desc = barebones("bounded");
        desc.min_spawn_distance = 100.0;
        desc.max_spawn_distance = 200.0;

        assert!(!desc.admits(99.9));
        assert!(desc.admits(100.0));
        assert!(desc.admits(200.0));
        assert!(!desc.admits(200.1));
    }

    #[test]
    fn unbounded_descriptor_admits_everything() {
        let desc = barebones("open");
        assert!(desc.admits(0.0));
        assert!(desc.admits(1.0e9));
    }

    #[test]
    fn validate_rejects_zero_length() {
        let mut desc = barebones("flat");
        desc.length = 0.0;
        assert!(matches!(
            desc.validate(),
            Err(ConfigError::NonPositiveLength { .. })
        ));
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let mut desc = barebones("inverted");
        desc.min_spawn_distance = 500.0;
        desc.max_spawn_distance = 100.0;
        assert!(matches!(
            desc.validate(),
            Err(ConfigError::InvertedSpawnBounds { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_probability() {
        let mut desc = barebones("overeager");
        desc.obstacle_points.push(PlacementPoint {
            offset: Vec3::ZERO,
            rotation: Quaternion::IDENTITY,
            kind: ObstacleKind::Barrier,
            spawn_probability: 1.5,
            lane: 0,
            mandatory: false,
        });
        assert!(matches!(
            desc.validate(),
            Err(ConfigError::ProbabilityOutOfRange { .. })
        ));
    }

    #[test]
    fn effect_mapping_matches_kinds() {
        assert_eq!(RewardKind::Coin.effect(), None);
        assert_eq!(RewardKind::ShieldPickup.effect(), Some(EffectKind::Shield));
        assert_eq!(RewardKind::MagnetPickup.effect(), Some(EffectKind::Magnet));
    }

    #[test]
    fn descriptor_round_trips_through_toml() {
        let desc = barebones("round-trip");
        let text = toml::to_string(&desc).expect("serialize");
        let restored: ChunkDescriptor = toml::from_str(&text).expect("deserialize");
        assert_eq!(restored, desc);
    }
}
