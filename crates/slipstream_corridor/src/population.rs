//! # Population
//!
//! Fills a freshly spawned chunk from its authored placement points:
//! probability-gated obstacle placements with lane offsets, and reward
//! placements expanded into geometric arrangements.
//!
//! The algorithm emits placement requests through the world backend and
//! registers the results with the lifecycle trackers. It performs no
//! rendering and no physics registration.

use std::f32::consts::PI;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use slipstream_shared::{Transform, Vec3};

use crate::config::LevelConfig;
use crate::descriptor::{ArrangementPattern, ChunkDescriptor};
use crate::events::{CorridorEvent, EventSender};
use crate::tracker::{ObstacleInstance, ObstacleTracker, RewardInstance, RewardTracker};
use crate::world::{SpawnKind, WorldBackend, WorldHandle};

/// Handles materialized while populating one chunk.
///
/// The streamer stores these on the active-chunk record so reclaim can
/// unregister exactly what population registered.
#[derive(Debug, Default)]
pub(crate) struct PopulationResult {
    /// Obstacle handles, in placement order.
    pub obstacles: Vec<WorldHandle>,
    /// Reward handles, in placement order.
    pub rewards: Vec<WorldHandle>,
}

/// Expands an arrangement pattern into local offsets.
///
/// Offsets are relative to the placement point; `spacing` is the
/// inter-instance distance for `Line`/`Arc`/`Zigzag`, the radius for
/// `Arc`/`Circle`, and the lateral amplitude for `Zigzag`.
#[must_use]
pub fn pattern_positions(pattern: ArrangementPattern, count: u32, spacing: f32) -> Vec<Vec3> {
    let n = count.max(1);
    match pattern {
        ArrangementPattern::Single => vec![Vec3::ZERO],
        ArrangementPattern::Line => (0..n)
            .map(|i| Vec3::forward(i as f32 * spacing))
            .collect(),
        ArrangementPattern::Arc => (0..n)
            .map(|i| {
                let theta = (i as f32 / n as f32) * PI;
                Vec3::new(theta.sin() * spacing, 0.0, i as f32 * spacing)
            })
            .collect(),
        ArrangementPattern::Zigzag => (0..n)
            .map(|i| {
                let side = if i % 2 == 0 { 1.0 } else { -1.0 };
                Vec3::new(side * spacing, 0.0, i as f32 * spacing)
            })
            .collect(),
        ArrangementPattern::Circle => (0..n)
            .map(|i| {
                let theta = (i as f32 / n as f32) * (2.0 * PI);
                Vec3::new(theta.cos() * spacing, 0.0, theta.sin() * spacing)
            })
            .collect(),
    }
}

/// The population algorithm, bound to a level's tuning knobs.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Populator {
    lane_width: f32,
    obstacle_scale: f32,
    reward_scale: f32,
}

impl Populator {
    pub(crate) fn new(config: &LevelConfig) -> Self {
        Self {
            lane_width: config.lane_width,
            obstacle_scale: config.obstacle_probability_scale,
            reward_scale: config.reward_probability_scale,
        }
    }

    /// Populates one chunk instance rooted at `origin`.
    ///
    /// Placement draws come from the dedicated population RNG stream so
    /// chunk selection and population stay independently reproducible.
    pub(crate) fn populate(
        &self,
        descriptor: &ChunkDescriptor,
        origin: Vec3,
        rng: &mut ChaCha8Rng,
        world: &mut dyn WorldBackend,
        obstacles: &mut ObstacleTracker,
        rewards: &mut RewardTracker,
        events: &EventSender,
    ) -> PopulationResult {
        let mut result = PopulationResult::default();

        for point in &descriptor.obstacle_points {
            let draw: f32 = rng.gen();
            let probability = (point.spawn_probability * self.obstacle_scale).clamp(0.0, 1.0);
            if !point.mandatory && draw >= probability {
                continue;
            }

            let lane_shift = Vec3::X * (f32::from(point.lane) * self.lane_width);
            let position = origin + point.offset + lane_shift;
            let transform = Transform::new(position, point.rotation, 1.0);
            let Some(handle) = world.instantiate(SpawnKind::Obstacle(point.kind), transform)
            else {
                tracing::debug!(
                    chunk = %descriptor.id,
                    kind = ?point.kind,
                    "obstacle instantiation failed; placement skipped"
                );
                continue;
            };

            obstacles.register(ObstacleInstance {
                handle,
                kind: point.kind,
                position,
            });
            let _ = events.send(CorridorEvent::ObstacleSpawned {
                kind: point.kind,
                position,
            });
            result.obstacles.push(handle);
        }

        for point in &descriptor.reward_points {
            let draw: f32 = rng.gen();
            if draw >= self.reward_scale.clamp(0.0, 1.0) {
                continue;
            }

            for local in pattern_positions(point.pattern, point.count, point.spacing) {
                let position = origin + point.offset + local;
                let transform = Transform::at_position(position);
                let Some(handle) = world.instantiate(SpawnKind::Reward(point.kind), transform)
                else {
                    tracing::debug!(
                        chunk = %descriptor.id,
                        kind = ?point.kind,
                        "reward instantiation failed; placement skipped"
                    );
                    continue;
                };

                rewards.register(RewardInstance {
                    handle,
                    kind: point.kind,
                    position,
                });
                let _ = events.send(CorridorEvent::RewardSpawned {
                    kind: point.kind,
                    position,
                });
                result.rewards.push(handle);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    use crate::config::LevelConfig;
    use crate::descriptor::{ObstacleKind, PlacementPoint, RewardKind, RewardPlacementPoint};
    use crate::events::EventBus;
    use crate::world::HeadlessWorld;
    use slipstream_shared::Quaternion;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1.0e-5
    }

    #[test]
    fn line_positions_advance_forward() {
        let positions = pattern_positions(ArrangementPattern::Line, 4, 3.0);
        assert_eq!(positions.len(), 4);
        assert!(approx(positions[0], Vec3::ZERO));
        assert!(approx(positions[3], Vec3::forward(9.0)));
    }

    #[test]
    fn circle_position_matches_closed_form() {
        // i = 2 of 8 at radius 2: theta = 2π·2/8 = π/2.
        let positions = pattern_positions(ArrangementPattern::Circle, 8, 2.0);
        let theta = 2.0 * PI * 2.0 / 8.0;
        let expected = Vec3::new(theta.cos() * 2.0, 0.0, theta.sin() * 2.0);
        assert!(approx(positions[2], expected));
        assert!(approx(positions[2], Vec3::new(0.0, 0.0, 2.0)));
    }

    #[test]
    fn arc_positions_sweep_half_turn() {
        let positions = pattern_positions(ArrangementPattern::Arc, 4, 2.0);
        let theta = PI / 4.0;
        assert!(approx(positions[0], Vec3::ZERO));
        assert!(approx(positions[1], Vec3::new(theta.sin() * 2.0, 0.0, 2.0)));
    }

    #[test]
    fn zigzag_alternates_sides() {
        let positions = pattern_positions(ArrangementPattern::Zigzag, 4, 1.5);
        assert!(approx(positions[0], Vec3::new(1.5, 0.0, 0.0)));
        assert!(approx(positions[1], Vec3::new(-1.5, 0.0, 1.5)));
        assert!(approx(positions[2], Vec3::new(1.5, 0.0, 3.0)));
    }

    #[test]
    fn single_ignores_count() {
        assert_eq!(pattern_positions(ArrangementPattern::Single, 9, 5.0).len(), 1);
    }

    fn populate_fixture(descriptor: &ChunkDescriptor) -> (HeadlessWorld, ObstacleTracker, RewardTracker, PopulationResult) {
        let config = LevelConfig::test();
        let populator = Populator::new(&config);
        let mut world = HeadlessWorld::new();
        let mut obstacles = ObstacleTracker::new();
        let mut rewards = RewardTracker::new();
        let bus = EventBus::new(256);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let result = populator.populate(
            descriptor,
            Vec3::forward(100.0),
            &mut rng,
            &mut world,
            &mut obstacles,
            &mut rewards,
            &bus.sender(),
        );
        (world, obstacles, rewards, result)
    }

    #[test]
    fn mandatory_points_always_place() {
        let descriptor = ChunkDescriptor {
            id: "forced".to_owned(),
            length: 50.0,
            difficulty_rating: 0.5,
            category: crate::descriptor::ChunkCategory::Normal,
            allow_consecutive_repeat: true,
            min_spawn_distance: 0.0,
            max_spawn_distance: f32::INFINITY,
            spawn_weight: 1,
            obstacle_points: vec![PlacementPoint {
                offset: Vec3::forward(10.0),
                rotation: Quaternion::IDENTITY,
                kind: ObstacleKind::Wall,
                spawn_probability: 0.0,
                lane: -1,
                mandatory: true,
            }],
            reward_points: Vec::new(),
        };

        let (world, obstacles, _, result) = populate_fixture(&descriptor);
        assert_eq!(result.obstacles.len(), 1);
        assert_eq!(obstacles.live_count(), 1);

        // Lane -1 shifts one lane width left of the chunk origin.
        let record = world.get(result.obstacles[0]).expect("record");
        assert_eq!(record.transform.position.x, -2.0);
        assert_eq!(record.transform.position.z, 110.0);
    }

    #[test]
    fn zero_probability_points_never_place() {
        let descriptor = ChunkDescriptor {
            id: "never".to_owned(),
            length: 50.0,
            difficulty_rating: 0.5,
            category: crate::descriptor::ChunkCategory::Normal,
            allow_consecutive_repeat: true,
            min_spawn_distance: 0.0,
            max_spawn_distance: f32::INFINITY,
            spawn_weight: 1,
            obstacle_points: vec![PlacementPoint {
                offset: Vec3::forward(10.0),
                rotation: Quaternion::IDENTITY,
                kind: ObstacleKind::Barrier,
                spawn_probability: 0.0,
                lane: 0,
                mandatory: false,
            }],
            reward_points: Vec::new(),
        };

        let (_, obstacles, _, result) = populate_fixture(&descriptor);
        assert!(result.obstacles.is_empty());
        assert_eq!(obstacles.live_count(), 0);
        assert_eq!(obstacles.total_spawned(), 0);
    }

    #[test]
    fn reward_patterns_register_every_instance() {
        let descriptor = ChunkDescriptor {
            id: "ring".to_owned(),
            length: 50.0,
            difficulty_rating: 0.5,
            category: crate::descriptor::ChunkCategory::RewardDense,
            allow_consecutive_repeat: true,
            min_spawn_distance: 0.0,
            max_spawn_distance: f32::INFINITY,
            spawn_weight: 1,
            obstacle_points: Vec::new(),
            reward_points: vec![RewardPlacementPoint {
                offset: Vec3::new(0.0, 1.0, 20.0),
                kind: RewardKind::Coin,
                count: 8,
                pattern: ArrangementPattern::Circle,
                spacing: 2.0,
            }],
        };

        let (world, _, rewards, result) = populate_fixture(&descriptor);
        assert_eq!(result.rewards.len(), 8);
        assert_eq!(rewards.live_count(), 8);
        assert_eq!(world.live_count(), 8);

        // Ring members stay within the ring radius of its center.
        let center = Vec3::new(0.0, 1.0, 120.0);
        for handle in &result.rewards {
            let record = world.get(*handle).expect("record");
            assert!(record.transform.position.distance(center) <= 2.0 + 1.0e-4);
        }
    }

    #[test]
    fn population_is_deterministic_per_seed() {
        let config = LevelConfig::test();
        let descriptor = &config.chunks[0];
        let populator = Populator::new(&config);
        let bus = EventBus::new(256);

        let run = |seed: u64| {
            let mut world = HeadlessWorld::new();
            let mut obstacles = ObstacleTracker::new();
            let mut rewards = RewardTracker::new();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let result = populator.populate(
                descriptor,
                Vec3::ZERO,
                &mut rng,
                &mut world,
                &mut obstacles,
                &mut rewards,
                &bus.sender(),
            );
            (result.obstacles.len(), result.rewards.len())
        };

        assert_eq!(run(11), run(11));
    }
}
