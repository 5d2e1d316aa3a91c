//! # Corridor Streamer
//!
//! The windowed spawn/despawn orchestrator. Owns the ordered set of
//! active chunks along the forward axis, advances a monotonic
//! next-spawn cursor, selects descriptors by weighted draw under the
//! chaining rule, pulls instances from the pool, populates them, and
//! reclaims whatever falls behind the traveler.
//!
//! ## Tick Shape
//!
//! ```text
//! update(traveler_distance):
//! ┌─────────────────────────────────────────────────────────────┐
//! │ 1. DIFFICULTY  throttled re-evaluation, change/level events │
//! │ 2. EFFECTS     expire distance-bounded pickup effects       │
//! │ 3. SPAWN       at most ONE chunk when coverage trails the   │
//! │                leading window edge                          │
//! │ 4. RECLAIM     prefix scan from the oldest chunk; release   │
//! │                everything behind the trailing window edge   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! One spawn and a bounded reclaim prefix per tick keeps tick cost
//! independent of total distance traveled: an unbounded corridor never
//! materializes unbounded live state.
//!
//! ## Determinism
//!
//! Selection and population draw from two independent `ChaCha8` streams
//! derived from the session seed. Same seed, same distance schedule,
//! same corridor — including after [`CorridorStreamer::reset`].

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use slipstream_shared::{Transform, Vec3};

use crate::config::LevelConfig;
use crate::descriptor::ChunkCategory;
use crate::difficulty::DifficultyTracker;
use crate::error::ConfigError;
use crate::events::{CorridorEvent, EventSender};
use crate::pool::{ChunkPool, PoolStats};
use crate::population::{PopulationResult, Populator};
use crate::seed::{StreamSeed, POPULATION_STREAM, SELECTION_STREAM};
use crate::tracker::{ObstacleInstance, ObstacleTracker, RewardInstance, RewardTracker};
use crate::world::{WorldBackend, WorldHandle};

/// Runtime record of one chunk in the active window.
#[derive(Debug)]
pub struct ActiveChunk {
    /// Library index of the descriptor this chunk was built from.
    pub descriptor: usize,
    /// Pooled backend handle of the chunk instance.
    pub handle: WorldHandle,
    /// Position of the chunk's leading edge on the forward axis.
    pub spawn_position: f32,
    /// `spawn_position + length`: where the next chunk begins.
    pub end_position: f32,
    obstacles: Vec<WorldHandle>,
    rewards: Vec<WorldHandle>,
}

/// Session-lifetime streaming counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Chunks that entered the active window.
    pub chunks_spawned: u64,
    /// Chunks reclaimed behind the traveler.
    pub chunks_reclaimed: u64,
    /// Spawn attempts skipped and deferred to a later tick.
    pub spawn_retries: u64,
    /// Selections that fell back to an unweighted uniform draw.
    pub fallback_selections: u64,
}

/// Weight one descriptor carried into the most recent draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionWeight {
    /// Library index of the descriptor.
    pub descriptor: usize,
    /// Effective weight after chaining exclusion and difficulty
    /// adjustment; zero means excluded.
    pub weight: f32,
}

/// Snapshot of the most recent weighted draw, for diagnostics surfaces.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionDiagnostics {
    /// Per-descriptor weights over the distance-eligible set.
    pub weights: Vec<SelectionWeight>,
    /// Sum of the weights.
    pub total_weight: f32,
    /// Whether the draw fell back to unweighted uniform selection.
    pub fallback: bool,
    /// Library index of the chosen descriptor.
    pub chosen: usize,
}

/// The windowed spawn/despawn orchestrator.
pub struct CorridorStreamer {
    config: LevelConfig,
    seed: StreamSeed,
    selection_rng: ChaCha8Rng,
    population_rng: ChaCha8Rng,
    difficulty: DifficultyTracker,
    pool: ChunkPool,
    populator: Populator,
    obstacles: ObstacleTracker,
    rewards: RewardTracker,
    events: EventSender,
    active: VecDeque<ActiveChunk>,
    next_spawn_position: f32,
    traveler_distance: f32,
    last_category: Option<ChunkCategory>,
    category_run: u32,
    last_selection: Option<SelectionDiagnostics>,
    stats: StreamStats,
}

impl CorridorStreamer {
    /// Builds a streamer over a validated configuration.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] the configuration violates; a streamer is
    /// never constructed over malformed data.
    pub fn new(
        config: LevelConfig,
        seed: StreamSeed,
        events: EventSender,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let difficulty = DifficultyTracker::new(&config);
        let pool = ChunkPool::new(config.pool, config.chunks.len());
        let populator = Populator::new(&config);
        Ok(Self {
            selection_rng: ChaCha8Rng::seed_from_u64(seed.derive(SELECTION_STREAM).value()),
            population_rng: ChaCha8Rng::seed_from_u64(seed.derive(POPULATION_STREAM).value()),
            difficulty,
            pool,
            populator,
            obstacles: ObstacleTracker::new(),
            rewards: RewardTracker::new(),
            events,
            active: VecDeque::with_capacity(config.max_active_chunks),
            next_spawn_position: 0.0,
            traveler_distance: 0.0,
            last_category: None,
            category_run: 0,
            last_selection: None,
            stats: StreamStats::default(),
            config,
            seed,
        })
    }

    /// Prewarms the pool and bootstraps the window with
    /// `initial_active_chunks` chunks, before the traveler can outrun
    /// an empty corridor.
    pub fn start(&mut self, world: &mut dyn WorldBackend) {
        for index in 0..self.config.chunks.len() {
            self.pool
                .prewarm(index, self.config.pool.initial_size, &self.config.chunks[index], world);
        }
        for _ in 0..self.config.initial_active_chunks {
            if !self.spawn_one(world) {
                tracing::warn!("bootstrap spawn failed; corridor starts short");
                break;
            }
        }
    }

    /// One streaming tick, driven by the traveler's cumulative forward
    /// distance (monotonic; not wall-clock time).
    pub fn update(&mut self, traveler_distance: f32, world: &mut dyn WorldBackend) {
        self.traveler_distance = self.traveler_distance.max(traveler_distance);
        let distance = self.traveler_distance;

        let before = self.difficulty.difficulty();
        if let Some(update) = self.difficulty.update(distance) {
            if update.difficulty > before {
                let _ = self.events.send(CorridorEvent::DifficultyChanged {
                    difficulty: update.difficulty,
                });
            }
            if update.leveled_up {
                let _ = self.events.send(CorridorEvent::LevelUp {
                    level: update.level,
                });
            }
        }

        self.rewards.update(distance);

        // At most one spawn per tick bounds per-tick cost and smooths
        // spawn bursts over frames.
        if distance > self.next_spawn_position - self.config.spawn_ahead_distance
            && self.active.len() < self.config.max_active_chunks
        {
            let _ = self.spawn_one(world);
        }

        // The window is ordered by spawn position, so reclaim is a
        // prefix scan that stops at the first surviving chunk.
        let horizon = distance - self.config.destroy_behind_distance;
        while self
            .active
            .front()
            .is_some_and(|chunk| chunk.end_position < horizon)
        {
            self.reclaim_front(world);
        }
    }

    /// Marks a live reward as collected by the traveler.
    ///
    /// Destroys the instance, starts any effect it grants, and emits
    /// [`CorridorEvent::RewardCollected`]. Returns `None` for handles
    /// that are not live rewards.
    pub fn collect_reward(
        &mut self,
        handle: WorldHandle,
        world: &mut dyn WorldBackend,
    ) -> Option<RewardInstance> {
        let instance = self.rewards.collect(handle, self.traveler_distance)?;
        for chunk in &mut self.active {
            if let Some(index) = chunk.rewards.iter().position(|&h| h == handle) {
                let _ = chunk.rewards.swap_remove(index);
                break;
            }
        }
        world.destroy(handle);
        let _ = self.events.send(CorridorEvent::RewardCollected {
            kind: instance.kind,
            position: instance.position,
        });
        Some(instance)
    }

    /// Reclaims every active chunk and restores the initial state:
    /// cursor at zero, initial difficulty, reseeded random streams.
    ///
    /// Replaying the same distance schedule after a reset reproduces
    /// the same corridor.
    pub fn reset(&mut self, world: &mut dyn WorldBackend) {
        while !self.active.is_empty() {
            self.reclaim_front(world);
        }
        self.pool.clear(world);
        self.obstacles.clear();
        self.rewards.clear();
        self.difficulty.reset();
        self.selection_rng =
            ChaCha8Rng::seed_from_u64(self.seed.derive(SELECTION_STREAM).value());
        self.population_rng =
            ChaCha8Rng::seed_from_u64(self.seed.derive(POPULATION_STREAM).value());
        self.next_spawn_position = 0.0;
        self.traveler_distance = 0.0;
        self.last_category = None;
        self.category_run = 0;
        self.last_selection = None;
        self.stats = StreamStats::default();
    }

    fn spawn_one(&mut self, world: &mut dyn WorldBackend) -> bool {
        let difficulty_here = self.difficulty.evaluate_at(self.next_spawn_position);
        let Some(index) = self.select_descriptor(difficulty_here) else {
            tracing::warn!(
                position = self.next_spawn_position,
                "no descriptor eligible at spawn cursor; retrying next tick"
            );
            self.stats.spawn_retries += 1;
            return false;
        };

        let origin = Vec3::forward(self.next_spawn_position);
        let transform = Transform::at_position(origin);
        let handle = match self
            .pool
            .acquire(index, &self.config.chunks[index], transform, world)
        {
            Ok(handle) => handle,
            Err(error) => {
                // Cursor untouched: the same spawn is retried next tick,
                // so a transient failure never leaves a hole.
                tracing::warn!(
                    descriptor = %self.config.chunks[index].id,
                    %error,
                    "chunk spawn failed; retrying next tick"
                );
                self.stats.spawn_retries += 1;
                return false;
            }
        };

        let PopulationResult { obstacles, rewards } = self.populator.populate(
            &self.config.chunks[index],
            origin,
            &mut self.population_rng,
            world,
            &mut self.obstacles,
            &mut self.rewards,
            &self.events,
        );

        let descriptor = &self.config.chunks[index];
        let spawn_position = self.next_spawn_position;
        self.active.push_back(ActiveChunk {
            descriptor: index,
            handle,
            spawn_position,
            end_position: spawn_position + descriptor.length,
            obstacles,
            rewards,
        });

        self.next_spawn_position += descriptor.length;
        self.category_run = if self.last_category == Some(descriptor.category) {
            self.category_run + 1
        } else {
            1
        };
        self.last_category = Some(descriptor.category);
        self.stats.chunks_spawned += 1;
        let _ = self.events.send(CorridorEvent::ChunkSpawned {
            descriptor: index,
            position: spawn_position,
            length: descriptor.length,
        });
        true
    }

    /// Weighted draw over the distance-eligible library.
    ///
    /// A descriptor weighs zero while the chaining rule excludes it;
    /// otherwise `spawn_weight × (1 − 0.5·|rating − difficulty|)`, so a
    /// perfect difficulty match keeps full weight and the worst
    /// mismatch still keeps half (badly-matched chunks stay rare, never
    /// impossible). A zero total falls back to an unweighted uniform
    /// pick — over the same distance-eligible set, so spawn-distance
    /// bounds hold unconditionally.
    fn select_descriptor(&mut self, difficulty: f32) -> Option<usize> {
        let position = self.next_spawn_position;
        let eligible: Vec<usize> = self
            .config
            .chunks
            .iter()
            .enumerate()
            .filter(|(_, descriptor)| descriptor.admits(position))
            .map(|(index, _)| index)
            .collect();
        if eligible.is_empty() {
            return None;
        }

        let mut weights = Vec::with_capacity(eligible.len());
        let mut total_weight = 0.0_f32;
        for &index in &eligible {
            let descriptor = &self.config.chunks[index];
            let same_category = self.last_category == Some(descriptor.category);
            let excluded = same_category
                && (!descriptor.allow_consecutive_repeat
                    || self.category_run >= self.config.max_consecutive_same_category);
            let weight = if excluded {
                0.0
            } else {
                let mismatch = (descriptor.difficulty_rating - difficulty).abs();
                descriptor.spawn_weight as f32 * (1.0 - 0.5 * mismatch)
            };
            weights.push(SelectionWeight {
                descriptor: index,
                weight,
            });
            total_weight += weight;
        }

        let (chosen, fallback) = if total_weight > 0.0 {
            let draw = self.selection_rng.gen_range(0.0..total_weight);
            let mut cumulative = 0.0_f32;
            let mut chosen = *eligible.last().expect("eligible is non-empty");
            for sample in &weights {
                cumulative += sample.weight;
                if draw < cumulative {
                    chosen = sample.descriptor;
                    break;
                }
            }
            (chosen, false)
        } else {
            tracing::debug!(
                position,
                "all eligible descriptors excluded by chaining; uniform fallback"
            );
            self.stats.fallback_selections += 1;
            let pick = self.selection_rng.gen_range(0..eligible.len());
            (eligible[pick], true)
        };

        self.last_selection = Some(SelectionDiagnostics {
            weights,
            total_weight,
            fallback,
            chosen,
        });
        Some(chosen)
    }

    fn reclaim_front(&mut self, world: &mut dyn WorldBackend) {
        let Some(chunk) = self.active.pop_front() else {
            return;
        };

        for handle in &chunk.obstacles {
            if let Some(instance) = self.obstacles.unregister(*handle) {
                world.destroy(*handle);
                let _ = self.events.send(CorridorEvent::ObstacleDestroyed {
                    kind: instance.kind,
                    position: instance.position,
                });
            }
        }
        for handle in &chunk.rewards {
            if self.rewards.unregister(*handle).is_some() {
                world.destroy(*handle);
            }
        }

        self.pool.release(chunk.descriptor, chunk.handle, world);
        self.stats.chunks_reclaimed += 1;
        let _ = self.events.send(CorridorEvent::ChunkReclaimed {
            descriptor: chunk.descriptor,
            position: chunk.spawn_position,
        });
    }

    /// Number of chunks in the active window.
    #[must_use]
    pub fn active_chunk_count(&self) -> usize {
        self.active.len()
    }

    /// The active window, oldest chunk first.
    pub fn active_chunks(&self) -> impl Iterator<Item = &ActiveChunk> + '_ {
        self.active.iter()
    }

    /// Current difficulty.
    #[must_use]
    pub fn current_difficulty(&self) -> f32 {
        self.difficulty.difficulty()
    }

    /// Current one-based traveler level.
    #[must_use]
    pub fn current_level(&self) -> u32 {
        self.difficulty.level()
    }

    /// Cumulative traveler distance seen so far.
    #[must_use]
    pub const fn total_distance(&self) -> f32 {
        self.traveler_distance
    }

    /// Position the next chunk will spawn at.
    #[must_use]
    pub const fn next_spawn_position(&self) -> f32 {
        self.next_spawn_position
    }

    /// Session streaming counters.
    #[must_use]
    pub const fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Pool counters for one descriptor.
    #[must_use]
    pub fn pool_stats(&self, descriptor_index: usize) -> PoolStats {
        self.pool.stats(descriptor_index)
    }

    /// Pool counters summed over the library.
    #[must_use]
    pub fn pool_totals(&self) -> PoolStats {
        self.pool.totals()
    }

    /// Live obstacle bookkeeping.
    #[must_use]
    pub const fn obstacles(&self) -> &ObstacleTracker {
        &self.obstacles
    }

    /// Live reward bookkeeping.
    #[must_use]
    pub const fn rewards(&self) -> &RewardTracker {
        &self.rewards
    }

    /// Live obstacles within `radius` of `point`.
    #[must_use]
    pub fn obstacles_in_radius(&self, point: Vec3, radius: f32) -> Vec<ObstacleInstance> {
        self.obstacles.query_within_radius(point, radius)
    }

    /// Live rewards within `radius` of `point`.
    #[must_use]
    pub fn rewards_in_radius(&self, point: Vec3, radius: f32) -> Vec<RewardInstance> {
        self.rewards.query_within_radius(point, radius)
    }

    /// Weights of the most recent selection, for diagnostics surfaces.
    #[must_use]
    pub const fn last_selection(&self) -> Option<&SelectionDiagnostics> {
        self.last_selection.as_ref()
    }

    /// The validated configuration this streamer runs over.
    #[must_use]
    pub const fn config(&self) -> &LevelConfig {
        &self.config
    }
}
