//! # SLIPSTREAM Corridor
//!
//! Deterministic chunk streaming for an effectively infinite corridor.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same corridor
//! 2. **Windowed**: Only a bounded set of chunks is live at any distance
//! 3. **Streamable**: Chunks spawn ahead of the traveler and are reclaimed
//!    behind, one spawn per tick
//! 4. **Data-driven**: The chunk library and every tunable is authored
//!    configuration, validated before the first tick
//!
//! ## Core Components
//!
//! - `ChunkDescriptor`: authored definition of one placeable segment
//! - `LevelConfig`: global tunables plus the chunk library
//! - `DifficultyTracker`: throttled distance → difficulty evaluation
//! - `ChunkPool`: per-descriptor instance recycling
//! - `CorridorStreamer`: the windowed spawn/despawn orchestrator
//! - `ObstacleTracker` / `RewardTracker`: live-instance bookkeeping
//!
//! ## Example
//!
//! ```rust,ignore
//! use slipstream_corridor::{
//!     CorridorStreamer, EventBus, HeadlessWorld, LevelConfig, StreamSeed,
//! };
//!
//! let bus = EventBus::new(1024);
//! let mut world = HeadlessWorld::new();
//! let mut streamer =
//!     CorridorStreamer::new(LevelConfig::production(), StreamSeed::new(42), bus.sender())?;
//!
//! streamer.start(&mut world);
//! streamer.update(125.0, &mut world);
//! assert!(streamer.active_chunk_count() > 0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod descriptor;
pub mod difficulty;
pub mod error;
pub mod events;
pub mod pool;
pub mod population;
pub mod seed;
pub mod streamer;
pub mod tracker;
pub mod world;

pub use config::{DifficultyCurve, LevelConfig, PoolConfig};
pub use descriptor::{
    ArrangementPattern, ChunkCategory, ChunkDescriptor, EffectKind, ObstacleKind, PlacementPoint,
    RewardKind, RewardPlacementPoint,
};
pub use difficulty::{DifficultyTracker, DifficultyUpdate};
pub use error::{AcquireError, ConfigError};
pub use events::{CorridorEvent, EventBus, EventReceiver, EventSender};
pub use pool::{ChunkPool, PoolStats};
pub use population::pattern_positions;
pub use seed::StreamSeed;
pub use streamer::{
    ActiveChunk, CorridorStreamer, SelectionDiagnostics, SelectionWeight, StreamStats,
};
pub use tracker::{ObstacleInstance, ObstacleTracker, RewardInstance, RewardTracker};
pub use world::{HeadlessWorld, SpawnKind, WorldBackend, WorldHandle};
