//! # Run Session
//!
//! Owns one corridor run end to end: the streamer, the world backend,
//! and the event stream, driven by per-tick traveler-distance updates.
//!
//! The session is deliberately thin. Everything with rules lives in
//! `slipstream_corridor`; this layer wires the pieces together, drains
//! the event bus every tick, and keeps session-lifetime statistics.

use slipstream_corridor::{
    ConfigError, CorridorEvent, CorridorStreamer, EventBus, EventReceiver, LevelConfig,
    RewardInstance, StreamSeed, WorldBackend, WorldHandle,
};

/// Configuration for one run session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Level tuning and chunk library.
    pub level: LevelConfig,
    /// Seed for the whole run.
    pub seed: StreamSeed,
    /// Event channel capacity.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            level: LevelConfig::production(),
            seed: StreamSeed::default(),
            event_capacity: 1024,
        }
    }
}

/// What one tick produced.
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    /// Events emitted during the tick, in emission order.
    pub events: Vec<CorridorEvent>,
    /// Difficulty after the tick.
    pub difficulty: f32,
    /// Traveler level after the tick.
    pub level: u32,
    /// Active window size after the tick.
    pub active_chunks: usize,
}

/// Session-lifetime tallies, accumulated from drained events.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionStats {
    /// Ticks processed.
    pub ticks: u64,
    /// Events drained off the bus.
    pub events_processed: u64,
    /// Chunks spawned.
    pub chunks_spawned: u64,
    /// Chunks reclaimed.
    pub chunks_reclaimed: u64,
    /// Obstacles materialized.
    pub obstacles_spawned: u64,
    /// Rewards materialized.
    pub rewards_spawned: u64,
    /// Rewards the traveler collected.
    pub rewards_collected: u64,
    /// Level-ups observed.
    pub level_ups: u64,
}

impl SessionStats {
    /// Records one drained event.
    fn record(&mut self, event: &CorridorEvent) {
        self.events_processed += 1;
        match event {
            CorridorEvent::ChunkSpawned { .. } => self.chunks_spawned += 1,
            CorridorEvent::ChunkReclaimed { .. } => self.chunks_reclaimed += 1,
            CorridorEvent::ObstacleSpawned { .. } => self.obstacles_spawned += 1,
            CorridorEvent::RewardSpawned { .. } => self.rewards_spawned += 1,
            CorridorEvent::RewardCollected { .. } => self.rewards_collected += 1,
            CorridorEvent::LevelUp { .. } => self.level_ups += 1,
            CorridorEvent::DifficultyChanged { .. } | CorridorEvent::ObstacleDestroyed { .. } => {}
        }
    }

    /// Prints a boxed summary of the session.
    pub fn print_summary(&self) {
        println!("┌─ SESSION ──────────────────────────────────────────┐");
        println!("│ Ticks:              {:<10}                     ", self.ticks);
        println!("│ Events processed:   {:<10}                     ", self.events_processed);
        println!("├─ STREAMING ────────────────────────────────────────┤");
        println!("│ Chunks spawned:     {:<10}                     ", self.chunks_spawned);
        println!("│ Chunks reclaimed:   {:<10}                     ", self.chunks_reclaimed);
        println!("│ Obstacles spawned:  {:<10}                     ", self.obstacles_spawned);
        println!("│ Rewards spawned:    {:<10}                     ", self.rewards_spawned);
        println!("│ Rewards collected:  {:<10}                     ", self.rewards_collected);
        println!("│ Level-ups:          {:<10}                     ", self.level_ups);
        println!("└────────────────────────────────────────────────────┘");
    }
}

/// One corridor run: streamer + world backend + event stream.
pub struct RunSession<W: WorldBackend> {
    streamer: CorridorStreamer,
    world: W,
    receiver: EventReceiver,
    stats: SessionStats,
}

impl<W: WorldBackend> RunSession<W> {
    /// Builds a session over a validated configuration and a world
    /// backend.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] the level configuration violates.
    pub fn new(config: SessionConfig, world: W) -> Result<Self, ConfigError> {
        let bus = EventBus::new(config.event_capacity);
        let receiver = bus.receiver();
        let streamer = CorridorStreamer::new(config.level, config.seed, bus.sender())?;
        Ok(Self {
            streamer,
            world,
            receiver,
            stats: SessionStats::default(),
        })
    }

    /// Bootstraps the corridor before the first tick.
    pub fn start(&mut self) {
        self.streamer.start(&mut self.world);
        for event in self.receiver.drain() {
            self.stats.record(&event);
        }
    }

    /// Advances the session to the traveler's new cumulative distance.
    pub fn advance_to(&mut self, distance: f32) -> TickReport {
        self.streamer.update(distance, &mut self.world);
        self.stats.ticks += 1;

        let events = self.receiver.drain();
        for event in &events {
            self.stats.record(event);
        }

        TickReport {
            events,
            difficulty: self.streamer.current_difficulty(),
            level: self.streamer.current_level(),
            active_chunks: self.streamer.active_chunk_count(),
        }
    }

    /// Collects a live reward (traveler touched it).
    pub fn collect_reward(&mut self, handle: WorldHandle) -> Option<RewardInstance> {
        let collected = self.streamer.collect_reward(handle, &mut self.world);
        for event in self.receiver.drain() {
            self.stats.record(&event);
        }
        collected
    }

    /// Reclaims everything and rewinds to a fresh run with the same
    /// seed. Statistics start over.
    pub fn restart(&mut self) {
        self.streamer.reset(&mut self.world);
        for _ in self.receiver.drain() {}
        self.stats = SessionStats::default();
    }

    /// The streaming engine.
    #[must_use]
    pub const fn streamer(&self) -> &CorridorStreamer {
        &self.streamer
    }

    /// The world backend.
    #[must_use]
    pub const fn world(&self) -> &W {
        &self.world
    }

    /// Session-lifetime statistics.
    #[must_use]
    pub const fn stats(&self) -> SessionStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipstream_corridor::HeadlessWorld;

    fn test_session() -> RunSession<HeadlessWorld> {
        let config = SessionConfig {
            level: LevelConfig::test(),
            seed: StreamSeed::new(42),
            event_capacity: 4096,
        };
        RunSession::new(config, HeadlessWorld::new()).expect("valid config")
    }

    #[test]
    fn session_tallies_bootstrap_and_ticks() {
        let mut session = test_session();
        session.start();
        assert_eq!(session.stats().chunks_spawned, 3);

        let mut distance = 0.0;
        for _ in 0..100 {
            distance += 5.0;
            let report = session.advance_to(distance);
            assert_eq!(report.active_chunks, session.streamer().active_chunk_count());
        }

        let stats = session.stats();
        assert_eq!(stats.ticks, 100);
        assert!(stats.chunks_spawned > 3);
        assert!(stats.events_processed > stats.chunks_spawned);
    }

    #[test]
    fn collecting_rewards_updates_the_tally() {
        let mut session = test_session();
        session.start();

        let mut distance = 0.0;
        let handle = loop {
            distance += 5.0;
            let _ = session.advance_to(distance);
            let live = session.streamer().rewards_in_radius(
                slipstream_shared::Vec3::forward(distance),
                500.0,
            );
            if let Some(instance) = live.first() {
                break instance.handle;
            }
            assert!(distance < 5_000.0, "no reward ever spawned");
        };

        assert!(session.collect_reward(handle).is_some());
        assert_eq!(session.stats().rewards_collected, 1);
    }

    #[test]
    fn restart_begins_a_fresh_identical_run() {
        let mut session = test_session();
        session.start();
        let mut first = Vec::new();
        let mut distance = 0.0;
        for _ in 0..50 {
            distance += 5.0;
            first.extend(session.advance_to(distance).events.into_iter().filter(|e| {
                matches!(e, CorridorEvent::ChunkSpawned { .. })
            }));
        }

        session.restart();
        assert_eq!(session.stats().ticks, 0);

        session.start();
        let mut second = Vec::new();
        let mut distance = 0.0;
        for _ in 0..50 {
            distance += 5.0;
            second.extend(session.advance_to(distance).events.into_iter().filter(|e| {
                matches!(e, CorridorEvent::ChunkSpawned { .. })
            }));
        }

        // Bootstrap spawns are tallied by start(), not returned by
        // advance_to, so both runs compare tick-emitted spawns only.
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }
}
