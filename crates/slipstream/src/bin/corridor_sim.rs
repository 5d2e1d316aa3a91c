//! # Corridor Simulation
//!
//! Headless end-to-end run: a scripted traveler sprints down the
//! corridor at constant speed, collecting every reward it passes,
//! while the engine streams chunks in and out around it.
//!
//! This exercises the complete data flow — difficulty, selection,
//! pooling, population, reclaim, events — without rendering or physics,
//! and prints a summary at the end.
//!
//! Run with: cargo run --package slipstream --bin corridor_sim

use std::time::Instant;

use slipstream::corridor::{CorridorEvent, HeadlessWorld, LevelConfig, StreamSeed};
use slipstream::shared::Vec3;
use slipstream::{RunSession, SessionConfig};

/// Units of forward progress per simulated tick.
const SPEED_PER_TICK: f32 = 2.0;

/// Simulated ticks (at 60 ticks/s this is ~100 seconds of play).
const TICKS: u32 = 6_000;

/// Pickup radius around the traveler.
const COLLECT_RADIUS: f32 = 4.0;

fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    let config = SessionConfig {
        level: LevelConfig::production(),
        seed: StreamSeed::new(2024),
        event_capacity: 4096,
    };
    let library: Vec<String> = config
        .level
        .chunks
        .iter()
        .map(|descriptor| descriptor.id.clone())
        .collect();

    let mut session =
        RunSession::new(config, HeadlessWorld::new()).expect("production config is valid");

    let start = Instant::now();
    session.start();

    let mut distance = 0.0f32;
    let mut peak_live = 0usize;
    for _ in 0..TICKS {
        distance += SPEED_PER_TICK;
        let report = session.advance_to(distance);

        for event in &report.events {
            match event {
                CorridorEvent::LevelUp { level } => {
                    tracing::info!(level, distance, "level up");
                }
                CorridorEvent::ChunkSpawned {
                    descriptor,
                    position,
                    ..
                } => {
                    tracing::debug!(chunk = %library[*descriptor], position, "spawned");
                }
                _ => {}
            }
        }

        // The traveler hoovers up everything within reach.
        let nearby = session
            .streamer()
            .rewards_in_radius(Vec3::forward(distance), COLLECT_RADIUS);
        for reward in nearby {
            let _ = session.collect_reward(reward.handle);
        }

        peak_live = peak_live.max(session.world().live_count());
    }
    let elapsed = start.elapsed();

    let stats = session.stats();
    let streamer = session.streamer();
    let pool = streamer.pool_totals();

    println!();
    println!("corridor_sim: {distance:.0} units in {TICKS} ticks ({elapsed:?})");
    println!();
    stats.print_summary();
    println!();
    println!("┌─ FINAL STATE ──────────────────────────────────────┐");
    println!("│ Difficulty:         {:<10.3}                    ", streamer.current_difficulty());
    println!("│ Level:              {:<10}                     ", streamer.current_level());
    println!("│ Active chunks:      {:<10}                     ", streamer.active_chunk_count());
    println!("│ Pool created:       {:<10}                     ", pool.total_created);
    println!("│ Pool parked:        {:<10}                     ", pool.free);
    println!("│ Peak live handles:  {:<10}                     ", peak_live);
    println!("└────────────────────────────────────────────────────┘");
}
