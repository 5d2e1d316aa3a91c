//! # Chunk Pool
//!
//! Per-descriptor recycling of world instances. Streaming churns through
//! chunks constantly; the pool keeps reclaimed instances parked (inactive)
//! and hands them back out instead of paying instantiate/destroy on every
//! spawn.
//!
//! Pooling is strictly an optimization: correctness never depends on
//! whether an instance was reused or freshly created.
//!
//! ## Invariant
//!
//! For every descriptor: `active + free == total_created`, and
//! `total_created ≤ max_size` while the pool is non-expandable.

use slipstream_shared::Transform;

use crate::config::PoolConfig;
use crate::descriptor::ChunkDescriptor;
use crate::error::AcquireError;
use crate::world::{SpawnKind, WorldBackend, WorldHandle};

/// Counters for one descriptor's pool entry (or an aggregate of all).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances ever created and still owned by the pool.
    pub total_created: usize,
    /// Instances currently handed out.
    pub active: usize,
    /// Instances parked on the free list.
    pub free: usize,
}

/// Reusable store of released handles for one descriptor.
#[derive(Debug, Default)]
struct PoolEntry {
    free: Vec<WorldHandle>,
    total_created: usize,
    active: usize,
}

impl PoolEntry {
    fn stats(&self) -> PoolStats {
        PoolStats {
            total_created: self.total_created,
            active: self.active,
            free: self.free.len(),
        }
    }
}

/// Per-descriptor object-recycling store over backend handles.
#[derive(Debug)]
pub struct ChunkPool {
    entries: Vec<PoolEntry>,
    max_size: usize,
    expandable: bool,
}

impl ChunkPool {
    /// Creates a pool with one empty entry per library descriptor.
    #[must_use]
    pub fn new(config: PoolConfig, descriptor_count: usize) -> Self {
        let mut entries = Vec::with_capacity(descriptor_count);
        entries.resize_with(descriptor_count, PoolEntry::default);
        Self {
            entries,
            max_size: config.max_size,
            expandable: config.expandable,
        }
    }

    /// Hands out an instance of `descriptor`, reusing a parked one when
    /// available.
    ///
    /// # Errors
    ///
    /// [`AcquireError::Exhausted`] when the pool is non-expandable and
    /// every instance is active; [`AcquireError::BackendRefused`] when a
    /// fresh instantiation returns no handle. Both are transient from
    /// the caller's perspective.
    pub fn acquire(
        &mut self,
        descriptor_index: usize,
        descriptor: &ChunkDescriptor,
        transform: Transform,
        world: &mut dyn WorldBackend,
    ) -> Result<WorldHandle, AcquireError> {
        let entry = &mut self.entries[descriptor_index];

        if let Some(handle) = entry.free.pop() {
            world.set_transform(handle, transform);
            world.set_active(handle, true);
            entry.active += 1;
            return Ok(handle);
        }

        if !self.expandable && entry.total_created >= self.max_size {
            return Err(AcquireError::Exhausted {
                descriptor: descriptor_index,
                capacity: self.max_size,
            });
        }

        let handle = world
            .instantiate(SpawnKind::Chunk(&descriptor.id), transform)
            .ok_or(AcquireError::BackendRefused)?;
        entry.total_created += 1;
        entry.active += 1;
        Ok(handle)
    }

    /// Takes an instance back, parking it for reuse.
    ///
    /// Instances beyond `max_size` (possible only on expandable pools)
    /// are destroyed instead of parked, shrinking back to the cap.
    pub fn release(
        &mut self,
        descriptor_index: usize,
        handle: WorldHandle,
        world: &mut dyn WorldBackend,
    ) {
        let entry = &mut self.entries[descriptor_index];
        debug_assert!(entry.active > 0, "release without matching acquire");
        entry.active = entry.active.saturating_sub(1);
        world.set_active(handle, false);

        if entry.total_created <= self.max_size {
            entry.free.push(handle);
        } else {
            world.destroy(handle);
            entry.total_created -= 1;
        }
    }

    /// Front-loads up to `count` parked instances for `descriptor`,
    /// capped by `max_size`, flattening the cost of later spawn bursts.
    pub fn prewarm(
        &mut self,
        descriptor_index: usize,
        count: usize,
        descriptor: &ChunkDescriptor,
        world: &mut dyn WorldBackend,
    ) {
        let entry = &mut self.entries[descriptor_index];
        let room = self.max_size.saturating_sub(entry.total_created);
        for _ in 0..count.min(room) {
            let Some(handle) =
                world.instantiate(SpawnKind::Chunk(&descriptor.id), Transform::IDENTITY)
            else {
                tracing::warn!(descriptor = %descriptor.id, "prewarm instantiation failed");
                return;
            };
            world.set_active(handle, false);
            entry.total_created += 1;
            entry.free.push(handle);
        }
    }

    /// Destroys every parked instance and forgets all counters.
    ///
    /// Callers reclaim (release) all active instances first; anything
    /// still marked active here is a leak and is logged.
    pub fn clear(&mut self, world: &mut dyn WorldBackend) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if entry.active > 0 {
                tracing::warn!(
                    descriptor = index,
                    active = entry.active,
                    "pool cleared with instances still active"
                );
            }
            for handle in entry.free.drain(..) {
                world.destroy(handle);
            }
            entry.total_created = 0;
            entry.active = 0;
        }
    }

    /// Counters for one descriptor.
    #[must_use]
    pub fn stats(&self, descriptor_index: usize) -> PoolStats {
        self.entries[descriptor_index].stats()
    }

    /// Counters summed over every descriptor.
    #[must_use]
    pub fn totals(&self) -> PoolStats {
        let mut totals = PoolStats::default();
        for entry in &self.entries {
            totals.total_created += entry.total_created;
            totals.active += entry.active;
            totals.free += entry.free.len();
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LevelConfig;
    use crate::world::HeadlessWorld;

    fn fixture() -> (ChunkPool, Vec<ChunkDescriptor>, HeadlessWorld) {
        let config = LevelConfig::test();
        let pool = ChunkPool::new(
            PoolConfig {
                initial_size: 0,
                max_size: 5,
                expandable: false,
            },
            config.chunks.len(),
        );
        (pool, config.chunks, HeadlessWorld::new())
    }

    fn conservation_holds(stats: PoolStats) -> bool {
        stats.active + stats.free == stats.total_created
    }

    #[test]
    fn acquire_reuses_released_handles() {
        let (mut pool, chunks, mut world) = fixture();

        let first = pool
            .acquire(0, &chunks[0], Transform::IDENTITY, &mut world)
            .expect("acquire");
        pool.release(0, first, &mut world);
        assert!(!world.get(first).expect("parked").active);

        let second = pool
            .acquire(0, &chunks[0], Transform::IDENTITY, &mut world)
            .expect("reacquire");
        assert_eq!(first, second);
        assert!(world.get(second).expect("reused").active);
        assert_eq!(world.total_instantiated(), 1);
    }

    #[test]
    fn sixth_concurrent_acquire_fails_on_fixed_pool() {
        let (mut pool, chunks, mut world) = fixture();

        let mut held = Vec::new();
        for _ in 0..5 {
            held.push(
                pool.acquire(0, &chunks[0], Transform::IDENTITY, &mut world)
                    .expect("within capacity"),
            );
        }
        assert_eq!(
            pool.acquire(0, &chunks[0], Transform::IDENTITY, &mut world),
            Err(AcquireError::Exhausted {
                descriptor: 0,
                capacity: 5
            })
        );

        // Releasing one frees capacity again.
        pool.release(0, held.pop().expect("held"), &mut world);
        assert!(pool
            .acquire(0, &chunks[0], Transform::IDENTITY, &mut world)
            .is_ok());
    }

    #[test]
    fn conservation_invariant_holds_under_churn() {
        let (mut pool, chunks, mut world) = fixture();

        let mut held = Vec::new();
        for round in 0..20 {
            if round % 3 == 2 {
                if let Some(handle) = held.pop() {
                    pool.release(0, handle, &mut world);
                }
            } else if let Ok(handle) =
                pool.acquire(0, &chunks[0], Transform::IDENTITY, &mut world)
            {
                held.push(handle);
            }
            assert!(conservation_holds(pool.stats(0)), "round {round}");
        }
    }

    #[test]
    fn expandable_pool_grows_then_shrinks_to_cap() {
        let config = LevelConfig::test();
        let mut pool = ChunkPool::new(
            PoolConfig {
                initial_size: 0,
                max_size: 2,
                expandable: true,
            },
            config.chunks.len(),
        );
        let mut world = HeadlessWorld::new();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                pool.acquire(0, &config.chunks[0], Transform::IDENTITY, &mut world)
                    .expect("expandable acquire")
            })
            .collect();
        assert_eq!(pool.stats(0).total_created, 4);

        for handle in handles {
            pool.release(0, handle, &mut world);
        }
        // Two parked at the cap, two destroyed.
        let stats = pool.stats(0);
        assert_eq!(stats.total_created, 2);
        assert_eq!(stats.free, 2);
        assert_eq!(world.total_destroyed(), 2);
        assert!(conservation_holds(stats));
    }

    #[test]
    fn prewarm_parks_inactive_instances() {
        let (mut pool, chunks, mut world) = fixture();

        pool.prewarm(1, 3, &chunks[1], &mut world);
        let stats = pool.stats(1);
        assert_eq!(stats.free, 3);
        assert_eq!(stats.active, 0);
        assert_eq!(world.active_count(), 0);

        // Prewarm never exceeds the cap.
        pool.prewarm(1, 10, &chunks[1], &mut world);
        assert_eq!(pool.stats(1).total_created, 5);
    }

    #[test]
    fn clear_destroys_parked_instances() {
        let (mut pool, chunks, mut world) = fixture();

        pool.prewarm(0, 4, &chunks[0], &mut world);
        pool.clear(&mut world);
        assert_eq!(pool.totals(), PoolStats::default());
        assert_eq!(world.live_count(), 0);
    }
}
