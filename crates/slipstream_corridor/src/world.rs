//! # World Backend
//!
//! The corridor engine never touches rendering or physics. Everything it
//! materializes goes through [`WorldBackend`], and everything it holds on
//! to is an opaque [`WorldHandle`] value id — no reference semantics, so
//! the engine ports cleanly to arena- or handle-table memory models.
//!
//! [`HeadlessWorld`] is the crate's own backend: a handle table with no
//! visual output, used by the tests, the benches, and the simulation
//! binary.

use std::collections::HashMap;

use slipstream_shared::Transform;

use crate::descriptor::{ObstacleKind, RewardKind};

/// Opaque identifier for a materialized world instance.
///
/// Handles are small value ids owned by the backend; the engine never
/// inspects what they refer to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorldHandle(u64);

impl WorldHandle {
    /// Wraps a raw backend id.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw backend id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// What the backend is being asked to materialize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnKind<'a> {
    /// A corridor segment, named by its descriptor id.
    Chunk(&'a str),
    /// An obstacle instance.
    Obstacle(ObstacleKind),
    /// A reward instance.
    Reward(RewardKind),
}

/// World-instantiation collaborator.
///
/// Implementations own the concrete representation (meshes, colliders,
/// nothing at all); the engine only issues these four calls and treats
/// the returned handles as opaque.
pub trait WorldBackend {
    /// Materializes an instance, returning its handle.
    ///
    /// Returning `None` signals a transient failure; the engine skips
    /// the attempt and retries on a later tick.
    fn instantiate(&mut self, kind: SpawnKind<'_>, transform: Transform) -> Option<WorldHandle>;

    /// Permanently destroys an instance.
    fn destroy(&mut self, handle: WorldHandle);

    /// Toggles an instance without destroying it (pooled reuse).
    fn set_active(&mut self, handle: WorldHandle, active: bool);

    /// Moves an instance (pooled reuse repositioning).
    fn set_transform(&mut self, handle: WorldHandle, transform: Transform);
}

/// Owned record of one headless instance.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadlessRecord {
    /// Descriptor id for chunks, archetype name otherwise.
    pub label: String,
    /// Last transform applied.
    pub transform: Transform,
    /// Active flag (pooled instances park as inactive).
    pub active: bool,
}

/// Backend with no visual output: a handle table and counters.
///
/// Handles are monotonic and never reused, which makes stale-handle
/// bugs loud in tests.
#[derive(Debug, Default)]
pub struct HeadlessWorld {
    slots: HashMap<WorldHandle, HeadlessRecord>,
    next_raw: u64,
    total_instantiated: u64,
    total_destroyed: u64,
    /// When set, the next `fail_next` instantiations return `None`.
    fail_next: u32,
}

impl HeadlessWorld {
    /// Creates an empty headless world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (not yet destroyed) instances, active or parked.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of live instances currently active.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.values().filter(|record| record.active).count()
    }

    /// Total instances ever materialized.
    #[must_use]
    pub const fn total_instantiated(&self) -> u64 {
        self.total_instantiated
    }

    /// Total instances destroyed.
    #[must_use]
    pub const fn total_destroyed(&self) -> u64 {
        self.total_destroyed
    }

    /// Looks up a live instance.
    #[must_use]
    pub fn get(&self, handle: WorldHandle) -> Option<&HeadlessRecord> {
        self.slots.get(&handle)
    }

    /// Makes the next `count` instantiations fail, for retry testing.
    pub fn inject_failures(&mut self, count: u32) {
        self.fail_next = count;
    }

    fn label_for(kind: SpawnKind<'_>) -> String {
        match kind {
            SpawnKind::Chunk(id) => id.to_owned(),
            SpawnKind::Obstacle(kind) => format!("obstacle:{kind:?}"),
            SpawnKind::Reward(kind) => format!("reward:{kind:?}"),
        }
    }
}

impl WorldBackend for HeadlessWorld {
    fn instantiate(&mut self, kind: SpawnKind<'_>, transform: Transform) -> Option<WorldHandle> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return None;
        }
        let handle = WorldHandle::from_raw(self.next_raw);
        self.next_raw += 1;
        self.total_instantiated += 1;
        let previous = self.slots.insert(
            handle,
            HeadlessRecord {
                label: Self::label_for(kind),
                transform,
                active: true,
            },
        );
        debug_assert!(previous.is_none(), "headless handles are never reused");
        Some(handle)
    }

    fn destroy(&mut self, handle: WorldHandle) {
        if self.slots.remove(&handle).is_some() {
            self.total_destroyed += 1;
        }
    }

    fn set_active(&mut self, handle: WorldHandle, active: bool) {
        if let Some(record) = self.slots.get_mut(&handle) {
            record.active = active;
        }
    }

    fn set_transform(&mut self, handle: WorldHandle, transform: Transform) {
        if let Some(record) = self.slots.get_mut(&handle) {
            record.transform = transform;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipstream_shared::Vec3;

    #[test]
    fn instantiate_destroy_roundtrip() {
        let mut world = HeadlessWorld::new();
        let handle = world
            .instantiate(SpawnKind::Chunk("alpha"), Transform::IDENTITY)
            .expect("instantiate");

        assert_eq!(world.live_count(), 1);
        assert_eq!(world.get(handle).map(|r| r.label.as_str()), Some("alpha"));

        world.destroy(handle);
        assert_eq!(world.live_count(), 0);
        assert_eq!(world.total_destroyed(), 1);
    }

    #[test]
    fn handles_are_unique_across_destroy() {
        let mut world = HeadlessWorld::new();
        let first = world
            .instantiate(SpawnKind::Obstacle(ObstacleKind::Barrier), Transform::IDENTITY)
            .expect("first");
        world.destroy(first);
        let second = world
            .instantiate(SpawnKind::Obstacle(ObstacleKind::Barrier), Transform::IDENTITY)
            .expect("second");
        assert_ne!(first, second);
    }

    #[test]
    fn parked_instances_stay_live() {
        let mut world = HeadlessWorld::new();
        let handle = world
            .instantiate(SpawnKind::Reward(RewardKind::Coin), Transform::IDENTITY)
            .expect("instantiate");

        world.set_active(handle, false);
        assert_eq!(world.live_count(), 1);
        assert_eq!(world.active_count(), 0);

        world.set_transform(handle, Transform::at_position(Vec3::forward(25.0)));
        world.set_active(handle, true);
        let record = world.get(handle).expect("record");
        assert!(record.active);
        assert_eq!(record.transform.position.z, 25.0);
    }

    #[test]
    fn injected_failures_are_transient() {
        let mut world = HeadlessWorld::new();
        world.inject_failures(2);
        assert!(world.instantiate(SpawnKind::Chunk("a"), Transform::IDENTITY).is_none());
        assert!(world.instantiate(SpawnKind::Chunk("a"), Transform::IDENTITY).is_none());
        assert!(world.instantiate(SpawnKind::Chunk("a"), Transform::IDENTITY).is_some());
    }
}
