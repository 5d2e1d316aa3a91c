//! # Lifecycle Trackers
//!
//! Flat bookkeeping over every live obstacle and reward instance, keyed
//! by world handle: registration, proximity queries, aggregate counters,
//! and (for rewards) the transient effects a pickup grants.
//!
//! Proximity queries are linear scans. That is deliberate: the streaming
//! window bounds the live set by construction, so there is nothing to
//! index.

use slipstream_shared::Vec3;

use crate::descriptor::{EffectKind, ObstacleKind, RewardKind};
use crate::world::WorldHandle;

/// One live obstacle instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstacleInstance {
    /// Backend handle.
    pub handle: WorldHandle,
    /// Obstacle archetype.
    pub kind: ObstacleKind,
    /// World position.
    pub position: Vec3,
}

/// One live reward instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardInstance {
    /// Backend handle.
    pub handle: WorldHandle,
    /// Reward archetype.
    pub kind: RewardKind,
    /// World position.
    pub position: Vec3,
}

/// Bookkeeping over live obstacle instances.
#[derive(Debug, Default)]
pub struct ObstacleTracker {
    live: Vec<ObstacleInstance>,
    total_spawned: u64,
    total_destroyed: u64,
}

impl ObstacleTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly spawned obstacle.
    pub fn register(&mut self, instance: ObstacleInstance) {
        self.live.push(instance);
        self.total_spawned += 1;
    }

    /// Removes an obstacle, returning its record if it was live.
    pub fn unregister(&mut self, handle: WorldHandle) -> Option<ObstacleInstance> {
        let index = self.live.iter().position(|i| i.handle == handle)?;
        self.total_destroyed += 1;
        Some(self.live.swap_remove(index))
    }

    /// All live obstacles within `radius` of `point`.
    #[must_use]
    pub fn query_within_radius(&self, point: Vec3, radius: f32) -> Vec<ObstacleInstance> {
        let radius_squared = radius * radius;
        self.live
            .iter()
            .filter(|i| i.position.distance_squared(point) <= radius_squared)
            .copied()
            .collect()
    }

    /// Number of live obstacles.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Obstacles spawned over the session.
    #[must_use]
    pub const fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    /// Obstacles destroyed over the session.
    #[must_use]
    pub const fn total_destroyed(&self) -> u64 {
        self.total_destroyed
    }

    /// Forgets every live instance (session restart).
    pub fn clear(&mut self) {
        self.live.clear();
    }
}

/// A transient world effect granted by a collected reward.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ActiveEffect {
    kind: EffectKind,
    expires_at: f32,
}

/// Bookkeeping over live reward instances and active pickup effects.
#[derive(Debug, Default)]
pub struct RewardTracker {
    live: Vec<RewardInstance>,
    effects: Vec<ActiveEffect>,
    total_spawned: u64,
    total_collected: u64,
}

impl RewardTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly spawned reward.
    pub fn register(&mut self, instance: RewardInstance) {
        self.live.push(instance);
        self.total_spawned += 1;
    }

    /// Removes a reward without collecting it (chunk reclaim).
    pub fn unregister(&mut self, handle: WorldHandle) -> Option<RewardInstance> {
        let index = self.live.iter().position(|i| i.handle == handle)?;
        Some(self.live.swap_remove(index))
    }

    /// Collects a reward: removes it, counts it, and starts its effect
    /// (when the kind grants one) expiring at
    /// `at_distance + effect span`.
    pub fn collect(&mut self, handle: WorldHandle, at_distance: f32) -> Option<RewardInstance> {
        let instance = self.unregister(handle)?;
        self.total_collected += 1;
        if let Some(kind) = instance.kind.effect() {
            self.effects.push(ActiveEffect {
                kind,
                expires_at: at_distance + kind.span(),
            });
        }
        Some(instance)
    }

    /// Expires effects the traveler has outrun.
    pub fn update(&mut self, distance: f32) {
        self.effects.retain(|effect| effect.expires_at > distance);
    }

    /// Whether at least one effect of `kind` is active.
    ///
    /// Recomputed by scanning the live effect set rather than by
    /// incremental counting, so out-of-order expiry cannot wedge a flag.
    #[must_use]
    pub fn effect_active(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|effect| effect.kind == kind)
    }

    /// All live rewards within `radius` of `point`.
    #[must_use]
    pub fn query_within_radius(&self, point: Vec3, radius: f32) -> Vec<RewardInstance> {
        let radius_squared = radius * radius;
        self.live
            .iter()
            .filter(|i| i.position.distance_squared(point) <= radius_squared)
            .copied()
            .collect()
    }

    /// Number of live rewards.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Rewards spawned over the session.
    #[must_use]
    pub const fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    /// Rewards collected over the session.
    #[must_use]
    pub const fn total_collected(&self) -> u64 {
        self.total_collected
    }

    /// Forgets every live instance and effect (session restart).
    pub fn clear(&mut self) {
        self.live.clear();
        self.effects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obstacle(raw: u64, z: f32) -> ObstacleInstance {
        ObstacleInstance {
            handle: WorldHandle::from_raw(raw),
            kind: ObstacleKind::Barrier,
            position: Vec3::forward(z),
        }
    }

    fn reward(raw: u64, kind: RewardKind, z: f32) -> RewardInstance {
        RewardInstance {
            handle: WorldHandle::from_raw(raw),
            kind,
            position: Vec3::forward(z),
        }
    }

    #[test]
    fn radius_query_is_inclusive() {
        let mut tracker = ObstacleTracker::new();
        tracker.register(obstacle(0, 10.0));
        tracker.register(obstacle(1, 15.0));
        tracker.register(obstacle(2, 40.0));

        let near = tracker.query_within_radius(Vec3::forward(10.0), 5.0);
        assert_eq!(near.len(), 2);
        assert!(near.iter().all(|i| i.position.z <= 15.0));
    }

    #[test]
    fn unregister_counts_destroyed() {
        let mut tracker = ObstacleTracker::new();
        tracker.register(obstacle(7, 0.0));

        assert!(tracker.unregister(WorldHandle::from_raw(7)).is_some());
        assert!(tracker.unregister(WorldHandle::from_raw(7)).is_none());
        assert_eq!(tracker.total_spawned(), 1);
        assert_eq!(tracker.total_destroyed(), 1);
        assert_eq!(tracker.live_count(), 0);
    }

    #[test]
    fn collect_starts_and_expires_effects() {
        let mut tracker = RewardTracker::new();
        tracker.register(reward(1, RewardKind::ShieldPickup, 100.0));

        let collected = tracker
            .collect(WorldHandle::from_raw(1), 100.0)
            .expect("collect");
        assert_eq!(collected.kind, RewardKind::ShieldPickup);
        assert!(tracker.effect_active(EffectKind::Shield));
        assert!(!tracker.effect_active(EffectKind::Magnet));

        tracker.update(100.0 + EffectKind::Shield.span() - 1.0);
        assert!(tracker.effect_active(EffectKind::Shield));

        tracker.update(100.0 + EffectKind::Shield.span());
        assert!(!tracker.effect_active(EffectKind::Shield));
    }

    #[test]
    fn plain_rewards_grant_no_effect() {
        let mut tracker = RewardTracker::new();
        tracker.register(reward(2, RewardKind::Coin, 50.0));

        let _ = tracker.collect(WorldHandle::from_raw(2), 50.0);
        assert_eq!(tracker.total_collected(), 1);
        assert!(!tracker.effect_active(EffectKind::Shield));
        assert!(!tracker.effect_active(EffectKind::ScoreMultiplier));
    }

    #[test]
    fn overlapping_effects_expire_independently() {
        let mut tracker = RewardTracker::new();
        tracker.register(reward(1, RewardKind::ShieldPickup, 0.0));
        tracker.register(reward(2, RewardKind::ShieldPickup, 60.0));

        let _ = tracker.collect(WorldHandle::from_raw(1), 0.0);
        let _ = tracker.collect(WorldHandle::from_raw(2), 60.0);

        // First shield expires; the second still holds the flag up.
        tracker.update(EffectKind::Shield.span() + 1.0);
        assert!(tracker.effect_active(EffectKind::Shield));

        tracker.update(60.0 + EffectKind::Shield.span() + 1.0);
        assert!(!tracker.effect_active(EffectKind::Shield));
    }

    #[test]
    fn reclaim_is_not_collection() {
        let mut tracker = RewardTracker::new();
        tracker.register(reward(3, RewardKind::Gem, 10.0));

        assert!(tracker.unregister(WorldHandle::from_raw(3)).is_some());
        assert_eq!(tracker.total_collected(), 0);
        assert_eq!(tracker.total_spawned(), 1);
    }
}
