//! # Corridor Event Bus
//!
//! Outbound notifications from the streaming engine to whoever cares:
//! zero or more listeners, fire-and-forget, no return value.
//!
//! The bus is a bounded channel. Sending never blocks the tick: when the
//! channel is full the event is dropped and `send` reports `false`, which
//! is a consumer-is-too-slow signal, not an engine error. Receivers drain
//! without blocking.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use slipstream_shared::Vec3;

use crate::descriptor::{ObstacleKind, RewardKind};

/// Events emitted by the streaming engine.
///
/// Every variant is `Copy`: events carry library indices and positions,
/// never owned strings, so emission allocates nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CorridorEvent {
    /// A chunk entered the active window.
    ChunkSpawned {
        /// Library index of the descriptor.
        descriptor: usize,
        /// Spawn position along the forward axis.
        position: f32,
        /// Forward extent of the chunk.
        length: f32,
    },

    /// A chunk fell behind the traveler and was reclaimed.
    ChunkReclaimed {
        /// Library index of the descriptor.
        descriptor: usize,
        /// Spawn position the chunk occupied.
        position: f32,
    },

    /// The throttled difficulty evaluation produced a new value.
    DifficultyChanged {
        /// New difficulty in `[initial, max]`.
        difficulty: f32,
    },

    /// The traveler crossed a level boundary.
    LevelUp {
        /// New one-based level.
        level: u32,
    },

    /// An obstacle was materialized during population.
    ObstacleSpawned {
        /// Obstacle archetype.
        kind: ObstacleKind,
        /// World position.
        position: Vec3,
    },

    /// An obstacle was destroyed at chunk reclaim.
    ObstacleDestroyed {
        /// Obstacle archetype.
        kind: ObstacleKind,
        /// World position.
        position: Vec3,
    },

    /// A reward was materialized during population.
    RewardSpawned {
        /// Reward archetype.
        kind: RewardKind,
        /// World position.
        position: Vec3,
    },

    /// A reward was collected by the traveler.
    RewardCollected {
        /// Reward archetype.
        kind: RewardKind,
        /// World position.
        position: Vec3,
    },
}

/// Event bus connecting the engine to its listeners.
///
/// Pre-allocates a bounded channel so the hot path never grows memory.
pub struct EventBus {
    sender: Sender<CorridorEvent>,
    receiver: Receiver<CorridorEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum events in flight. 1024 suits a typical
    ///   session.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Creates a sender handle (clone for multiple producers).
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Creates a receiver handle (clone for multiple consumers).
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }
}

/// Handle for emitting events.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<CorridorEvent>,
}

impl EventSender {
    /// Sends an event without blocking.
    ///
    /// Returns `false` when the event was dropped (channel full or all
    /// receivers gone).
    #[inline]
    pub fn send(&self, event: CorridorEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Handle for consuming events.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<CorridorEvent>,
}

impl EventReceiver {
    /// Receives all pending events without blocking.
    #[inline]
    #[must_use]
    pub fn drain(&self) -> Vec<CorridorEvent> {
        let mut events = Vec::with_capacity(self.receiver.len());
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Receives one event without blocking.
    #[inline]
    #[must_use]
    pub fn try_recv(&self) -> Option<CorridorEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}
