//! # SLIPSTREAM
//!
//! The top-level runner crate, integrating the corridor engine into a
//! playable session.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      SLIPSTREAM SESSION                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  traveler distance ──> ┌──────────────────┐                     │
//! │        (per tick)      │ CorridorStreamer │──> world backend    │
//! │                        │  • difficulty    │    (instantiate /   │
//! │                        │  • selection     │     destroy /       │
//! │                        │  • pool          │     activate)       │
//! │                        │  • population    │                     │
//! │                        └────────┬─────────┘                     │
//! │                                 │ events                        │
//! │                                 v                               │
//! │                        ┌──────────────────┐                     │
//! │                        │    RunSession    │──> SessionStats     │
//! │                        │  (drain + tally) │                     │
//! │                        └──────────────────┘                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `session`: per-tick orchestration and session statistics

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod session;

// Re-export the engine crates
pub use slipstream_corridor as corridor;
pub use slipstream_shared as shared;

// Re-export commonly used types
pub use session::{RunSession, SessionConfig, SessionStats, TickReport};
