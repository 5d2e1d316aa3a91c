//! # SLIPSTREAM Shared
//!
//! Common value types used across the corridor engine.
//!
//! ## Conventions
//!
//! The corridor runs along **+Z** (the forward axis). Lanes are offsets
//! along **+X**, and **+Y** points up. All positions are world-space
//! unless a name says otherwise.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - Any rendering or window crate
//! - Any physics crate
//!
//! World materialization lives behind the backend trait in
//! `slipstream_corridor`; these types are plain data.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod math;

pub use math::{Quaternion, Transform, Vec3};
