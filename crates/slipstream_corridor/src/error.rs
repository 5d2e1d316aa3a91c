//! # Corridor Error Types
//!
//! Configuration errors are the only fatal class: streaming refuses to
//! start on a malformed [`crate::config::LevelConfig`]. Everything that
//! can go wrong after startup is a value the caller handles on the spot.

use thiserror::Error;

/// Errors raised while loading or validating level configuration.
///
/// Any of these refuses startup; none of them can occur once streaming
/// has begun.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The chunk library contains no descriptors.
    #[error("chunk library is empty")]
    EmptyLibrary,

    /// A descriptor's forward extent is zero or negative.
    #[error("chunk `{id}`: length must be positive, got {length}")]
    NonPositiveLength {
        /// Offending descriptor.
        id: String,
        /// Authored length.
        length: f32,
    },

    /// A descriptor's difficulty rating falls outside `[0, 1]`.
    #[error("chunk `{id}`: difficulty rating {rating} outside [0, 1]")]
    RatingOutOfRange {
        /// Offending descriptor.
        id: String,
        /// Authored rating.
        rating: f32,
    },

    /// A descriptor's minimum spawn distance exceeds its maximum.
    #[error("chunk `{id}`: min spawn distance {min} exceeds max {max}")]
    InvertedSpawnBounds {
        /// Offending descriptor.
        id: String,
        /// Authored minimum.
        min: f32,
        /// Authored maximum.
        max: f32,
    },

    /// A descriptor's selection weight is zero.
    #[error("chunk `{id}`: spawn weight must be at least 1")]
    ZeroSpawnWeight {
        /// Offending descriptor.
        id: String,
    },

    /// An obstacle point's spawn probability falls outside `[0, 1]`.
    #[error("chunk `{id}`: spawn probability {probability} outside [0, 1]")]
    ProbabilityOutOfRange {
        /// Offending descriptor.
        id: String,
        /// Authored probability.
        probability: f32,
    },

    /// A reward point requests zero instances.
    #[error("chunk `{id}`: reward count must be at least 1")]
    ZeroRewardCount {
        /// Offending descriptor.
        id: String,
    },

    /// A reward point's spacing is zero or negative.
    #[error("chunk `{id}`: reward spacing must be positive, got {spacing}")]
    NonPositiveSpacing {
        /// Offending descriptor.
        id: String,
        /// Authored spacing.
        spacing: f32,
    },

    /// The leading window edge is zero or negative.
    #[error("spawn-ahead distance must be positive, got {0}")]
    NonPositiveSpawnAhead(f32),

    /// The trailing window edge is negative.
    #[error("destroy-behind distance must be non-negative, got {0}")]
    NegativeDestroyBehind(f32),

    /// The initial difficulty exceeds the maximum difficulty.
    #[error("initial difficulty {initial} exceeds max difficulty {max}")]
    InvertedDifficultyRange {
        /// Configured starting difficulty.
        initial: f32,
        /// Configured ceiling.
        max: f32,
    },

    /// The distance span the difficulty curve is normalized over is
    /// zero or negative.
    #[error("difficulty reference span must be positive, got {0}")]
    NonPositiveReferenceSpan(f32),

    /// The distance span of one level is zero or negative.
    #[error("level distance span must be positive, got {0}")]
    NonPositiveLevelSpan(f32),

    /// The lateral lane width is zero or negative.
    #[error("lane width must be positive, got {0}")]
    NonPositiveLaneWidth(f32),

    /// The consecutive-category cap is zero.
    #[error("max consecutive same category must be at least 1")]
    ZeroCategoryRun,

    /// The pool would start larger than it is allowed to grow.
    #[error("pool max size {max} is below initial size {initial}")]
    PoolSizeInverted {
        /// Configured prewarm size.
        initial: usize,
        /// Configured capacity.
        max: usize,
    },

    /// More chunks would be bootstrapped than the window admits.
    #[error("max active chunks {max} is below initial active chunks {initial}")]
    ActiveWindowInverted {
        /// Configured bootstrap count.
        initial: usize,
        /// Configured window capacity.
        max: usize,
    },

    /// Some reachable cursor distance has no eligible descriptor.
    #[error("no descriptor is eligible at distance {distance}")]
    UnreachableBand {
        /// A distance the spawn-bound filter leaves empty.
        distance: f32,
    },

    /// The configuration file could not be read.
    #[error("failed to read configuration file: {0}")]
    Io(String),

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Failure to hand out a pooled instance.
///
/// Callers treat both variants exactly like a transient spawn failure:
/// log, skip the attempt, retry next tick.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireError {
    /// The pool is non-expandable and every instance is active.
    #[error("pool exhausted for descriptor {descriptor}: all {capacity} instances active")]
    Exhausted {
        /// Library index of the starved descriptor.
        descriptor: usize,
        /// Configured per-descriptor capacity.
        capacity: usize,
    },

    /// The world backend returned no handle.
    #[error("world backend refused to materialize the instance")]
    BackendRefused,
}
