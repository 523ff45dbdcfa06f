//! Error types.

use thiserror::Error;

/// Errors raised while building or feeding frames.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    /// Luminance buffer length does not match the declared dimensions.
    #[error("frame buffer holds {got} pixels, expected {expected}")]
    BufferSize { expected: usize, got: usize },
    /// Frame timestamp is NaN or infinite.
    #[error("frame timestamp {0} is not finite")]
    Timestamp(f64),
    /// Frame has zero width or height.
    #[error("frame has an empty dimension")]
    Empty,
    /// Frame timestamp precedes the previously processed one.
    #[error("frame timestamp {current} precedes previous timestamp {previous}")]
    NonMonotonicTimestamp { previous: f64, current: f64 },
}

/// Errors raised by configuration validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("scale factor must be positive and finite, got {0}")]
    ScaleFactor(f64),
    #[error("persistence time must be positive and finite, got {0}")]
    PersistenceTime(f64),
    #[error("match distance must be positive and finite, got {0}")]
    MatchDistance(f64),
    #[error("overlap threshold must lie in (0, 1], got {0}")]
    OverlapThreshold(f32),
    #[error("background history must be at least one frame")]
    History,
    #[error("variance threshold must be positive, got {0}")]
    VarianceThreshold(f32),
    #[error("mixture must allow at least one mode")]
    MaxModes,
    #[error("shadow threshold must lie in (0, 1), got {0}")]
    ShadowThreshold(f32),
    #[error("learning rate must lie in [0, 1], got {0}")]
    LearningRate(f32),
    #[error("variance bounds are inconsistent: min {min}, init {init}, max {max}")]
    VarianceBounds { min: f32, init: f32, max: f32 },
    #[error("opening needs a kernel radius of at least one and radius × iterations below 255")]
    KernelRadius,
    #[error("frame rate must be positive and finite, got {0}")]
    FrameRate(f64),
}
