//! Persistent bounding boxes around moving objects in a video stream.
//!
//! Each frame goes through four stages:
//!
//! 1. [`BackgroundSubtractor`] classifies pixels as background, shadow or
//!    foreground against an adaptive per-pixel Gaussian mixture.
//! 2. [`RegionExtractor`] opens the mask and collects connected foreground
//!    components as [`RawRegion`]s.
//! 3. [`BoxScaler`] enlarges each region around its centre and clamps it to
//!    the frame.
//! 4. [`PersistenceTracker`] matches the candidates against the boxes it
//!    retains and keeps each one alive for a grace period after its last
//!    match, so intermittent detections do not flicker.
//!
//! [`MotionPipeline`] wires the stages together for a single stream.
//!
//! ```
//! use motion_persist::{BoundingBox, PersistenceTracker, TrackerConfig};
//!
//! let mut tracker = PersistenceTracker::new(TrackerConfig::default()).unwrap();
//! let drawn = tracker.update(&[BoundingBox::new(5, 5, 25, 25)], 0.0);
//! assert_eq!(drawn.len(), 1);
//!
//! // Nothing seen for longer than the persistence window.
//! assert!(tracker.update(&[], 1.1).is_empty());
//! ```

pub mod config;
pub mod error;
pub mod integration;
pub mod segmentation;
pub mod tracker;

pub use config::PipelineConfig;
pub use error::{ConfigError, FrameError};
pub use integration::{FrameClock, FrameSource, IterSource, MotionPipeline};
pub use segmentation::{
    BackgroundSubtractor, BoxScaler, ExtractorConfig, ForegroundMask, Frame, KernelShape,
    PixelClass, RegionExtractor, SegmenterConfig,
};
pub use tracker::{
    BoundingBox, MatchStrategy, PersistenceTracker, RawRegion, TrackedBox, TrackerConfig,
};
